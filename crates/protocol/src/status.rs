//! Daemon status codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of status codes a daemon call can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
	Success,
	FailureUnknown,
	FailureArgsInvalid,
	FailureIfaceInvalid,
	FailureIfaceUnknown,
	FailureIfaceExists,
	FailureIfaceDisabled,
	FailureIfaceNotDisconnected,
	FailureNetworkInvalid,
	FailureNetworkUnknown,
	FailureUnsupported,
	/// Service manager has no instance of the requested service.
	ServiceUnavailable,
}

impl StatusCode {
	pub fn is_success(self) -> bool {
		self == StatusCode::Success
	}
}

impl fmt::Display for StatusCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			StatusCode::Success => "SUCCESS",
			StatusCode::FailureUnknown => "FAILURE_UNKNOWN",
			StatusCode::FailureArgsInvalid => "FAILURE_ARGS_INVALID",
			StatusCode::FailureIfaceInvalid => "FAILURE_IFACE_INVALID",
			StatusCode::FailureIfaceUnknown => "FAILURE_IFACE_UNKNOWN",
			StatusCode::FailureIfaceExists => "FAILURE_IFACE_EXISTS",
			StatusCode::FailureIfaceDisabled => "FAILURE_IFACE_DISABLED",
			StatusCode::FailureIfaceNotDisconnected => "FAILURE_IFACE_NOT_DISCONNECTED",
			StatusCode::FailureNetworkInvalid => "FAILURE_NETWORK_INVALID",
			StatusCode::FailureNetworkUnknown => "FAILURE_NETWORK_UNKNOWN",
			StatusCode::FailureUnsupported => "FAILURE_UNSUPPORTED",
			StatusCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
		};
		f.write_str(name)
	}
}

/// Status half of every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonStatus {
	pub code: StatusCode,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl DaemonStatus {
	pub fn success() -> Self {
		Self::from(StatusCode::Success)
	}
}

impl From<StatusCode> for DaemonStatus {
	fn from(code: StatusCode) -> Self {
		Self { code, message: None }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_matches_wire_name() {
		for code in [StatusCode::Success, StatusCode::FailureIfaceNotDisconnected, StatusCode::ServiceUnavailable] {
			let wire = serde_json::to_value(code).unwrap();
			assert_eq!(wire.as_str(), Some(code.to_string().as_str()));
		}
	}
}

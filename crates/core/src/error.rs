use std::path::PathBuf;

use thiserror::Error;
use wlanhal_protocol::StatusCode;

/// Error type for every public session-manager operation.
#[derive(Debug, Error)]
pub enum Error {
	/// Service manager reports no instance yet. Expected while the daemon starts.
	#[error("service unavailable: {0}")]
	ServiceUnavailable(String),

	/// The daemon link broke mid-call; handled like a death notification.
	#[error("transport failure during {method}: {source}")]
	Transport {
		method: &'static str,
		#[source]
		source: wlanhal_runtime::Error,
	},

	#[error("daemon is not ready")]
	DaemonNotReady,

	#[error("interface {0} already exists")]
	AlreadyExists(String),

	#[error("interface {0} is not tracked")]
	NotTracked(String),

	#[error("no current network on {0}")]
	NoCurrentNetwork(String),

	#[error("death link rejected by {0}")]
	DeathLinkFailed(String),

	#[error("callback registration on {iface} failed: {code}")]
	CallbackRegistrationFailed { iface: String, code: StatusCode },

	#[error("pushing {field} failed: {code}")]
	ConfigPushFailed { field: &'static str, code: StatusCode },

	#[error("adding network failed: {0}")]
	NetworkAddFailed(StatusCode),

	#[error("selecting network failed: {0}")]
	SelectFailed(StatusCode),

	#[error("setting BSSID failed: {0}")]
	BssidSetFailed(StatusCode),

	#[error("reassociation failed: {0}")]
	ReassociateFailed(StatusCode),

	#[error("network id {requested} is not the current network (current: {current:?})")]
	StaleNetworkId { requested: i32, current: Option<i32> },

	#[error("adding linked network failed after {added} succeeded: {code}")]
	LinkedNetworkAddFailed { added: usize, code: StatusCode },

	#[error("removing network {network_id} failed after {removed} removals: {code}")]
	PartialRemovalFailed { network_id: u32, removed: usize, code: StatusCode },

	#[error("{method} failed: {code}")]
	DaemonStatus { method: &'static str, code: StatusCode },

	#[error("unsupported: {0}")]
	Unsupported(String),

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("config file {}: {message}", .path.display())]
	Config { path: PathBuf, message: String },

	#[error("protocol error: {0}")]
	Protocol(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl Error {
	pub(crate) fn from_runtime(method: &'static str, source: wlanhal_runtime::Error) -> Self {
		if source.is_link_failure() {
			Error::Transport { method, source }
		} else {
			Error::Protocol(format!("{method}: {source}"))
		}
	}

	/// Whether the daemon link itself failed.
	pub fn is_transport(&self) -> bool {
		matches!(self, Error::Transport { .. })
	}

	/// Status code reported by the daemon, if this is a daemon-reported failure.
	pub fn status_code(&self) -> Option<StatusCode> {
		match self {
			Error::DaemonStatus { code, .. }
			| Error::CallbackRegistrationFailed { code, .. }
			| Error::ConfigPushFailed { code, .. }
			| Error::LinkedNetworkAddFailed { code, .. }
			| Error::PartialRemovalFailed { code, .. } => Some(*code),
			Error::NetworkAddFailed(code) | Error::SelectFailed(code) | Error::BssidSetFailed(code) | Error::ReassociateFailed(code) => Some(*code),
			_ => None,
		}
	}

	/// Re-labels a generic daemon status failure as an operation-specific one.
	pub(crate) fn map_status(self, f: impl FnOnce(StatusCode) -> Error) -> Error {
		match self {
			Error::DaemonStatus { code, .. } => f(code),
			other => other,
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;

//! Request, response and event envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::status::DaemonStatus;

/// Request sent to the daemon.
///
/// ```json
/// { "id": 7, "handle": "sta_iface/wlan0", "method": "addNetwork", "params": {} }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
	/// Correlation id, echoed by the matching [`Response`].
	pub id: u32,
	/// Daemon object the call targets.
	pub handle: String,
	pub method: String,
	#[serde(default)]
	pub params: Value,
}

/// Response to a [`Request`].
///
/// A non-success `status` is still a well-formed response; only transport
/// problems surface as errors below the session layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
	pub id: u32,
	pub status: DaemonStatus,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
}

/// Unsolicited notification emitted by the daemon (callbacks and death).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
	/// Daemon object that emitted the event.
	pub handle: String,
	pub method: String,
	#[serde(default)]
	pub params: Value,
}

/// Inbound message. Responses carry `id` and `status`; anything else is an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
	Response(Response),
	Event(Event),
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::status::StatusCode;

	#[test]
	fn response_is_preferred_when_status_is_present() {
		let json = r#"{"id": 3, "status": {"code": "FAILURE_IFACE_EXISTS"}}"#;
		let message: Message = serde_json::from_str(json).unwrap();
		match message {
			Message::Response(response) => {
				assert_eq!(response.id, 3);
				assert_eq!(response.status.code, StatusCode::FailureIfaceExists);
				assert!(response.result.is_none());
			}
			Message::Event(_) => panic!("expected response"),
		}
	}

	#[test]
	fn message_without_id_is_an_event() {
		let json = r#"{"handle": "sta_iface/wlan0", "method": "onNetworkRemoved", "params": {"id": 2}}"#;
		let message: Message = serde_json::from_str(json).unwrap();
		match message {
			Message::Event(event) => {
				assert_eq!(event.handle, "sta_iface/wlan0");
				assert_eq!(event.params["id"], 2);
			}
			Message::Response(_) => panic!("expected event"),
		}
	}

	#[test]
	fn event_params_default_to_null() {
		let event: Event = serde_json::from_str(r#"{"handle": "h", "method": "onWpsEventPbcOverlap"}"#).unwrap();
		assert!(event.params.is_null());
	}
}

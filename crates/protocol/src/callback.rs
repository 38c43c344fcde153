//! Payloads of daemon-originated events.
//!
//! Field names follow the daemon's camelCase convention. Optional fields that
//! older interface tiers never send are defaulted so a single struct serves
//! every tier.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::MacBytes;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationParams {
	pub fq_name: String,
	pub instance: String,
	#[serde(default)]
	pub preexisting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDiedParams {
	pub cookie: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEventParams {
	pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChangedParams {
	pub new_state: u32,
	pub bssid: MacBytes,
	pub id: u32,
	#[serde(default)]
	pub ssid: Vec<u8>,
	#[serde(default)]
	pub fils_hlp_sent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectedParams {
	pub bssid: MacBytes,
	pub locally_generated: bool,
	pub reason_code: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRejectedParams {
	pub bssid: MacBytes,
	pub status_code: u16,
	#[serde(default)]
	pub timed_out: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BssidEventParams {
	pub bssid: MacBytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BssidChangedParams {
	pub reason: u8,
	pub bssid: MacBytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EapFailureCodeParams {
	pub error_code: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WpsFailParams {
	pub bssid: MacBytes,
	pub config_error: u16,
	pub error_ind: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnqpQueryDoneParams {
	pub bssid: MacBytes,
	/// Raw element payloads keyed by element name; parsing is left to consumers.
	#[serde(default)]
	pub elements: BTreeMap<String, Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DppConfigReceivedParams {
	pub ssid: Vec<u8>,
	#[serde(default)]
	pub password: String,
	#[serde(default)]
	pub psk: Vec<u8>,
	pub security_akm: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DppCodeParams {
	pub code: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DppAuthSuccessParams {
	pub initiator: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApFailureParams {
	pub iface_name: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn state_change_without_vendor_fields_defaults() {
		let params: StateChangedParams = serde_json::from_value(serde_json::json!({
			"newState": 9,
			"bssid": [0, 17, 34, 51, 68, 85],
			"id": 0
		}))
		.unwrap();
		assert!(params.ssid.is_empty());
		assert!(!params.fils_hlp_sent);
		assert_eq!(params.bssid[5], 85);
	}
}

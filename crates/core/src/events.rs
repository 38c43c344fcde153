//! Daemon callbacks republished as typed domain events.
//!
//! Raw events arrive as `{handle, method, params}`. Each interface tier has one
//! flat projection into [`StaCallback`]; [`dispatch`] then applies the
//! reclassification policy against the interface's session and produces the
//! [`DomainEvent`]s to deliver once the state lock is released.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use wlanhal_protocol::consts::{REASON_IE_IN_4WAY_DIFFERS, STATUS_UNSPECIFIED_FAILURE, bssid_change, dpp, wps};
use wlanhal_protocol::{
	AnqpQueryDoneParams, AssociationRejectedParams, BssidChangedParams, BssidEventParams, DisconnectedParams, DppAuthSuccessParams, DppCodeParams,
	DppConfigReceivedParams, EapFailureCodeParams, HalTier, MacBytes, NetworkEventParams, StateChangedParams, WpsFailParams, method,
};

use crate::session::InterfaceSlot;
use crate::types::{KeyMgmt, MacAddress, NetworkConfig, SupplicantState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFailureKind {
	WrongPassword,
	Timeout,
	EapFailure,
	EapFailureWithCode(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WpsEventKind {
	Success,
	Failure { config_error: u16, error_ind: u16 },
	Timeout,
	PbcOverlap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DppEventKind {
	ConfigReceived,
	ConfigSent,
	Progress,
	Failure,
	AuthSuccess,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DppPayload {
	None,
	Config(NetworkConfig),
	Code(u32),
	Initiator(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BssidChangeKind {
	/// Association to this BSSID started.
	Target,
	/// Association to this BSSID completed.
	Associated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
	StateChanged {
		iface: String,
		new_state: SupplicantState,
		bssid: MacAddress,
		network_id: i32,
		ssid: Vec<u8>,
	},
	NetworkConnected {
		iface: String,
		network_id: i32,
		bssid: MacAddress,
		fils_hlp_sent: bool,
	},
	Disconnected {
		iface: String,
		bssid: MacAddress,
		locally_generated: bool,
		reason_code: u16,
	},
	AssociationRejected {
		iface: String,
		bssid: MacAddress,
		status_code: u16,
		timed_out: bool,
	},
	AuthenticationFailed {
		iface: String,
		kind: AuthFailureKind,
	},
	WpsEvent {
		iface: String,
		kind: WpsEventKind,
	},
	DppEvent {
		iface: String,
		kind: DppEventKind,
		payload: DppPayload,
	},
	AnqpQueryDone {
		iface: String,
		bssid: MacAddress,
		elements: BTreeMap<String, Vec<u8>>,
	},
	BssidChanged {
		iface: String,
		kind: BssidChangeKind,
		bssid: MacAddress,
	},
	DaemonDisconnected {
		iface: String,
	},
}

/// Upstream consumer of domain events. Every method defaults to a no-op.
///
/// Called from the event worker after the state lock is released, in
/// emission order.
#[allow(unused_variables)]
pub trait DomainEventListener: Send + Sync {
	fn on_state_changed(&self, iface: &str, new_state: SupplicantState, bssid: MacAddress, network_id: i32, ssid: &[u8]) {}
	fn on_network_connected(&self, iface: &str, network_id: i32, bssid: MacAddress, fils_hlp_sent: bool) {}
	fn on_disconnected(&self, iface: &str, bssid: MacAddress, locally_generated: bool, reason_code: u16) {}
	fn on_association_rejected(&self, iface: &str, bssid: MacAddress, status_code: u16, timed_out: bool) {}
	fn on_authentication_failure(&self, iface: &str, kind: AuthFailureKind) {}
	fn on_wps_event(&self, iface: &str, kind: WpsEventKind) {}
	fn on_dpp_event(&self, iface: &str, kind: DppEventKind, payload: &DppPayload) {}
	fn on_anqp_query_done(&self, iface: &str, bssid: MacAddress, elements: &BTreeMap<String, Vec<u8>>) {}
	fn on_bssid_changed(&self, iface: &str, kind: BssidChangeKind, bssid: MacAddress) {}
	fn on_daemon_disconnected(&self, iface: &str) {}
}

impl DomainEvent {
	pub fn iface(&self) -> &str {
		match self {
			DomainEvent::StateChanged { iface, .. }
			| DomainEvent::NetworkConnected { iface, .. }
			| DomainEvent::Disconnected { iface, .. }
			| DomainEvent::AssociationRejected { iface, .. }
			| DomainEvent::AuthenticationFailed { iface, .. }
			| DomainEvent::WpsEvent { iface, .. }
			| DomainEvent::DppEvent { iface, .. }
			| DomainEvent::AnqpQueryDone { iface, .. }
			| DomainEvent::BssidChanged { iface, .. }
			| DomainEvent::DaemonDisconnected { iface } => iface,
		}
	}

	pub fn deliver(&self, listener: &dyn DomainEventListener) {
		match self {
			DomainEvent::StateChanged {
				iface,
				new_state,
				bssid,
				network_id,
				ssid,
			} => listener.on_state_changed(iface, *new_state, *bssid, *network_id, ssid),
			DomainEvent::NetworkConnected {
				iface,
				network_id,
				bssid,
				fils_hlp_sent,
			} => listener.on_network_connected(iface, *network_id, *bssid, *fils_hlp_sent),
			DomainEvent::Disconnected {
				iface,
				bssid,
				locally_generated,
				reason_code,
			} => listener.on_disconnected(iface, *bssid, *locally_generated, *reason_code),
			DomainEvent::AssociationRejected {
				iface,
				bssid,
				status_code,
				timed_out,
			} => listener.on_association_rejected(iface, *bssid, *status_code, *timed_out),
			DomainEvent::AuthenticationFailed { iface, kind } => listener.on_authentication_failure(iface, *kind),
			DomainEvent::WpsEvent { iface, kind } => listener.on_wps_event(iface, *kind),
			DomainEvent::DppEvent { iface, kind, payload } => listener.on_dpp_event(iface, *kind, payload),
			DomainEvent::AnqpQueryDone { iface, bssid, elements } => listener.on_anqp_query_done(iface, *bssid, elements),
			DomainEvent::BssidChanged { iface, kind, bssid } => listener.on_bssid_changed(iface, *kind, *bssid),
			DomainEvent::DaemonDisconnected { iface } => listener.on_daemon_disconnected(iface),
		}
	}
}

/// Callback interface version a station interface registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackTier {
	V1_0,
	V1_1,
	V1_2,
	Vendor,
}

impl From<HalTier> for CallbackTier {
	fn from(tier: HalTier) -> Self {
		match tier {
			HalTier::V1_0 => CallbackTier::V1_0,
			HalTier::V1_1 => CallbackTier::V1_1,
			HalTier::V1_2 => CallbackTier::V1_2,
		}
	}
}

/// Station callback, independent of the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StaCallback {
	NetworkAdded(u32),
	NetworkRemoved(u32),
	StateChanged(StateChangedParams),
	Disconnected(DisconnectedParams),
	AssociationRejected(AssociationRejectedParams),
	AuthenticationTimeout(MacBytes),
	BssidChanged(BssidChangedParams),
	EapFailure(Option<i32>),
	WpsSuccess,
	WpsFail(WpsFailParams),
	WpsPbcOverlap,
	AnqpQueryDone(AnqpQueryDoneParams),
	DppConfigReceived(DppConfigReceivedParams),
	DppConfigSent,
	DppProgress(u32),
	DppFailure(u32),
	DppAuthSuccess(bool),
}

fn parse<T: DeserializeOwned>(event: &str, params: &Value) -> Option<T> {
	match serde_json::from_value(params.clone()) {
		Ok(parsed) => Some(parsed),
		Err(err) => {
			warn!(target = "wlanhal.events", event, error = %err, "malformed callback payload");
			None
		}
	}
}

/// Projects a raw event for `tier`; `None` for events the tier does not define.
pub(crate) fn project(tier: CallbackTier, event: &str, params: &Value) -> Option<StaCallback> {
	let projected = match tier {
		CallbackTier::V1_0 => project_v1_0(event, params),
		CallbackTier::V1_1 => project_v1_1(event, params),
		CallbackTier::V1_2 => project_v1_2(event, params),
		CallbackTier::Vendor => project_vendor(event, params),
	};
	if projected.is_none() {
		debug!(target = "wlanhal.events", ?tier, event, "callback not handled at this tier");
	}
	projected
}

fn project_v1_0(event: &str, params: &Value) -> Option<StaCallback> {
	project_common(event, params)
}

fn project_v1_1(event: &str, params: &Value) -> Option<StaCallback> {
	match event {
		method::ON_EAP_FAILURE_1_1 => parse::<EapFailureCodeParams>(event, params).map(|p| StaCallback::EapFailure(Some(p.error_code))),
		_ => project_common(event, params),
	}
}

fn project_v1_2(event: &str, params: &Value) -> Option<StaCallback> {
	match event {
		method::ON_EAP_FAILURE_1_1 => parse::<EapFailureCodeParams>(event, params).map(|p| StaCallback::EapFailure(Some(p.error_code))),
		method::ON_DPP_SUCCESS_CONFIG_RECEIVED => parse(event, params).map(StaCallback::DppConfigReceived),
		method::ON_DPP_SUCCESS_CONFIG_SENT => Some(StaCallback::DppConfigSent),
		method::ON_DPP_PROGRESS => parse::<DppCodeParams>(event, params).map(|p| StaCallback::DppProgress(p.code)),
		method::ON_DPP_FAILURE => parse::<DppCodeParams>(event, params).map(|p| StaCallback::DppFailure(p.code)),
		method::ON_DPP_AUTH_SUCCESS => parse::<DppAuthSuccessParams>(event, params).map(|p| StaCallback::DppAuthSuccess(p.initiator)),
		_ => project_common(event, params),
	}
}

fn project_vendor(event: &str, params: &Value) -> Option<StaCallback> {
	match event {
		method::ON_VENDOR_STATE_CHANGED => parse(event, params).map(StaCallback::StateChanged),
		_ => None,
	}
}

/// Callbacks every tier defines.
fn project_common(event: &str, params: &Value) -> Option<StaCallback> {
	match event {
		method::ON_NETWORK_ADDED => parse::<NetworkEventParams>(event, params).map(|p| StaCallback::NetworkAdded(p.id)),
		method::ON_NETWORK_REMOVED => parse::<NetworkEventParams>(event, params).map(|p| StaCallback::NetworkRemoved(p.id)),
		method::ON_STATE_CHANGED => parse(event, params).map(StaCallback::StateChanged),
		method::ON_DISCONNECTED => parse(event, params).map(StaCallback::Disconnected),
		method::ON_ASSOCIATION_REJECTED => parse(event, params).map(StaCallback::AssociationRejected),
		method::ON_AUTHENTICATION_TIMEOUT => parse::<BssidEventParams>(event, params).map(|p| StaCallback::AuthenticationTimeout(p.bssid)),
		method::ON_BSSID_CHANGED => parse(event, params).map(StaCallback::BssidChanged),
		method::ON_EAP_FAILURE => Some(StaCallback::EapFailure(None)),
		method::ON_WPS_EVENT_SUCCESS => Some(StaCallback::WpsSuccess),
		method::ON_WPS_EVENT_FAIL => parse(event, params).map(StaCallback::WpsFail),
		method::ON_WPS_EVENT_PBC_OVERLAP => Some(StaCallback::WpsPbcOverlap),
		method::ON_ANQP_QUERY_DONE => parse(event, params).map(StaCallback::AnqpQueryDone),
		_ => None,
	}
}

/// Applies a callback to `slot` and returns the events to publish.
pub(crate) fn dispatch(slot: &mut InterfaceSlot, callback: StaCallback) -> Vec<DomainEvent> {
	let iface = slot.name.clone();
	let is_wep = slot.session.current_config().is_some_and(NetworkConfig::is_wep);
	let uses_sae = slot.session.current_config().is_some_and(NetworkConfig::uses_sae);
	let wrong_password = |iface: String| DomainEvent::AuthenticationFailed {
		iface,
		kind: AuthFailureKind::WrongPassword,
	};

	match callback {
		StaCallback::NetworkAdded(id) => {
			debug!(target = "wlanhal.events", iface = %iface, id, "network added");
			Vec::new()
		}
		StaCallback::NetworkRemoved(id) => {
			debug!(target = "wlanhal.events", iface = %iface, id, "network removed");
			slot.fourway = false;
			Vec::new()
		}
		StaCallback::StateChanged(params) => {
			let new_state = SupplicantState::from_code(params.new_state);
			slot.fourway = new_state == SupplicantState::FourWayHandshake;
			if slot.session.promote_linked(params.id) {
				info!(target = "wlanhal.events", iface = %iface, daemon_id = params.id, "roamed to linked network");
			}
			let network_id = slot.session.current_network_id().unwrap_or(NetworkConfig::INVALID_NETWORK_ID);
			let bssid = MacAddress(params.bssid);
			let mut events = Vec::with_capacity(2);
			if new_state == SupplicantState::Completed {
				events.push(DomainEvent::NetworkConnected {
					iface: iface.clone(),
					network_id,
					bssid,
					fils_hlp_sent: params.fils_hlp_sent,
				});
			}
			events.push(DomainEvent::StateChanged {
				iface,
				new_state,
				bssid,
				network_id,
				ssid: params.ssid,
			});
			events
		}
		StaCallback::Disconnected(params) => {
			if is_wep {
				return vec![wrong_password(iface)];
			}
			let mut events = Vec::with_capacity(2);
			if slot.fourway && !(params.locally_generated && params.reason_code == REASON_IE_IN_4WAY_DIFFERS) {
				events.push(wrong_password(iface.clone()));
			}
			events.push(DomainEvent::Disconnected {
				iface,
				bssid: MacAddress(params.bssid),
				locally_generated: params.locally_generated,
				reason_code: params.reason_code,
			});
			events
		}
		StaCallback::AssociationRejected(params) => {
			if is_wep || (uses_sae && params.status_code == STATUS_UNSPECIFIED_FAILURE) {
				return vec![wrong_password(iface)];
			}
			vec![DomainEvent::AssociationRejected {
				iface,
				bssid: MacAddress(params.bssid),
				status_code: params.status_code,
				timed_out: params.timed_out,
			}]
		}
		StaCallback::AuthenticationTimeout(_) => vec![DomainEvent::AuthenticationFailed {
			iface,
			kind: AuthFailureKind::Timeout,
		}],
		StaCallback::EapFailure(code) => vec![DomainEvent::AuthenticationFailed {
			iface,
			kind: code.map_or(AuthFailureKind::EapFailure, AuthFailureKind::EapFailureWithCode),
		}],
		StaCallback::BssidChanged(params) => {
			let kind = match params.reason {
				bssid_change::ASSOC_START => BssidChangeKind::Target,
				bssid_change::ASSOC_COMPLETE => BssidChangeKind::Associated,
				_ => return Vec::new(),
			};
			vec![DomainEvent::BssidChanged {
				iface,
				kind,
				bssid: MacAddress(params.bssid),
			}]
		}
		StaCallback::WpsSuccess => vec![DomainEvent::WpsEvent {
			iface,
			kind: WpsEventKind::Success,
		}],
		StaCallback::WpsFail(params) => {
			let kind = if params.config_error == wps::CONFIG_ERROR_MSG_TIMEOUT && params.error_ind == wps::ERROR_IND_NO_ERROR {
				WpsEventKind::Timeout
			} else {
				WpsEventKind::Failure {
					config_error: params.config_error,
					error_ind: params.error_ind,
				}
			};
			vec![DomainEvent::WpsEvent { iface, kind }]
		}
		StaCallback::WpsPbcOverlap => vec![DomainEvent::WpsEvent {
			iface,
			kind: WpsEventKind::PbcOverlap,
		}],
		StaCallback::AnqpQueryDone(params) => vec![DomainEvent::AnqpQueryDone {
			iface,
			bssid: MacAddress(params.bssid),
			elements: params.elements,
		}],
		StaCallback::DppConfigReceived(params) => {
			let event = match dpp_network_config(&params) {
				Some(config) => DomainEvent::DppEvent {
					iface,
					kind: DppEventKind::ConfigReceived,
					payload: DppPayload::Config(config),
				},
				None => {
					warn!(target = "wlanhal.events", iface = %iface, akm = params.security_akm, "unsupported DPP security AKM");
					DomainEvent::DppEvent {
						iface,
						kind: DppEventKind::Failure,
						payload: DppPayload::Code(dpp::failure::NOT_SUPPORTED),
					}
				}
			};
			vec![event]
		}
		StaCallback::DppConfigSent => vec![DomainEvent::DppEvent {
			iface,
			kind: DppEventKind::ConfigSent,
			payload: DppPayload::None,
		}],
		StaCallback::DppProgress(code) => vec![DomainEvent::DppEvent {
			iface,
			kind: DppEventKind::Progress,
			payload: DppPayload::Code(code),
		}],
		StaCallback::DppFailure(code) => vec![DomainEvent::DppEvent {
			iface,
			kind: DppEventKind::Failure,
			payload: DppPayload::Code(code),
		}],
		StaCallback::DppAuthSuccess(initiator) => vec![DomainEvent::DppEvent {
			iface,
			kind: DppEventKind::AuthSuccess,
			payload: DppPayload::Initiator(initiator),
		}],
	}
}

/// Network received through DPP; `None` for AKMs this layer cannot configure.
fn dpp_network_config(params: &DppConfigReceivedParams) -> Option<NetworkConfig> {
	let key_mgmt = match params.security_akm {
		dpp::akm::SAE => BTreeSet::from([KeyMgmt::Sae]),
		dpp::akm::PSK_SAE => BTreeSet::from([KeyMgmt::WpaPsk, KeyMgmt::Sae]),
		dpp::akm::PSK => BTreeSet::from([KeyMgmt::WpaPsk]),
		_ => return None,
	};
	let psk = if !params.password.is_empty() {
		params.password.clone()
	} else {
		params.psk.iter().map(|byte| format!("{byte:02x}")).collect()
	};
	let mut config = NetworkConfig::wpa_psk(NetworkConfig::INVALID_NETWORK_ID, params.ssid.clone(), psk);
	config.require_pmf = key_mgmt.contains(&KeyMgmt::Sae);
	config.key_mgmt = key_mgmt;
	Some(config)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn slot() -> InterfaceSlot {
		let mut slot = InterfaceSlot::new("wlan0");
		slot.state = crate::session::IfaceState::Ready;
		slot
	}

	#[test]
	fn tiers_only_project_their_own_callbacks() {
		let dpp = json!({"code": 1});
		assert!(project(CallbackTier::V1_0, method::ON_DPP_PROGRESS, &dpp).is_none());
		assert_eq!(project(CallbackTier::V1_2, method::ON_DPP_PROGRESS, &dpp), Some(StaCallback::DppProgress(1)));

		let eap = json!({"errorCode": 32763});
		assert!(project(CallbackTier::V1_0, method::ON_EAP_FAILURE_1_1, &eap).is_none());
		assert_eq!(project(CallbackTier::V1_1, method::ON_EAP_FAILURE_1_1, &eap), Some(StaCallback::EapFailure(Some(32763))));

		let disconnect = json!({"bssid": [0, 0, 0, 0, 0, 1], "locallyGenerated": false, "reasonCode": 3});
		assert!(project(CallbackTier::Vendor, method::ON_DISCONNECTED, &disconnect).is_none());
		assert!(matches!(project(CallbackTier::V1_2, method::ON_DISCONNECTED, &disconnect), Some(StaCallback::Disconnected(_))));
	}

	#[test]
	fn malformed_payload_is_dropped() {
		assert!(project(CallbackTier::V1_2, method::ON_STATE_CHANGED, &json!({"newState": "nine"})).is_none());
	}

	#[test]
	fn fourway_flag_tracks_state_and_removal() {
		let mut slot = slot();
		let state = |code| StaCallback::StateChanged(StateChangedParams {
			new_state: code,
			bssid: [0; 6],
			id: 0,
			ssid: Vec::new(),
			fils_hlp_sent: false,
		});

		dispatch(&mut slot, state(7));
		assert!(slot.fourway);
		dispatch(&mut slot, StaCallback::NetworkRemoved(0));
		assert!(!slot.fourway);
		dispatch(&mut slot, state(7));
		dispatch(&mut slot, state(8));
		assert!(!slot.fourway);
	}

	#[test]
	fn disconnect_during_fourway_adds_wrong_password() {
		let mut slot = slot();
		slot.fourway = true;
		let events = dispatch(
			&mut slot,
			StaCallback::Disconnected(DisconnectedParams {
				bssid: [1; 6],
				locally_generated: false,
				reason_code: 15,
			}),
		);
		assert_eq!(events.len(), 2);
		assert!(matches!(events[0], DomainEvent::AuthenticationFailed { kind: AuthFailureKind::WrongPassword, .. }));
		assert!(matches!(events[1], DomainEvent::Disconnected { reason_code: 15, .. }));
	}

	#[test]
	fn local_ie_mismatch_during_fourway_is_not_a_password_failure() {
		let mut slot = slot();
		slot.fourway = true;
		let events = dispatch(
			&mut slot,
			StaCallback::Disconnected(DisconnectedParams {
				bssid: [1; 6],
				locally_generated: true,
				reason_code: REASON_IE_IN_4WAY_DIFFERS,
			}),
		);
		assert_eq!(events.len(), 1);
		assert!(matches!(events[0], DomainEvent::Disconnected { .. }));
	}

	#[test]
	fn completed_state_reports_connection_first() {
		let mut slot = slot();
		let events = dispatch(
			&mut slot,
			StaCallback::StateChanged(StateChangedParams {
				new_state: 9,
				bssid: [2; 6],
				id: 4,
				ssid: b"home".to_vec(),
				fils_hlp_sent: true,
			}),
		);
		assert_eq!(
			events,
			vec![
				DomainEvent::NetworkConnected {
					iface: "wlan0".into(),
					network_id: -1,
					bssid: MacAddress([2; 6]),
					fils_hlp_sent: true,
				},
				DomainEvent::StateChanged {
					iface: "wlan0".into(),
					new_state: SupplicantState::Completed,
					bssid: MacAddress([2; 6]),
					network_id: -1,
					ssid: b"home".to_vec(),
				},
			]
		);
	}

	#[test]
	fn wps_timeout_is_recognized() {
		let mut slot = slot();
		let timeout = dispatch(
			&mut slot,
			StaCallback::WpsFail(WpsFailParams {
				bssid: [0; 6],
				config_error: wps::CONFIG_ERROR_MSG_TIMEOUT,
				error_ind: wps::ERROR_IND_NO_ERROR,
			}),
		);
		assert!(matches!(timeout[0], DomainEvent::WpsEvent { kind: WpsEventKind::Timeout, .. }));

		let failure = dispatch(
			&mut slot,
			StaCallback::WpsFail(WpsFailParams {
				bssid: [0; 6],
				config_error: wps::CONFIG_ERROR_MSG_TIMEOUT,
				error_ind: 1,
			}),
		);
		assert!(matches!(failure[0], DomainEvent::WpsEvent { kind: WpsEventKind::Failure { error_ind: 1, .. }, .. }));
	}

	#[test]
	fn dpp_config_maps_supported_akms() {
		let mut slot = slot();
		let received = |akm| {
			StaCallback::DppConfigReceived(DppConfigReceivedParams {
				ssid: b"guest".to_vec(),
				password: "secret123".into(),
				psk: Vec::new(),
				security_akm: akm,
			})
		};

		let events = dispatch(&mut slot, received(dpp::akm::PSK_SAE));
		let DomainEvent::DppEvent {
			kind: DppEventKind::ConfigReceived,
			payload: DppPayload::Config(config),
			..
		} = &events[0]
		else {
			panic!("expected DPP config, got {events:?}");
		};
		assert_eq!(config.key_mgmt, BTreeSet::from([KeyMgmt::WpaPsk, KeyMgmt::Sae]));
		assert_eq!(config.psk.as_deref(), Some("secret123"));

		let events = dispatch(&mut slot, received(dpp::akm::DPP));
		assert_eq!(
			events[0],
			DomainEvent::DppEvent {
				iface: "wlan0".into(),
				kind: DppEventKind::Failure,
				payload: DppPayload::Code(dpp::failure::NOT_SUPPORTED),
			}
		);
	}

	#[test]
	fn dpp_raw_psk_is_hex_encoded() {
		let config = dpp_network_config(&DppConfigReceivedParams {
			ssid: b"iot".to_vec(),
			password: String::new(),
			psk: vec![0xab, 0x01],
			security_akm: dpp::akm::PSK,
		})
		.unwrap();
		assert_eq!(config.psk.as_deref(), Some("ab01"));
		assert!(!config.require_pmf);
	}

	#[test]
	fn bssid_change_reasons() {
		let mut slot = slot();
		let changed = |reason| StaCallback::BssidChanged(BssidChangedParams { reason, bssid: [3; 6] });
		assert!(matches!(
			dispatch(&mut slot, changed(bssid_change::ASSOC_START))[0],
			DomainEvent::BssidChanged { kind: BssidChangeKind::Target, .. }
		));
		assert!(matches!(
			dispatch(&mut slot, changed(bssid_change::ASSOC_COMPLETE))[0],
			DomainEvent::BssidChanged { kind: BssidChangeKind::Associated, .. }
		));
		assert!(dispatch(&mut slot, changed(bssid_change::DISASSOC)).is_empty());
	}

	#[derive(Default)]
	struct Collect(parking_lot::Mutex<Vec<String>>);

	impl DomainEventListener for Collect {
		fn on_daemon_disconnected(&self, iface: &str) {
			self.0.lock().push(iface.to_string());
		}
	}

	#[test]
	fn deliver_routes_to_matching_method() {
		let listener = Collect::default();
		DomainEvent::DaemonDisconnected { iface: "wlan1".into() }.deliver(&listener);
		DomainEvent::WpsEvent {
			iface: "wlan1".into(),
			kind: WpsEventKind::Success,
		}
		.deliver(&listener);
		assert_eq!(*listener.0.lock(), vec!["wlan1".to_string()]);
	}
}

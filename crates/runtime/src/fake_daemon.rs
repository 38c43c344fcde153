//! Scripted in-memory daemon for exercising the session layer without radios.
//!
//! [`FakeDaemonBuilder::build`] returns [`TransportParts`] for a
//! [`Connection`](crate::Connection) plus a [`FakeDaemon`] controller. The fake
//! plays the service manager, the supplicant (optionally with a vendor
//! extension) and hostapd. Every request is recorded; failures can be injected
//! per method; callbacks and death notifications are emitted on demand.
//!
//! Handle naming used by the fake:
//!
//! | object | handle |
//! |---|---|
//! | service manager | `service_manager` |
//! | supplicant / vendor | `supplicant` / `supplicant_vendor` |
//! | hostapd / vendor | `hostapd` / `hostapd_vendor` |
//! | station interface | `sta_iface/<name>` |
//! | vendor station interface | `vendor_sta_iface/<name>` |
//! | network | `sta_network/<iface>/<id>` |

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use wlanhal_protocol::consts::key_mgmt;
use wlanhal_protocol::method::{self, SERVICE_MANAGER_HANDLE};
use wlanhal_protocol::{
	AddAccessPointParams, DaemonStatus, EnableParams, HalTier, IfaceInfo, IfaceType, InterfaceParams, LinkToDeathParams, NetworkIdParam,
	RegisterCallbackParams, RemoveAccessPointParams, Request, ServiceKind, ServiceQuery, StatusCode, TransportKind,
};

use crate::error::Result;
use crate::transport::{Transport, TransportParts, TransportReceiver};

pub const SUPPLICANT_HANDLE: &str = "supplicant";
pub const SUPPLICANT_VENDOR_HANDLE: &str = "supplicant_vendor";
pub const HOSTAPD_HANDLE: &str = "hostapd";
pub const HOSTAPD_VENDOR_HANDLE: &str = "hostapd_vendor";

pub fn sta_iface_handle(iface: &str) -> String {
	format!("sta_iface/{iface}")
}

pub fn vendor_sta_iface_handle(iface: &str) -> String {
	format!("vendor_sta_iface/{iface}")
}

pub fn sta_network_handle(iface: &str, id: u32) -> String {
	format!("sta_network/{iface}/{id}")
}

/// A request as observed by the fake.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
	pub handle: String,
	pub method: String,
	pub params: Value,
}

/// Daemon-side view of one network entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeNetwork {
	/// Last params pushed per setter method, e.g. `"setSsid" -> {"ssid": [...]}`.
	pub fields: BTreeMap<String, Value>,
	pub enabled: bool,
	pub selected: bool,
}

#[derive(Debug, Clone, Default)]
struct FakeIface {
	networks: BTreeMap<u32, FakeNetwork>,
	next_network_id: u32,
	callback_tier: Option<HalTier>,
	vendor_callback: bool,
}

#[derive(Debug, Clone, Copy)]
enum FailureKind {
	Status(StatusCode),
	DropLink,
}

#[derive(Debug, Clone)]
struct Failure {
	method: String,
	skip: usize,
	remaining: Option<usize>,
	kind: FailureKind,
}

struct FakeState {
	outbound: Option<mpsc::UnboundedSender<Value>>,
	running: bool,
	lazy_start: bool,
	supplicant_tiers: Vec<HalTier>,
	supplicant_vendor: bool,
	hostapd_tiers: Vec<HalTier>,
	hostapd_vendor: bool,
	key_mgmt_mask: u32,
	notifications: Vec<String>,
	links: Vec<(String, u64)>,
	refuse_links: bool,
	ifaces: BTreeMap<String, FakeIface>,
	access_points: BTreeMap<String, AddAccessPointParams>,
	calls: Vec<RecordedCall>,
	failures: Vec<Failure>,
	next_dpp_id: u32,
	queued: Vec<Value>,
}

enum Outcome {
	Reply(StatusCode, Option<Value>),
	Drop,
}

fn ok() -> Outcome {
	Outcome::Reply(StatusCode::Success, None)
}

fn ok_with(result: impl Serialize) -> Outcome {
	Outcome::Reply(StatusCode::Success, serde_json::to_value(result).ok())
}

fn fail(code: StatusCode) -> Outcome {
	Outcome::Reply(code, None)
}

fn parse<T: DeserializeOwned>(params: &Value) -> Option<T> {
	serde_json::from_value(params.clone()).ok()
}

impl FakeState {
	fn emit(&mut self, value: Value) {
		self.queued.push(value);
	}

	fn emit_event(&mut self, handle: &str, event: &str, params: Value) {
		self.emit(json!({ "handle": handle, "method": event, "params": params }));
	}

	fn flush(&mut self) {
		let queued = std::mem::take(&mut self.queued);
		if let Some(outbound) = &self.outbound {
			for value in queued {
				let _ = outbound.send(value);
			}
		}
	}

	fn service_for(&self, fq_name: &str) -> Option<(ServiceKind, HalTier)> {
		let kinds = [ServiceKind::Supplicant, ServiceKind::VendorSupplicant, ServiceKind::Hostapd, ServiceKind::VendorHostapd];
		kinds
			.into_iter()
			.flat_map(|kind| HalTier::DESCENDING.into_iter().map(move |tier| (kind, tier)))
			.find(|(kind, tier)| kind.fq_name(*tier) == fq_name)
	}

	fn declares(&self, kind: ServiceKind, tier: HalTier) -> bool {
		match kind {
			ServiceKind::Supplicant => self.supplicant_tiers.contains(&tier),
			ServiceKind::VendorSupplicant => self.supplicant_vendor && tier == HalTier::V1_0,
			ServiceKind::Hostapd => self.hostapd_tiers.contains(&tier),
			ServiceKind::VendorHostapd => self.hostapd_vendor && tier == HalTier::V1_0,
		}
	}

	fn root_handle(kind: ServiceKind) -> &'static str {
		match kind {
			ServiceKind::Supplicant => SUPPLICANT_HANDLE,
			ServiceKind::VendorSupplicant => SUPPLICANT_VENDOR_HANDLE,
			ServiceKind::Hostapd => HOSTAPD_HANDLE,
			ServiceKind::VendorHostapd => HOSTAPD_VENDOR_HANDLE,
		}
	}

	fn max_supplicant_tier(&self) -> Option<HalTier> {
		self.supplicant_tiers.iter().copied().max()
	}

	fn announce_registrations(&mut self, preexisting: bool) {
		let registered = self.notifications.clone();
		for fq_name in registered {
			let Some((kind, tier)) = self.service_for(&fq_name) else {
				continue;
			};
			if self.declares(kind, tier) {
				self.emit_event(
					SERVICE_MANAGER_HANDLE,
					method::ON_REGISTRATION,
					json!({ "fqName": fq_name, "instance": "default", "preexisting": preexisting }),
				);
			}
		}
	}

	fn die(&mut self) {
		self.running = false;
		let links: Vec<(String, u64)> = self.links.iter().filter(|(handle, _)| handle != SERVICE_MANAGER_HANDLE).cloned().collect();
		self.links.retain(|(handle, _)| handle == SERVICE_MANAGER_HANDLE);
		for (handle, cookie) in links {
			self.emit_event(&handle, method::ON_SERVICE_DIED, json!({ "cookie": cookie }));
		}
		self.ifaces.clear();
		self.access_points.clear();
	}

	fn injected_failure(&mut self, method: &str) -> Option<FailureKind> {
		let failure = self.failures.iter_mut().find(|failure| failure.method == method)?;
		if failure.skip > 0 {
			failure.skip -= 1;
			return None;
		}
		let kind = failure.kind;
		if let Some(remaining) = failure.remaining.as_mut() {
			*remaining -= 1;
			if *remaining == 0 {
				self.failures.retain(|failure| failure.method != method || failure.remaining != Some(0));
			}
		}
		Some(kind)
	}

	fn handle(&mut self, request: &Request) -> Outcome {
		self.calls.push(RecordedCall {
			handle: request.handle.clone(),
			method: request.method.clone(),
			params: request.params.clone(),
		});

		match self.injected_failure(&request.method) {
			Some(FailureKind::Status(code)) => return fail(code),
			Some(FailureKind::DropLink) => return Outcome::Drop,
			None => {}
		}

		if request.method == method::LINK_TO_DEATH {
			let Some(LinkToDeathParams { cookie }) = parse(&request.params) else {
				return fail(StatusCode::FailureArgsInvalid);
			};
			if self.refuse_links {
				return ok_with(json!({ "linked": false }));
			}
			self.links.push((request.handle.clone(), cookie));
			return ok_with(json!({ "linked": true }));
		}

		let handle = request.handle.as_str();
		if handle == SERVICE_MANAGER_HANDLE {
			return self.service_manager(request);
		}
		if !self.running {
			return fail(StatusCode::FailureUnknown);
		}
		match handle {
			SUPPLICANT_HANDLE => self.supplicant(request),
			SUPPLICANT_VENDOR_HANDLE => self.supplicant_vendor(request),
			HOSTAPD_HANDLE | HOSTAPD_VENDOR_HANDLE => self.hostapd(request),
			_ => {
				if let Some(iface) = handle.strip_prefix("sta_iface/") {
					self.sta_iface(iface, request)
				} else if let Some(iface) = handle.strip_prefix("vendor_sta_iface/") {
					self.vendor_sta_iface(iface, request)
				} else if let Some(rest) = handle.strip_prefix("sta_network/") {
					let Some((iface, id)) = rest.rsplit_once('/') else {
						return fail(StatusCode::FailureNetworkInvalid);
					};
					let Ok(id) = id.parse::<u32>() else {
						return fail(StatusCode::FailureNetworkInvalid);
					};
					self.sta_network(iface, id, request)
				} else {
					fail(StatusCode::FailureUnknown)
				}
			}
		}
	}

	fn service_manager(&mut self, request: &Request) -> Outcome {
		let Some(ServiceQuery { fq_name, .. }) = parse(&request.params) else {
			return fail(StatusCode::FailureArgsInvalid);
		};
		let service = self.service_for(&fq_name).filter(|(kind, tier)| self.declares(*kind, *tier));
		match request.method.as_str() {
			method::GET_TRANSPORT => {
				let transport = if service.is_some() { TransportKind::Hwbinder } else { TransportKind::Empty };
				ok_with(json!({ "transport": transport }))
			}
			method::REGISTER_FOR_NOTIFICATIONS => {
				self.notifications.push(fq_name.clone());
				if self.running && service.is_some() {
					self.emit_event(
						SERVICE_MANAGER_HANDLE,
						method::ON_REGISTRATION,
						json!({ "fqName": fq_name, "instance": "default", "preexisting": true }),
					);
				}
				ok()
			}
			method::GET_SERVICE => {
				let Some((kind, _)) = service else {
					return fail(StatusCode::ServiceUnavailable);
				};
				if !self.running {
					if !self.lazy_start {
						return fail(StatusCode::ServiceUnavailable);
					}
					self.running = true;
					self.announce_registrations(false);
				}
				ok_with(json!({ "handle": Self::root_handle(kind) }))
			}
			_ => fail(StatusCode::FailureUnknown),
		}
	}

	fn supplicant(&mut self, request: &Request) -> Outcome {
		match request.method.as_str() {
			method::ADD_INTERFACE => {
				let Some(InterfaceParams { name, .. }) = parse(&request.params) else {
					return fail(StatusCode::FailureArgsInvalid);
				};
				let handle = sta_iface_handle(&name);
				if self.ifaces.contains_key(&name) {
					return Outcome::Reply(StatusCode::FailureIfaceExists, Some(json!({ "handle": handle })));
				}
				self.ifaces.insert(name, FakeIface::default());
				ok_with(json!({ "handle": handle }))
			}
			method::REMOVE_INTERFACE => {
				let Some(InterfaceParams { name, .. }) = parse(&request.params) else {
					return fail(StatusCode::FailureArgsInvalid);
				};
				match self.ifaces.remove(&name) {
					Some(_) => ok(),
					None => fail(StatusCode::FailureIfaceUnknown),
				}
			}
			method::LIST_INTERFACES => {
				let interfaces: Vec<IfaceInfo> = self
					.ifaces
					.keys()
					.map(|name| IfaceInfo {
						name: name.clone(),
						kind: IfaceType::Sta,
					})
					.collect();
				ok_with(json!({ "interfaces": interfaces }))
			}
			method::GET_INTERFACE => {
				let Some(InterfaceParams { name, .. }) = parse(&request.params) else {
					return fail(StatusCode::FailureArgsInvalid);
				};
				if self.ifaces.contains_key(&name) {
					ok_with(json!({ "handle": sta_iface_handle(&name) }))
				} else {
					fail(StatusCode::FailureIfaceUnknown)
				}
			}
			method::SET_DEBUG_PARAMS => ok(),
			method::TERMINATE => {
				self.die();
				ok()
			}
			_ => fail(StatusCode::FailureUnknown),
		}
	}

	fn supplicant_vendor(&mut self, request: &Request) -> Outcome {
		match request.method.as_str() {
			method::GET_VENDOR_INTERFACE => {
				let Some(InterfaceParams { name, .. }) = parse(&request.params) else {
					return fail(StatusCode::FailureArgsInvalid);
				};
				if self.ifaces.contains_key(&name) {
					ok_with(json!({ "handle": vendor_sta_iface_handle(&name) }))
				} else {
					fail(StatusCode::FailureIfaceUnknown)
				}
			}
			_ => fail(StatusCode::FailureUnknown),
		}
	}

	fn sta_iface(&mut self, name: &str, request: &Request) -> Outcome {
		let max_tier = self.max_supplicant_tier();
		let key_mgmt_mask = self.key_mgmt_mask;
		let next_dpp_id = self.next_dpp_id;
		let Some(iface) = self.ifaces.get_mut(name) else {
			return fail(StatusCode::FailureIfaceInvalid);
		};
		match request.method.as_str() {
			method::REGISTER_CALLBACK => {
				let Some(RegisterCallbackParams { tier }) = parse(&request.params) else {
					return fail(StatusCode::FailureArgsInvalid);
				};
				iface.callback_tier = Some(tier);
				ok()
			}
			method::ADD_NETWORK => {
				let id = iface.next_network_id;
				iface.next_network_id += 1;
				iface.networks.insert(id, FakeNetwork::default());
				ok_with(json!({ "handle": sta_network_handle(name, id), "id": id }))
			}
			method::REMOVE_NETWORK => {
				let Some(NetworkIdParam { id }) = parse(&request.params) else {
					return fail(StatusCode::FailureArgsInvalid);
				};
				match iface.networks.remove(&id) {
					Some(_) => ok(),
					None => fail(StatusCode::FailureNetworkUnknown),
				}
			}
			method::LIST_NETWORKS => {
				let ids: Vec<u32> = iface.networks.keys().copied().collect();
				ok_with(json!({ "ids": ids }))
			}
			method::GET_NETWORK => {
				let Some(NetworkIdParam { id }) = parse(&request.params) else {
					return fail(StatusCode::FailureArgsInvalid);
				};
				if iface.networks.contains_key(&id) {
					ok_with(json!({ "handle": sta_network_handle(name, id), "id": id }))
				} else {
					fail(StatusCode::FailureNetworkUnknown)
				}
			}
			method::REASSOCIATE | method::RECONNECT | method::DISCONNECT | method::CANCEL_WPS | method::START_WPS_PBC => ok(),
			method::START_WPS_PIN_DISPLAY => ok_with(json!({ "pin": "12345670" })),
			method::GET_KEY_MGMT_CAPABILITIES => {
				if max_tier == Some(HalTier::V1_2) {
					ok_with(json!({ "mask": key_mgmt_mask }))
				} else {
					fail(StatusCode::FailureUnsupported)
				}
			}
			method::ADD_DPP_PEER_URI => {
				self.next_dpp_id = next_dpp_id + 1;
				ok_with(json!({ "id": next_dpp_id }))
			}
			method::REMOVE_DPP_URI | method::START_DPP_CONFIGURATOR_INITIATOR | method::START_DPP_ENROLLEE_INITIATOR | method::STOP_DPP_INITIATOR => ok(),
			_ => fail(StatusCode::FailureUnknown),
		}
	}

	fn vendor_sta_iface(&mut self, name: &str, request: &Request) -> Outcome {
		let Some(iface) = self.ifaces.get_mut(name) else {
			return fail(StatusCode::FailureIfaceInvalid);
		};
		match request.method.as_str() {
			method::REGISTER_VENDOR_CALLBACK => {
				iface.vendor_callback = true;
				ok()
			}
			_ => fail(StatusCode::FailureUnknown),
		}
	}

	fn sta_network(&mut self, name: &str, id: u32, request: &Request) -> Outcome {
		let Some(iface) = self.ifaces.get_mut(name) else {
			return fail(StatusCode::FailureIfaceInvalid);
		};
		if !iface.networks.contains_key(&id) {
			return fail(StatusCode::FailureNetworkInvalid);
		}
		match request.method.as_str() {
			method::SELECT => {
				for (other, network) in iface.networks.iter_mut() {
					network.selected = *other == id;
				}
				ok()
			}
			method::ENABLE => {
				let Some(EnableParams { .. }) = parse::<EnableParams>(&request.params) else {
					return fail(StatusCode::FailureArgsInvalid);
				};
				if let Some(network) = iface.networks.get_mut(&id) {
					network.enabled = true;
				}
				ok()
			}
			setter if setter.starts_with("set") => {
				if let Some(network) = iface.networks.get_mut(&id) {
					network.fields.insert(setter.to_string(), request.params.clone());
				}
				ok()
			}
			_ => fail(StatusCode::FailureUnknown),
		}
	}

	fn hostapd(&mut self, request: &Request) -> Outcome {
		match request.method.as_str() {
			method::ADD_ACCESS_POINT => {
				let Some(params) = parse::<AddAccessPointParams>(&request.params) else {
					return fail(StatusCode::FailureArgsInvalid);
				};
				self.access_points.insert(params.iface_params.iface_name.clone(), params);
				ok()
			}
			method::REMOVE_ACCESS_POINT => {
				let Some(RemoveAccessPointParams { iface_name }) = parse(&request.params) else {
					return fail(StatusCode::FailureArgsInvalid);
				};
				match self.access_points.remove(&iface_name) {
					Some(_) => ok(),
					None => fail(StatusCode::FailureIfaceUnknown),
				}
			}
			method::REGISTER_CALLBACK => ok(),
			method::TERMINATE => {
				self.die();
				ok()
			}
			_ => fail(StatusCode::FailureUnknown),
		}
	}
}

/// Builder for [`FakeDaemon`] instances.
pub struct FakeDaemonBuilder {
	running: bool,
	lazy_start: bool,
	supplicant_tiers: Vec<HalTier>,
	supplicant_vendor: bool,
	hostapd_tiers: Vec<HalTier>,
	hostapd_vendor: bool,
	key_mgmt_mask: u32,
}

impl FakeDaemonBuilder {
	/// A running supplicant declaring every tier, with SAE and OWE support.
	pub fn new() -> Self {
		Self {
			running: true,
			lazy_start: false,
			supplicant_tiers: HalTier::DESCENDING.to_vec(),
			supplicant_vendor: false,
			hostapd_tiers: HalTier::DESCENDING.to_vec(),
			hostapd_vendor: false,
			key_mgmt_mask: key_mgmt::WPA_PSK | key_mgmt::SAE | key_mgmt::OWE,
		}
	}

	/// Declares supplicant tiers up to and including `max`.
	pub fn supplicant_tier(mut self, max: HalTier) -> Self {
		self.supplicant_tiers = HalTier::DESCENDING.into_iter().filter(|tier| *tier <= max).collect();
		self
	}

	/// Declares hostapd tiers up to and including `max`.
	pub fn hostapd_tier(mut self, max: HalTier) -> Self {
		self.hostapd_tiers = HalTier::DESCENDING.into_iter().filter(|tier| *tier <= max).collect();
		self
	}

	pub fn with_vendor(mut self) -> Self {
		self.supplicant_vendor = true;
		self.hostapd_vendor = true;
		self
	}

	pub fn key_mgmt_mask(mut self, mask: u32) -> Self {
		self.key_mgmt_mask = mask;
		self
	}

	/// Daemon starts stopped; `lazy` lets `getService` start it.
	pub fn stopped(mut self, lazy: bool) -> Self {
		self.running = false;
		self.lazy_start = lazy;
		self
	}

	pub fn build(self) -> (TransportParts, FakeDaemon) {
		let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
		let (message_tx, message_rx) = mpsc::unbounded_channel();

		let state = Arc::new(Mutex::new(FakeState {
			outbound: Some(inbound_tx),
			running: self.running,
			lazy_start: self.lazy_start,
			supplicant_tiers: self.supplicant_tiers,
			supplicant_vendor: self.supplicant_vendor,
			hostapd_tiers: self.hostapd_tiers,
			hostapd_vendor: self.hostapd_vendor,
			key_mgmt_mask: self.key_mgmt_mask,
			notifications: Vec::new(),
			links: Vec::new(),
			refuse_links: false,
			ifaces: BTreeMap::new(),
			access_points: BTreeMap::new(),
			calls: Vec::new(),
			failures: Vec::new(),
			next_dpp_id: 1,
			queued: Vec::new(),
		}));

		let parts = TransportParts {
			sender: Box::new(FakeSender { state: Arc::clone(&state) }),
			receiver: Box::new(FakeReceiver { inbound_rx, message_tx }),
			message_rx,
		};
		(parts, FakeDaemon { state })
	}
}

impl Default for FakeDaemonBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Controller for a fake daemon.
#[derive(Clone)]
pub struct FakeDaemon {
	state: Arc<Mutex<FakeState>>,
}

impl FakeDaemon {
	/// Fails every call to `method` with `code` until cleared.
	pub fn fail(&self, method: &str, code: StatusCode) {
		self.push_failure(method, 0, None, FailureKind::Status(code));
	}

	/// Fails the next call to `method` with `code`.
	pub fn fail_once(&self, method: &str, code: StatusCode) {
		self.push_failure(method, 0, Some(1), FailureKind::Status(code));
	}

	/// Lets `successes` calls to `method` through, then fails the next one.
	pub fn fail_after(&self, method: &str, successes: usize, code: StatusCode) {
		self.push_failure(method, successes, Some(1), FailureKind::Status(code));
	}

	/// Closes the transport instead of answering the next call to `method`.
	pub fn drop_link_on(&self, method: &str) {
		self.push_failure(method, 0, Some(1), FailureKind::DropLink);
	}

	pub fn clear_failures(&self) {
		self.state.lock().failures.clear();
	}

	/// Makes `linkToDeath` report failure.
	pub fn refuse_death_links(&self, refuse: bool) {
		self.state.lock().refuse_links = refuse;
	}

	fn push_failure(&self, method: &str, skip: usize, remaining: Option<usize>, kind: FailureKind) {
		self.state.lock().failures.push(Failure {
			method: method.to_string(),
			skip,
			remaining,
			kind,
		});
	}

	/// Starts the daemon and notifies every registered watcher.
	pub fn start(&self) {
		let mut state = self.state.lock();
		state.running = true;
		state.announce_registrations(false);
		state.flush();
	}

	/// Kills the daemon: every death link except the service manager's fires.
	pub fn kill(&self) {
		let mut state = self.state.lock();
		state.die();
		state.flush();
	}

	/// Fires death notifications linked on the service manager.
	pub fn kill_service_manager(&self) {
		let mut state = self.state.lock();
		let links: Vec<(String, u64)> = state.links.iter().filter(|(handle, _)| handle == SERVICE_MANAGER_HANDLE).cloned().collect();
		state.links.retain(|(handle, _)| handle != SERVICE_MANAGER_HANDLE);
		state.notifications.clear();
		for (handle, cookie) in links {
			state.emit_event(&handle, method::ON_SERVICE_DIED, json!({ "cookie": cookie }));
		}
		state.flush();
	}

	/// Emits a death notification with an arbitrary cookie on `handle`.
	pub fn emit_death(&self, handle: &str, cookie: u64) {
		self.emit(handle, method::ON_SERVICE_DIED, json!({ "cookie": cookie }));
	}

	/// Emits a raw event.
	pub fn emit(&self, handle: &str, event: &str, params: Value) {
		let mut state = self.state.lock();
		state.emit_event(handle, event, params);
		state.flush();
	}

	/// Emits a station callback for `iface`.
	pub fn emit_sta(&self, iface: &str, event: &str, params: Value) {
		self.emit(&sta_iface_handle(iface), event, params);
	}

	/// Emits a vendor station callback for `iface`.
	pub fn emit_vendor_sta(&self, iface: &str, event: &str, params: Value) {
		self.emit(&vendor_sta_iface_handle(iface), event, params);
	}

	/// Ends the transport as if the daemon socket closed.
	pub fn close(&self) {
		self.state.lock().outbound = None;
	}

	pub fn is_running(&self) -> bool {
		self.state.lock().running
	}

	pub fn calls(&self) -> Vec<RecordedCall> {
		self.state.lock().calls.clone()
	}

	/// Returns and clears the call log.
	pub fn take_calls(&self) -> Vec<RecordedCall> {
		std::mem::take(&mut self.state.lock().calls)
	}

	pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
		self.state.lock().calls.iter().filter(|call| call.method == method).cloned().collect()
	}

	pub fn count(&self, method: &str) -> usize {
		self.state.lock().calls.iter().filter(|call| call.method == method).count()
	}

	pub fn has_interface(&self, iface: &str) -> bool {
		self.state.lock().ifaces.contains_key(iface)
	}

	/// Creates a daemon-side interface the session layer did not add.
	pub fn add_interface(&self, iface: &str) {
		self.state.lock().ifaces.entry(iface.to_string()).or_default();
	}

	pub fn callback_tier(&self, iface: &str) -> Option<HalTier> {
		self.state.lock().ifaces.get(iface).and_then(|iface| iface.callback_tier)
	}

	pub fn vendor_callback_registered(&self, iface: &str) -> bool {
		self.state.lock().ifaces.get(iface).is_some_and(|iface| iface.vendor_callback)
	}

	/// Daemon-side network ids for `iface`, ascending.
	pub fn network_ids(&self, iface: &str) -> Vec<u32> {
		self.state
			.lock()
			.ifaces
			.get(iface)
			.map(|iface| iface.networks.keys().copied().collect())
			.unwrap_or_default()
	}

	pub fn network(&self, iface: &str, id: u32) -> Option<FakeNetwork> {
		self.state.lock().ifaces.get(iface).and_then(|iface| iface.networks.get(&id).cloned())
	}

	/// Adds a daemon-side network entry directly, returning its id.
	pub fn add_network(&self, iface: &str) -> u32 {
		let mut state = self.state.lock();
		let entry = state.ifaces.entry(iface.to_string()).or_default();
		let id = entry.next_network_id;
		entry.next_network_id += 1;
		entry.networks.insert(id, FakeNetwork::default());
		id
	}

	pub fn access_point(&self, iface: &str) -> Option<AddAccessPointParams> {
		self.state.lock().access_points.get(iface).cloned()
	}

	/// Death links currently registered, as `(handle, cookie)`.
	pub fn death_links(&self) -> Vec<(String, u64)> {
		self.state.lock().links.clone()
	}

	/// Fully qualified names watched through `registerForNotifications`.
	pub fn notification_registrations(&self) -> Vec<String> {
		self.state.lock().notifications.clone()
	}
}

struct FakeSender {
	state: Arc<Mutex<FakeState>>,
}

impl Transport for FakeSender {
	fn send(&mut self, message: Value) -> BoxFuture<'_, Result<()>> {
		let state = Arc::clone(&self.state);
		Box::pin(async move {
			let request: Request = serde_json::from_value(message)?;
			let mut state = state.lock();
			match state.handle(&request) {
				Outcome::Reply(code, result) => {
					let response = json!({
						"id": request.id,
						"status": DaemonStatus::from(code),
						"result": result,
					});
					if let Some(outbound) = &state.outbound {
						let _ = outbound.send(response);
					}
					state.flush();
				}
				Outcome::Drop => {
					state.flush();
					state.outbound = None;
				}
			}
			Ok(())
		})
	}
}

struct FakeReceiver {
	inbound_rx: mpsc::UnboundedReceiver<Value>,
	message_tx: mpsc::UnboundedSender<Value>,
}

impl TransportReceiver for FakeReceiver {
	fn run(mut self: Box<Self>) -> BoxFuture<'static, Result<()>> {
		Box::pin(async move {
			while let Some(message) = self.inbound_rx.recv().await {
				if self.message_tx.send(message).is_err() {
					break;
				}
			}
			Ok(())
		})
	}
}

//! Typed proxies over daemon objects.
//!
//! Every daemon-side object (service manager, root service, interface,
//! network, access-point service) is addressed by a handle string on a shared
//! [`Connection`]. The proxies here turn method calls into requests and map
//! replies into [`Error`] variants. Non-success statuses are logged once, here.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use wlanhal_protocol::method::{self, SERVICE_MANAGER_HANDLE};
use wlanhal_protocol::{
	AddAccessPointParams, BssidParam, DebugParams, DppConfiguratorParams, DppEnrolleeParams, EnableParams, FlagParam, HalTier, HandleResult, IdResult,
	IfaceInfo, IfaceType, IndexParam, InterfaceParams, InterfacesResult, KeyMgmtParam, LinkResult, LinkToDeathParams, MaskResult, NetworkHandleResult,
	NetworkIdParam, NetworkIdsResult, PassphraseParam, PinResult, RegisterCallbackParams, RemoveAccessPointParams, ServiceQuery, SsidParam, StatusCode,
	TransportKind, TransportResult, UriParam, WepKeyParam,
};
use wlanhal_runtime::{Connection, Reply};

use crate::error::{Error, Result};
use crate::types::MacAddress;

/// One addressable object on the daemon connection.
#[derive(Clone)]
pub(crate) struct DaemonObject {
	connection: Arc<Connection>,
	handle: Arc<str>,
}

impl std::fmt::Debug for DaemonObject {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("DaemonObject").field(&self.handle).finish()
	}
}

impl DaemonObject {
	pub(crate) fn new(connection: Arc<Connection>, handle: impl Into<Arc<str>>) -> Self {
		Self {
			connection,
			handle: handle.into(),
		}
	}

	pub(crate) fn handle(&self) -> &str {
		&self.handle
	}

	/// A sibling object on the same connection.
	pub(crate) fn child(&self, handle: impl Into<Arc<str>>) -> Self {
		Self::new(Arc::clone(&self.connection), handle)
	}

	/// Sends one request; only link failures and malformed params are errors.
	pub(crate) async fn call(&self, method: &'static str, params: impl Serialize) -> Result<Reply> {
		let params = serde_json::to_value(params)?;
		self.connection
			.send_message(&self.handle, method, params)
			.await
			.map_err(|err| Error::from_runtime(method, err))
	}

	/// Sends one request and turns a failure status into [`Error::DaemonStatus`].
	pub(crate) async fn call_ok(&self, method: &'static str, params: impl Serialize) -> Result<Reply> {
		let reply = self.call(method, params).await?;
		if !reply.is_success() {
			warn!(
				target = "wlanhal.daemon",
				handle = %self.handle,
				method,
				code = %reply.code(),
				message = reply.status.message.as_deref().unwrap_or(""),
				"daemon call failed"
			);
			return Err(Error::DaemonStatus { method, code: reply.code() });
		}
		Ok(reply)
	}

	pub(crate) async fn call_decode<T: DeserializeOwned>(&self, method: &'static str, params: impl Serialize) -> Result<T> {
		let reply = self.call_ok(method, params).await?;
		reply.decode().map_err(|err| Error::from_runtime(method, err))
	}

	/// Registers a death notification for this object.
	///
	/// `Ok(false)` means the daemon refused the link.
	pub(crate) async fn link_to_death(&self, cookie: u64) -> Result<bool> {
		let LinkResult { linked } = self.call_decode(method::LINK_TO_DEATH, LinkToDeathParams { cookie }).await?;
		debug!(target = "wlanhal.death", handle = %self.handle, cookie, linked, "linked to death");
		Ok(linked)
	}
}

fn empty() -> serde_json::Value {
	serde_json::Value::Object(Default::default())
}

/// The discovery surface: `getService`, `getTransport`, `registerForNotifications`.
#[derive(Debug, Clone)]
pub(crate) struct ServiceManagerProxy(DaemonObject);

impl ServiceManagerProxy {
	pub(crate) fn new(connection: Arc<Connection>) -> Self {
		Self(DaemonObject::new(connection, SERVICE_MANAGER_HANDLE))
	}

	pub(crate) fn object(&self) -> &DaemonObject {
		&self.0
	}

	/// Root object for `fq_name`, or `None` while the service is not registered.
	pub(crate) async fn get_service(&self, fq_name: &str, instance: &str) -> Result<Option<DaemonObject>> {
		let query = ServiceQuery {
			fq_name: fq_name.to_string(),
			instance: instance.to_string(),
		};
		let reply = self.0.call(method::GET_SERVICE, &query).await?;
		match reply.code() {
			StatusCode::Success => {
				let HandleResult { handle } = reply.decode().map_err(|err| Error::from_runtime(method::GET_SERVICE, err))?;
				Ok(Some(self.0.child(handle)))
			}
			StatusCode::ServiceUnavailable => {
				debug!(target = "wlanhal.discovery", fq_name, "service not available yet");
				Ok(None)
			}
			code => {
				warn!(target = "wlanhal.discovery", fq_name, code = %code, "getService failed");
				Err(Error::DaemonStatus {
					method: method::GET_SERVICE,
					code,
				})
			}
		}
	}

	pub(crate) async fn get_transport(&self, fq_name: &str, instance: &str) -> Result<TransportKind> {
		let query = ServiceQuery {
			fq_name: fq_name.to_string(),
			instance: instance.to_string(),
		};
		let TransportResult { transport } = self.0.call_decode(method::GET_TRANSPORT, &query).await?;
		Ok(transport)
	}

	pub(crate) async fn register_for_notifications(&self, fq_name: &str, instance: &str) -> Result<()> {
		let query = ServiceQuery {
			fq_name: fq_name.to_string(),
			instance: instance.to_string(),
		};
		self.0.call_ok(method::REGISTER_FOR_NOTIFICATIONS, &query).await.map(drop)
	}
}

/// Root supplicant service.
#[derive(Debug, Clone)]
pub(crate) struct SupplicantProxy(DaemonObject);

impl SupplicantProxy {
	pub(crate) fn new(object: DaemonObject) -> Self {
		Self(object)
	}

	fn iface_params(name: &str) -> InterfaceParams {
		InterfaceParams {
			name: name.to_string(),
			kind: IfaceType::Sta,
		}
	}

	/// Adds a station interface; an interface the daemon already has is returned as-is.
	pub(crate) async fn add_interface(&self, name: &str) -> Result<StaIfaceProxy> {
		let reply = self.0.call(method::ADD_INTERFACE, Self::iface_params(name)).await?;
		match reply.code() {
			StatusCode::Success | StatusCode::FailureIfaceExists => {
				if reply.code() == StatusCode::FailureIfaceExists {
					debug!(target = "wlanhal.sta", iface = name, "interface already exists in daemon");
				}
				match reply.decode::<HandleResult>() {
					Ok(HandleResult { handle }) => Ok(StaIfaceProxy(self.0.child(handle))),
					Err(_) => self.get_interface(name).await,
				}
			}
			code => {
				warn!(target = "wlanhal.sta", iface = name, code = %code, "addInterface failed");
				Err(Error::DaemonStatus {
					method: method::ADD_INTERFACE,
					code,
				})
			}
		}
	}

	pub(crate) async fn remove_interface(&self, name: &str) -> Result<()> {
		self.0.call_ok(method::REMOVE_INTERFACE, Self::iface_params(name)).await.map(drop)
	}

	pub(crate) async fn list_interfaces(&self) -> Result<Vec<IfaceInfo>> {
		let InterfacesResult { interfaces } = self.0.call_decode(method::LIST_INTERFACES, empty()).await?;
		Ok(interfaces)
	}

	pub(crate) async fn get_interface(&self, name: &str) -> Result<StaIfaceProxy> {
		let HandleResult { handle } = self.0.call_decode(method::GET_INTERFACE, Self::iface_params(name)).await?;
		Ok(StaIfaceProxy(self.0.child(handle)))
	}

	pub(crate) async fn set_debug_params(&self, params: DebugParams) -> Result<()> {
		self.0.call_ok(method::SET_DEBUG_PARAMS, params).await.map(drop)
	}

	pub(crate) async fn terminate(&self) -> Result<()> {
		self.0.call_ok(method::TERMINATE, empty()).await.map(drop)
	}
}

/// Vendor extension of the supplicant root service.
#[derive(Debug, Clone)]
pub(crate) struct VendorSupplicantProxy(DaemonObject);

impl VendorSupplicantProxy {
	pub(crate) fn new(object: DaemonObject) -> Self {
		Self(object)
	}

	pub(crate) async fn get_vendor_interface(&self, name: &str) -> Result<VendorStaIfaceProxy> {
		let params = InterfaceParams {
			name: name.to_string(),
			kind: IfaceType::Sta,
		};
		let HandleResult { handle } = self.0.call_decode(method::GET_VENDOR_INTERFACE, params).await?;
		Ok(VendorStaIfaceProxy(self.0.child(handle)))
	}
}

#[derive(Debug, Clone)]
pub(crate) struct VendorStaIfaceProxy(DaemonObject);

impl VendorStaIfaceProxy {
	pub(crate) fn object(&self) -> &DaemonObject {
		&self.0
	}

	pub(crate) async fn register_vendor_callback(&self) -> Result<()> {
		self.0.call_ok(method::REGISTER_VENDOR_CALLBACK, empty()).await.map(drop)
	}
}

/// Station interface.
#[derive(Debug, Clone)]
pub(crate) struct StaIfaceProxy(DaemonObject);

impl StaIfaceProxy {
	pub(crate) fn object(&self) -> &DaemonObject {
		&self.0
	}

	pub(crate) async fn register_callback(&self, tier: HalTier) -> Result<()> {
		self.0.call_ok(method::REGISTER_CALLBACK, RegisterCallbackParams { tier }).await.map(drop)
	}

	pub(crate) async fn add_network(&self) -> Result<StaNetworkProxy> {
		let NetworkHandleResult { handle, id } = self.0.call_decode(method::ADD_NETWORK, empty()).await?;
		Ok(StaNetworkProxy {
			object: self.0.child(handle),
			id,
		})
	}

	pub(crate) async fn remove_network(&self, id: u32) -> Result<()> {
		self.0.call_ok(method::REMOVE_NETWORK, NetworkIdParam { id }).await.map(drop)
	}

	pub(crate) async fn list_networks(&self) -> Result<Vec<u32>> {
		let NetworkIdsResult { ids } = self.0.call_decode(method::LIST_NETWORKS, empty()).await?;
		Ok(ids)
	}

	pub(crate) async fn get_network(&self, id: u32) -> Result<StaNetworkProxy> {
		let NetworkHandleResult { handle, id } = self.0.call_decode(method::GET_NETWORK, NetworkIdParam { id }).await?;
		Ok(StaNetworkProxy {
			object: self.0.child(handle),
			id,
		})
	}

	pub(crate) async fn reassociate(&self) -> Result<()> {
		self.0.call_ok(method::REASSOCIATE, empty()).await.map(drop)
	}

	pub(crate) async fn reconnect(&self) -> Result<()> {
		self.0.call_ok(method::RECONNECT, empty()).await.map(drop)
	}

	pub(crate) async fn disconnect(&self) -> Result<()> {
		self.0.call_ok(method::DISCONNECT, empty()).await.map(drop)
	}

	pub(crate) async fn key_mgmt_capabilities(&self) -> Result<u32> {
		let MaskResult { mask } = self.0.call_decode(method::GET_KEY_MGMT_CAPABILITIES, empty()).await?;
		Ok(mask)
	}

	pub(crate) async fn start_wps_pbc(&self, bssid: MacAddress) -> Result<()> {
		self.0.call_ok(method::START_WPS_PBC, BssidParam { bssid: bssid.octets() }).await.map(drop)
	}

	pub(crate) async fn start_wps_pin_display(&self, bssid: MacAddress) -> Result<String> {
		let PinResult { pin } = self.0.call_decode(method::START_WPS_PIN_DISPLAY, BssidParam { bssid: bssid.octets() }).await?;
		Ok(pin)
	}

	pub(crate) async fn cancel_wps(&self) -> Result<()> {
		self.0.call_ok(method::CANCEL_WPS, empty()).await.map(drop)
	}

	pub(crate) async fn add_dpp_peer_uri(&self, uri: &str) -> Result<u32> {
		let IdResult { id } = self.0.call_decode(method::ADD_DPP_PEER_URI, UriParam { uri: uri.to_string() }).await?;
		Ok(id)
	}

	pub(crate) async fn remove_dpp_uri(&self, id: u32) -> Result<()> {
		self.0.call_ok(method::REMOVE_DPP_URI, IdResult { id }).await.map(drop)
	}

	pub(crate) async fn start_dpp_enrollee_initiator(&self, params: DppEnrolleeParams) -> Result<()> {
		self.0.call_ok(method::START_DPP_ENROLLEE_INITIATOR, params).await.map(drop)
	}

	pub(crate) async fn start_dpp_configurator_initiator(&self, params: DppConfiguratorParams) -> Result<()> {
		self.0.call_ok(method::START_DPP_CONFIGURATOR_INITIATOR, params).await.map(drop)
	}

	pub(crate) async fn stop_dpp_initiator(&self) -> Result<()> {
		self.0.call_ok(method::STOP_DPP_INITIATOR, empty()).await.map(drop)
	}
}

/// One daemon-side network entry.
#[derive(Debug, Clone)]
pub(crate) struct StaNetworkProxy {
	object: DaemonObject,
	id: u32,
}

impl StaNetworkProxy {
	/// Daemon-assigned network id.
	pub(crate) fn id(&self) -> u32 {
		self.id
	}

	pub(crate) async fn set_ssid(&self, ssid: &[u8]) -> Result<()> {
		self.object.call_ok(method::SET_SSID, SsidParam { ssid: ssid.to_vec() }).await.map(drop)
	}

	pub(crate) async fn set_key_mgmt(&self, mask: u32) -> Result<()> {
		self.object.call_ok(method::SET_KEY_MGMT, KeyMgmtParam { mask }).await.map(drop)
	}

	pub(crate) async fn set_psk_passphrase(&self, passphrase: &str) -> Result<()> {
		let params = PassphraseParam {
			passphrase: passphrase.to_string(),
		};
		self.object.call_ok(method::SET_PSK_PASSPHRASE, params).await.map(drop)
	}

	pub(crate) async fn set_wep_key(&self, index: u32, key: &[u8]) -> Result<()> {
		let params = WepKeyParam { index, key: key.to_vec() };
		self.object.call_ok(method::SET_WEP_KEY, params).await.map(drop)
	}

	pub(crate) async fn set_wep_tx_key_idx(&self, index: u32) -> Result<()> {
		self.object.call_ok(method::SET_WEP_TX_KEY_IDX, IndexParam { index }).await.map(drop)
	}

	pub(crate) async fn set_scan_ssid(&self, enable: bool) -> Result<()> {
		self.object.call_ok(method::SET_SCAN_SSID, FlagParam { enable }).await.map(drop)
	}

	pub(crate) async fn set_bssid(&self, bssid: MacAddress) -> Result<()> {
		self.object.call_ok(method::SET_BSSID, BssidParam { bssid: bssid.octets() }).await.map(drop)
	}

	pub(crate) async fn set_require_pmf(&self, enable: bool) -> Result<()> {
		self.object.call_ok(method::SET_REQUIRE_PMF, FlagParam { enable }).await.map(drop)
	}

	pub(crate) async fn enable(&self, no_connect: bool) -> Result<()> {
		self.object.call_ok(method::ENABLE, EnableParams { no_connect }).await.map(drop)
	}

	pub(crate) async fn select(&self) -> Result<()> {
		self.object.call_ok(method::SELECT, empty()).await.map(drop)
	}
}

/// Root hostapd service.
#[derive(Debug, Clone)]
pub(crate) struct HostapdProxy(DaemonObject);

impl HostapdProxy {
	pub(crate) fn new(object: DaemonObject) -> Self {
		Self(object)
	}

	pub(crate) fn object(&self) -> &DaemonObject {
		&self.0
	}

	pub(crate) async fn add_access_point(&self, params: &AddAccessPointParams) -> Result<()> {
		self.0.call_ok(method::ADD_ACCESS_POINT, params).await.map(drop)
	}

	pub(crate) async fn remove_access_point(&self, iface_name: &str) -> Result<()> {
		let params = RemoveAccessPointParams {
			iface_name: iface_name.to_string(),
		};
		self.0.call_ok(method::REMOVE_ACCESS_POINT, params).await.map(drop)
	}

	pub(crate) async fn register_callback(&self, tier: HalTier) -> Result<()> {
		self.0.call_ok(method::REGISTER_CALLBACK, RegisterCallbackParams { tier }).await.map(drop)
	}

	pub(crate) async fn terminate(&self) -> Result<()> {
		self.0.call_ok(method::TERMINATE, empty()).await.map(drop)
	}
}

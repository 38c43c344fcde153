//! Station-mode supplicant HAL.
//!
//! [`SupplicantStaHal`] owns one daemon connection. Every public operation
//! takes the single state lock, runs its daemon calls, and releases the lock
//! before any upstream callback runs. Transport failures from an operation are
//! handled exactly like a death notification for the active epoch.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::MutexGuard;
use tracing::{debug, info, warn};
use wlanhal_protocol::consts::{debug_level, dpp};
use wlanhal_protocol::method::{self, SERVICE_MANAGER_HANDLE};
use wlanhal_protocol::{DebugParams, DppConfiguratorParams, DppEnrolleeParams, Event, HalTier, IfaceType, RegistrationParams, ServiceKind, StatusCode};
use wlanhal_runtime::{Connection, TransportParts};

use crate::capability::{CapabilityProbe, CapabilitySet};
use crate::config::HalConfig;
use crate::death::{DeathEventHandler, DeathSupervisor, DeathWaiters, EpochCookie, UNGUARDED_COOKIE, await_death};
use crate::discovery::ServiceDiscoveryWatcher;
use crate::error::{Error, Result};
use crate::events::{CallbackTier, DomainEventListener, dispatch, project};
use crate::network::NetworkConfigBridge;
use crate::proxy::{DaemonObject, ServiceManagerProxy, StaIfaceProxy, SupplicantProxy, VendorStaIfaceProxy, VendorSupplicantProxy};
use crate::registry::DaemonHandleRegistry;
use crate::session::{IfaceState, InterfaceSessionManager};
use crate::types::{MacAddress, NetworkConfig};
use crate::worker::{DaemonEvent, EventSink, Notifications, Worker};

/// Network role requested from a DPP configurator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DppNetRole {
	Sta,
	Ap,
}

/// Key management a DPP configurator provisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DppAkm {
	Psk,
	PskSae,
	Sae,
	Dpp,
}

/// Arguments of [`SupplicantStaHal::start_dpp_configurator_initiator`].
#[derive(Clone, PartialEq, Eq)]
pub struct DppConfiguratorRequest {
	pub peer_bootstrap_id: u32,
	pub own_bootstrap_id: u32,
	pub ssid: Vec<u8>,
	pub password: String,
	pub psk: String,
	pub net_role: DppNetRole,
	pub akm: DppAkm,
}

impl std::fmt::Debug for DppConfiguratorRequest {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DppConfiguratorRequest")
			.field("peer_bootstrap_id", &self.peer_bootstrap_id)
			.field("own_bootstrap_id", &self.own_bootstrap_id)
			.field("ssid", &String::from_utf8_lossy(&self.ssid))
			.field("net_role", &self.net_role)
			.field("akm", &self.akm)
			.finish_non_exhaustive()
	}
}

impl DppConfiguratorRequest {
	fn into_params(self) -> DppConfiguratorParams {
		DppConfiguratorParams {
			peer_bootstrap_id: self.peer_bootstrap_id,
			own_bootstrap_id: self.own_bootstrap_id,
			ssid: self.ssid,
			password: self.password,
			psk: self.psk,
			net_role: match self.net_role {
				DppNetRole::Sta => dpp::net_role::STA,
				DppNetRole::Ap => dpp::net_role::AP,
			},
			security_akm: match self.akm {
				DppAkm::Psk => dpp::akm::PSK,
				DppAkm::PskSae => dpp::akm::PSK_SAE,
				DppAkm::Sae => dpp::akm::SAE,
				DppAkm::Dpp => dpp::akm::DPP,
			},
		}
	}
}

pub(crate) fn debug_params(verbose: bool) -> DebugParams {
	DebugParams {
		level: if verbose { debug_level::DEBUG } else { debug_level::INFO },
		show_timestamp: false,
		show_keys: false,
	}
}

struct StaState {
	connection: Arc<Connection>,
	config: HalConfig,
	registry: DaemonHandleRegistry,
	supervisor: DeathSupervisor,
	watcher: ServiceDiscoveryWatcher,
	sessions: InterfaceSessionManager,
	listener: Option<Arc<dyn DomainEventListener>>,
}

impl StaState {
	fn new(connection: Arc<Connection>, waiters: DeathWaiters, config: HalConfig) -> Self {
		let watcher = ServiceDiscoveryWatcher::new(ServiceKind::Supplicant, config.instance_name.clone());
		Self {
			connection,
			registry: DaemonHandleRegistry::new(ServiceKind::Supplicant, ServiceKind::VendorSupplicant),
			supervisor: DeathSupervisor::new(waiters),
			watcher,
			sessions: InterfaceSessionManager::new(),
			listener: None,
			config,
		}
	}

	/// Runs the death path for the active epoch.
	fn on_link_failure(&mut self) -> Notifications {
		let verdict = self.supervisor.fail_active_epoch(&mut self.registry, &mut self.sessions);
		let mut notifications = Notifications::default();
		notifications.death(verdict, self.listener.as_ref());
		notifications
	}

	async fn start_watching(&mut self) -> Result<bool> {
		let connection = Arc::clone(&self.connection);
		self.watcher.start_watching(&mut self.registry, connection).await
	}

	async fn on_registration(&mut self, registration: RegistrationParams) -> Notifications {
		if !self.watcher.matches(&registration) {
			debug!(target = "wlanhal.discovery", fq_name = %registration.fq_name, "ignoring unrelated registration");
			return Notifications::default();
		}
		if self.registry.is_daemon_ready() {
			debug!(target = "wlanhal.discovery", "supplicant already initialized");
			return Notifications::default();
		}
		info!(
			target = "wlanhal.discovery",
			fq_name = %registration.fq_name,
			preexisting = registration.preexisting,
			"supplicant registered"
		);
		match self.initialize_daemon().await {
			Ok(()) => Notifications::default(),
			Err(err) => {
				warn!(target = "wlanhal.sta", error = %err, "supplicant initialization failed");
				self.on_link_failure()
			}
		}
	}

	/// Binds the root service under a fresh epoch, then the vendor extension.
	async fn initialize_daemon(&mut self) -> Result<()> {
		let service_manager = self.registry.service_manager().cloned().ok_or(Error::DaemonNotReady)?;
		let instance = self.config.instance_name.clone();
		let tier = CapabilityProbe::detect_tier(&service_manager, ServiceKind::Supplicant, &instance)
			.await?
			.ok_or_else(|| Error::ServiceUnavailable(ServiceKind::Supplicant.fq_name(HalTier::V1_0)))?;

		let cookie = self.supervisor.begin_epoch();
		let root = self.registry.bind(tier, &instance).await?;
		if !self.supervisor.link_for_death(&root, cookie).await? {
			return Err(Error::DeathLinkFailed(root.handle().to_string()));
		}
		self.bind_vendor(&instance).await?;

		if let Err(err) = SupplicantProxy::new(root).set_debug_params(debug_params(self.config.verbose_logging)).await {
			if err.is_transport() {
				return Err(err);
			}
		}
		info!(target = "wlanhal.sta", tier = tier.version(), cookie, vendor = self.registry.has_vendor(), "supplicant initialized");
		Ok(())
	}

	/// Best-effort: only link failures are errors.
	async fn bind_vendor(&mut self, instance: &str) -> Result<()> {
		let vendor = match self.registry.bind_vendor(instance).await {
			Ok(Some(vendor)) => vendor,
			Ok(None) => return Ok(()),
			Err(err) if err.is_transport() => return Err(err),
			Err(err) => {
				warn!(target = "wlanhal.sta", error = %err, "vendor supplicant unavailable");
				return Ok(());
			}
		};
		match vendor.link_to_death(UNGUARDED_COOKIE).await {
			Ok(true) => Ok(()),
			Ok(false) => {
				warn!(target = "wlanhal.death", handle = vendor.handle(), "vendor supplicant refused death link");
				self.registry.invalidate_vendor();
				Ok(())
			}
			Err(err) => Err(err),
		}
	}

	fn on_service_died(&mut self, handle: &str, cookie: EpochCookie) -> Notifications {
		if handle == SERVICE_MANAGER_HANDLE {
			warn!(target = "wlanhal.death", "service manager died");
			let notifications = self.on_link_failure();
			self.registry.unbind_service_manager();
			self.watcher.stop();
			return notifications;
		}
		if cookie == UNGUARDED_COOKIE {
			info!(target = "wlanhal.death", handle, "vendor supplicant died");
			self.registry.invalidate_vendor();
			self.sessions.drop_vendor_handles();
			return Notifications::default();
		}
		let verdict = self.supervisor.on_death_notification(cookie, &mut self.registry, &mut self.sessions);
		let mut notifications = Notifications::default();
		notifications.death(verdict, self.listener.as_ref());
		notifications
	}

	fn on_callback(&mut self, event: Event) -> Notifications {
		let listener = self.listener.clone();
		let Some(slot) = self.sessions.slot_for_handle_mut(&event.handle) else {
			debug!(target = "wlanhal.events", handle = %event.handle, event = %event.method, "callback for untracked handle");
			return Notifications::default();
		};
		let from_vendor = slot.vendor_iface.as_ref().is_some_and(|vendor| vendor.object().handle() == event.handle);
		let tier = if from_vendor {
			CallbackTier::Vendor
		} else {
			match slot.callback_tier {
				Some(tier) => tier,
				None => return Notifications::default(),
			}
		};
		let Some(callback) = project(tier, &event.method, &event.params) else {
			return Notifications::default();
		};
		let events = dispatch(slot, callback);
		let mut notifications = Notifications::default();
		notifications.events(listener.as_ref(), events);
		notifications
	}

	fn root(&self) -> Result<(DaemonObject, HalTier)> {
		match (self.registry.current_handle(), self.registry.tier()) {
			(Some(root), Some(tier)) => Ok((root.clone(), tier)),
			_ => Err(Error::DaemonNotReady),
		}
	}

	async fn setup_interface(&mut self, name: &str) -> Result<()> {
		let (root, tier) = self.root()?;
		self.sessions.begin_add(name)?;
		match self.attach_interface(name, root, tier).await {
			Ok(()) => self.sessions.complete_add(name),
			Err(err) => {
				self.sessions.abort_add(name);
				Err(err)
			}
		}
	}

	async fn attach_interface(&mut self, name: &str, root: DaemonObject, tier: HalTier) -> Result<()> {
		let supplicant = SupplicantProxy::new(root);
		let iface = if tier >= HalTier::V1_1 {
			supplicant.add_interface(name).await?
		} else {
			let listed = supplicant.list_interfaces().await?;
			if !listed.iter().any(|info| info.name == name && info.kind == IfaceType::Sta) {
				warn!(target = "wlanhal.sta", iface = name, "interface not present in daemon");
				return Err(Error::DaemonStatus {
					method: method::GET_INTERFACE,
					code: StatusCode::FailureIfaceUnknown,
				});
			}
			supplicant.get_interface(name).await?
		};

		iface.register_callback(tier).await.map_err(|err| {
			err.map_status(|code| Error::CallbackRegistrationFailed {
				iface: name.to_string(),
				code,
			})
		})?;

		let vendor_iface = match self.registry.vendor_handle().cloned() {
			Some(vendor) => attach_vendor_interface(vendor, name).await?,
			None => None,
		};
		let capabilities = CapabilityProbe::probe(&iface, tier, self.registry.has_vendor()).await?;

		let slot = self.sessions.adding_mut(name)?;
		slot.iface = Some(iface);
		slot.vendor_iface = vendor_iface;
		slot.callback_tier = Some(tier.into());
		slot.capabilities = capabilities;
		Ok(())
	}

	/// Local state is dropped even when the daemon-side removal fails.
	async fn teardown_interface(&mut self, name: &str) -> Result<()> {
		self.sessions.begin_teardown(name)?;
		if let Ok((root, tier)) = self.root() {
			if tier >= HalTier::V1_1 {
				if let Err(err) = SupplicantProxy::new(root).remove_interface(name).await {
					warn!(target = "wlanhal.sta", iface = name, error = %err, "daemon-side interface removal failed; dropping local state");
				}
			}
		}
		self.sessions.finish_teardown(name);
		Ok(())
	}

	fn bridge(&mut self, iface: &str) -> Result<NetworkConfigBridge<'_>> {
		if !self.registry.is_daemon_ready() {
			return Err(Error::DaemonNotReady);
		}
		Ok(NetworkConfigBridge::new(self.sessions.ready_mut(iface)?))
	}

	fn iface(&self, iface: &str) -> Result<StaIfaceProxy> {
		if !self.registry.is_daemon_ready() {
			return Err(Error::DaemonNotReady);
		}
		self.sessions.ready(iface)?.iface().cloned()
	}

	fn dpp_iface(&self, iface: &str) -> Result<StaIfaceProxy> {
		let proxy = self.iface(iface)?;
		if self.registry.tier().is_none_or(|tier| tier < HalTier::V1_2) {
			return Err(Error::Unsupported("DPP requires supplicant HAL 1.2".to_string()));
		}
		Ok(proxy)
	}
}

/// Vendor interface setup is best-effort; only link failures propagate.
async fn attach_vendor_interface(vendor: DaemonObject, name: &str) -> Result<Option<VendorStaIfaceProxy>> {
	let attached = async {
		let vendor_iface = VendorSupplicantProxy::new(vendor).get_vendor_interface(name).await?;
		if !vendor_iface.object().link_to_death(UNGUARDED_COOKIE).await? {
			return Err(Error::DeathLinkFailed(vendor_iface.object().handle().to_string()));
		}
		vendor_iface.register_vendor_callback().await?;
		Ok::<_, Error>(vendor_iface)
	}
	.await;
	match attached {
		Ok(vendor_iface) => Ok(Some(vendor_iface)),
		Err(err) if err.is_transport() => Err(err),
		Err(err) => {
			warn!(target = "wlanhal.sta", iface = name, error = %err, "vendor interface setup failed");
			Ok(None)
		}
	}
}

impl EventSink for StaState {
	fn handle_event(&mut self, event: DaemonEvent) -> BoxFuture<'_, Notifications> {
		Box::pin(async move {
			match event {
				DaemonEvent::Registered(registration) => self.on_registration(registration).await,
				DaemonEvent::Died { handle, cookie } => self.on_service_died(&handle, cookie),
				DaemonEvent::Callback(event) => self.on_callback(event),
				DaemonEvent::LinkClosed => {
					warn!(target = "wlanhal.death", "supplicant connection closed");
					let notifications = self.on_link_failure();
					self.registry.unbind_service_manager();
					self.watcher.stop();
					notifications
				}
			}
		})
	}
}

/// Releases the lock, then runs notifications. A transport failure in `result`
/// first runs the death path.
fn finish<T>(mut state: MutexGuard<'_, StaState>, result: Result<T>) -> Result<T> {
	let notifications = match &result {
		Err(err) if err.is_transport() => {
			warn!(target = "wlanhal.sta", error = %err, "supplicant link failed");
			state.on_link_failure()
		}
		_ => Notifications::default(),
	};
	drop(state);
	notifications.deliver();
	result
}

/// Station-mode session manager for one supplicant daemon.
pub struct SupplicantStaHal {
	worker: Worker<StaState>,
	death_timeout: Duration,
}

impl SupplicantStaHal {
	/// Starts the connection and event worker on the current Tokio runtime.
	pub fn new(parts: TransportParts, config: HalConfig) -> Self {
		let death_timeout = config.wait_for_death_timeout();
		let worker = Worker::spawn(parts, |connection, waiters| StaState::new(connection, waiters, config));
		Self { worker, death_timeout }
	}

	/// Connects to a daemon control socket.
	#[cfg(unix)]
	pub async fn connect_unix(path: impl AsRef<Path>, config: HalConfig) -> Result<Self> {
		let parts = wlanhal_runtime::transport::connect_unix(path)
			.await
			.map_err(|source| Error::Transport { method: "connect", source })?;
		Ok(Self::new(parts, config))
	}

	/// Starts watching for the supplicant. Initialization itself happens when
	/// the service manager reports the daemon, possibly immediately.
	pub async fn initialize(&self) -> Result<bool> {
		let mut state = self.worker.lock().await;
		let result = state.start_watching().await;
		finish(state, result)
	}

	/// Asks the service manager to start the daemon. `false` while it is not yet available.
	pub async fn start_daemon(&self) -> Result<bool> {
		let state = self.worker.lock().await;
		let service_manager = ServiceManagerProxy::new(Arc::clone(&state.connection));
		let fq_name = ServiceKind::Supplicant.fq_name(HalTier::V1_0);
		let result = service_manager
			.get_service(&fq_name, &state.config.instance_name)
			.await
			.map(|root| root.is_some());
		if let Ok(started) = result {
			debug!(target = "wlanhal.sta", started, "start requested");
		}
		finish(state, result)
	}

	/// Terminates the daemon and waits, bounded, for its death notification.
	///
	/// Returns whether death was observed before the timeout.
	pub async fn terminate(&self) -> Result<bool> {
		let mut state = self.worker.lock().await;
		let armed = async {
			let (root, _) = state.root()?;
			let waiter = state.supervisor.arm_termination(&root).await?;
			SupplicantProxy::new(root).terminate().await?;
			Ok::<_, Error>(waiter)
		}
		.await;
		let waiter = match armed {
			Ok(waiter) => waiter,
			Err(err) => return finish(state, Err(err)),
		};
		drop(state);
		info!(target = "wlanhal.sta", "supplicant terminating");
		Ok(await_death(waiter, self.death_timeout).await)
	}

	/// Service manager link present.
	pub async fn is_initialization_started(&self) -> bool {
		self.worker.lock().await.registry.is_bound()
	}

	/// Root handle present.
	pub async fn is_initialization_complete(&self) -> bool {
		self.worker.lock().await.registry.is_daemon_ready()
	}

	pub async fn tier(&self) -> Option<HalTier> {
		self.worker.lock().await.registry.tier()
	}

	pub async fn set_log_level(&self, verbose: bool) -> Result<()> {
		let mut state = self.worker.lock().await;
		state.config.verbose_logging = verbose;
		let result = match state.root() {
			Ok((root, _)) => SupplicantProxy::new(root).set_debug_params(debug_params(verbose)).await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	/// Returns false when an existing handler was replaced.
	pub async fn register_death_handler(&self, handler: Arc<dyn DeathEventHandler>) -> bool {
		self.worker.lock().await.supervisor.register_handler(handler)
	}

	pub async fn deregister_death_handler(&self) -> bool {
		self.worker.lock().await.supervisor.deregister_handler()
	}

	/// Returns false when an existing listener was replaced.
	pub async fn register_event_listener(&self, listener: Arc<dyn DomainEventListener>) -> bool {
		let replaced = self.worker.lock().await.listener.replace(listener).is_some();
		if replaced {
			warn!(target = "wlanhal.events", "replacing existing event listener");
		}
		!replaced
	}

	pub async fn deregister_event_listener(&self) -> bool {
		self.worker.lock().await.listener.take().is_some()
	}

	/// Adds `iface` to the daemon and starts tracking it.
	pub async fn setup_interface(&self, iface: &str) -> Result<()> {
		let mut state = self.worker.lock().await;
		let result = state.setup_interface(iface).await;
		finish(state, result)
	}

	/// Stops tracking `iface`; the daemon-side removal is best-effort.
	pub async fn teardown_interface(&self, iface: &str) -> Result<()> {
		let mut state = self.worker.lock().await;
		let result = state.teardown_interface(iface).await;
		finish(state, result)
	}

	pub async fn interface_state(&self, iface: &str) -> IfaceState {
		self.worker.lock().await.sessions.state(iface)
	}

	pub async fn interfaces(&self) -> Vec<String> {
		self.worker.lock().await.sessions.ready_names()
	}

	pub async fn capabilities(&self, iface: &str) -> Result<CapabilitySet> {
		let state = self.worker.lock().await;
		state.sessions.ready(iface).map(|slot| slot.capabilities)
	}

	pub async fn current_network_id(&self, iface: &str) -> Result<Option<i32>> {
		let state = self.worker.lock().await;
		state.sessions.ready(iface).map(|slot| slot.session.current_network_id())
	}

	/// Local ids of the linked networks, in insertion order.
	pub async fn linked_network_ids(&self, iface: &str) -> Result<Vec<i32>> {
		let state = self.worker.lock().await;
		let slot = state.sessions.ready(iface)?;
		Ok(slot.session.linked().iter().map(|entry| entry.config.network_id).collect())
	}

	pub async fn current_network(&self, iface: &str) -> Result<Option<NetworkConfig>> {
		let state = self.worker.lock().await;
		state.sessions.ready(iface).map(|slot| slot.session.current_config().cloned())
	}

	/// Makes `config` the current network on `iface` and selects it.
	pub async fn connect_to_network(&self, iface: &str, config: &NetworkConfig) -> Result<()> {
		let mut state = self.worker.lock().await;
		let result = match state.bridge(iface) {
			Ok(mut bridge) => bridge.connect(config).await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	pub async fn roam_to_network(&self, iface: &str, config: &NetworkConfig) -> Result<()> {
		let mut state = self.worker.lock().await;
		let result = match state.bridge(iface) {
			Ok(mut bridge) => bridge.roam(config).await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	/// Replaces the networks linked to the current network `network_id`.
	pub async fn update_linked_networks(&self, iface: &str, network_id: i32, linked: &[NetworkConfig]) -> Result<()> {
		let mut state = self.worker.lock().await;
		let result = match state.bridge(iface) {
			Ok(mut bridge) => bridge.update_linked(network_id, linked).await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	pub async fn remove_all_networks(&self, iface: &str) -> Result<()> {
		let mut state = self.worker.lock().await;
		let result = match state.bridge(iface) {
			Ok(mut bridge) => bridge.remove_all().await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	/// Removes the current network if it is `network_id`; `false` when it is not.
	pub async fn remove_network_if_current(&self, iface: &str, network_id: i32) -> Result<bool> {
		let mut state = self.worker.lock().await;
		let result = match state.bridge(iface) {
			Ok(mut bridge) => bridge.remove_if_current(network_id).await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	pub async fn set_current_network_bssid(&self, iface: &str, bssid: MacAddress) -> Result<()> {
		let mut state = self.worker.lock().await;
		let result = match state.bridge(iface) {
			Ok(mut bridge) => bridge.set_current_bssid(bssid).await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	pub async fn reassociate(&self, iface: &str) -> Result<()> {
		let state = self.worker.lock().await;
		let result = match state.iface(iface) {
			Ok(proxy) => proxy.reassociate().await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	pub async fn reconnect(&self, iface: &str) -> Result<()> {
		let state = self.worker.lock().await;
		let result = match state.iface(iface) {
			Ok(proxy) => proxy.reconnect().await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	pub async fn disconnect(&self, iface: &str) -> Result<()> {
		let state = self.worker.lock().await;
		let result = match state.iface(iface) {
			Ok(proxy) => proxy.disconnect().await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	/// Push-button WPS, optionally limited to one BSSID.
	pub async fn start_wps_pbc(&self, iface: &str, bssid: Option<MacAddress>) -> Result<()> {
		let state = self.worker.lock().await;
		let result = match state.iface(iface) {
			Ok(proxy) => proxy.start_wps_pbc(bssid.unwrap_or(MacAddress::ANY)).await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	/// PIN-display WPS; returns the generated PIN.
	pub async fn start_wps_pin_display(&self, iface: &str, bssid: Option<MacAddress>) -> Result<String> {
		let state = self.worker.lock().await;
		let result = match state.iface(iface) {
			Ok(proxy) => proxy.start_wps_pin_display(bssid.unwrap_or(MacAddress::ANY)).await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	pub async fn cancel_wps(&self, iface: &str) -> Result<()> {
		let state = self.worker.lock().await;
		let result = match state.iface(iface) {
			Ok(proxy) => proxy.cancel_wps().await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	/// Registers a peer bootstrap URI; returns its id.
	pub async fn add_dpp_peer_uri(&self, iface: &str, uri: &str) -> Result<u32> {
		let state = self.worker.lock().await;
		let result = match state.dpp_iface(iface) {
			Ok(proxy) => proxy.add_dpp_peer_uri(uri).await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	pub async fn remove_dpp_uri(&self, iface: &str, id: u32) -> Result<()> {
		let state = self.worker.lock().await;
		let result = match state.dpp_iface(iface) {
			Ok(proxy) => proxy.remove_dpp_uri(id).await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	pub async fn start_dpp_enrollee_initiator(&self, iface: &str, peer_bootstrap_id: u32, own_bootstrap_id: u32) -> Result<()> {
		let state = self.worker.lock().await;
		let params = DppEnrolleeParams {
			peer_bootstrap_id,
			own_bootstrap_id,
		};
		let result = match state.dpp_iface(iface) {
			Ok(proxy) => proxy.start_dpp_enrollee_initiator(params).await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	pub async fn start_dpp_configurator_initiator(&self, iface: &str, request: DppConfiguratorRequest) -> Result<()> {
		let state = self.worker.lock().await;
		let result = match state.dpp_iface(iface) {
			Ok(proxy) => proxy.start_dpp_configurator_initiator(request.into_params()).await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}

	pub async fn stop_dpp_initiator(&self, iface: &str) -> Result<()> {
		let state = self.worker.lock().await;
		let result = match state.dpp_iface(iface) {
			Ok(proxy) => proxy.stop_dpp_initiator().await,
			Err(err) => Err(err),
		};
		finish(state, result)
	}
}

//! AP-mode hostapd HAL.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::MutexGuard;
use tracing::{debug, info, warn};
use wlanhal_protocol::method::{self, SERVICE_MANAGER_HANDLE};
use wlanhal_protocol::{
	AddAccessPointParams, ApBand, ApEncryption, ApFailureParams, ApIfaceParams, ApNetworkParams, ChannelParams, Event, HalTier, HwModeParams, RegistrationParams,
	ServiceKind,
};
use wlanhal_runtime::process::DaemonProcess;
use wlanhal_runtime::{Connection, TransportParts};

use crate::capability::CapabilityProbe;
use crate::config::{HalConfig, SoftApConfig};
use crate::death::{DeathEventHandler, DeathSupervisor, DeathWaiters, EpochCookie, UNGUARDED_COOKIE, await_death};
use crate::discovery::ServiceDiscoveryWatcher;
use crate::error::{Error, Result};
use crate::proxy::{DaemonObject, HostapdProxy, ServiceManagerProxy};
use crate::registry::{DaemonHandleRegistry, HandleInvalidation};
use crate::worker::{DaemonEvent, EventSink, Notifications, Worker};

/// Upstream notification that an access point failed.
pub trait SoftApListener: Send + Sync {
	fn on_failure(&self, iface: &str);
}

impl<F> SoftApListener for F
where
	F: Fn(&str) + Send + Sync,
{
	fn on_failure(&self, iface: &str) {
		self(iface)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApSecurity {
	Open,
	WpaPsk,
	Wpa2Psk,
	/// Requires the vendor hostapd service.
	Sae,
	/// Requires the vendor hostapd service.
	Owe,
}

/// Access point requested by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct ApConfig {
	pub ssid: Vec<u8>,
	pub hidden: bool,
	pub security: ApSecurity,
	pub passphrase: Option<String>,
	pub band: ApBand,
	/// 0 lets automatic channel selection pick.
	pub channel: u32,
}

impl ApConfig {
	pub fn open(ssid: impl Into<Vec<u8>>) -> Self {
		Self {
			ssid: ssid.into(),
			hidden: false,
			security: ApSecurity::Open,
			passphrase: None,
			band: ApBand::Band2Ghz,
			channel: 0,
		}
	}

	pub fn wpa2(ssid: impl Into<Vec<u8>>, passphrase: impl Into<String>) -> Self {
		Self {
			security: ApSecurity::Wpa2Psk,
			passphrase: Some(passphrase.into()),
			..Self::open(ssid)
		}
	}

	pub fn with_security(mut self, security: ApSecurity) -> Self {
		self.security = security;
		self
	}

	pub fn with_band(mut self, band: ApBand) -> Self {
		self.band = band;
		self
	}

	pub fn with_channel(mut self, channel: u32) -> Self {
		self.channel = channel;
		self
	}

	pub fn hidden(mut self) -> Self {
		self.hidden = true;
		self
	}
}

impl fmt::Debug for ApConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ApConfig")
			.field("ssid", &String::from_utf8_lossy(&self.ssid))
			.field("hidden", &self.hidden)
			.field("security", &self.security)
			.field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
			.field("band", &self.band)
			.field("channel", &self.channel)
			.finish()
	}
}

/// Builds the daemon request for `config` under the soft-AP settings.
pub(crate) fn access_point_params(iface: &str, config: &ApConfig, soft_ap: &SoftApConfig, vendor: bool) -> Result<AddAccessPointParams> {
	if config.ssid.is_empty() {
		return Err(Error::InvalidConfig("access point SSID is empty".to_string()));
	}
	let encryption_type = match config.security {
		ApSecurity::Open => ApEncryption::None,
		ApSecurity::WpaPsk => ApEncryption::Wpa,
		ApSecurity::Wpa2Psk => ApEncryption::Wpa2,
		ApSecurity::Sae | ApSecurity::Owe if !vendor => {
			return Err(Error::Unsupported(format!("{:?} access points need the vendor hostapd service", config.security)));
		}
		ApSecurity::Sae => ApEncryption::Sae,
		ApSecurity::Owe => ApEncryption::Owe,
	};
	let needs_passphrase = matches!(encryption_type, ApEncryption::Wpa | ApEncryption::Wpa2 | ApEncryption::Sae);
	let psk_passphrase = match (&config.passphrase, needs_passphrase) {
		(Some(passphrase), true) if !passphrase.is_empty() => passphrase.clone(),
		(_, true) => return Err(Error::InvalidConfig(format!("{:?} access point requires a passphrase", config.security))),
		(_, false) => String::new(),
	};

	let channel_params = match soft_ap.forced_channel {
		Some(channel) => ChannelParams {
			enable_acs: false,
			acs_should_exclude_dfs: false,
			channel,
			band: config.band,
			acs_channel_ranges: Vec::new(),
		},
		None if soft_ap.enable_acs && config.channel == 0 => ChannelParams {
			enable_acs: true,
			acs_should_exclude_dfs: !soft_ap.acs_include_dfs,
			channel: 0,
			band: config.band,
			acs_channel_ranges: soft_ap.channel_ranges(),
		},
		None => ChannelParams {
			enable_acs: false,
			acs_should_exclude_dfs: false,
			channel: config.channel,
			band: config.band,
			acs_channel_ranges: Vec::new(),
		},
	};

	Ok(AddAccessPointParams {
		iface_params: ApIfaceParams {
			iface_name: iface.to_string(),
			hw_mode_params: HwModeParams {
				enable_80211n: true,
				enable_80211ac: soft_ap.enable_ieee80211ac,
			},
			channel_params,
		},
		nw_params: ApNetworkParams {
			ssid: config.ssid.clone(),
			is_hidden: config.hidden,
			encryption_type,
			psk_passphrase,
		},
	})
}

/// Failure listeners keyed by AP interface.
#[derive(Default)]
struct AccessPoints(HashMap<String, Arc<dyn SoftApListener>>);

impl HandleInvalidation for AccessPoints {
	fn on_handles_invalidated(&mut self) -> Vec<String> {
		let mut names: Vec<String> = self.0.drain().map(|(name, _)| name).collect();
		names.sort();
		names
	}
}

struct HostapdState {
	connection: Arc<Connection>,
	config: HalConfig,
	registry: DaemonHandleRegistry,
	supervisor: DeathSupervisor,
	watcher: ServiceDiscoveryWatcher,
	access_points: AccessPoints,
}

impl HostapdState {
	fn new(connection: Arc<Connection>, waiters: DeathWaiters, config: HalConfig) -> Self {
		Self {
			connection,
			registry: DaemonHandleRegistry::new(ServiceKind::Hostapd, ServiceKind::VendorHostapd),
			supervisor: DeathSupervisor::new(waiters),
			watcher: ServiceDiscoveryWatcher::new(ServiceKind::Hostapd, config.instance_name.clone()),
			access_points: AccessPoints::default(),
			config,
		}
	}

	fn on_link_failure(&mut self) -> Notifications {
		let verdict = self.supervisor.fail_active_epoch(&mut self.registry, &mut self.access_points);
		let mut notifications = Notifications::default();
		notifications.death(verdict, None);
		notifications
	}

	fn root(&self) -> Result<DaemonObject> {
		self.registry.current_handle().cloned().ok_or(Error::DaemonNotReady)
	}

	async fn on_registration(&mut self, registration: RegistrationParams) -> Notifications {
		if !self.watcher.matches(&registration) || self.registry.is_daemon_ready() {
			return Notifications::default();
		}
		info!(target = "wlanhal.hostapd", fq_name = %registration.fq_name, "hostapd registered");
		match self.initialize_daemon().await {
			Ok(()) => Notifications::default(),
			Err(err) => {
				warn!(target = "wlanhal.hostapd", error = %err, "hostapd initialization failed");
				self.on_link_failure()
			}
		}
	}

	async fn initialize_daemon(&mut self) -> Result<()> {
		let service_manager = self.registry.service_manager().cloned().ok_or(Error::DaemonNotReady)?;
		let instance = self.config.instance_name.clone();
		let tier = CapabilityProbe::detect_tier(&service_manager, ServiceKind::Hostapd, &instance)
			.await?
			.ok_or_else(|| Error::ServiceUnavailable(ServiceKind::Hostapd.fq_name(HalTier::V1_0)))?;

		let cookie = self.supervisor.begin_epoch();
		let root = self.registry.bind(tier, &instance).await?;
		if !self.supervisor.link_for_death(&root, cookie).await? {
			return Err(Error::DeathLinkFailed(root.handle().to_string()));
		}
		match self.registry.bind_vendor(&instance).await {
			Ok(Some(vendor)) => {
				if !vendor.link_to_death(UNGUARDED_COOKIE).await? {
					warn!(target = "wlanhal.death", handle = vendor.handle(), "vendor hostapd refused death link");
					self.registry.invalidate_vendor();
				}
			}
			Ok(None) => {}
			Err(err) if err.is_transport() => return Err(err),
			Err(err) => warn!(target = "wlanhal.hostapd", error = %err, "vendor hostapd unavailable"),
		}
		if tier >= HalTier::V1_1 {
			HostapdProxy::new(root).register_callback(tier).await?;
		}
		info!(target = "wlanhal.hostapd", tier = tier.version(), cookie, vendor = self.registry.has_vendor(), "hostapd initialized");
		Ok(())
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
			info!(target = "wlanhal.death", handle, "vendor hostapd died");
			self.registry.invalidate_vendor();
			return Notifications::default();
		}
		let verdict = self.supervisor.on_death_notification(cookie, &mut self.registry, &mut self.access_points);
		let mut notifications = Notifications::default();
		notifications.death(verdict, None);
		notifications
	}

	fn on_callback(&mut self, event: Event) -> Notifications {
		let owned = self.registry.current_handle().is_some_and(|root| root.handle() == event.handle)
			|| self.registry.vendor_handle().is_some_and(|vendor| vendor.handle() == event.handle);
		if !owned || event.method != method::ON_AP_FAILURE {
			debug!(target = "wlanhal.hostapd", handle = %event.handle, event = %event.method, "ignoring hostapd callback");
			return Notifications::default();
		}
		let ApFailureParams { iface_name } = match serde_json::from_value(event.params) {
			Ok(params) => params,
			Err(err) => {
				warn!(target = "wlanhal.hostapd", error = %err, "malformed access point failure");
				return Notifications::default();
			}
		};
		let mut notifications = Notifications::default();
		match self.access_points.0.get(&iface_name) {
			Some(listener) => {
				warn!(target = "wlanhal.hostapd", iface = %iface_name, "access point failed");
				let listener = Arc::clone(listener);
				notifications.push(move || listener.on_failure(&iface_name));
			}
			None => debug!(target = "wlanhal.hostapd", iface = %iface_name, "failure for untracked access point"),
		}
		notifications
	}

	async fn add_access_point(&mut self, iface: &str, config: &ApConfig, listener: Arc<dyn SoftApListener>) -> Result<()> {
		let root = self.root()?;
		let params = access_point_params(iface, config, &self.config.soft_ap, self.registry.has_vendor())?;
		HostapdProxy::new(root).add_access_point(&params).await?;
		if self.access_points.0.insert(iface.to_string(), listener).is_some() {
			debug!(target = "wlanhal.hostapd", iface, "replaced access point listener");
		}
		info!(
			target = "wlanhal.hostapd",
			iface,
			acs = params.iface_params.channel_params.enable_acs,
			channel = params.iface_params.channel_params.channel,
			"access point added"
		);
		Ok(())
	}

	async fn remove_access_point(&mut self, iface: &str) -> Result<()> {
		let root = self.root()?;
		HostapdProxy::new(root).remove_access_point(iface).await?;
		self.access_points.0.remove(iface);
		info!(target = "wlanhal.hostapd", iface, "access point removed");
		Ok(())
	}
}

impl EventSink for HostapdState {
	fn handle_event(&mut self, event: DaemonEvent) -> BoxFuture<'_, Notifications> {
		Box::pin(async move {
			match event {
				DaemonEvent::Registered(registration) => self.on_registration(registration).await,
				DaemonEvent::Died { handle, cookie } => self.on_service_died(&handle, cookie),
				DaemonEvent::Callback(event) => self.on_callback(event),
				DaemonEvent::LinkClosed => {
					warn!(target = "wlanhal.death", "hostapd connection closed");
					let notifications = self.on_link_failure();
					self.registry.unbind_service_manager();
					self.watcher.stop();
					notifications
				}
			}
		})
	}
}

fn finish<T>(mut state: MutexGuard<'_, HostapdState>, result: Result<T>) -> Result<T> {
	let notifications = match &result {
		Err(err) if err.is_transport() => {
			warn!(target = "wlanhal.hostapd", error = %err, "hostapd link failed");
			state.on_link_failure()
		}
		_ => Notifications::default(),
	};
	drop(state);
	notifications.deliver();
	result
}

/// AP-mode session manager for one hostapd daemon.
pub struct HostapdHal {
	worker: Worker<HostapdState>,
	death_timeout: Duration,
}

impl HostapdHal {
	/// Starts the connection and event worker on the current Tokio runtime.
	pub fn new(parts: TransportParts, config: HalConfig) -> Self {
		let death_timeout = config.wait_for_death_timeout();
		let worker = Worker::spawn(parts, |connection, waiters| HostapdState::new(connection, waiters, config));
		Self { worker, death_timeout }
	}

	#[cfg(unix)]
	pub async fn connect_unix(path: impl AsRef<Path>, config: HalConfig) -> Result<Self> {
		let parts = wlanhal_runtime::transport::connect_unix(path)
			.await
			.map_err(|source| Error::Transport { method: "connect", source })?;
		Ok(Self::new(parts, config))
	}

	pub async fn initialize(&self) -> Result<bool> {
		let mut state = self.worker.lock().await;
		let connection = Arc::clone(&state.connection);
		let result = {
			let HostapdState { watcher, registry, .. } = &mut *state;
			watcher.start_watching(registry, connection).await
		};
		finish(state, result)
	}

	pub async fn start_daemon(&self) -> Result<bool> {
		let state = self.worker.lock().await;
		let service_manager = ServiceManagerProxy::new(Arc::clone(&state.connection));
		let result = service_manager
			.get_service(&ServiceKind::Hostapd.fq_name(HalTier::V1_0), &state.config.instance_name)
			.await
			.map(|root| root.is_some());
		finish(state, result)
	}

	pub async fn is_initialization_started(&self) -> bool {
		self.worker.lock().await.registry.is_bound()
	}

	pub async fn is_initialization_complete(&self) -> bool {
		self.worker.lock().await.registry.is_daemon_ready()
	}

	pub async fn register_death_handler(&self, handler: Arc<dyn DeathEventHandler>) -> bool {
		self.worker.lock().await.supervisor.register_handler(handler)
	}

	pub async fn deregister_death_handler(&self) -> bool {
		self.worker.lock().await.supervisor.deregister_handler()
	}

	/// Starts an access point on `iface`; `listener` hears about its failures.
	pub async fn add_access_point(&self, iface: &str, config: &ApConfig, listener: Arc<dyn SoftApListener>) -> Result<()> {
		let mut state = self.worker.lock().await;
		let result = state.add_access_point(iface, config, listener).await;
		finish(state, result)
	}

	pub async fn remove_access_point(&self, iface: &str) -> Result<()> {
		let mut state = self.worker.lock().await;
		let result = state.remove_access_point(iface).await;
		finish(state, result)
	}

	/// Interfaces with a live access point, sorted.
	pub async fn access_points(&self) -> Vec<String> {
		let state = self.worker.lock().await;
		let mut names: Vec<String> = state.access_points.0.keys().cloned().collect();
		names.sort();
		names
	}

	/// Terminates hostapd and waits, bounded, for its death notification.
	pub async fn terminate(&self) -> Result<bool> {
		let mut state = self.worker.lock().await;
		let armed = async {
			let root = state.root()?;
			let waiter = state.supervisor.arm_termination(&root).await?;
			HostapdProxy::new(root).terminate().await?;
			Ok::<_, Error>(waiter)
		}
		.await;
		let waiter = match armed {
			Ok(waiter) => waiter,
			Err(err) => return finish(state, Err(err)),
		};
		drop(state);
		info!(target = "wlanhal.hostapd", "hostapd terminating");
		Ok(await_death(waiter, self.death_timeout).await)
	}

	/// Terminates hostapd only if it is running.
	///
	/// With a configured PID file, liveness comes from that process; otherwise
	/// from whether the daemon is bound. Returns whether termination completed.
	pub async fn terminate_if_running(&self) -> Result<bool> {
		let (pid_file, ready) = {
			let state = self.worker.lock().await;
			(state.config.hostapd_pid_file.clone(), state.registry.is_daemon_ready())
		};
		let running = match &pid_file {
			Some(pid_file) => DaemonProcess::new(pid_file).is_running(),
			None => ready,
		};
		if !running {
			debug!(target = "wlanhal.hostapd", pid_file = ?pid_file, "hostapd not running");
			return Ok(false);
		}
		self.terminate().await
	}
}

#[cfg(test)]
mod tests {
	use wlanhal_protocol::ChannelRange;

	use super::*;

	fn soft_ap() -> SoftApConfig {
		SoftApConfig::default()
	}

	#[test]
	fn acs_is_used_when_no_channel_is_requested() {
		let mut settings = soft_ap();
		settings.acs_channel_ranges = "1-6,11".to_string();
		let params = access_point_params("wlan1", &ApConfig::wpa2("guest", "password1"), &settings, false).unwrap();

		let channel = &params.iface_params.channel_params;
		assert!(channel.enable_acs);
		assert!(channel.acs_should_exclude_dfs);
		assert_eq!(channel.acs_channel_ranges, vec![ChannelRange { start: 1, end: 6 }, ChannelRange { start: 11, end: 11 }]);
		assert!(params.iface_params.hw_mode_params.enable_80211n);
		assert_eq!(params.nw_params.encryption_type, ApEncryption::Wpa2);
		assert_eq!(params.nw_params.psk_passphrase, "password1");
	}

	#[test]
	fn forced_channel_overrides_acs() {
		let mut settings = soft_ap();
		settings.forced_channel = Some(36);
		let config = ApConfig::open("lab").with_band(ApBand::Band5Ghz);
		let params = access_point_params("wlan1", &config, &settings, false).unwrap();

		let channel = &params.iface_params.channel_params;
		assert!(!channel.enable_acs);
		assert_eq!(channel.channel, 36);
		assert_eq!(channel.band, ApBand::Band5Ghz);
		assert_eq!(params.nw_params.encryption_type, ApEncryption::None);
	}

	#[test]
	fn explicit_channel_disables_acs() {
		let params = access_point_params("wlan1", &ApConfig::open("lab").with_channel(6), &soft_ap(), false).unwrap();
		assert!(!params.iface_params.channel_params.enable_acs);
		assert_eq!(params.iface_params.channel_params.channel, 6);
	}

	#[test]
	fn sae_requires_vendor_service() {
		let config = ApConfig::wpa2("lab", "password1").with_security(ApSecurity::Sae);
		assert!(matches!(access_point_params("wlan1", &config, &soft_ap(), false), Err(Error::Unsupported(_))));
		let params = access_point_params("wlan1", &config, &soft_ap(), true).unwrap();
		assert_eq!(params.nw_params.encryption_type, ApEncryption::Sae);
	}

	#[test]
	fn owe_needs_no_passphrase() {
		let config = ApConfig::open("lab").with_security(ApSecurity::Owe);
		let params = access_point_params("wlan1", &config, &soft_ap(), true).unwrap();
		assert_eq!(params.nw_params.encryption_type, ApEncryption::Owe);
		assert!(params.nw_params.psk_passphrase.is_empty());
	}

	#[test]
	fn invalid_configs_are_rejected() {
		let missing_passphrase = ApConfig::open("lab").with_security(ApSecurity::WpaPsk);
		assert!(matches!(access_point_params("wlan1", &missing_passphrase, &soft_ap(), false), Err(Error::InvalidConfig(_))));
		assert!(matches!(access_point_params("wlan1", &ApConfig::open(""), &soft_ap(), false), Err(Error::InvalidConfig(_))));
	}

	#[test]
	fn debug_output_redacts_passphrase() {
		let rendered = format!("{:?}", ApConfig::wpa2("lab", "hunter2hunter2").hidden());
		assert!(!rendered.contains("hunter2"));
		assert!(rendered.contains("hidden: true"));
	}
}

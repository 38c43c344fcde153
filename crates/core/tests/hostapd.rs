mod common;

use std::sync::Arc;

use common::{DeathCounter, eventually, init_tracing, settle};
use parking_lot::Mutex;
use serde_json::json;
use wlanhal::{ApBand, ApConfig, ApSecurity, Error, HalConfig, HalTier, HostapdHal, SoftApConfig, SoftApListener};
use wlanhal_protocol::{ApEncryption, method};
use wlanhal_runtime::fake_daemon::{FakeDaemon, FakeDaemonBuilder};

const AP_IFACE: &str = "wlan1";

async fn ready_hostapd(builder: FakeDaemonBuilder, config: HalConfig) -> (HostapdHal, FakeDaemon) {
	init_tracing();
	let (parts, fake) = builder.build();
	let hal = HostapdHal::new(parts, config);
	assert!(hal.initialize().await.unwrap());
	eventually("hostapd initialization", || hal.is_initialization_complete()).await;
	(hal, fake)
}

#[derive(Default)]
struct FailureLog(Mutex<Vec<String>>);

impl SoftApListener for FailureLog {
	fn on_failure(&self, iface: &str) {
		self.0.lock().push(iface.to_string());
	}
}

#[tokio::test]
async fn access_point_uses_acs_by_default() {
	let (hal, fake) = ready_hostapd(FakeDaemonBuilder::new(), HalConfig::default()).await;

	hal.add_access_point(AP_IFACE, &ApConfig::wpa2("guest", "password1"), Arc::new(FailureLog::default()))
		.await
		.unwrap();

	let params = fake.access_point(AP_IFACE).unwrap();
	let channel = &params.iface_params.channel_params;
	assert!(channel.enable_acs);
	assert!(channel.acs_should_exclude_dfs);
	assert!(params.iface_params.hw_mode_params.enable_80211n);
	assert_eq!(params.nw_params.encryption_type, ApEncryption::Wpa2);
	assert_eq!(params.nw_params.psk_passphrase, "password1");
	assert_eq!(hal.access_points().await, vec![AP_IFACE.to_string()]);
	assert_eq!(fake.count(method::REGISTER_CALLBACK), 1);
}

#[tokio::test]
async fn forced_channel_overrides_the_request() {
	let config = HalConfig {
		soft_ap: SoftApConfig {
			forced_channel: Some(149),
			acs_channel_ranges: "36-48".to_string(),
			..SoftApConfig::default()
		},
		..HalConfig::default()
	};
	let (hal, fake) = ready_hostapd(FakeDaemonBuilder::new(), config).await;
	let ap = ApConfig::open("lobby").with_band(ApBand::Band5Ghz).with_channel(36);

	hal.add_access_point(AP_IFACE, &ap, Arc::new(FailureLog::default())).await.unwrap();

	let channel = fake.access_point(AP_IFACE).unwrap().iface_params.channel_params;
	assert!(!channel.enable_acs);
	assert_eq!(channel.channel, 149);
	assert_eq!(channel.band, ApBand::Band5Ghz);
}

#[tokio::test]
async fn sae_needs_the_vendor_service() {
	let (hal, fake) = ready_hostapd(FakeDaemonBuilder::new(), HalConfig::default()).await;
	let ap = ApConfig::wpa2("guest", "password1").with_security(ApSecurity::Sae);

	let err = hal.add_access_point(AP_IFACE, &ap, Arc::new(FailureLog::default())).await.unwrap_err();
	assert!(matches!(err, Error::Unsupported(_)), "{err:?}");
	assert!(fake.access_point(AP_IFACE).is_none());
	assert!(hal.access_points().await.is_empty());

	let (hal, fake) = ready_hostapd(FakeDaemonBuilder::new().with_vendor(), HalConfig::default()).await;
	hal.add_access_point(AP_IFACE, &ap, Arc::new(FailureLog::default())).await.unwrap();
	assert_eq!(fake.access_point(AP_IFACE).unwrap().nw_params.encryption_type, ApEncryption::Sae);
}

#[tokio::test]
async fn failures_reach_the_access_point_listener() {
	let (hal, fake) = ready_hostapd(FakeDaemonBuilder::new(), HalConfig::default()).await;
	let log = Arc::new(FailureLog::default());
	hal.add_access_point(AP_IFACE, &ApConfig::open("lobby"), log.clone()).await.unwrap();

	fake.emit("hostapd", method::ON_AP_FAILURE, json!({"ifaceName": "wlan9"}));
	fake.emit("sta_iface/wlan1", method::ON_AP_FAILURE, json!({"ifaceName": AP_IFACE}));
	fake.emit("hostapd", method::ON_AP_FAILURE, json!({"ifaceName": AP_IFACE}));

	eventually("failure callback", || std::future::ready(!log.0.lock().is_empty())).await;
	settle().await;
	assert_eq!(*log.0.lock(), vec![AP_IFACE.to_string()]);
}

#[tokio::test]
async fn removing_an_access_point_forgets_its_listener() {
	let (hal, fake) = ready_hostapd(FakeDaemonBuilder::new(), HalConfig::default()).await;
	let log = Arc::new(FailureLog::default());
	hal.add_access_point(AP_IFACE, &ApConfig::open("lobby"), log.clone()).await.unwrap();

	hal.remove_access_point(AP_IFACE).await.unwrap();
	assert!(fake.access_point(AP_IFACE).is_none());
	assert!(hal.access_points().await.is_empty());

	fake.emit("hostapd", method::ON_AP_FAILURE, json!({"ifaceName": AP_IFACE}));
	settle().await;
	assert!(log.0.lock().is_empty());

	assert!(hal.remove_access_point(AP_IFACE).await.is_err());
}

#[tokio::test]
async fn base_tier_skips_callback_registration() {
	let (hal, fake) = ready_hostapd(FakeDaemonBuilder::new().hostapd_tier(HalTier::V1_0), HalConfig::default()).await;

	assert_eq!(fake.count(method::REGISTER_CALLBACK), 0);
	hal.add_access_point(AP_IFACE, &ApConfig::open("lobby"), Arc::new(FailureLog::default())).await.unwrap();
}

#[tokio::test]
async fn death_drops_access_points() {
	let (hal, fake) = ready_hostapd(FakeDaemonBuilder::new(), HalConfig::default()).await;
	let deaths = Arc::new(DeathCounter::default());
	hal.register_death_handler(deaths.clone()).await;
	hal.add_access_point(AP_IFACE, &ApConfig::open("lobby"), Arc::new(FailureLog::default())).await.unwrap();

	fake.kill();
	eventually("death handler", || std::future::ready(deaths.count() == 1)).await;

	assert!(hal.access_points().await.is_empty());
	assert!(!hal.is_initialization_complete().await);
	assert!(matches!(
		hal.add_access_point(AP_IFACE, &ApConfig::open("lobby"), Arc::new(FailureLog::default())).await,
		Err(Error::DaemonNotReady)
	));

	fake.start();
	eventually("hostapd re-initialization", || hal.is_initialization_complete()).await;
}

#[tokio::test]
async fn terminate_if_running_follows_the_pid_file() {
	let dir = tempfile::tempdir().unwrap();
	let pid_file = dir.path().join("hostapd.pid");
	let config = HalConfig {
		hostapd_pid_file: Some(pid_file.clone()),
		wait_for_death_timeout_ms: 1_000,
		..HalConfig::default()
	};
	let (hal, fake) = ready_hostapd(FakeDaemonBuilder::new(), config).await;

	assert!(!hal.terminate_if_running().await.unwrap());
	assert!(fake.is_running());
	assert_eq!(fake.count(method::TERMINATE), 0);

	std::fs::write(&pid_file, format!("{}\n", std::process::id())).unwrap();
	assert!(hal.terminate_if_running().await.unwrap());
	assert!(!fake.is_running());
}

#[tokio::test]
async fn terminate_if_running_without_a_pid_file_uses_the_binding() {
	let config = HalConfig {
		wait_for_death_timeout_ms: 1_000,
		..HalConfig::default()
	};
	let (hal, fake) = ready_hostapd(FakeDaemonBuilder::new(), config).await;

	assert!(hal.terminate_if_running().await.unwrap());
	assert_eq!(fake.count(method::TERMINATE), 1);

	eventually("hostapd unbound", || {
		let hal = &hal;
		async move { !hal.is_initialization_complete().await }
	})
	.await;
	assert!(!hal.terminate_if_running().await.unwrap());
	assert_eq!(fake.count(method::TERMINATE), 1);
}

#[tokio::test]
async fn start_daemon_starts_a_lazy_hostapd() {
	init_tracing();
	let (parts, fake) = FakeDaemonBuilder::new().stopped(true).build();
	let hal = HostapdHal::new(parts, HalConfig::default());
	hal.initialize().await.unwrap();
	assert!(hal.is_initialization_started().await);

	assert!(hal.start_daemon().await.unwrap());
	assert!(fake.is_running());
	eventually("hostapd initialization", || hal.is_initialization_complete()).await;
}

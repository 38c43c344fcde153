#![allow(dead_code)]

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use wlanhal::{
	AuthFailureKind, BssidChangeKind, DomainEvent, DomainEventListener, DppEventKind, DppPayload, HalConfig, MacAddress, SupplicantStaHal,
	SupplicantState, WpsEventKind,
};
use wlanhal_runtime::fake_daemon::{FakeDaemon, FakeDaemonBuilder};

pub const IFACE: &str = "wlan0";
pub const BSSID: MacAddress = MacAddress([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);

pub fn init_tracing() {
	wlanhal::logging::init_logging(1);
}

/// Polls `check` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(what: &str, mut check: F)
where
	F: FnMut() -> Fut,
	Fut: Future<Output = bool>,
{
	let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
	loop {
		if check().await {
			return;
		}
		if tokio::time::Instant::now() >= deadline {
			panic!("timed out waiting for {what}");
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	}
}

/// Lets queued daemon events reach the worker.
pub async fn settle() {
	tokio::time::sleep(Duration::from_millis(50)).await;
}

pub async fn ready_hal(builder: FakeDaemonBuilder) -> (SupplicantStaHal, FakeDaemon) {
	ready_hal_with(builder, HalConfig::default()).await
}

pub async fn ready_hal_with(builder: FakeDaemonBuilder, config: HalConfig) -> (SupplicantStaHal, FakeDaemon) {
	init_tracing();
	let (parts, fake) = builder.build();
	let hal = SupplicantStaHal::new(parts, config);
	assert!(hal.initialize().await.expect("initialize"));
	eventually("supplicant initialization", || hal.is_initialization_complete()).await;
	(hal, fake)
}

/// Ready HAL with [`IFACE`] set up and a recording listener attached.
pub async fn ready_iface(builder: FakeDaemonBuilder) -> (SupplicantStaHal, FakeDaemon, Arc<RecordingListener>) {
	let (hal, fake) = ready_hal(builder).await;
	hal.setup_interface(IFACE).await.expect("setup interface");
	let listener = Arc::new(RecordingListener::default());
	hal.register_event_listener(listener.clone()).await;
	(hal, fake, listener)
}

#[derive(Default)]
pub struct DeathCounter(AtomicUsize);

impl DeathCounter {
	pub fn count(&self) -> usize {
		self.0.load(Ordering::SeqCst)
	}
}

impl wlanhal::DeathEventHandler for DeathCounter {
	fn on_death(&self) {
		self.0.fetch_add(1, Ordering::SeqCst);
	}
}

/// Rebuilds each delivered event so tests can compare whole sequences.
#[derive(Default)]
pub struct RecordingListener {
	events: Mutex<Vec<DomainEvent>>,
}

impl RecordingListener {
	pub fn events(&self) -> Vec<DomainEvent> {
		self.events.lock().clone()
	}

	pub fn take(&self) -> Vec<DomainEvent> {
		std::mem::take(&mut *self.events.lock())
	}

	pub fn len(&self) -> usize {
		self.events.lock().len()
	}

	fn push(&self, event: DomainEvent) {
		self.events.lock().push(event);
	}
}

impl DomainEventListener for RecordingListener {
	fn on_state_changed(&self, iface: &str, new_state: SupplicantState, bssid: MacAddress, network_id: i32, ssid: &[u8]) {
		self.push(DomainEvent::StateChanged {
			iface: iface.to_string(),
			new_state,
			bssid,
			network_id,
			ssid: ssid.to_vec(),
		});
	}

	fn on_network_connected(&self, iface: &str, network_id: i32, bssid: MacAddress, fils_hlp_sent: bool) {
		self.push(DomainEvent::NetworkConnected {
			iface: iface.to_string(),
			network_id,
			bssid,
			fils_hlp_sent,
		});
	}

	fn on_disconnected(&self, iface: &str, bssid: MacAddress, locally_generated: bool, reason_code: u16) {
		self.push(DomainEvent::Disconnected {
			iface: iface.to_string(),
			bssid,
			locally_generated,
			reason_code,
		});
	}

	fn on_association_rejected(&self, iface: &str, bssid: MacAddress, status_code: u16, timed_out: bool) {
		self.push(DomainEvent::AssociationRejected {
			iface: iface.to_string(),
			bssid,
			status_code,
			timed_out,
		});
	}

	fn on_authentication_failure(&self, iface: &str, kind: AuthFailureKind) {
		self.push(DomainEvent::AuthenticationFailed {
			iface: iface.to_string(),
			kind,
		});
	}

	fn on_wps_event(&self, iface: &str, kind: WpsEventKind) {
		self.push(DomainEvent::WpsEvent {
			iface: iface.to_string(),
			kind,
		});
	}

	fn on_dpp_event(&self, iface: &str, kind: DppEventKind, payload: &DppPayload) {
		self.push(DomainEvent::DppEvent {
			iface: iface.to_string(),
			kind,
			payload: payload.clone(),
		});
	}

	fn on_anqp_query_done(&self, iface: &str, bssid: MacAddress, elements: &BTreeMap<String, Vec<u8>>) {
		self.push(DomainEvent::AnqpQueryDone {
			iface: iface.to_string(),
			bssid,
			elements: elements.clone(),
		});
	}

	fn on_bssid_changed(&self, iface: &str, kind: BssidChangeKind, bssid: MacAddress) {
		self.push(DomainEvent::BssidChanged {
			iface: iface.to_string(),
			kind,
			bssid,
		});
	}

	fn on_daemon_disconnected(&self, iface: &str) {
		self.push(DomainEvent::DaemonDisconnected { iface: iface.to_string() });
	}
}

//! Ownership of the live daemon handles.

use tracing::{debug, info};
use wlanhal_protocol::{HalTier, ServiceKind};

use crate::error::{Error, Result};
use crate::proxy::{DaemonObject, ServiceManagerProxy};

/// Receives cascading invalidation when the registry drops its root handle.
pub trait HandleInvalidation {
	/// Drops every dependent handle; returns the names of interfaces forced to `Absent`.
	fn on_handles_invalidated(&mut self) -> Vec<String>;
}

/// Single source of truth for "is the daemon reachable right now".
///
/// Handles are created on [`bind`](Self::bind) and never leave the registry
/// except as clones scoped to one operation.
pub struct DaemonHandleRegistry {
	kind: ServiceKind,
	vendor_kind: ServiceKind,
	service_manager: Option<ServiceManagerProxy>,
	root: Option<DaemonObject>,
	tier: Option<HalTier>,
	vendor: Option<DaemonObject>,
}

impl DaemonHandleRegistry {
	pub fn new(kind: ServiceKind, vendor_kind: ServiceKind) -> Self {
		Self {
			kind,
			vendor_kind,
			service_manager: None,
			root: None,
			tier: None,
			vendor: None,
		}
	}

	pub fn kind(&self) -> ServiceKind {
		self.kind
	}

	pub(crate) fn bind_service_manager(&mut self, service_manager: ServiceManagerProxy) {
		self.service_manager = Some(service_manager);
	}

	pub(crate) fn unbind_service_manager(&mut self) {
		if self.service_manager.take().is_some() {
			info!(target = "wlanhal.discovery", service = ?self.kind, "service manager unbound");
		}
	}

	pub(crate) fn service_manager(&self) -> Option<&ServiceManagerProxy> {
		self.service_manager.as_ref()
	}

	/// Resolves the root service at `tier`.
	pub(crate) async fn bind(&mut self, tier: HalTier, instance: &str) -> Result<DaemonObject> {
		let service_manager = self.service_manager.as_ref().ok_or(Error::DaemonNotReady)?;
		let fq_name = self.kind.fq_name(tier);
		let root = service_manager
			.get_service(&fq_name, instance)
			.await?
			.ok_or_else(|| Error::ServiceUnavailable(fq_name.clone()))?;
		debug!(target = "wlanhal.discovery", fq_name, handle = root.handle(), "root service bound");
		self.root = Some(root.clone());
		self.tier = Some(tier);
		Ok(root)
	}

	/// Resolves the vendor extension; `None` when the daemon has none.
	pub(crate) async fn bind_vendor(&mut self, instance: &str) -> Result<Option<DaemonObject>> {
		let service_manager = self.service_manager.as_ref().ok_or(Error::DaemonNotReady)?;
		let fq_name = self.vendor_kind.fq_name(HalTier::V1_0);
		let vendor = service_manager.get_service(&fq_name, instance).await?;
		if let Some(vendor) = &vendor {
			debug!(target = "wlanhal.discovery", fq_name, handle = vendor.handle(), "vendor service bound");
		}
		self.vendor = vendor.clone();
		Ok(vendor)
	}

	pub(crate) fn current_handle(&self) -> Option<&DaemonObject> {
		self.root.as_ref()
	}

	pub(crate) fn vendor_handle(&self) -> Option<&DaemonObject> {
		self.vendor.as_ref()
	}

	pub fn tier(&self) -> Option<HalTier> {
		self.tier
	}

	/// Service manager link present.
	pub fn is_bound(&self) -> bool {
		self.service_manager.is_some()
	}

	/// Root handle present.
	pub fn is_daemon_ready(&self) -> bool {
		self.root.is_some()
	}

	pub fn has_vendor(&self) -> bool {
		self.vendor.is_some()
	}

	/// Clears the root, the vendor handle, and every dependent handle in `cascade`.
	pub fn invalidate(&mut self, cascade: &mut dyn HandleInvalidation) -> Vec<String> {
		let had_root = self.root.take().is_some();
		self.vendor = None;
		self.tier = None;
		let dropped = cascade.on_handles_invalidated();
		if had_root || !dropped.is_empty() {
			info!(target = "wlanhal.death", service = ?self.kind, interfaces = dropped.len(), "daemon handles invalidated");
		}
		dropped
	}

	/// Clears only the vendor extension handle.
	pub fn invalidate_vendor(&mut self) {
		if self.vendor.take().is_some() {
			info!(target = "wlanhal.death", service = ?self.vendor_kind, "vendor handle invalidated");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::connect;
	use wlanhal_runtime::fake_daemon::FakeDaemonBuilder;

	#[derive(Default)]
	struct Recorder {
		invalidations: usize,
	}

	impl HandleInvalidation for Recorder {
		fn on_handles_invalidated(&mut self) -> Vec<String> {
			self.invalidations += 1;
			vec!["wlan0".to_string()]
		}
	}

	#[tokio::test]
	async fn bind_requires_service_manager() {
		let mut registry = DaemonHandleRegistry::new(ServiceKind::Supplicant, ServiceKind::VendorSupplicant);
		assert!(matches!(registry.bind(HalTier::V1_2, "default").await, Err(Error::DaemonNotReady)));
	}

	#[tokio::test]
	async fn stopped_daemon_reports_service_unavailable() {
		let (connection, _events, _fake) = connect(FakeDaemonBuilder::new().stopped(false));
		let mut registry = DaemonHandleRegistry::new(ServiceKind::Supplicant, ServiceKind::VendorSupplicant);
		registry.bind_service_manager(ServiceManagerProxy::new(connection));

		let result = registry.bind(HalTier::V1_0, "default").await;
		assert!(matches!(result, Err(Error::ServiceUnavailable(name)) if name.contains("wifi.supplicant@1.0")));
		assert!(registry.is_bound());
		assert!(!registry.is_daemon_ready());
	}

	#[tokio::test]
	async fn invalidate_cascades_and_clears_root() {
		let (connection, _events, _fake) = connect(FakeDaemonBuilder::new().with_vendor());
		let mut registry = DaemonHandleRegistry::new(ServiceKind::Supplicant, ServiceKind::VendorSupplicant);
		registry.bind_service_manager(ServiceManagerProxy::new(connection));

		registry.bind(HalTier::V1_2, "default").await.unwrap();
		assert!(registry.bind_vendor("default").await.unwrap().is_some());
		assert!(registry.is_daemon_ready());
		assert_eq!(registry.tier(), Some(HalTier::V1_2));

		let mut recorder = Recorder::default();
		let dropped = registry.invalidate(&mut recorder);
		assert_eq!(dropped, vec!["wlan0".to_string()]);
		assert_eq!(recorder.invalidations, 1);
		assert!(!registry.is_daemon_ready());
		assert!(!registry.has_vendor());
		assert_eq!(registry.tier(), None);
		assert!(registry.is_bound());
	}

	#[tokio::test]
	async fn missing_vendor_is_not_an_error() {
		let (connection, _events, _fake) = connect(FakeDaemonBuilder::new());
		let mut registry = DaemonHandleRegistry::new(ServiceKind::Supplicant, ServiceKind::VendorSupplicant);
		registry.bind_service_manager(ServiceManagerProxy::new(connection));

		assert!(registry.bind_vendor("default").await.unwrap().is_none());
		assert!(!registry.has_vendor());
	}
}

//! Watching the service manager for the daemon becoming available.

use std::sync::Arc;

use tracing::{debug, info, warn};
use wlanhal_protocol::{HalTier, RegistrationParams, ServiceKind};
use wlanhal_runtime::Connection;

use crate::death::UNGUARDED_COOKIE;
use crate::error::Result;
use crate::proxy::ServiceManagerProxy;
use crate::registry::DaemonHandleRegistry;

pub struct ServiceDiscoveryWatcher {
	kind: ServiceKind,
	instance: String,
	watching: bool,
}

impl ServiceDiscoveryWatcher {
	pub fn new(kind: ServiceKind, instance: impl Into<String>) -> Self {
		Self {
			kind,
			instance: instance.into(),
			watching: false,
		}
	}

	pub fn instance(&self) -> &str {
		&self.instance
	}

	pub fn is_watching(&self) -> bool {
		self.watching
	}

	/// Links service-manager death and registers one persistent availability listener.
	///
	/// Returns `Ok(false)` when the service manager refuses either step. Idempotent.
	pub(crate) async fn start_watching(&mut self, registry: &mut DaemonHandleRegistry, connection: Arc<Connection>) -> Result<bool> {
		if self.watching {
			debug!(target = "wlanhal.discovery", service = ?self.kind, "already watching");
			return Ok(true);
		}
		let service_manager = ServiceManagerProxy::new(connection);
		if !service_manager.object().link_to_death(UNGUARDED_COOKIE).await? {
			warn!(target = "wlanhal.discovery", "service manager refused death link");
			return Ok(false);
		}
		let fq_name = self.kind.fq_name(HalTier::V1_0);
		match service_manager.register_for_notifications(&fq_name, &self.instance).await {
			Ok(()) => {}
			Err(err) if err.is_transport() => return Err(err),
			Err(err) => {
				warn!(target = "wlanhal.discovery", fq_name, error = %err, "registration for service notifications failed");
				return Ok(false);
			}
		}
		registry.bind_service_manager(service_manager);
		self.watching = true;
		info!(target = "wlanhal.discovery", fq_name, instance = %self.instance, "watching for service registration");
		Ok(true)
	}

	/// Whether a registration notification concerns the watched service.
	pub fn matches(&self, registration: &RegistrationParams) -> bool {
		self.watching && registration.instance == self.instance && HalTier::DESCENDING.iter().any(|tier| self.kind.fq_name(*tier) == registration.fq_name)
	}

	/// Forgets the listener; the next `start_watching` re-registers.
	pub fn stop(&mut self) {
		self.watching = false;
	}
}

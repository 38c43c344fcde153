//! Per-interface session state.
//!
//! Slots live in an arena indexed by interface name. Callers reach a slot only
//! through the manager, under the HAL's single state lock; no slot reference
//! outlives one operation.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::capability::CapabilitySet;
use crate::error::{Error, Result};
use crate::events::CallbackTier;
use crate::proxy::{StaIfaceProxy, StaNetworkProxy, VendorStaIfaceProxy};
use crate::registry::HandleInvalidation;
use crate::types::NetworkConfig;

/// Lifecycle of one tracked interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IfaceState {
	Absent,
	Adding,
	Ready,
	TearingDown,
}

/// A daemon network entry paired with the configuration it was built from.
#[derive(Debug, Clone)]
pub(crate) struct NetworkEntry {
	pub(crate) network: StaNetworkProxy,
	pub(crate) config: NetworkConfig,
}

/// Current and linked networks of one interface.
///
/// The current config and its daemon handle are stored together so one is
/// never present without the other.
#[derive(Debug, Default)]
pub(crate) struct NetworkSession {
	current: Option<NetworkEntry>,
	linked: Vec<NetworkEntry>,
}

impl NetworkSession {
	pub(crate) fn current(&self) -> Option<&NetworkEntry> {
		self.current.as_ref()
	}

	pub(crate) fn current_mut(&mut self) -> Option<&mut NetworkEntry> {
		self.current.as_mut()
	}

	pub(crate) fn current_config(&self) -> Option<&NetworkConfig> {
		self.current.as_ref().map(|entry| &entry.config)
	}

	/// Local correlation id of the current config.
	pub(crate) fn current_network_id(&self) -> Option<i32> {
		self.current.as_ref().map(|entry| entry.config.network_id)
	}

	pub(crate) fn set_current(&mut self, network: StaNetworkProxy, config: NetworkConfig) {
		self.current = Some(NetworkEntry { network, config });
	}

	pub(crate) fn linked(&self) -> &[NetworkEntry] {
		&self.linked
	}

	pub(crate) fn push_linked(&mut self, network: StaNetworkProxy, config: NetworkConfig) {
		self.linked.push(NetworkEntry { network, config });
	}

	pub(crate) fn clear_linked(&mut self) {
		self.linked.clear();
	}

	pub(crate) fn clear(&mut self) {
		self.current = None;
		self.linked.clear();
	}

	/// The daemon moved to a linked network: make it current, keep the old current as linked.
	pub(crate) fn promote_linked(&mut self, daemon_id: u32) -> bool {
		let Some(position) = self.linked.iter().position(|entry| entry.network.id() == daemon_id) else {
			return false;
		};
		let promoted = self.linked.remove(position);
		if let Some(previous) = self.current.replace(promoted) {
			self.linked.push(previous);
		}
		true
	}
}

/// One tracked interface.
#[derive(Debug)]
pub(crate) struct InterfaceSlot {
	pub(crate) name: String,
	pub(crate) state: IfaceState,
	pub(crate) iface: Option<StaIfaceProxy>,
	pub(crate) vendor_iface: Option<VendorStaIfaceProxy>,
	pub(crate) callback_tier: Option<CallbackTier>,
	pub(crate) session: NetworkSession,
	pub(crate) capabilities: CapabilitySet,
	/// Last reported state was the four-way handshake.
	pub(crate) fourway: bool,
}

impl InterfaceSlot {
	pub(crate) fn new(name: &str) -> Self {
		Self {
			name: name.to_string(),
			state: IfaceState::Adding,
			iface: None,
			vendor_iface: None,
			callback_tier: None,
			session: NetworkSession::default(),
			capabilities: CapabilitySet::empty(),
			fourway: false,
		}
	}

	pub(crate) fn iface(&self) -> Result<&StaIfaceProxy> {
		self.iface.as_ref().ok_or_else(|| Error::NotTracked(self.name.clone()))
	}

	/// Whether `handle` addresses this interface or its vendor extension.
	fn owns_handle(&self, handle: &str) -> bool {
		self.iface.as_ref().is_some_and(|iface| iface.object().handle() == handle)
			|| self.vendor_iface.as_ref().is_some_and(|vendor| vendor.object().handle() == handle)
	}
}

#[derive(Debug, Default)]
pub struct InterfaceSessionManager {
	slots: Vec<Option<InterfaceSlot>>,
	index: HashMap<String, usize>,
	free: Vec<usize>,
}

impl InterfaceSessionManager {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn state(&self, name: &str) -> IfaceState {
		self.slot(name).map_or(IfaceState::Absent, |slot| slot.state)
	}

	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}

	fn slot(&self, name: &str) -> Option<&InterfaceSlot> {
		self.index.get(name).and_then(|index| self.slots[*index].as_ref())
	}

	fn slot_mut(&mut self, name: &str) -> Option<&mut InterfaceSlot> {
		let index = *self.index.get(name)?;
		self.slots[index].as_mut()
	}

	/// Claims a slot in `Adding`.
	pub(crate) fn begin_add(&mut self, name: &str) -> Result<&mut InterfaceSlot> {
		if self.index.contains_key(name) {
			return Err(Error::AlreadyExists(name.to_string()));
		}
		let slot = InterfaceSlot::new(name);
		let index = match self.free.pop() {
			Some(index) => {
				self.slots[index] = Some(slot);
				index
			}
			None => {
				self.slots.push(Some(slot));
				self.slots.len() - 1
			}
		};
		self.index.insert(name.to_string(), index);
		debug!(target = "wlanhal.sta", iface = name, slot = index, "interface adding");
		self.slots[index].as_mut().ok_or_else(|| Error::NotTracked(name.to_string()))
	}

	/// Slot still being added.
	pub(crate) fn adding_mut(&mut self, name: &str) -> Result<&mut InterfaceSlot> {
		self.slot_mut(name)
			.filter(|slot| slot.state == IfaceState::Adding)
			.ok_or_else(|| Error::NotTracked(name.to_string()))
	}

	pub(crate) fn complete_add(&mut self, name: &str) -> Result<()> {
		let slot = self.adding_mut(name)?;
		slot.state = IfaceState::Ready;
		info!(target = "wlanhal.sta", iface = name, capabilities = ?slot.capabilities, "interface ready");
		Ok(())
	}

	/// Rolls an `Adding` slot back to `Absent`.
	pub(crate) fn abort_add(&mut self, name: &str) {
		if self.state(name) == IfaceState::Adding {
			self.release(name);
			debug!(target = "wlanhal.sta", iface = name, "interface add rolled back");
		}
	}

	/// Moves a `Ready` slot to `TearingDown`.
	pub(crate) fn begin_teardown(&mut self, name: &str) -> Result<&mut InterfaceSlot> {
		let slot = self
			.slot_mut(name)
			.filter(|slot| slot.state == IfaceState::Ready)
			.ok_or_else(|| Error::NotTracked(name.to_string()))?;
		slot.state = IfaceState::TearingDown;
		Ok(slot)
	}

	pub(crate) fn finish_teardown(&mut self, name: &str) {
		if self.release(name).is_some() {
			info!(target = "wlanhal.sta", iface = name, "interface removed");
		}
	}

	fn release(&mut self, name: &str) -> Option<InterfaceSlot> {
		let index = self.index.remove(name)?;
		self.free.push(index);
		self.slots[index].take()
	}

	pub(crate) fn ready(&self, name: &str) -> Result<&InterfaceSlot> {
		self.slot(name)
			.filter(|slot| slot.state == IfaceState::Ready)
			.ok_or_else(|| Error::NotTracked(name.to_string()))
	}

	pub(crate) fn ready_mut(&mut self, name: &str) -> Result<&mut InterfaceSlot> {
		self.slot_mut(name)
			.filter(|slot| slot.state == IfaceState::Ready)
			.ok_or_else(|| Error::NotTracked(name.to_string()))
	}

	/// Ready slot owning a daemon handle, for routing callbacks.
	pub(crate) fn slot_for_handle_mut(&mut self, handle: &str) -> Option<&mut InterfaceSlot> {
		self.slots
			.iter_mut()
			.flatten()
			.find(|slot| slot.state == IfaceState::Ready && slot.owns_handle(handle))
	}

	pub fn ready_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self
			.slots
			.iter()
			.flatten()
			.filter(|slot| slot.state == IfaceState::Ready)
			.map(|slot| slot.name.clone())
			.collect();
		names.sort();
		names
	}

	/// Forces every interface to `Absent` without daemon calls.
	pub(crate) fn drop_all(&mut self) -> Vec<String> {
		let mut names: Vec<String> = self.index.keys().cloned().collect();
		names.sort();
		self.slots.clear();
		self.index.clear();
		self.free.clear();
		names
	}

	/// Vendor extension died: forget vendor interface handles only.
	pub(crate) fn drop_vendor_handles(&mut self) {
		for slot in self.slots.iter_mut().flatten() {
			slot.vendor_iface = None;
			if slot.callback_tier == Some(CallbackTier::Vendor) {
				slot.callback_tier = None;
			}
		}
	}
}

impl HandleInvalidation for InterfaceSessionManager {
	fn on_handles_invalidated(&mut self) -> Vec<String> {
		self.drop_all()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_lifecycle_moves_through_states() {
		let mut manager = InterfaceSessionManager::new();
		assert_eq!(manager.state("wlan0"), IfaceState::Absent);

		manager.begin_add("wlan0").unwrap();
		assert_eq!(manager.state("wlan0"), IfaceState::Adding);
		assert!(matches!(manager.begin_add("wlan0"), Err(Error::AlreadyExists(name)) if name == "wlan0"));
		assert!(manager.ready("wlan0").is_err());

		manager.complete_add("wlan0").unwrap();
		assert_eq!(manager.state("wlan0"), IfaceState::Ready);
		assert_eq!(manager.ready_names(), vec!["wlan0".to_string()]);
	}

	#[test]
	fn aborted_add_returns_to_absent() {
		let mut manager = InterfaceSessionManager::new();
		manager.begin_add("wlan0").unwrap();
		manager.abort_add("wlan0");
		assert_eq!(manager.state("wlan0"), IfaceState::Absent);
		assert!(manager.is_empty());
	}

	#[test]
	fn teardown_requires_ready_slot() {
		let mut manager = InterfaceSessionManager::new();
		assert!(matches!(manager.begin_teardown("wlan0"), Err(Error::NotTracked(_))));

		manager.begin_add("wlan0").unwrap();
		manager.complete_add("wlan0").unwrap();
		manager.begin_teardown("wlan0").unwrap();
		assert_eq!(manager.state("wlan0"), IfaceState::TearingDown);
		manager.finish_teardown("wlan0");
		assert_eq!(manager.state("wlan0"), IfaceState::Absent);
		assert!(matches!(manager.begin_teardown("wlan0"), Err(Error::NotTracked(_))));
	}

	#[test]
	fn released_slots_are_reused() {
		let mut manager = InterfaceSessionManager::new();
		manager.begin_add("wlan0").unwrap();
		manager.complete_add("wlan0").unwrap();
		manager.begin_teardown("wlan0").unwrap();
		manager.finish_teardown("wlan0");

		manager.begin_add("wlan1").unwrap();
		assert_eq!(manager.slots.len(), 1);
		assert_eq!(manager.index["wlan1"], 0);
	}

	#[test]
	fn invalidation_drops_every_interface() {
		let mut manager = InterfaceSessionManager::new();
		for name in ["wlan1", "wlan0"] {
			manager.begin_add(name).unwrap();
			manager.complete_add(name).unwrap();
		}
		let dropped = manager.on_handles_invalidated();
		assert_eq!(dropped, vec!["wlan0".to_string(), "wlan1".to_string()]);
		assert_eq!(manager.state("wlan0"), IfaceState::Absent);
		assert_eq!(manager.state("wlan1"), IfaceState::Absent);
	}
}

//! Translating network configurations into daemon call sequences.

use tracing::{debug, info, warn};

use crate::capability::Capability;
use crate::error::{Error, Result};
use crate::proxy::{StaIfaceProxy, StaNetworkProxy};
use crate::session::InterfaceSlot;
use crate::types::{KeyMgmt, MacAddress, NetworkConfig};

/// Network operations on one `Ready` interface.
pub(crate) struct NetworkConfigBridge<'a> {
	slot: &'a mut InterfaceSlot,
}

impl<'a> NetworkConfigBridge<'a> {
	pub(crate) fn new(slot: &'a mut InterfaceSlot) -> Self {
		Self { slot }
	}

	fn iface(&self) -> Result<StaIfaceProxy> {
		self.slot.iface().cloned()
	}

	/// Makes `config` the current network and selects it.
	///
	/// The same logical network is never rebuilt: a changed BSSID pin is pushed
	/// to the existing entry. Anything else replaces every daemon-side network.
	pub(crate) async fn connect(&mut self, config: &NetworkConfig) -> Result<()> {
		let iface = self.iface()?;
		let name = self.slot.name.clone();

		let reuse = self.slot.session.current().is_some_and(|current| current.config.is_same_network(config));
		if reuse {
			if let Some(current) = self.slot.session.current_mut() {
				if current.config.bssid != config.bssid {
					let bssid = config.bssid.unwrap_or(MacAddress::ANY);
					debug!(target = "wlanhal.sta", iface = %name, %bssid, "same network, updating BSSID");
					current.network.set_bssid(bssid).await.map_err(|err| err.map_status(Error::BssidSetFailed))?;
				} else {
					debug!(target = "wlanhal.sta", iface = %name, "same network and BSSID, reselecting");
				}
				current.config = config.clone();
			}
		} else {
			self.slot.session.clear();
			remove_all_daemon_networks(&iface).await?;

			let effective = self.effective_config(config);
			let network = iface.add_network().await.map_err(|err| err.map_status(Error::NetworkAddFailed))?;
			if let Err(err) = save_config(&network, &effective).await {
				if !err.is_transport() {
					if let Err(cleanup) = remove_all_daemon_networks(&iface).await {
						warn!(target = "wlanhal.sta", iface = %name, error = %cleanup, "cleanup after failed config push failed");
					}
				}
				return Err(err);
			}
			info!(target = "wlanhal.sta", iface = %name, network_id = config.network_id, daemon_id = network.id(), "network added");
			self.slot.session.set_current(network, config.clone());
		}

		match self.slot.session.current() {
			Some(current) => current.network.select().await.map_err(|err| err.map_status(Error::SelectFailed)),
			None => Err(Error::NoCurrentNetwork(name)),
		}
	}

	/// Roams within the current network, or connects when `config` is a different network.
	pub(crate) async fn roam(&mut self, config: &NetworkConfig) -> Result<()> {
		if self.slot.session.current_network_id() != Some(config.network_id) {
			debug!(target = "wlanhal.sta", iface = %self.slot.name, network_id = config.network_id, "roam target is not current; connecting");
			return self.connect(config).await;
		}
		let iface = self.iface()?;
		let name = self.slot.name.clone();
		let Some(current) = self.slot.session.current_mut() else {
			return Err(Error::NoCurrentNetwork(name));
		};
		let bssid = config.bssid.unwrap_or(MacAddress::ANY);
		current.network.set_bssid(bssid).await.map_err(|err| err.map_status(Error::BssidSetFailed))?;
		current.config.bssid = config.bssid;
		iface.reassociate().await.map_err(|err| err.map_status(Error::ReassociateFailed))
	}

	/// Replaces the linked networks of the current network.
	///
	/// Entries added before a failure are kept; only the half-built entry is removed.
	pub(crate) async fn update_linked(&mut self, network_id: i32, linked: &[NetworkConfig]) -> Result<()> {
		let current_id = self.slot.session.current_network_id();
		if current_id != Some(network_id) {
			return Err(Error::StaleNetworkId {
				requested: network_id,
				current: current_id,
			});
		}
		let iface = self.iface()?;
		let name = self.slot.name.clone();
		let current_daemon_id = self.slot.session.current().map(|current| current.network.id());

		for id in iface.list_networks().await? {
			if Some(id) != current_daemon_id {
				iface.remove_network(id).await?;
			}
		}
		self.slot.session.clear_linked();

		for (added, config) in linked.iter().enumerate() {
			let effective = self.effective_config(config);
			let network = iface.add_network().await.map_err(|err| linked_failure(err, added))?;
			let pushed = match save_config(&network, &effective).await {
				Ok(()) => network.enable(true).await,
				Err(err) => Err(err),
			};
			if let Err(err) = pushed {
				if !err.is_transport() {
					if let Err(cleanup) = iface.remove_network(network.id()).await {
						warn!(target = "wlanhal.sta", iface = %name, error = %cleanup, "removing half-built linked network failed");
					}
				}
				return Err(linked_failure(err, added));
			}
			self.slot.session.push_linked(network, config.clone());
		}
		debug!(target = "wlanhal.sta", iface = %name, count = linked.len(), "linked networks updated");
		Ok(())
	}

	/// Removes every daemon-side network; local state is cleared only if all removals succeed.
	pub(crate) async fn remove_all(&mut self) -> Result<()> {
		let iface = self.iface()?;
		remove_all_daemon_networks(&iface).await?;
		self.slot.session.clear();
		Ok(())
	}

	/// Removes the current network if its local id is `network_id`.
	pub(crate) async fn remove_if_current(&mut self, network_id: i32) -> Result<bool> {
		if self.slot.session.current_network_id() != Some(network_id) {
			return Ok(false);
		}
		self.remove_all().await?;
		Ok(true)
	}

	pub(crate) async fn set_current_bssid(&mut self, bssid: MacAddress) -> Result<()> {
		let name = self.slot.name.clone();
		let Some(current) = self.slot.session.current_mut() else {
			return Err(Error::NoCurrentNetwork(name));
		};
		current.network.set_bssid(bssid).await.map_err(|err| err.map_status(Error::BssidSetFailed))?;
		current.config.bssid = (!bssid.is_any()).then_some(bssid);
		Ok(())
	}

	/// `config` with FILS schemes dropped when the interface lacks them.
	fn effective_config(&self, config: &NetworkConfig) -> NetworkConfig {
		let capabilities = self.slot.capabilities;
		let mut effective = config.clone();
		effective.key_mgmt.retain(|scheme| match scheme {
			KeyMgmt::FilsSha256 => capabilities.contains(Capability::FilsSha256),
			KeyMgmt::FilsSha384 => capabilities.contains(Capability::FilsSha384),
			_ => true,
		});
		if effective.key_mgmt.len() != config.key_mgmt.len() {
			debug!(target = "wlanhal.sta", iface = %self.slot.name, "stripped unsupported FILS key management");
		}
		effective
	}
}

fn linked_failure(err: Error, added: usize) -> Error {
	match err.status_code() {
		Some(code) if !err.is_transport() => Error::LinkedNetworkAddFailed { added, code },
		_ => err,
	}
}

/// Lists and removes every network; stops at the first failure.
async fn remove_all_daemon_networks(iface: &StaIfaceProxy) -> Result<()> {
	let ids = iface.list_networks().await?;
	for (removed, network_id) in ids.into_iter().enumerate() {
		iface.remove_network(network_id).await.map_err(|err| {
			err.map_status(|code| Error::PartialRemovalFailed {
				network_id,
				removed,
				code,
			})
		})?;
	}
	Ok(())
}

fn pushed(field: &'static str) -> impl FnOnce(Error) -> Error {
	move |err| err.map_status(|code| Error::ConfigPushFailed { field, code })
}

/// Pushes every field of `config` to a freshly added network.
async fn save_config(network: &StaNetworkProxy, config: &NetworkConfig) -> Result<()> {
	network.set_ssid(&config.ssid).await.map_err(pushed("ssid"))?;
	network.set_key_mgmt(config.key_mgmt_mask()).await.map_err(pushed("keyMgmt"))?;
	if let Some(passphrase) = &config.psk {
		network.set_psk_passphrase(passphrase).await.map_err(pushed("pskPassphrase"))?;
	}
	let mut has_wep_key = false;
	for (index, key) in config.wep_keys.iter().enumerate() {
		if key.is_empty() {
			continue;
		}
		has_wep_key = true;
		network.set_wep_key(index as u32, key).await.map_err(pushed("wepKey"))?;
	}
	if has_wep_key {
		network.set_wep_tx_key_idx(config.wep_tx_key_index).await.map_err(pushed("wepTxKeyIdx"))?;
	}
	if config.hidden {
		network.set_scan_ssid(true).await.map_err(pushed("scanSsid"))?;
	}
	if let Some(bssid) = config.bssid {
		network.set_bssid(bssid).await.map_err(pushed("bssid"))?;
	}
	network.set_require_pmf(config.require_pmf).await.map_err(pushed("requirePmf"))?;
	Ok(())
}

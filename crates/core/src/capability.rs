//! Daemon version tiers and key-management capabilities.

use std::fmt;

use tracing::{debug, warn};
use wlanhal_protocol::consts::key_mgmt;
use wlanhal_protocol::{HalTier, ServiceKind, TransportKind};

use crate::error::Result;
use crate::proxy::{ServiceManagerProxy, StaIfaceProxy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
	Sae,
	SuiteB,
	Owe,
	Dpp,
	FilsSha256,
	FilsSha384,
	/// Vendor extension service present.
	Vendor,
}

impl Capability {
	const ALL: [Capability; 7] = [
		Capability::Sae,
		Capability::SuiteB,
		Capability::Owe,
		Capability::Dpp,
		Capability::FilsSha256,
		Capability::FilsSha384,
		Capability::Vendor,
	];

	fn flag(self) -> u32 {
		1 << self as u32
	}
}

/// Feature flags resolved once per interface setup; read-only afterward.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet(u32);

impl CapabilitySet {
	pub fn empty() -> Self {
		Self(0)
	}

	pub fn with(self, capability: Capability) -> Self {
		Self(self.0 | capability.flag())
	}

	pub fn contains(&self, capability: Capability) -> bool {
		self.0 & capability.flag() != 0
	}

	pub fn is_empty(&self) -> bool {
		self.0 == 0
	}

	pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
		Capability::ALL.into_iter().filter(|capability| self.contains(*capability))
	}

	/// Maps the daemon's key-management bitmask.
	pub fn from_key_mgmt_mask(mask: u32) -> Self {
		let pairs = [
			(key_mgmt::SAE, Capability::Sae),
			(key_mgmt::SUITE_B_192, Capability::SuiteB),
			(key_mgmt::OWE, Capability::Owe),
			(key_mgmt::DPP, Capability::Dpp),
			(key_mgmt::FILS_SHA256, Capability::FilsSha256),
			(key_mgmt::FILS_SHA384, Capability::FilsSha384),
		];
		pairs
			.into_iter()
			.filter(|(bit, _)| mask & bit != 0)
			.fold(Self::empty(), |set, (_, capability)| set.with(capability))
	}
}

impl fmt::Debug for CapabilitySet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.iter()).finish()
	}
}

pub struct CapabilityProbe;

impl CapabilityProbe {
	/// Newest tier whose service the service manager can reach.
	pub(crate) async fn detect_tier(service_manager: &ServiceManagerProxy, kind: ServiceKind, instance: &str) -> Result<Option<HalTier>> {
		for tier in HalTier::DESCENDING {
			let transport = service_manager.get_transport(&kind.fq_name(tier), instance).await?;
			if transport != TransportKind::Empty {
				debug!(target = "wlanhal.discovery", service = ?kind, tier = tier.version(), ?transport, "detected tier");
				return Ok(Some(tier));
			}
		}
		Ok(None)
	}

	/// Capability set of one interface. Only tier 1.2 reports a key-management mask.
	///
	/// A daemon-reported failure yields an empty set; link failures propagate.
	pub(crate) async fn probe(iface: &StaIfaceProxy, tier: HalTier, vendor: bool) -> Result<CapabilitySet> {
		let mut capabilities = CapabilitySet::empty();
		if tier >= HalTier::V1_2 {
			match iface.key_mgmt_capabilities().await {
				Ok(mask) => capabilities = CapabilitySet::from_key_mgmt_mask(mask),
				Err(err) if err.is_transport() => return Err(err),
				Err(err) => warn!(target = "wlanhal.sta", error = %err, "key management capability query failed"),
			}
		}
		if vendor {
			capabilities = capabilities.with(Capability::Vendor);
		}
		debug!(target = "wlanhal.sta", ?capabilities, "capabilities probed");
		Ok(capabilities)
	}
}

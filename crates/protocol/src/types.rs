//! Shared enums and small records.

use serde::{Deserialize, Serialize};

pub type MacBytes = [u8; 6];

/// Interface version tier of a daemon service, newest last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HalTier {
	#[serde(rename = "1.0")]
	V1_0,
	#[serde(rename = "1.1")]
	V1_1,
	#[serde(rename = "1.2")]
	V1_2,
}

impl HalTier {
	/// All tiers, newest first.
	pub const DESCENDING: [HalTier; 3] = [HalTier::V1_2, HalTier::V1_1, HalTier::V1_0];

	pub fn version(self) -> &'static str {
		match self {
			HalTier::V1_0 => "1.0",
			HalTier::V1_1 => "1.1",
			HalTier::V1_2 => "1.2",
		}
	}
}

/// Daemon service families known to the service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
	Supplicant,
	VendorSupplicant,
	Hostapd,
	VendorHostapd,
}

impl ServiceKind {
	/// Fully qualified interface name for `tier`, e.g. `wifi.supplicant@1.2::ISupplicant`.
	pub fn fq_name(self, tier: HalTier) -> String {
		let (package, interface) = match self {
			ServiceKind::Supplicant => ("wifi.supplicant", "ISupplicant"),
			ServiceKind::VendorSupplicant => ("wifi.supplicant.vendor", "ISupplicantVendor"),
			ServiceKind::Hostapd => ("wifi.hostapd", "IHostapd"),
			ServiceKind::VendorHostapd => ("wifi.hostapd.vendor", "IHostapdVendor"),
		};
		format!("{package}@{}::{interface}", tier.version())
	}
}

/// How the service manager would reach a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
	#[default]
	Empty,
	Hwbinder,
	Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IfaceType {
	Sta,
	P2p,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfaceInfo {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: IfaceType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApBand {
	Band2Ghz,
	Band5Ghz,
	BandAny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApEncryption {
	None,
	Wpa,
	Wpa2,
	Sae,
	Owe,
}

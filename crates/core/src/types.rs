//! Domain values: MAC addresses, key management, network configurations.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use wlanhal_protocol::MacBytes;
use wlanhal_protocol::consts::{key_mgmt, state};

use crate::error::Error;

/// 48-bit hardware address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress(pub MacBytes);

impl MacAddress {
	/// The wildcard address; pinning it clears a BSSID pin.
	pub const ANY: MacAddress = MacAddress([0; 6]);

	pub fn octets(&self) -> MacBytes {
		self.0
	}

	pub fn is_any(&self) -> bool {
		*self == Self::ANY
	}
}

impl From<MacBytes> for MacAddress {
	fn from(bytes: MacBytes) -> Self {
		Self(bytes)
	}
}

impl fmt::Display for MacAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let [a, b, c, d, e, g] = self.0;
		write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
	}
}

impl fmt::Debug for MacAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

impl FromStr for MacAddress {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut bytes = [0u8; 6];
		let mut parts = s.split(':');
		for byte in bytes.iter_mut() {
			let part = parts.next().ok_or_else(|| Error::InvalidConfig(format!("MAC address {s:?} is too short")))?;
			if part.len() != 2 {
				return Err(Error::InvalidConfig(format!("bad MAC octet {part:?} in {s:?}")));
			}
			*byte = u8::from_str_radix(part, 16).map_err(|_| Error::InvalidConfig(format!("bad MAC octet {part:?} in {s:?}")))?;
		}
		if parts.next().is_some() {
			return Err(Error::InvalidConfig(format!("MAC address {s:?} is too long")));
		}
		Ok(Self(bytes))
	}
}

/// Key-management scheme a network may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyMgmt {
	None,
	WpaPsk,
	WpaEap,
	Ieee8021x,
	FtPsk,
	FtEap,
	Sae,
	Owe,
	SuiteB192,
	FilsSha256,
	FilsSha384,
	Dpp,
}

impl KeyMgmt {
	pub fn bit(self) -> u32 {
		match self {
			KeyMgmt::None => key_mgmt::NONE,
			KeyMgmt::WpaPsk => key_mgmt::WPA_PSK,
			KeyMgmt::WpaEap => key_mgmt::WPA_EAP,
			KeyMgmt::Ieee8021x => key_mgmt::IEEE8021X,
			KeyMgmt::FtPsk => key_mgmt::FT_PSK,
			KeyMgmt::FtEap => key_mgmt::FT_EAP,
			KeyMgmt::Sae => key_mgmt::SAE,
			KeyMgmt::Owe => key_mgmt::OWE,
			KeyMgmt::SuiteB192 => key_mgmt::SUITE_B_192,
			KeyMgmt::FilsSha256 => key_mgmt::FILS_SHA256,
			KeyMgmt::FilsSha384 => key_mgmt::FILS_SHA384,
			KeyMgmt::Dpp => key_mgmt::DPP,
		}
	}

	pub fn is_fils(self) -> bool {
		matches!(self, KeyMgmt::FilsSha256 | KeyMgmt::FilsSha384)
	}
}

/// Network configuration as the upper layer describes it.
///
/// `network_id` is the caller's correlation id; the daemon assigns its own ids.
#[derive(Clone, PartialEq, Eq)]
pub struct NetworkConfig {
	pub network_id: i32,
	pub ssid: Vec<u8>,
	pub key_mgmt: BTreeSet<KeyMgmt>,
	pub psk: Option<String>,
	pub wep_keys: Vec<Vec<u8>>,
	pub wep_tx_key_index: u32,
	pub hidden: bool,
	pub bssid: Option<MacAddress>,
	pub require_pmf: bool,
}

impl NetworkConfig {
	pub const INVALID_NETWORK_ID: i32 = -1;

	pub fn open(network_id: i32, ssid: impl Into<Vec<u8>>) -> Self {
		Self {
			network_id,
			ssid: ssid.into(),
			key_mgmt: BTreeSet::from([KeyMgmt::None]),
			psk: None,
			wep_keys: Vec::new(),
			wep_tx_key_index: 0,
			hidden: false,
			bssid: None,
			require_pmf: false,
		}
	}

	pub fn wpa_psk(network_id: i32, ssid: impl Into<Vec<u8>>, passphrase: impl Into<String>) -> Self {
		Self {
			key_mgmt: BTreeSet::from([KeyMgmt::WpaPsk]),
			psk: Some(passphrase.into()),
			..Self::open(network_id, ssid)
		}
	}

	pub fn sae(network_id: i32, ssid: impl Into<Vec<u8>>, passphrase: impl Into<String>) -> Self {
		Self {
			key_mgmt: BTreeSet::from([KeyMgmt::Sae]),
			psk: Some(passphrase.into()),
			require_pmf: true,
			..Self::open(network_id, ssid)
		}
	}

	pub fn wep(network_id: i32, ssid: impl Into<Vec<u8>>, keys: Vec<Vec<u8>>, tx_key_index: u32) -> Self {
		Self {
			wep_keys: keys,
			wep_tx_key_index: tx_key_index,
			..Self::open(network_id, ssid)
		}
	}

	pub fn with_bssid(mut self, bssid: MacAddress) -> Self {
		self.bssid = Some(bssid);
		self
	}

	pub fn with_key_mgmt(mut self, scheme: KeyMgmt) -> Self {
		self.key_mgmt.insert(scheme);
		self
	}

	pub fn hidden(mut self) -> Self {
		self.hidden = true;
		self
	}

	pub fn is_wep(&self) -> bool {
		self.key_mgmt.contains(&KeyMgmt::None) && self.wep_keys.iter().any(|key| !key.is_empty())
	}

	pub fn uses_sae(&self) -> bool {
		self.key_mgmt.contains(&KeyMgmt::Sae)
	}

	pub fn key_mgmt_mask(&self) -> u32 {
		self.key_mgmt.iter().fold(0, |mask, scheme| mask | scheme.bit())
	}

	/// Same SSID, security and key material. Ignores the BSSID pin and `network_id`.
	pub fn is_same_network(&self, other: &NetworkConfig) -> bool {
		self.ssid == other.ssid
			&& self.key_mgmt == other.key_mgmt
			&& self.psk == other.psk
			&& self.wep_keys == other.wep_keys
			&& self.wep_tx_key_index == other.wep_tx_key_index
	}
}

impl fmt::Debug for NetworkConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NetworkConfig")
			.field("network_id", &self.network_id)
			.field("ssid", &String::from_utf8_lossy(&self.ssid))
			.field("key_mgmt", &self.key_mgmt)
			.field("psk", &self.psk.as_ref().map(|_| "<redacted>"))
			.field("wep_keys", &self.wep_keys.len())
			.field("hidden", &self.hidden)
			.field("bssid", &self.bssid)
			.field("require_pmf", &self.require_pmf)
			.finish()
	}
}

/// Supplicant connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupplicantState {
	Disconnected,
	InterfaceDisabled,
	Inactive,
	Scanning,
	Authenticating,
	Associating,
	Associated,
	FourWayHandshake,
	GroupHandshake,
	Completed,
	Unknown(u32),
}

impl SupplicantState {
	pub fn from_code(code: u32) -> Self {
		match code {
			state::DISCONNECTED => SupplicantState::Disconnected,
			state::IFACE_DISABLED => SupplicantState::InterfaceDisabled,
			state::INACTIVE => SupplicantState::Inactive,
			state::SCANNING => SupplicantState::Scanning,
			state::AUTHENTICATING => SupplicantState::Authenticating,
			state::ASSOCIATING => SupplicantState::Associating,
			state::ASSOCIATED => SupplicantState::Associated,
			state::FOURWAY_HANDSHAKE => SupplicantState::FourWayHandshake,
			state::GROUP_HANDSHAKE => SupplicantState::GroupHandshake,
			state::COMPLETED => SupplicantState::Completed,
			other => SupplicantState::Unknown(other),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mac_address_round_trips_through_text() {
		let mac: MacAddress = "00:1a:2B:3c:4d:5e".parse().unwrap();
		assert_eq!(mac.octets(), [0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]);
		assert_eq!(mac.to_string(), "00:1a:2b:3c:4d:5e");
	}

	#[test]
	fn mac_address_rejects_wrong_lengths() {
		assert!("00:11:22:33:44".parse::<MacAddress>().is_err());
		assert!("00:11:22:33:44:55:66".parse::<MacAddress>().is_err());
		assert!("0:11:22:33:44:55".parse::<MacAddress>().is_err());
		assert!("zz:11:22:33:44:55".parse::<MacAddress>().is_err());
	}

	#[test]
	fn same_network_ignores_bssid_and_local_id() {
		let a = NetworkConfig::wpa_psk(1, "home", "hunter22");
		let b = NetworkConfig::wpa_psk(7, "home", "hunter22").with_bssid(MacAddress([1, 2, 3, 4, 5, 6]));
		assert!(a.is_same_network(&b));
		assert!(!a.is_same_network(&NetworkConfig::wpa_psk(1, "home", "other-pass")));
		assert!(!a.is_same_network(&NetworkConfig::sae(1, "home", "hunter22")));
	}

	#[test]
	fn wep_requires_a_key() {
		assert!(NetworkConfig::wep(0, "legacy", vec![b"abcde".to_vec()], 0).is_wep());
		assert!(!NetworkConfig::wep(0, "legacy", vec![Vec::new()], 0).is_wep());
		assert!(!NetworkConfig::open(0, "cafe").is_wep());
	}

	#[test]
	fn debug_output_redacts_passphrase() {
		let rendered = format!("{:?}", NetworkConfig::sae(3, "home", "hunter22"));
		assert!(!rendered.contains("hunter22"));
		assert!(rendered.contains("<redacted>"));
	}

	#[test]
	fn key_mgmt_mask_combines_bits() {
		let config = NetworkConfig::wpa_psk(0, "x", "y").with_key_mgmt(KeyMgmt::Sae);
		assert_eq!(config.key_mgmt_mask(), key_mgmt::WPA_PSK | key_mgmt::SAE);
	}

	#[test]
	fn unknown_state_codes_are_preserved() {
		assert_eq!(SupplicantState::from_code(7), SupplicantState::FourWayHandshake);
		assert_eq!(SupplicantState::from_code(42), SupplicantState::Unknown(42));
	}
}

//! Request parameter and result payloads.

use serde::{Deserialize, Serialize};

use crate::types::{ApBand, ApEncryption, HalTier, IfaceInfo, IfaceType, MacBytes, TransportKind};

/// Params for `getService`, `getTransport` and `registerForNotifications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceQuery {
	pub fq_name: String,
	pub instance: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkToDeathParams {
	pub cookie: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceParams {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: IfaceType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCallbackParams {
	pub tier: HalTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugParams {
	pub level: u32,
	pub show_timestamp: bool,
	pub show_keys: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIdParam {
	pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsidParam {
	pub ssid: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMgmtParam {
	pub mask: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassphraseParam {
	pub passphrase: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WepKeyParam {
	pub index: u32,
	pub key: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexParam {
	pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagParam {
	pub enable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BssidParam {
	pub bssid: MacBytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableParams {
	pub no_connect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriParam {
	pub uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DppEnrolleeParams {
	pub peer_bootstrap_id: u32,
	pub own_bootstrap_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DppConfiguratorParams {
	pub peer_bootstrap_id: u32,
	pub own_bootstrap_id: u32,
	pub ssid: Vec<u8>,
	pub password: String,
	pub psk: String,
	pub net_role: u32,
	pub security_akm: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HwModeParams {
	pub enable_80211n: bool,
	pub enable_80211ac: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
	pub start: u32,
	pub end: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelParams {
	pub enable_acs: bool,
	pub acs_should_exclude_dfs: bool,
	pub channel: u32,
	pub band: ApBand,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub acs_channel_ranges: Vec<ChannelRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApIfaceParams {
	pub iface_name: String,
	pub hw_mode_params: HwModeParams,
	pub channel_params: ChannelParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApNetworkParams {
	pub ssid: Vec<u8>,
	pub is_hidden: bool,
	pub encryption_type: ApEncryption,
	#[serde(default)]
	pub psk_passphrase: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAccessPointParams {
	pub iface_params: ApIfaceParams,
	pub nw_params: ApNetworkParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveAccessPointParams {
	pub iface_name: String,
}

/// Result carrying a daemon object handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleResult {
	pub handle: String,
}

/// Result of `addNetwork` and `getNetwork`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkHandleResult {
	pub handle: String,
	pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NetworkIdsResult {
	#[serde(default)]
	pub ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InterfacesResult {
	#[serde(default)]
	pub interfaces: Vec<IfaceInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TransportResult {
	#[serde(default)]
	pub transport: TransportKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MaskResult {
	pub mask: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LinkResult {
	pub linked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdResult {
	pub id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinResult {
	pub pin: String,
}

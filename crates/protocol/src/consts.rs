//! Numeric constants carried in params and callback payloads.

/// Key-management bits for `setKeyMgmt` and `getKeyMgmtCapabilities`.
pub mod key_mgmt {
	pub const WPA_EAP: u32 = 1 << 0;
	pub const WPA_PSK: u32 = 1 << 1;
	pub const NONE: u32 = 1 << 2;
	pub const IEEE8021X: u32 = 1 << 3;
	pub const FT_EAP: u32 = 1 << 5;
	pub const FT_PSK: u32 = 1 << 6;
	pub const SAE: u32 = 1 << 10;
	pub const OSEN: u32 = 1 << 15;
	pub const SUITE_B_192: u32 = 1 << 17;
	pub const FILS_SHA256: u32 = 1 << 18;
	pub const FILS_SHA384: u32 = 1 << 19;
	pub const OWE: u32 = 1 << 22;
	pub const DPP: u32 = 1 << 23;
}

/// Supplicant connection state codes reported by `onStateChanged`.
pub mod state {
	pub const DISCONNECTED: u32 = 0;
	pub const IFACE_DISABLED: u32 = 1;
	pub const INACTIVE: u32 = 2;
	pub const SCANNING: u32 = 3;
	pub const AUTHENTICATING: u32 = 4;
	pub const ASSOCIATING: u32 = 5;
	pub const ASSOCIATED: u32 = 6;
	pub const FOURWAY_HANDSHAKE: u32 = 7;
	pub const GROUP_HANDSHAKE: u32 = 8;
	pub const COMPLETED: u32 = 9;
}

/// 802.11 status code for an unspecified association failure.
pub const STATUS_UNSPECIFIED_FAILURE: u16 = 1;

/// 802.11 reason code: information element in 4-way handshake differs.
pub const REASON_IE_IN_4WAY_DIFFERS: u16 = 17;

pub mod wps {
	pub const CONFIG_ERROR_MSG_TIMEOUT: u16 = 16;
	pub const ERROR_IND_NO_ERROR: u16 = 0;
}

/// Reasons attached to `onBssidChanged`.
pub mod bssid_change {
	pub const ASSOC_START: u8 = 0;
	pub const ASSOC_COMPLETE: u8 = 1;
	pub const DISASSOC: u8 = 2;
}

pub mod dpp {
	pub mod akm {
		pub const PSK: u32 = 0;
		pub const PSK_SAE: u32 = 1;
		pub const SAE: u32 = 2;
		pub const DPP: u32 = 3;
	}

	pub mod failure {
		pub const INVALID_URI: u32 = 0;
		pub const AUTHENTICATION: u32 = 1;
		pub const NOT_COMPATIBLE: u32 = 2;
		pub const CONFIGURATION: u32 = 3;
		pub const BUSY: u32 = 4;
		pub const TIMEOUT: u32 = 5;
		pub const FAILURE: u32 = 6;
		pub const NOT_SUPPORTED: u32 = 7;
	}

	pub mod progress {
		pub const AUTHENTICATION_SUCCESS: u32 = 0;
		pub const RESPONSE_PENDING: u32 = 1;
	}

	pub mod net_role {
		pub const STA: u32 = 0;
		pub const AP: u32 = 1;
	}
}

/// Daemon log levels for `setDebugParams`.
pub mod debug_level {
	pub const INFO: u32 = 3;
	pub const DEBUG: u32 = 2;
	pub const EXCESSIVE: u32 = 0;
}

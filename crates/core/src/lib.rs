// wlanhal: session manager for Wi-Fi supplicant and hostapd daemons
//
// Owns the daemon connection lifecycle (discovery, binding, death supervision,
// recovery), per-interface network sessions, and the translation of daemon
// callbacks into typed domain events.

pub mod capability;
pub mod config;
pub mod death;
pub mod discovery;
pub mod error;
pub mod events;
pub mod hostapd;
pub mod logging;
mod network;
mod proxy;
pub mod registry;
pub mod session;
pub mod sta;
pub mod types;
mod worker;

#[cfg(test)]
mod test_support;

pub use capability::{Capability, CapabilitySet};
pub use config::{HalConfig, SoftApConfig, parse_acs_channel_ranges};
pub use death::{DeathEventHandler, EpochCookie};
pub use error::{Error, Result};
pub use events::{AuthFailureKind, BssidChangeKind, DomainEvent, DomainEventListener, DppEventKind, DppPayload, WpsEventKind};
pub use hostapd::{ApConfig, ApSecurity, HostapdHal, SoftApListener};
pub use session::IfaceState;
pub use sta::{DppAkm, DppConfiguratorRequest, DppNetRole, SupplicantStaHal};
pub use types::{KeyMgmt, MacAddress, NetworkConfig, SupplicantState};
pub use wlanhal_protocol::{ApBand, HalTier};

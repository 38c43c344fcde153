//! Wire types for the wireless daemon control protocol.
//!
//! This crate contains the serde-serializable types exchanged with a
//! supplicant or hostapd daemon over a newline-delimited JSON transport.
//! These types represent the "protocol layer": the shapes of data as they
//! appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * Tier-aware: Callback payloads carry every field any interface tier sends
//! * Stable: Changes only when the wire protocol changes
//!
//! Session management, death supervision and event policy live in `wlanhal`.

pub mod callback;
pub mod consts;
pub mod message;
pub mod method;
pub mod params;
pub mod status;
pub mod types;

pub use callback::*;
pub use message::*;
pub use params::*;
pub use status::*;
pub use types::*;

//! Wireless daemon connection, transport, and process lifecycle.
//!
//! The [`Connection`] correlates requests with responses over any
//! [`Transport`] and forwards daemon-originated events, in arrival order, to a
//! single [`ConnectionEvent`] stream owned by the session layer.

pub mod connection;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod fake_daemon;
pub mod process;
pub mod transport;

pub use connection::{Connection, ConnectionEvent, Reply};
pub use error::{Error, Result};
pub use transport::{Transport, TransportParts, TransportReceiver, pipe_transport};

//! Subscriber setup for binaries and tests embedding the session manager.

use tracing_subscriber::EnvFilter;

/// Installs a formatted subscriber; `RUST_LOG` overrides `verbosity`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(verbosity: u8) {
	let default_directive = match verbosity {
		0 => "wlanhal=info",
		1 => "wlanhal=debug",
		_ => "wlanhal=trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
	let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init();
}

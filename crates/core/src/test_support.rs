use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use wlanhal_runtime::fake_daemon::{FakeDaemon, FakeDaemonBuilder};
use wlanhal_runtime::{Connection, ConnectionEvent};

/// Connects to a fresh fake daemon and spawns the connection loop.
pub(crate) fn connect(builder: FakeDaemonBuilder) -> (Arc<Connection>, UnboundedReceiver<ConnectionEvent>, FakeDaemon) {
	let (parts, fake) = builder.build();
	let (connection, events) = Connection::new(parts);
	let connection = Arc::new(connection);
	tokio::spawn({
		let connection = Arc::clone(&connection);
		async move { connection.run().await }
	});
	(connection, events, fake)
}

//! Request/response correlation layer for the daemon control protocol.
//!
//! # Message Flow
//!
//! 1. Caller invokes [`Connection::send_message`] with a handle, method, and params
//! 2. Connection assigns a sequential id and parks a oneshot sender under it
//! 3. Request is serialized and written via the transport
//! 4. [`Connection::run`] reads inbound frames
//! 5. Responses are matched by id and complete the parked oneshot
//! 6. Events are forwarded, in arrival order, to the [`ConnectionEvent`] stream
//!
//! When the transport ends every parked request fails with
//! [`Error::ChannelClosed`] and a single [`ConnectionEvent::Closed`] is emitted.
//! The session layer treats that as the death of every handle on the link.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, error, trace, warn};
use wlanhal_protocol::{DaemonStatus, Event, Message, Request, Response, StatusCode};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportParts, TransportReceiver};

/// Completed daemon call: a status plus an optional payload.
#[derive(Debug, Clone)]
pub struct Reply {
	pub status: DaemonStatus,
	pub result: Value,
}

impl Reply {
	pub fn code(&self) -> StatusCode {
		self.status.code
	}

	pub fn is_success(&self) -> bool {
		self.status.code.is_success()
	}

	/// Decodes the payload into a typed result.
	pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
		serde_json::from_value(self.result.clone()).map_err(|err| Error::Protocol(format!("unexpected result payload: {err}")))
	}
}

/// Item of the stream returned alongside a [`Connection`].
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
	/// Daemon-originated callback or death notification.
	Event(Event),
	/// Transport ended; no further events will arrive.
	Closed,
}

/// Connection to one daemon process.
///
/// Shared across tasks behind an `Arc`; concurrent requests are supported.
pub struct Connection {
	last_id: AtomicU32,
	callbacks: Arc<Mutex<HashMap<u32, oneshot::Sender<Result<Reply>>>>>,
	sender: Mutex<Box<dyn Transport>>,
	receiver: Mutex<Option<Box<dyn TransportReceiver>>>,
	message_rx: Mutex<Option<mpsc::UnboundedReceiver<Value>>>,
	events_tx: mpsc::UnboundedSender<ConnectionEvent>,
	closed: AtomicBool,
}

impl Connection {
	/// Creates a connection and the receiver for its event stream.
	pub fn new(parts: TransportParts) -> (Self, mpsc::UnboundedReceiver<ConnectionEvent>) {
		let (events_tx, events_rx) = mpsc::unbounded_channel();
		let connection = Self {
			last_id: AtomicU32::new(0),
			callbacks: Arc::new(Mutex::new(HashMap::new())),
			sender: Mutex::new(parts.sender),
			receiver: Mutex::new(Some(parts.receiver)),
			message_rx: Mutex::new(Some(parts.message_rx)),
			events_tx,
			closed: AtomicBool::new(false),
		};
		(connection, events_rx)
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}

	/// Sends a request to `handle` and waits for its response.
	///
	/// Returns `Ok` for any well-formed response, including failure statuses.
	pub async fn send_message(&self, handle: &str, method: &str, params: Value) -> Result<Reply> {
		let id = self.last_id.fetch_add(1, Ordering::SeqCst);
		let (tx, rx) = oneshot::channel();
		self.callbacks.lock().await.insert(id, tx);

		if self.is_closed() {
			self.callbacks.lock().await.remove(&id);
			return Err(Error::ChannelClosed);
		}

		let request = Request {
			id,
			handle: handle.to_string(),
			method: method.to_string(),
			params,
		};
		trace!(target = "wlanhal.runtime", id, handle, method, "sending request");

		let sent = match serde_json::to_value(&request) {
			Ok(value) => self.sender.lock().await.send(value).await,
			Err(err) => Err(err.into()),
		};
		if let Err(err) = sent {
			self.callbacks.lock().await.remove(&id);
			return Err(err);
		}

		rx.await.map_err(|_| Error::ChannelClosed).and_then(|result| result)
	}

	/// Runs the inbound dispatch loop until the transport ends.
	///
	/// Must be spawned exactly once.
	pub async fn run(&self) {
		let Some(receiver) = self.receiver.lock().await.take() else {
			warn!(target = "wlanhal.runtime", "connection loop already running");
			return;
		};
		let Some(mut message_rx) = self.message_rx.lock().await.take() else {
			return;
		};

		let reader = tokio::spawn(async move {
			if let Err(err) = receiver.run().await {
				error!(target = "wlanhal.runtime", error = %err, "transport receive loop failed");
			}
		});

		while let Some(value) = message_rx.recv().await {
			match serde_json::from_value::<Message>(value) {
				Ok(message) => {
					if let Err(err) = self.dispatch(message).await {
						warn!(target = "wlanhal.runtime", error = %err, "dropping inbound message");
					}
				}
				Err(err) => warn!(target = "wlanhal.runtime", error = %err, "failed to parse inbound message"),
			}
		}

		debug!(target = "wlanhal.runtime", "message loop ended (transport closed)");
		self.closed.store(true, Ordering::SeqCst);
		for (_, callback) in self.callbacks.lock().await.drain() {
			let _ = callback.send(Err(Error::ChannelClosed));
		}
		let _ = self.events_tx.send(ConnectionEvent::Closed);
		let _ = reader.await;
	}

	async fn dispatch(&self, message: Message) -> Result<()> {
		match message {
			Message::Response(Response { id, status, result }) => {
				let callback = self
					.callbacks
					.lock()
					.await
					.remove(&id)
					.ok_or_else(|| Error::Protocol(format!("no pending request for response id={id}")))?;
				let _ = callback.send(Ok(Reply {
					status,
					result: result.unwrap_or(Value::Null),
				}));
				Ok(())
			}
			Message::Event(event) => {
				trace!(target = "wlanhal.runtime", handle = %event.handle, method = %event.method, "daemon event");
				self.events_tx.send(ConnectionEvent::Event(event)).map_err(|_| Error::ChannelClosed)
			}
		}
	}
}

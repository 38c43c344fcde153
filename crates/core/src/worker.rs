//! The per-connection event worker.
//!
//! One task drains the connection's event stream in arrival order. Each event
//! is classified, applied to the HAL state under its lock, and the resulting
//! [`Notifications`] run after the lock is dropped.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use wlanhal_protocol::method::{self, SERVICE_MANAGER_HANDLE};
use wlanhal_protocol::{Event, RegistrationParams, ServiceDiedParams};
use wlanhal_runtime::{Connection, ConnectionEvent, TransportParts};

use crate::death::{DeathVerdict, DeathWaiters, EpochCookie};
use crate::events::{DomainEvent, DomainEventListener};

/// Upstream callbacks collected under the lock and run after it is released.
#[derive(Default)]
pub(crate) struct Notifications {
	actions: Vec<Box<dyn FnOnce() + Send>>,
}

impl Notifications {
	pub(crate) fn push(&mut self, action: impl FnOnce() + Send + 'static) {
		self.actions.push(Box::new(action));
	}

	/// Queues delivery of `events` to `listener`, in order.
	pub(crate) fn events(&mut self, listener: Option<&Arc<dyn DomainEventListener>>, events: Vec<DomainEvent>) {
		let Some(listener) = listener else {
			if !events.is_empty() {
				trace!(target = "wlanhal.events", count = events.len(), "no listener registered; dropping events");
			}
			return;
		};
		for event in events {
			let listener = Arc::clone(listener);
			self.push(move || event.deliver(listener.as_ref()));
		}
	}

	/// Queues the upstream side of an honored death: one `DaemonDisconnected` per
	/// interface, then the death handler.
	pub(crate) fn death(&mut self, verdict: DeathVerdict, listener: Option<&Arc<dyn DomainEventListener>>) {
		let DeathVerdict::Honored { handler, interfaces } = verdict else {
			return;
		};
		let events = interfaces.into_iter().map(|iface| DomainEvent::DaemonDisconnected { iface }).collect();
		self.events(listener, events);
		if let Some(handler) = handler {
			self.push(move || handler.on_death());
		}
	}

	pub(crate) fn deliver(self) {
		for action in self.actions {
			action();
		}
	}
}

/// Event as seen by a HAL after classification.
#[derive(Debug)]
pub(crate) enum DaemonEvent {
	/// Death notification that no termination waiter claimed.
	Died { handle: String, cookie: EpochCookie },
	/// The watched service (re)appeared.
	Registered(RegistrationParams),
	/// Interface or service callback.
	Callback(Event),
	/// Transport ended.
	LinkClosed,
}

/// HAL state the worker feeds.
pub(crate) trait EventSink: Send + 'static {
	fn handle_event(&mut self, event: DaemonEvent) -> BoxFuture<'_, Notifications>;
}

fn classify(event: ConnectionEvent, waiters: &DeathWaiters) -> Option<DaemonEvent> {
	let event = match event {
		ConnectionEvent::Closed => {
			waiters.resolve_all();
			return Some(DaemonEvent::LinkClosed);
		}
		ConnectionEvent::Event(event) => event,
	};
	match event.method.as_str() {
		method::ON_SERVICE_DIED => {
			let ServiceDiedParams { cookie } = match serde_json::from_value(event.params) {
				Ok(params) => params,
				Err(err) => {
					warn!(target = "wlanhal.death", handle = %event.handle, error = %err, "malformed death notification");
					return None;
				}
			};
			if waiters.resolve(cookie) {
				debug!(target = "wlanhal.death", handle = %event.handle, cookie, "termination waiter released");
				return None;
			}
			Some(DaemonEvent::Died { handle: event.handle, cookie })
		}
		method::ON_REGISTRATION if event.handle == SERVICE_MANAGER_HANDLE => match serde_json::from_value(event.params) {
			Ok(params) => Some(DaemonEvent::Registered(params)),
			Err(err) => {
				warn!(target = "wlanhal.discovery", error = %err, "malformed registration notification");
				None
			}
		},
		_ => Some(DaemonEvent::Callback(event)),
	}
}

/// Runs until the connection closes.
///
/// Termination waiters are resolved before the state lock is taken, so a
/// caller waiting for death without the lock is released promptly.
pub(crate) async fn run_event_loop<S: EventSink>(state: Arc<Mutex<S>>, waiters: DeathWaiters, mut events: UnboundedReceiver<ConnectionEvent>) {
	while let Some(event) = events.recv().await {
		let Some(event) = classify(event, &waiters) else {
			continue;
		};
		let closed = matches!(event, DaemonEvent::LinkClosed);
		let notifications = {
			let mut guard = state.lock().await;
			guard.handle_event(event).await
		};
		notifications.deliver();
		if closed {
			break;
		}
	}
	debug!(target = "wlanhal.events", "event worker stopped");
}

/// Connection loop, event worker, and the state they share.
///
/// Both tasks are aborted when the worker is dropped.
pub(crate) struct Worker<S> {
	state: Arc<Mutex<S>>,
	tasks: Vec<JoinHandle<()>>,
}

impl<S: EventSink> Worker<S> {
	/// Spawns onto the current Tokio runtime.
	pub(crate) fn spawn(parts: TransportParts, build: impl FnOnce(Arc<Connection>, DeathWaiters) -> S) -> Self {
		let (connection, events) = Connection::new(parts);
		let connection = Arc::new(connection);
		let waiters = DeathWaiters::default();
		let state = Arc::new(Mutex::new(build(Arc::clone(&connection), waiters.clone())));

		let reader = tokio::spawn(async move { connection.run().await });
		let worker = tokio::spawn(run_event_loop(Arc::clone(&state), waiters, events));
		Self {
			state,
			tasks: vec![reader, worker],
		}
	}

	pub(crate) async fn lock(&self) -> MutexGuard<'_, S> {
		self.state.lock().await
	}
}

impl<S> Drop for Worker<S> {
	fn drop(&mut self) {
		for task in &self.tasks {
			task.abort();
		}
	}
}

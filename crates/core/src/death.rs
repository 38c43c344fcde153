//! Death notifications and epoch cookies.
//!
//! Every initialization attempt mints a fresh [`EpochCookie`] and links it to
//! the root handle. A later `onServiceDied` carrying that cookie invalidates
//! the registry; any other cookie is a leftover from an earlier epoch and is
//! dropped. Termination uses its own cookie and a one-shot waiter so it can
//! block (bounded) until the daemon is actually gone.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::proxy::DaemonObject;
use crate::registry::{DaemonHandleRegistry, HandleInvalidation};

pub type EpochCookie = u64;

/// Cookie used for links that are not epoch-guarded (service manager, vendor service).
pub const UNGUARDED_COOKIE: EpochCookie = 0;

/// Upstream notification that the daemon died.
pub trait DeathEventHandler: Send + Sync {
	fn on_death(&self);
}

impl<F> DeathEventHandler for F
where
	F: Fn() + Send + Sync,
{
	fn on_death(&self) {
		self()
	}
}

/// Pending termination waits, shared with the event worker.
///
/// Resolved by the worker before it takes the state lock, so a caller that
/// released the lock to wait is never starved by its own death notification.
#[derive(Clone, Default)]
pub(crate) struct DeathWaiters(Arc<Mutex<HashMap<EpochCookie, oneshot::Sender<()>>>>);

impl DeathWaiters {
	pub(crate) fn arm(&self, cookie: EpochCookie) -> oneshot::Receiver<()> {
		let (tx, rx) = oneshot::channel();
		self.0.lock().insert(cookie, tx);
		rx
	}

	fn disarm(&self, cookie: EpochCookie) {
		self.0.lock().remove(&cookie);
	}

	/// Completes the waiter for `cookie`; false when no waiter owns it.
	pub(crate) fn resolve(&self, cookie: EpochCookie) -> bool {
		match self.0.lock().remove(&cookie) {
			Some(tx) => {
				let _ = tx.send(());
				true
			}
			None => false,
		}
	}

	/// Completes every waiter; the link carrying them is gone.
	pub(crate) fn resolve_all(&self) {
		for (_, tx) in self.0.lock().drain() {
			let _ = tx.send(());
		}
	}
}

/// Outcome of a death notification.
pub(crate) enum DeathVerdict {
	/// Cookie did not match the active epoch; nothing changed.
	Stale,
	/// Registry invalidated. Carries the handler to notify once the lock is released.
	Honored {
		handler: Option<Arc<dyn DeathEventHandler>>,
		interfaces: Vec<String>,
	},
}

pub struct DeathSupervisor {
	minted: EpochCookie,
	active: Option<EpochCookie>,
	handler: Option<Arc<dyn DeathEventHandler>>,
	waiters: DeathWaiters,
}

impl DeathSupervisor {
	pub(crate) fn new(waiters: DeathWaiters) -> Self {
		Self {
			minted: UNGUARDED_COOKIE,
			active: None,
			handler: None,
			waiters,
		}
	}

	fn mint(&mut self) -> EpochCookie {
		self.minted += 1;
		self.minted
	}

	/// Starts a new initialization attempt; the returned cookie is strictly greater than any before it.
	pub fn begin_epoch(&mut self) -> EpochCookie {
		let cookie = self.mint();
		self.active = Some(cookie);
		debug!(target = "wlanhal.death", cookie, "epoch started");
		cookie
	}

	pub fn active_cookie(&self) -> Option<EpochCookie> {
		self.active
	}

	/// Links `object` for death with `cookie`. `Ok(false)` is fatal to the current attempt.
	pub(crate) async fn link_for_death(&self, object: &DaemonObject, cookie: EpochCookie) -> Result<bool> {
		let linked = object.link_to_death(cookie).await?;
		if !linked {
			warn!(target = "wlanhal.death", handle = object.handle(), cookie, "death link refused");
		}
		Ok(linked)
	}

	/// Applies a death notification.
	///
	/// Only the active cookie is honored, and only once: it is retired here.
	pub(crate) fn on_death_notification(&mut self, cookie: EpochCookie, registry: &mut DaemonHandleRegistry, cascade: &mut dyn HandleInvalidation) -> DeathVerdict {
		if self.active != Some(cookie) {
			info!(target = "wlanhal.death", cookie, active = ?self.active, "ignoring stale death notification");
			return DeathVerdict::Stale;
		}
		self.active = None;
		info!(target = "wlanhal.death", cookie, "daemon died");
		let interfaces = registry.invalidate(cascade);
		DeathVerdict::Honored {
			handler: self.handler.clone(),
			interfaces,
		}
	}

	/// Death of the active epoch for reasons other than a notification (link closed, failed init).
	pub(crate) fn fail_active_epoch(&mut self, registry: &mut DaemonHandleRegistry, cascade: &mut dyn HandleInvalidation) -> DeathVerdict {
		match self.active {
			Some(cookie) => self.on_death_notification(cookie, registry, cascade),
			None => {
				let interfaces = registry.invalidate(cascade);
				if interfaces.is_empty() {
					DeathVerdict::Stale
				} else {
					DeathVerdict::Honored { handler: None, interfaces }
				}
			}
		}
	}

	/// Installs the upstream handler; returns false if one was replaced.
	pub fn register_handler(&mut self, handler: Arc<dyn DeathEventHandler>) -> bool {
		let replaced = self.handler.replace(handler).is_some();
		if replaced {
			warn!(target = "wlanhal.death", "replacing existing death handler");
		}
		!replaced
	}

	/// Removes the upstream handler; returns false if none was installed.
	pub fn deregister_handler(&mut self) -> bool {
		let removed = self.handler.take().is_some();
		if !removed {
			warn!(target = "wlanhal.death", "no death handler to deregister");
		}
		removed
	}

	/// Links a dedicated waiter cookie on `root` before termination is requested.
	///
	/// Call with the state lock held, send `terminate`, then release the lock
	/// and pass the receiver to [`await_death`].
	pub(crate) async fn arm_termination(&mut self, root: &DaemonObject) -> Result<oneshot::Receiver<()>> {
		let cookie = self.mint();
		let rx = self.waiters.arm(cookie);
		match self.link_for_death(root, cookie).await {
			Ok(true) => Ok(rx),
			Ok(false) => {
				self.waiters.disarm(cookie);
				Err(Error::DeathLinkFailed(root.handle().to_string()))
			}
			Err(err) => {
				self.waiters.disarm(cookie);
				Err(err)
			}
		}
	}
}

/// Waits for an armed termination to complete; false on timeout.
pub(crate) async fn await_death(rx: oneshot::Receiver<()>, timeout: Duration) -> bool {
	match tokio::time::timeout(timeout, rx).await {
		Ok(_) => true,
		Err(_) => {
			warn!(target = "wlanhal.death", timeout_ms = timeout.as_millis() as u64, "timed out waiting for daemon death");
			false
		}
	}
}

//! Daemon process liveness helpers.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Returns `true` when a process with `pid` appears alive on this platform.
pub fn pid_is_alive(pid: u32) -> bool {
	#[cfg(unix)]
	{
		if pid == 0 {
			return false;
		}

		if PathBuf::from("/proc").join(pid.to_string()).exists() {
			return true;
		}

		std::process::Command::new("kill")
			.arg("-0")
			.arg(pid.to_string())
			.status()
			.map(|status| status.success())
			.unwrap_or(pid == std::process::id())
	}

	#[cfg(not(unix))]
	{
		pid == std::process::id()
	}
}

/// A daemon identified by the PID file it writes on startup.
#[derive(Debug, Clone)]
pub struct DaemonProcess {
	pid_file: PathBuf,
}

impl DaemonProcess {
	pub fn new(pid_file: impl Into<PathBuf>) -> Self {
		Self { pid_file: pid_file.into() }
	}

	pub fn pid_file(&self) -> &Path {
		&self.pid_file
	}

	/// Reads the recorded PID; `None` when the daemon left no PID file.
	pub fn pid(&self) -> Result<Option<u32>> {
		let content = match std::fs::read_to_string(&self.pid_file) {
			Ok(content) => content,
			Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
			Err(err) => return Err(err.into()),
		};
		let trimmed = content.trim();
		if trimmed.is_empty() {
			return Ok(None);
		}
		trimmed
			.parse::<u32>()
			.map(Some)
			.map_err(|_| Error::Io(io::Error::new(io::ErrorKind::InvalidData, format!("invalid pid {trimmed:?} in {}", self.pid_file.display()))))
	}

	/// Whether the recorded PID belongs to a live process.
	///
	/// An unreadable or malformed PID file counts as not running.
	pub fn is_running(&self) -> bool {
		matches!(self.pid(), Ok(Some(pid)) if pid_is_alive(pid))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[cfg(unix)]
	#[test]
	fn current_process_is_alive() {
		assert!(pid_is_alive(std::process::id()));
	}

	#[cfg(unix)]
	#[test]
	fn pid_zero_is_never_alive() {
		assert!(!pid_is_alive(0));
	}

	#[test]
	fn missing_pid_file_means_not_running() {
		let dir = tempfile::tempdir().unwrap();
		let process = DaemonProcess::new(dir.path().join("hostapd.pid"));
		assert_eq!(process.pid().unwrap(), None);
		assert!(!process.is_running());
	}

	#[cfg(unix)]
	#[test]
	fn pid_file_of_live_process_is_running() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("hostapd.pid");
		std::fs::write(&path, format!("{}\n", std::process::id())).unwrap();
		let process = DaemonProcess::new(&path);
		assert_eq!(process.pid().unwrap(), Some(std::process::id()));
		assert!(process.is_running());
	}

	#[test]
	fn malformed_pid_file_is_invalid_data() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("hostapd.pid");
		std::fs::write(&path, "not-a-pid").unwrap();
		let process = DaemonProcess::new(&path);
		assert!(matches!(process.pid(), Err(Error::Io(err)) if err.kind() == io::ErrorKind::InvalidData));
		assert!(!process.is_running());
	}
}

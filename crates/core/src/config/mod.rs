//! Persistent HAL settings.
//!
//! Stored as camelCase JSON; every field has a default so partial files load.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wlanhal_protocol::ChannelRange;

use crate::error::{Error, Result};


const CONFIG_SCHEMA_VERSION: u32 = 1;
const DEFAULT_INSTANCE_NAME: &str = "default";
const DEFAULT_WAIT_FOR_DEATH_TIMEOUT_MS: u64 = 50;

/// Soft-AP channel and mode settings applied by `addAccessPoint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftApConfig {
	#[serde(default = "default_true")]
	pub enable_acs: bool,
	#[serde(default)]
	pub acs_include_dfs: bool,
	#[serde(default)]
	pub enable_ieee80211ac: bool,
	/// Comma-separated channels and ranges, e.g. `"1-6,11,36-48"`.
	#[serde(default)]
	pub acs_channel_ranges: String,
	/// Overrides ACS and the requested channel when set.
	#[serde(default)]
	pub forced_channel: Option<u32>,
}

impl Default for SoftApConfig {
	fn default() -> Self {
		Self {
			enable_acs: true,
			acs_include_dfs: false,
			enable_ieee80211ac: false,
			acs_channel_ranges: String::new(),
			forced_channel: None,
		}
	}
}

impl SoftApConfig {
	pub fn channel_ranges(&self) -> Vec<ChannelRange> {
		parse_acs_channel_ranges(&self.acs_channel_ranges)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HalConfig {
	#[serde(default = "default_schema")]
	pub schema: u32,
	/// Service instance name passed to discovery.
	#[serde(default = "default_instance_name")]
	pub instance_name: String,
	#[serde(default = "default_wait_for_death_timeout_ms")]
	pub wait_for_death_timeout_ms: u64,
	#[serde(default)]
	pub verbose_logging: bool,
	#[serde(default)]
	pub hostapd_pid_file: Option<PathBuf>,
	#[serde(default)]
	pub soft_ap: SoftApConfig,
}

impl Default for HalConfig {
	fn default() -> Self {
		Self {
			schema: CONFIG_SCHEMA_VERSION,
			instance_name: DEFAULT_INSTANCE_NAME.to_string(),
			wait_for_death_timeout_ms: DEFAULT_WAIT_FOR_DEATH_TIMEOUT_MS,
			verbose_logging: false,
			hostapd_pid_file: None,
			soft_ap: SoftApConfig::default(),
		}
	}
}

impl HalConfig {
	/// Loads a config file; a missing or malformed file is an error.
	pub fn load(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path).map_err(|err| Error::Config {
			path: path.to_path_buf(),
			message: err.to_string(),
		})?;
		let config: HalConfig = serde_json::from_str(&content).map_err(|err| Error::Config {
			path: path.to_path_buf(),
			message: err.to_string(),
		})?;
		if config.schema > CONFIG_SCHEMA_VERSION {
			return Err(Error::Config {
				path: path.to_path_buf(),
				message: format!("unsupported schema {} (newest known is {CONFIG_SCHEMA_VERSION})", config.schema),
			});
		}
		Ok(config)
	}

	/// Like [`load`](Self::load) but falls back to defaults when the file does not exist.
	pub fn load_or_default(path: &Path) -> Result<Self> {
		if !path.exists() {
			debug!(target = "wlanhal.config", path = %path.display(), "no config file; using defaults");
			return Ok(Self::default());
		}
		Self::load(path)
	}

	pub fn save(&self, path: &Path) -> Result<()> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}
		let json = serde_json::to_string_pretty(self)?;
		fs::write(path, json)?;
		Ok(())
	}

	pub fn wait_for_death_timeout(&self) -> Duration {
		Duration::from_millis(self.wait_for_death_timeout_ms)
	}
}

fn default_true() -> bool {
	true
}

fn default_schema() -> u32 {
	CONFIG_SCHEMA_VERSION
}

fn default_instance_name() -> String {
	DEFAULT_INSTANCE_NAME.to_string()
}

fn default_wait_for_death_timeout_ms() -> u64 {
	DEFAULT_WAIT_FOR_DEATH_TIMEOUT_MS
}

/// Parses an ACS channel list such as `"1-6,11,36-48"`.
///
/// Malformed entries and ranges with start > end are skipped.
pub fn parse_acs_channel_ranges(list: &str) -> Vec<ChannelRange> {
	let mut ranges = Vec::new();
	for entry in list.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
		let parsed = match entry.split_once('-') {
			Some((start, end)) => start.trim().parse::<u32>().ok().zip(end.trim().parse::<u32>().ok()),
			None => entry.parse::<u32>().ok().map(|channel| (channel, channel)),
		};
		match parsed {
			Some((start, end)) if start <= end => ranges.push(ChannelRange { start, end }),
			_ => debug!(target = "wlanhal.config", entry, "skipping malformed ACS channel entry"),
		}
	}
	ranges
}

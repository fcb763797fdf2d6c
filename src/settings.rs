use crate::modules::tracker::{TrackerKind, DEFAULT_PRIORITY};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "vset.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
	pub input: InputSettings,
	pub select: SelectSettings,
	pub tracker: TrackerSettings,
	pub display: DisplaySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputSettings {
	pub camera: i32,
	pub video: Option<PathBuf>,
	pub width: Option<u32>,
	pub height: Option<u32>,
	pub fps: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectSettings {
	pub timeout_sec: u64,
	/// Both sides of a drawn box must be strictly larger than this, in pixels.
	pub min_size: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
	pub preferred: Option<TrackerKind>,
	pub priority: Vec<TrackerKind>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
	pub max_width: Option<i32>,
	pub max_height: Option<i32>,
	pub error_pause_ms: i32,
}

impl Default for InputSettings {
	fn default() -> Self {
		Self {
			camera: 0,
			video: None,
			width: None,
			height: None,
			fps: None,
		}
	}
}

impl Default for SelectSettings {
	fn default() -> Self {
		Self {
			timeout_sec: 30,
			min_size: 10,
		}
	}
}

impl Default for TrackerSettings {
	fn default() -> Self {
		Self {
			preferred: None,
			priority: DEFAULT_PRIORITY.to_vec(),
		}
	}
}

impl Default for DisplaySettings {
	fn default() -> Self {
		Self {
			max_width: Some(800),
			max_height: Some(600),
			error_pause_ms: 4000,
		}
	}
}

impl DisplaySettings {
	fn validate(&self) -> Result<()> {
		for (name, limit) in [("max_width", self.max_width), ("max_height", self.max_height)] {
			if let Some(limit) = limit {
				if limit <= 0 {
					bail!("display.{} must be positive, got {}", name, limit);
				}
			}
		}
		// wait_key(0) blocks until a key is pressed.
		if self.error_pause_ms <= 0 {
			bail!("display.error_pause_ms must be positive, got {}", self.error_pause_ms);
		}
		Ok(())
	}
}

impl VisionSettings {
	pub fn from_toml(content: &str) -> Result<Self> {
		let vset: Self = toml::from_str(content).context("unable to deserialise vision settings")?;
		vset.display.validate()?;
		Ok(vset)
	}

	/// Loads settings from `path`, falling back to defaults when the file does not exist.
	pub fn load(path: &Path) -> Result<Self> {
		match fs::read_to_string(path) {
			Ok(content) => {
				log::info!("loaded settings from {}", path.display());
				Self::from_toml(&content).with_context(|| format!("in {}", path.display()))
			}
			Err(e) if e.kind() == ErrorKind::NotFound => {
				log::info!("{} not found, using default settings", path.display());
				Ok(Self::default())
			}
			Err(e) => Err(e).with_context(|| format!("unable to read {}", path.display())),
		}
	}
}

//! Profile config for the CLI: a JSON file plus environment overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use embed::EmbedConfig;
use serde::{Deserialize, Serialize};

pub const ENV_API_URL: &str = "SPACE_EMBED_API_URL";
pub const ENV_SPACES_URL: &str = "SPACE_EMBED_SPACES_URL";
pub const ENV_PUBLISHABLE_KEY: &str = "SPACE_EMBED_PUBLISHABLE_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CliConfig {
	#[serde(flatten)]
	pub embed: EmbedConfig,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub publishable_key: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub environment_id: Option<String>,
}

/// `<config dir>/space-embed/config.json`.
pub fn default_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("space-embed").join("config.json"))
}

impl CliConfig {
	/// Loads `explicit`, which must exist, or the default path if present,
	/// then applies environment overrides.
	pub fn load(explicit: Option<&Path>) -> Result<Self> {
		let mut config = match explicit {
			Some(path) => Self::read(path)?,
			None => match default_path().filter(|path| path.exists()) {
				Some(path) => Self::read(&path)?,
				None => Self::default(),
			},
		};
		config.apply_overrides(|key| std::env::var(key).ok());
		Ok(config)
	}

	pub fn read(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
		serde_json::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
	}

	/// Applies non-empty values returned by `lookup` for the override
	/// variables.
	pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
		let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
		if let Some(url) = lookup(ENV_API_URL) {
			self.embed.api_url = url;
		}
		if let Some(url) = lookup(ENV_SPACES_URL) {
			self.embed.spaces_base_url = url;
		}
		if let Some(key) = lookup(ENV_PUBLISHABLE_KEY) {
			self.publishable_key = Some(key);
		}
	}
}

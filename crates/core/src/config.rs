//! Embedding configuration: endpoints and surface presentation.

use serde::{Deserialize, Serialize};

/// Base URL of the hosted Spaces application loaded into the frame.
pub const DEFAULT_SPACES_URL: &str = "https://spaces.flatfile.com";
/// Base URL of the Space API.
pub const DEFAULT_API_URL: &str = "https://platform.flatfile.com/api";
/// Id of the element the surface is appended to when none is configured.
pub const DEFAULT_MOUNT_POINT_ID: &str = "flatfile_iFrameContainer";

/// Presentation of the embedding surface and its exit confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayOptions {
	/// Render as a fixed overlay with a close affordance.
	pub display_as_modal: bool,
	/// Id of the element the surface is appended to.
	pub mount_point_id: String,
	pub exit_title: String,
	pub exit_text: String,
	pub exit_primary_button_text: String,
	pub exit_secondary_button_text: String,
}

impl Default for DisplayOptions {
	fn default() -> Self {
		Self {
			display_as_modal: true,
			mount_point_id: DEFAULT_MOUNT_POINT_ID.to_string(),
			exit_title: "Close Window".to_string(),
			exit_text: "Are you sure you would like to close this window? This will end your current data import session.".to_string(),
			exit_primary_button_text: "Yes, exit".to_string(),
			exit_secondary_button_text: "No, stay".to_string(),
		}
	}
}

impl DisplayOptions {
	pub fn with_mount_point(mut self, id: impl Into<String>) -> Self {
		self.mount_point_id = id.into();
		self
	}

	pub fn with_modal(mut self, display_as_modal: bool) -> Self {
		self.display_as_modal = display_as_modal;
		self
	}
}

/// Endpoints and display defaults shared by every session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbedConfig {
	pub spaces_base_url: String,
	pub api_url: String,
	pub display: DisplayOptions,
}

impl Default for EmbedConfig {
	fn default() -> Self {
		Self {
			spaces_base_url: DEFAULT_SPACES_URL.to_string(),
			api_url: DEFAULT_API_URL.to_string(),
			display: DisplayOptions::default(),
		}
	}
}

//! Space resources: creation body, update body and the returned Space.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Default name given to Spaces created for an embedded session.
pub const DEFAULT_SPACE_NAME: &str = "Embedded Space";
/// Default label attached to Spaces created for an embedded session.
pub const DEFAULT_SPACE_LABEL: &str = "embedded";
/// Default namespace for embedded Spaces.
pub const DEFAULT_SPACE_NAMESPACE: &str = "portal";

/// Body of `POST /v1/spaces`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceConfig {
	pub name: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub labels: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub namespace: Option<String>,
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub metadata: Map<String, Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub environment_id: Option<String>,
}

impl Default for SpaceConfig {
	fn default() -> Self {
		let mut metadata = Map::new();
		metadata.insert("sidebarConfig".to_string(), json!({ "showSidebar": false }));
		Self {
			name: DEFAULT_SPACE_NAME.to_string(),
			labels: vec![DEFAULT_SPACE_LABEL.to_string()],
			namespace: Some(DEFAULT_SPACE_NAMESPACE.to_string()),
			metadata,
			environment_id: None,
		}
	}
}

impl SpaceConfig {
	/// Returns a copy bound to the given environment.
	pub fn for_environment(&self, environment_id: &str) -> Self {
		Self {
			environment_id: Some(environment_id.to_string()),
			..self.clone()
		}
	}
}

/// Space metadata written after creation (theme, sidebar, user/space info).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceMetadata {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub theme: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sidebar_config: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_info: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub space_info: Option<Value>,
}

/// Body of `PATCH /v1/spaces/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceUpdate {
	pub environment_id: String,
	pub metadata: SpaceMetadata,
}

/// A Space as returned by the API.
///
/// Only the fields the embedding needs are typed; everything else is kept
/// in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub access_token: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub guest_link: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub environment_id: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_matches_embedded_defaults() {
		let config = SpaceConfig::default();
		let value = serde_json::to_value(&config).unwrap();
		assert_eq!(value["name"], "Embedded Space");
		assert_eq!(value["labels"], json!(["embedded"]));
		assert_eq!(value["namespace"], "portal");
		assert_eq!(value["metadata"]["sidebarConfig"]["showSidebar"], false);
		assert!(value.get("environmentId").is_none());
	}

	#[test]
	fn space_keeps_unknown_fields() {
		let space: Space = serde_json::from_str(r#"{"id": "us_sp_1", "accessToken": "tok", "name": "Imports"}"#).unwrap();
		assert_eq!(space.access_token.as_deref(), Some("tok"));
		assert!(space.guest_link.is_none());
		assert_eq!(space.extra["name"], "Imports");
	}
}

//! Workbook creation types and the action declarations they carry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the hosted workspace runs an action's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionMode {
	#[default]
	Foreground,
	Background,
	ToolbarBlocking,
}

/// An action declared on a workbook or sheet.
///
/// The `operation` is what comes back in a `job:outcome-acknowledged`
/// payload, so it is the value a close intent matches against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
	pub slug: String,
	pub label: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub operation: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mode: Option<ActionMode>,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub primary: bool,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub confirm: bool,
}

impl Action {
	/// Declares an action from a bare name; slug and label both take it.
	pub fn named(name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			slug: name.clone(),
			label: name,
			operation: None,
			description: None,
			mode: None,
			primary: false,
			confirm: false,
		}
	}

	/// Declares an action from a slug and optional label. A missing or empty
	/// label falls back to the slug.
	pub fn with_slug(slug: impl Into<String>, label: Option<&str>) -> Self {
		let slug = slug.into();
		let label = label.filter(|l| !l.is_empty()).map(str::to_string).unwrap_or_else(|| slug.clone());
		Self {
			label,
			..Self::named(slug)
		}
	}

	pub fn operation(mut self, operation: impl Into<String>) -> Self {
		self.operation = Some(operation.into());
		self
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn mode(mut self, mode: ActionMode) -> Self {
		self.mode = Some(mode);
		self
	}

	pub fn primary(mut self, primary: bool) -> Self {
		self.primary = primary;
		self
	}

	pub fn confirm(mut self, confirm: bool) -> Self {
		self.confirm = confirm;
		self
	}
}

/// Workbook definition supplied by the host application.
///
/// Sheets are passed through untouched; their schema belongs to the hosted
/// workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookConfig {
	pub name: String,
	#[serde(default)]
	pub sheets: Vec<Value>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub actions: Vec<Action>,
}

/// Body of `POST /v1/workbooks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookCreate {
	pub space_id: String,
	pub environment_id: String,
	pub name: String,
	pub sheets: Vec<Value>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub actions: Vec<Action>,
}

impl WorkbookCreate {
	pub fn new(config: &WorkbookConfig, space_id: &str, environment_id: &str) -> Self {
		Self {
			space_id: space_id.to_string(),
			environment_id: environment_id.to_string(),
			name: config.name.clone(),
			sheets: config.sheets.clone(),
			actions: config.actions.clone(),
		}
	}
}

/// A created workbook. Only the id is needed to confirm creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
	#[serde(default)]
	pub id: Option<String>,
}

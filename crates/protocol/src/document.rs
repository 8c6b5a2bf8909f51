//! Documents attached to a Space (rendered as the landing page inside it).

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/spaces/{id}/documents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentConfig {
	pub title: String,
	pub body: String,
}

/// A created document. Only the id is needed to confirm creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
	#[serde(default)]
	pub id: Option<String>,
}

//! Response envelope shared by every Space API call.

use serde::{Deserialize, Serialize};

/// Every Space API response wraps its payload in a `data` field.
///
/// An absent `data` signals failure even when the HTTP exchange itself
/// succeeded:
/// ```json
/// { "data": { "id": "us_sp_123", "accessToken": "..." } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
}

impl<T> ApiResponse<T> {
	/// Wraps a payload.
	pub fn ok(data: T) -> Self {
		Self { data: Some(data) }
	}

	/// A response without payload.
	pub fn empty() -> Self {
		Self { data: None }
	}

	/// Consumes the envelope and returns the payload, if any.
	pub fn into_data(self) -> Option<T> {
		self.data
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::Value;

	#[test]
	fn missing_data_deserializes_to_none() {
		let response: ApiResponse<Value> = serde_json::from_str("{}").unwrap();
		assert!(response.data.is_none());
	}

	#[test]
	fn null_data_deserializes_to_none() {
		let response: ApiResponse<Value> = serde_json::from_str(r#"{"data": null}"#).unwrap();
		assert!(response.into_data().is_none());
	}
}

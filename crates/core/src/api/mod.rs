//! Remote Space API seam.
//!
//! [`SpaceApi`] is the collaborator the resolver talks to; [`ApiClientFactory`]
//! hands out clients bound to exactly one credential so that a resumed
//! Space is only ever touched with its own access token.

mod http;

pub use http::{HttpClientFactory, HttpSpaceApi};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use space_embed_protocol::{ApiResponse, Document, DocumentConfig, Space, SpaceConfig, SpaceUpdate, Workbook, WorkbookCreate};

use crate::error::Result;

/// Credential a client is scoped to.
#[derive(Clone, PartialEq, Eq)]
pub enum ApiCredential {
	/// Environment-wide publishable key; only used to create Spaces.
	PublishableKey(String),
	/// Access token of a single Space.
	AccessToken(String),
}

impl ApiCredential {
	pub(crate) fn secret(&self) -> &str {
		match self {
			ApiCredential::PublishableKey(key) => key,
			ApiCredential::AccessToken(token) => token,
		}
	}

	pub fn is_access_token(&self) -> bool {
		matches!(self, ApiCredential::AccessToken(_))
	}
}

impl fmt::Debug for ApiCredential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiCredential::PublishableKey(_) => f.write_str("PublishableKey(..)"),
			ApiCredential::AccessToken(_) => f.write_str("AccessToken(..)"),
		}
	}
}

/// Remote Space operations. Every call is single-attempt; a response
/// without `data` signals failure to the caller.
#[async_trait]
pub trait SpaceApi: Send + Sync {
	async fn create_space(&self, config: &SpaceConfig) -> Result<ApiResponse<Space>>;

	async fn get_space(&self, space_id: &str) -> Result<ApiResponse<Space>>;

	async fn update_space(&self, space_id: &str, update: &SpaceUpdate) -> Result<ApiResponse<Space>>;

	async fn create_workbook(&self, workbook: &WorkbookCreate) -> Result<ApiResponse<Workbook>>;

	async fn create_document(&self, space_id: &str, document: &DocumentConfig) -> Result<ApiResponse<Document>>;
}

/// Builds [`SpaceApi`] clients scoped to a single credential.
pub trait ApiClientFactory: Send + Sync {
	fn client(&self, api_url: &str, credential: ApiCredential) -> Arc<dyn SpaceApi>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_output_hides_secrets() {
		let credential = ApiCredential::AccessToken("sk_secret".into());
		assert_eq!(format!("{credential:?}"), "AccessToken(..)");
		assert!(credential.is_access_token());
		assert_eq!(credential.secret(), "sk_secret");
	}
}

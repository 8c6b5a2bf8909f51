//! Session resolution: create a Space or re-authenticate an existing one.
//!
//! Creation runs as a strictly ordered pipeline where each remote stage
//! gates the next:
//!
//! 1. create Space (publishable key)
//! 2. create workbook, when configured
//! 3. update Space metadata (theme, sidebar, user and space info)
//! 4. create document, when configured
//!
//! A failing stage aborts the pipeline with an error naming the stage.
//! Whatever earlier stages created stays on the remote side; nothing is
//! rolled back.
//!
//! Re-authentication issues a single "get Space" through a client scoped to
//! the Space's own access token.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use space_embed_protocol::{DocumentConfig, Space, SpaceConfig, SpaceMetadata, SpaceUpdate, WorkbookConfig, WorkbookCreate};
use tracing::{debug, info};

use crate::api::{ApiClientFactory, ApiCredential, HttpClientFactory, SpaceApi};
use crate::error::{Error, ResolveStage, Result};
use crate::identity::{SessionHandle, SpaceIdentity};

/// Everything used to populate a newly created Space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpaceCreateOptions {
	pub space: SpaceConfig,
	pub workbook: Option<WorkbookConfig>,
	pub document: Option<DocumentConfig>,
	pub theme_config: Option<Value>,
	pub sidebar_config: Option<Value>,
	pub user_info: Option<Value>,
	pub space_info: Option<Value>,
}

impl SpaceCreateOptions {
	fn metadata(&self) -> SpaceMetadata {
		SpaceMetadata {
			theme: self.theme_config.clone(),
			sidebar_config: self.sidebar_config.clone(),
			user_info: self.user_info.clone(),
			space_info: self.space_info.clone(),
		}
	}
}

/// Resolves a [`SpaceIdentity`] into a [`SessionHandle`].
#[derive(Clone)]
pub struct SessionResolver {
	clients: Arc<dyn ApiClientFactory>,
}

impl SessionResolver {
	pub fn new(clients: Arc<dyn ApiClientFactory>) -> Self {
		Self { clients }
	}

	/// Resolver talking to the real Space API over HTTP.
	pub fn http() -> Self {
		Self::new(Arc::new(HttpClientFactory::default()))
	}

	/// Creates or re-authenticates the Space named by `identity`.
	///
	/// `defaults` only applies to identities without an id; `None` uses
	/// [`SpaceCreateOptions::default`].
	///
	/// # Errors
	///
	/// - [`Error::MissingCredential`] before any remote call when a required
	///   id, key or token is absent
	/// - [`Error::Resolve`] wrapping the cause when a remote stage fails
	pub async fn resolve(&self, identity: &SpaceIdentity, defaults: Option<&SpaceCreateOptions>) -> Result<SessionHandle> {
		if identity.environment_id.is_empty() {
			return Err(Error::MissingCredential("environment id"));
		}

		let handle = match identity.id.as_deref() {
			Some(space_id) => self.reauthenticate(identity, space_id).await?,
			None => {
				let fallback = SpaceCreateOptions::default();
				self.create(identity, defaults.unwrap_or(&fallback)).await?
			}
		};

		info!(
			target = "embed.resolver",
			space_id = handle.space_id(),
			resumed = identity.is_resumed(),
			"space session resolved"
		);
		Ok(handle)
	}

	async fn reauthenticate(&self, identity: &SpaceIdentity, space_id: &str) -> Result<SessionHandle> {
		if space_id.is_empty() {
			return Err(Error::MissingCredential("space id"));
		}
		let token = non_empty(identity.access_token.as_deref()).ok_or(Error::MissingCredential("access token"))?;

		let api = self.clients.client(&identity.api_url, ApiCredential::AccessToken(token.to_string()));
		debug!(target = "embed.resolver", %space_id, "re-authenticating space");

		let space = api
			.get_space(space_id)
			.await
			.map_err(|e| e.at(ResolveStage::SpaceGet))?
			.into_data()
			.ok_or_else(|| {
				Error::AuthenticationFailed {
					space_id: space_id.to_string(),
				}
				.at(ResolveStage::SpaceGet)
			})?;

		handle_for(&space, space_id, identity.spaces_base_url()).map_err(|e| e.at(ResolveStage::SpaceGet))
	}

	async fn create(&self, identity: &SpaceIdentity, options: &SpaceCreateOptions) -> Result<SessionHandle> {
		let key = non_empty(identity.publishable_key.as_deref()).ok_or(Error::MissingCredential("publishable key"))?;
		let environment_id = identity.environment_id.as_str();
		let api = self.clients.client(&identity.api_url, ApiCredential::PublishableKey(key.to_string()));

		debug!(target = "embed.resolver", %environment_id, name = %options.space.name, "creating space");
		let space = api
			.create_space(&options.space.for_environment(environment_id))
			.await
			.map_err(|e| e.at(ResolveStage::SpaceCreate))?
			.into_data()
			.filter(|space| !space.id.is_empty())
			.ok_or_else(|| Error::RemoteCreateFailed("no space id returned".into()).at(ResolveStage::SpaceCreate))?;

		populate_space(api.as_ref(), &space.id, environment_id, options).await?;

		handle_for(&space, &space.id, identity.spaces_base_url()).map_err(|e| e.at(ResolveStage::SpaceCreate))
	}
}

async fn populate_space(api: &dyn SpaceApi, space_id: &str, environment_id: &str, options: &SpaceCreateOptions) -> Result<()> {
	if let Some(workbook) = &options.workbook {
		debug!(target = "embed.resolver", %space_id, workbook = %workbook.name, "creating workbook");
		api.create_workbook(&WorkbookCreate::new(workbook, space_id, environment_id))
			.await
			.map_err(|e| e.at(ResolveStage::WorkbookCreate))?
			.into_data()
			.and_then(|wb| wb.id)
			.filter(|id| !id.is_empty())
			.ok_or_else(|| Error::RemoteCreateFailed("no workbook id returned".into()).at(ResolveStage::WorkbookCreate))?;
	}

	debug!(target = "embed.resolver", %space_id, "updating space metadata");
	let update = SpaceUpdate {
		environment_id: environment_id.to_string(),
		metadata: options.metadata(),
	};
	api.update_space(space_id, &update)
		.await
		.map_err(|e| e.at(ResolveStage::SpaceUpdate))?
		.into_data()
		.ok_or_else(|| Error::RemoteCreateFailed("space update returned no data".into()).at(ResolveStage::SpaceUpdate))?;

	if let Some(document) = &options.document {
		debug!(target = "embed.resolver", %space_id, title = %document.title, "creating document");
		api.create_document(space_id, document)
			.await
			.map_err(|e| e.at(ResolveStage::DocumentCreate))?
			.into_data()
			.and_then(|doc| doc.id)
			.filter(|id| !id.is_empty())
			.ok_or_else(|| Error::RemoteCreateFailed("no document id returned".into()).at(ResolveStage::DocumentCreate))?;
	}

	Ok(())
}

fn handle_for(space: &Space, space_id: &str, spaces_base_url: &str) -> Result<SessionHandle> {
	let token = non_empty(space.access_token.as_deref()).ok_or_else(|| Error::AuthenticationFailed {
		space_id: space_id.to_string(),
	})?;
	SessionHandle::new(space_id, token, space.guest_link.as_deref(), spaces_base_url)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.filter(|v| !v.is_empty())
}

//! `reqwest`-backed Space API client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use space_embed_protocol::{ApiResponse, Document, DocumentConfig, Space, SpaceConfig, SpaceUpdate, Workbook, WorkbookCreate};
use tracing::debug;

use super::{ApiClientFactory, ApiCredential, SpaceApi};
use crate::error::{Error, Result};
use crate::identity::join_segments;

/// Space API client bound to one credential, sent as a bearer token.
#[derive(Clone)]
pub struct HttpSpaceApi {
	client: reqwest::Client,
	base_url: String,
	credential: ApiCredential,
}

impl HttpSpaceApi {
	pub fn new(client: reqwest::Client, api_url: &str, credential: ApiCredential) -> Self {
		Self {
			client,
			base_url: api_url.trim_end_matches('/').to_string(),
			credential,
		}
	}

	/// Sends a request to `base_url` joined with the percent-encoded
	/// `segments`.
	async fn call<T, B>(&self, method: Method, segments: &[&str], body: Option<&B>) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
		B: Serialize + ?Sized,
	{
		let url = join_segments(&self.base_url, segments)?;
		let endpoint = format!("/{}", segments.join("/"));
		debug!(target = "embed.api", %method, %url, "space api request");

		let mut request = self.client.request(method, url).bearer_auth(self.credential.secret());
		if let Some(body) = body {
			request = request.json(body);
		}

		let response = request.send().await?;
		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(Error::Api {
				status: status.as_u16(),
				endpoint,
				body,
			});
		}

		let bytes = response.bytes().await?;
		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(ApiResponse::empty());
		}
		Ok(serde_json::from_slice(&bytes)?)
	}
}

#[async_trait]
impl SpaceApi for HttpSpaceApi {
	async fn create_space(&self, config: &SpaceConfig) -> Result<ApiResponse<Space>> {
		self.call(Method::POST, &["v1", "spaces"], Some(config)).await
	}

	async fn get_space(&self, space_id: &str) -> Result<ApiResponse<Space>> {
		self.call::<_, ()>(Method::GET, &["v1", "spaces", space_id], None).await
	}

	async fn update_space(&self, space_id: &str, update: &SpaceUpdate) -> Result<ApiResponse<Space>> {
		self.call(Method::PATCH, &["v1", "spaces", space_id], Some(update)).await
	}

	async fn create_workbook(&self, workbook: &WorkbookCreate) -> Result<ApiResponse<Workbook>> {
		self.call(Method::POST, &["v1", "workbooks"], Some(workbook)).await
	}

	async fn create_document(&self, space_id: &str, document: &DocumentConfig) -> Result<ApiResponse<Document>> {
		self.call(Method::POST, &["v1", "spaces", space_id, "documents"], Some(document)).await
	}
}

/// Hands out [`HttpSpaceApi`] clients sharing one connection pool.
#[derive(Clone, Default)]
pub struct HttpClientFactory {
	client: reqwest::Client,
}

impl HttpClientFactory {
	pub fn new(client: reqwest::Client) -> Self {
		Self { client }
	}
}

impl ApiClientFactory for HttpClientFactory {
	fn client(&self, api_url: &str, credential: ApiCredential) -> Arc<dyn SpaceApi> {
		Arc::new(HttpSpaceApi::new(self.client.clone(), api_url, credential))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::extract::Path;
	use axum::http::{HeaderMap, StatusCode};
	use axum::routing::{get, post};
	use axum::{Json, Router};
	use serde_json::{Value, json};

	async fn spawn_api() -> String {
		async fn create_space(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
			let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
			Json(json!({ "data": { "id": "us_sp_new", "accessToken": "sk_new", "echo": body, "auth": auth } }))
		}

		async fn get_space(Path(id): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
			if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk_good") {
				return (StatusCode::UNAUTHORIZED, Json(json!({ "errors": [{ "message": "unauthorized" }] })));
			}
			(StatusCode::OK, Json(json!({ "data": { "id": id, "accessToken": "sk_good" } })))
		}

		async fn create_document(Path(id): Path<String>) -> Json<Value> {
			Json(json!({ "data": { "id": format!("us_dc_{id}") } }))
		}

		async fn create_workbook() -> Json<Value> {
			Json(json!({}))
		}

		let app = Router::new()
			.route("/api/v1/spaces", post(create_space))
			.route("/api/v1/spaces/{id}", get(get_space))
			.route("/api/v1/spaces/{id}/documents", post(create_document))
			.route("/api/v1/workbooks", post(create_workbook));

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});
		format!("http://{addr}/api/")
	}

	fn client(api_url: &str, credential: ApiCredential) -> Arc<dyn SpaceApi> {
		HttpClientFactory::default().client(api_url, credential)
	}

	#[tokio::test]
	async fn create_space_posts_camel_case_body_with_bearer_key() {
		let api_url = spawn_api().await;
		let api = client(&api_url, ApiCredential::PublishableKey("pk_123".into()));

		let response = api.create_space(&SpaceConfig::default().for_environment("us_env_1")).await.unwrap();
		let space = response.into_data().unwrap();
		assert_eq!(space.id, "us_sp_new");
		assert_eq!(space.access_token.as_deref(), Some("sk_new"));
		assert_eq!(space.extra["auth"], "Bearer pk_123");
		assert_eq!(space.extra["echo"]["environmentId"], "us_env_1");
		assert_eq!(space.extra["echo"]["namespace"], "portal");
	}

	#[tokio::test]
	async fn get_space_uses_token_scoped_credential() {
		let api_url = spawn_api().await;
		let api = client(&api_url, ApiCredential::AccessToken("sk_good".into()));
		let space = api.get_space("us_sp_9").await.unwrap().into_data().unwrap();
		assert_eq!(space.id, "us_sp_9");
	}

	#[tokio::test]
	async fn space_id_stays_inside_its_path_segment() {
		let api_url = spawn_api().await;
		let api = client(&api_url, ApiCredential::AccessToken("sk_good".into()));
		let space = api.get_space("../workbooks").await.unwrap().into_data().unwrap();
		assert_eq!(space.id, "../workbooks");

		let err = api.get_space("..").await.unwrap_err();
		assert!(matches!(err, Error::InvalidPathSegment(segment) if segment == ".."));
	}

	#[tokio::test]
	async fn non_success_status_becomes_api_error() {
		let api_url = spawn_api().await;
		let api = client(&api_url, ApiCredential::AccessToken("sk_bad".into()));
		let err = api.get_space("us_sp_9").await.unwrap_err();
		match err {
			Error::Api { status, endpoint, body } => {
				assert_eq!(status, 401);
				assert_eq!(endpoint, "/v1/spaces/us_sp_9");
				assert!(body.contains("unauthorized"));
			}
			other => panic!("expected Api error, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn missing_data_is_returned_not_raised() {
		let api_url = spawn_api().await;
		let api = client(&api_url, ApiCredential::PublishableKey("pk_123".into()));
		let create = WorkbookCreate {
			space_id: "us_sp_1".into(),
			environment_id: "us_env_1".into(),
			name: "Contacts".into(),
			sheets: vec![],
			actions: vec![],
		};
		let response = api.create_workbook(&create).await.unwrap();
		assert!(response.into_data().is_none());

		let document = DocumentConfig {
			title: "Welcome".into(),
			body: "<h1>Hi</h1>".into(),
		};
		let created = api.create_document("us_sp_1", &document).await.unwrap().into_data().unwrap();
		assert_eq!(created.id.as_deref(), Some("us_dc_us_sp_1"));
	}
}

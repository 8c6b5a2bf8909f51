//! In-memory collaborators for exercising sessions without a network.
//!
//! [`FakeSpaceApi`] is both an [`ApiClientFactory`] and the recorder behind
//! every client it hands out, so a test can assert which calls were issued,
//! in which order, and with which credential.
//!
//! # Example
//!
//! ```ignore
//! let api = FakeSpaceApi::new();
//! let resolver = SessionResolver::new(Arc::new(api.clone()));
//! let handle = resolver.resolve(&SpaceIdentity::new_space("us_env_1", "pk_1"), None).await?;
//! assert_eq!(api.stages(), vec![ResolveStage::SpaceCreate, ResolveStage::SpaceUpdate]);
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use space_embed_protocol::{ApiResponse, Document, DocumentConfig, Space, SpaceConfig, SpaceUpdate, Workbook, WorkbookCreate};
use tokio::sync::Notify;

use crate::api::{ApiClientFactory, ApiCredential, SpaceApi};
use crate::channel::NotificationClient;
use crate::error::{Error, ResolveStage, Result};

/// A single call observed by [`FakeSpaceApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
	CreateSpace(SpaceConfig),
	GetSpace(String),
	UpdateSpace(String, SpaceUpdate),
	CreateWorkbook(WorkbookCreate),
	CreateDocument(String, DocumentConfig),
}

impl ApiCall {
	pub fn stage(&self) -> ResolveStage {
		match self {
			ApiCall::CreateSpace(_) => ResolveStage::SpaceCreate,
			ApiCall::GetSpace(_) => ResolveStage::SpaceGet,
			ApiCall::UpdateSpace(..) => ResolveStage::SpaceUpdate,
			ApiCall::CreateWorkbook(_) => ResolveStage::WorkbookCreate,
			ApiCall::CreateDocument(..) => ResolveStage::DocumentCreate,
		}
	}
}

/// A call together with the credential of the client that issued it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
	pub credential: ApiCredential,
	pub call: ApiCall,
}

#[derive(Default)]
struct FakeState {
	calls: Vec<RecordedCall>,
	space: Space,
	empty: HashSet<ResolveStage>,
	failing: HashSet<ResolveStage>,
	gate: Option<Arc<Notify>>,
}

/// Scriptable Space API.
#[derive(Clone)]
pub struct FakeSpaceApi {
	state: Arc<Mutex<FakeState>>,
}

impl Default for FakeSpaceApi {
	fn default() -> Self {
		Self::new()
	}
}

impl FakeSpaceApi {
	/// Answers every Space call with `us_sp_fake` / `sk_fake` and no guest link.
	pub fn new() -> Self {
		let space = Space {
			id: "us_sp_fake".to_string(),
			access_token: Some("sk_fake".to_string()),
			..Default::default()
		};
		Self {
			state: Arc::new(Mutex::new(FakeState {
				space,
				..Default::default()
			})),
		}
	}

	/// Space returned by create/get/update calls.
	pub fn with_space(self, space: Space) -> Self {
		self.state.lock().space = space;
		self
	}

	/// Makes the call for `stage` answer without `data`.
	pub fn respond_empty(self, stage: ResolveStage) -> Self {
		self.state.lock().empty.insert(stage);
		self
	}

	/// Makes the call for `stage` fail with a server error.
	pub fn fail(self, stage: ResolveStage) -> Self {
		self.state.lock().failing.insert(stage);
		self
	}

	/// Holds create/get Space calls until `gate` is notified.
	pub fn hold_on(self, gate: Arc<Notify>) -> Self {
		self.state.lock().gate = Some(gate);
		self
	}

	pub fn calls(&self) -> Vec<RecordedCall> {
		self.state.lock().calls.clone()
	}

	/// Stages of the recorded calls, in issue order.
	pub fn stages(&self) -> Vec<ResolveStage> {
		self.state.lock().calls.iter().map(|c| c.call.stage()).collect()
	}

	fn record(&self, credential: &ApiCredential, call: ApiCall) -> Result<Option<ResolveStage>> {
		let stage = call.stage();
		let mut state = self.state.lock();
		state.calls.push(RecordedCall {
			credential: credential.clone(),
			call,
		});
		if state.failing.contains(&stage) {
			return Err(Error::Api {
				status: 500,
				endpoint: format!("fake {stage}"),
				body: "injected failure".to_string(),
			});
		}
		Ok((!state.empty.contains(&stage)).then_some(stage))
	}

	async fn wait_gate(&self) {
		let gate = self.state.lock().gate.clone();
		if let Some(gate) = gate {
			gate.notified().await;
		}
	}

	fn space(&self) -> Space {
		self.state.lock().space.clone()
	}
}

impl ApiClientFactory for FakeSpaceApi {
	fn client(&self, _api_url: &str, credential: ApiCredential) -> Arc<dyn SpaceApi> {
		Arc::new(FakeClient {
			api: self.clone(),
			credential,
		})
	}
}

struct FakeClient {
	api: FakeSpaceApi,
	credential: ApiCredential,
}

#[async_trait]
impl SpaceApi for FakeClient {
	async fn create_space(&self, config: &SpaceConfig) -> Result<ApiResponse<Space>> {
		let answer = self.api.record(&self.credential, ApiCall::CreateSpace(config.clone()))?;
		self.api.wait_gate().await;
		Ok(match answer {
			Some(_) => ApiResponse::ok(self.api.space()),
			None => ApiResponse::empty(),
		})
	}

	async fn get_space(&self, space_id: &str) -> Result<ApiResponse<Space>> {
		let answer = self.api.record(&self.credential, ApiCall::GetSpace(space_id.to_string()))?;
		self.api.wait_gate().await;
		Ok(match answer {
			Some(_) => ApiResponse::ok(Space {
				id: space_id.to_string(),
				..self.api.space()
			}),
			None => ApiResponse::empty(),
		})
	}

	async fn update_space(&self, space_id: &str, update: &SpaceUpdate) -> Result<ApiResponse<Space>> {
		let answer = self.api.record(&self.credential, ApiCall::UpdateSpace(space_id.to_string(), update.clone()))?;
		Ok(match answer {
			Some(_) => ApiResponse::ok(self.api.space()),
			None => ApiResponse::empty(),
		})
	}

	async fn create_workbook(&self, workbook: &WorkbookCreate) -> Result<ApiResponse<Workbook>> {
		let answer = self.api.record(&self.credential, ApiCall::CreateWorkbook(workbook.clone()))?;
		Ok(match answer {
			Some(_) => ApiResponse::ok(Workbook {
				id: Some("us_wb_fake".to_string()),
			}),
			None => ApiResponse::empty(),
		})
	}

	async fn create_document(&self, space_id: &str, document: &DocumentConfig) -> Result<ApiResponse<Document>> {
		let answer = self.api.record(&self.credential, ApiCall::CreateDocument(space_id.to_string(), document.clone()))?;
		Ok(match answer {
			Some(_) => ApiResponse::ok(Document {
				id: Some("us_dc_fake".to_string()),
			}),
			None => ApiResponse::empty(),
		})
	}
}

/// Notification client that counts `unsubscribe_all` calls.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
	unsubscribes: AtomicUsize,
}

impl RecordingNotifier {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn unsubscribe_count(&self) -> usize {
		self.unsubscribes.load(Ordering::SeqCst)
	}
}

impl NotificationClient for RecordingNotifier {
	fn unsubscribe_all(&self) {
		self.unsubscribes.fetch_add(1, Ordering::SeqCst);
	}
}

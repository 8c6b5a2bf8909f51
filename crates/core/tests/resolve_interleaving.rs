use std::sync::Arc;

use embed::dom::{self, MemoryDom};
use embed::fake::{FakeSpaceApi, RecordingNotifier};
use embed::protocol::{Action, WorkbookConfig};
use embed::{
	CloseEvent, CloseIntent, MessageChannel, Page, ResolveStage, SessionController, SessionOptions, SessionResolver, SpaceCreateOptions,
	SpaceIdentity, SurfaceState, WindowMessage,
};
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Notify;

const SPACES_URL: &str = "https://spaces.flatfile.com";

struct Harness {
	api: FakeSpaceApi,
	dom: Arc<Mutex<MemoryDom>>,
	notifier: Arc<RecordingNotifier>,
	closes: Arc<Mutex<Vec<CloseEvent>>>,
	controller: SessionController,
}

fn harness(api: FakeSpaceApi, options: SessionOptions) -> Harness {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();

	let dom = dom::shared(MemoryDom::with_container("flatfile_iFrameContainer"));
	let notifier = RecordingNotifier::new();
	let closes = Arc::new(Mutex::new(Vec::new()));
	let seen = closes.clone();
	let options = options.with_close_intent(CloseIntent::new("submitActionFg", move |event| seen.lock().push(event)));
	let controller = SessionController::new(
		SessionResolver::new(Arc::new(api.clone())),
		Page::new(dom.clone()),
		MessageChannel::new(SPACES_URL, Some(notifier.clone())),
		options,
	);
	Harness {
		api,
		dom,
		notifier,
		closes,
		controller,
	}
}

fn new_space() -> SessionOptions {
	SessionOptions::new(SpaceIdentity::new_space("us_env_1", "pk_1"))
}

#[tokio::test]
async fn events_during_resolution_are_handled_and_late_result_discarded() {
	let gate = Arc::new(Notify::new());
	let h = harness(FakeSpaceApi::new().hold_on(gate.clone()), new_space());
	let pristine = h.dom.lock().render_html();

	let driver = async {
		tokio::task::yield_now().await;
		assert_eq!(h.controller.state(), SurfaceState::Loading);
		assert_eq!(h.api.stages(), vec![ResolveStage::SpaceCreate]);

		h.controller.toggle().await.unwrap();
		let message = WindowMessage::new(
			SPACES_URL,
			json!({ "topic": "job:outcome-acknowledged", "payload": { "status": "complete", "operation": "submitActionFg" } }),
		);
		assert_eq!(h.controller.deliver(&message), 0);
		assert_eq!(h.controller.state(), SurfaceState::Loading);

		h.controller.close();
		assert_eq!(h.controller.state(), SurfaceState::Hidden);
		gate.notify_one();
	};

	let (opened, ()) = tokio::join!(h.controller.toggle(), driver);
	opened.unwrap();

	assert_eq!(h.controller.state(), SurfaceState::Hidden);
	assert!(h.controller.surface().is_none());
	assert!(h.controller.handle().is_none());
	assert_eq!(h.dom.lock().render_html(), pristine);
	assert_eq!(*h.closes.lock(), vec![CloseEvent::UserExit]);
	assert_eq!(h.notifier.unsubscribe_count(), 1);
	assert_eq!(h.api.stages(), vec![ResolveStage::SpaceCreate, ResolveStage::SpaceUpdate]);
}

#[tokio::test]
async fn reopening_while_stale_resolution_pending_mounts_once() {
	let gate = Arc::new(Notify::new());
	let h = harness(FakeSpaceApi::new().hold_on(gate.clone()), new_space());

	let reopen = async {
		tokio::task::yield_now().await;
		h.controller.close();
		h.controller.toggle().await
	};
	let release = async {
		while h.api.calls().len() < 2 {
			tokio::task::yield_now().await;
		}
		gate.notify_waiters();
	};

	let (stale, fresh, ()) = tokio::join!(h.controller.toggle(), reopen, release);
	stale.unwrap();
	fresh.unwrap();

	assert_eq!(h.controller.state(), SurfaceState::Loading);
	assert!(h.controller.handle().is_some());
	assert_eq!(h.dom.lock().elements_by_class("flatfile_iframe-wrapper").len(), 1);
	assert_eq!(h.closes.lock().len(), 1);
	assert_eq!(h.controller.channel().listener_count(), 1);
}

#[tokio::test]
async fn failing_stage_aborts_without_rollback() {
	let options = SpaceCreateOptions {
		workbook: Some(WorkbookConfig {
			name: "Contacts".into(),
			sheets: vec![json!({ "name": "Contacts", "slug": "contacts", "fields": [] })],
			actions: vec![Action::named("submitActionFg")],
		}),
		..Default::default()
	};
	let h = harness(
		FakeSpaceApi::new().fail(ResolveStage::WorkbookCreate),
		new_space().with_create_options(options),
	);

	let err = h.controller.toggle().await.unwrap_err();
	assert_eq!(err.stage(), Some(ResolveStage::WorkbookCreate));
	assert!(err.to_string().starts_with("workbook creation failed"));
	assert_eq!(h.controller.state(), SurfaceState::Hidden);
	assert_eq!(h.api.stages(), vec![ResolveStage::SpaceCreate, ResolveStage::WorkbookCreate]);
	assert!(h.closes.lock().is_empty());
	assert!(h.dom.lock().elements_by_class("flatfile_iframe-wrapper").is_empty());
}

#[tokio::test]
async fn resumed_space_without_token_makes_no_calls() {
	let h = harness(
		FakeSpaceApi::new(),
		SessionOptions::new(SpaceIdentity {
			access_token: None,
			..SpaceIdentity::existing("us_sp_1", "unused", "us_env_1")
		}),
	);

	let err = h.controller.toggle().await.unwrap_err();
	assert!(err.is_missing_credential());
	assert!(h.api.calls().is_empty());
	assert_eq!(h.controller.state(), SurfaceState::Hidden);
}

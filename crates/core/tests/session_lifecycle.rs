use std::sync::Arc;

use embed::dom::{self, Display, Dom, MemoryDom};
use embed::fake::{FakeSpaceApi, RecordingNotifier};
use embed::surface::OUTER_SHELL_CLASS;
use embed::{
	CloseEvent, CloseIntent, CloseOutcome, DisplayOptions, MessageChannel, Page, ResolveStage, SessionController, SessionOptions,
	SessionResolver, SpaceIdentity, SurfaceState, WindowMessage,
};
use parking_lot::Mutex;
use serde_json::json;

const SPACES_URL: &str = "https://spaces.flatfile.com";
const MOUNT: &str = "flatfile_iFrameContainer";

struct Harness {
	api: FakeSpaceApi,
	dom: Arc<Mutex<MemoryDom>>,
	page: Page,
	notifier: Arc<RecordingNotifier>,
	closes: Arc<Mutex<Vec<CloseEvent>>>,
	controller: SessionController,
}

fn harness(identity: SpaceIdentity, display: DisplayOptions) -> Harness {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();

	let api = FakeSpaceApi::new();
	let dom = dom::shared(MemoryDom::with_container(MOUNT));
	let page = Page::new(dom.clone());
	let notifier = RecordingNotifier::new();
	let closes = Arc::new(Mutex::new(Vec::new()));

	let seen = closes.clone();
	let options = SessionOptions::new(identity)
		.with_display(display)
		.with_close_intent(CloseIntent::new("submitActionFg", move |event| seen.lock().push(event)));
	let channel = MessageChannel::for_spaces_url(SPACES_URL, Some(notifier.clone())).unwrap();
	let controller = SessionController::new(SessionResolver::new(Arc::new(api.clone())), page.clone(), channel, options);

	Harness {
		api,
		dom,
		page,
		notifier,
		closes,
		controller,
	}
}

fn outcome(operation: &str) -> WindowMessage {
	WindowMessage::new(
		SPACES_URL,
		json!({
			"topic": "job:outcome-acknowledged",
			"payload": { "status": "complete", "operation": operation, "jobId": "us_jb_9" }
		}),
	)
}

#[tokio::test]
async fn toggle_load_and_matched_intent_ends_hidden() {
	let h = harness(SpaceIdentity::new_space("us_env_1", "pk_1"), DisplayOptions::default());
	let pristine = h.dom.lock().render_html();

	h.controller.toggle().await.unwrap();
	assert_eq!(h.controller.state(), SurfaceState::Loading);
	assert_eq!(h.api.stages(), vec![ResolveStage::SpaceCreate, ResolveStage::SpaceUpdate]);

	let surface = h.controller.surface().unwrap();
	{
		let dom = h.dom.lock();
		assert_eq!(dom.display(surface.wrapper()), Some(Display::Block));
		assert_eq!(
			dom.attribute(surface.frame(), "src"),
			Some("https://spaces.flatfile.com/space/us_sp_fake?token=sk_fake")
		);
	}

	h.controller.frame_loaded();
	assert_eq!(h.controller.state(), SurfaceState::Visible);
	assert_eq!(h.dom.lock().display(surface.spinner()), Some(Display::Hidden));

	assert_eq!(h.controller.deliver(&outcome("submitActionFg")), 1);
	assert_eq!(h.controller.state(), SurfaceState::Hidden);

	let closes = h.closes.lock();
	assert_eq!(closes.len(), 1);
	match &closes[0] {
		CloseEvent::JobCompleted(payload) => assert_eq!(payload.extra["jobId"], "us_jb_9"),
		other => panic!("unexpected close event {other:?}"),
	}
	assert_eq!(h.notifier.unsubscribe_count(), 1);

	// Only the page stylesheet remains.
	let dom = h.dom.lock();
	assert!(!dom.is_connected(surface.wrapper()));
	assert!(!dom.is_connected(surface.dialog().outer_shell));
	assert_eq!(dom.node_count(), 5);
	assert_ne!(dom.render_html(), pristine);
}

#[tokio::test]
async fn non_matching_messages_never_change_state() {
	let h = harness(SpaceIdentity::new_space("us_env_1", "pk_1"), DisplayOptions::default());
	h.controller.toggle().await.unwrap();
	h.controller.frame_loaded();

	let mut foreign = outcome("submitActionFg");
	foreign.origin = "https://attacker.example".into();
	let noise = [
		outcome("submitActionBg"),
		foreign,
		WindowMessage::new(SPACES_URL, json!({ "topic": "job:created", "payload": { "status": "complete", "operation": "submitActionFg" } })),
		WindowMessage::new(SPACES_URL, json!({ "topic": "job:outcome-acknowledged", "payload": { "status": "failed", "operation": "submitActionFg" } })),
		WindowMessage::new(SPACES_URL, json!("ready")),
	];
	for message in &noise {
		assert_eq!(h.controller.deliver(message), 0);
		assert_eq!(h.controller.state(), SurfaceState::Visible);
	}
	assert!(h.closes.lock().is_empty());
	assert_eq!(h.notifier.unsubscribe_count(), 0);
}

#[tokio::test]
async fn close_click_reveals_hidden_host_shell_without_dialog() {
	let h = harness(SpaceIdentity::existing("us_sp_7", "sk_7", "us_env_1"), DisplayOptions::default());
	let shell = {
		let mut dom = h.dom.lock();
		let shell = dom.create_element("div");
		dom.add_class(shell, OUTER_SHELL_CLASS);
		dom.set_display(shell, Display::Hidden);
		let body = dom.body();
		dom.append_child(body, shell);
		shell
	};
	h.page.registry.register_outer_shell(shell);

	h.controller.toggle().await.unwrap();
	h.controller.frame_loaded();
	let surface = h.controller.surface().unwrap();

	assert_eq!(h.controller.close_clicked(), Some(CloseOutcome::RevealedShell(shell)));
	assert_eq!(h.controller.state(), SurfaceState::Visible);
	assert_eq!(h.notifier.unsubscribe_count(), 1);

	let dom = h.dom.lock();
	assert_eq!(dom.display(shell), Some(Display::Block));
	assert_eq!(dom.display(surface.dialog().outer_shell), Some(Display::Hidden));
}

#[tokio::test]
async fn confirmed_exit_tears_down_and_fires_once() {
	let h = harness(SpaceIdentity::existing("us_sp_7", "sk_7", "us_env_1"), DisplayOptions::default());
	h.controller.toggle().await.unwrap();
	h.controller.frame_loaded();
	let surface = h.controller.surface().unwrap();

	assert!(h.controller.click(surface.close_button().unwrap()));
	assert_eq!(h.controller.state(), SurfaceState::ConfirmingExit);
	assert!(h.dom.lock().render_html().contains("Are you sure you would like to close this window?"));

	assert!(h.controller.click(surface.dialog().primary_button));
	assert_eq!(h.controller.state(), SurfaceState::Hidden);
	assert!(!h.controller.click(surface.dialog().primary_button));
	h.controller.confirm_exit();
	h.controller.close();

	assert_eq!(*h.closes.lock(), vec![CloseEvent::UserExit]);
	assert!(h.dom.lock().elements_by_class(OUTER_SHELL_CLASS).is_empty());
	assert!(h.page.registry.wrappers().is_empty());
	assert_eq!(h.controller.deliver(&outcome("submitActionFg")), 0);
}

#[tokio::test]
async fn missing_mount_point_fails_without_touching_page() {
	let h = harness(
		SpaceIdentity::existing("us_sp_7", "sk_7", "us_env_1"),
		DisplayOptions::default().with_mount_point("not-on-this-page"),
	);
	let before = h.dom.lock().render_html();
	let count = h.dom.lock().node_count();

	let err = h.controller.toggle().await.unwrap_err();
	assert!(err.is_mount_point_not_found());
	assert_eq!(h.controller.state(), SurfaceState::Hidden);
	assert_eq!(h.dom.lock().render_html(), before);
	assert_eq!(h.dom.lock().node_count(), count);
	assert!(h.closes.lock().is_empty());
}

#[tokio::test]
async fn inline_surface_renders_without_close_affordance() {
	let h = harness(
		SpaceIdentity::existing("us_sp_7", "sk_7", "us_env_1").with_spaces_base_url("http://localhost:8080"),
		DisplayOptions::default().with_modal(false),
	);
	h.controller.toggle().await.unwrap();
	let surface = h.controller.surface().unwrap();
	assert!(surface.close_button().is_none());
	assert!(h.controller.close_clicked().is_none());

	let html = h.dom.lock().render_html();
	assert!(html.contains(r#"src="http://localhost:8080/space/us_sp_7?token=sk_7""#));
	assert!(!html.contains("flatfile-close-button\""));
}

#[tokio::test]
async fn reopening_reuses_resolved_space() {
	let h = harness(SpaceIdentity::new_space("us_env_1", "pk_1"), DisplayOptions::default());
	for _ in 0..3 {
		h.controller.toggle().await.unwrap();
		h.controller.frame_loaded();
		h.controller.deliver(&outcome("submitActionFg"));
		assert_eq!(h.controller.state(), SurfaceState::Hidden);
	}
	assert_eq!(h.api.stages(), vec![ResolveStage::SpaceCreate, ResolveStage::SpaceUpdate]);
	assert_eq!(h.closes.lock().len(), 3);
	assert!(h.dom.lock().elements_by_class("flatfile_iframe-wrapper").is_empty());
}

#[tokio::test]
async fn sessions_sharing_a_page_answer_only_their_own_dialog() {
	let h = harness(SpaceIdentity::existing("us_sp_7", "sk_7", "us_env_1"), DisplayOptions::default());
	h.dom.lock().append_container("second-mount");

	let second_closes = Arc::new(Mutex::new(Vec::new()));
	let seen = second_closes.clone();
	let second = SessionController::new(
		SessionResolver::new(Arc::new(h.api.clone())),
		h.page.clone(),
		MessageChannel::for_spaces_url(SPACES_URL, None).unwrap(),
		SessionOptions::new(SpaceIdentity::existing("us_sp_8", "sk_8", "us_env_1"))
			.with_display(DisplayOptions::default().with_mount_point("second-mount"))
			.with_close_intent(CloseIntent::new("submitActionFg", move |event| seen.lock().push(event))),
	);

	for controller in [&h.controller, &second] {
		controller.toggle().await.unwrap();
		controller.frame_loaded();
	}
	let first_surface = h.controller.surface().unwrap();
	let second_surface = second.surface().unwrap();

	assert_eq!(h.controller.close_clicked(), Some(CloseOutcome::ConfirmationShown));
	assert_eq!(h.controller.state(), SurfaceState::ConfirmingExit);
	assert_eq!(second.state(), SurfaceState::Visible);
	assert_eq!(h.dom.lock().display(second_surface.dialog().outer_shell), Some(Display::Hidden));

	assert!(second.click(second_surface.close_button().unwrap()));
	assert_eq!(second.state(), SurfaceState::ConfirmingExit);
	assert!(second.click(second_surface.dialog().primary_button));
	assert_eq!(second.state(), SurfaceState::Hidden);
	assert_eq!(*second_closes.lock(), vec![CloseEvent::UserExit]);

	assert!(h.controller.click(first_surface.dialog().secondary_button));
	assert_eq!(h.controller.state(), SurfaceState::Visible);
	assert!(h.closes.lock().is_empty());
}

//! Session controller: the state machine tying resolution, the surface and
//! the message channel together.
//!
//! ```text
//! Hidden --toggle--> Loading --frame_loaded--> Visible
//! Visible --close_clicked--> ConfirmingExit --decline_exit--> Visible
//! ConfirmingExit --confirm_exit--> Hidden
//! any open state --matched close intent / close--> Hidden
//! ```
//!
//! State lives behind a mutex that is never held across an `.await`, so
//! frame messages and clicks are processed while a resolution is suspended.
//! Each `toggle` from `Hidden` starts a new session epoch; a resolution
//! finishing after its session was closed is discarded.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use space_embed_protocol::MessagePayload;
use tracing::{debug, info, warn};

use crate::channel::{MessageChannel, Subscription, WindowMessage};
use crate::config::DisplayOptions;
use crate::dom::NodeId;
use crate::error::Result;
use crate::identity::{SessionHandle, SpaceIdentity};
use crate::resolver::{SessionResolver, SpaceCreateOptions};
use crate::surface::{CloseOutcome, Page, Surface, SurfaceEvent, SurfaceManager};

/// Visibility of the session's surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
	Hidden,
	Loading,
	Visible,
	ConfirmingExit,
}

/// Why a session was closed.
#[derive(Debug, Clone, PartialEq)]
pub enum CloseEvent {
	/// The frame reported completion of the close intent's operation.
	JobCompleted(MessagePayload),
	/// The user or host closed the surface.
	UserExit,
}

type CloseCallback = Arc<dyn Fn(CloseEvent) + Send + Sync>;

/// Operation whose completion closes the surface, and the callback fired
/// when the session closes.
#[derive(Clone)]
pub struct CloseIntent {
	pub operation: String,
	on_close: CloseCallback,
}

impl CloseIntent {
	pub fn new<F>(operation: impl Into<String>, on_close: F) -> Self
	where
		F: Fn(CloseEvent) + Send + Sync + 'static,
	{
		Self {
			operation: operation.into(),
			on_close: Arc::new(on_close),
		}
	}
}

impl fmt::Debug for CloseIntent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CloseIntent").field("operation", &self.operation).finish_non_exhaustive()
	}
}

/// Everything a controller needs to open sessions.
#[derive(Debug, Clone)]
pub struct SessionOptions {
	pub identity: SpaceIdentity,
	pub create_options: Option<SpaceCreateOptions>,
	pub display: DisplayOptions,
	pub close_intent: Option<CloseIntent>,
}

impl SessionOptions {
	pub fn new(identity: SpaceIdentity) -> Self {
		Self {
			identity,
			create_options: None,
			display: DisplayOptions::default(),
			close_intent: None,
		}
	}

	pub fn with_create_options(mut self, options: SpaceCreateOptions) -> Self {
		self.create_options = Some(options);
		self
	}

	pub fn with_display(mut self, display: DisplayOptions) -> Self {
		self.display = display;
		self
	}

	pub fn with_close_intent(mut self, intent: CloseIntent) -> Self {
		self.close_intent = Some(intent);
		self
	}
}

struct Session {
	epoch: u64,
	state: SurfaceState,
	handle: Option<SessionHandle>,
	surface: Option<Surface>,
	subscription: Option<Subscription>,
	close_fired: bool,
}

struct Inner {
	resolver: SessionResolver,
	surfaces: SurfaceManager,
	channel: MessageChannel,
	options: SessionOptions,
	session: Mutex<Session>,
}

impl Drop for Inner {
	fn drop(&mut self) {
		if let Some(subscription) = self.session.get_mut().subscription.take() {
			self.channel.cancel(&subscription);
		}
	}
}

/// Drives one embedded Space on a page. Cheap to clone.
#[derive(Clone)]
pub struct SessionController {
	inner: Arc<Inner>,
}

impl SessionController {
	pub fn new(resolver: SessionResolver, page: Page, channel: MessageChannel, options: SessionOptions) -> Self {
		Self {
			inner: Arc::new(Inner {
				resolver,
				surfaces: SurfaceManager::new(page),
				channel,
				options,
				session: Mutex::new(Session {
					epoch: 0,
					state: SurfaceState::Hidden,
					handle: None,
					surface: None,
					subscription: None,
					close_fired: false,
				}),
			}),
		}
	}

	pub fn state(&self) -> SurfaceState {
		self.inner.session.lock().state
	}

	/// Handle of the resolved Space, kept across sessions.
	pub fn handle(&self) -> Option<SessionHandle> {
		self.inner.session.lock().handle.clone()
	}

	/// The currently mounted surface.
	pub fn surface(&self) -> Option<Surface> {
		self.inner.session.lock().surface.clone()
	}

	pub fn channel(&self) -> &MessageChannel {
		&self.inner.channel
	}

	/// Opens a new session when hidden; ignored in any other state.
	///
	/// Resolves the Space unless a handle is cached, then mounts and reveals
	/// the surface and subscribes to the close intent.
	///
	/// # Errors
	///
	/// Resolution and mount failures are returned and leave the state
	/// `Hidden`.
	pub async fn toggle(&self) -> Result<()> {
		let (epoch, cached) = {
			let mut session = self.inner.session.lock();
			if session.state != SurfaceState::Hidden {
				debug!(target = "embed.controller", state = ?session.state, "toggle ignored");
				return Ok(());
			}
			session.epoch += 1;
			session.state = SurfaceState::Loading;
			session.close_fired = false;
			(session.epoch, session.handle.clone())
		};
		debug!(target = "embed.controller", epoch, from = ?SurfaceState::Hidden, to = ?SurfaceState::Loading, "state transition");

		let handle = match cached {
			Some(handle) => handle,
			None => {
				let options = &self.inner.options;
				match self.inner.resolver.resolve(&options.identity, options.create_options.as_ref()).await {
					Ok(handle) => handle,
					Err(err) => {
						let mut session = self.inner.session.lock();
						if session.epoch == epoch && session.state == SurfaceState::Loading {
							session.state = SurfaceState::Hidden;
						}
						warn!(target = "embed.controller", epoch, error = %err, "session resolution failed");
						return Err(err);
					}
				}
			}
		};

		let mut session = self.inner.session.lock();
		if session.epoch != epoch || session.state != SurfaceState::Loading {
			debug!(target = "embed.controller", epoch, current = session.epoch, "discarding late resolution");
			return Ok(());
		}
		session.handle = Some(handle.clone());

		let surface = match self.inner.surfaces.mount(&handle, &self.inner.options.display) {
			Ok(surface) => surface,
			Err(err) => {
				session.state = SurfaceState::Hidden;
				warn!(target = "embed.controller", epoch, error = %err, "mount failed");
				return Err(err);
			}
		};
		self.inner.surfaces.reveal(&surface);

		session.subscription = self.inner.options.close_intent.as_ref().map(|intent| {
			let weak = Arc::downgrade(&self.inner);
			self.inner.channel.subscribe(intent.operation.clone(), move |message| {
				if let Some(controller) = upgrade(&weak) {
					controller.teardown(Some(epoch), CloseEvent::JobCompleted(message.payload), true);
				}
			})
		});
		session.surface = Some(surface);
		info!(target = "embed.controller", epoch, space_id = handle.space_id(), "session opened");
		Ok(())
	}

	/// The frame finished loading.
	pub fn frame_loaded(&self) {
		let mut session = self.inner.session.lock();
		if session.state != SurfaceState::Loading {
			return;
		}
		if let Some(surface) = &session.surface {
			self.inner.surfaces.frame_loaded(surface);
		}
		session.state = SurfaceState::Visible;
		debug!(target = "embed.controller", from = ?SurfaceState::Loading, to = ?SurfaceState::Visible, "state transition");
	}

	/// The frame failed to load. Logged; the state is unchanged.
	pub fn frame_failed(&self, reason: &str) {
		if let Some(surface) = self.surface() {
			self.inner.surfaces.frame_failed(&surface, reason);
		}
	}

	/// The close affordance was clicked. Only acts while `Visible`.
	pub fn close_clicked(&self) -> Option<CloseOutcome> {
		let surface = {
			let session = self.inner.session.lock();
			if session.state != SurfaceState::Visible {
				return None;
			}
			session.surface.clone()?
		};

		let outcome = self.inner.surfaces.close_clicked(&surface, &self.inner.channel);
		if outcome == CloseOutcome::ConfirmationShown {
			self.transition(SurfaceState::Visible, SurfaceState::ConfirmingExit);
		}
		Some(outcome)
	}

	/// The user confirmed the exit dialog: the session closes.
	pub fn confirm_exit(&self) {
		let epoch = {
			let session = self.inner.session.lock();
			if session.state != SurfaceState::ConfirmingExit {
				return;
			}
			session.epoch
		};
		self.inner.surfaces.confirm_exit(&self.inner.channel);
		self.teardown(Some(epoch), CloseEvent::UserExit, false);
	}

	/// The user declined the exit dialog.
	pub fn decline_exit(&self) {
		let session = self.inner.session.lock();
		if session.state != SurfaceState::ConfirmingExit {
			return;
		}
		if let Some(surface) = &session.surface {
			self.inner.surfaces.decline_exit(surface);
		}
		drop(session);
		self.transition(SurfaceState::ConfirmingExit, SurfaceState::Visible);
	}

	/// Closes the current session from any open state, including while the
	/// Space is still being resolved.
	pub fn close(&self) {
		self.teardown(None, CloseEvent::UserExit, true);
	}

	/// Dispatches a click on `node`. Returns whether it belonged to the
	/// surface.
	pub fn click(&self, node: NodeId) -> bool {
		let Some(event) = self.surface().and_then(|surface| surface.event_for_click(node)) else {
			return false;
		};
		match event {
			SurfaceEvent::CloseClicked => {
				self.close_clicked();
			}
			SurfaceEvent::ConfirmExit => self.confirm_exit(),
			SurfaceEvent::DeclineExit => self.decline_exit(),
		}
		true
	}

	/// Hands a window message to the channel.
	pub fn deliver(&self, message: &WindowMessage) -> usize {
		self.inner.channel.post(message)
	}

	/// Forgets the cached handle so the next session resolves again.
	pub fn reset_space(&self) {
		if self.inner.session.lock().handle.take().is_some() {
			debug!(target = "embed.controller", "cached space forgotten");
		}
	}

	fn transition(&self, from: SurfaceState, to: SurfaceState) {
		let mut session = self.inner.session.lock();
		if session.state == from {
			session.state = to;
			debug!(target = "embed.controller", ?from, ?to, "state transition");
		}
	}

	fn teardown(&self, epoch: Option<u64>, event: CloseEvent, cancel_external: bool) {
		let (surface, subscription, fire, from) = {
			let mut session = self.inner.session.lock();
			if session.state == SurfaceState::Hidden || epoch.is_some_and(|e| e != session.epoch) {
				return;
			}
			let from = std::mem::replace(&mut session.state, SurfaceState::Hidden);
			let fire = !std::mem::replace(&mut session.close_fired, true);
			(session.surface.take(), session.subscription.take(), fire, from)
		};

		if let Some(subscription) = subscription {
			self.inner.channel.cancel(&subscription);
		}
		if cancel_external {
			self.inner.channel.cancel_external();
		}
		if let Some(mut surface) = surface {
			self.inner.surfaces.unmount(&mut surface);
		}
		info!(target = "embed.controller", ?from, ?event, "session closed");

		if fire {
			if let Some(intent) = &self.inner.options.close_intent {
				(intent.on_close)(event);
			}
		}
	}
}

fn upgrade(weak: &Weak<Inner>) -> Option<SessionController> {
	weak.upgrade().map(|inner| SessionController { inner })
}

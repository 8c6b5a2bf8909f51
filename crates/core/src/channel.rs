//! Inbound message channel between the embedded frame and the session.
//!
//! Frame messages are untrusted. [`MessageChannel::post`] only delivers a
//! message when its origin is the frame origin and it reports completion of
//! the operation a subscriber registered for. Everything else is dropped
//! with a debug log.
//!
//! Cancellation is authoritative: once [`MessageChannel::cancel`] (or
//! [`Subscription::cancel`]) returns, the listener is never invoked again,
//! even by a delivery that was already in progress on another thread.

use std::cell::Cell;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use serde_json::Value;
use space_embed_protocol::InboundMessage;
use tracing::debug;

use crate::error::Result;
use crate::identity::frame_origin;

/// External pub/sub client whose subscriptions end with the session.
pub trait NotificationClient: Send + Sync {
	fn unsubscribe_all(&self);
}

/// A message posted to the host window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowMessage {
	pub origin: String,
	pub data: Value,
}

impl WindowMessage {
	pub fn new(origin: impl Into<String>, data: Value) -> Self {
		Self {
			origin: origin.into(),
			data,
		}
	}
}

type Listener = Arc<dyn Fn(InboundMessage) + Send + Sync>;

/// Open while `true`. Held for the duration of each delivery, so closing it
/// waits for an in-flight listener on another thread. Reentrant so a
/// listener may cancel its own subscription.
type Gate = Arc<ReentrantMutex<Cell<bool>>>;

#[derive(Clone)]
struct Entry {
	id: u64,
	operation: String,
	gate: Gate,
	listener: Listener,
}

#[derive(Default)]
struct ChannelState {
	next_id: u64,
	entries: Vec<Entry>,
	closed: bool,
}

struct Inner {
	expected_origin: String,
	notifier: Option<Arc<dyn NotificationClient>>,
	state: Mutex<ChannelState>,
}

/// Validates and dispatches frame messages to subscribers.
#[derive(Clone)]
pub struct MessageChannel {
	inner: Arc<Inner>,
}

impl fmt::Debug for MessageChannel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MessageChannel")
			.field("expected_origin", &self.inner.expected_origin)
			.field("listeners", &self.listener_count())
			.finish()
	}
}

impl MessageChannel {
	/// Channel accepting messages from exactly `expected_origin`.
	pub fn new(expected_origin: impl Into<String>, notifier: Option<Arc<dyn NotificationClient>>) -> Self {
		Self {
			inner: Arc::new(Inner {
				expected_origin: expected_origin.into(),
				notifier,
				state: Mutex::new(ChannelState::default()),
			}),
		}
	}

	/// Channel accepting messages from the origin of the Spaces app.
	pub fn for_spaces_url(spaces_base_url: &str, notifier: Option<Arc<dyn NotificationClient>>) -> Result<Self> {
		Ok(Self::new(frame_origin(spaces_base_url)?, notifier))
	}

	pub fn expected_origin(&self) -> &str {
		&self.inner.expected_origin
	}

	/// Registers `listener` for completion of `operation`.
	///
	/// On a closed channel the returned subscription is already inactive.
	pub fn subscribe<F>(&self, operation: impl Into<String>, listener: F) -> Subscription
	where
		F: Fn(InboundMessage) + Send + Sync + 'static,
	{
		let operation = operation.into();
		let mut state = self.inner.state.lock();
		state.next_id += 1;
		let id = state.next_id;
		let gate: Gate = Arc::new(ReentrantMutex::new(Cell::new(!state.closed)));

		if !state.closed {
			debug!(target = "embed.channel", id, %operation, "subscribed");
			state.entries.push(Entry {
				id,
				operation,
				gate: gate.clone(),
				listener: Arc::new(listener),
			});
		}

		Subscription {
			id,
			gate,
			channel: Arc::downgrade(&self.inner),
		}
	}

	/// Stops delivery to `subscription`. Repeated calls are no-ops.
	pub fn cancel(&self, subscription: &Subscription) {
		cancel_in(&self.inner, subscription.id, &subscription.gate);
	}

	/// Ends every subscription held by the external notification client.
	pub fn cancel_external(&self) {
		if let Some(notifier) = &self.inner.notifier {
			debug!(target = "embed.channel", "unsubscribing notification client");
			notifier.unsubscribe_all();
		}
	}

	/// Cancels every subscription and refuses new ones.
	pub fn close(&self) {
		let entries = {
			let mut state = self.inner.state.lock();
			state.closed = true;
			std::mem::take(&mut state.entries)
		};
		for entry in entries {
			entry.gate.lock().set(false);
		}
	}

	pub fn is_closed(&self) -> bool {
		self.inner.state.lock().closed
	}

	pub fn listener_count(&self) -> usize {
		self.inner.state.lock().entries.len()
	}

	/// Dispatches a frame message. Returns how many listeners ran.
	pub fn post(&self, message: &WindowMessage) -> usize {
		if message.origin != self.inner.expected_origin {
			debug!(
				target = "embed.channel",
				origin = %message.origin,
				expected = %self.inner.expected_origin,
				"ignoring message from unexpected origin"
			);
			return 0;
		}

		let Some(inbound) = InboundMessage::parse(&message.data) else {
			debug!(target = "embed.channel", "ignoring malformed message");
			return 0;
		};

		let matching: Vec<Entry> = self
			.inner
			.state
			.lock()
			.entries
			.iter()
			.filter(|entry| inbound.is_completed_operation(&entry.operation))
			.cloned()
			.collect();

		if matching.is_empty() {
			debug!(
				target = "embed.channel",
				topic = %inbound.topic,
				status = %inbound.payload.status,
				operation = %inbound.payload.operation,
				"ignoring message"
			);
			return 0;
		}

		let mut delivered = 0;
		for entry in matching {
			let open = entry.gate.lock();
			if open.get() {
				(entry.listener)(inbound.clone());
				delivered += 1;
			}
		}
		delivered
	}
}

fn cancel_in(inner: &Inner, id: u64, gate: &Gate) {
	inner.state.lock().entries.retain(|entry| entry.id != id);
	let open = gate.lock();
	if open.replace(false) {
		debug!(target = "embed.channel", id, "subscription cancelled");
	}
}

/// Handle to a registered listener.
pub struct Subscription {
	id: u64,
	gate: Gate,
	channel: Weak<Inner>,
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("active", &self.is_active())
			.finish()
	}
}

impl Subscription {
	pub fn is_active(&self) -> bool {
		self.gate.lock().get()
	}

	/// Same as [`MessageChannel::cancel`]; works after the channel is gone.
	pub fn cancel(&self) {
		match self.channel.upgrade() {
			Some(inner) => cancel_in(&inner, self.id, &self.gate),
			None => self.gate.lock().set(false),
		}
	}
}

//! DOM-equivalent document model the surface is rendered into.
//!
//! The surface manager only needs a handful of element operations, so the
//! page is reached through the [`Dom`] trait. [`MemoryDom`] is an arena-backed
//! implementation that can serialize itself to HTML, used by tests and by
//! the CLI's offline `render`.

mod memory;

pub use memory::MemoryDom;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Handle to an element owned by a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "node#{}", self.0)
	}
}

/// Inline `display` value of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
	Block,
	Flex,
	Hidden,
}

impl Display {
	pub fn css(self) -> &'static str {
		match self {
			Display::Block => "block",
			Display::Flex => "flex",
			Display::Hidden => "none",
		}
	}

	pub fn is_visible(self) -> bool {
		self != Display::Hidden
	}
}

/// Element operations the surface manager performs on a page.
///
/// Operations on a node that no longer exists are ignored; `remove` reports
/// whether anything was removed so callers can stay idempotent.
pub trait Dom: Send {
	fn head(&self) -> NodeId;

	fn body(&self) -> NodeId;

	/// Connected element with the given `id` attribute.
	fn element_by_id(&self, id: &str) -> Option<NodeId>;

	/// Whether `node` exists (connected or not).
	fn contains(&self, node: NodeId) -> bool;

	/// Creates a detached element.
	fn create_element(&mut self, tag: &str) -> NodeId;

	fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

	fn add_class(&mut self, node: NodeId, class: &str);

	fn set_text(&mut self, node: NodeId, text: &str);

	/// Replaces the element's content with trusted markup.
	fn set_inner_html(&mut self, node: NodeId, html: &str);

	fn set_display(&mut self, node: NodeId, display: Display);

	/// Inline display of `node`; `None` when unset or the node is gone.
	fn display(&self, node: NodeId) -> Option<Display>;

	/// Appends `child` to `parent`, detaching it from any previous parent.
	fn append_child(&mut self, parent: NodeId, child: NodeId);

	/// Detaches `node` and drops it with its subtree.
	fn remove(&mut self, node: NodeId) -> bool;
}

/// A page shared between surface managers and the host.
pub type SharedDom = Arc<Mutex<dyn Dom>>;

/// Wraps a concrete document for sharing.
pub fn shared<D: Dom + 'static>(dom: D) -> Arc<Mutex<D>> {
	Arc::new(Mutex::new(dom))
}

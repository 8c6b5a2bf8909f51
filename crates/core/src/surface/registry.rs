//! Page-wide bookkeeping of surface wrappers and outer shells.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::dom::{NodeId, SharedDom};

/// Identifies one mounted surface within a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

#[derive(Debug, Clone, Copy)]
struct Entry {
	node: NodeId,
	owner: Option<SurfaceId>,
}

#[derive(Debug, Default)]
struct RegistryState {
	next_id: u64,
	wrappers: Vec<Entry>,
	outer_shells: Vec<Entry>,
	stylesheet: Option<NodeId>,
}

/// Wrappers and outer shells present on a page, in registration order.
///
/// Shared by every surface manager rendering into the same page. Shells
/// created by the host rather than a surface are registered without an
/// owner.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
	state: Mutex<RegistryState>,
}

impl SurfaceRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn next_surface_id(&self) -> SurfaceId {
		let mut state = self.state.lock();
		state.next_id += 1;
		SurfaceId(state.next_id)
	}

	pub(crate) fn register_wrapper(&self, owner: SurfaceId, node: NodeId) {
		self.state.lock().wrappers.push(Entry { node, owner: Some(owner) });
	}

	pub(crate) fn register_owned_shell(&self, owner: SurfaceId, node: NodeId) {
		self.state.lock().outer_shells.push(Entry { node, owner: Some(owner) });
	}

	/// Registers a host-owned outer shell that close clicks may reveal.
	pub fn register_outer_shell(&self, node: NodeId) {
		let mut state = self.state.lock();
		if !state.outer_shells.iter().any(|e| e.node == node) {
			state.outer_shells.push(Entry { node, owner: None });
		}
	}

	pub fn unregister_outer_shell(&self, node: NodeId) {
		self.state.lock().outer_shells.retain(|e| e.node != node);
	}

	pub fn wrappers(&self) -> Vec<NodeId> {
		self.state.lock().wrappers.iter().map(|e| e.node).collect()
	}

	pub fn outer_shells(&self) -> Vec<NodeId> {
		self.state.lock().outer_shells.iter().map(|e| e.node).collect()
	}

	/// Outer shells registered by the host rather than a surface.
	pub(crate) fn host_shells(&self) -> Vec<NodeId> {
		self.state
			.lock()
			.outer_shells
			.iter()
			.filter(|e| e.owner.is_none())
			.map(|e| e.node)
			.collect()
	}

	/// Forgets every entry owned by `surface`.
	pub(crate) fn release(&self, surface: SurfaceId) {
		let mut state = self.state.lock();
		state.wrappers.retain(|e| e.owner != Some(surface));
		state.outer_shells.retain(|e| e.owner != Some(surface));
	}

	pub fn stylesheet(&self) -> Option<NodeId> {
		self.state.lock().stylesheet
	}

	pub(crate) fn set_stylesheet(&self, node: NodeId) {
		self.state.lock().stylesheet = Some(node);
	}
}

/// A document together with the registry of surfaces rendered into it.
#[derive(Clone)]
pub struct Page {
	pub dom: SharedDom,
	pub registry: Arc<SurfaceRegistry>,
}

impl Page {
	pub fn new(dom: SharedDom) -> Self {
		Self {
			dom,
			registry: Arc::new(SurfaceRegistry::new()),
		}
	}
}

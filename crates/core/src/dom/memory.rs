//! Arena-backed in-memory document.

use std::collections::HashMap;
use std::fmt::Write;

use super::{Display, Dom, NodeId};

#[derive(Debug, Clone)]
struct Element {
	tag: String,
	attributes: Vec<(String, String)>,
	classes: Vec<String>,
	display: Option<Display>,
	text: Option<String>,
	inner_html: Option<String>,
	children: Vec<NodeId>,
	parent: Option<NodeId>,
}

impl Element {
	fn new(tag: &str) -> Self {
		Self {
			tag: tag.to_ascii_lowercase(),
			attributes: Vec::new(),
			classes: Vec::new(),
			display: None,
			text: None,
			inner_html: None,
			children: Vec::new(),
			parent: None,
		}
	}

	fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
	}
}

/// In-memory document with `<html>`, `<head>` and `<body>`.
#[derive(Debug, Clone)]
pub struct MemoryDom {
	nodes: HashMap<NodeId, Element>,
	next_id: u64,
	root: NodeId,
	head: NodeId,
	body: NodeId,
}

impl Default for MemoryDom {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryDom {
	pub fn new() -> Self {
		let mut dom = Self {
			nodes: HashMap::new(),
			next_id: 0,
			root: NodeId(0),
			head: NodeId(0),
			body: NodeId(0),
		};
		dom.root = dom.create_element("html");
		dom.head = dom.create_element("head");
		dom.body = dom.create_element("body");
		dom.append_child(dom.root, dom.head);
		dom.append_child(dom.root, dom.body);
		dom
	}

	/// Document with a `<div id="...">` in the body to mount into.
	pub fn with_container(id: &str) -> Self {
		let mut dom = Self::new();
		dom.append_container(id);
		dom
	}

	/// Appends a `<div id="...">` to the body.
	pub fn append_container(&mut self, id: &str) -> NodeId {
		let div = self.create_element("div");
		self.set_attribute(div, "id", id);
		self.append_child(self.body, div);
		div
	}

	/// Number of elements held, connected or not.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_connected(&self, node: NodeId) -> bool {
		let mut current = Some(node);
		while let Some(id) = current {
			if id == self.root {
				return true;
			}
			current = self.nodes.get(&id).and_then(|el| el.parent);
		}
		false
	}

	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.nodes.get(&node).and_then(|el| el.parent)
	}

	pub fn children(&self, node: NodeId) -> Vec<NodeId> {
		self.nodes.get(&node).map(|el| el.children.clone()).unwrap_or_default()
	}

	pub fn tag(&self, node: NodeId) -> Option<&str> {
		self.nodes.get(&node).map(|el| el.tag.as_str())
	}

	pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
		self.nodes.get(&node).and_then(|el| el.attribute(name))
	}

	pub fn text(&self, node: NodeId) -> Option<&str> {
		self.nodes.get(&node).and_then(|el| el.text.as_deref())
	}

	pub fn has_class(&self, node: NodeId, class: &str) -> bool {
		self.nodes.get(&node).is_some_and(|el| el.classes.iter().any(|c| c == class))
	}

	/// Connected elements carrying `class`, in document order.
	pub fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
		let mut found = Vec::new();
		self.walk(self.root, &mut |id, el| {
			if el.classes.iter().any(|c| c == class) {
				found.push(id);
			}
		});
		found
	}

	/// Serializes the connected document.
	pub fn render_html(&self) -> String {
		let mut out = String::from("<!DOCTYPE html>");
		self.render_node(self.root, &mut out);
		out
	}

	fn walk(&self, node: NodeId, visit: &mut dyn FnMut(NodeId, &Element)) {
		if let Some(el) = self.nodes.get(&node) {
			visit(node, el);
			for child in &el.children {
				self.walk(*child, visit);
			}
		}
	}

	fn render_node(&self, node: NodeId, out: &mut String) {
		let Some(el) = self.nodes.get(&node) else {
			return;
		};

		let _ = write!(out, "<{}", el.tag);
		for (name, value) in &el.attributes {
			let _ = write!(out, " {}=\"{}\"", name, escape(value));
		}
		if !el.classes.is_empty() {
			let _ = write!(out, " class=\"{}\"", escape(&el.classes.join(" ")));
		}
		if let Some(display) = el.display {
			let _ = write!(out, " style=\"display: {}\"", display.css());
		}
		out.push('>');

		if let Some(html) = &el.inner_html {
			out.push_str(html);
		} else if let Some(text) = &el.text {
			out.push_str(&escape(text));
		}
		for child in &el.children {
			self.render_node(*child, out);
		}
		let _ = write!(out, "</{}>", el.tag);
	}

	fn detach(&mut self, node: NodeId) {
		let parent = self.nodes.get_mut(&node).and_then(|el| el.parent.take());
		if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
			parent.children.retain(|c| *c != node);
		}
	}

	fn drop_subtree(&mut self, node: NodeId) {
		if let Some(el) = self.nodes.remove(&node) {
			for child in el.children {
				self.drop_subtree(child);
			}
		}
	}
}

impl Dom for MemoryDom {
	fn head(&self) -> NodeId {
		self.head
	}

	fn body(&self) -> NodeId {
		self.body
	}

	fn element_by_id(&self, id: &str) -> Option<NodeId> {
		let mut found = None;
		self.walk(self.root, &mut |node, el| {
			if found.is_none() && el.attribute("id") == Some(id) {
				found = Some(node);
			}
		});
		found
	}

	fn contains(&self, node: NodeId) -> bool {
		self.nodes.contains_key(&node)
	}

	fn create_element(&mut self, tag: &str) -> NodeId {
		let id = NodeId(self.next_id);
		self.next_id += 1;
		self.nodes.insert(id, Element::new(tag));
		id
	}

	fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
		if let Some(el) = self.nodes.get_mut(&node) {
			match el.attributes.iter_mut().find(|(k, _)| k == name) {
				Some((_, v)) => *v = value.to_string(),
				None => el.attributes.push((name.to_string(), value.to_string())),
			}
		}
	}

	fn add_class(&mut self, node: NodeId, class: &str) {
		if let Some(el) = self.nodes.get_mut(&node) {
			if !el.classes.iter().any(|c| c == class) {
				el.classes.push(class.to_string());
			}
		}
	}

	fn set_text(&mut self, node: NodeId, text: &str) {
		if let Some(el) = self.nodes.get_mut(&node) {
			el.inner_html = None;
			el.text = Some(text.to_string());
		}
	}

	fn set_inner_html(&mut self, node: NodeId, html: &str) {
		if let Some(el) = self.nodes.get_mut(&node) {
			el.text = None;
			el.inner_html = Some(html.to_string());
		}
	}

	fn set_display(&mut self, node: NodeId, display: Display) {
		if let Some(el) = self.nodes.get_mut(&node) {
			el.display = Some(display);
		}
	}

	fn display(&self, node: NodeId) -> Option<Display> {
		self.nodes.get(&node).and_then(|el| el.display)
	}

	fn append_child(&mut self, parent: NodeId, child: NodeId) {
		if parent == child || !self.nodes.contains_key(&parent) || !self.nodes.contains_key(&child) {
			return;
		}
		self.detach(child);
		if let Some(el) = self.nodes.get_mut(&child) {
			el.parent = Some(parent);
		}
		if let Some(el) = self.nodes.get_mut(&parent) {
			el.children.push(child);
		}
	}

	fn remove(&mut self, node: NodeId) -> bool {
		if node == self.root || node == self.head || node == self.body || !self.nodes.contains_key(&node) {
			return false;
		}
		self.detach(node);
		self.drop_subtree(node);
		true
	}
}

fn escape(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for ch in value.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			_ => out.push(ch),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_document_renders_skeleton() {
		let dom = MemoryDom::new();
		assert_eq!(dom.render_html(), "<!DOCTYPE html><html><head></head><body></body></html>");
		assert_eq!(dom.node_count(), 3);
	}

	#[test]
	fn lookup_by_id_ignores_detached_elements() {
		let mut dom = MemoryDom::with_container("mount");
		assert!(dom.element_by_id("mount").is_some());

		let detached = dom.create_element("div");
		dom.set_attribute(detached, "id", "floating");
		assert!(dom.element_by_id("floating").is_none());
		assert!(dom.contains(detached));
		assert!(!dom.is_connected(detached));
	}

	#[test]
	fn remove_drops_subtree_and_is_idempotent() {
		let mut dom = MemoryDom::new();
		let outer = dom.create_element("div");
		let inner = dom.create_element("span");
		dom.append_child(outer, inner);
		dom.append_child(dom.body(), outer);
		assert_eq!(dom.node_count(), 5);

		assert!(dom.remove(outer));
		assert!(!dom.contains(inner));
		assert_eq!(dom.node_count(), 3);
		assert!(!dom.remove(outer));
		assert_eq!(dom.render_html(), MemoryDom::new().render_html());
	}

	#[test]
	fn document_roots_cannot_be_removed() {
		let mut dom = MemoryDom::new();
		let body = dom.body();
		assert!(!dom.remove(body));
		assert!(dom.contains(body));
	}

	#[test]
	fn render_escapes_text_and_attributes() {
		let mut dom = MemoryDom::new();
		let p = dom.create_element("p");
		dom.set_attribute(p, "title", "a \"quoted\" <title>");
		dom.set_text(p, "1 < 2 & 3");
		dom.add_class(p, "note");
		dom.set_display(p, Display::Hidden);
		dom.append_child(dom.body(), p);
		assert!(dom.render_html().contains(
			r#"<p title="a &quot;quoted&quot; &lt;title&gt;" class="note" style="display: none">1 &lt; 2 &amp; 3</p>"#
		));
	}

	#[test]
	fn append_moves_between_parents() {
		let mut dom = MemoryDom::new();
		let a = dom.append_container("a");
		let b = dom.append_container("b");
		let child = dom.create_element("i");
		dom.append_child(a, child);
		dom.append_child(b, child);
		assert!(dom.children(a).is_empty());
		assert_eq!(dom.children(b), vec![child]);
		assert_eq!(dom.parent(child), Some(b));
	}

	#[test]
	fn elements_by_class_in_document_order() {
		let mut dom = MemoryDom::new();
		let first = dom.create_element("div");
		let second = dom.create_element("div");
		dom.add_class(first, "shell");
		dom.add_class(second, "shell");
		dom.append_child(dom.body(), first);
		dom.append_child(dom.body(), second);
		assert_eq!(dom.elements_by_class("shell"), vec![first, second]);
		assert!(dom.has_class(first, "shell"));
	}
}

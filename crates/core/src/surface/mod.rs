//! Display surface: the wrapper, spinner, frame and exit dialog rendered
//! into a page for one session.
//!
//! A [`SurfaceManager`] renders into a [`Page`]. Every node it creates is
//! recorded on the returned [`Surface`] and removed again by
//! [`SurfaceManager::unmount`]. The page stylesheet is the one exception:
//! it is injected on first mount and stays with the page.

mod registry;
mod styles;

pub use registry::{Page, SurfaceId, SurfaceRegistry};
pub use styles::{CLOSE_ICON_SVG, SURFACE_CSS};

use tracing::{debug, error, info};

use crate::channel::MessageChannel;
use crate::config::DisplayOptions;
use crate::dom::{Display, Dom, NodeId};
use crate::error::{Error, Result};
use crate::identity::SessionHandle;

pub const WRAPPER_CLASS: &str = "flatfile_iframe-wrapper";
pub const MODAL_CLASS: &str = "flatfile_displayAsModal";
pub const SPINNER_CLASS: &str = "spinner";
pub const CLOSE_BUTTON_CLASS: &str = "flatfile-close-button";
pub const FRAME_ID: &str = "flatfile_iframe";
pub const OUTER_SHELL_CLASS: &str = "flatfile_outer-shell";
pub const INNER_SHELL_CLASS: &str = "flatfile_inner-shell";

/// Interactive element of a surface that was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
	CloseClicked,
	ConfirmExit,
	DeclineExit,
}

/// What a close click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
	/// A hidden host-registered outer shell was shown instead.
	RevealedShell(NodeId),
	/// The surface's own exit confirmation was shown.
	ConfirmationShown,
}

/// Nodes of the exit confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmDialog {
	pub outer_shell: NodeId,
	pub inner_shell: NodeId,
	pub modal: NodeId,
	pub primary_button: NodeId,
	pub secondary_button: NodeId,
}

/// A mounted surface.
#[derive(Debug, Clone)]
pub struct Surface {
	id: SurfaceId,
	wrapper: NodeId,
	spinner: NodeId,
	frame: NodeId,
	close_button: Option<NodeId>,
	dialog: ConfirmDialog,
	mounted: bool,
}

impl Surface {
	pub fn id(&self) -> SurfaceId {
		self.id
	}

	pub fn wrapper(&self) -> NodeId {
		self.wrapper
	}

	pub fn spinner(&self) -> NodeId {
		self.spinner
	}

	pub fn frame(&self) -> NodeId {
		self.frame
	}

	/// Present only for modal surfaces.
	pub fn close_button(&self) -> Option<NodeId> {
		self.close_button
	}

	pub fn dialog(&self) -> &ConfirmDialog {
		&self.dialog
	}

	pub fn is_mounted(&self) -> bool {
		self.mounted
	}

	/// Maps a clicked node to the surface event it triggers.
	pub fn event_for_click(&self, node: NodeId) -> Option<SurfaceEvent> {
		if !self.mounted {
			return None;
		}
		if self.close_button == Some(node) {
			Some(SurfaceEvent::CloseClicked)
		} else if node == self.dialog.primary_button {
			Some(SurfaceEvent::ConfirmExit)
		} else if node == self.dialog.secondary_button {
			Some(SurfaceEvent::DeclineExit)
		} else {
			None
		}
	}
}

/// Builds and tears down surfaces within one page.
#[derive(Clone)]
pub struct SurfaceManager {
	page: Page,
}

impl SurfaceManager {
	pub fn new(page: Page) -> Self {
		Self { page }
	}

	pub fn page(&self) -> &Page {
		&self.page
	}

	/// Renders a surface for `handle` into the configured mount point.
	///
	/// The wrapper starts hidden; call [`reveal`](Self::reveal) to show it.
	/// The exit dialog is appended to the document body, hidden.
	///
	/// # Errors
	///
	/// Returns [`Error::MountPointNotFound`] without touching the document
	/// when no element has the configured mount point id.
	pub fn mount(&self, handle: &SessionHandle, options: &DisplayOptions) -> Result<Surface> {
		let mut dom = self.page.dom.lock();
		let mount_point = dom
			.element_by_id(&options.mount_point_id)
			.ok_or_else(|| Error::MountPointNotFound(options.mount_point_id.clone()))?;

		self.inject_styles(&mut *dom);

		let id = self.page.registry.next_surface_id();

		let wrapper = dom.create_element("div");
		dom.add_class(wrapper, WRAPPER_CLASS);
		dom.set_display(wrapper, Display::Hidden);

		let spinner = dom.create_element("div");
		dom.add_class(spinner, SPINNER_CLASS);
		dom.set_display(spinner, Display::Block);
		dom.append_child(wrapper, spinner);

		let close_button = options.display_as_modal.then(|| {
			let button = dom.create_element("div");
			dom.set_inner_html(button, CLOSE_ICON_SVG);
			dom.add_class(button, CLOSE_BUTTON_CLASS);
			dom.append_child(wrapper, button);
			dom.add_class(wrapper, MODAL_CLASS);
			button
		});

		let frame = dom.create_element("iframe");
		dom.set_attribute(frame, "id", FRAME_ID);
		dom.set_attribute(frame, "src", handle.guest_link().as_str());
		dom.append_child(wrapper, frame);

		let dialog = build_dialog(&mut *dom, options);
		let body = dom.body();
		dom.append_child(body, dialog.outer_shell);
		dom.append_child(mount_point, wrapper);
		drop(dom);

		self.page.registry.register_wrapper(id, wrapper);
		self.page.registry.register_owned_shell(id, dialog.outer_shell);

		debug!(
			target = "embed.surface",
			space_id = handle.space_id(),
			mount_point = %options.mount_point_id,
			modal = options.display_as_modal,
			"surface mounted"
		);

		Ok(Surface {
			id,
			wrapper,
			spinner,
			frame,
			close_button,
			dialog,
			mounted: true,
		})
	}

	/// Shows the surface wrapper.
	pub fn reveal(&self, surface: &Surface) {
		if surface.mounted {
			self.page.dom.lock().set_display(surface.wrapper, Display::Block);
		}
	}

	/// Frame finished loading: the spinner goes away.
	pub fn frame_loaded(&self, surface: &Surface) {
		if surface.mounted {
			self.page.dom.lock().set_display(surface.spinner, Display::Hidden);
			info!(target = "embed.surface", "frame loaded");
		}
	}

	/// Frame failed to load. Only reported; the surface stays mounted.
	pub fn frame_failed(&self, surface: &Surface, reason: &str) {
		let err = Error::FrameLoadFailed(reason.to_string());
		error!(target = "embed.surface", surface = ?surface.id, error = %err, "frame load failed");
	}

	/// Handles a click on the close affordance.
	///
	/// Reveals the first hidden host-registered outer shell; otherwise shows
	/// the surface's own exit confirmation. Dialogs of other surfaces are
	/// never revealed, since only their own session can answer them. Either
	/// way the external notification subscription is cancelled.
	pub fn close_clicked(&self, surface: &Surface, channel: &MessageChannel) -> CloseOutcome {
		let outcome = {
			let mut dom = self.page.dom.lock();
			let hidden_shell = self
				.page
				.registry
				.host_shells()
				.into_iter()
				.find(|shell| dom.display(*shell) == Some(Display::Hidden));

			match hidden_shell {
				Some(shell) => {
					dom.set_display(shell, Display::Block);
					CloseOutcome::RevealedShell(shell)
				}
				None => {
					dom.set_display(surface.dialog.outer_shell, Display::Block);
					CloseOutcome::ConfirmationShown
				}
			}
		};

		debug!(target = "embed.surface", ?outcome, "close clicked");
		channel.cancel_external();
		outcome
	}

	/// User confirmed the exit: hides every wrapper and outer shell on the
	/// page and cancels the external subscription.
	pub fn confirm_exit(&self, channel: &MessageChannel) {
		{
			let mut dom = self.page.dom.lock();
			let registry = &self.page.registry;
			for node in registry.wrappers().into_iter().chain(registry.outer_shells()) {
				dom.set_display(node, Display::Hidden);
			}
		}
		channel.cancel_external();
	}

	/// User chose to stay: hides the exit confirmation only.
	pub fn decline_exit(&self, surface: &Surface) {
		if surface.mounted {
			self.page.dom.lock().set_display(surface.dialog.outer_shell, Display::Hidden);
		}
	}

	/// Removes every node `surface` created. Returns `false` when it was
	/// already unmounted.
	pub fn unmount(&self, surface: &mut Surface) -> bool {
		if !surface.mounted {
			return false;
		}
		{
			let mut dom = self.page.dom.lock();
			dom.remove(surface.wrapper);
			dom.remove(surface.dialog.outer_shell);
		}
		self.page.registry.release(surface.id);
		surface.mounted = false;
		debug!(target = "embed.surface", surface = ?surface.id, "surface unmounted");
		true
	}

	fn inject_styles(&self, dom: &mut dyn Dom) {
		if self.page.registry.stylesheet().is_some_and(|node| dom.contains(node)) {
			return;
		}
		let style = dom.create_element("style");
		dom.set_inner_html(style, SURFACE_CSS);
		let head = dom.head();
		dom.append_child(head, style);
		self.page.registry.set_stylesheet(style);
	}
}

fn build_dialog(dom: &mut dyn Dom, options: &DisplayOptions) -> ConfirmDialog {
	let outer_shell = dom.create_element("div");
	dom.add_class(outer_shell, OUTER_SHELL_CLASS);
	dom.set_display(outer_shell, Display::Hidden);

	let inner_shell = dom.create_element("div");
	dom.add_class(inner_shell, INNER_SHELL_CLASS);
	dom.append_child(outer_shell, inner_shell);

	let modal = dom.create_element("div");
	dom.add_class(modal, "flatfile_modal");
	dom.append_child(inner_shell, modal);

	let heading = dom.create_element("div");
	dom.add_class(heading, "flatfile_modal-heading");
	dom.set_text(heading, &options.exit_title);
	dom.append_child(modal, heading);

	let text = dom.create_element("div");
	dom.add_class(text, "flatfile_modal-text");
	dom.set_text(text, &options.exit_text);
	dom.append_child(modal, text);

	let buttons = dom.create_element("div");
	dom.add_class(buttons, "flatfile_button-group");
	dom.append_child(modal, buttons);

	let secondary_button = dom.create_element("button");
	dom.add_class(secondary_button, "flatfile_button");
	dom.add_class(secondary_button, "flatfile_secondary");
	dom.set_text(secondary_button, &options.exit_secondary_button_text);
	dom.append_child(buttons, secondary_button);

	let primary_button = dom.create_element("button");
	dom.add_class(primary_button, "flatfile_button");
	dom.add_class(primary_button, "flatfile_primary");
	dom.set_text(primary_button, &options.exit_primary_button_text);
	dom.append_child(buttons, primary_button);

	ConfirmDialog {
		outer_shell,
		inner_shell,
		modal,
		primary_button,
		secondary_button,
	}
}

use anyhow::Result;
use embed::dom::{self, MemoryDom};
use embed::{DisplayOptions, Page, SessionHandle, SessionResolver, SurfaceManager};
use tracing::info;

use super::identity_from;
use crate::cli::SpaceArgs;
use crate::config::CliConfig;

pub async fn execute(args: &SpaceArgs, inline: bool, mount_point: Option<String>, config: &CliConfig) -> Result<()> {
	let (identity, create_options) = identity_from(args, config);
	let mut display_options = config.embed.display.clone();
	if inline {
		display_options = display_options.with_modal(false);
	}
	if let Some(id) = mount_point {
		display_options = display_options.with_mount_point(id);
	}
	info!(target = "embed.cli", mount_point = %display_options.mount_point_id, modal = display_options.display_as_modal, "render");

	let handle = SessionResolver::http().resolve(&identity, create_options.as_ref()).await?;
	println!("{}", render_document(&handle, &display_options)?);
	Ok(())
}

/// Mounts and reveals the surface in a page holding only the mount point.
pub fn render_document(handle: &SessionHandle, display: &DisplayOptions) -> embed::Result<String> {
	let page_dom = dom::shared(MemoryDom::with_container(&display.mount_point_id));
	let surfaces = SurfaceManager::new(Page::new(page_dom.clone()));
	let surface = surfaces.mount(handle, display)?;
	surfaces.reveal(&surface);

	let html = page_dom.lock().render_html();
	Ok(html)
}

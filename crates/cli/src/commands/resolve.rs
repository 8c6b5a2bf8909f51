use anyhow::Result;
use embed::SessionResolver;
use tracing::info;

use super::identity_from;
use crate::cli::SpaceArgs;
use crate::config::CliConfig;

pub async fn execute(args: &SpaceArgs, config: &CliConfig) -> Result<()> {
	let (identity, create_options) = identity_from(args, config);
	info!(target = "embed.cli", api_url = %identity.api_url, resumed = identity.is_resumed(), "resolve");

	let handle = SessionResolver::http().resolve(&identity, create_options.as_ref()).await?;
	println!("{}", serde_json::to_string_pretty(&handle)?);
	Ok(())
}

mod render;
mod resolve;

use anyhow::Result;
use embed::protocol::SpaceConfig;
use embed::{SpaceCreateOptions, SpaceIdentity};

use crate::cli::{Cli, Commands, SpaceArgs};
use crate::config::CliConfig;

pub async fn dispatch(cli: Cli) -> Result<()> {
	let mut config = CliConfig::load(cli.config.as_deref())?;
	if let Some(api_url) = cli.api_url {
		config.embed.api_url = api_url;
	}

	match cli.command {
		Commands::Resolve { space } => resolve::execute(&space, &config).await,
		Commands::Render { space, inline, mount_point } => render::execute(&space, inline, mount_point, &config).await,
	}
}

/// Builds the identity and create options described by the arguments,
/// falling back to the config for the environment and publishable key.
///
/// Missing credentials are left empty; the resolver rejects them before
/// any remote call.
pub fn identity_from(args: &SpaceArgs, config: &CliConfig) -> (SpaceIdentity, Option<SpaceCreateOptions>) {
	let environment_id = args.environment_id.clone().or_else(|| config.environment_id.clone()).unwrap_or_default();

	let identity = match &args.space_id {
		Some(space_id) => SpaceIdentity {
			access_token: args.access_token.clone(),
			..SpaceIdentity::existing(space_id.clone(), String::new(), environment_id)
		},
		None => SpaceIdentity {
			publishable_key: args.publishable_key.clone().or_else(|| config.publishable_key.clone()),
			..SpaceIdentity::new_space(environment_id, String::new())
		},
	}
	.with_api_url(config.embed.api_url.clone())
	.with_spaces_base_url(config.embed.spaces_base_url.clone());

	let create_options = match (&identity.id, &args.name) {
		(None, Some(name)) => Some(SpaceCreateOptions {
			space: SpaceConfig {
				name: name.clone(),
				..Default::default()
			},
			..Default::default()
		}),
		_ => None,
	};

	(identity, create_options)
}

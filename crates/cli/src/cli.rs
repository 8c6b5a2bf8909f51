use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "space-embed")]
#[command(about = "Resolve hosted Spaces and render their embedding surface")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = ArgAction::Count)]
	pub verbose: u8,

	/// Config file (defaults to <config dir>/space-embed/config.json)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Space API base URL
	#[arg(long, global = true, value_name = "URL")]
	pub api_url: Option<String>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Create or re-authenticate a Space and print its session handle
	Resolve {
		#[command(flatten)]
		space: SpaceArgs,
	},

	/// Resolve a Space and print the surface rendered into an empty page
	Render {
		#[command(flatten)]
		space: SpaceArgs,
		/// Render inline instead of as a modal
		#[arg(long)]
		inline: bool,
		/// Id of the element the surface is mounted into
		#[arg(long, value_name = "ID")]
		mount_point: Option<String>,
	},
}

/// Which Space to resolve.
#[derive(Args, Debug, Clone, Default)]
pub struct SpaceArgs {
	/// Existing Space to re-authenticate (requires --access-token)
	#[arg(long, value_name = "ID")]
	pub space_id: Option<String>,

	/// Access token of the existing Space
	#[arg(long, value_name = "TOKEN")]
	pub access_token: Option<String>,

	/// Publishable key used to create a new Space
	#[arg(long, value_name = "KEY")]
	pub publishable_key: Option<String>,

	/// Environment the Space belongs to
	#[arg(long, value_name = "ID")]
	pub environment_id: Option<String>,

	/// Name of a newly created Space
	#[arg(long)]
	pub name: Option<String>,
}

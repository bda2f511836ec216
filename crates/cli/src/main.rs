#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docserve_server::{routes::RouteTable, Config, FragmentGenerator, Generator};

mod utils;

#[derive(Debug, Parser)]
#[clap(
	name = "docserve",
	about = "Regenerate and inspect docserve documentation from the command line.",
	version,
	author
)]
struct Cli {
	/// Path to the docserve config file.
	#[arg(short, long, env = "DOCSERVE_CONFIG")]
	config: PathBuf,

	/// Enable debug mode
	#[clap(short = 'D', long)]
	pub debug: bool,

	#[clap(subcommand)]
	command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
	/// Regenerate the documentation files.
	Generate {
		/// Only regenerate the given group. Requires `separated_doc`.
		#[arg(short, long)]
		group: Option<String>,
	},

	/// List the routes the server registers for this config.
	Routes,
}

fn main() {
	dotenvy::dotenv().ok();
	let cli = Cli::parse();

	if let Err(error) = utils::logs(cli.debug) {
		eprintln!("Failed to initialise logging: {error}");
	}

	if let Err(error) = run(cli) {
		log::error!("{error}");
		log::debug!("{error:#?}");
		std::process::exit(1);
	}
}

fn run(cli: Cli) -> Result<()> {
	let config = Config::load(&cli.config)?.validate()?;

	match cli.command {
		Commands::Generate { group } => generate(&config, group.as_deref()),
		Commands::Routes => {
			list_routes(&config);
			Ok(())
		},
	}
}

fn generate(config: &Config, group: Option<&str>) -> Result<()> {
	let generator = FragmentGenerator::new(config);

	match group {
		Some(group) => {
			log::debug!("Regenerating documentation for group {group}");
			generator.generate_group(Some(group))?;
		},
		None => {
			log::debug!("Regenerating {} document(s)", generator.documents().len());
			generator.generate_docs()?;
		},
	}

	for settings in generator.documents() {
		if group.is_none() || settings.group.as_deref() == group {
			log::info!("Generated {}", settings.document_path(None).display());
		}
	}

	Ok(())
}

fn list_routes(config: &Config) {
	for route in RouteTable::from_config(config).iter() {
		println!("{:<32} {}", route.name, route.paths().join("  "));
	}
}

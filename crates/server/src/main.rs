#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::{env, sync::Arc};

use anyhow::Result;
use docserve_server::{server, Config, DocRequestHandler, FragmentGenerator, HandlebarsRenderer};
use dotenvy::dotenv;
use tracing_subscriber::{
	prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

#[tokio::main]
async fn main() -> Result<()> {
	dotenv().ok();

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::fmt::layer().with_filter(
				EnvFilter::try_from_default_env()
					.unwrap_or_else(|_| "docserve=info".into()),
			),
		)
		.init();

	let config = Config::load(env::var("DOCSERVE_CONFIG")?)?.validate()?;

	let generator = Arc::new(FragmentGenerator::new(&config));
	let renderer = Arc::new(HandlebarsRenderer::load(config.paths.views.as_deref())?);

	server::start(DocRequestHandler::new(config, generator, renderer)?).await
}

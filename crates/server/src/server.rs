use anyhow::Result;
use axum::{Extension, Router};
use std::{env, net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};

use crate::{handler::DocRequestHandler, routes};

/// Build the router serving every route of `handler`.
pub fn app(handler: DocRequestHandler) -> Router {
	let router = routes::handler(handler.routes());

	router.layer(Extension(Arc::new(handler)))
}

pub async fn start(handler: DocRequestHandler) -> Result<()> {
	let router = app(handler);

	let addr = SocketAddr::from((
		[0, 0, 0, 0],
		env::var("PORT").map_or(Ok(8000), |p| p.parse())?,
	));
	let listener = TcpListener::bind(&addr).await?;

	tracing::info!("Starting server on {addr}...");

	axum::serve(
		listener,
		router.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.with_graceful_shutdown(shutdown_signal())
	.await?;

	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		signal::ctrl_c()
			.await
			.expect("failed to install Ctrl+C handler");
	};

	#[cfg(unix)]
	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.expect("failed to install signal handler")
			.recv()
			.await;
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}
}

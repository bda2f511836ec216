use axum::{
	extract::{ConnectInfo, Path},
	response::Html,
	Extension,
};
use http::HeaderMap;
use std::{net::SocketAddr, sync::Arc};

use super::RouteName;
use crate::{
	document::{DocRequest, Document},
	error::Error,
	handler::DocRequestHandler,
};

/// Run file system and generator work off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, Error>
where
	T: Send + 'static,
	F: FnOnce() -> Result<T, Error> + Send + 'static,
{
	tokio::task::spawn_blocking(work)
		.await
		.map_err(|e| Error::Documentation(format!("Documentation task failed: {e}")))?
}

pub async fn document(
	Extension(handler): Extension<Arc<DocRequestHandler>>,
	Extension(RouteName(route)): Extension<RouteName>,
) -> Result<Document, Error> {
	blocking(move || handler.serve_document(&DocRequest::new(route, None))).await
}

pub async fn named_document(
	Path(file): Path<String>,
	Extension(handler): Extension<Arc<DocRequestHandler>>,
	Extension(RouteName(route)): Extension<RouteName>,
) -> Result<Document, Error> {
	blocking(move || handler.serve_document(&DocRequest::new(route, Some(file)))).await
}

pub async fn viewer(
	Extension(handler): Extension<Arc<DocRequestHandler>>,
	Extension(RouteName(route)): Extension<RouteName>,
	connect_info: Option<ConnectInfo<SocketAddr>>,
	headers: HeaderMap,
) -> Result<Html<String>, Error> {
	let peer = connect_info.map(|ConnectInfo(addr)| addr);

	blocking(move || handler.serve_viewer(&route, &headers, peer))
		.await
		.map(Html)
}

pub async fn oauth2_callback(
	Extension(handler): Extension<Arc<DocRequestHandler>>,
) -> Result<Html<String>, Error> {
	blocking(move || handler.oauth2_callback()).await.map(Html)
}

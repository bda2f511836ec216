use axum::{extract::Path, response::IntoResponse, Extension};
use http::header;
use std::sync::Arc;

use crate::{
	document::extension,
	error::Error,
	handler::{is_plain_file_name, DocRequestHandler},
};

/// Serve a file from the Swagger UI distribution.
pub async fn asset(
	Path(file): Path<String>,
	Extension(handler): Extension<Arc<DocRequestHandler>>,
) -> Result<impl IntoResponse, Error> {
	if !is_plain_file_name(&file) {
		return Err(Error::AssetNotFound(file));
	}

	let path = handler.config().paths.ui_assets.join(&file);
	let Ok(content) = tokio::fs::read(&path).await else {
		return Err(Error::AssetNotFound(file));
	};

	Ok(([(header::CONTENT_TYPE, content_type(extension(&file)))], content))
}

/// Content type for the files shipped with Swagger UI.
pub fn content_type(extension: Option<&str>) -> &'static str {
	match extension {
		Some("html" | "htm") => "text/html; charset=utf-8",
		Some("css") => "text/css",
		Some("js" | "mjs") => "application/javascript",
		Some("json" | "map") => "application/json",
		Some("png") => "image/png",
		Some("svg") => "image/svg+xml",
		Some("ico") => "image/x-icon",
		Some("txt" | "md") => "text/plain; charset=utf-8",
		_ => "application/octet-stream",
	}
}

use axum::{
	response::{IntoResponse, Response},
	Json,
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{generator::GenerationError, view::ViewError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(
		"Unable to generate documentation file to: \"{}\". Please make sure directory is writable. Error: {source}",
		.path.display()
	)]
	Generation {
		path: PathBuf,
		#[source]
		source: GenerationError,
	},

	#[error("Failed to regenerate documentation.")]
	Regeneration(#[source] GenerationError),

	#[error("Documentation file not found: \"{}\"", .0.display())]
	NotFound(PathBuf),

	#[error("Invalid documentation file name: \"{0}\"")]
	InvalidFileName(String),

	#[error("Asset not found: \"{0}\"")]
	AssetNotFound(String),

	#[error(transparent)]
	Render(#[from] ViewError),

	#[error("{0}")]
	Documentation(String),
}

/// Machine-readable error kind sent along with the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	Generation,
	NotFound,
	Render,
	Documentation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: ErrorKind,
	pub message: String,
}

impl Error {
	pub const fn kind(&self) -> ErrorKind {
		match self {
			Self::Generation { .. } | Self::Regeneration(_) => ErrorKind::Generation,
			Self::NotFound(_) | Self::InvalidFileName(_) | Self::AssetNotFound(_) => {
				ErrorKind::NotFound
			},
			Self::Render(_) => ErrorKind::Render,
			Self::Documentation(_) => ErrorKind::Documentation,
		}
	}

	pub const fn status(&self) -> StatusCode {
		match self {
			Self::Generation { .. }
			| Self::NotFound(_)
			| Self::InvalidFileName(_)
			| Self::AssetNotFound(_) => StatusCode::NOT_FOUND,
			Self::Regeneration(_) | Self::Render(_) | Self::Documentation(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			},
		}
	}
}

impl From<&Error> for ErrorResponse {
	fn from(error: &Error) -> Self {
		Self {
			error: error.kind(),
			message: error.to_string(),
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(e = ?self);
		}

		(status, Json(ErrorResponse::from(&self))).into_response()
	}
}

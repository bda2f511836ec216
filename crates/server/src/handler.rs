use anyhow::Result;
use http::HeaderMap;
use std::{fs, io, net::SocketAddr, path::Path, sync::Arc};

use crate::{
	config::{Config, TrustedProxy},
	document::{settings_for_route, DocRequest, Document},
	error::Error,
	generator::Generator,
	origin::RequestOrigin,
	routes::{RouteTable, ASSET_ROUTE, OAUTH2_CALLBACK_ROUTE},
	view::{TemplateRenderer, ViewerContext},
};

pub const OAUTH2_REDIRECT_ASSET: &str = "oauth2-redirect.html";

/// Serves documents, the viewer page and the OAuth2 callback page for one
/// configuration.
pub struct DocRequestHandler {
	config: Config,
	routes: RouteTable,
	proxies: Vec<TrustedProxy>,
	generator: Arc<dyn Generator>,
	renderer: Arc<dyn TemplateRenderer>,
}

impl DocRequestHandler {
	pub fn new(
		config: Config,
		generator: Arc<dyn Generator>,
		renderer: Arc<dyn TemplateRenderer>,
	) -> Result<Self> {
		Ok(Self {
			proxies: config.trusted_proxies()?,
			routes: RouteTable::from_config(&config),
			config,
			generator,
			renderer,
		})
	}

	pub const fn config(&self) -> &Config {
		&self.config
	}

	pub const fn routes(&self) -> &RouteTable {
		&self.routes
	}

	/// Return the requested document, generating it first when it is missing
	/// or when generation is forced.
	pub fn serve_document(&self, request: &DocRequest) -> Result<Document, Error> {
		if let Some(file) = request.file.as_deref() {
			if !is_plain_file_name(file) {
				return Err(Error::InvalidFileName(file.to_string()));
			}
		}

		let location = request.resolve(&self.config);

		if self.config.generate_always || !location.path.exists() {
			if let Err(e) = self.generator.generate_docs() {
				tracing::error!(e = ?e, path = %location.path.display(), "Failed to generate documentation");

				return Err(Error::Generation {
					path: location.path,
					source: e,
				});
			}
		}

		let content = fs::read(&location.path).map_err(|e| read_error(&location.path, &e))?;

		Ok(Document {
			kind: location.kind,
			content,
		})
	}

	/// Render the viewer page for the document behind `route_name`.
	pub fn serve_viewer(
		&self,
		route_name: &str,
		headers: &HeaderMap,
		peer: Option<SocketAddr>,
	) -> Result<String, Error> {
		if self.config.generate_always {
			self.generator.generate_docs().map_err(Error::Regeneration)?;
		}

		let origin = RequestOrigin::resolve(headers, peer, &self.proxies);

		let settings = settings_for_route(&self.config, route_name);

		let context = ViewerContext {
			secure: origin.secure,
			url_to_docs: self.url(&origin, &settings.docs_route, Some(&settings.viewer_docs_json))?,
			assets_url: self.url(&origin, ASSET_ROUTE, None)?,
			oauth2_redirect_url: self.url(&origin, OAUTH2_CALLBACK_ROUTE, None)?,
			operations_sorter: settings.operations_sort,
			config_url: settings.additional_config_url,
			validator_url: settings.validator_url,
			title: settings.title,
		};

		Ok(self.renderer.render_viewer(&context)?)
	}

	/// The bundled OAuth2 redirect page used by the viewer's authorization flow.
	pub fn oauth2_callback(&self) -> Result<String, Error> {
		let path = self.config.paths.ui_assets.join(OAUTH2_REDIRECT_ASSET);

		fs::read_to_string(&path).map_err(|e| {
			Error::Documentation(format!(
				"Unable to load OAuth2 redirect page {}: {e}",
				path.display()
			))
		})
	}

	fn url(&self, origin: &RequestOrigin, route: &str, segment: Option<&str>) -> Result<String, Error> {
		self.routes
			.url(origin, route, segment)
			.map(String::from)
			.ok_or_else(|| Error::Documentation(format!("Route {route} is not registered")))
	}
}

/// A single path component that cannot escape its directory.
pub fn is_plain_file_name(name: &str) -> bool {
	!name.is_empty() && name != "." && !name.contains(['/', '\\']) && !name.contains("..")
}

fn read_error(path: &Path, error: &io::Error) -> Error {
	if error.kind() == io::ErrorKind::NotFound {
		Error::NotFound(path.to_path_buf())
	} else {
		Error::Documentation(format!("Unable to read {}: {error}", path.display()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_file_names() {
		assert!(is_plain_file_name("api-docs.json"));
		assert!(is_plain_file_name("api-docs"));
		assert!(!is_plain_file_name("../secret.json"));
		assert!(!is_plain_file_name("nested/api.json"));
		assert!(!is_plain_file_name(""));
	}
}

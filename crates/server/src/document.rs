use axum::response::{IntoResponse, Response};
use http::{header, StatusCode};
use std::path::PathBuf;

use crate::config::{Config, DocSettings};

/// The format a document is served as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
	Json,
	Yaml,
}

impl ContentKind {
	/// Determine the kind from an explicitly requested file name.
	///
	/// Names without an extension, or with any extension other than
	/// `yaml`/`yml`, are served as JSON.
	pub fn from_file_name(name: Option<&str>) -> Self {
		match name.and_then(extension) {
			Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
				Self::Yaml
			},
			_ => Self::Json,
		}
	}

	pub const fn mime(self) -> &'static str {
		match self {
			Self::Json => "application/json",
			Self::Yaml => "application/yaml",
		}
	}
}

/// The extension of a file name, if it has one.
pub fn extension(name: &str) -> Option<&str> {
	name.rsplit_once('.')
		.map(|(_, ext)| ext)
		.filter(|ext| !ext.is_empty())
}

/// Group identifier carried in a route name (`docserve.<group>.docs`).
pub fn group_from_route_name(name: &str) -> Option<&str> {
	name.split('.').nth(1).filter(|group| !group.is_empty())
}

/// Settings for the route a request came in through. The group in the route
/// name only counts when documents are separated.
pub fn settings_for_route(config: &Config, route_name: &str) -> DocSettings {
	let group = config
		.separated_doc
		.then(|| group_from_route_name(route_name))
		.flatten();

	config.settings(group)
}

/// A request for a document, as received by one of the document routes.
#[derive(Clone, Debug)]
pub struct DocRequest {
	pub file: Option<String>,
	pub route_name: String,
}

impl DocRequest {
	pub fn new(route_name: impl Into<String>, file: Option<String>) -> Self {
		Self {
			file,
			route_name: route_name.into(),
		}
	}

	pub fn settings(&self, config: &Config) -> DocSettings {
		settings_for_route(config, &self.route_name)
	}

	/// Resolve the file and format this request refers to.
	pub fn resolve(&self, config: &Config) -> ResolvedDocLocation {
		ResolvedDocLocation {
			path: self.settings(config).document_path(self.file.as_deref()),
			kind: ContentKind::from_file_name(self.file.as_deref()),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDocLocation {
	pub path: PathBuf,
	pub kind: ContentKind,
}

/// A document ready to be sent to the client.
#[derive(Debug)]
pub struct Document {
	pub kind: ContentKind,
	pub content: Vec<u8>,
}

impl IntoResponse for Document {
	fn into_response(self) -> Response {
		match self.kind {
			ContentKind::Yaml => (
				StatusCode::OK,
				[
					(header::CONTENT_TYPE, self.kind.mime()),
					(header::CONTENT_DISPOSITION, "inline"),
				],
				self.content,
			)
				.into_response(),
			ContentKind::Json => (
				StatusCode::OK,
				[(header::CONTENT_TYPE, self.kind.mime())],
				self.content,
			)
				.into_response(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extension_handles_missing_dot() {
		assert_eq!(extension("api-docs.json"), Some("json"));
		assert_eq!(extension("api.v2.yaml"), Some("yaml"));
		assert_eq!(extension("api-docs"), None);
		assert_eq!(extension("api-docs."), None);
	}

	#[test]
	fn content_kind_from_file_name() {
		assert_eq!(ContentKind::from_file_name(None), ContentKind::Json);
		assert_eq!(ContentKind::from_file_name(Some("foo.yaml")), ContentKind::Yaml);
		assert_eq!(ContentKind::from_file_name(Some("foo.YML")), ContentKind::Yaml);
		assert_eq!(ContentKind::from_file_name(Some("foo.json")), ContentKind::Json);
		assert_eq!(ContentKind::from_file_name(Some("foo")), ContentKind::Json);
	}

	#[test]
	fn group_is_second_segment_of_route_name() {
		assert_eq!(group_from_route_name("l5-swagger.billing.docs"), Some("billing"));
		assert_eq!(group_from_route_name("docserve.users.api"), Some("users"));
		assert_eq!(group_from_route_name("docserve"), None);
	}

	#[test]
	fn resolves_default_location() {
		let config = Config::parse("version = 1\n[paths]\ndocs = \"/srv/docs\"").unwrap();
		let location = DocRequest::new("docserve.docs", None).resolve(&config);

		assert_eq!(location.path, PathBuf::from("/srv/docs/api-docs.json"));
		assert_eq!(location.kind, ContentKind::Json);
	}

	#[test]
	fn resolves_group_location_with_global_directory() {
		let config = Config::parse(
			"version = 1\nseparated_doc = true\n[paths]\ndocs = \"/srv/docs\"\n[groups.billing]",
		)
		.unwrap();

		let location = DocRequest::new("l5-swagger.billing.docs", None).resolve(&config);
		assert_eq!(location.path, PathBuf::from("/srv/docs/billing-api-docs.json"));

		let location =
			DocRequest::new("l5-swagger.billing.docs", Some("spec.yaml".to_string())).resolve(&config);
		assert_eq!(location.path, PathBuf::from("/srv/docs/spec.yaml"));
		assert_eq!(location.kind, ContentKind::Yaml);
	}

	#[test]
	fn route_group_is_ignored_without_separated_docs() {
		let config = Config::parse("version = 1\n[paths]\ndocs = \"/srv/docs\"").unwrap();
		let location = DocRequest::new("docserve.billing.docs", None).resolve(&config);

		assert_eq!(location.path, PathBuf::from("/srv/docs/api-docs.json"));
	}
}

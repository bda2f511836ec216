use axum::{routing::get, Extension, Router};
use indexmap::{IndexMap, IndexSet};
use url::Url;

use crate::{
	config::{group_route, Config},
	origin::RequestOrigin,
};

mod assets;
mod docs;

pub const OAUTH2_CALLBACK_ROUTE: &str = "docserve.oauth2_callback";
pub const ASSET_ROUTE: &str = "docserve.asset";

/// Name of the route a request came in through, attached to every viewer and
/// document route.
#[derive(Clone, Debug)]
pub struct RouteName(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteKind {
	Viewer,
	Document,
	OAuth2Callback,
	Asset,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedRoute {
	pub name: String,
	pub path: String,
	pub kind: RouteKind,
}

impl NamedRoute {
	/// The router paths this route occupies.
	pub fn paths(&self) -> Vec<String> {
		match self.kind {
			RouteKind::Viewer | RouteKind::OAuth2Callback => vec![self.path.clone()],
			RouteKind::Document => vec![self.path.clone(), with_file(&self.path)],
			RouteKind::Asset => vec![with_file(&self.path)],
		}
	}
}

/// Every route the server registers, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
	routes: IndexMap<String, NamedRoute>,
}

impl RouteTable {
	pub fn from_config(config: &Config) -> Self {
		let mut table = Self::default();

		for settings in config.documents() {
			let (api, docs) = settings.group.as_deref().map_or_else(
				|| (config.routes.api.clone(), config.routes.docs.clone()),
				|group| {
					(
						group_route(&config.routes.api, group),
						group_route(&config.routes.docs, group),
					)
				},
			);

			table.insert(settings.api_route, api, RouteKind::Viewer);
			table.insert(settings.docs_route, docs, RouteKind::Document);
		}

		table.insert(
			OAUTH2_CALLBACK_ROUTE.to_string(),
			config.routes.oauth2_callback.clone(),
			RouteKind::OAuth2Callback,
		);
		table.insert(
			ASSET_ROUTE.to_string(),
			config.routes.assets.clone(),
			RouteKind::Asset,
		);

		table
	}

	fn insert(&mut self, name: String, path: String, kind: RouteKind) {
		self.routes
			.insert(name.clone(), NamedRoute { name, path, kind });
	}

	pub fn get(&self, name: &str) -> Option<&NamedRoute> {
		self.routes.get(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = &NamedRoute> {
		self.routes.values()
	}

	/// The first router path claimed by more than one route.
	pub fn duplicate_path(&self) -> Option<String> {
		let mut seen = IndexSet::new();

		self.iter()
			.flat_map(NamedRoute::paths)
			.find(|path| !seen.insert(path.clone()))
	}

	/// Absolute URL of the named route, with an optional trailing parameter.
	pub fn url(&self, origin: &RequestOrigin, name: &str, segment: Option<&str>) -> Option<Url> {
		self.get(name).map(|route| origin.url(&route.path, segment))
	}
}

fn with_file(path: &str) -> String {
	format!("{}/:file", path.trim_end_matches('/'))
}

pub fn handler(table: &RouteTable) -> Router {
	table.iter().fold(Router::new(), |router, route| {
		let name = Extension(RouteName(route.name.clone()));
		let paths = route.paths();

		match (route.kind, paths.as_slice()) {
			(RouteKind::Viewer, [path]) => router.route(path, get(docs::viewer).layer(name)),
			(RouteKind::Document, [path, file]) => router
				.route(path, get(docs::document).layer(name.clone()))
				.route(file, get(docs::named_document).layer(name)),
			(RouteKind::OAuth2Callback, [path]) => router.route(path, get(docs::oauth2_callback)),
			(RouteKind::Asset, [file]) => router.route(file, get(assets::asset)),
			_ => router,
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::HeaderMap;

	#[test]
	fn registers_default_routes() {
		let table = RouteTable::from_config(&Config::parse("version = 1").unwrap());
		let names: Vec<_> = table.iter().map(|route| route.name.as_str()).collect();

		assert_eq!(
			names,
			vec![
				"docserve.api",
				"docserve.docs",
				OAUTH2_CALLBACK_ROUTE,
				ASSET_ROUTE
			]
		);
		assert_eq!(table.get("docserve.docs").unwrap().path, "/docs");
	}

	#[test]
	fn registers_group_routes() {
		let table = RouteTable::from_config(
			&Config::parse("version = 1\nseparated_doc = true\n[groups.billing]\n[groups.users]")
				.unwrap(),
		);

		assert_eq!(table.get("docserve.billing.api").unwrap().path, "/api/documentation/billing");
		assert_eq!(table.get("docserve.users.docs").unwrap().path, "/docs/users");
		assert!(table.get("docserve.docs").is_none());
	}

	#[test]
	fn document_routes_claim_the_file_path() {
		let table = RouteTable::from_config(&Config::parse("version = 1").unwrap());

		assert_eq!(table.get("docserve.docs").unwrap().paths(), vec!["/docs", "/docs/:file"]);
		assert_eq!(table.get(ASSET_ROUTE).unwrap().paths(), vec!["/docs/asset/:file"]);
		assert_eq!(table.duplicate_path(), None);
	}

	#[test]
	fn finds_colliding_paths() {
		let table = RouteTable::from_config(
			&Config::parse(r#"version = 1
[routes]
api = "/docs""#).unwrap(),
		);

		assert_eq!(table.duplicate_path().as_deref(), Some("/docs"));
	}

	#[test]
	fn builds_absolute_urls() {
		let table = RouteTable::from_config(&Config::parse("version = 1").unwrap());
		let origin = RequestOrigin::resolve(&HeaderMap::new(), None, &[]);

		assert_eq!(
			table
				.url(&origin, "docserve.docs", Some("api-docs.json"))
				.unwrap()
				.as_str(),
			"http://localhost/docs/api-docs.json"
		);
		assert!(table.url(&origin, "docserve.missing", None).is_none());
	}
}

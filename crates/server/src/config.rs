use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{
	net::IpAddr,
	path::{Path, PathBuf},
};

use crate::routes::RouteTable;

pub const DEFAULT_DOCS_JSON: &str = "api-docs.json";
pub const DEFAULT_DOCS_YAML: &str = "api-docs.yaml";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	version: usize,
	#[serde(default = "default_title")]
	pub title: String,
	#[serde(default)]
	pub generate_always: bool,
	#[serde(default)]
	pub generate_yaml_copy: bool,
	#[serde(default)]
	pub separated_doc: bool,
	pub operations_sort: Option<String>,
	pub additional_config_url: Option<String>,
	pub validator_url: Option<String>,
	pub proxy: Option<OneOrMany>,
	#[serde(default)]
	pub routes: RoutesConfig,
	#[serde(default)]
	pub paths: PathsConfig,
	#[serde(default)]
	pub groups: IndexMap<String, GroupConfig>,
}

/// A config value that may be written either as a single string or as a list.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
	One(String),
	Many(Vec<String>),
}

impl OneOrMany {
	pub fn into_vec(self) -> Vec<String> {
		match self {
			Self::One(value) => vec![value],
			Self::Many(values) => values,
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutesConfig {
	pub api: String,
	pub docs: String,
	pub oauth2_callback: String,
	pub assets: String,
}

impl Default for RoutesConfig {
	fn default() -> Self {
		Self {
			api: "/api/documentation".to_string(),
			docs: "/docs".to_string(),
			oauth2_callback: "/api/oauth2-callback".to_string(),
			assets: "/docs/asset".to_string(),
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
	/// Directory the generated documents are written to.
	pub docs: PathBuf,
	pub docs_json: String,
	pub docs_yaml: String,
	/// Directory holding the OpenAPI fragments the generator merges.
	pub annotations: PathBuf,
	/// Directory holding the Swagger UI distribution.
	pub ui_assets: PathBuf,
	/// Optional Handlebars template replacing the bundled viewer page.
	pub views: Option<PathBuf>,
}

impl Default for PathsConfig {
	fn default() -> Self {
		Self {
			docs: PathBuf::from("storage/api-docs"),
			docs_json: DEFAULT_DOCS_JSON.to_string(),
			docs_yaml: DEFAULT_DOCS_YAML.to_string(),
			annotations: PathBuf::from("docs/openapi"),
			ui_assets: PathBuf::from("public/swagger-ui"),
			views: None,
		}
	}
}

/// Per-group overrides. Every field left unset falls back to the global value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupConfig {
	pub title: Option<String>,
	pub operations_sort: Option<String>,
	pub additional_config_url: Option<String>,
	pub validator_url: Option<String>,
	pub paths: GroupPaths,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupPaths {
	pub docs: Option<PathBuf>,
	pub docs_json: Option<String>,
	pub docs_yaml: Option<String>,
	pub annotations: Option<PathBuf>,
}

/// A peer whose forwarded headers are honoured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrustedProxy {
	Any,
	Addr(IpAddr),
}

impl TrustedProxy {
	pub fn parse(value: &str) -> Result<Self> {
		match value.trim() {
			"*" | "**" => Ok(Self::Any),
			addr => match addr.parse() {
				Ok(addr) => Ok(Self::Addr(addr)),
				Err(_) => bail!("Invalid proxy address {addr}. Must be an IP address or \"*\""),
			},
		}
	}

	pub fn matches(&self, peer: IpAddr) -> bool {
		match self {
			Self::Any => true,
			Self::Addr(addr) => *addr == peer,
		}
	}
}

/// Settings for one document (the global one or a group's), with group
/// overrides already layered over the global values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocSettings {
	pub group: Option<String>,
	pub docs_dir: PathBuf,
	pub docs_json: String,
	/// File the viewer page links to. Unlike `docs_json`, a group without its
	/// own `docs_json` falls back to the global file name.
	pub viewer_docs_json: String,
	pub docs_yaml: String,
	pub annotations: PathBuf,
	pub operations_sort: Option<String>,
	pub additional_config_url: Option<String>,
	pub validator_url: Option<String>,
	pub title: String,
	pub docs_route: String,
	pub api_route: String,
}

impl DocSettings {
	/// Location of `file`, or of the default JSON document when `None`.
	pub fn document_path(&self, file: Option<&str>) -> PathBuf {
		self.docs_dir.join(file.unwrap_or(&self.docs_json))
	}

	pub fn yaml_path(&self) -> PathBuf {
		self.docs_dir.join(&self.docs_yaml)
	}
}

/// Group value if present, else the global one.
fn layered<T>(group: Option<T>, global: impl FnOnce() -> T) -> T {
	group.unwrap_or_else(global)
}

impl Config {
	/// Load the config from a TOML file at the given path.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		if !path.as_ref().exists() {
			return Err(anyhow::anyhow!(
				"Could not locate docserve config file at path {}",
				path.as_ref().display()
			));
		}

		let file = std::fs::read_to_string(path)?;
		Self::parse(&file)
	}

	pub fn parse(contents: &str) -> Result<Self> {
		let config: Self = toml::from_str(contents)?;

		if config.version != 1 {
			return Err(anyhow::anyhow!("Unsupported version: {}", config.version));
		}

		Ok(config)
	}

	pub fn validate(self) -> Result<Self> {
		self.trusted_proxies()?;

		for route in [
			&self.routes.api,
			&self.routes.docs,
			&self.routes.oauth2_callback,
			&self.routes.assets,
		] {
			if !route.starts_with('/') {
				bail!("Invalid route {route}. Routes must start with a /");
			}
		}

		self.groups.keys().try_for_each(|name| {
			if name.is_empty() || name.contains(['/', '.']) {
				bail!("Invalid group name \"{name}\". Group names may not be empty or contain / or .");
			}

			if self.separated_doc && group_route(&self.routes.docs, name) == self.routes.assets {
				bail!(
					"Group {name} would shadow the asset route {}",
					self.routes.assets
				);
			}

			Ok(())
		})?;

		if self.separated_doc && self.groups.is_empty() {
			bail!("separated_doc is enabled but no groups are configured");
		}

		if let Some(path) = RouteTable::from_config(&self).duplicate_path() {
			bail!("Route {path} is registered more than once");
		}

		Ok(self)
	}

	/// The configured proxy list, with a single value normalized into a list.
	pub fn trusted_proxies(&self) -> Result<Vec<TrustedProxy>> {
		self.proxy.clone().map_or_else(
			|| Ok(Vec::new()),
			|proxy| {
				proxy
					.into_vec()
					.iter()
					.map(|value| TrustedProxy::parse(value))
					.collect()
			},
		)
	}

	/// Resolve the settings for the given group, or the global document.
	pub fn settings(&self, group: Option<&str>) -> DocSettings {
		let Some(name) = group else {
			return DocSettings {
				group: None,
				docs_dir: self.paths.docs.clone(),
				docs_json: self.paths.docs_json.clone(),
				viewer_docs_json: self.paths.docs_json.clone(),
				docs_yaml: self.paths.docs_yaml.clone(),
				annotations: self.paths.annotations.clone(),
				operations_sort: self.operations_sort.clone(),
				additional_config_url: self.additional_config_url.clone(),
				validator_url: self.validator_url.clone(),
				title: self.title.clone(),
				docs_route: route_name(None, "docs"),
				api_route: route_name(None, "api"),
			};
		};

		let overrides = self.groups.get(name).cloned().unwrap_or_default();

		DocSettings {
			group: Some(name.to_string()),
			docs_dir: layered(overrides.paths.docs, || self.paths.docs.clone()),
			viewer_docs_json: layered(overrides.paths.docs_json.clone(), || {
				self.paths.docs_json.clone()
			}),
			docs_json: layered(overrides.paths.docs_json, || {
				format!("{name}-{}", self.paths.docs_json)
			}),
			docs_yaml: layered(overrides.paths.docs_yaml, || {
				format!("{name}-{}", self.paths.docs_yaml)
			}),
			annotations: layered(overrides.paths.annotations, || {
				self.paths.annotations.clone()
			}),
			operations_sort: layered(overrides.operations_sort.map(Some), || {
				self.operations_sort.clone()
			}),
			additional_config_url: layered(overrides.additional_config_url.map(Some), || {
				self.additional_config_url.clone()
			}),
			validator_url: layered(overrides.validator_url.map(Some), || {
				self.validator_url.clone()
			}),
			title: layered(overrides.title, || format!("{name} - {}", self.title)),
			docs_route: route_name(Some(name), "docs"),
			api_route: route_name(Some(name), "api"),
		}
	}

	/// Settings for every document this config serves.
	pub fn documents(&self) -> Vec<DocSettings> {
		if self.separated_doc {
			self.groups
				.keys()
				.map(|name| self.settings(Some(name)))
				.collect()
		} else {
			vec![self.settings(None)]
		}
	}
}

fn default_title() -> String {
	"API Documentation".to_string()
}

pub const ROUTE_PREFIX: &str = "docserve";

/// Name of a route, optionally scoped to a group: `docserve.<group>.<action>`.
pub fn route_name(group: Option<&str>, action: &str) -> String {
	group.map_or_else(
		|| format!("{ROUTE_PREFIX}.{action}"),
		|group| format!("{ROUTE_PREFIX}.{group}.{action}"),
	)
}

pub fn group_route(base: &str, group: &str) -> String {
	format!("{}/{group}", base.trim_end_matches('/'))
}

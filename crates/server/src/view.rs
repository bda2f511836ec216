use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use std::path::Path;

const VIEWER_TEMPLATE: &str = "index";
const BUNDLED_VIEWER: &str = include_str!("../templates/index.hbs");

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
	#[error("Failed to load the viewer template: {0}")]
	Template(#[from] handlebars::TemplateError),

	#[error("Failed to read the viewer template: {0}")]
	Io(#[from] std::io::Error),

	#[error("Failed to render the viewer page: {0}")]
	Render(#[from] handlebars::RenderError),

	#[error("Failed to serialize the viewer configuration: {0}")]
	Config(#[from] serde_json::Error),
}

/// Everything the viewer page needs to load a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerContext {
	pub secure: bool,
	pub title: String,
	pub url_to_docs: String,
	pub operations_sorter: Option<String>,
	pub config_url: Option<String>,
	pub validator_url: Option<String>,
	pub assets_url: String,
	pub oauth2_redirect_url: String,
}

pub trait TemplateRenderer: Send + Sync {
	fn render_viewer(&self, context: &ViewerContext) -> Result<String, ViewError>;
}

/// Swagger UI options handed to the page script.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UiConfig<'a> {
	url: &'a str,
	oauth2_redirect_url: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	operations_sorter: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	config_url: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	validator_url: Option<&'a str>,
}

/// Template data: every viewer field, plus the serialized UI options.
#[derive(Serialize)]
struct PageData<'a> {
	#[serde(flatten)]
	context: &'a ViewerContext,
	ui_config: String,
}

pub struct HandlebarsRenderer {
	handlebars: Handlebars<'static>,
}

impl HandlebarsRenderer {
	/// Use the bundled Swagger UI page.
	pub fn new() -> Result<Self, ViewError> {
		Self::from_template(BUNDLED_VIEWER)
	}

	/// Use the template at `path` if given, the bundled one otherwise.
	pub fn load(path: Option<&Path>) -> Result<Self, ViewError> {
		match path {
			Some(path) => Self::from_template(&std::fs::read_to_string(path)?),
			None => Self::new(),
		}
	}

	pub fn from_template(template: &str) -> Result<Self, ViewError> {
		let mut handlebars = Handlebars::new();
		handlebars.set_strict_mode(true);
		handlebars.register_template_string(VIEWER_TEMPLATE, template)?;

		Ok(Self { handlebars })
	}
}

impl TemplateRenderer for HandlebarsRenderer {
	fn render_viewer(&self, context: &ViewerContext) -> Result<String, ViewError> {
		let ui_config = serde_json::to_string(&UiConfig {
			url: &context.url_to_docs,
			oauth2_redirect_url: &context.oauth2_redirect_url,
			operations_sorter: context.operations_sorter.as_deref(),
			config_url: context.config_url.as_deref(),
			validator_url: context.validator_url.as_deref(),
		})?;

		let data = PageData {
			context,
			// the JSON lands inside a <script> block
			ui_config: ui_config.replace('<', "\\u003c"),
		};

		Ok(self.handlebars.render(VIEWER_TEMPLATE, &data)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn context() -> ViewerContext {
		ViewerContext {
			secure: false,
			title: "Acme <API>".to_string(),
			url_to_docs: "http://localhost/docs/api-docs.json".to_string(),
			operations_sorter: Some("alpha".to_string()),
			config_url: None,
			validator_url: None,
			assets_url: "http://localhost/docs/asset".to_string(),
			oauth2_redirect_url: "http://localhost/api/oauth2-callback".to_string(),
		}
	}

	#[test]
	fn renders_bundled_viewer() {
		let html = HandlebarsRenderer::new().unwrap().render_viewer(&context()).unwrap();

		assert!(html.contains("<title>Acme &lt;API&gt;</title>"));
		assert!(html.contains(r#""url":"http://localhost/docs/api-docs.json""#));
		assert!(html.contains(r#""operationsSorter":"alpha""#));
		assert!(!html.contains("configUrl"));
		assert!(html.contains("http://localhost/docs/asset/swagger-ui-bundle.js"));
		assert!(!html.contains("upgrade-insecure-requests"));
	}

	#[test]
	fn secure_requests_upgrade_assets() {
		let html = HandlebarsRenderer::new()
			.unwrap()
			.render_viewer(&ViewerContext {
				secure: true,
				..context()
			})
			.unwrap();

		assert!(html.contains("upgrade-insecure-requests"));
	}

	#[test]
	fn script_payload_cannot_close_the_tag() {
		let html = HandlebarsRenderer::new()
			.unwrap()
			.render_viewer(&ViewerContext {
				url_to_docs: "http://evil/</script><script>alert(1)".to_string(),
				..context()
			})
			.unwrap();

		assert!(!html.contains("</script><script>alert"));
	}

	#[test]
	fn custom_template_is_used() {
		let renderer = HandlebarsRenderer::from_template("{{title}}|{{secure}}").unwrap();

		assert_eq!(renderer.render_viewer(&context()).unwrap(), "Acme &lt;API&gt;|false");
	}

	#[test]
	fn custom_template_sees_every_viewer_field() {
		let renderer = HandlebarsRenderer::from_template(
			"{{url_to_docs}} {{operations_sorter}} {{config_url}} {{validator_url}} {{oauth2_redirect_url}} {{assets_url}}",
		)
		.unwrap();

		let html = renderer
			.render_viewer(&ViewerContext {
				config_url: Some("http://localhost/swagger-config".to_string()),
				validator_url: Some("http://validator.local".to_string()),
				..context()
			})
			.unwrap();

		assert_eq!(
			html,
			"http://localhost/docs/api-docs.json alpha http://localhost/swagger-config http://validator.local http://localhost/api/oauth2-callback http://localhost/docs/asset"
		);
	}

	#[test]
	fn broken_template_is_rejected() {
		assert!(matches!(
			HandlebarsRenderer::from_template("{{#if secure}}unclosed"),
			Err(ViewError::Template(_))
		));
	}
}

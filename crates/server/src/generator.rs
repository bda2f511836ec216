use serde_json::{Map, Value};
use std::{
	fs,
	path::{Path, PathBuf},
};
use walkdir::WalkDir;

use crate::config::{Config, DocSettings};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
	#[error("No OpenAPI fragments found in {}", .0.display())]
	NoSources(PathBuf),

	#[error("Failed to parse {}: {message}", .path.display())]
	Parse { path: PathBuf, message: String },

	#[error("Generated document is invalid: {0}")]
	InvalidDocument(String),

	#[error("Failed to access {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Produces the documentation files the server hands out.
pub trait Generator: Send + Sync {
	/// (Re)write every document this generator is responsible for.
	fn generate_docs(&self) -> Result<(), GenerationError>;
}

/// Builds documents by merging the JSON and YAML fragments found in each
/// document's annotations directory.
#[derive(Debug, Clone)]
pub struct FragmentGenerator {
	documents: Vec<DocSettings>,
	yaml_copy: bool,
}

impl FragmentGenerator {
	pub fn new(config: &Config) -> Self {
		Self {
			documents: config.documents(),
			yaml_copy: config.generate_yaml_copy,
		}
	}

	/// Regenerate a single group's document, or the global one for `None`.
	pub fn generate_group(&self, group: Option<&str>) -> Result<(), GenerationError> {
		let settings = self
			.documents
			.iter()
			.find(|settings| settings.group.as_deref() == group)
			.ok_or_else(|| {
				GenerationError::InvalidDocument(format!(
					"no document is configured for group {}",
					group.unwrap_or("(default)")
				))
			})?;

		self.generate(settings)
	}

	pub fn documents(&self) -> &[DocSettings] {
		&self.documents
	}

	fn generate(&self, settings: &DocSettings) -> Result<(), GenerationError> {
		let document = build_document(&settings.annotations)?;

		fs::create_dir_all(&settings.docs_dir).map_err(|source| GenerationError::Io {
			path: settings.docs_dir.clone(),
			source,
		})?;

		let json_path = settings.document_path(None);
		let json = serde_json::to_vec_pretty(&document)
			.map_err(|e| GenerationError::InvalidDocument(e.to_string()))?;
		write(&json_path, &json)?;

		if self.yaml_copy {
			let yaml = serde_yaml::to_string(&document)
				.map_err(|e| GenerationError::InvalidDocument(e.to_string()))?;
			write(&settings.yaml_path(), yaml.as_bytes())?;
		}

		tracing::info!(
			group = settings.group.as_deref().unwrap_or("default"),
			path = %json_path.display(),
			"Generated documentation"
		);

		Ok(())
	}
}

impl Generator for FragmentGenerator {
	fn generate_docs(&self) -> Result<(), GenerationError> {
		self.documents
			.iter()
			.try_for_each(|settings| self.generate(settings))
	}
}

fn write(path: &Path, contents: &[u8]) -> Result<(), GenerationError> {
	fs::write(path, contents).map_err(|source| GenerationError::Io {
		path: path.to_path_buf(),
		source,
	})
}

/// Merge every fragment under `dir` into one document.
pub fn build_document(dir: &Path) -> Result<Value, GenerationError> {
	let mut fragments = Vec::new();

	for entry in WalkDir::new(dir).sort_by_file_name() {
		let entry = entry.map_err(|e| GenerationError::Io {
			path: e.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf),
			source: e.into_io_error().unwrap_or_else(|| {
				std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop")
			}),
		})?;

		if entry.file_type().is_file() {
			if let Some(fragment) = read_fragment(entry.path())? {
				fragments.push(fragment);
			}
		}
	}

	if fragments.is_empty() {
		return Err(GenerationError::NoSources(dir.to_path_buf()));
	}

	let document = fragments
		.into_iter()
		.fold(Value::Object(Map::new()), |mut document, fragment| {
			merge(&mut document, fragment);
			document
		});

	validate(&document)?;

	Ok(document)
}

fn read_fragment(path: &Path) -> Result<Option<Value>, GenerationError> {
	let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
		return Ok(None);
	};

	let parse_error = |message: String| GenerationError::Parse {
		path: path.to_path_buf(),
		message,
	};

	let value = match ext {
		"json" => {
			let contents = read(path)?;
			serde_json::from_str(&contents).map_err(|e| parse_error(e.to_string()))?
		},
		"yaml" | "yml" => {
			let contents = read(path)?;
			serde_yaml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?
		},
		_ => return Ok(None),
	};

	Ok(Some(value))
}

fn read(path: &Path) -> Result<String, GenerationError> {
	fs::read_to_string(path).map_err(|source| GenerationError::Io {
		path: path.to_path_buf(),
		source,
	})
}

/// Deep-merge `incoming` into `base`: objects merge key by key, arrays are
/// concatenated and anything else is replaced.
pub fn merge(base: &mut Value, incoming: Value) {
	match (base, incoming) {
		(Value::Object(base), Value::Object(incoming)) => {
			for (key, value) in incoming {
				match base.get_mut(&key) {
					Some(existing) => merge(existing, value),
					None => {
						base.insert(key, value);
					},
				}
			}
		},
		(Value::Array(base), Value::Array(incoming)) => base.extend(incoming),
		(base, incoming) => *base = incoming,
	}
}

fn validate(document: &Value) -> Result<(), GenerationError> {
	let has_version = ["openapi", "swagger"]
		.iter()
		.any(|key| document.get(key).is_some_and(Value::is_string));

	if !has_version {
		return Err(GenerationError::InvalidDocument(
			"missing an \"openapi\" or \"swagger\" version".to_string(),
		));
	}

	if !document.get("info").is_some_and(Value::is_object) {
		return Err(GenerationError::InvalidDocument(
			"missing the \"info\" object".to_string(),
		));
	}

	Ok(())
}

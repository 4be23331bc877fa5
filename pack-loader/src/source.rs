//! Pack sources and syntax parsing into a generic tree.

use std::fs;
use std::path::{Path, PathBuf};

use pack_primitives::{Error, Result};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::{LoaderConfig, SourceFormat};

/// Where a pack document comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PackSource {
    /// A file on disk.
    Path(PathBuf),
    /// Raw JSON or YAML text.
    Text(String),
}

impl From<PathBuf> for PackSource {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for PackSource {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<String> for PackSource {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for PackSource {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl PackSource {
    /// Reads and syntax-parses the source into a generic JSON tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when a file cannot be read and [`Error::Parse`]
    /// when the text is not well-formed or exceeds the configured size limit.
    pub fn read_tree(&self, config: &LoaderConfig) -> Result<JsonValue> {
        match self {
            Self::Path(path) => {
                let text = fs::read_to_string(path).map_err(|source| Error::Io {
                    path: path.clone(),
                    source,
                })?;
                debug!(path = %path.display(), bytes = text.len(), "read pack file");
                parse_text(&text, config.format.for_path(path, &text), config)
            }
            Self::Text(text) => parse_text(text, config.format.for_text(text), config),
        }
    }
}

fn parse_text(text: &str, format: SourceFormat, config: &LoaderConfig) -> Result<JsonValue> {
    if let Some(limit) = config.max_source_bytes {
        if text.len() > limit {
            return Err(Error::parse(format!(
                "pack source is {} bytes, above the {limit} byte limit",
                text.len()
            )));
        }
    }

    match format {
        SourceFormat::Yaml => serde_yaml::from_str(text)
            .map_err(|err| Error::parse(format!("invalid YAML: {err}"))),
        SourceFormat::Json | SourceFormat::Auto => serde_json::from_str(text)
            .map_err(|err| Error::parse(format!("invalid JSON: {err}"))),
    }
}

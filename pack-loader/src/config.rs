//! Loader configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default upper bound on the size of a pack source.
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 16 * 1024 * 1024;

/// Syntax of a pack source.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Decide from the file extension or the first non-blank character.
    #[default]
    Auto,
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl SourceFormat {
    /// Resolves `Auto` for a file path, falling back to content sniffing.
    #[must_use]
    pub fn for_path(self, path: &Path, text: &str) -> Self {
        if self != Self::Auto {
            return self;
        }

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Self::Json,
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Auto.for_text(text),
        }
    }

    /// Resolves `Auto` for raw text: documents opening with `{` are JSON.
    #[must_use]
    pub fn for_text(self, text: &str) -> Self {
        match self {
            Self::Auto if text.trim_start().starts_with('{') => Self::Json,
            Self::Auto => Self::Yaml,
            explicit => explicit,
        }
    }
}

/// Settings controlling how pack sources are read.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Source syntax; `Auto` sniffs it.
    pub format: SourceFormat,
    /// Sources larger than this are rejected; `None` disables the check.
    pub max_source_bytes: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            format: SourceFormat::Auto,
            max_source_bytes: Some(DEFAULT_MAX_SOURCE_BYTES),
        }
    }
}

impl LoaderConfig {
    /// Forces a source format.
    #[must_use]
    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the size limit.
    #[must_use]
    pub fn with_max_source_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_source_bytes = limit;
        self
    }
}

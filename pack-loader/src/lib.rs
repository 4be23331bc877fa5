//! Parses PromptPack documents into the typed document model.
//!
//! Parsing runs in three stages: syntax (JSON or YAML into a generic tree),
//! schema validation, and coercion of variable defaults and validator params.
//! Fragment references are not checked here; templates are only inspected
//! when rendered.

#![warn(missing_docs, clippy::pedantic)]

pub mod config;
mod dto;
pub mod schema;
pub mod source;

use std::path::Path;

use pack_primitives::{Pack, Result};

pub use config::{LoaderConfig, SourceFormat};
pub use source::PackSource;

/// Parses packs with a fixed [`LoaderConfig`].
#[derive(Clone, Debug, Default)]
pub struct PackLoader {
    config: LoaderConfig,
}

impl PackLoader {
    /// Creates a loader with the supplied configuration.
    #[must_use]
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Parses a pack from any source.
    ///
    /// # Errors
    ///
    /// Propagates syntax, I/O, schema, and validator configuration errors.
    pub fn load(&self, source: impl Into<PackSource>) -> Result<Pack> {
        let tree = source.into().read_tree(&self.config)?;
        schema::pack_from_tree(&tree)
    }
}

/// Parses a pack from a path or raw text with the default configuration.
///
/// # Errors
///
/// Propagates syntax, I/O, schema, and validator configuration errors.
pub fn parse(source: impl Into<PackSource>) -> Result<Pack> {
    PackLoader::default().load(source)
}

/// Parses a pack from raw JSON or YAML text.
///
/// # Errors
///
/// Propagates syntax, schema, and validator configuration errors.
pub fn parse_str(text: &str) -> Result<Pack> {
    parse(PackSource::from(text))
}

/// Parses a pack from a file.
///
/// # Errors
///
/// Propagates I/O, syntax, schema, and validator configuration errors.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Pack> {
    parse(PackSource::from(path.as_ref()))
}

//! Tracing subscriber installation for PromptPack hosts.
//!
//! The library crates only emit `tracing` events; binaries and tests call
//! [`init`] or [`init_from_env`] once to see them.

#![warn(missing_docs, clippy::pedantic)]

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable read by [`init_from_env`].
pub const LOG_ENV: &str = "PROMPTPACK_LOG";

/// Filter used when [`LOG_ENV`] is unset or empty.
pub const DEFAULT_FILTER: &str = "warn";

/// Installs a global fmt subscriber filtered by `filter`, an `EnvFilter`
/// directive such as `pack_prompts=debug,warn`.
///
/// # Errors
///
/// Fails when the directive does not parse or a global subscriber is
/// already installed.
pub fn init(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter).with_context(|| format!("invalid log filter `{filter}`"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("tracing subscriber already installed")
}

/// Installs a global subscriber filtered by [`LOG_ENV`], falling back to
/// [`DEFAULT_FILTER`].
///
/// # Errors
///
/// Same as [`init`].
pub fn init_from_env() -> Result<()> {
    let directive = std::env::var(LOG_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_owned());
    init(&directive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_directives() {
        let err = init("pack_prompts=loud").expect_err("bad level");
        assert!(err.to_string().contains("invalid log filter"));
    }

    #[test]
    fn second_install_is_reported() {
        // Both calls may lose the race against another test's install; only
        // the second one is guaranteed to fail.
        let _ = init("debug");
        assert!(init("debug").is_err());
    }
}

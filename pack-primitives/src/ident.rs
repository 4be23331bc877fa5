//! Identifier and version format checks shared by the loader and model builders.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::path::FieldPath;

const MAX_PACK_ID_LEN: usize = 100;
const MAX_PACK_NAME_LEN: usize = 200;

static SEMVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v?(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
    )
    .expect("semver pattern compiles")
});

/// Validates a pack identifier (`^[a-z][a-z0-9-]*$`, at most 100 characters).
///
/// # Errors
///
/// Returns [`Error::Validation`] when the identifier is malformed.
pub fn check_pack_id(id: &str, path: &FieldPath) -> Result<()> {
    if id.len() > MAX_PACK_ID_LEN {
        return Err(Error::validation(
            path,
            format!("pack id length must be <= {MAX_PACK_ID_LEN}"),
        ));
    }
    check_lowercase_id(id, path, false)
}

/// Validates a prompt identifier (`^[a-z][a-z0-9_-]*$`).
///
/// # Errors
///
/// Returns [`Error::Validation`] when the identifier is malformed.
pub fn check_prompt_id(id: &str, path: &FieldPath) -> Result<()> {
    check_lowercase_id(id, path, true)
}

/// Validates a pack display name (non-empty, at most 200 characters).
///
/// # Errors
///
/// Returns [`Error::Validation`] when the name is blank or too long.
pub fn check_display_name(name: &str, path: &FieldPath) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation(path, "name cannot be empty"));
    }
    if name.chars().count() > MAX_PACK_NAME_LEN {
        return Err(Error::validation(
            path,
            format!("name length must be <= {MAX_PACK_NAME_LEN}"),
        ));
    }
    Ok(())
}

/// Validates a variable or tool name (`^[A-Za-z_][A-Za-z0-9_]*$`).
///
/// # Errors
///
/// Returns [`Error::Validation`] when the name is malformed.
pub fn check_symbol(name: &str, path: &FieldPath) -> Result<()> {
    if is_symbol(name) {
        Ok(())
    } else {
        Err(Error::validation(
            path,
            format!("`{name}` must start with a letter or underscore and contain only alphanumerics or underscores"),
        ))
    }
}

/// Validates a semantic version string, optionally prefixed with `v`.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the version does not parse.
pub fn check_version(version: &str, path: &FieldPath) -> Result<()> {
    if SEMVER.is_match(version) {
        Ok(())
    } else {
        Err(Error::validation(
            path,
            format!("`{version}` is not a semantic version"),
        ))
    }
}

/// Returns true when `name` is usable as a placeholder or tool name.
#[must_use]
pub fn is_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_lowercase_id(id: &str, path: &FieldPath, allow_underscore: bool) -> Result<()> {
    let mut chars = id.chars();
    let leading_ok = matches!(chars.next(), Some('a'..='z'));
    let rest_ok = chars.all(|c| {
        matches!(c, 'a'..='z' | '0'..='9' | '-') || (allow_underscore && c == '_')
    });

    if leading_ok && rest_ok {
        return Ok(());
    }

    let allowed = if allow_underscore {
        "lowercase alphanumerics, dash, or underscore"
    } else {
        "lowercase alphanumerics or dash"
    };
    Err(Error::validation(
        path,
        format!("`{id}` must start with a lowercase letter and contain only {allowed}"),
    ))
}

//! Content validator declarations and the type registration table.
//!
//! Each shipped validator type has a closed [`ValidatorParams`] variant and an
//! entry in the registration table that coerces raw document params into it.
//! Unknown type names are rejected when the pack is built, never at run time.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};
use crate::path::FieldPath;

/// The shipped validator types.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ValidatorKind {
    /// Case-sensitive banned substring check.
    BannedWords,
    /// Upper bound on character count.
    MaxLength,
    /// Lower bound on character count.
    MinLength,
    /// Required or forbidden regular expression.
    RegexMatch,
    /// Content must be JSON satisfying a schema.
    JsonSchema,
}

impl ValidatorKind {
    /// Returns the type name used in pack documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        REGISTRY
            .iter()
            .find(|entry| entry.kind == self)
            .map_or("unknown", |entry| entry.name)
    }

    /// Looks up a type name in the registration table.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        lookup(name).map(|entry| entry.kind)
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A JSON schema compiled once when the pack is built.
#[derive(Clone)]
pub struct CompiledSchema {
    source: JsonValue,
    validator: Arc<jsonschema::Validator>,
}

impl CompiledSchema {
    /// Compiles the supplied schema.
    ///
    /// # Errors
    ///
    /// Returns a description of the schema problem when it does not compile.
    pub fn compile(source: JsonValue) -> std::result::Result<Self, String> {
        let validator = jsonschema::validator_for(&source).map_err(|err| err.to_string())?;
        Ok(Self {
            source,
            validator: Arc::new(validator),
        })
    }

    /// Returns the schema document.
    #[must_use]
    pub fn source(&self) -> &JsonValue {
        &self.source
    }

    /// Returns every schema violation for `instance`, formatted as `path: message`.
    #[must_use]
    pub fn violations(&self, instance: &JsonValue) -> Vec<String> {
        self.validator
            .iter_errors(instance)
            .map(|err| {
                let location = err.instance_path().to_string();
                if location.is_empty() {
                    err.to_string()
                } else {
                    format!("{location}: {err}")
                }
            })
            .collect()
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Typed params for each validator kind.
#[derive(Clone, Debug)]
pub enum ValidatorParams {
    /// Words that must not appear in the content.
    BannedWords {
        /// Banned substrings, matched case-sensitively.
        words: Vec<String>,
    },
    /// Maximum content length.
    MaxLength {
        /// Inclusive upper bound in characters.
        max_characters: usize,
    },
    /// Minimum content length.
    MinLength {
        /// Inclusive lower bound in characters.
        min_characters: usize,
    },
    /// Regular expression constraint.
    RegexMatch {
        /// Compiled pattern, searched anywhere in the content.
        pattern: Regex,
        /// `true` requires a match; `false` forbids one.
        must_match: bool,
    },
    /// JSON schema constraint.
    JsonSchema {
        /// Compiled schema.
        schema: CompiledSchema,
    },
}

impl ValidatorParams {
    /// Returns the kind these params belong to.
    #[must_use]
    pub fn kind(&self) -> ValidatorKind {
        match self {
            Self::BannedWords { .. } => ValidatorKind::BannedWords,
            Self::MaxLength { .. } => ValidatorKind::MaxLength,
            Self::MinLength { .. } => ValidatorKind::MinLength,
            Self::RegexMatch { .. } => ValidatorKind::RegexMatch,
            Self::JsonSchema { .. } => ValidatorKind::JsonSchema,
        }
    }
}

/// A content validator attached to a prompt.
#[derive(Clone, Debug)]
pub struct Validator {
    enabled: bool,
    fail_on_violation: bool,
    params: ValidatorParams,
}

impl Validator {
    /// Creates an enabled, non-blocking validator from typed params.
    #[must_use]
    pub fn new(params: ValidatorParams) -> Self {
        Self {
            enabled: true,
            fail_on_violation: false,
            params,
        }
    }

    /// Builds a validator from its document form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `type_name` is not registered or
    /// the params cannot be coerced into the registered shape.
    pub fn from_config(
        type_name: &str,
        enabled: bool,
        fail_on_violation: bool,
        params: &Map<String, JsonValue>,
        path: &FieldPath,
    ) -> Result<Self> {
        let entry = lookup(type_name).ok_or_else(|| {
            Error::configuration(
                &path.key("type"),
                format!(
                    "unknown validator type `{type_name}` (expected one of: {})",
                    registered_types().collect::<Vec<_>>().join(", ")
                ),
            )
        })?;

        let params = (entry.build)(params, &path.key("params"))?;
        Ok(Self {
            enabled,
            fail_on_violation,
            params,
        })
    }

    /// Creates a `banned_words` validator.
    #[must_use]
    pub fn banned_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ValidatorParams::BannedWords {
            words: words.into_iter().map(Into::into).collect(),
        })
    }

    /// Creates a `max_length` validator.
    #[must_use]
    pub fn max_length(max_characters: usize) -> Self {
        Self::new(ValidatorParams::MaxLength { max_characters })
    }

    /// Creates a `min_length` validator.
    #[must_use]
    pub fn min_length(min_characters: usize) -> Self {
        Self::new(ValidatorParams::MinLength { min_characters })
    }

    /// Creates a `regex_match` validator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the pattern does not compile.
    pub fn regex_match(pattern: &str, must_match: bool) -> Result<Self> {
        let pattern = compile_pattern(pattern, &FieldPath::root().key("pattern"))?;
        Ok(Self::new(ValidatorParams::RegexMatch {
            pattern,
            must_match,
        }))
    }

    /// Creates a `json_schema` validator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the schema does not compile.
    pub fn json_schema(schema: JsonValue) -> Result<Self> {
        let schema = CompiledSchema::compile(schema)
            .map_err(|reason| Error::configuration(&FieldPath::root().key("schema"), reason))?;
        Ok(Self::new(ValidatorParams::JsonSchema { schema }))
    }

    /// Sets whether a violation is blocking.
    #[must_use]
    pub fn blocking(mut self, fail_on_violation: bool) -> Self {
        self.fail_on_violation = fail_on_violation;
        self
    }

    /// Sets whether the validator runs at all.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the validator kind.
    #[must_use]
    pub fn kind(&self) -> ValidatorKind {
        self.params.kind()
    }

    /// Returns true when the validator should run.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true when a violation makes the content invalid.
    #[must_use]
    pub fn fails_on_violation(&self) -> bool {
        self.fail_on_violation
    }

    /// Returns the typed params.
    #[must_use]
    pub fn params(&self) -> &ValidatorParams {
        &self.params
    }
}

type ParamsBuilder = fn(&Map<String, JsonValue>, &FieldPath) -> Result<ValidatorParams>;

struct Registration {
    name: &'static str,
    kind: ValidatorKind,
    build: ParamsBuilder,
}

const REGISTRY: &[Registration] = &[
    Registration {
        name: "banned_words",
        kind: ValidatorKind::BannedWords,
        build: build_banned_words,
    },
    Registration {
        name: "max_length",
        kind: ValidatorKind::MaxLength,
        build: build_max_length,
    },
    Registration {
        name: "min_length",
        kind: ValidatorKind::MinLength,
        build: build_min_length,
    },
    Registration {
        name: "regex_match",
        kind: ValidatorKind::RegexMatch,
        build: build_regex_match,
    },
    Registration {
        name: "json_schema",
        kind: ValidatorKind::JsonSchema,
        build: build_json_schema,
    },
];

fn lookup(name: &str) -> Option<&'static Registration> {
    REGISTRY.iter().find(|entry| entry.name == name)
}

/// Returns the registered validator type names in registration order.
pub fn registered_types() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|entry| entry.name)
}

fn build_banned_words(params: &Map<String, JsonValue>, path: &FieldPath) -> Result<ValidatorParams> {
    let path = path.key("words");
    let words = match params.get("words") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::String(word)) => vec![word.clone()],
        Some(JsonValue::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                JsonValue::String(word) => Ok(word.clone()),
                JsonValue::Number(number) => Ok(number.to_string()),
                other => Err(Error::configuration(
                    &path.index(index),
                    format!("expected a string, found {}", json_kind(other)),
                )),
            })
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(Error::configuration(
                &path,
                format!("expected an array of strings, found {}", json_kind(other)),
            ));
        }
    };

    Ok(ValidatorParams::BannedWords { words })
}

fn build_max_length(params: &Map<String, JsonValue>, path: &FieldPath) -> Result<ValidatorParams> {
    let max_characters = required_count(params, "max_characters", path)?;
    Ok(ValidatorParams::MaxLength { max_characters })
}

fn build_min_length(params: &Map<String, JsonValue>, path: &FieldPath) -> Result<ValidatorParams> {
    let min_characters = required_count(params, "min_characters", path)?;
    Ok(ValidatorParams::MinLength { min_characters })
}

fn build_regex_match(params: &Map<String, JsonValue>, path: &FieldPath) -> Result<ValidatorParams> {
    let pattern_path = path.key("pattern");
    let pattern = match params.get("pattern") {
        Some(JsonValue::String(pattern)) => compile_pattern(pattern, &pattern_path)?,
        Some(other) => {
            return Err(Error::configuration(
                &pattern_path,
                format!("expected a string, found {}", json_kind(other)),
            ));
        }
        None => return Err(Error::configuration(&pattern_path, "pattern is required")),
    };

    let must_match_path = path.key("must_match");
    let must_match = match params.get("must_match") {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::Bool(flag)) => *flag,
        Some(JsonValue::String(text)) => match text.to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            _ => {
                return Err(Error::configuration(
                    &must_match_path,
                    format!("expected a boolean, found `{text}`"),
                ));
            }
        },
        Some(other) => {
            return Err(Error::configuration(
                &must_match_path,
                format!("expected a boolean, found {}", json_kind(other)),
            ));
        }
    };

    Ok(ValidatorParams::RegexMatch {
        pattern,
        must_match,
    })
}

fn build_json_schema(params: &Map<String, JsonValue>, path: &FieldPath) -> Result<ValidatorParams> {
    let schema_path = path.key("schema");
    let source = match params.get("schema") {
        Some(schema @ (JsonValue::Object(_) | JsonValue::Bool(_))) => schema.clone(),
        Some(other) => {
            return Err(Error::configuration(
                &schema_path,
                format!("expected a schema object, found {}", json_kind(other)),
            ));
        }
        None => return Err(Error::configuration(&schema_path, "schema is required")),
    };

    let schema = CompiledSchema::compile(source)
        .map_err(|reason| Error::configuration(&schema_path, reason))?;
    Ok(ValidatorParams::JsonSchema { schema })
}

fn compile_pattern(pattern: &str, path: &FieldPath) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|err| Error::configuration(path, format!("invalid regex `{pattern}`: {err}")))
}

fn required_count(params: &Map<String, JsonValue>, key: &str, path: &FieldPath) -> Result<usize> {
    let path = path.key(key);
    let value = params
        .get(key)
        .ok_or_else(|| Error::configuration(&path, format!("{key} is required")))?;

    coerce_count(value).ok_or_else(|| {
        Error::configuration(
            &path,
            format!("expected a non-negative integer, found {value}"),
        )
    })
}

/// Accepts integers, integral floats, and numeric strings.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn coerce_count(value: &JsonValue) -> Option<usize> {
    match value {
        JsonValue::Number(number) => {
            if let Some(count) = number.as_u64() {
                return usize::try_from(count).ok();
            }
            let float = number.as_f64()?;
            if float >= 0.0 && float.fract() == 0.0 && float <= f64::from(u32::MAX) {
                return Some(float as usize);
            }
            None
        }
        JsonValue::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

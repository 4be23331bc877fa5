//! Tagged variable values and their canonical text form.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number};

/// Declared type of a template variable.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// UTF-8 text.
    String,
    /// Integer or floating point number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// Ordered list of JSON values.
    Array,
    /// JSON object.
    Object,
}

impl ValueType {
    /// Returns the type name used in pack documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Parses a type name used in pack documents.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable value supplied by the caller or declared as a default.
///
/// Type checks are structural: a value only satisfies the [`ValueType`] of its
/// own variant, with no coercion between variants. Array elements and object
/// members are kept as raw JSON since only the outer shape is typed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Text value.
    String(String),
    /// Numeric value; integers keep their integral representation.
    Number(Number),
    /// Boolean value.
    Bool(bool),
    /// Array value.
    Array(Vec<serde_json::Value>),
    /// Object value.
    Object(Map<String, serde_json::Value>),
}

impl Value {
    /// Converts a JSON value, treating `null` as an absent value.
    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(Self::String(s)),
            serde_json::Value::Number(n) => Some(Self::Number(n)),
            serde_json::Value::Bool(b) => Some(Self::Bool(b)),
            serde_json::Value::Array(items) => Some(Self::Array(items)),
            serde_json::Value::Object(map) => Some(Self::Object(map)),
        }
    }

    /// Returns the structural type of the value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::String(_) => ValueType::String,
            Self::Number(_) => ValueType::Number,
            Self::Bool(_) => ValueType::Boolean,
            Self::Array(_) => ValueType::Array,
            Self::Object(_) => ValueType::Object,
        }
    }

    /// Returns true when the value satisfies the supplied declared type.
    #[must_use]
    pub fn is_a(&self, expected: ValueType) -> bool {
        self.value_type() == expected
    }

    /// Returns the string contents for string values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value as `f64` for number values.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Returns the value as JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Array(items) => serde_json::Value::Array(items.clone()),
            Self::Object(map) => serde_json::Value::Object(map.clone()),
        }
    }
}

/// Canonical text form used for template substitution.
///
/// Strings are inserted verbatim, booleans as `true`/`false`, numbers in
/// decimal without trailing zeros, arrays and objects as compact JSON.
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => f.write_str(&canonical_number(n)),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Array(items) => write!(f, "{}", serde_json::Value::Array(items.clone())),
            Self::Object(map) => write!(f, "{}", serde_json::Value::Object(map.clone())),
        }
    }
}

/// Formats a JSON number without exponent noise or trailing zeros.
#[must_use]
pub fn canonical_number(number: &Number) -> String {
    if !number.is_f64() {
        return number.to_string();
    }

    let Some(float) = number.as_f64() else {
        return number.to_string();
    };

    if float == 0.0 {
        return "0".to_owned();
    }

    // `Display` for f64 already yields the shortest round-tripping decimal
    // and never an exponent, so integral floats print as plain integers.
    format!("{float}")
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(Number::from(value))
    }
}

/// A float with no JSON representation (NaN or an infinity).
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
#[error("{0} is not a finite number")]
pub struct NonFiniteNumber(
    /// The rejected value.
    pub f64,
);

impl TryFrom<f64> for Value {
    type Error = NonFiniteNumber;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Number::from_f64(value)
            .map(Self::Number)
            .ok_or(NonFiniteNumber(value))
    }
}

impl From<Vec<serde_json::Value>> for Value {
    fn from(value: Vec<serde_json::Value>) -> Self {
        Self::Array(value)
    }
}

impl From<Map<String, serde_json::Value>> for Value {
    fn from(value: Map<String, serde_json::Value>) -> Self {
        Self::Object(value)
    }
}

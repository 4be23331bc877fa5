//! Template variable declarations.

use regex::Regex;

use crate::value::{Value, ValueType};

/// Additional constraints applied to a variable value after its type check.
#[derive(Clone, Debug, Default)]
pub struct VariableRules {
    /// Pattern string values must match (anchored at the start).
    pub pattern: Option<Regex>,
    /// Minimum string length in characters.
    pub min_length: Option<usize>,
    /// Maximum string length in characters.
    pub max_length: Option<usize>,
    /// Minimum numeric value.
    pub minimum: Option<f64>,
    /// Maximum numeric value.
    pub maximum: Option<f64>,
    /// Exhaustive list of allowed values.
    pub allowed: Option<Vec<serde_json::Value>>,
}

impl VariableRules {
    /// Returns true when no rule is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.minimum.is_none()
            && self.maximum.is_none()
            && self.allowed.is_none()
    }

    /// Checks a value against the configured rules, returning the first failure.
    #[must_use]
    pub fn check(&self, value: &Value) -> Option<String> {
        if let Value::String(text) = value {
            if let Some(pattern) = &self.pattern {
                let anchored = pattern.find(text).is_some_and(|m| m.start() == 0);
                if !anchored {
                    return Some(format!("value does not match pattern: {}", pattern.as_str()));
                }
            }

            let length = text.chars().count();
            if let Some(min) = self.min_length {
                if length < min {
                    return Some(format!("string too short: {length} < {min}"));
                }
            }
            if let Some(max) = self.max_length {
                if length > max {
                    return Some(format!("string too long: {length} > {max}"));
                }
            }
        }

        if let Some(number) = value.as_f64() {
            if let Some(min) = self.minimum {
                if number < min {
                    return Some(format!("value below minimum: {number} < {min}"));
                }
            }
            if let Some(max) = self.maximum {
                if number > max {
                    return Some(format!("value above maximum: {number} > {max}"));
                }
            }
        }

        if let Some(allowed) = &self.allowed {
            let json = value.to_json();
            if !allowed.iter().any(|candidate| json_eq(candidate, &json)) {
                let listed = serde_json::Value::Array(allowed.clone());
                return Some(format!("value not in allowed values: {listed}"));
            }
        }

        None
    }
}

// Numbers compare by value so `1` and `1.0` are treated as the same enum member.
fn json_eq(left: &serde_json::Value, right: &serde_json::Value) -> bool {
    match (left, right) {
        (serde_json::Value::Number(a), serde_json::Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// A typed template variable declared by a prompt.
#[derive(Clone, Debug)]
pub struct Variable {
    name: String,
    value_type: ValueType,
    required: bool,
    default: Option<Value>,
    description: Option<String>,
    rules: VariableRules,
}

impl Variable {
    /// Creates an optional variable without default or rules.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            required: false,
            default: None,
            description: None,
            rules: VariableRules::default(),
        }
    }

    /// Marks the variable as required. Required variables carry no default.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self.default = None;
        self
    }

    /// Sets the default value used when the caller omits the variable.
    ///
    /// Defaults only apply to optional variables, so this clears `required`.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self.required = false;
        self
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches value rules.
    #[must_use]
    pub fn with_rules(mut self, rules: VariableRules) -> Self {
        self.rules = rules;
        self
    }

    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Returns true when callers must supply a value.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the default value, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the configured value rules.
    #[must_use]
    pub fn rules(&self) -> &VariableRules {
        &self.rules
    }
}

//! Caller-supplied variable values and their validation.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use pack_primitives::{Value, ValueType, Variable};

/// Variable values keyed by name.
pub type Inputs = BTreeMap<String, Value>;

/// Converts a JSON object into [`Inputs`], dropping `null` members.
#[must_use]
pub fn inputs_from_json(object: &serde_json::Map<String, serde_json::Value>) -> Inputs {
    object
        .iter()
        .filter_map(|(name, value)| Value::from_json(value.clone()).map(|v| (name.clone(), v)))
        .collect()
}

/// What went wrong with a single variable.
#[derive(Clone, Debug, PartialEq)]
pub enum IssueKind {
    /// Required, not supplied, and without default.
    Missing,
    /// Supplied with a different structural type.
    WrongType {
        /// Declared type.
        expected: ValueType,
        /// Type of the supplied value.
        found: ValueType,
    },
    /// Supplied with the right type but rejected by a variable rule.
    Rule(String),
}

/// A problem found while checking inputs against declared variables.
#[derive(Clone, Debug, PartialEq)]
pub struct InputIssue {
    name: String,
    kind: IssueKind,
}

impl InputIssue {
    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the kind of problem.
    #[must_use]
    pub fn kind(&self) -> &IssueKind {
        &self.kind
    }

    /// Describes the problem without naming the variable.
    #[must_use]
    pub fn reason(&self) -> String {
        match &self.kind {
            IssueKind::Missing => "required variable is missing".to_owned(),
            IssueKind::WrongType { expected, found } => format!("expected {expected}, got {found}"),
            IssueKind::Rule(reason) => reason.clone(),
        }
    }
}

impl Display for InputIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "variable '{}': {}", self.name, self.reason())
    }
}

/// Checks `inputs` against `variables`, one issue at most per variable.
///
/// Issues follow declaration order. Inputs without a matching declaration
/// are ignored.
#[must_use]
pub fn check_inputs(variables: &[Variable], inputs: &Inputs) -> Vec<InputIssue> {
    variables
        .iter()
        .filter_map(|variable| {
            let kind = check_variable(variable, inputs.get(variable.name()))?;
            Some(InputIssue {
                name: variable.name().to_owned(),
                kind,
            })
        })
        .collect()
}

/// Validates `inputs` against `variables` and returns one message per problem.
///
/// An empty list means the inputs are acceptable.
#[must_use]
pub fn validate_inputs(variables: &[Variable], inputs: &Inputs) -> Vec<String> {
    check_inputs(variables, inputs)
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn check_variable(variable: &Variable, supplied: Option<&Value>) -> Option<IssueKind> {
    let Some(value) = supplied else {
        let missing = variable.is_required() && variable.default_value().is_none();
        return missing.then_some(IssueKind::Missing);
    };

    if !value.is_a(variable.value_type()) {
        return Some(IssueKind::WrongType {
            expected: variable.value_type(),
            found: value.value_type(),
        });
    }

    variable.rules().check(value).map(IssueKind::Rule)
}

//! Validation outcomes.

use pack_primitives::ValidatorKind;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    #[serde(serialize_with = "kind_name")]
    validator_type: ValidatorKind,
    message: String,
    fail_on_violation: bool,
}

impl Violation {
    /// Creates a violation raised by a validator of `validator_type`.
    #[must_use]
    pub fn new(validator_type: ValidatorKind, message: impl Into<String>, fail_on_violation: bool) -> Self {
        Self {
            validator_type,
            message: message.into(),
            fail_on_violation,
        }
    }

    /// Returns the kind of validator that raised the violation.
    #[must_use]
    pub fn validator_type(&self) -> ValidatorKind {
        self.validator_type
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true when the originating validator was blocking.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.fail_on_violation
    }
}

fn kind_name<S: Serializer>(kind: &ValidatorKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.as_str())
}

/// Outcome of running a validator list against some content.
///
/// Validity is derived from the recorded violations and cannot be set
/// independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    violations: Vec<Violation>,
}

impl ValidationResult {
    /// Creates a result from violations in validator order.
    #[must_use]
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns true when no blocking violation was recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.has_blocking_violations()
    }

    /// Returns true when at least one blocking violation was recorded.
    #[must_use]
    pub fn has_blocking_violations(&self) -> bool {
        self.violations.iter().any(Violation::is_blocking)
    }

    /// Returns every violation, blocking or not, in validator order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns the blocking violations.
    pub fn blocking(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_blocking())
    }

    /// Returns the violation messages in order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.violations.iter().map(Violation::message).collect()
    }

    /// Consumes the result, returning its violations.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationResult", 3)?;
        state.serialize_field("is_valid", &self.is_valid())?;
        state.serialize_field("violations", &self.violations)?;
        state.serialize_field("has_blocking_violations", &self.has_blocking_violations())?;
        state.end()
    }
}

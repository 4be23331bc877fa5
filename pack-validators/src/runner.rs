//! Validator dispatch and aggregation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use pack_primitives::{Validator, ValidatorKind};
use tracing::{debug, warn};

use crate::checks::{self, ContentCheck};
use crate::result::{ValidationResult, Violation};

/// Runs validators against content using a table of checks keyed by kind.
///
/// The runner holds no per-call state and can be shared across threads.
#[derive(Clone)]
pub struct ValidatorRunner {
    checks: BTreeMap<ValidatorKind, Arc<dyn ContentCheck>>,
}

impl Default for ValidatorRunner {
    fn default() -> Self {
        Self::empty()
            .with_check(ValidatorKind::BannedWords, checks::banned_words)
            .with_check(ValidatorKind::MaxLength, checks::max_length)
            .with_check(ValidatorKind::MinLength, checks::min_length)
            .with_check(ValidatorKind::RegexMatch, checks::regex_match)
            .with_check(ValidatorKind::JsonSchema, checks::json_schema)
    }
}

impl fmt::Debug for ValidatorRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRunner")
            .field("kinds", &self.checks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ValidatorRunner {
    /// Creates a runner with no checks registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            checks: BTreeMap::new(),
        }
    }

    /// Registers `check` for `kind`, replacing any previous registration.
    pub fn register<C>(&mut self, kind: ValidatorKind, check: C)
    where
        C: ContentCheck + 'static,
    {
        self.checks.insert(kind, Arc::new(check));
    }

    /// Builder form of [`ValidatorRunner::register`].
    #[must_use]
    pub fn with_check<C>(mut self, kind: ValidatorKind, check: C) -> Self
    where
        C: ContentCheck + 'static,
    {
        self.register(kind, check);
        self
    }

    /// Returns true when a check is registered for `kind`.
    #[must_use]
    pub fn handles(&self, kind: ValidatorKind) -> bool {
        self.checks.contains_key(&kind)
    }

    /// Runs the enabled validators in order and aggregates their violations.
    ///
    /// Disabled validators are skipped entirely. A validator whose kind has no
    /// registered check is skipped with a warning.
    #[must_use]
    pub fn run(&self, content: &str, validators: &[Validator]) -> ValidationResult {
        let mut violations = Vec::new();
        for validator in validators.iter().filter(|v| v.is_enabled()) {
            let kind = validator.kind();
            let Some(check) = self.checks.get(&kind) else {
                warn!(validator = %kind, "no check registered for validator kind; skipping");
                continue;
            };
            if let Some(message) = check.check(content, validator.params()) {
                violations.push(Violation::new(kind, message, validator.fails_on_violation()));
            }
        }

        let result = ValidationResult::new(violations);
        debug!(
            validators = validators.len(),
            violations = result.violations().len(),
            valid = result.is_valid(),
            "validated content"
        );
        result
    }

    /// Async form of [`ValidatorRunner::run`] with identical semantics.
    #[allow(clippy::unused_async)]
    pub async fn run_async(&self, content: &str, validators: &[Validator]) -> ValidationResult {
        self.run(content, validators)
    }
}

/// Runs `validators` against `content` with the default checks.
#[must_use]
pub fn run(content: &str, validators: &[Validator]) -> ValidationResult {
    ValidatorRunner::default().run(content, validators)
}

/// Async form of [`run`].
#[allow(clippy::unused_async)]
pub async fn run_async(content: &str, validators: &[Validator]) -> ValidationResult {
    run(content, validators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pack_primitives::ValidatorParams;

    #[test]
    fn blocking_and_non_blocking_violations() {
        let validators = [
            Validator::banned_words(["bad"]).blocking(true),
            Validator::max_length(10).blocking(false),
        ];
        let result = run("This is bad but short", &validators);

        assert!(!result.is_valid());
        assert!(result.has_blocking_violations());
        assert_eq!(
            result.messages(),
            vec![
                r#"Content contains banned words: ["bad"]"#,
                "Content exceeds max length: 21 > 10",
            ]
        );
        assert!(result.violations()[0].is_blocking());
        assert!(!result.violations()[1].is_blocking());
    }

    #[test]
    fn required_pattern() {
        let validators = [Validator::regex_match("^[A-Z]", true).unwrap().blocking(true)];

        let result = run("ok", &validators);
        assert_eq!(result.violations().len(), 1);
        assert!(!result.is_valid());

        let result = run("Ok", &validators);
        assert!(result.violations().is_empty());
        assert!(result.is_valid());
    }

    #[test]
    fn disabled_validators_contribute_nothing() {
        let validators = [Validator::max_length(1).blocking(true).enabled(false)];
        let result = run("far too long", &validators);
        assert!(result.violations().is_empty());
        assert!(result.is_valid());
    }

    #[test]
    fn non_blocking_only_stays_valid() {
        let validators = [Validator::min_length(100)];
        let result = run("short", &validators);
        assert_eq!(result.violations().len(), 1);
        assert!(result.is_valid());
    }

    #[test]
    fn custom_checks_replace_defaults() {
        let runner = ValidatorRunner::default().with_check(
            ValidatorKind::MaxLength,
            |content: &str, params: &ValidatorParams| match params {
                ValidatorParams::MaxLength { max_characters } if content.len() > *max_characters => {
                    Some(format!("bytes over {max_characters}"))
                }
                _ => None,
            },
        );
        let result = runner.run("äö", &[Validator::max_length(3)]);
        assert_eq!(result.messages(), vec!["bytes over 3"]);
    }

    #[test]
    fn unregistered_kinds_are_skipped() {
        let runner = ValidatorRunner::empty();
        assert!(!runner.handles(ValidatorKind::BannedWords));
        let result = runner.run("bad", &[Validator::banned_words(["bad"]).blocking(true)]);
        assert!(result.is_valid());
    }

    #[tokio::test]
    async fn async_run_matches_sync() {
        let validators = [Validator::banned_words(["bad"]).blocking(true)];
        assert_eq!(run_async("bad", &validators).await, run("bad", &validators));
    }
}

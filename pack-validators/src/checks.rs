//! Content checks for the shipped validator kinds.

use pack_primitives::ValidatorParams;

/// A content check for one validator kind.
///
/// Returns the violation message, or `None` when the content passes. Checks
/// receive params of any kind and ignore the ones they do not handle.
pub trait ContentCheck: Send + Sync {
    /// Checks `content` against `params`.
    fn check(&self, content: &str, params: &ValidatorParams) -> Option<String>;
}

impl<F> ContentCheck for F
where
    F: Fn(&str, &ValidatorParams) -> Option<String> + Send + Sync,
{
    fn check(&self, content: &str, params: &ValidatorParams) -> Option<String> {
        self(content, params)
    }
}

/// Case-sensitive substring check listing every banned word found.
#[must_use]
pub fn banned_words(content: &str, params: &ValidatorParams) -> Option<String> {
    let ValidatorParams::BannedWords { words } = params else {
        return None;
    };
    let found: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .filter(|word| !word.is_empty() && content.contains(word))
        .collect();
    (!found.is_empty()).then(|| format!("Content contains banned words: {found:?}"))
}

/// Fails when the character count exceeds `max_characters`.
#[must_use]
pub fn max_length(content: &str, params: &ValidatorParams) -> Option<String> {
    let ValidatorParams::MaxLength { max_characters } = params else {
        return None;
    };
    let length = content.chars().count();
    (length > *max_characters)
        .then(|| format!("Content exceeds max length: {length} > {max_characters}"))
}

/// Fails when the character count is below `min_characters`.
#[must_use]
pub fn min_length(content: &str, params: &ValidatorParams) -> Option<String> {
    let ValidatorParams::MinLength { min_characters } = params else {
        return None;
    };
    let length = content.chars().count();
    (length < *min_characters)
        .then(|| format!("Content below min length: {length} < {min_characters}"))
}

/// Requires or forbids a pattern match anywhere in the content.
#[must_use]
pub fn regex_match(content: &str, params: &ValidatorParams) -> Option<String> {
    let ValidatorParams::RegexMatch { pattern, must_match } = params else {
        return None;
    };
    match (pattern.is_match(content), *must_match) {
        (false, true) => Some(format!(
            "Content does not match required pattern: {}",
            pattern.as_str()
        )),
        (true, false) => Some(format!("Content matches forbidden pattern: {}", pattern.as_str())),
        _ => None,
    }
}

/// Requires the content to be a JSON document satisfying the schema.
#[must_use]
pub fn json_schema(content: &str, params: &ValidatorParams) -> Option<String> {
    let ValidatorParams::JsonSchema { schema } = params else {
        return None;
    };
    let instance: serde_json::Value = match serde_json::from_str(content) {
        Ok(instance) => instance,
        Err(err) => return Some(format!("Content is not valid JSON: {err}")),
    };
    let violations = schema.violations(&instance);
    (!violations.is_empty()).then(|| {
        format!(
            "Content does not satisfy JSON schema: {}",
            violations.join("; ")
        )
    })
}

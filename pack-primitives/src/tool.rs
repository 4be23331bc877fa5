//! Tool definitions and per-prompt tool policy.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

/// A tool declared by a pack, following the function-calling shape.
///
/// `parameters` is a JSON-Schema object passed through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    name: String,
    description: String,
    parameters: Map<String, JsonValue>,
}

impl ToolDefinition {
    /// Creates a tool definition with an empty object schema.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: empty_object_schema(),
        }
    }

    /// Replaces the parameter schema.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Map<String, JsonValue>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description shown to the model.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the JSON-Schema parameter object.
    #[must_use]
    pub fn parameters(&self) -> &Map<String, JsonValue> {
        &self.parameters
    }

    /// Returns the names listed under the schema's `required` key.
    #[must_use]
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(JsonValue::as_array)
            .map(|names| names.iter().filter_map(JsonValue::as_str).collect())
            .unwrap_or_default()
    }
}

/// Returns `{"type": "object", "properties": {}}`.
#[must_use]
pub fn empty_object_schema() -> Map<String, JsonValue> {
    let mut schema = Map::new();
    schema.insert("type".to_owned(), json!("object"));
    schema.insert("properties".to_owned(), json!({}));
    schema
}

/// How the model is asked to use tools.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model decides.
    #[default]
    Auto,
    /// The model must call a tool.
    Required,
    /// Tools are advertised but must not be called.
    None,
}

impl ToolChoice {
    /// Parses the document spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "auto" => Some(Self::Auto),
            "required" => Some(Self::Required),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Returns the document spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Required => "required",
            Self::None => "none",
        }
    }
}

/// Default number of tool interaction rounds.
pub const DEFAULT_MAX_ROUNDS: u32 = 5;
/// Default number of tool calls the model may issue per turn.
pub const DEFAULT_MAX_TOOL_CALLS_PER_TURN: u32 = 10;

/// Per-prompt governance for tool usage.
///
/// `tool_choice`, `max_rounds` and `max_tool_calls_per_turn` are opaque
/// metadata for the host; only `blocklist` affects tool selection.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ToolPolicy {
    tool_choice: ToolChoice,
    max_rounds: u32,
    max_tool_calls_per_turn: u32,
    blocklist: BTreeSet<String>,
}

impl Default for ToolPolicy {
    fn default() -> Self {
        Self {
            tool_choice: ToolChoice::Auto,
            max_rounds: DEFAULT_MAX_ROUNDS,
            max_tool_calls_per_turn: DEFAULT_MAX_TOOL_CALLS_PER_TURN,
            blocklist: BTreeSet::new(),
        }
    }
}

impl ToolPolicy {
    /// Sets the tool choice mode.
    #[must_use]
    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = tool_choice;
        self
    }

    /// Sets the maximum number of rounds; zero is raised to one.
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    /// Sets the maximum number of tool calls per turn; zero is raised to one.
    #[must_use]
    pub fn with_max_tool_calls_per_turn(mut self, max_calls: u32) -> Self {
        self.max_tool_calls_per_turn = max_calls.max(1);
        self
    }

    /// Adds tool names that must never be exposed.
    #[must_use]
    pub fn with_blocklist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocklist.extend(names.into_iter().map(Into::into));
        self
    }

    /// Returns the tool choice mode.
    #[must_use]
    pub fn tool_choice(&self) -> ToolChoice {
        self.tool_choice
    }

    /// Returns the maximum number of tool rounds.
    #[must_use]
    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Returns the maximum number of tool calls per turn.
    #[must_use]
    pub fn max_tool_calls_per_turn(&self) -> u32 {
        self.max_tool_calls_per_turn
    }

    /// Returns the blocked tool names.
    #[must_use]
    pub fn blocklist(&self) -> &BTreeSet<String> {
        &self.blocklist
    }

    /// Returns true when the named tool is blocked.
    #[must_use]
    pub fn is_blocked(&self, name: &str) -> bool {
        self.blocklist.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_document_defaults() {
        let policy = ToolPolicy::default();
        assert_eq!(policy.tool_choice(), ToolChoice::Auto);
        assert_eq!(policy.max_rounds(), 5);
        assert_eq!(policy.max_tool_calls_per_turn(), 10);
        assert!(policy.blocklist().is_empty());
    }

    #[test]
    fn blocklist_membership() {
        let policy = ToolPolicy::default()
            .with_blocklist(["delete_account"])
            .with_max_rounds(0);
        assert!(policy.is_blocked("delete_account"));
        assert!(!policy.is_blocked("lookup_order"));
        assert_eq!(policy.max_rounds(), 1);
    }

    #[test]
    fn policies_only_come_from_the_builder() {
        let encoded = serde_json::to_value(ToolPolicy::default().with_max_rounds(0)).unwrap();
        assert_eq!(encoded["max_rounds"], json!(1));
        assert_eq!(encoded["tool_choice"], json!("auto"));
    }

    #[test]
    fn required_parameters_are_listed() {
        let tool = ToolDefinition::new("lookup_order", "Find an order").with_parameters(
            json!({
                "type": "object",
                "properties": { "order_id": { "type": "string" } },
                "required": ["order_id"]
            })
            .as_object()
            .cloned()
            .unwrap(),
        );
        assert_eq!(tool.required_parameters(), vec!["order_id"]);
    }
}

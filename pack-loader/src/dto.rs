//! Serde shapes for the plain nodes of a pack document.
//!
//! These carry no invariants; `schema` checks them and converts them into
//! the document model.

use pack_primitives::{Error, FieldPath, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

fn default_true() -> bool {
    true
}

/// Deserializes `node`, reporting failures as validation errors at `path`.
pub(crate) fn decode<T: DeserializeOwned>(node: &JsonValue, path: &FieldPath) -> Result<T> {
    T::deserialize(node).map_err(|err| Error::validation(path, err.to_string()))
}

/// Like [`decode`] for validator entries, whose shape errors are
/// configuration errors.
pub(crate) fn decode_validator(node: &JsonValue, path: &FieldPath) -> Result<ValidatorDto> {
    ValidatorDto::deserialize(node).map_err(|err| Error::configuration(path, err.to_string()))
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateEngineDto {
    pub version: String,
    pub syntax: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToolDto {
    #[serde(default)]
    pub name: Option<String>,
    pub description: String,
    #[serde(default)]
    pub parameters: Option<Map<String, JsonValue>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ToolPolicyDto {
    #[serde(default)]
    pub tool_choice: Option<String>,
    #[serde(default)]
    pub max_rounds: Option<u32>,
    #[serde(default)]
    pub max_tool_calls_per_turn: Option<u32>,
    #[serde(default)]
    pub blocklist: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelOverrideDto {
    #[serde(default)]
    pub system_template: Option<String>,
    #[serde(default)]
    pub system_template_prefix: Option<String>,
    #[serde(default)]
    pub system_template_suffix: Option<String>,
    #[serde(default)]
    pub parameters: Option<Map<String, JsonValue>>,
}

/// Validator envelope; `params` stay raw for the registration table.
#[derive(Debug, Deserialize)]
pub(crate) struct ValidatorDto {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub fail_on_violation: bool,
    #[serde(default)]
    pub params: Option<Map<String, JsonValue>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validator_envelope_defaults() {
        let dto = decode_validator(&json!({ "type": "max_length" }), &FieldPath::root()).unwrap();
        assert_eq!(dto.type_name, "max_length");
        assert!(dto.enabled);
        assert!(!dto.fail_on_violation);
        assert!(dto.params.is_none());
    }

    #[test]
    fn validator_without_type_is_configuration_error() {
        let err = decode_validator(&json!({ "params": {} }), &FieldPath::root()).expect_err("no type");
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn nulls_read_as_absent() {
        let dto: ToolPolicyDto = decode(
            &json!({ "tool_choice": null, "blocklist": null }),
            &FieldPath::root(),
        )
        .unwrap();
        assert!(dto.tool_choice.is_none());
        assert!(dto.blocklist.is_none());
    }

    #[test]
    fn shape_errors_carry_the_node_path() {
        let path = FieldPath::root().key("tools").key("lookup");
        let err = decode::<ToolDto>(&json!({ "description": 7 }), &path).expect_err("bad shape");
        assert_eq!(err.path().map(ToString::to_string).as_deref(), Some("tools.lookup"));
    }
}

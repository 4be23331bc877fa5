//! Prompt definitions.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

use crate::error::{Error, Result};
use crate::path::FieldPath;
use crate::tool::ToolPolicy;
use crate::validator::Validator;
use crate::value::Value;
use crate::variable::Variable;

/// Free-form generation knobs such as `temperature` or `max_tokens`.
pub type Parameters = BTreeMap<String, Value>;

/// Model-specific adjustments to a prompt.
#[derive(Clone, Debug, Default)]
pub struct ModelOverride {
    /// Replaces the base system template entirely.
    pub system_template: Option<String>,
    /// Prepended to the base system template.
    pub system_template_prefix: Option<String>,
    /// Appended to the base system template.
    pub system_template_suffix: Option<String>,
    /// Parameters merged over the prompt's base parameters.
    pub parameters: Parameters,
}

/// A single prompt within a pack.
#[derive(Clone, Debug)]
pub struct Prompt {
    id: String,
    name: String,
    version: String,
    description: Option<String>,
    system_template: Option<String>,
    user_template: Option<String>,
    variables: Vec<Variable>,
    parameters: Parameters,
    validators: Vec<Validator>,
    tools: Vec<String>,
    tool_policy: ToolPolicy,
    model_overrides: BTreeMap<String, ModelOverride>,
}

impl Prompt {
    /// Starts building a prompt.
    #[must_use]
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> PromptBuilder {
        PromptBuilder {
            path: FieldPath::root(),
            prompt: Self {
                id: id.into(),
                name: name.into(),
                version: version.into(),
                description: None,
                system_template: None,
                user_template: None,
                variables: Vec::new(),
                parameters: Parameters::new(),
                validators: Vec::new(),
                tools: Vec::new(),
                tool_policy: ToolPolicy::default(),
                model_overrides: BTreeMap::new(),
            },
        }
    }

    /// Returns the prompt identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the prompt version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the raw system template.
    #[must_use]
    pub fn system_template(&self) -> Option<&str> {
        self.system_template.as_deref()
    }

    /// Returns the system template with the named model's override applied.
    ///
    /// A full replacement wins over prefix/suffix; without an override for
    /// `model` the base template is returned unchanged.
    #[must_use]
    pub fn system_template_for(&self, model: Option<&str>) -> Option<Cow<'_, str>> {
        let base = self.system_template.as_deref();
        let Some(over) = model.and_then(|model| self.model_overrides.get(model)) else {
            return base.map(Cow::Borrowed);
        };

        if let Some(replacement) = &over.system_template {
            return Some(Cow::Borrowed(replacement));
        }

        let base = base?;
        if over.system_template_prefix.is_none() && over.system_template_suffix.is_none() {
            return Some(Cow::Borrowed(base));
        }

        let prefix = over.system_template_prefix.as_deref().unwrap_or_default();
        let suffix = over.system_template_suffix.as_deref().unwrap_or_default();
        Some(Cow::Owned(format!("{prefix}{base}{suffix}")))
    }

    /// Returns the raw user template.
    #[must_use]
    pub fn user_template(&self) -> Option<&str> {
        self.user_template.as_deref()
    }

    /// Returns the declared variables in declaration order.
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Looks up a declared variable by name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|var| var.name() == name)
    }

    /// Returns the names of required variables in declaration order.
    #[must_use]
    pub fn required_inputs(&self) -> Vec<&str> {
        self.variables
            .iter()
            .filter(|var| var.is_required())
            .map(Variable::name)
            .collect()
    }

    /// Returns the base generation parameters.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Returns the base parameters with the named model's overrides merged on top.
    #[must_use]
    pub fn effective_parameters(&self, model: Option<&str>) -> Parameters {
        let mut merged = self.parameters.clone();
        if let Some(over) = model.and_then(|model| self.model_overrides.get(model)) {
            merged.extend(over.parameters.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    /// Returns the output validators in declaration order.
    #[must_use]
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Returns the referenced tool names in declaration order.
    #[must_use]
    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    /// Returns the tool policy.
    #[must_use]
    pub fn tool_policy(&self) -> &ToolPolicy {
        &self.tool_policy
    }

    /// Returns the override registered for `model`.
    #[must_use]
    pub fn model_override(&self, model: &str) -> Option<&ModelOverride> {
        self.model_overrides.get(model)
    }

    /// Returns the names of models with overrides.
    pub fn overridden_models(&self) -> impl Iterator<Item = &str> {
        self.model_overrides.keys().map(String::as_str)
    }
}

/// Builder for [`Prompt`].
#[derive(Debug)]
pub struct PromptBuilder {
    path: FieldPath,
    prompt: Prompt,
}

impl PromptBuilder {
    /// Sets the location reported in errors raised by [`PromptBuilder::build`].
    #[must_use]
    pub fn located_at(mut self, path: FieldPath) -> Self {
        self.path = path;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.prompt.description = Some(description.into());
        self
    }

    /// Sets the system template.
    #[must_use]
    pub fn system_template(mut self, template: impl Into<String>) -> Self {
        self.prompt.system_template = Some(template.into());
        self
    }

    /// Sets the user template.
    #[must_use]
    pub fn user_template(mut self, template: impl Into<String>) -> Self {
        self.prompt.user_template = Some(template.into());
        self
    }

    /// Declares a variable.
    #[must_use]
    pub fn variable(mut self, variable: Variable) -> Self {
        self.prompt.variables.push(variable);
        self
    }

    /// Sets a generation parameter.
    #[must_use]
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.prompt.parameters.insert(key.into(), value.into());
        self
    }

    /// Appends an output validator.
    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.prompt.validators.push(validator);
        self
    }

    /// Appends a tool reference.
    #[must_use]
    pub fn tool(mut self, name: impl Into<String>) -> Self {
        self.prompt.tools.push(name.into());
        self
    }

    /// Sets the tool policy.
    #[must_use]
    pub fn tool_policy(mut self, policy: ToolPolicy) -> Self {
        self.prompt.tool_policy = policy;
        self
    }

    /// Registers a model override.
    #[must_use]
    pub fn model_override(mut self, model: impl Into<String>, over: ModelOverride) -> Self {
        self.prompt.model_overrides.insert(model.into(), over);
        self
    }

    /// Finalises the prompt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when a variable name is declared twice or
    /// a default does not satisfy its variable's declared type.
    pub fn build(self) -> Result<Prompt> {
        let variables_path = self.path.key("variables");
        let mut seen = HashSet::new();
        for variable in &self.prompt.variables {
            let path = variables_path.key(variable.name());
            if !seen.insert(variable.name()) {
                return Err(Error::validation(&path, "variable declared more than once"));
            }
            if let Some(default) = variable.default_value() {
                if !default.is_a(variable.value_type()) {
                    return Err(Error::validation(
                        &path.key("default"),
                        format!(
                            "default must be a {}, found {}",
                            variable.value_type(),
                            default.value_type()
                        ),
                    ));
                }
            }
        }

        Ok(self.prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    fn prompt() -> Prompt {
        Prompt::builder("support", "Support Agent", "1.0.0")
            .system_template("You are a {{role}}.")
            .variable(Variable::new("company", ValueType::String).required())
            .variable(Variable::new("tone", ValueType::String).with_default("friendly"))
            .variable(Variable::new("region", ValueType::String).required())
            .parameter("temperature", Value::try_from(0.7).unwrap())
            .model_override(
                "gpt-4",
                ModelOverride {
                    system_template_prefix: Some("[gpt-4] ".into()),
                    parameters: Parameters::from([("temperature".to_owned(), Value::try_from(0.2).unwrap())]),
                    ..ModelOverride::default()
                },
            )
            .model_override(
                "claude",
                ModelOverride {
                    system_template: Some("Replacement".into()),
                    ..ModelOverride::default()
                },
            )
            .build()
            .unwrap()
    }

    #[test]
    fn required_inputs_follow_declaration_order() {
        assert_eq!(prompt().required_inputs(), vec!["company", "region"]);
    }

    #[test]
    fn overrides_adjust_system_template() {
        let prompt = prompt();
        assert_eq!(
            prompt.system_template_for(None).as_deref(),
            Some("You are a {{role}}.")
        );
        assert_eq!(
            prompt.system_template_for(Some("gpt-4")).as_deref(),
            Some("[gpt-4] You are a {{role}}.")
        );
        assert_eq!(
            prompt.system_template_for(Some("claude")).as_deref(),
            Some("Replacement")
        );
        assert_eq!(
            prompt.system_template_for(Some("unknown")).as_deref(),
            Some("You are a {{role}}.")
        );
    }

    #[test]
    fn override_parameters_win() {
        let prompt = prompt();
        assert_eq!(
            prompt.effective_parameters(None).get("temperature"),
            Some(&Value::try_from(0.7).unwrap())
        );
        assert_eq!(
            prompt.effective_parameters(Some("gpt-4")).get("temperature"),
            Some(&Value::try_from(0.2).unwrap())
        );
    }

    #[test]
    fn duplicate_variables_are_rejected() {
        let err = Prompt::builder("dup", "Dup", "1.0.0")
            .located_at(FieldPath::root().key("prompts").key("dup"))
            .variable(Variable::new("name", ValueType::String))
            .variable(Variable::new("name", ValueType::Number))
            .build()
            .expect_err("duplicate");
        assert_eq!(
            err.path().map(ToString::to_string).as_deref(),
            Some("prompts.dup.variables.name")
        );
    }

    #[test]
    fn defaults_must_match_declared_type() {
        let err = Prompt::builder("typed", "Typed", "1.0.0")
            .variable(Variable::new("count", ValueType::Number).with_default("three"))
            .build()
            .expect_err("type mismatch");
        assert!(err.to_string().contains("default must be a number, found string"));
    }
}

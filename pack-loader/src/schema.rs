//! Schema validation and coercion from a generic JSON tree into the document model.
//!
//! Unknown keys are ignored at every level. Every error carries the path of
//! the offending field.

use pack_primitives::{
    Error, FieldPath, ModelOverride, Pack, Parameters, Prompt, Result, TemplateEngine,
    ToolChoice, ToolDefinition, ToolPolicy, Validator, Value, ValueType, Variable, VariableRules,
    ident,
};
use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::dto::{self, ModelOverrideDto, TemplateEngineDto, ToolDto, ToolPolicyDto, ValidatorDto};

/// Converts a parsed document tree into a [`Pack`].
///
/// # Errors
///
/// Returns [`Error::Parse`] when the root is not an object, [`Error::Validation`]
/// for schema and type violations, and [`Error::Configuration`] for validator
/// entries that cannot be built.
pub fn pack_from_tree(tree: &JsonValue) -> Result<Pack> {
    let JsonValue::Object(root) = tree else {
        return Err(Error::parse(format!(
            "pack document must be an object, found {}",
            kind_of(tree)
        )));
    };
    let fields = Fields::new(root, FieldPath::root());

    let id = fields.required_str("id")?;
    ident::check_pack_id(id, &fields.child("id"))?;
    let name = fields.required_str("name")?;
    ident::check_display_name(name, &fields.child("name"))?;
    let version = fields.required_str("version")?;
    ident::check_version(version, &fields.child("version"))?;

    let mut builder = Pack::builder(id, name, version);
    if let Some(description) = fields.optional_str("description")? {
        builder = builder.description(description);
    }
    if let Some(node) = fields.present("template_engine") {
        let path = fields.child("template_engine");
        builder = builder.template_engine(template_engine(dto::decode(node, &path)?, &path)?);
    }

    let fragments = fields.optional_object("fragments")?;
    if let Some(fragments) = &fragments {
        for name in fragments.map.keys() {
            let template = fragments.required_str(name)?;
            builder = builder.fragment(name.clone(), template);
        }
    }

    let mut tool_names = Vec::new();
    if let Some(tools) = fields.optional_object("tools")? {
        for (name, node) in tools.map {
            let path = tools.child(name);
            let tool = tool_definition(name, dto::decode(node, &path)?, &path)?;
            tool_names.push(tool.name().to_owned());
            builder = builder.tool(tool);
        }
    }

    let prompts = fields.required_object("prompts")?;
    if prompts.map.is_empty() {
        return Err(Error::validation(
            &prompts.path,
            "pack must declare at least one prompt",
        ));
    }
    for name in prompts.map.keys() {
        let prompt = prompt(&prompts.required_object(name)?, &tool_names)?;
        builder = builder.prompt(name.clone(), prompt);
    }

    let pack = builder.build();
    debug!(
        pack = pack.id(),
        prompts = pack.prompts().len(),
        tools = pack.tools().len(),
        fragments = pack.fragments().len(),
        "pack parsed"
    );
    Ok(pack)
}

fn template_engine(engine: TemplateEngineDto, path: &FieldPath) -> Result<TemplateEngine> {
    let TemplateEngineDto { version, syntax } = engine;
    let reason = format!("`{syntax}` does not describe placeholder delimiters");
    TemplateEngine::new(version, syntax).ok_or_else(|| Error::validation(&path.key("syntax"), reason))
}

fn tool_definition(key: &str, tool: ToolDto, path: &FieldPath) -> Result<ToolDefinition> {
    ident::check_symbol(key, path)?;
    if let Some(name) = tool.name.as_deref().filter(|name| *name != key) {
        return Err(Error::validation(
            &path.key("name"),
            format!("tool name `{name}` does not match its key `{key}`"),
        ));
    }
    if tool.description.trim().is_empty() {
        return Err(Error::validation(
            &path.key("description"),
            "description cannot be empty",
        ));
    }

    let mut definition = ToolDefinition::new(key, tool.description);
    if let Some(parameters) = tool.parameters {
        if let Some(schema_type) = parameters.get("type").filter(|kind| *kind != "object") {
            return Err(Error::validation(
                &path.key("parameters").key("type"),
                format!("tool parameters must be an object schema, found type {schema_type}"),
            ));
        }
        definition = definition.with_parameters(parameters);
    }
    Ok(definition)
}

fn prompt(fields: &Fields<'_>, tool_names: &[String]) -> Result<Prompt> {
    let id = fields.required_str("id")?;
    ident::check_prompt_id(id, &fields.child("id"))?;
    let name = fields.required_str("name")?;
    if name.trim().is_empty() {
        return Err(Error::validation(&fields.child("name"), "name cannot be empty"));
    }
    let version = fields.required_str("version")?;
    ident::check_version(version, &fields.child("version"))?;

    let mut builder = Prompt::builder(id, name, version).located_at(fields.path.clone());
    if let Some(description) = fields.optional_str("description")? {
        builder = builder.description(description);
    }
    if let Some(template) = fields.optional_str("system_template")? {
        builder = builder.system_template(template);
    }
    if let Some(template) = fields.optional_str("user_template")? {
        builder = builder.user_template(template);
    }

    for variable in variables(fields)? {
        builder = builder.variable(variable);
    }

    if let Some(parameters) = fields.optional_object("parameters")? {
        for (key, value) in generation_parameters(&parameters)? {
            builder = builder.parameter(key, value);
        }
    }

    if let Some(validators) = fields.optional_array("validators")? {
        for (index, entry) in validators.iter().enumerate() {
            let path = fields.child("validators").index(index);
            builder = builder.validator(validator(dto::decode_validator(entry, &path)?, &path)?);
        }
    }

    let tools = fields.optional_string_list("tools")?;
    for tool in &tools {
        if !tool_names.contains(tool) {
            warn!(prompt = id, tool = %tool, "prompt references an undeclared tool; it will be unavailable");
        }
    }
    for tool in tools {
        builder = builder.tool(tool);
    }

    if let Some(node) = fields.present("tool_policy") {
        let path = fields.child("tool_policy");
        builder = builder.tool_policy(tool_policy(dto::decode(node, &path)?, &path, id, tool_names)?);
    }

    if let Some(overrides) = fields.optional_object("model_overrides")? {
        for (model, node) in overrides.map {
            let path = overrides.child(model);
            let over = model_override(dto::decode(node, &path)?, &path)?;
            builder = builder.model_override(model.clone(), over);
        }
    }

    builder.build()
}

fn variables(fields: &Fields<'_>) -> Result<Vec<Variable>> {
    let path = fields.child("variables");
    match fields.map.get("variables") {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let entry = Fields::expect_object(item, path.index(index))?;
                let name = entry.required_str("name")?;
                variable(name, &entry)
            })
            .collect(),
        Some(JsonValue::Object(map)) => {
            let entries = Fields::new(map, path);
            map.keys()
                .map(|name| {
                    let entry = entries.required_object(name)?;
                    if let Some(declared) = entry.optional_str("name")? {
                        if declared != name {
                            return Err(Error::validation(
                                &entry.child("name"),
                                format!("variable name `{declared}` does not match its key `{name}`"),
                            ));
                        }
                    }
                    variable(name, &entry)
                })
                .collect()
        }
        Some(other) => Err(Error::validation(
            &path,
            format!("expected a list or mapping of variables, found {}", kind_of(other)),
        )),
    }
}

fn variable(name: &str, fields: &Fields<'_>) -> Result<Variable> {
    ident::check_symbol(name, &fields.path)?;

    let type_name = fields.required_str("type")?;
    let value_type = ValueType::from_name(type_name).ok_or_else(|| {
        Error::validation(
            &fields.child("type"),
            format!("unknown variable type `{type_name}` (expected string, number, boolean, array, or object)"),
        )
    })?;

    let mut variable = Variable::new(name, value_type);
    if let Some(description) = fields.optional_str("description")? {
        variable = variable.with_description(description);
    }

    let required = fields.optional_bool("required")?.unwrap_or(false);
    let default = fields
        .map
        .get("default")
        .cloned()
        .and_then(Value::from_json);

    match (required, default) {
        (true, Some(_)) => {
            return Err(Error::validation(
                &fields.child("default"),
                "a required variable cannot declare a default",
            ));
        }
        (true, None) => variable = variable.required(),
        (false, Some(default)) => {
            let coerced = coerce_default(default, value_type).ok_or_else(|| {
                Error::validation(
                    &fields.child("default"),
                    format!("default cannot be converted to {value_type}"),
                )
            })?;
            variable = variable.with_default(coerced);
        }
        (false, None) => {}
    }

    if let Some(rules) = fields.optional_object("validation")? {
        variable = variable.with_rules(variable_rules(&rules)?);
    }

    Ok(variable)
}

/// Converts a declared default into its variable's type where the intent is unambiguous.
fn coerce_default(value: Value, target: ValueType) -> Option<Value> {
    if value.is_a(target) {
        return Some(value);
    }

    match (target, value) {
        (ValueType::String, value @ (Value::Number(_) | Value::Bool(_))) => {
            Some(Value::String(value.to_string()))
        }
        (ValueType::Number, Value::String(text)) => {
            let text = text.trim();
            if let Ok(integer) = text.parse::<i64>() {
                Some(Value::from(integer))
            } else {
                text.parse::<f64>()
                    .ok()
                    .and_then(|float| Value::try_from(float).ok())
            }
        }
        (ValueType::Boolean, Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(Value::Bool(true)),
            "false" | "no" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn variable_rules(fields: &Fields<'_>) -> Result<VariableRules> {
    let pattern = match fields.optional_str("pattern")? {
        Some(pattern) => Some(Regex::new(pattern).map_err(|err| {
            Error::validation(&fields.child("pattern"), format!("invalid regex: {err}"))
        })?),
        None => None,
    };

    let min_length = fields.optional_count("min_length")?;
    let max_length = fields.optional_count("max_length")?;
    if let (Some(min), Some(max)) = (min_length, max_length) {
        if min > max {
            return Err(Error::validation(
                &fields.child("min_length"),
                format!("min_length {min} exceeds max_length {max}"),
            ));
        }
    }

    Ok(VariableRules {
        pattern,
        min_length,
        max_length,
        minimum: fields.optional_number("minimum")?,
        maximum: fields.optional_number("maximum")?,
        allowed: fields.optional_array("enum")?.cloned(),
    })
}

/// Inclusive ranges for well-known generation parameters.
const PARAMETER_RANGES: &[(&str, f64, Option<f64>)] = &[
    ("temperature", 0.0, Some(2.0)),
    ("top_p", 0.0, Some(1.0)),
    ("max_tokens", 1.0, None),
    ("top_k", 1.0, None),
    ("frequency_penalty", -2.0, Some(2.0)),
    ("presence_penalty", -2.0, Some(2.0)),
];

fn generation_parameters(fields: &Fields<'_>) -> Result<Parameters> {
    let mut parameters = Parameters::new();
    for (key, raw) in fields.map {
        let path = fields.child(key);
        let value = match raw {
            JsonValue::Null => continue,
            JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_) => {
                Value::from_json(raw.clone())
            }
            other => {
                return Err(Error::validation(
                    &path,
                    format!("parameters must be scalars, found {}", kind_of(other)),
                ));
            }
        };
        let Some(value) = value else { continue };

        if let Some((_, min, max)) = PARAMETER_RANGES
            .iter()
            .find(|(name, ..)| *name == key.as_str())
        {
            let number = value.as_f64().ok_or_else(|| {
                Error::validation(&path, format!("`{key}` must be a number"))
            })?;
            if number < *min || max.is_some_and(|max| number > max) {
                let bound = match max {
                    Some(max) => format!("within [{min}, {max}]"),
                    None => format!(">= {min}"),
                };
                return Err(Error::validation(
                    &path,
                    format!("`{key}` must be {bound}, found {number}"),
                ));
            }
        }

        parameters.insert(key.clone(), value);
    }
    Ok(parameters)
}

fn validator(entry: ValidatorDto, path: &FieldPath) -> Result<Validator> {
    let params = entry.params.unwrap_or_default();
    Validator::from_config(
        &entry.type_name,
        entry.enabled,
        entry.fail_on_violation,
        &params,
        path,
    )
}

fn tool_policy(
    policy: ToolPolicyDto,
    path: &FieldPath,
    prompt_id: &str,
    tool_names: &[String],
) -> Result<ToolPolicy> {
    let mut resolved = ToolPolicy::default();

    if let Some(choice) = policy.tool_choice {
        let choice = ToolChoice::from_name(&choice).ok_or_else(|| {
            Error::validation(
                &path.key("tool_choice"),
                format!("unknown tool_choice `{choice}` (expected auto, required, or none)"),
            )
        })?;
        resolved = resolved.with_tool_choice(choice);
    }
    if let Some(rounds) = policy.max_rounds {
        resolved = resolved.with_max_rounds(positive(rounds, &path.key("max_rounds"))?);
    }
    if let Some(calls) = policy.max_tool_calls_per_turn {
        resolved = resolved
            .with_max_tool_calls_per_turn(positive(calls, &path.key("max_tool_calls_per_turn"))?);
    }

    let blocklist = policy.blocklist.unwrap_or_default();
    for name in &blocklist {
        if !tool_names.contains(name) {
            warn!(prompt = prompt_id, tool = %name, "blocklist names an undeclared tool");
        }
    }
    Ok(resolved.with_blocklist(blocklist))
}

fn positive(count: u32, path: &FieldPath) -> Result<u32> {
    if count == 0 {
        Err(Error::validation(path, "expected a positive integer, found 0"))
    } else {
        Ok(count)
    }
}

fn model_override(over: ModelOverrideDto, path: &FieldPath) -> Result<ModelOverride> {
    let parameters = match &over.parameters {
        Some(parameters) => generation_parameters(&Fields::new(parameters, path.key("parameters")))?,
        None => Parameters::new(),
    };

    Ok(ModelOverride {
        system_template: over.system_template,
        system_template_prefix: over.system_template_prefix,
        system_template_suffix: over.system_template_suffix,
        parameters,
    })
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Typed accessors over an object node that report failures with field paths.
struct Fields<'a> {
    map: &'a Map<String, JsonValue>,
    path: FieldPath,
}

impl<'a> Fields<'a> {
    fn new(map: &'a Map<String, JsonValue>, path: FieldPath) -> Self {
        Self { map, path }
    }

    fn expect_object(value: &'a JsonValue, path: FieldPath) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Ok(Self::new(map, path)),
            other => Err(Error::validation(
                &path,
                format!("expected an object, found {}", kind_of(other)),
            )),
        }
    }

    fn child(&self, key: &str) -> FieldPath {
        self.path.key(key)
    }

    /// Absent and `null` are treated alike.
    fn present(&self, key: &str) -> Option<&'a JsonValue> {
        self.map.get(key).filter(|value| !value.is_null())
    }

    fn required(&self, key: &str) -> Result<&'a JsonValue> {
        self.present(key)
            .ok_or_else(|| Error::validation(&self.child(key), "field is required"))
    }

    fn required_str(&self, key: &str) -> Result<&'a str> {
        match self.required(key)? {
            JsonValue::String(text) => Ok(text),
            other => Err(self.type_error(key, "a string", other)),
        }
    }

    fn optional_str(&self, key: &str) -> Result<Option<&'a str>> {
        match self.present(key) {
            None => Ok(None),
            Some(JsonValue::String(text)) => Ok(Some(text)),
            Some(other) => Err(self.type_error(key, "a string", other)),
        }
    }

    fn optional_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.present(key) {
            None => Ok(None),
            Some(JsonValue::Bool(flag)) => Ok(Some(*flag)),
            Some(other) => Err(self.type_error(key, "a boolean", other)),
        }
    }

    fn optional_number(&self, key: &str) -> Result<Option<f64>> {
        match self.present(key) {
            None => Ok(None),
            Some(JsonValue::Number(number)) => Ok(number.as_f64()),
            Some(other) => Err(self.type_error(key, "a number", other)),
        }
    }

    fn optional_count(&self, key: &str) -> Result<Option<usize>> {
        match self.present(key) {
            None => Ok(None),
            Some(JsonValue::Number(number)) => number
                .as_u64()
                .and_then(|count| usize::try_from(count).ok())
                .map(Some)
                .ok_or_else(|| {
                    Error::validation(
                        &self.child(key),
                        format!("expected a non-negative integer, found {number}"),
                    )
                }),
            Some(other) => Err(self.type_error(key, "a non-negative integer", other)),
        }
    }

    fn optional_array(&self, key: &str) -> Result<Option<&'a Vec<JsonValue>>> {
        match self.present(key) {
            None => Ok(None),
            Some(JsonValue::Array(items)) => Ok(Some(items)),
            Some(other) => Err(self.type_error(key, "an array", other)),
        }
    }

    fn optional_string_list(&self, key: &str) -> Result<Vec<String>> {
        let Some(items) = self.optional_array(key)? else {
            return Ok(Vec::new());
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                JsonValue::String(text) => Ok(text.clone()),
                other => Err(Error::validation(
                    &self.child(key).index(index),
                    format!("expected a string, found {}", kind_of(other)),
                )),
            })
            .collect()
    }

    fn required_object(&self, key: &str) -> Result<Fields<'a>> {
        Self::expect_object(self.required(key)?, self.child(key))
    }

    fn optional_object(&self, key: &str) -> Result<Option<Fields<'a>>> {
        self.present(key)
            .map(|value| Self::expect_object(value, self.child(key)))
            .transpose()
    }

    fn type_error(&self, key: &str, expected: &str, found: &JsonValue) -> Error {
        Error::validation(
            &self.child(key),
            format!("expected {expected}, found {}", kind_of(found)),
        )
    }
}

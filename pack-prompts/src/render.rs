//! Prompt rendering.

use std::collections::BTreeMap;

use pack_primitives::{Delimiters, Pack, Prompt};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{RenderError, RenderResult};
use crate::fragments::{FragmentResolver, resolve};
use crate::inputs::{Inputs, IssueKind, check_inputs};
use crate::template::{Segment, scan};

/// How unresolved references are treated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Undefined fragments and unknown placeholders are left in the output.
    #[default]
    Lenient,
    /// Undefined fragments and unknown placeholders are errors.
    Strict,
}

/// Settings for a [`Renderer`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Treatment of unresolved references.
    pub strictness: Strictness,
    /// Model whose override, if any, adjusts the system template.
    pub model: Option<String>,
}

impl RenderOptions {
    /// Switches to strict rendering.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strictness = Strictness::Strict;
        self
    }

    /// Selects a model override.
    #[must_use]
    pub fn for_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Author of a chat message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user turn.
    User,
}

/// A single rendered chat message.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message author.
    pub role: Role,
    /// Message content.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Renders the prompts of one pack.
///
/// Rendering never mutates the pack, so one renderer can serve concurrent
/// callers.
///
/// # Examples
///
/// ```
/// use pack_primitives::{Pack, Prompt, Value, ValueType, Variable};
/// use pack_prompts::{Inputs, Renderer};
///
/// let prompt = Prompt::builder("greeter", "Greeter", "1.0.0")
///     .system_template("Hello {{name}}! {{fragment:sign_off}}")
///     .variable(Variable::new("name", ValueType::String).required())
///     .build()
///     .unwrap();
/// let pack = Pack::builder("demo", "Demo", "1.0.0")
///     .prompt("greeter", prompt)
///     .fragment("sign_off", "Bye.")
///     .build();
///
/// let inputs = Inputs::from([("name".to_owned(), Value::from("Ada"))]);
/// let text = Renderer::new(&pack).render("greeter", &inputs).unwrap();
/// assert_eq!(text, "Hello Ada! Bye.");
/// ```
#[derive(Clone, Debug)]
pub struct Renderer<'p> {
    pack: &'p Pack,
    options: RenderOptions,
}

impl<'p> Renderer<'p> {
    /// Creates a lenient renderer without model override.
    #[must_use]
    pub fn new(pack: &'p Pack) -> Self {
        Self {
            pack,
            options: RenderOptions::default(),
        }
    }

    /// Replaces the render options.
    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the active options.
    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders the named prompt to a single string.
    ///
    /// The system template is used when present, otherwise the user template.
    ///
    /// # Errors
    ///
    /// See [`Renderer::render_prompt`]; additionally returns
    /// [`RenderError::UnknownPrompt`] when the pack has no such prompt.
    pub fn render(&self, prompt_name: &str, inputs: &Inputs) -> RenderResult<String> {
        self.render_prompt(self.prompt(prompt_name)?, inputs)
    }

    /// Renders `prompt` to a single string.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingVariable`] or
    /// [`RenderError::InvalidVariable`] when the inputs fail validation,
    /// [`RenderError::Cycle`] for recursive fragments, and, in strict mode,
    /// the undefined-reference errors.
    pub fn render_prompt(&self, prompt: &Prompt, inputs: &Inputs) -> RenderResult<String> {
        let values = self.prepare(prompt, inputs)?;
        let model = self.options.model.as_deref();
        let template = prompt
            .system_template_for(model)
            .or_else(|| prompt.user_template().map(Into::into))
            .unwrap_or_default();

        let rendered = self.fill(&template, &values)?;
        debug!(prompt = prompt.id(), bytes = rendered.len(), "rendered prompt");
        Ok(rendered)
    }

    /// Renders the named prompt as chat messages: a system message for the
    /// system template and a user message for the user template, each only
    /// when the template exists.
    ///
    /// # Errors
    ///
    /// Same as [`Renderer::render`].
    pub fn render_messages(&self, prompt_name: &str, inputs: &Inputs) -> RenderResult<Vec<ChatMessage>> {
        let prompt = self.prompt(prompt_name)?;
        let values = self.prepare(prompt, inputs)?;
        let model = self.options.model.as_deref();

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = prompt.system_template_for(model) {
            messages.push(ChatMessage::system(self.fill(&system, &values)?));
        }
        if let Some(user) = prompt.user_template() {
            messages.push(ChatMessage::user(self.fill(user, &values)?));
        }
        debug!(prompt = prompt.id(), messages = messages.len(), "rendered chat messages");
        Ok(messages)
    }

    /// Renders free-standing template text against the pack's fragments.
    ///
    /// No variable declarations apply: every supplied input is substituted
    /// and every other placeholder is treated as undefined.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Cycle`] for recursive fragments and, in strict
    /// mode, the undefined-reference errors.
    pub fn render_template(&self, template: &str, inputs: &Inputs) -> RenderResult<String> {
        let values = inputs
            .iter()
            .map(|(name, value)| (name.as_str(), value.to_string()))
            .collect();
        self.fill(template, &values)
    }

    /// Async form of [`Renderer::render`] with identical semantics.
    ///
    /// # Errors
    ///
    /// Same as [`Renderer::render`].
    #[allow(clippy::unused_async)]
    pub async fn render_async(&self, prompt_name: &str, inputs: &Inputs) -> RenderResult<String> {
        self.render(prompt_name, inputs)
    }

    fn prompt(&self, name: &str) -> RenderResult<&'p Prompt> {
        self.pack.prompt(name).ok_or_else(|| RenderError::UnknownPrompt {
            name: name.to_owned(),
        })
    }

    // Validated substitution values. A prompt with declarations substitutes
    // only those (input, default, or empty); one without takes every input.
    fn prepare<'a>(&self, prompt: &'a Prompt, inputs: &'a Inputs) -> RenderResult<BTreeMap<&'a str, String>> {
        if let Some(issue) = check_inputs(prompt.variables(), inputs).into_iter().next() {
            let name = issue.name().to_owned();
            return Err(match issue.kind() {
                IssueKind::Missing => RenderError::MissingVariable { name },
                IssueKind::WrongType { .. } | IssueKind::Rule(_) => RenderError::InvalidVariable {
                    reason: issue.reason(),
                    name,
                },
            });
        }

        if prompt.variables().is_empty() {
            return Ok(inputs
                .iter()
                .map(|(name, value)| (name.as_str(), value.to_string()))
                .collect());
        }

        Ok(prompt
            .variables()
            .iter()
            .map(|variable| {
                let text = inputs
                    .get(variable.name())
                    .or_else(|| variable.default_value())
                    .map(ToString::to_string)
                    .unwrap_or_default();
                (variable.name(), text)
            })
            .collect())
    }

    fn fill(&self, template: &str, values: &BTreeMap<&str, String>) -> RenderResult<String> {
        let expanded = FragmentResolver::for_pack(self.pack).resolve(template)?;
        substitute(
            &expanded,
            self.pack.template_engine().delimiters(),
            values,
            self.options.strictness,
        )
    }
}

// Single left-to-right pass; substituted values are never scanned again.
fn substitute(
    expanded: &str,
    delimiters: &Delimiters,
    values: &BTreeMap<&str, String>,
    strictness: Strictness,
) -> RenderResult<String> {
    let strict = strictness == Strictness::Strict;
    let mut out = String::with_capacity(expanded.len());
    for segment in scan(expanded, delimiters) {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Variable { name, raw } => match values.get(name) {
                Some(value) => out.push_str(value),
                None if strict => {
                    return Err(RenderError::UndefinedPlaceholder {
                        name: name.to_owned(),
                    });
                }
                None => {
                    trace!(placeholder = name, "leaving unknown placeholder in place");
                    out.push_str(raw);
                }
            },
            // Anything still marked as a fragment after expansion is undefined.
            Segment::Fragment { name, .. } if strict => {
                return Err(RenderError::UndefinedFragment {
                    name: name.to_owned(),
                });
            }
            Segment::Fragment { raw, .. } => out.push_str(raw),
        }
    }
    Ok(out)
}

/// Expands fragments and substitutes `inputs` into `template` with the
/// default delimiters and lenient handling.
///
/// # Errors
///
/// Returns [`RenderError::Cycle`] for recursive fragments.
pub fn render_text(
    template: &str,
    fragments: &BTreeMap<String, String>,
    inputs: &Inputs,
) -> RenderResult<String> {
    let expanded = resolve(template, fragments)?;
    let values = inputs
        .iter()
        .map(|(name, value)| (name.as_str(), value.to_string()))
        .collect();
    substitute(&expanded, &Delimiters::default(), &values, Strictness::Lenient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pack_primitives::{ModelOverride, Value, ValueType, Variable};

    fn pack() -> Pack {
        let support = Prompt::builder("support", "Support", "1.0.0")
            .system_template("You are a {{role}}.\n\n{{fragment:guidelines}}")
            .user_template("{{question}}")
            .variable(Variable::new("role", ValueType::String).required())
            .variable(Variable::new("question", ValueType::String).with_default("Hi"))
            .model_override(
                "gpt-4",
                ModelOverride {
                    system_template_suffix: Some(" (gpt-4)".into()),
                    ..ModelOverride::default()
                },
            )
            .build()
            .unwrap();
        let company = Prompt::builder("company", "Company", "1.0.0")
            .system_template("Welcome to {{company}}.")
            .variable(Variable::new("company", ValueType::String).required())
            .build()
            .unwrap();
        let loose = Prompt::builder("loose", "Loose", "1.0.0")
            .user_template("{{declared}}|{{free}}|{{fragment:nowhere}}")
            .variable(Variable::new("declared", ValueType::String))
            .build()
            .unwrap();
        let open = Prompt::builder("open", "Open", "1.0.0")
            .system_template("About {{topic}} {{rest}}")
            .build()
            .unwrap();
        let stats = Prompt::builder("stats", "Stats", "1.0.0")
            .system_template("{{count}} {{ratio}} {{flag}} {{items}}")
            .variable(Variable::new("count", ValueType::Number))
            .variable(Variable::new("ratio", ValueType::Number))
            .variable(Variable::new("flag", ValueType::Boolean))
            .variable(Variable::new("items", ValueType::Array))
            .build()
            .unwrap();

        Pack::builder("demo", "Demo", "1.0.0")
            .prompt("support", support)
            .prompt("company", company)
            .prompt("loose", loose)
            .prompt("open", open)
            .prompt("stats", stats)
            .fragment("guidelines", "Be helpful.")
            .build()
    }

    fn inputs(pairs: &[(&str, Value)]) -> Inputs {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone()))
            .collect()
    }

    #[test]
    fn renders_guidelines_scenario() {
        let pack = pack();
        let text = Renderer::new(&pack)
            .render("support", &inputs(&[("role", Value::from("support agent"))]))
            .unwrap();
        assert_eq!(text, "You are a support agent.\n\nBe helpful.");
    }

    #[test]
    fn missing_required_variable_is_named() {
        let pack = pack();
        let err = Renderer::new(&pack)
            .render("company", &Inputs::new())
            .expect_err("missing");
        assert!(matches!(&err, RenderError::MissingVariable { name } if name == "company"));
        assert!(err.to_string().contains("company"));
    }

    #[test]
    fn wrong_type_is_invalid_variable() {
        let pack = pack();
        let err = Renderer::new(&pack)
            .render("company", &inputs(&[("company", Value::from(7))]))
            .expect_err("wrong type");
        assert!(matches!(err, RenderError::InvalidVariable { .. }));
    }

    #[test]
    fn values_are_not_rescanned() {
        let pack = pack();
        let text = Renderer::new(&pack)
            .render("company", &inputs(&[("company", Value::from("{{fragment:guidelines}} {{company}}"))]))
            .unwrap();
        assert_eq!(text, "Welcome to {{fragment:guidelines}} {{company}}.");
    }

    #[test]
    fn lenient_mode_keeps_unknown_references() {
        let pack = pack();
        let text = Renderer::new(&pack).render("loose", &Inputs::new()).unwrap();
        assert_eq!(text, "|{{free}}|{{fragment:nowhere}}");
    }

    #[test]
    fn undeclared_placeholders_ignore_supplied_inputs() {
        let pack = pack();
        let text = Renderer::new(&pack)
            .render(
                "loose",
                &inputs(&[("declared", Value::from("Ada")), ("free", Value::from("injected"))]),
            )
            .unwrap();
        assert_eq!(text, "Ada|{{free}}|{{fragment:nowhere}}");
    }

    #[test]
    fn undeclared_prompts_take_every_input() {
        let pack = pack();
        let text = Renderer::new(&pack)
            .render("open", &inputs(&[("topic", Value::from("billing"))]))
            .unwrap();
        assert_eq!(text, "About billing {{rest}}");
    }

    #[test]
    fn strict_mode_rejects_unknown_references() {
        let pack = pack();
        let strict = Renderer::new(&pack).with_options(RenderOptions::default().strict());

        let err = strict.render("loose", &Inputs::new()).expect_err("placeholder");
        assert!(matches!(&err, RenderError::UndefinedPlaceholder { name } if name == "free"));

        let err = strict
            .render_template("{{fragment:nowhere}}", &Inputs::new())
            .expect_err("fragment");
        assert!(matches!(&err, RenderError::UndefinedFragment { name } if name == "nowhere"));
    }

    #[test]
    fn canonical_scalar_formatting() {
        let pack = pack();
        let text = Renderer::new(&pack)
            .render(
                "stats",
                &inputs(&[
                    ("count", Value::from(3)),
                    ("ratio", Value::try_from(2.50).unwrap()),
                    ("flag", Value::from(true)),
                    ("items", Value::from(vec![serde_json::json!(1), serde_json::json!("a")])),
                ]),
            )
            .unwrap();
        assert_eq!(text, "3 2.5 true [1,\"a\"]");
    }

    #[test]
    fn chat_messages_split_templates() {
        let pack = pack();
        let messages = Renderer::new(&pack)
            .render_messages("support", &inputs(&[("role", Value::from("guide"))]))
            .unwrap();
        assert_eq!(
            messages,
            vec![
                ChatMessage::system("You are a guide.\n\nBe helpful."),
                ChatMessage::user("Hi"),
            ]
        );
    }

    #[test]
    fn model_override_applies_to_system_template() {
        let pack = pack();
        let text = Renderer::new(&pack)
            .with_options(RenderOptions::default().for_model("gpt-4"))
            .render("support", &inputs(&[("role", Value::from("guide"))]))
            .unwrap();
        assert_eq!(text, "You are a guide.\n\nBe helpful. (gpt-4)");
    }

    #[test]
    fn unknown_prompt_is_an_error() {
        let pack = pack();
        let err = Renderer::new(&pack).render("nope", &Inputs::new()).expect_err("unknown");
        assert!(matches!(err, RenderError::UnknownPrompt { .. }));
    }

    #[test]
    fn render_text_uses_supplied_values_only() {
        let fragments = BTreeMap::from([("sig".to_owned(), "-- {{name}}".to_owned())]);
        let text = render_text(
            "Hi {{name}} {{other}}\n{{fragment:sig}}",
            &fragments,
            &inputs(&[("name", Value::from("Ada"))]),
        )
        .unwrap();
        assert_eq!(text, "Hi Ada {{other}}\n-- Ada");
    }

    #[tokio::test]
    async fn async_render_matches_sync() {
        let pack = pack();
        let renderer = Renderer::new(&pack);
        let supplied = inputs(&[("role", Value::from("support agent"))]);
        assert_eq!(
            renderer.render_async("support", &supplied).await.unwrap(),
            renderer.render("support", &supplied).unwrap()
        );
    }
}

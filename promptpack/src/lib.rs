//! PromptPack runtime facade.
//!
//! Bundles the runtime crates behind feature flags and exposes the
//! boundary used by host adapters: [`parse`], [`render`],
//! [`validate_inputs`], [`select_tools`], and [`run`].
//!
//! ```
//! let pack = promptpack::parse(r#"{
//!     "id": "greeter",
//!     "name": "Greeter",
//!     "version": "1.0.0",
//!     "fragments": { "sign_off": "Bye." },
//!     "prompts": {
//!         "hello": {
//!             "id": "hello",
//!             "name": "Hello",
//!             "version": "1.0.0",
//!             "system_template": "Hello {{name}}! {{fragment:sign_off}}",
//!             "variables": { "name": { "type": "string", "required": true } }
//!         }
//!     }
//! }"#)
//! .unwrap();
//!
//! let inputs = promptpack::Inputs::from([("name".to_owned(), promptpack::Value::from("Ada"))]);
//! assert_eq!(promptpack::render(&pack, "hello", &inputs).unwrap(), "Hello Ada! Bye.");
//! ```

#![warn(missing_docs, clippy::pedantic)]

/// Document model shared by every crate.
pub use pack_primitives as primitives;
pub use pack_primitives::{
    Error, Pack, Prompt, Result, ToolDefinition, ToolPolicy, Validator, Value, ValueType, Variable,
};

/// Pack parsing (enabled by `loader` feature).
#[cfg(feature = "loader")]
pub use pack_loader as loader;

/// Fragment expansion and rendering (enabled by `prompts` feature).
#[cfg(feature = "prompts")]
pub use pack_prompts as prompts;
#[cfg(feature = "prompts")]
pub use pack_prompts::{
    ChatMessage, CycleError, FragmentError, Inputs, RenderError, RenderOptions, Renderer,
};

/// Tool selection and invocation (enabled by `tools` feature).
#[cfg(feature = "tools")]
pub use pack_tools as tools;
#[cfg(feature = "tools")]
pub use pack_tools::{ExecutableTool, HandlerRegistry, ToolError, ToolHandler, ToolSet};

/// Output validation (enabled by `validators` feature).
#[cfg(feature = "validators")]
pub use pack_validators as validators;
#[cfg(feature = "validators")]
pub use pack_validators::{ValidationResult, Violation};

/// Tracing subscriber setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use pack_telemetry as telemetry;

/// Parses a pack from a file path or raw JSON/YAML text.
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed sources, [`Error::Io`] for
/// unreadable files, and [`Error::Validation`] or [`Error::Configuration`]
/// for schema problems. No partial pack is ever returned.
#[cfg(feature = "loader")]
pub fn parse(source: impl Into<pack_loader::PackSource>) -> Result<Pack> {
    pack_loader::parse(source)
}

/// Renders the named prompt of `pack` with lenient reference handling.
///
/// # Errors
///
/// See [`Renderer::render`].
#[cfg(feature = "prompts")]
pub fn render(pack: &Pack, prompt_name: &str, inputs: &Inputs) -> pack_prompts::RenderResult<String> {
    Renderer::new(pack).render(prompt_name, inputs)
}

/// Checks `inputs` against declared variables; an empty list means valid.
#[cfg(feature = "prompts")]
#[must_use]
pub fn validate_inputs(variables: &[Variable], inputs: &Inputs) -> Vec<String> {
    pack_prompts::validate_inputs(variables, inputs)
}

/// Resolves the tools visible to the named prompt, binding `handlers`.
///
/// # Errors
///
/// Returns [`ToolError::UnknownPrompt`] when the pack has no such prompt.
#[cfg(feature = "tools")]
pub fn select_tools(
    pack: &Pack,
    prompt_name: &str,
    handlers: &HandlerRegistry,
) -> pack_tools::ToolResult<ToolSet> {
    pack_tools::select_tools(pack, prompt_name, handlers)
}

/// Runs the enabled `validators` against `content`.
#[cfg(feature = "validators")]
#[must_use]
pub fn run(content: &str, validators: &[Validator]) -> ValidationResult {
    pack_validators::run(content, validators)
}

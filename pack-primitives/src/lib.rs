//! Document model shared by every PromptPack crate.
//!
//! A [`Pack`] is built once, by the loader or by hand through its builders,
//! and is read-only afterwards.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod ident;
mod pack;
mod path;
mod prompt;
mod tool;
mod validator;
mod value;
mod variable;

/// Error type and result alias for pack construction.
pub use error::{Error, Result};
/// Pack container, builder, and template engine settings.
pub use pack::{DEFAULT_CLOSE, DEFAULT_OPEN, Delimiters, Pack, PackBuilder, TemplateEngine};
/// Field locations used in error reports.
pub use path::{FieldPath, PathSegment};
/// Prompt definitions.
pub use prompt::{ModelOverride, Parameters, Prompt, PromptBuilder};
/// Tool definitions and policy.
pub use tool::{
    DEFAULT_MAX_ROUNDS, DEFAULT_MAX_TOOL_CALLS_PER_TURN, ToolChoice, ToolDefinition, ToolPolicy,
    empty_object_schema,
};
/// Output validator declarations.
pub use validator::{CompiledSchema, Validator, ValidatorKind, ValidatorParams, registered_types};
/// Tagged variable values.
pub use value::{NonFiniteNumber, Value, ValueType, canonical_number};
/// Variable declarations.
pub use variable::{Variable, VariableRules};

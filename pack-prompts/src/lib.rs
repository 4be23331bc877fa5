//! Fragment expansion, input validation, and prompt rendering.
//!
//! Rendering is lenient by default: fragment references and placeholders that
//! cannot be resolved are copied to the output unchanged. Use
//! [`RenderOptions::strict`] to turn them into errors instead.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod fragments;
pub mod inputs;
pub mod render;
pub mod template;

pub use error::{CycleError, FragmentError, RenderError, RenderResult};
pub use fragments::{DEFAULT_MAX_EXPANSION_BYTES, FragmentResolver, resolve};
pub use inputs::{InputIssue, Inputs, IssueKind, check_inputs, inputs_from_json, validate_inputs};
pub use render::{ChatMessage, RenderOptions, Renderer, Role, Strictness, render_text};
pub use template::{Segment, referenced_fragments, referenced_variables, scan};

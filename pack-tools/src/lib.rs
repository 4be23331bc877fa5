//! Tool selection and invocation for PromptPack prompts.
//!
//! A prompt's visible tools are resolved from the pack with
//! [`select_tools`]; each comes back as an [`ExecutableTool`] that is either
//! bound to a caller-supplied [`ToolHandler`] or schema-only.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod executable;
pub mod handler;
pub mod select;

pub use error::{ToolError, ToolResult};
pub use executable::ExecutableTool;
pub use handler::{Arguments, HandlerRegistry, ToolHandler};
pub use select::{ToolSet, select_tools};

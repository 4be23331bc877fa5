//! Tool selection and invocation errors.

use thiserror::Error;

/// Result alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors produced by tool selection, handler registration, and invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The pack has no prompt with the requested name.
    #[error("unknown prompt: {name}")]
    UnknownPrompt {
        /// Requested prompt name.
        name: String,
    },

    /// A handler name collided with an existing registration.
    #[error("handler for tool `{name}` is already registered")]
    DuplicateHandler {
        /// Name of the offending tool.
        name: String,
    },

    /// The tool was invoked before a handler was bound.
    #[error("tool `{name}` has no handler bound")]
    MissingHandler {
        /// Name of the schema-only tool.
        name: String,
    },

    /// Arguments do not satisfy the tool's parameter schema.
    #[error("invalid arguments for tool `{name}`: {reason}")]
    InvalidArguments {
        /// Tool name.
        name: String,
        /// Schema violations.
        reason: String,
    },

    /// The handler failed.
    #[error("tool execution failed: {reason}")]
    Execution {
        /// Human-readable error returned by the handler.
        reason: String,
    },
}

impl ToolError {
    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }
}

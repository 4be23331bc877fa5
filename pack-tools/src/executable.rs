//! Tool definitions paired with optional handlers.

use std::fmt;
use std::sync::Arc;

use pack_primitives::{CompiledSchema, ToolDefinition};
use serde_json::{Value, json};
use tracing::warn;

use crate::error::{ToolError, ToolResult};
use crate::handler::{Arguments, ToolHandler};

/// A tool definition ready to hand to a chat model, optionally bound to a
/// handler.
///
/// Schema-only tools (no handler) can be advertised but not invoked until a
/// handler is attached with [`ExecutableTool::bind`].
#[derive(Clone)]
pub struct ExecutableTool {
    definition: ToolDefinition,
    schema: Option<CompiledSchema>,
    handler: Option<Arc<dyn ToolHandler>>,
}

impl fmt::Debug for ExecutableTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutableTool")
            .field("name", &self.definition.name())
            .field("bound", &self.is_bound())
            .finish_non_exhaustive()
    }
}

impl ExecutableTool {
    /// Wraps a definition without handler.
    ///
    /// A parameter schema that does not compile disables argument
    /// validation for this tool.
    #[must_use]
    pub fn new(definition: ToolDefinition) -> Self {
        let schema = match CompiledSchema::compile(Value::Object(definition.parameters().clone())) {
            Ok(schema) => Some(schema),
            Err(reason) => {
                warn!(tool = definition.name(), %reason, "parameter schema does not compile; arguments will not be checked");
                None
            }
        };
        Self {
            definition,
            schema,
            handler: None,
        }
    }

    /// Attaches a handler, replacing any previous one.
    #[must_use]
    pub fn bind<H>(self, handler: H) -> Self
    where
        H: ToolHandler + 'static,
    {
        self.bind_shared(Arc::new(handler))
    }

    /// Attaches an already shared handler, replacing any previous one.
    #[must_use]
    pub fn bind_shared(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Returns the underlying definition.
    #[must_use]
    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Returns true when a handler is attached.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.handler.is_some()
    }

    /// Checks `arguments` against the tool's parameter schema.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] listing every schema violation.
    pub fn validate_arguments(&self, arguments: &Arguments) -> ToolResult<()> {
        let Some(schema) = &self.schema else {
            return Ok(());
        };
        let violations = schema.violations(&Value::Object(arguments.clone()));
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ToolError::InvalidArguments {
                name: self.name().to_owned(),
                reason: violations.join("; "),
            })
        }
    }

    /// Validates `arguments` and runs the bound handler.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::MissingHandler`] for schema-only tools,
    /// [`ToolError::InvalidArguments`] when validation fails, and whatever the
    /// handler reports.
    pub fn invoke(&self, arguments: &Arguments) -> ToolResult<String> {
        let handler = self.handler.as_ref().ok_or_else(|| ToolError::MissingHandler {
            name: self.name().to_owned(),
        })?;
        self.validate_arguments(arguments)?;
        handler.invoke(arguments)
    }

    /// Async form of [`ExecutableTool::invoke`] with identical semantics.
    ///
    /// # Errors
    ///
    /// Same as [`ExecutableTool::invoke`].
    #[allow(clippy::unused_async)]
    pub async fn invoke_async(&self, arguments: &Arguments) -> ToolResult<String> {
        self.invoke(arguments)
    }

    /// Returns the function-calling declaration understood by chat-model APIs.
    #[must_use]
    pub fn function_schema(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.definition.name(),
                "description": self.definition.description(),
                "parameters": self.definition.parameters(),
            }
        })
    }
}

//! Caller-supplied tool handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{ToolError, ToolResult};

/// Tool arguments as produced by a model's function call.
pub type Arguments = Map<String, Value>;

/// Capability implemented by tool bodies: arguments in, text out.
///
/// Implementations are opaque to this crate; they are stored and forwarded,
/// never inspected.
pub trait ToolHandler: Send + Sync {
    /// Runs the tool.
    ///
    /// # Errors
    ///
    /// Implementations report failures as [`ToolError::Execution`].
    fn invoke(&self, arguments: &Arguments) -> ToolResult<String>;
}

impl<F> ToolHandler for F
where
    F: Fn(&Arguments) -> ToolResult<String> + Send + Sync,
{
    fn invoke(&self, arguments: &Arguments) -> ToolResult<String> {
        self(arguments)
    }
}

/// Handlers keyed by tool name.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("HandlerRegistry")
            .field("registered", &names)
            .finish()
    }
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateHandler`] if the name is already present.
    pub fn register<H>(&mut self, name: impl Into<String>, handler: H) -> ToolResult<()>
    where
        H: ToolHandler + 'static,
    {
        self.register_shared(name, Arc::new(handler))
    }

    /// Registers an already shared handler for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateHandler`] if the name is already present.
    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn ToolHandler>,
    ) -> ToolResult<()> {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            return Err(ToolError::DuplicateHandler { name });
        }
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Returns the handler registered for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Returns true when a handler is registered for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true when no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

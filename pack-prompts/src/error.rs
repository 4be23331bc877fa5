//! Rendering and fragment-cycle errors.

/// Result alias for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// A fragment that includes itself, directly or through other fragments.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("fragment cycle detected: {}", .path.join(" → "))]
pub struct CycleError {
    path: Vec<String>,
}

impl CycleError {
    pub(crate) fn new(path: Vec<String>) -> Self {
        Self { path }
    }

    /// Returns the fragment names along the cycle; the first and last entries
    /// are the same fragment.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }
}

/// Errors raised by fragment expansion.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FragmentError {
    /// A fragment includes itself.
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// The expanded text outgrew the resolver's byte limit.
    #[error("fragment expansion exceeds {limit} bytes")]
    TooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },
}

/// Errors raised while rendering a prompt.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A required variable was not supplied and has no default.
    #[error("missing required variable: {name}")]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
    },

    /// A supplied value has the wrong type or breaks a variable rule.
    #[error("invalid value for variable `{name}`: {reason}")]
    InvalidVariable {
        /// Name of the offending variable.
        name: String,
        /// Description of the failed check.
        reason: String,
    },

    /// Strict mode only: a placeholder names neither a declared nor a supplied variable.
    #[error("undefined variable: {name}")]
    UndefinedPlaceholder {
        /// Placeholder name.
        name: String,
    },

    /// Strict mode only: a fragment reference names no fragment in the pack.
    #[error("undefined fragment: {name}")]
    UndefinedFragment {
        /// Fragment name.
        name: String,
    },

    /// The pack has no prompt with the requested name.
    #[error("unknown prompt: {name}")]
    UnknownPrompt {
        /// Requested prompt name.
        name: String,
    },

    /// Fragment expansion found a cycle.
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// Fragment expansion outgrew its byte limit.
    #[error("fragment expansion exceeds {limit} bytes")]
    ExpansionTooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },
}

impl From<FragmentError> for RenderError {
    fn from(err: FragmentError) -> Self {
        match err {
            FragmentError::Cycle(cycle) => Self::Cycle(cycle),
            FragmentError::TooLarge { limit } => Self::ExpansionTooLarge { limit },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_path_is_joined_with_arrows() {
        let err = CycleError::new(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(err.to_string(), "fragment cycle detected: a → b → a");
        assert_eq!(RenderError::from(err).to_string(), "fragment cycle detected: a → b → a");
    }

    #[test]
    fn fragment_errors_map_onto_render_errors() {
        let err = RenderError::from(FragmentError::TooLarge { limit: 64 });
        assert!(matches!(err, RenderError::ExpansionTooLarge { limit: 64 }));

        let cycle = CycleError::new(vec!["x".into(), "x".into()]);
        let err = RenderError::from(FragmentError::from(cycle.clone()));
        assert!(matches!(err, RenderError::Cycle(found) if found == cycle));
    }
}

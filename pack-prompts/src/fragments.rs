//! Fragment expansion.

use std::collections::BTreeMap;

use pack_primitives::{Delimiters, Pack};
use tracing::trace;

use crate::error::{CycleError, FragmentError};
use crate::template::{Segment, scan};

/// Default cap on the size of an expanded template.
pub const DEFAULT_MAX_EXPANSION_BYTES: usize = 1 << 20;

/// Expands `{{fragment:name}}` references against a set of named fragments.
///
/// Expansion is purely textual: variable placeholders are copied through
/// untouched. References to unknown fragments stay in the output verbatim.
///
/// A fragment may include another several times, so output can grow
/// exponentially with nesting depth; expansion stops once the output passes
/// the byte limit.
#[derive(Clone, Copy, Debug)]
pub struct FragmentResolver<'p> {
    fragments: &'p BTreeMap<String, String>,
    delimiters: &'p Delimiters,
    max_bytes: usize,
}

impl<'p> FragmentResolver<'p> {
    /// Creates a resolver over `fragments` using `delimiters`.
    #[must_use]
    pub const fn new(fragments: &'p BTreeMap<String, String>, delimiters: &'p Delimiters) -> Self {
        Self {
            fragments,
            delimiters,
            max_bytes: DEFAULT_MAX_EXPANSION_BYTES,
        }
    }

    /// Replaces the expansion byte limit.
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Creates a resolver over a pack's fragments and delimiters.
    #[must_use]
    pub fn for_pack(pack: &'p Pack) -> Self {
        Self::new(pack.fragments(), pack.template_engine().delimiters())
    }

    /// Expands every fragment reference in `template`, recursively.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::Cycle`] when a fragment appears in its own
    /// chain of inclusions and [`FragmentError::TooLarge`] when the output
    /// passes the byte limit.
    pub fn resolve(&self, template: &str) -> Result<String, FragmentError> {
        let mut stack = Vec::new();
        let mut out = String::with_capacity(template.len());
        self.expand(template, &mut stack, &mut out)?;
        Ok(out)
    }

    /// Returns the distinct names of referenced fragments that do not exist,
    /// following defined fragments transitively. Cycles are not reported here.
    #[must_use]
    pub fn missing_fragments(&self, template: &str) -> Vec<String> {
        let mut missing = Vec::new();
        let mut visited = Vec::new();
        self.collect_missing(template, &mut visited, &mut missing);
        missing
    }

    fn expand<'t>(
        &self,
        template: &'t str,
        stack: &mut Vec<&'t str>,
        out: &mut String,
    ) -> Result<(), FragmentError>
    where
        'p: 't,
    {
        for segment in scan(template, self.delimiters) {
            let Segment::Fragment { name, raw } = segment else {
                self.push(out, segment.raw())?;
                continue;
            };

            let Some(body) = self.fragments.get(name) else {
                trace!(fragment = name, "leaving undefined fragment reference in place");
                self.push(out, raw)?;
                continue;
            };

            if let Some(first) = stack.iter().position(|seen| *seen == name) {
                let mut path: Vec<String> = stack[first..].iter().map(|s| (*s).to_owned()).collect();
                path.push(name.to_owned());
                return Err(CycleError::new(path).into());
            }

            stack.push(name);
            self.expand(body, stack, out)?;
            stack.pop();
        }
        Ok(())
    }

    fn push(&self, out: &mut String, text: &str) -> Result<(), FragmentError> {
        if out.len() + text.len() > self.max_bytes {
            return Err(FragmentError::TooLarge {
                limit: self.max_bytes,
            });
        }
        out.push_str(text);
        Ok(())
    }

    fn collect_missing<'t>(
        &self,
        template: &'t str,
        visited: &mut Vec<&'t str>,
        missing: &mut Vec<String>,
    ) where
        'p: 't,
    {
        for segment in scan(template, self.delimiters) {
            let Segment::Fragment { name, .. } = segment else {
                continue;
            };
            match self.fragments.get(name) {
                Some(body) => {
                    if !visited.contains(&name) {
                        visited.push(name);
                        self.collect_missing(body, visited, missing);
                    }
                }
                None => {
                    if !missing.iter().any(|m| m == name) {
                        missing.push(name.to_owned());
                    }
                }
            }
        }
    }
}

/// Expands fragment references in `template` with the default `{{ }}` delimiters.
///
/// # Errors
///
/// Returns [`FragmentError::Cycle`] when fragments include each other in a
/// loop and [`FragmentError::TooLarge`] past [`DEFAULT_MAX_EXPANSION_BYTES`].
pub fn resolve(template: &str, fragments: &BTreeMap<String, String>) -> Result<String, FragmentError> {
    let delimiters = Delimiters::default();
    FragmentResolver::new(fragments, &delimiters).resolve(template)
}

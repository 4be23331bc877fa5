//! Human-readable locations inside a pack document.

use std::fmt::{self, Display, Formatter};

/// One step of a [`FieldPath`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum PathSegment {
    /// Object member access.
    Key(String),
    /// Array element access.
    Index(usize),
}

/// Location of a field inside a pack, rendered like `prompts.support.variables[0].type`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// Returns the path of the document root.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a new path extended with an object key.
    #[must_use]
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    /// Returns a new path extended with an array index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Returns true for the document root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the individual path segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }

        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if position == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_keys_and_indices() {
        let path = FieldPath::root()
            .key("prompts")
            .key("support")
            .key("validators")
            .index(2)
            .key("params");
        assert_eq!(path.to_string(), "prompts.support.validators[2].params");
    }

    #[test]
    fn root_renders_placeholder() {
        assert!(FieldPath::root().is_root());
        assert_eq!(FieldPath::root().to_string(), "<root>");
    }
}

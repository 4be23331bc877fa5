//! Placeholder scanning for pack templates.
//!
//! A placeholder is the pack's open delimiter, an inner token, and the close
//! delimiter with no surrounding whitespace. The inner token is either a
//! variable name or `fragment:` followed by a fragment name; anything else is
//! ordinary text.

use pack_primitives::{Delimiters, ident::is_symbol};

/// Marker that introduces a fragment reference inside a placeholder.
pub const FRAGMENT_PREFIX: &str = "fragment:";

/// A lexical piece of a template.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Segment<'t> {
    /// Literal text copied to the output.
    Text(&'t str),
    /// A `{{name}}` placeholder.
    Variable {
        /// Variable name.
        name: &'t str,
        /// Full placeholder text including delimiters.
        raw: &'t str,
    },
    /// A `{{fragment:name}}` reference.
    Fragment {
        /// Fragment name.
        name: &'t str,
        /// Full marker text including delimiters.
        raw: &'t str,
    },
}

impl<'t> Segment<'t> {
    /// Returns the exact source text of the segment.
    #[must_use]
    pub const fn raw(&self) -> &'t str {
        match self {
            Self::Text(text) => text,
            Self::Variable { raw, .. } | Self::Fragment { raw, .. } => raw,
        }
    }
}

/// Splits `template` into text and placeholder segments, left to right.
///
/// Concatenating the raw text of every segment reproduces the input.
#[must_use]
pub fn scan<'t>(template: &'t str, delimiters: &Delimiters) -> Vec<Segment<'t>> {
    let open = delimiters.open();
    let close = delimiters.close();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(found) = template[cursor..].find(open) {
        let start = cursor + found;
        let inner_start = start + open.len();
        let Some(inner_len) = template[inner_start..].find(close) else {
            break;
        };
        let inner_end = inner_start + inner_len;
        let end = inner_end + close.len();

        if let Some(segment) = classify(&template[inner_start..inner_end], &template[start..end]) {
            if text_start < start {
                segments.push(Segment::Text(&template[text_start..start]));
            }
            segments.push(segment);
            text_start = end;
            cursor = end;
        } else {
            // Not a placeholder here; retry from the next character so that
            // `{{{name}}}` still finds the inner `{{name}}`.
            let step = template[start..].chars().next().map_or(1, char::len_utf8);
            cursor = start + step;
        }
    }

    if text_start < template.len() {
        segments.push(Segment::Text(&template[text_start..]));
    }
    segments
}

fn classify<'t>(inner: &'t str, raw: &'t str) -> Option<Segment<'t>> {
    if let Some(name) = inner.strip_prefix(FRAGMENT_PREFIX) {
        return is_symbol(name).then_some(Segment::Fragment { name, raw });
    }
    is_symbol(inner).then_some(Segment::Variable { name: inner, raw })
}

/// Returns the distinct variable names referenced by `template`, in order of
/// first appearance.
#[must_use]
pub fn referenced_variables<'t>(template: &'t str, delimiters: &Delimiters) -> Vec<&'t str> {
    let mut names = Vec::new();
    for segment in scan(template, delimiters) {
        if let Segment::Variable { name, .. } = segment {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Returns the distinct fragment names referenced by `template`, in order of
/// first appearance. Nested references inside fragments are not followed.
#[must_use]
pub fn referenced_fragments<'t>(template: &'t str, delimiters: &Delimiters) -> Vec<&'t str> {
    let mut names = Vec::new();
    for segment in scan(template, delimiters) {
        if let Segment::Fragment { name, .. } = segment {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

//! Pack container and template engine settings.

use std::collections::BTreeMap;

use crate::prompt::Prompt;
use crate::tool::ToolDefinition;

/// Default opening placeholder delimiter.
pub const DEFAULT_OPEN: &str = "{{";
/// Default closing placeholder delimiter.
pub const DEFAULT_CLOSE: &str = "}}";

/// Placeholder delimiters shared by every template in a pack.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Delimiters {
    open: String,
    close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: DEFAULT_OPEN.to_owned(),
            close: DEFAULT_CLOSE.to_owned(),
        }
    }
}

impl Delimiters {
    /// Creates delimiters from non-empty open and close markers.
    #[must_use]
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Option<Self> {
        let open = open.into();
        let close = close.into();
        if open.is_empty() || close.is_empty() {
            return None;
        }
        Some(Self { open, close })
    }

    /// Derives delimiters from a syntax marker.
    ///
    /// Accepts either an example placeholder such as `{{variable}}` or
    /// `${variable}`, or the two delimiters separated by whitespace (`{{ }}`).
    #[must_use]
    pub fn from_syntax(syntax: &str) -> Option<Self> {
        let syntax = syntax.trim();
        if let Some((open, close)) = syntax.split_once("variable") {
            return Self::new(open.trim(), close.trim());
        }

        let mut parts = syntax.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(open), Some(close), None) => Self::new(open, close),
            _ => None,
        }
    }

    /// Returns the opening delimiter.
    #[must_use]
    pub fn open(&self) -> &str {
        &self.open
    }

    /// Returns the closing delimiter.
    #[must_use]
    pub fn close(&self) -> &str {
        &self.close
    }

    /// Wraps `inner` in the delimiters.
    #[must_use]
    pub fn wrap(&self, inner: &str) -> String {
        format!("{}{inner}{}", self.open, self.close)
    }
}

/// Template engine declaration of a pack.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TemplateEngine {
    version: String,
    syntax: String,
    delimiters: Delimiters,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self {
            version: "v1".to_owned(),
            syntax: "{{variable}}".to_owned(),
            delimiters: Delimiters::default(),
        }
    }
}

impl TemplateEngine {
    /// Creates an engine declaration, deriving delimiters from `syntax`.
    ///
    /// Returns `None` when the syntax marker does not describe delimiters.
    #[must_use]
    pub fn new(version: impl Into<String>, syntax: impl Into<String>) -> Option<Self> {
        let syntax = syntax.into();
        let delimiters = Delimiters::from_syntax(&syntax)?;
        Some(Self {
            version: version.into(),
            syntax,
            delimiters,
        })
    }

    /// Returns the engine version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the raw syntax marker.
    #[must_use]
    pub fn syntax(&self) -> &str {
        &self.syntax
    }

    /// Returns the placeholder delimiters.
    #[must_use]
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }
}

/// A parsed, immutable collection of prompts, tools, and fragments.
#[derive(Clone, Debug)]
pub struct Pack {
    id: String,
    name: String,
    version: String,
    description: Option<String>,
    template_engine: TemplateEngine,
    prompts: BTreeMap<String, Prompt>,
    tools: Vec<ToolDefinition>,
    fragments: BTreeMap<String, String>,
}

impl Pack {
    /// Starts building a pack.
    #[must_use]
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> PackBuilder {
        PackBuilder {
            pack: Self {
                id: id.into(),
                name: name.into(),
                version: version.into(),
                description: None,
                template_engine: TemplateEngine::default(),
                prompts: BTreeMap::new(),
                tools: Vec::new(),
                fragments: BTreeMap::new(),
            },
        }
    }

    /// Returns the pack identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the pack version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the template engine declaration.
    #[must_use]
    pub fn template_engine(&self) -> &TemplateEngine {
        &self.template_engine
    }

    /// Returns all prompts keyed by name.
    #[must_use]
    pub fn prompts(&self) -> &BTreeMap<String, Prompt> {
        &self.prompts
    }

    /// Looks up a prompt by name.
    #[must_use]
    pub fn prompt(&self, name: &str) -> Option<&Prompt> {
        self.prompts.get(name)
    }

    /// Returns all tools in declaration order.
    #[must_use]
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Returns all fragments keyed by name.
    #[must_use]
    pub fn fragments(&self) -> &BTreeMap<String, String> {
        &self.fragments
    }

    /// Looks up a fragment by name.
    #[must_use]
    pub fn fragment(&self, name: &str) -> Option<&str> {
        self.fragments.get(name).map(String::as_str)
    }
}

/// Builder for [`Pack`].
#[derive(Debug)]
pub struct PackBuilder {
    pack: Pack,
}

impl PackBuilder {
    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.pack.description = Some(description.into());
        self
    }

    /// Sets the template engine declaration.
    #[must_use]
    pub fn template_engine(mut self, engine: TemplateEngine) -> Self {
        self.pack.template_engine = engine;
        self
    }

    /// Adds a prompt under `name`, replacing any previous prompt of that name.
    #[must_use]
    pub fn prompt(mut self, name: impl Into<String>, prompt: Prompt) -> Self {
        self.pack.prompts.insert(name.into(), prompt);
        self
    }

    /// Adds a tool, replacing an earlier tool with the same name in place.
    #[must_use]
    pub fn tool(mut self, tool: ToolDefinition) -> Self {
        if let Some(slot) = self
            .pack
            .tools
            .iter_mut()
            .find(|existing| existing.name() == tool.name())
        {
            *slot = tool;
        } else {
            self.pack.tools.push(tool);
        }
        self
    }

    /// Adds a fragment.
    #[must_use]
    pub fn fragment(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.pack.fragments.insert(name.into(), template.into());
        self
    }

    /// Finalises the pack.
    #[must_use]
    pub fn build(self) -> Pack {
        self.pack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiters_from_example_placeholder() {
        let delimiters = Delimiters::from_syntax("{{variable}}").unwrap();
        assert_eq!(delimiters, Delimiters::default());

        let delimiters = Delimiters::from_syntax("${variable}").unwrap();
        assert_eq!(delimiters.open(), "${");
        assert_eq!(delimiters.close(), "}");
    }

    #[test]
    fn delimiters_from_pair() {
        let delimiters = Delimiters::from_syntax("<% %>").unwrap();
        assert_eq!(delimiters.wrap("name"), "<%name%>");
        assert!(Delimiters::from_syntax("mustache").is_none());
        assert!(Delimiters::from_syntax("variable").is_none());
    }

    #[test]
    fn tools_keep_declaration_order() {
        let pack = Pack::builder("demo", "Demo", "1.0.0")
            .tool(ToolDefinition::new("zeta", "last letter"))
            .tool(ToolDefinition::new("alpha", "first letter"))
            .tool(ToolDefinition::new("zeta", "replaced"))
            .build();
        let names: Vec<_> = pack.tools().iter().map(ToolDefinition::name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(pack.tool("zeta").unwrap().description(), "replaced");
    }
}

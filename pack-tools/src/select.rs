//! Per-prompt tool selection.

use pack_primitives::{Pack, ToolDefinition, ToolPolicy};
use tracing::{debug, trace};

use crate::error::{ToolError, ToolResult};
use crate::executable::ExecutableTool;
use crate::handler::HandlerRegistry;

/// The tools visible to one prompt, plus its tool policy.
///
/// The policy is carried as metadata only; interpreting `tool_choice` or
/// `max_rounds` is up to the host.
#[derive(Clone, Debug)]
pub struct ToolSet {
    tools: Vec<ExecutableTool>,
    policy: ToolPolicy,
}

impl ToolSet {
    /// Returns the selected tools in selection order.
    #[must_use]
    pub fn tools(&self) -> &[ExecutableTool] {
        &self.tools
    }

    /// Returns the prompt's tool policy.
    #[must_use]
    pub fn policy(&self) -> &ToolPolicy {
        &self.policy
    }

    /// Returns the selected tool names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(ExecutableTool::name).collect()
    }

    /// Looks up a selected tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ExecutableTool> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Returns the number of selected tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true when no tool was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Consumes the set, returning the tools.
    #[must_use]
    pub fn into_tools(self) -> Vec<ExecutableTool> {
        self.tools
    }
}

impl IntoIterator for ToolSet {
    type Item = ExecutableTool;
    type IntoIter = std::vec::IntoIter<ExecutableTool>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.into_iter()
    }
}

impl<'a> IntoIterator for &'a ToolSet {
    type Item = &'a ExecutableTool;
    type IntoIter = std::slice::Iter<'a, ExecutableTool>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.iter()
    }
}

/// Resolves the tools visible to the named prompt.
///
/// Starts from the prompt's own tool list, or every pack tool in declaration
/// order when that list is empty. Blocklisted names are removed, names with
/// no definition in the pack are skipped, and each survivor is bound to its
/// handler when `handlers` has one.
///
/// # Errors
///
/// Returns [`ToolError::UnknownPrompt`] when the pack has no such prompt.
pub fn select_tools(pack: &Pack, prompt_name: &str, handlers: &HandlerRegistry) -> ToolResult<ToolSet> {
    let prompt = pack.prompt(prompt_name).ok_or_else(|| ToolError::UnknownPrompt {
        name: prompt_name.to_owned(),
    })?;
    let policy = prompt.tool_policy();

    let candidates: Vec<&str> = if prompt.tools().is_empty() {
        pack.tools().iter().map(ToolDefinition::name).collect()
    } else {
        prompt.tools().iter().map(String::as_str).collect()
    };

    let mut tools: Vec<ExecutableTool> = Vec::with_capacity(candidates.len());
    for name in candidates {
        if policy.is_blocked(name) {
            trace!(prompt = prompt_name, tool = name, "tool blocklisted");
            continue;
        }
        if tools.iter().any(|tool| tool.name() == name) {
            continue;
        }
        let Some(definition) = pack.tool(name) else {
            trace!(prompt = prompt_name, tool = name, "skipping undefined tool");
            continue;
        };

        let tool = ExecutableTool::new(definition.clone());
        tools.push(match handlers.get(name) {
            Some(handler) => tool.bind_shared(handler),
            None => tool,
        });
    }

    debug!(
        prompt = prompt_name,
        selected = tools.len(),
        bound = tools.iter().filter(|tool| tool.is_bound()).count(),
        "selected tools"
    );
    Ok(ToolSet {
        tools,
        policy: policy.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Arguments;
    use pack_primitives::{Prompt, ToolChoice};

    fn pack() -> Pack {
        let allow = Prompt::builder("allow", "Allow", "1.0.0")
            .tool("search")
            .tool("ghost")
            .tool("delete")
            .tool("lookup")
            .tool_policy(
                ToolPolicy::default()
                    .with_blocklist(["delete"])
                    .with_tool_choice(ToolChoice::Required)
                    .with_max_rounds(3),
            )
            .build()
            .unwrap();
        let everything = Prompt::builder("everything", "Everything", "1.0.0")
            .tool_policy(ToolPolicy::default().with_blocklist(["search"]))
            .build()
            .unwrap();

        Pack::builder("demo", "Demo", "1.0.0")
            .prompt("allow", allow)
            .prompt("everything", everything)
            .tool(ToolDefinition::new("lookup", "Look things up"))
            .tool(ToolDefinition::new("search", "Search"))
            .tool(ToolDefinition::new("delete", "Delete"))
            .build()
    }

    #[test]
    fn follows_prompt_order_and_drops_blocked_and_stale() {
        let set = select_tools(&pack(), "allow", &HandlerRegistry::new()).unwrap();
        assert_eq!(set.names(), vec!["search", "lookup"]);
        assert_eq!(set.policy().tool_choice(), ToolChoice::Required);
        assert_eq!(set.policy().max_rounds(), 3);
    }

    #[test]
    fn defaults_to_every_pack_tool() {
        let set = select_tools(&pack(), "everything", &HandlerRegistry::new()).unwrap();
        assert_eq!(set.names(), vec!["lookup", "delete"]);
    }

    #[test]
    fn binds_supplied_handlers() {
        let mut handlers = HandlerRegistry::new();
        handlers
            .register("lookup", |_: &Arguments| -> ToolResult<String> { Ok("found".to_owned()) })
            .unwrap();
        handlers
            .register("delete", |_: &Arguments| -> ToolResult<String> { Ok("gone".to_owned()) })
            .unwrap();

        let set = select_tools(&pack(), "allow", &handlers).unwrap();
        assert!(!set.get("search").unwrap().is_bound());
        let lookup = set.get("lookup").unwrap();
        assert_eq!(lookup.invoke(&Arguments::new()).unwrap(), "found");
        assert!(set.get("delete").is_none());
    }

    #[test]
    fn unknown_prompt_errors() {
        let err = select_tools(&pack(), "nope", &HandlerRegistry::new()).expect_err("unknown");
        assert!(matches!(err, ToolError::UnknownPrompt { name } if name == "nope"));
    }
}

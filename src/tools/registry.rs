use super::schema::{ToolError, ToolOutput, ToolSpec};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A named capability the model may invoke with JSON arguments.
///
/// Implementations are shared across conversation threads and run on
/// worker threads, so they must be `Send + Sync`.
pub trait Tool: Send + Sync {
    fn spec(&self) -> &ToolSpec;
    fn call(&self, args: &Map<String, Value>) -> Result<ToolOutput, ToolError>;
}

type ToolFn = dyn Fn(&Map<String, Value>) -> Result<ToolOutput, ToolError> + Send + Sync;

/// Closure-backed tool, handy for wiring test doubles.
pub struct FnTool {
    spec: ToolSpec,
    handler: Box<ToolFn>,
}

impl FnTool {
    pub fn new<F>(spec: ToolSpec, handler: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Result<ToolOutput, ToolError> + Send + Sync + 'static,
    {
        Self {
            spec,
            handler: Box::new(handler),
        }
    }
}

impl Tool for FnTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    fn call(&self, args: &Map<String, Value>) -> Result<ToolOutput, ToolError> {
        (self.handler)(args)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("tool `{name}` is registered twice")]
    DuplicateTool { name: String },
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
    specs: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.spec().name.clone();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool { name });
        }
        self.specs.push(tool.spec().clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Result<Self, RegistryError> {
        self.register(Arc::new(tool))?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Specs in registration order; this is the order advertised to the model.
    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|spec| spec.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::schema::{ArgSpec, ArgType};

    fn echo_tool(name: &str) -> FnTool {
        FnTool::new(
            ToolSpec::new(name, "echo").arg("text", ArgSpec::required(ArgType::String, "text")),
            |args| {
                Ok(ToolOutput::payload(
                    args.get("text").and_then(Value::as_str).unwrap_or_default(),
                ))
            },
        )
    }

    #[test]
    fn registry_keeps_registration_order_and_rejects_duplicates() {
        let registry = ToolRegistry::new()
            .with_tool(echo_tool("zeta"))
            .and_then(|registry| registry.with_tool(echo_tool("alpha")))
            .expect("register");
        assert_eq!(registry.names(), vec!["zeta", "alpha"]);

        let err = registry
            .clone()
            .with_tool(echo_tool("alpha"))
            .expect_err("duplicate");
        assert_eq!(
            err,
            RegistryError::DuplicateTool {
                name: "alpha".to_string()
            }
        );
    }

    #[test]
    fn registered_tool_is_callable_by_name() {
        let registry = ToolRegistry::new()
            .with_tool(echo_tool("echo"))
            .expect("register");
        let tool = registry.get("echo").expect("tool");
        let mut args = Map::new();
        args.insert("text".to_string(), Value::String("hi".to_string()));
        let output = tool.call(&args).expect("call");
        assert_eq!(output.content, "hi");
        assert!(registry.get("missing").is_none());
    }
}

use async_trait::async_trait;
use compat_core::{CompatError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod check_compat;

pub use check_compat::{CheckCompatArgs, CheckCompatTool};

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the arguments object
    fn schema(&self) -> Value;
    /// Run the tool and return its text payload.
    async fn execute(&self, args: Value) -> Result<String>;
}

/// Tools by name, listed in name order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(CompatError::ToolError {
                tool: name,
                message: "a tool with this name is already registered".into(),
            });
        }
        self.tools.insert(name, Arc::new(tool));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn get_all(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }
}

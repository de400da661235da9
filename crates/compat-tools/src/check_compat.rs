use async_trait::async_trait;
use compat_config::ToolSettings;
use compat_core::{CompatError, Result};
use compat_engine::CompatEngine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::Tool;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckCompatArgs {
    pub typescript_version: String,
    #[serde(default)]
    pub eslint_plugin_version: Option<String>,
}

/// Tool form of the engine: returns only the recommendation lines.
pub struct CheckCompatTool {
    engine: Arc<CompatEngine>,
    settings: ToolSettings,
}

impl CheckCompatTool {
    pub fn new(engine: Arc<CompatEngine>, settings: ToolSettings) -> Self {
        Self { engine, settings }
    }
}

#[async_trait]
impl Tool for CheckCompatTool {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn title(&self) -> &str {
        &self.settings.title
    }

    fn description(&self) -> &str {
        &self.settings.description
    }

    fn schema(&self) -> Value {
        let policy = self.engine.policy();
        json!({
            "type": "object",
            "properties": {
                "typescriptVersion": {
                    "type": "string",
                    "description": format!(
                        "Installed {} version, e.g. {}",
                        policy.primary_name, policy.primary_example
                    )
                },
                "eslintPluginVersion": {
                    "type": "string",
                    "description": format!(
                        "Installed {} dependency version (optional).",
                        policy.plugin_name
                    )
                }
            },
            "required": ["typescriptVersion"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: CheckCompatArgs = serde_json::from_value(args).map_err(|e| {
            CompatError::InvalidParams(format!("{}: {}", self.name(), e))
        })?;

        debug!(
            typescript = %args.typescript_version,
            plugin = ?args.eslint_plugin_version,
            "Checking compatibility"
        );

        let recommendation = self.engine.recommend(
            &args.typescript_version,
            args.eslint_plugin_version.as_deref(),
        );
        Ok(recommendation.text())
    }
}

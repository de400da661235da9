use compat_core::{CompatError, Result};
use compat_engine::{CompatEngine, CompatibilityRule, Policy, RuleSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod env_substitution;

pub use env_substitution::substitute_env_vars;

pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub resource: ResourceSettings,
    #[serde(default)]
    pub tool: ToolSettings,
    #[serde(default)]
    pub policy: Policy,
    /// Replaces the canonical tier table when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<CompatibilityRule>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_name")]
    pub name: String,
    #[serde(default = "default_server_version")]
    pub version: String,
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSettings {
    /// URI scheme of the resource template, `<scheme>://{typescriptVersion}`
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_resource_name")]
    pub name: String,
    #[serde(default = "default_resource_title")]
    pub title: String,
    #[serde(default = "default_resource_description")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_tool_name")]
    pub name: String,
    #[serde(default = "default_tool_title")]
    pub title: String,
    #[serde(default = "default_tool_description")]
    pub description: String,
}

impl AppConfig {
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CompatError::ConfigError(format!("Failed to read config file: {}", e)))?;

        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| CompatError::ConfigError(format!("Failed to parse YAML: {}", e)))?;

        // an empty document is a valid, all-defaults config
        if value.is_null() {
            value = Value::Object(Default::default());
        }

        substitute_env_vars(&mut value)?;

        let config: AppConfig = serde_json::from_value(value)
            .map_err(|e| CompatError::ConfigError(format!("Invalid configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else the default path when it exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading configuration from: {:?}", path);
            return Self::from_yaml(path);
        }

        let default_path = Self::default_config_path();
        if default_path.exists() {
            info!("Loading configuration from: {:?}", default_path);
            Self::from_yaml(&default_path)
        } else {
            info!("Using default configuration");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.name.trim().is_empty() {
            return Err(CompatError::ConfigError("Server name cannot be empty".into()));
        }
        if self.tool.name.trim().is_empty() {
            return Err(CompatError::ConfigError("Tool name cannot be empty".into()));
        }
        let scheme = &self.resource.scheme;
        let valid_scheme = scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !valid_scheme {
            return Err(CompatError::ConfigError(format!(
                "Invalid resource URI scheme: '{}'",
                scheme
            )));
        }
        self.policy.validate()?;
        self.rule_set()?;
        Ok(())
    }

    pub fn rule_set(&self) -> Result<RuleSet> {
        match &self.rules {
            Some(rules) => RuleSet::new(rules.clone()),
            None => Ok(RuleSet::canonical()),
        }
    }

    pub fn engine(&self) -> Result<CompatEngine> {
        CompatEngine::new(self.rule_set()?, self.policy.clone())
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| CompatError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    pub fn default_config_path() -> PathBuf {
        let home_dir = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home_dir)
            .join(".ts-eslint-compat")
            .join("config.yaml")
    }
}

impl ResourceSettings {
    pub fn uri_template(&self) -> String {
        format!("{}://{{typescriptVersion}}", self.scheme)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            version: default_server_version(),
            protocol_version: default_protocol_version(),
        }
    }
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            name: default_resource_name(),
            title: default_resource_title(),
            description: default_resource_description(),
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            name: default_tool_name(),
            title: default_tool_title(),
            description: default_tool_description(),
        }
    }
}

fn default_server_name() -> String { "ts-eslint-compat".to_string() }
fn default_server_version() -> String { env!("CARGO_PKG_VERSION").to_string() }
fn default_protocol_version() -> String { MCP_PROTOCOL_VERSION.to_string() }
fn default_scheme() -> String { "ts-eslint-compat".to_string() }
fn default_resource_name() -> String { "typescript-eslint-compat".to_string() }
fn default_resource_title() -> String { "TypeScript / @typescript-eslint compatibility".to_string() }
fn default_tool_name() -> String { "check-typescript-eslint-compat".to_string() }
fn default_tool_title() -> String { "Check @typescript-eslint compatibility".to_string() }

fn default_resource_description() -> String {
    "Explains which @typescript-eslint major versions support a given TypeScript release.".to_string()
}

fn default_tool_description() -> String {
    "Return guidance on aligning TypeScript and @typescript-eslint versions for linting.".to_string()
}

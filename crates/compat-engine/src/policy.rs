use compat_core::{CompatError, Result, SemanticVersion};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INSTALL_COMMAND: &str = "npm install --save-dev @typescript-eslint/eslint-plugin@^8.39.0 @typescript-eslint/parser@^8.39.0";

pub const DEFAULT_SUMMARY: &str = "@typescript-eslint v6.x officially supports TypeScript versions < 5.4. To use TypeScript 5.9.x, upgrade to the v8 line (>= 8.39.0) which advertises peer support for TypeScript < 6.0. Alternatively, keep v6 plugins and downgrade TypeScript to <= 5.3.x.";

/// Names, plugin thresholds and fixed text used when composing advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Display name of the primary toolchain
    pub primary_name: String,
    /// Display name of the plugin suite
    pub plugin_name: String,
    /// Example shown when the primary version cannot be parsed
    pub primary_example: SemanticVersion,
    /// Plugin majors at or below this are the legacy line
    pub legacy_plugin_major: u64,
    /// Plugin majors at or above this are the current line
    pub current_plugin_major: u64,
    /// Minimum plugin release of the current line to recommend
    pub recommended_plugin_version: SemanticVersion,
    pub install_command: String,
    /// Prose description of the tier policy, appended to resource reads
    pub summary: String,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            primary_name: "TypeScript".to_string(),
            plugin_name: "@typescript-eslint".to_string(),
            primary_example: SemanticVersion::new(5, 9, 2),
            legacy_plugin_major: 6,
            current_plugin_major: 8,
            recommended_plugin_version: SemanticVersion::new(8, 39, 0),
            install_command: DEFAULT_INSTALL_COMMAND.to_string(),
            summary: DEFAULT_SUMMARY.to_string(),
        }
    }
}

impl Policy {
    pub fn validate(&self) -> Result<()> {
        if self.primary_name.trim().is_empty() {
            return Err(CompatError::ConfigError("Primary name cannot be empty".into()));
        }
        if self.plugin_name.trim().is_empty() {
            return Err(CompatError::ConfigError("Plugin name cannot be empty".into()));
        }
        if self.install_command.trim().is_empty() {
            return Err(CompatError::ConfigError("Install command cannot be empty".into()));
        }
        if self.legacy_plugin_major >= self.current_plugin_major {
            return Err(CompatError::ConfigError(format!(
                "Legacy plugin major ({}) must be below the current plugin major ({})",
                self.legacy_plugin_major, self.current_plugin_major
            )));
        }
        if self.recommended_plugin_version.major() < self.current_plugin_major {
            return Err(CompatError::ConfigError(format!(
                "Recommended plugin version {} is not on the v{} line",
                self.recommended_plugin_version, self.current_plugin_major
            )));
        }
        Ok(())
    }
}

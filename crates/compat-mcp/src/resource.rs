//! Templated read-only resource: `<scheme>://{typescriptVersion}`

use compat_config::ResourceSettings;
use compat_core::{CompatError, Result};
use compat_engine::CompatEngine;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::types::{ReadResourceResult, ResourceContents, ResourceTemplateInfo};

pub const TYPESCRIPT_VERSION_PARAM: &str = "typescriptVersion";

const MIME_TYPE: &str = "text/plain";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// URI template with `{name}` placeholders (level 1 only).
#[derive(Debug, Clone)]
pub struct ResourceTemplate {
    template: String,
    segments: Vec<Segment>,
}

impl ResourceTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let close = rest[open..].find('}').ok_or_else(|| {
                CompatError::ConfigError(format!("Unclosed placeholder in URI template: {}", template))
            })? + open;
            let name = &rest[open + 1..close];
            if name.is_empty() {
                return Err(CompatError::ConfigError(format!(
                    "Empty placeholder in URI template: {}",
                    template
                )));
            }
            if matches!(segments.last(), Some(Segment::Variable(_))) {
                return Err(CompatError::ConfigError(format!(
                    "Adjacent placeholders in URI template: {}",
                    template
                )));
            }
            segments.push(Segment::Variable(name.to_string()));
            rest = &rest[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Extract percent-decoded variables from `uri`, or `None` if it does not
    /// fit the template. A variable extends to the next literal and is never empty.
    pub fn match_uri(&self, uri: &str) -> Option<HashMap<String, String>> {
        let mut vars = HashMap::new();
        let mut rest = uri;
        let mut iter = self.segments.iter().peekable();

        while let Some(segment) = iter.next() {
            match segment {
                Segment::Literal(lit) => {
                    rest = rest.strip_prefix(lit.as_str())?;
                }
                Segment::Variable(name) => {
                    let end = match iter.peek() {
                        Some(Segment::Literal(next)) => rest.find(next.as_str())?,
                        _ => rest.len(),
                    };
                    let raw = &rest[..end];
                    if raw.is_empty() {
                        return None;
                    }
                    let value = percent_decode_str(raw).decode_utf8().ok()?;
                    vars.insert(name.clone(), value.into_owned());
                    rest = &rest[end..];
                }
            }
        }

        rest.is_empty().then_some(vars)
    }
}

/// Resource form of the engine: detected version, recommendation and the
/// policy summary in one text payload.
pub struct CompatResource {
    engine: Arc<CompatEngine>,
    settings: ResourceSettings,
    template: ResourceTemplate,
}

impl CompatResource {
    pub fn new(engine: Arc<CompatEngine>, settings: ResourceSettings) -> Result<Self> {
        let template = ResourceTemplate::parse(&settings.uri_template())?;
        Ok(Self {
            engine,
            settings,
            template,
        })
    }

    pub fn template(&self) -> &ResourceTemplate {
        &self.template
    }

    pub fn info(&self) -> ResourceTemplateInfo {
        ResourceTemplateInfo {
            uri_template: self.template.as_str().to_string(),
            name: self.settings.name.clone(),
            title: Some(self.settings.title.clone()),
            description: Some(self.settings.description.clone()),
            mime_type: Some(MIME_TYPE.to_string()),
        }
    }

    pub fn read(&self, uri: &str) -> Result<ReadResourceResult> {
        let vars = self.template.match_uri(uri).ok_or_else(|| {
            CompatError::InvalidParams(format!(
                "Resource URI '{}' does not match template {}",
                uri,
                self.template.as_str()
            ))
        })?;
        let version = vars
            .get(TYPESCRIPT_VERSION_PARAM)
            .map(String::as_str)
            .unwrap_or_default();

        debug!("Reading compatibility resource for '{}'", version);

        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: Some(MIME_TYPE.to_string()),
                text: self.text_for(version),
            }],
        })
    }

    pub fn text_for(&self, typescript_version: &str) -> String {
        let recommendation = self.engine.recommend(typescript_version, None);
        let policy = self.engine.policy();
        let detected = recommendation
            .primary()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".to_string());

        format!(
            "{} version: {}\n\n{}\n\n{}",
            policy.primary_name,
            detected,
            recommendation.text(),
            policy.summary
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compat_engine::policy::DEFAULT_SUMMARY;

    fn resource() -> CompatResource {
        CompatResource::new(Arc::new(CompatEngine::default()), ResourceSettings::default()).unwrap()
    }

    #[test]
    fn test_template_matching() {
        let template = ResourceTemplate::parse("ts-eslint-compat://{typescriptVersion}").unwrap();
        let vars = template.match_uri("ts-eslint-compat://5.9.2").unwrap();
        assert_eq!(vars["typescriptVersion"], "5.9.2");

        let vars = template.match_uri("ts-eslint-compat://%5E5.4.0").unwrap();
        assert_eq!(vars["typescriptVersion"], "^5.4.0");

        assert!(template.match_uri("ts-eslint-compat://").is_none());
        assert!(template.match_uri("other://5.9.2").is_none());
    }

    #[test]
    fn test_template_with_suffix() {
        let template = ResourceTemplate::parse("compat://{a}/plugin/{b}").unwrap();
        let vars = template.match_uri("compat://5.9.2/plugin/8.39.0").unwrap();
        assert_eq!(vars["a"], "5.9.2");
        assert_eq!(vars["b"], "8.39.0");
        assert!(template.match_uri("compat://5.9.2/other/8").is_none());
    }

    #[test]
    fn test_bad_templates() {
        assert!(ResourceTemplate::parse("x://{open").is_err());
        assert!(ResourceTemplate::parse("x://{}").is_err());
        assert!(ResourceTemplate::parse("x://{a}{b}").is_err());
    }

    #[test]
    fn test_read_text_layout() {
        let result = resource().read("ts-eslint-compat://5.9.2").unwrap();
        assert_eq!(result.contents.len(), 1);
        let contents = &result.contents[0];
        assert_eq!(contents.uri, "ts-eslint-compat://5.9.2");
        assert_eq!(contents.mime_type.as_deref(), Some("text/plain"));

        let recommendation = CompatEngine::default().recommend("5.9.2", None).text();
        assert_eq!(
            contents.text,
            format!("TypeScript version: 5.9.2\n\n{recommendation}\n\n{DEFAULT_SUMMARY}")
        );
    }

    #[test]
    fn test_unparsable_version_reports_unknown() {
        let text = resource().text_for("next");
        assert!(text.starts_with("TypeScript version: unknown\n\nUnable to parse the TypeScript version."));
        assert!(text.ends_with(DEFAULT_SUMMARY));
    }

    #[test]
    fn test_read_rejects_foreign_uri() {
        let err = resource().read("file:///etc/passwd").unwrap_err();
        assert!(matches!(err, CompatError::InvalidParams(_)));
    }

    #[test]
    fn test_info() {
        let info = resource().info();
        assert_eq!(info.uri_template, "ts-eslint-compat://{typescriptVersion}");
        assert_eq!(info.name, "typescript-eslint-compat");
    }
}

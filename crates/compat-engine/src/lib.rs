//! Compatibility resolution between TypeScript and @typescript-eslint
//!
//! [`CompatEngine`] owns a validated [`RuleSet`] and a [`Policy`] and is the
//! single entry point used by every adapter, so the resource and the tool
//! always produce the same recommendation for the same input.

use compat_core::{parse_version, Result, SemanticVersion};

pub mod compose;
pub mod policy;
pub mod rules;

pub use compose::{AdvisoryKind, CompatibilityReport, PluginFinding, RecommendationComposer};
pub use policy::Policy;
pub use rules::{CompatibilityRule, RuleSet, RuleSetBuilder, Tier, CANONICAL_RULES};

/// Stateless engine. Cheap to share behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct CompatEngine {
    rules: RuleSet,
    policy: Policy,
}

impl CompatEngine {
    pub fn new(rules: RuleSet, policy: Policy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { rules, policy })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn composer(&self) -> RecommendationComposer<'_> {
        RecommendationComposer::new(&self.rules, &self.policy)
    }

    /// Compose advice for raw version strings. A blank plugin version counts
    /// as not supplied.
    pub fn recommend(&self, typescript: &str, plugin: Option<&str>) -> Recommendation {
        let primary = parse_version(typescript);
        let secondary = plugin
            .filter(|raw| !raw.trim().is_empty())
            .map(parse_version);

        let (report, lines) = self.composer().compose(&primary, secondary.as_ref());
        Recommendation { report, lines }
    }
}

/// Ordered advisory lines for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    report: Option<CompatibilityReport>,
    lines: Vec<String>,
}

impl Recommendation {
    /// `None` when the TypeScript version could not be parsed.
    pub fn report(&self) -> Option<&CompatibilityReport> {
        self.report.as_ref()
    }

    pub fn primary(&self) -> Option<&SemanticVersion> {
        self.report.as_ref().map(CompatibilityReport::primary)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

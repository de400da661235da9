//! Recommendation composition
//!
//! Evaluation and rendering are separate steps: [`RecommendationComposer::evaluate`]
//! builds a [`CompatibilityReport`] from parsed versions, and
//! [`RecommendationComposer::render`] turns that report into advisory lines.
//! The order of lines is fixed: detected TypeScript version, tier advice,
//! plugin findings, then the install command.

use compat_core::{ParseOutcome, SemanticVersion};
use tracing::debug;

use crate::policy::Policy;
use crate::rules::{RuleSet, Tier};

/// Warning raised by comparing the plugin's major line against the primary tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryKind {
    /// Legacy plugin line, but TypeScript is past what it supports.
    PluginTooOld,
    /// Current plugin line, but TypeScript is past what any line supports.
    PluginAheadOfSupport,
}

/// What was learned about a plugin version the caller supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginFinding {
    Unparsable,
    Detected {
        version: SemanticVersion,
        advisory: Option<AdvisoryKind>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityReport {
    primary: SemanticVersion,
    tier: Tier,
    plugin: Option<PluginFinding>,
}

impl CompatibilityReport {
    pub fn primary(&self) -> &SemanticVersion {
        &self.primary
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn plugin(&self) -> Option<&PluginFinding> {
        self.plugin.as_ref()
    }
}

pub struct RecommendationComposer<'a> {
    rules: &'a RuleSet,
    policy: &'a Policy,
}

impl<'a> RecommendationComposer<'a> {
    pub fn new(rules: &'a RuleSet, policy: &'a Policy) -> Self {
        Self { rules, policy }
    }

    pub fn evaluate(
        &self,
        primary: &SemanticVersion,
        secondary: Option<&ParseOutcome>,
    ) -> CompatibilityReport {
        let tier = self.rules.tier_for(primary);
        let plugin = secondary.map(|outcome| match outcome {
            ParseOutcome::Parsed(version) => PluginFinding::Detected {
                version: version.clone(),
                advisory: self.advisory_for(version, tier),
            },
            ParseOutcome::Unparsable => PluginFinding::Unparsable,
        });

        debug!(primary = %primary, tier = %tier, ?plugin, "Evaluated compatibility");

        CompatibilityReport {
            primary: primary.clone(),
            tier,
            plugin,
        }
    }

    /// Both checks look at the primary tier. A plugin major between the two
    /// thresholds gets no advisory.
    fn advisory_for(&self, plugin: &SemanticVersion, tier: Tier) -> Option<AdvisoryKind> {
        if plugin.major() <= self.policy.legacy_plugin_major && tier != Tier::SupportedCurrent {
            Some(AdvisoryKind::PluginTooOld)
        } else if plugin.major() >= self.policy.current_plugin_major && tier == Tier::Unsupported {
            Some(AdvisoryKind::PluginAheadOfSupport)
        } else {
            None
        }
    }

    pub fn render(&self, report: &CompatibilityReport) -> Vec<String> {
        let p = self.policy;
        let mut lines = Vec::with_capacity(5);

        lines.push(format!("Detected {} {}.", p.primary_name, report.primary));

        lines.push(match report.tier {
            Tier::SupportedCurrent => format!(
                "{} v{} is within the supported range. No action required unless you want newer rules.",
                p.plugin_name, p.legacy_plugin_major
            ),
            Tier::SupportedUpcoming => format!(
                "Install {} packages at >={} to get official support for this {} release.",
                p.plugin_name, p.recommended_plugin_version, p.primary_name
            ),
            Tier::Unsupported => format!(
                "No published {} version currently lists this {} release as supported. Monitor upstream for updates.",
                p.plugin_name, p.primary_name
            ),
        });

        match &report.plugin {
            None => {}
            Some(PluginFinding::Unparsable) => lines.push(format!(
                "Unable to parse the {} version. Provide a semantic version such as {}.",
                p.plugin_name, p.recommended_plugin_version
            )),
            Some(PluginFinding::Detected { version, advisory }) => {
                lines.push(format!("Detected {} version {}.", p.plugin_name, version));
                match advisory {
                    Some(AdvisoryKind::PluginTooOld) => lines.push(format!(
                        "Your {} version is too old for the detected {} release. Upgrade to the v{} line.",
                        p.plugin_name, p.primary_name, p.current_plugin_major
                    )),
                    Some(AdvisoryKind::PluginAheadOfSupport) => lines.push(format!(
                        "Even the latest {} versions may not support this {} release yet. Expect warnings until upstream updates.",
                        p.plugin_name, p.primary_name
                    )),
                    None => {}
                }
            }
        }

        lines.push(format!("Key commands: {}", p.install_command));
        lines
    }

    /// Advice for an unparsable primary version. Nothing else is emitted.
    pub fn unparsable_primary(&self) -> String {
        format!(
            "Unable to parse the {} version. Provide a semantic version such as {}.",
            self.policy.primary_name, self.policy.primary_example
        )
    }

    /// Returns the report (absent when the primary is unparsable) and the
    /// rendered lines.
    pub fn compose(
        &self,
        primary: &ParseOutcome,
        secondary: Option<&ParseOutcome>,
    ) -> (Option<CompatibilityReport>, Vec<String>) {
        match primary {
            ParseOutcome::Unparsable => (None, vec![self.unparsable_primary()]),
            ParseOutcome::Parsed(version) => {
                let report = self.evaluate(version, secondary);
                let lines = self.render(&report);
                (Some(report), lines)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compat_core::parse_version;

    fn compose(primary: &str, secondary: Option<&str>) -> Vec<String> {
        let rules = RuleSet::canonical();
        let policy = Policy::default();
        let composer = RecommendationComposer::new(&rules, &policy);
        let secondary = secondary.map(parse_version);
        composer.compose(&parse_version(primary), secondary.as_ref()).1
    }

    fn advisory(primary: &str, plugin: &str) -> Option<AdvisoryKind> {
        let rules = RuleSet::canonical();
        let policy = Policy::default();
        let composer = RecommendationComposer::new(&rules, &policy);
        let primary = parse_version(primary).into_version().unwrap();
        let report = composer.evaluate(&primary, Some(&parse_version(plugin)));
        match report.plugin() {
            Some(PluginFinding::Detected { advisory, .. }) => *advisory,
            other => panic!("unexpected finding: {other:?}"),
        }
    }

    #[test]
    fn test_unparsable_primary_is_single_line() {
        let lines = compose("not-a-version", Some("8.39.0"));
        assert_eq!(
            lines,
            vec!["Unable to parse the TypeScript version. Provide a semantic version such as 5.9.2."]
        );
    }

    #[test]
    fn test_line_order() {
        let lines = compose("5.9.2", Some("6.5.0"));
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Detected TypeScript 5.9.2.");
        assert!(lines[1].starts_with("Install @typescript-eslint packages"));
        assert_eq!(lines[2], "Detected @typescript-eslint version 6.5.0.");
        assert!(lines[3].starts_with("Your @typescript-eslint version is too old"));
        assert!(lines[4].starts_with("Key commands: "));
    }

    #[test]
    fn test_tier_lines() {
        assert!(compose("5.2.0", None)[1].contains("No action required"));
        assert!(compose("5.4.0", None)[1].contains(">=8.39.0"));
        assert!(compose("6.1.0", None)[1].starts_with("No published @typescript-eslint version"));
    }

    #[test]
    fn test_advisory_matrix() {
        // legacy line
        assert_eq!(advisory("5.3.0", "6.21.0"), None);
        assert_eq!(advisory("5.9.2", "6.5.0"), Some(AdvisoryKind::PluginTooOld));
        assert_eq!(advisory("6.0.0", "5.62.0"), Some(AdvisoryKind::PluginTooOld));
        // current line
        assert_eq!(advisory("5.2.0", "8.39.0"), None);
        assert_eq!(advisory("5.9.2", "8.39.0"), None);
        assert_eq!(advisory("6.0.1", "8.39.0"), Some(AdvisoryKind::PluginAheadOfSupport));
        // major 7 sits between the thresholds
        assert_eq!(advisory("5.9.2", "7.18.0"), None);
        assert_eq!(advisory("6.0.1", "7.18.0"), None);
    }

    #[test]
    fn test_unparsable_plugin_keeps_primary_lines() {
        let lines = compose("5.2.0", Some("latest"));
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Detected TypeScript 5.2.0.");
        assert_eq!(
            lines[2],
            "Unable to parse the @typescript-eslint version. Provide a semantic version such as 8.39.0."
        );
        assert!(lines[3].starts_with("Key commands: "));
    }

    #[test]
    fn test_custom_policy_wording() {
        let rules = RuleSet::canonical();
        let policy = Policy {
            primary_name: "TS".into(),
            install_command: "pnpm add -D typescript-eslint@^8".into(),
            ..Policy::default()
        };
        let composer = RecommendationComposer::new(&rules, &policy);
        let (_, lines) = composer.compose(&parse_version("5.0"), None);
        assert_eq!(lines[0], "Detected TS 5.0.0.");
        assert_eq!(lines.last().unwrap(), "Key commands: pnpm add -D typescript-eslint@^8");
    }
}

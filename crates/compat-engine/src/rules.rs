//! Ordered version-range table mapping a TypeScript version to a support tier

use compat_core::{CompatError, Result, SemanticVersion};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse support classification of a TypeScript release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Covered by the legacy plugin line.
    SupportedCurrent,
    /// Covered only by the newer plugin line.
    SupportedUpcoming,
    /// No published plugin line covers it.
    Unsupported,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::SupportedCurrent => "supported_current",
            Tier::SupportedUpcoming => "supported_upcoming",
            Tier::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open range `[from, until)` assigned to a tier. `until: None` is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityRule {
    #[serde(rename = "from", default = "zero_version")]
    pub lower_inclusive: SemanticVersion,
    #[serde(rename = "until", default, skip_serializing_if = "Option::is_none")]
    pub upper_exclusive: Option<SemanticVersion>,
    pub tier: Tier,
}

fn zero_version() -> SemanticVersion {
    SemanticVersion::new(0, 0, 0)
}

impl CompatibilityRule {
    pub const fn bounded(lower: SemanticVersion, upper: SemanticVersion, tier: Tier) -> Self {
        Self {
            lower_inclusive: lower,
            upper_exclusive: Some(upper),
            tier,
        }
    }

    pub const fn unbounded(lower: SemanticVersion, tier: Tier) -> Self {
        Self {
            lower_inclusive: lower,
            upper_exclusive: None,
            tier,
        }
    }

    pub fn contains(&self, version: &SemanticVersion) -> bool {
        if version < &self.lower_inclusive {
            return false;
        }
        match &self.upper_exclusive {
            Some(upper) => version < upper,
            None => true,
        }
    }
}

impl fmt::Display for CompatibilityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.upper_exclusive {
            Some(upper) => write!(f, "{} <= v < {}", self.lower_inclusive, upper),
            None => write!(f, "v >= {}", self.lower_inclusive),
        }
    }
}

/// TypeScript ranges advertised by the @typescript-eslint v6 and v8 lines.
pub static CANONICAL_RULES: [CompatibilityRule; 3] = [
    CompatibilityRule::bounded(
        SemanticVersion::new(0, 0, 0),
        SemanticVersion::new(5, 4, 0),
        Tier::SupportedCurrent,
    ),
    CompatibilityRule::bounded(
        SemanticVersion::new(5, 4, 0),
        SemanticVersion::new(6, 0, 0),
        Tier::SupportedUpcoming,
    ),
    CompatibilityRule::unbounded(SemanticVersion::new(6, 0, 0), Tier::Unsupported),
];

/// A validated, gap-free rule table. First matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<CompatibilityRule>,
    tail: Tier,
}

impl RuleSet {
    /// Validate that `rules` cover every version exactly once, starting at
    /// `0.0.0` and ending with an unbounded rule.
    pub fn new(rules: Vec<CompatibilityRule>) -> Result<Self> {
        let Some(last) = rules.last() else {
            return Err(CompatError::InvalidRuleSet("rule table is empty".into()));
        };
        let tail = last.tier;

        let mut expected_lower = zero_version();
        let final_idx = rules.len() - 1;
        for (idx, rule) in rules.iter().enumerate() {
            let position = idx + 1;
            if rule.lower_inclusive != expected_lower {
                return Err(CompatError::InvalidRuleSet(format!(
                    "rule {position} starts at {} but the previous range ends at {expected_lower}",
                    rule.lower_inclusive
                )));
            }
            match (&rule.upper_exclusive, idx == final_idx) {
                (Some(upper), false) => {
                    if upper <= &rule.lower_inclusive {
                        return Err(CompatError::InvalidRuleSet(format!(
                            "rule {position} has an empty range ({rule})"
                        )));
                    }
                    expected_lower = upper.clone();
                }
                (None, true) => {}
                (Some(upper), true) => {
                    return Err(CompatError::InvalidRuleSet(format!(
                        "final rule must be unbounded but ends at {upper}"
                    )));
                }
                (None, false) => {
                    return Err(CompatError::InvalidRuleSet(format!(
                        "rule {position} is unbounded but is not the final rule"
                    )));
                }
            }
        }

        Ok(Self { rules, tail })
    }

    pub fn canonical() -> Self {
        Self::new(CANONICAL_RULES.to_vec()).expect("canonical rule table is total")
    }

    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::new()
    }

    /// Tier of the first rule containing `version`.
    pub fn tier_for(&self, version: &SemanticVersion) -> Tier {
        self.rules
            .iter()
            .find(|rule| rule.contains(version))
            .map(|rule| rule.tier)
            .unwrap_or(self.tail)
    }

    pub fn rules(&self) -> &[CompatibilityRule] {
        &self.rules
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Builds a contiguous table from successive upper bounds.
///
/// ```
/// use compat_core::SemanticVersion;
/// use compat_engine::{RuleSet, Tier};
///
/// let rules = RuleSet::builder()
///     .until(SemanticVersion::new(5, 4, 0), Tier::SupportedCurrent)
///     .until(SemanticVersion::new(6, 0, 0), Tier::SupportedUpcoming)
///     .rest(Tier::Unsupported)
///     .unwrap();
/// assert_eq!(rules, RuleSet::canonical());
/// ```
#[derive(Debug, Clone)]
pub struct RuleSetBuilder {
    rules: Vec<CompatibilityRule>,
    next_lower: SemanticVersion,
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            next_lower: zero_version(),
        }
    }

    pub fn until(mut self, upper: SemanticVersion, tier: Tier) -> Self {
        let lower = std::mem::replace(&mut self.next_lower, upper.clone());
        self.rules.push(CompatibilityRule::bounded(lower, upper, tier));
        self
    }

    pub fn rest(mut self, tier: Tier) -> Result<RuleSet> {
        self.rules
            .push(CompatibilityRule::unbounded(self.next_lower, tier));
        RuleSet::new(self.rules)
    }
}

impl Default for RuleSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

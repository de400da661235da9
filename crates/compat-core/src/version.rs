//! Loose semantic version parsing and comparison
//!
//! Installed toolchain versions arrive in many spellings (`5.9.2`, `v5.9`,
//! `^8.39.0`, `typescript@5.3.3`). [`parse_version`] coerces all of them into a
//! canonical [`SemanticVersion`]. Ordering only looks at `major.minor.patch`;
//! a prerelease tag is kept for display but never affects comparison.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::CompatError;

// First run of digits, then up to two more dotted components. A prerelease is
// only recognised right after a complete major.minor.patch.
static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)(?:\.(\d+)(?:\.(\d+)(?:-([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?)?)?")
        .expect("Invalid regex pattern")
});

/// A canonical `major.minor.patch[-prerelease]` version.
#[derive(Debug, Clone)]
pub struct SemanticVersion {
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: Option<String>,
}

impl SemanticVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        self.prerelease = Some(prerelease.into());
        self
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn prerelease(&self) -> Option<&str> {
        self.prerelease.as_deref()
    }

    fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.triple() == other.triple()
    }
}

impl Eq for SemanticVersion {}

impl Hash for SemanticVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.triple().hash(state);
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple().cmp(&other.triple())
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

/// Result of coercing a raw string into a version.
///
/// `Unparsable` is an ordinary outcome: callers turn it into guidance text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(SemanticVersion),
    Unparsable,
}

impl ParseOutcome {
    pub fn version(&self) -> Option<&SemanticVersion> {
        match self {
            ParseOutcome::Parsed(version) => Some(version),
            ParseOutcome::Unparsable => None,
        }
    }

    pub fn into_version(self) -> Option<SemanticVersion> {
        match self {
            ParseOutcome::Parsed(version) => Some(version),
            ParseOutcome::Unparsable => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }
}

/// Coerce `raw` into a [`SemanticVersion`].
///
/// The first digit run is the major; missing minor and patch become zero.
/// Anything after the recognised version is ignored.
pub fn parse_version(raw: &str) -> ParseOutcome {
    let Some(caps) = VERSION_REGEX.captures(raw) else {
        return ParseOutcome::Unparsable;
    };

    let component = |idx: usize| -> Option<u64> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let (Some(major), Some(minor), Some(patch)) = (component(1), component(2), component(3))
    else {
        return ParseOutcome::Unparsable;
    };

    let version = SemanticVersion::new(major, minor, patch);
    match caps.get(4) {
        Some(pre) => ParseOutcome::Parsed(version.with_prerelease(pre.as_str())),
        None => ParseOutcome::Parsed(version),
    }
}

impl FromStr for SemanticVersion {
    type Err = CompatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_version(s)
            .into_version()
            .ok_or_else(|| CompatError::UnparsableVersion(s.to_string()))
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct VersionVisitor;

impl serde::de::Visitor<'_> for VersionVisitor {
    type Value = SemanticVersion;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a version string such as \"5.4.0\" or a bare major number")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    // `6` in YAML is an integer; `5.4` is a float and must be quoted
    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(SemanticVersion::new(v, 0, 0))
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(VersionVisitor)
    }
}

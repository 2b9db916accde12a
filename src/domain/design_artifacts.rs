use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::RequirementId;

/// Maps requirements to the design artifact that realises them.
///
/// Lookup order:
/// 1. an exact entry for the requirement identifier
/// 2. the first fallback rule whose prefix matches
/// 3. the default placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignArtifacts {
    /// Placeholder used when nothing else matches.
    #[serde(default = "default_placeholder")]
    pub default: String,

    /// Artifacts for individual requirements, keyed by identifier.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exact: BTreeMap<String, String>,

    /// Prefix rules, tried in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback: Vec<FallbackRule>,
}

/// A prefix-based design artifact rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRule {
    /// Identifier prefix, such as `FR-2.1` or `FR-CT`.
    pub prefix: String,
    /// The artifact for every requirement under the prefix.
    pub artifact: String,
}

impl FallbackRule {
    /// Whether the rule covers `id`.
    ///
    /// The prefix must end on a component boundary, so `FR-2.1` covers
    /// `FR-2.1.4` but not `FR-2.10.1`.
    #[must_use]
    pub fn matches(&self, id: &str) -> bool {
        id.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['.', '-']))
    }
}

impl Default for DesignArtifacts {
    fn default() -> Self {
        Self {
            default: default_placeholder(),
            exact: BTreeMap::new(),
            fallback: Vec::new(),
        }
    }
}

impl DesignArtifacts {
    /// Returns the design artifact for a requirement.
    #[must_use]
    pub fn lookup(&self, id: &RequirementId) -> &str {
        let key = id.to_string();
        if let Some(artifact) = self.exact.get(&key) {
            return artifact;
        }
        self.fallback
            .iter()
            .find(|rule| rule.matches(&key))
            .map_or(self.default.as_str(), |rule| rule.artifact.as_str())
    }
}

fn default_placeholder() -> String {
    "See DDD".to_string()
}

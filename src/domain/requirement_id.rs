use std::{fmt, str::FromStr, sync::LazyLock};

use non_empty_string::NonEmptyString;
use regex::{Captures, Regex};

/// Regex fragment matching a single requirement identifier.
///
/// Capture groups: `category`, `section`, `suffix`.
pub(crate) const ID_PATTERN: &str =
    r"(?P<category>[A-Z]{2,3}(?:-[A-Z]+)*)-(?P<section>\d+(?:\.\d+)*)(?P<suffix>[a-z])?";

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b{ID_PATTERN}(?P<more>(?:/\d+(?:\.\d+)*[a-z]?)*)"
    ))
    .expect("valid requirement reference regex")
});

static EXACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{ID_PATTERN}$")).expect("valid requirement id regex")
});

static SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<section>\d+(?:\.\d+)*)(?P<suffix>[a-z])?$").expect("valid section regex")
});

/// A requirement identifier.
///
/// Format: `{CATEGORY}-{SECTION}{SUFFIX?}`, where:
/// - `CATEGORY` is a two or three letter uppercase prefix, optionally followed
///   by further dash-separated uppercase segments (`FR`, `NFR`, `FR-CT`)
/// - `SECTION` is a dotted sequence of numbers (`2.3.1`)
/// - `SUFFIX` is an optional single lowercase letter (`2.3.1a`)
///
/// Identifiers order by category, then numerically by section (so `FR-2.9`
/// sorts before `FR-2.10`), then by suffix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequirementId {
    category: NonEmptyString,
    section: Vec<u32>,
    suffix: Option<char>,
}

impl RequirementId {
    /// Returns the category prefix, such as `FR`, `NFR` or `FR-CT`.
    #[must_use]
    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    /// Returns the numeric section components.
    #[must_use]
    pub fn section(&self) -> &[u32] {
        &self.section
    }

    /// Returns the trailing letter, if any.
    #[must_use]
    pub const fn suffix(&self) -> Option<char> {
        self.suffix
    }

    /// Builds an identifier sharing this one's category with a different
    /// section, as written in compound references like `FR-2.3.2/2.3.3`.
    fn sibling(&self, section: &str) -> Result<Self, Error> {
        let caps = SECTION
            .captures(section)
            .ok_or_else(|| Error::Syntax(format!("{}-{section}", self.category())))?;
        Ok(Self {
            category: self.category.clone(),
            section: parse_section(&caps["section"])?,
            suffix: suffix(&caps),
        })
    }

    fn from_captures(caps: &Captures<'_>) -> Result<Self, Error> {
        let category = NonEmptyString::new(caps["category"].to_string())
            .map_err(|_| Error::Syntax(caps[0].to_string()))?;
        Ok(Self {
            category,
            section: parse_section(&caps["section"])?,
            suffix: suffix(caps),
        })
    }
}

fn suffix(caps: &Captures<'_>) -> Option<char> {
    caps.name("suffix").and_then(|m| m.as_str().chars().next())
}

fn parse_section(section: &str) -> Result<Vec<u32>, Error> {
    section
        .split('.')
        .map(|part| {
            part.parse::<u32>()
                .map_err(|_| Error::Section(section.to_string()))
        })
        .collect()
}

impl fmt::Display for RequirementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-", self.category())?;
        for (index, part) in self.section.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            write!(f, "{part}")?;
        }
        if let Some(suffix) = self.suffix {
            write!(f, "{suffix}")?;
        }
        Ok(())
    }
}

/// Errors that can occur when parsing a requirement identifier.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The text does not have the shape of a requirement identifier.
    #[error("Invalid requirement identifier: {0}")]
    Syntax(String),

    /// A section component does not fit in a number.
    #[error("Invalid section number in requirement identifier: {0}")]
    Section(String),
}

impl FromStr for RequirementId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = EXACT
            .captures(s.trim())
            .ok_or_else(|| Error::Syntax(s.to_string()))?;
        Self::from_captures(&caps)
    }
}

/// Finds requirement identifiers in free text.
///
/// If `allowed_categories` is empty, every category is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementPattern {
    allowed_categories: Vec<String>,
}

impl RequirementPattern {
    /// Creates a pattern restricted to the given categories.
    #[must_use]
    pub const fn new(allowed_categories: Vec<String>) -> Self {
        Self { allowed_categories }
    }

    /// Checks if a category is accepted by this pattern.
    #[must_use]
    pub fn is_category_allowed(&self, category: &str) -> bool {
        self.allowed_categories.is_empty() || self.allowed_categories.iter().any(|c| c == category)
    }

    /// Returns every identifier referenced in `text`, in order of appearance.
    ///
    /// Compound references share their category across the slash-separated
    /// parts: `FR-2.3.2/2.3.3` yields `FR-2.3.2` and `FR-2.3.3`, and
    /// `FR-CT-1.2/1.3` yields `FR-CT-1.2` and `FR-CT-1.3`.
    #[must_use]
    pub fn find_all(&self, text: &str) -> Vec<RequirementId> {
        let mut found = Vec::new();
        for caps in REFERENCE.captures_iter(text) {
            if !self.is_category_allowed(&caps["category"]) {
                continue;
            }
            let first = match RequirementId::from_captures(&caps) {
                Ok(id) => id,
                Err(e) => {
                    tracing::debug!("Skipping requirement reference: {e}");
                    continue;
                }
            };
            let siblings: Vec<_> = caps
                .name("more")
                .map_or("", |m| m.as_str())
                .split('/')
                .filter(|part| !part.is_empty())
                .filter_map(|part| match first.sibling(part) {
                    Ok(id) => Some(id),
                    Err(e) => {
                        tracing::debug!("Skipping compound requirement part: {e}");
                        None
                    }
                })
                .collect();
            found.push(first);
            found.extend(siblings);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn id(s: &str) -> RequirementId {
        s.parse().unwrap()
    }

    #[test_case("FR-2.3.1", "FR", &[2, 3, 1], None; "three part section")]
    #[test_case("NFR-3.1", "NFR", &[3, 1], None; "three letter category")]
    #[test_case("FR-CT-1.2", "FR-CT", &[1, 2], None; "multi segment category")]
    #[test_case("FR-2.4.1a", "FR", &[2, 4, 1], Some('a'); "letter suffix")]
    #[test_case("DDD-7", "DDD", &[7], None; "single number")]
    fn parses(input: &str, category: &str, section: &[u32], suffix: Option<char>) {
        let parsed = id(input);
        assert_eq!(parsed.category(), category);
        assert_eq!(parsed.section(), section);
        assert_eq!(parsed.suffix(), suffix);
        assert_eq!(parsed.to_string(), input);
    }

    #[test_case(""; "empty")]
    #[test_case("FR"; "no section")]
    #[test_case("F-1.2"; "category too short")]
    #[test_case("fr-1.2"; "lowercase category")]
    #[test_case("FR-1.2."; "trailing dot")]
    #[test_case("FR-2.3.2/2.3.3"; "compound")]
    fn rejects(input: &str) {
        assert!(matches!(
            input.parse::<RequirementId>(),
            Err(Error::Syntax(_))
        ));
    }

    #[test]
    fn oversized_section_is_rejected() {
        assert!(matches!(
            "FR-99999999999.1".parse::<RequirementId>(),
            Err(Error::Section(_))
        ));
    }

    #[test]
    fn ordering_is_numeric() {
        let mut ids = vec![id("FR-2.10.1"), id("FR-2.9.1"), id("FR-2.9"), id("FR-2.9.1a")];
        ids.sort();
        let sorted: Vec<_> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, ["FR-2.9", "FR-2.9.1", "FR-2.9.1a", "FR-2.10.1"]);
    }

    #[test]
    fn finds_references_in_prose() {
        let found = RequirementPattern::default().find_all("Covers FR-2.1.1, NFR-3.2 and FR-CT-1.4.");
        let found: Vec<_> = found.iter().map(ToString::to_string).collect();
        assert_eq!(found, ["FR-2.1.1", "NFR-3.2", "FR-CT-1.4"]);
    }

    #[test]
    fn compound_reference_is_split() {
        let found = RequirementPattern::default().find_all("FR-2.3.2/2.3.3");
        assert_eq!(found, vec![id("FR-2.3.2"), id("FR-2.3.3")]);
    }

    #[test]
    fn compound_reference_keeps_full_category() {
        let found = RequirementPattern::default().find_all("FR-CT-1.2/1.3/1.4b");
        assert_eq!(found, vec![id("FR-CT-1.2"), id("FR-CT-1.3"), id("FR-CT-1.4b")]);
    }

    #[test]
    fn disallowed_categories_are_ignored() {
        let pattern = RequirementPattern::new(vec!["FR".to_string()]);
        let found = pattern.find_all("FR-1.1 NFR-2.2 DDD-3");
        assert_eq!(found, vec![id("FR-1.1")]);
    }
}

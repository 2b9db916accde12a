//! Requirement-to-test traceability.
//!
//! The mapping is built from two documents: the requirements specification,
//! which lists requirements as `* **FR-2.1.1 (Title):** ...`, and the test
//! plan, whose test case tables name the requirements each test covers. The
//! mapping then either rewrites the test column of an existing matrix or
//! produces a fresh one.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::LazyLock,
};

use regex::Regex;

use super::{
    DesignArtifacts, RequirementId, RequirementPattern, TableOptions,
    markup::{self, CELL_FENCE},
    requirement_id::ID_PATTERN,
    test_table,
};

/// How far below a `Test Case ID` row the `Requirement Covered` row may be.
const REQUIREMENT_LOOKAHEAD: usize = 10;

const LABEL_TEST_ID: &str = "Test Case ID";
const LABEL_REQUIREMENT: &str = "Requirement Covered";

static REQUIREMENT_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?m)^[ \t]*\*+[ \t]+\*\*(?P<id>{ID_PATTERN})[ \t]*\((?P<title>.*?)\):"
    ))
    .expect("valid requirement item regex")
});

static MATRIX_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\| \*\*([A-Za-z0-9./-]+)\*\* \| ([^|]+?) \| ([^|]+?) \|(?: ([^|]*))?$")
        .expect("valid matrix row regex")
});

/// A mapping from requirements to the test cases that cover them.
///
/// Each requirement maps to an ordered set, so a test case is recorded at
/// most once per requirement however often the test plan mentions it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traceability {
    tests: BTreeMap<RequirementId, BTreeSet<String>>,
}

impl Traceability {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `test_id` covers `requirement`.
    ///
    /// Returns `false` if the pair was already recorded.
    pub fn insert(&mut self, requirement: RequirementId, test_id: impl Into<String>) -> bool {
        self.tests
            .entry(requirement)
            .or_default()
            .insert(test_id.into())
    }

    /// Records every requirement referenced in `requirement_text` as covered by
    /// `test_id`.
    fn insert_references(
        &mut self,
        test_id: &str,
        requirement_text: &str,
        pattern: &RequirementPattern,
    ) {
        let found = pattern.find_all(requirement_text);
        if found.is_empty() {
            tracing::debug!(test_id, requirement_text, "no requirement identifiers found");
        }
        for requirement in found {
            self.insert(requirement, test_id);
        }
    }

    /// The test cases covering `requirement`, sorted and deduplicated.
    pub fn tests_for(&self, requirement: &RequirementId) -> impl Iterator<Item = &str> {
        self.tests
            .get(requirement)
            .into_iter()
            .flat_map(|tests| tests.iter().map(String::as_str))
    }

    /// The number of requirements with at least one test case.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Whether no requirement has a test case.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// The total number of requirement/test case pairs.
    #[must_use]
    pub fn mappings(&self) -> usize {
        self.tests.values().map(BTreeSet::len).sum()
    }
}

/// Extracts requirements and their titles from a requirements specification.
///
/// Requirements are list items of the form `* **FR-2.1.1 (Title):** ...`.
/// When an identifier appears more than once, the first title wins.
#[must_use]
pub fn extract_requirements(
    text: &str,
    pattern: &RequirementPattern,
) -> BTreeMap<RequirementId, String> {
    let mut requirements = BTreeMap::new();
    for caps in REQUIREMENT_ITEM.captures_iter(text) {
        if !pattern.is_category_allowed(&caps["category"]) {
            continue;
        }
        match caps["id"].parse::<RequirementId>() {
            Ok(id) => {
                requirements
                    .entry(id)
                    .or_insert_with(|| caps["title"].trim().to_string());
            }
            Err(e) => tracing::debug!("Skipping requirement: {e}"),
        }
    }
    requirements
}

/// Splits the label/value row of a stacked table at `index` into its label
/// and value.
///
/// A row holding only the label takes its value from the first cell of the
/// next row, as in tables written one cell per line.
fn labelled_row<'a>(lines: &[&'a str], index: usize) -> Option<(&'a str, &'a str)> {
    let line = *lines.get(index)?;
    if !markup::is_table_row(line) {
        return None;
    }
    let cells = markup::cells(line);
    let label = markup::strip_bold(cells.first()?);
    let value = match cells.get(1) {
        Some(value) => *value,
        None => lines
            .get(index + 1)
            .copied()
            .filter(|next| markup::is_table_row(next))
            .and_then(|next| markup::cells(next).first().copied())
            .unwrap_or_default(),
    };
    Some((label, value))
}

/// Builds the requirement-to-test mapping from a test plan.
///
/// Both stacked test case tables (a `Test Case ID` row followed within ten
/// lines by a `Requirement Covered` row) and wide tables that have not been
/// converted yet are read.
#[must_use]
pub fn extract_test_references(
    text: &str,
    options: &TableOptions,
    pattern: &RequirementPattern,
) -> Traceability {
    let mut traceability = Traceability::new();
    let lines: Vec<&str> = text.lines().collect();

    for index in 0..lines.len() {
        let Some((LABEL_TEST_ID, value)) = labelled_row(&lines, index) else {
            continue;
        };
        let test_id = markup::strip_bold(value);
        if !options.is_test_id(test_id) {
            continue;
        }

        let requirement = (index + 1..lines.len())
            .take(REQUIREMENT_LOOKAHEAD)
            .filter_map(|next| labelled_row(&lines, next))
            .take_while(|(label, _)| *label != LABEL_TEST_ID)
            .find(|(label, _)| *label == LABEL_REQUIREMENT);

        match requirement {
            Some((_, requirement)) => {
                traceability.insert_references(test_id, requirement, pattern);
            }
            None => tracing::debug!(test_id, "test case has no requirement row"),
        }
    }

    for table in test_table::parse_test_tables(text, options) {
        for case in &table.records {
            traceability.insert_references(case.id(), case.requirement(), pattern);
        }
    }

    traceability
}

/// The result of [`update_matrix`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixUpdate {
    /// The rewritten matrix.
    pub text: String,
    /// Rows recognised as requirement rows.
    pub rows_matched: usize,
    /// Rows whose text actually changed.
    pub rows_changed: usize,
}

/// Rewrites the test case column of every requirement row in a matrix.
///
/// Rows have the form `| **ID** | summary | design artifact | tests`, where
/// the tests column may be empty. Every other line, including rows with a
/// different number of columns or an unparseable identifier, is copied
/// byte-for-byte.
#[must_use]
pub fn update_matrix(text: &str, traceability: &Traceability) -> MatrixUpdate {
    let mut output = String::with_capacity(text.len());
    let mut rows_matched = 0;
    let mut rows_changed = 0;

    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let terminator = &line[content.len()..];

        let Some(caps) = MATRIX_ROW.captures(content.trim_end()) else {
            output.push_str(line);
            continue;
        };
        let id = match caps[1].parse::<RequirementId>() {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!("Leaving matrix row unchanged: {e}");
                output.push_str(line);
                continue;
            }
        };

        rows_matched += 1;
        let rewritten = matrix_row(&caps[1], &caps[2], &caps[3], traceability.tests_for(&id));
        if rewritten != content {
            rows_changed += 1;
        }
        output.push_str(&rewritten);
        output.push_str(terminator);
    }

    MatrixUpdate {
        text: output,
        rows_matched,
        rows_changed,
    }
}

fn matrix_row<'a>(
    id: &str,
    summary: &str,
    artifact: &str,
    tests: impl Iterator<Item = &'a str>,
) -> String {
    let tests = tests.collect::<Vec<_>>().join(", ");
    format!("{CELL_FENCE} **{id}** {CELL_FENCE} {summary} {CELL_FENCE} {artifact} {CELL_FENCE} {tests}")
        .trim_end()
        .to_string()
}

/// Builds a complete traceability matrix section.
///
/// Requirements appear in identifier order; design artifacts come from
/// [`DesignArtifacts::lookup`].
#[must_use]
pub fn generate_matrix(
    requirements: &BTreeMap<RequirementId, String>,
    traceability: &Traceability,
    artifacts: &DesignArtifacts,
) -> String {
    let mut lines = vec![
        "== Requirements Traceability Matrix".to_string(),
        String::new(),
        r#"[cols="1, 3, 2, 1", options="header", grid="all"]"#.to_string(),
        markup::TABLE_DELIMITER.to_string(),
        "^.^| SRS ID ^.^| Requirement Summary ^.^| Design Artifact (DDD Section) ^.^| Test Case IDs"
            .to_string(),
        String::new(),
    ];
    for (id, title) in requirements {
        lines.push(matrix_row(
            &id.to_string(),
            title,
            artifacts.lookup(id),
            traceability.tests_for(id),
        ));
    }
    lines.push(markup::TABLE_DELIMITER.to_string());

    let mut matrix = lines.join("\n");
    matrix.push('\n');
    matrix
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::FallbackRule;

    fn id(s: &str) -> RequirementId {
        s.parse().unwrap()
    }

    fn tests_for(traceability: &Traceability, requirement: &str) -> Vec<String> {
        traceability
            .tests_for(&id(requirement))
            .map(ToString::to_string)
            .collect()
    }

    const SRS: &str = "\
== Functional Requirements

* **FR-2.1.1 (Open Book):** The reader shall open a book.
* **FR-2.10.1 (Find in Page):** The reader shall search a page.
* **FR-2.9.1 (Document Search):** The reader shall search documents.
* **FR-2.1.1 (Duplicate):** Ignored.
  ** **NFR-3.1 (Import Speed (bulk)):** Imports are fast.
* FR-9.9 (Not bold): ignored.
";

    const PLAN: &str = "\
=== Verification

[cols=\"1,4\"]
|===
| **Test Case ID** | **T-001**
| **Requirement Covered** | FR-2.3.2/2.3.3
| Test Steps a|
. open
| Expected Result (Acceptance Criteria) | AC: ok
|===

[cols=\"1,4\"]
|===
| Test Case ID | T-002
| Requirement Covered | FR-2.3.2, NFR-3.1
|===

[cols=\"1,4\"]
|===
| Test Case ID | T-003
| Test Steps | none
|===

[cols=\"1,4\"]
|===
| Test Case ID | T-004
| Requirement Covered | FR-CT-1.2/1.3
|===
";

    #[test]
    fn requirements_are_extracted_in_identifier_order() {
        let requirements = extract_requirements(SRS, &RequirementPattern::default());
        let ids: Vec<_> = requirements.keys().map(ToString::to_string).collect();
        assert_eq!(ids, ["FR-2.1.1", "FR-2.9.1", "FR-2.10.1", "NFR-3.1"]);
        assert_eq!(requirements[&id("FR-2.1.1")], "Open Book");
        assert_eq!(requirements[&id("NFR-3.1")], "Import Speed (bulk)");
    }

    #[test]
    fn requirement_extraction_honours_categories() {
        let pattern = RequirementPattern::new(vec!["NFR".to_string()]);
        let requirements = extract_requirements(SRS, &pattern);
        assert_eq!(requirements.len(), 1);
    }

    #[test]
    fn compound_references_map_independently() {
        let traceability =
            extract_test_references(PLAN, &TableOptions::default(), &RequirementPattern::default());
        assert_eq!(tests_for(&traceability, "FR-2.3.2"), ["T-001", "T-002"]);
        assert_eq!(tests_for(&traceability, "FR-2.3.3"), ["T-001"]);
        assert_eq!(tests_for(&traceability, "NFR-3.1"), ["T-002"]);
        assert_eq!(tests_for(&traceability, "FR-CT-1.3"), ["T-004"]);
    }

    #[test]
    fn counts_requirements_and_mappings() {
        let traceability =
            extract_test_references(PLAN, &TableOptions::default(), &RequirementPattern::default());
        assert_eq!(traceability.len(), 5);
        assert_eq!(traceability.mappings(), 6);
    }

    #[test]
    fn requirement_row_must_precede_next_test_case() {
        let plan = "| Test Case ID | T-001\n| Test Case ID | T-002\n| Requirement Covered | FR-1.1\n";
        let traceability =
            extract_test_references(plan, &TableOptions::default(), &RequirementPattern::default());
        assert_eq!(tests_for(&traceability, "FR-1.1"), ["T-002"]);
    }

    #[test]
    fn requirement_row_beyond_lookahead_is_ignored() {
        let padding = "| Test Steps | step\n".repeat(REQUIREMENT_LOOKAHEAD);
        let plan = format!("| Test Case ID | T-001\n{padding}| Requirement Covered | FR-1.1\n");
        let traceability =
            extract_test_references(&plan, &TableOptions::default(), &RequirementPattern::default());
        assert!(traceability.is_empty());
    }

    #[test]
    fn one_cell_per_line_tables_are_read() {
        let plan = "[cols=\"1,4\"]\n|===\n| **Test Case ID**\n| **T-001**\n| **Requirement Covered**\n| FR-2.3.1/2.3.2\n| **Test Steps**\na| . open\n|===\n";
        let traceability =
            extract_test_references(plan, &TableOptions::default(), &RequirementPattern::default());
        assert_eq!(tests_for(&traceability, "FR-2.3.1"), ["T-001"]);
        assert_eq!(tests_for(&traceability, "FR-2.3.2"), ["T-001"]);
        assert_eq!(traceability.mappings(), 2);
    }

    #[test]
    fn wide_tables_are_read_too() {
        let plan = "[cols=\"1,1,1,1\"]\n|===\n| Test Case ID | Requirement | Steps | Expected\n| **T-009** | FR-4.1/4.2 a|\n. step | AC: ok\n|===\n";
        let traceability =
            extract_test_references(plan, &TableOptions::default(), &RequirementPattern::default());
        assert_eq!(tests_for(&traceability, "FR-4.1"), ["T-009"]);
        assert_eq!(tests_for(&traceability, "FR-4.2"), ["T-009"]);
    }

    #[test]
    fn duplicate_pairs_are_stored_once() {
        let mut traceability = Traceability::new();
        assert!(traceability.insert(id("FR-1.1"), "T-002"));
        assert!(traceability.insert(id("FR-1.1"), "T-001"));
        assert!(!traceability.insert(id("FR-1.1"), "T-002"));
        assert_eq!(tests_for(&traceability, "FR-1.1"), ["T-001", "T-002"]);
        assert_eq!(traceability.mappings(), 2);
    }

    fn mapping() -> Traceability {
        let mut traceability = Traceability::new();
        traceability.insert(id("FR-2.3.2"), "T-002");
        traceability.insert(id("FR-2.3.2"), "T-001");
        traceability.insert(id("NFR-3.1"), "T-005");
        traceability
    }

    #[test]
    fn update_rewrites_test_column() {
        let matrix = "| **FR-2.3.2** | Verify | Sec 6.4 | T-999\n| **NFR-3.1** | Speed | Sec 4.1 |\n| **FR-9.9** | Unused | See DDD | T-1\n";
        let update = update_matrix(matrix, &mapping());
        assert_eq!(
            update.text,
            "| **FR-2.3.2** | Verify | Sec 6.4 | T-001, T-002\n| **NFR-3.1** | Speed | Sec 4.1 | T-005\n| **FR-9.9** | Unused | See DDD |\n"
        );
        assert_eq!(update.rows_matched, 3);
        assert_eq!(update.rows_changed, 3);
    }

    #[test]
    fn up_to_date_rows_are_not_counted_as_changed() {
        let matrix = "| **NFR-3.1** | Speed | Sec 4.1 | T-005\n";
        let update = update_matrix(matrix, &mapping());
        assert_eq!(update.text, matrix);
        assert_eq!(update.rows_matched, 1);
        assert_eq!(update.rows_changed, 0);
    }

    #[test_case("| **FR-2.3.2** | Verify | Sec 6.4 | T-1 | extra\n"; "too many columns")]
    #[test_case("| **FR-2.3.2** | Verify | Sec 6.4\n"; "too few columns")]
    #[test_case("| **fr-2.3.2** | Verify | Sec 6.4 | T-1\n"; "lowercase category")]
    #[test_case("| **FR-2.3.2/2.3.3** | Verify | Sec 6.4 | T-1\n"; "unparseable id")]
    #[test_case("^.^| SRS ID ^.^| Summary ^.^| Artifact ^.^| Tests  \n"; "header row")]
    #[test_case("Prose with | pipes |\r\n"; "prose")]
    fn other_lines_pass_through_byte_for_byte(line: &str) {
        let update = update_matrix(line, &mapping());
        assert_eq!(update.text, line);
        assert_eq!(update.rows_matched, 0);
    }

    #[test]
    fn line_terminators_are_preserved() {
        let matrix = "|===\r\n| **NFR-3.1** | Speed | Sec 4.1 |\r\n|===";
        let update = update_matrix(matrix, &mapping());
        assert_eq!(
            update.text,
            "|===\r\n| **NFR-3.1** | Speed | Sec 4.1 | T-005\r\n|==="
        );
    }

    #[test]
    fn generates_complete_matrix() {
        let requirements = BTreeMap::from([
            (id("NFR-3.1"), "Import Speed".to_string()),
            (id("FR-2.10.1"), "Find in Page".to_string()),
            (id("FR-2.3.2"), "Verify".to_string()),
        ]);
        let artifacts = DesignArtifacts {
            fallback: vec![FallbackRule {
                prefix: "FR-2.3".to_string(),
                artifact: "Sec 6.4 (Verification)".to_string(),
            }],
            ..DesignArtifacts::default()
        };

        let matrix = generate_matrix(&requirements, &mapping(), &artifacts);

        assert_eq!(
            matrix,
            r#"== Requirements Traceability Matrix

[cols="1, 3, 2, 1", options="header", grid="all"]
|===
^.^| SRS ID ^.^| Requirement Summary ^.^| Design Artifact (DDD Section) ^.^| Test Case IDs

| **FR-2.3.2** | Verify | Sec 6.4 (Verification) | T-001, T-002
| **FR-2.10.1** | Find in Page | See DDD |
| **NFR-3.1** | Import Speed | See DDD | T-005
|===
"#
        );
    }

    #[test]
    fn generated_matrix_can_be_updated() {
        let requirements = BTreeMap::from([
            (id("FR-2.3.2"), "Verify".to_string()),
            (id("FR-2.4.1a"), "Suffixed".to_string()),
        ]);
        let matrix = generate_matrix(&requirements, &Traceability::new(), &DesignArtifacts::default());
        let mut traceability = mapping();
        traceability.insert(id("FR-2.4.1a"), "T-007");

        let update = update_matrix(&matrix, &traceability);
        assert_eq!(update.rows_matched, 2);
        assert_eq!(update.rows_changed, 2);
        assert!(update.text.contains("| **FR-2.3.2** | Verify | See DDD | T-001, T-002\n"));
        assert!(update.text.contains("| **FR-2.4.1a** | Suffixed | See DDD | T-007\n"));
    }
}

//! Wide test case tables and their conversion to stacked tables.
//!
//! A wide table describes one test case per row:
//!
//! ```text
//! [cols="1,2,4,3", options="header"]
//! |===
//! ^.^| Test Case ID ^.^| Requirement ^.^| Steps ^.^| Expected Result
//!
//! | **T-001** | FR-2.3.1 | a|
//! 1. open the book
//! 2. tamper with the file
//! 3. reopen | **AC: a warning is shown**
//! |===
//! ```
//!
//! Each record becomes a two-column label/value table, which renders far
//! better than four narrow columns once the step lists grow.

use std::ops::Range;

use non_empty_string::NonEmptyString;

use super::markup::{self, CELL_STYLES, Token};

/// The header literal that identifies a test case table.
const HEADER: &str = "Test Case ID";

/// Number of lines after the column directive searched for [`HEADER`].
const HEADER_LOOKAHEAD: usize = 3;

/// Marks the acceptance criteria that start the expected result cell.
const ACCEPTANCE: &str = "AC:";

const LABEL_ID: &str = "Test Case ID";
const LABEL_REQUIREMENT: &str = "Requirement Covered";
const LABEL_STEPS: &str = "Test Steps";
const LABEL_EXPECTED: &str = "Expected Result (Acceptance Criteria)";

/// Options controlling how test case tables are recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    id_prefix: String,
    id_marker: String,
}

impl TableOptions {
    /// Creates options for test case identifiers with the given prefix.
    ///
    /// A prefix of `T` recognises records whose first cell is `**T-...**`.
    #[must_use]
    pub fn new(id_prefix: &str) -> Self {
        Self {
            id_prefix: id_prefix.to_string(),
            id_marker: format!("**{id_prefix}-"),
        }
    }

    /// Whether `value` is a test case identifier, such as `T-001`.
    #[must_use]
    pub fn is_test_id(&self, value: &str) -> bool {
        value
            .strip_prefix(self.id_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .is_some_and(|code| !code.is_empty() && !code.contains(char::is_whitespace))
    }

    /// Whether `line` opens a new test case record.
    #[must_use]
    pub fn is_record_start(&self, line: &str) -> bool {
        markup::is_table_row(line) && line.contains(&self.id_marker)
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        Self::new("T")
    }
}

/// One row of a wide test case table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    id: NonEmptyString,
    requirement: String,
    steps: Vec<String>,
    expected: Vec<String>,
}

impl TestCase {
    /// The test case identifier, without bold markers.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// The requirement reference text, such as `FR-2.3.2/2.3.3`.
    #[must_use]
    pub fn requirement(&self) -> &str {
        &self.requirement
    }

    /// The step lines, verbatim apart from trailing whitespace.
    #[must_use]
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// The expected result lines; empty when no acceptance criteria were
    /// found. Blank lines inside a multi-line result are kept.
    #[must_use]
    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// Renders the record as a two-column label/value table.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![
            r#"[cols="1,4"]"#.to_string(),
            markup::TABLE_DELIMITER.to_string(),
            row(LABEL_ID, self.id()),
            row(LABEL_REQUIREMENT, &self.requirement),
        ];

        let steps = trim_blank_lines(&self.steps);
        if steps.is_empty() {
            lines.push(row(LABEL_STEPS, ""));
        } else {
            lines.push(format!("| {LABEL_STEPS} a|"));
            lines.extend(steps.iter().cloned());
        }

        match trim_blank_lines(&self.expected) {
            [] => lines.push(row(LABEL_EXPECTED, "")),
            [single] => lines.push(row(LABEL_EXPECTED, single)),
            many => {
                lines.push(format!("| {LABEL_EXPECTED} a|"));
                lines.extend(many.iter().cloned());
            }
        }

        lines.push(markup::TABLE_DELIMITER.to_string());
        lines
    }
}

fn row(label: &str, value: &str) -> String {
    format!("| {label} | {value}").trim_end().to_string()
}

fn trim_blank_lines(lines: &[String]) -> &[String] {
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);
    &lines[start..end]
}

/// A wide test case table located in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideTable {
    /// Line indices covered by the table, from the column directive up to and
    /// including the closing delimiter.
    pub lines: Range<usize>,
    /// The parsed records, in document order.
    pub records: Vec<TestCase>,
}

/// Which cell of the current record absorbs continuation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Steps,
    Expected,
}

/// A record under construction.
#[derive(Debug)]
struct Draft {
    case: TestCase,
    cell: Cell,
}

impl Draft {
    /// Starts a record from its first row.
    ///
    /// The row holds the identifier, the requirement reference, an optional
    /// cell-style directive, and possibly the first step. A row with a single
    /// cell belongs to a stacked table and starts nothing.
    fn start(line: &str) -> Option<Self> {
        let cells = markup::cells(line);
        let id = markup::strip_bold(cells.first()?);
        let id = NonEmptyString::new(id.to_string()).ok()?;
        let requirement = strip_style_directive(cells.get(1)?).to_string();

        let mut draft = Self {
            case: TestCase {
                id,
                requirement,
                steps: Vec::new(),
                expected: Vec::new(),
            },
            cell: Cell::Steps,
        };

        let rest: Vec<&str> = cells
            .iter()
            .skip(2)
            .copied()
            .skip_while(|cell| is_style_directive(cell))
            .collect();
        let rest = rest.join(" | ");
        if !rest.trim().is_empty() {
            draft.absorb(&rest);
        }
        Some(draft)
    }

    fn absorb(&mut self, line: &str) {
        match self.cell {
            Cell::Steps => {
                if let Some((step, expected)) = split_acceptance(line) {
                    let step = step.trim();
                    if !step.is_empty() {
                        self.case.steps.push(step.to_string());
                    }
                    self.case.expected.push(expected.trim().to_string());
                    self.cell = Cell::Expected;
                } else {
                    self.case.steps.push(line.trim_end().to_string());
                }
            }
            Cell::Expected => {
                let line = line.trim();
                let line = line.strip_suffix(markup::CELL_FENCE).map_or(line, str::trim_end);
                self.case.expected.push(line.to_string());
            }
        }
    }

    fn finish(mut self) -> TestCase {
        while self.case.expected.last().is_some_and(String::is_empty) {
            self.case.expected.pop();
        }
        self.case
    }
}

/// Splits a line at the first fence whose cell opens with the acceptance
/// criteria marker (`AC:`, optionally bold).
///
/// Returns `None` when no cell on the line opens with the marker.
fn split_acceptance(line: &str) -> Option<(String, String)> {
    let tokens = markup::tokenize(line);
    let fence = tokens.windows(2).position(|pair| match pair {
        [Token::Fence, Token::Text(text)] => opens_acceptance(text),
        _ => false,
    })?;
    Some((concat(&tokens[..fence]), concat(&tokens[fence + 1..])))
}

fn opens_acceptance(cell: &str) -> bool {
    let cell = cell.trim_start();
    cell.strip_prefix("**").unwrap_or(cell).starts_with(ACCEPTANCE)
}

fn concat(tokens: &[Token<'_>]) -> String {
    tokens
        .iter()
        .map(|token| match token {
            Token::Fence => "|",
            Token::Text(text) => text,
        })
        .collect()
}

fn is_style_directive(cell: &str) -> bool {
    let mut chars = cell.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if CELL_STYLES.contains(&c))
}

/// Removes a trailing cell-style directive (`FR-2.3.1 a` → `FR-2.3.1`).
///
/// The directive must be separated by whitespace, so a requirement suffix
/// such as `FR-2.3.1a` is kept.
fn strip_style_directive(cell: &str) -> &str {
    let cell = cell.trim();
    match cell.rsplit_once(char::is_whitespace) {
        Some((head, last)) if is_style_directive(last) => head.trim_end(),
        _ => cell,
    }
}

/// Parser states, one per phase of a table region.
#[derive(Debug)]
enum State {
    /// Looking for a column directive followed by the header literal.
    Seeking,
    /// Inside a candidate region, waiting for the opening delimiter.
    AwaitOpen { start: usize },
    /// After the opening delimiter, skipping the header row and blank lines.
    Header { start: usize, header_seen: bool },
    /// Collecting records until the closing delimiter.
    Rows {
        start: usize,
        records: Vec<TestCase>,
        current: Option<Draft>,
    },
}

/// Locates every wide test case table in `text` and parses its records.
///
/// Regions that never close, or that contain no records, are not returned.
#[must_use]
pub fn parse_test_tables(text: &str, options: &TableOptions) -> Vec<WideTable> {
    let lines: Vec<&str> = text.split('\n').collect();
    parse_lines(&lines, options)
}

fn opens_region(lines: &[&str], index: usize) -> bool {
    lines[index].contains("cols=")
        && lines
            .iter()
            .skip(index + 1)
            .take(HEADER_LOOKAHEAD)
            .any(|line| line.contains(HEADER))
}

fn parse_lines(lines: &[&str], options: &TableOptions) -> Vec<WideTable> {
    let mut tables = Vec::new();
    let mut state = State::Seeking;

    for (index, &line) in lines.iter().enumerate() {
        state = match state {
            State::Seeking if opens_region(lines, index) => State::AwaitOpen { start: index },
            State::Seeking => State::Seeking,

            State::AwaitOpen { start } if markup::is_table_delimiter(line) => State::Header {
                start,
                header_seen: false,
            },
            State::AwaitOpen { start } if index - start > HEADER_LOOKAHEAD => {
                tracing::debug!(line = start + 1, "test case table never opened");
                State::Seeking
            }
            State::AwaitOpen { start } => State::AwaitOpen { start },

            State::Header { start, header_seen } => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    State::Header { start, header_seen }
                } else if !header_seen && (trimmed.contains(HEADER) || trimmed.starts_with("^.^")) {
                    State::Header {
                        start,
                        header_seen: true,
                    }
                } else {
                    rows(start, Vec::new(), None, line, index, options, &mut tables)
                }
            }

            State::Rows {
                start,
                records,
                current,
            } => rows(start, records, current, line, index, options, &mut tables),
        };
    }

    if !matches!(state, State::Seeking) {
        tracing::debug!("test case table not closed before end of document");
    }

    tables
}

/// Advances the `Rows` state by one line.
fn rows(
    start: usize,
    mut records: Vec<TestCase>,
    mut current: Option<Draft>,
    line: &str,
    index: usize,
    options: &TableOptions,
    tables: &mut Vec<WideTable>,
) -> State {
    if markup::is_table_delimiter(line) {
        records.extend(current.take().map(Draft::finish));
        if records.is_empty() {
            tracing::debug!(line = start + 1, "test case table has no records");
        } else {
            tables.push(WideTable {
                lines: start..index + 1,
                records,
            });
        }
        return State::Seeking;
    }

    if options.is_record_start(line) {
        records.extend(current.take().map(Draft::finish));
        current = Draft::start(line);
    } else if let Some(draft) = current.as_mut() {
        draft.absorb(line);
    }

    State::Rows {
        start,
        records,
        current,
    }
}

/// The result of [`convert_test_tables`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The rewritten text.
    pub text: String,
    /// How many wide tables were replaced.
    pub tables: usize,
    /// The converted records, in document order.
    pub test_cases: Vec<TestCase>,
}

/// Replaces every wide test case table in `text` with one stacked table per
/// record.
///
/// Everything outside recognised tables is copied unchanged.
#[must_use]
pub fn convert_test_tables(text: &str, options: &TableOptions) -> Conversion {
    let lines: Vec<&str> = text.split('\n').collect();
    let tables = parse_lines(&lines, options);

    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut cursor = 0;
    let mut test_cases = Vec::new();

    for table in &tables {
        output.extend(lines[cursor..table.lines.start].iter().map(ToString::to_string));
        for case in &table.records {
            if output.last().is_some_and(|l| !l.trim().is_empty()) {
                output.push(String::new());
            }
            output.extend(case.render());
        }
        if lines
            .get(table.lines.end)
            .is_some_and(|l| !l.trim().is_empty())
        {
            output.push(String::new());
        }
        cursor = table.lines.end;
        test_cases.extend(table.records.iter().cloned());
    }
    output.extend(lines[cursor..].iter().map(ToString::to_string));

    Conversion {
        text: output.join("\n"),
        tables: tables.len(),
        test_cases,
    }
}

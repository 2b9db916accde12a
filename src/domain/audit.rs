//! Finds list items that are not separated from the preceding paragraph.
//!
//! `AsciiDoc` only starts a list when the opener follows a blank line (or
//! another list item). An opener glued to a paragraph renders as running text.

use std::str::Lines;

use serde::Serialize;

use super::markup::{self, CONTINUATION, ListKind};

/// Maximum length of the preceding-line excerpt carried by an issue.
const CONTEXT_WIDTH: usize = 60;

/// A list opener that immediately follows a non-blank line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListIssue {
    /// 1-based line number of the list item.
    pub line: usize,
    /// The kind of list the item opens.
    pub kind: ListKind,
    /// Excerpt of the preceding line.
    pub context: String,
}

/// Audits `text` for list openers missing a preceding blank line.
///
/// The returned iterator is lazy and borrows the text; call `audit` again to
/// restart the scan.
#[must_use]
pub fn audit(text: &str) -> Audit<'_> {
    Audit {
        lines: text.lines(),
        previous: None,
        line_number: 0,
        in_table: false,
        block: None,
    }
}

/// Lazy scan produced by [`audit`].
#[derive(Debug, Clone)]
pub struct Audit<'a> {
    lines: Lines<'a>,
    previous: Option<&'a str>,
    line_number: usize,
    in_table: bool,
    /// The delimiter of the enclosing listing or literal block.
    block: Option<&'a str>,
}

impl<'a> Audit<'a> {
    fn inspect(&mut self, line: &'a str) -> Option<ListIssue> {
        if let Some(open) = self.block {
            if line.trim_end() == open {
                self.block = None;
            }
            return None;
        }
        if markup::is_table_delimiter(line) {
            self.in_table = !self.in_table;
            return None;
        }
        if self.in_table {
            return None;
        }
        if markup::is_block_delimiter(line) {
            self.block = Some(line.trim_end());
            return None;
        }

        let marker = markup::list_marker(line)?;
        if marker.is_nested() {
            return None;
        }

        let previous = self.previous?.trim();
        if previous.is_empty()
            || markup::is_list_item(previous)
            || markup::is_table_row(previous)
            || markup::is_block_title(previous)
            || markup::is_block_attribute(previous)
            || previous.ends_with(CONTINUATION)
        {
            return None;
        }

        Some(ListIssue {
            line: self.line_number,
            kind: marker.kind,
            context: markup::excerpt(previous, CONTEXT_WIDTH),
        })
    }
}

impl Iterator for Audit<'_> {
    type Item = ListIssue;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(line) = self.lines.next() {
            self.line_number += 1;
            let issue = self.inspect(line);
            self.previous = Some(line);
            if issue.is_some() {
                return issue;
            }
        }
        None
    }
}

//! `AsciiDoc` line classification.
//!
//! These helpers look at one line at a time and answer whether it opens a
//! list item, fences a table or block, or carries table cells.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

/// The cell separator in `AsciiDoc` tables.
pub const CELL_FENCE: char = '|';

/// The delimiter that opens and closes an `AsciiDoc` table.
pub const TABLE_DELIMITER: &str = "|===";

/// The trailing marker that attaches the next line to a list item.
pub const CONTINUATION: char = '+';

/// The cell-style directives `AsciiDoc` accepts before a cell fence.
pub const CELL_STYLES: &[char] = &['a', 'd', 'e', 'h', 'l', 'm', 's', 'v'];

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)(?:(\*+)|(\.+)|(\d+|[a-z])\.)[ \t]+\S").expect("valid list regex")
});

/// The kind of list a line opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// `* item`, `** item`
    Bullet,
    /// `. item`, `.. item` (implicitly numbered)
    Numbered,
    /// `1. item` or `a. item`
    NumberedDigit,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bullet => "bullet",
            Self::Numbered => "numbered",
            Self::NumberedDigit => "numbered_digit",
        };
        f.write_str(label)
    }
}

/// A list opener recognised at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    /// Which list syntax opened the item.
    pub kind: ListKind,
    /// Columns of leading whitespace before the marker.
    pub indent: usize,
    /// Whether the marker is a single letter (`a.`) rather than digits.
    pub lettered: bool,
}

impl ListMarker {
    /// Whether this item continues a nested list rather than starting one.
    ///
    /// Indented lettered items and numbered items indented by three or more
    /// columns belong to an enclosing list.
    #[must_use]
    pub const fn is_nested(&self) -> bool {
        match self.kind {
            ListKind::NumberedDigit if self.lettered => self.indent > 0,
            ListKind::NumberedDigit => self.indent >= 3,
            ListKind::Bullet | ListKind::Numbered => false,
        }
    }
}

/// Classifies the list opener at the start of `line`, if any.
#[must_use]
pub fn list_marker(line: &str) -> Option<ListMarker> {
    let caps = LIST_MARKER.captures(line)?;
    let indent = caps.get(1).map_or(0, |m| m.as_str().len());

    let (kind, lettered) = if caps.get(2).is_some() {
        (ListKind::Bullet, false)
    } else if caps.get(3).is_some() {
        (ListKind::Numbered, false)
    } else {
        let ordinal = caps.get(4).map_or("", |m| m.as_str());
        (
            ListKind::NumberedDigit,
            ordinal.chars().all(|c| c.is_ascii_lowercase()),
        )
    };

    Some(ListMarker {
        kind,
        indent,
        lettered,
    })
}

/// Whether `line` opens a list item.
#[must_use]
pub fn is_list_item(line: &str) -> bool {
    list_marker(line).is_some()
}

/// Whether `line` is a block title such as `.Supported formats`.
///
/// The title binds to the block below it, so the two must not be separated.
#[must_use]
pub fn is_block_title(line: &str) -> bool {
    line.strip_prefix('.')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| !c.is_whitespace() && c != '.')
}

/// Whether `line` is a block attribute list such as `[square]`.
#[must_use]
pub fn is_block_attribute(line: &str) -> bool {
    let line = line.trim();
    line.len() > 2 && line.starts_with('[') && line.ends_with(']')
}

/// Whether `line` opens or closes a table.
#[must_use]
pub fn is_table_delimiter(line: &str) -> bool {
    line.trim_start().starts_with(TABLE_DELIMITER)
}

/// Whether `line` opens or closes a delimited literal or listing block.
#[must_use]
pub fn is_block_delimiter(line: &str) -> bool {
    let line = line.trim_end();
    line == "```" || is_repeated(line, '-') || is_repeated(line, '.')
}

fn is_repeated(line: &str, c: char) -> bool {
    line.len() >= 4 && line.chars().all(|ch| ch == c)
}

/// Whether the trimmed `line` starts with a cell fence.
#[must_use]
pub fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with(CELL_FENCE)
}

/// A piece of a table line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A cell fence (`|`).
    Fence,
    /// Text between fences, untrimmed.
    Text(&'a str),
}

/// Splits a line into fences and the text between them.
///
/// Empty text between adjacent fences is not emitted.
///
/// ```
/// use docsmith::domain::markup::{Token, tokenize};
///
/// assert_eq!(
///     tokenize("| a |b"),
///     vec![Token::Fence, Token::Text(" a "), Token::Fence, Token::Text("b")]
/// );
/// ```
#[must_use]
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for (index, c) in line.char_indices() {
        if c == CELL_FENCE {
            if index > start {
                tokens.push(Token::Text(&line[start..index]));
            }
            tokens.push(Token::Fence);
            start = index + c.len_utf8();
        }
    }
    if start < line.len() {
        tokens.push(Token::Text(&line[start..]));
    }
    tokens
}

/// Splits a table row into its cells.
///
/// Text before the first fence is discarded, each cell is trimmed, and the
/// text after the last fence is kept as the final cell (empty when the row
/// ends with a fence).
#[must_use]
pub fn cells(line: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut current: Option<&str> = None;
    for token in tokenize(line) {
        match token {
            Token::Fence => {
                if let Some(cell) = current.take() {
                    cells.push(cell.trim());
                }
                current = Some("");
            }
            Token::Text(text) => {
                if current.is_some() {
                    current = Some(text);
                }
            }
        }
    }
    if let Some(cell) = current {
        cells.push(cell.trim());
    }
    cells
}

/// Removes bold markers (`**`) from a cell value.
#[must_use]
pub fn strip_bold(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix("**")
        .and_then(|v| v.strip_suffix("**"))
        .map_or(value, str::trim)
}

/// Truncates `text` to `max` characters, appending `...` when shortened.
#[must_use]
pub fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

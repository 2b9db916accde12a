//! Coloured counts and hints for command summaries
//!
//! A count is coloured by what it reports: amber for problems found in the
//! documents, red for files that could not be processed, green for work done.
//! Zero is never highlighted. Colour is dropped when stdout cannot show it.

use std::fmt::Display;

use owo_colors::{OwoColorize, colors::css};

fn colors_enabled() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// What a count in a summary line reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    /// Work carried out, such as fixes applied or rows rewritten.
    Done,
    /// Problems found in the documents.
    Found,
    /// Files that could not be read or written.
    Failed,
}

impl Tally {
    /// Renders `count` in this tally's colour.
    pub fn paint(self, count: usize) -> String {
        let text = count.to_string();
        if count == 0 || !colors_enabled() {
            return text;
        }
        match self {
            Self::Done => text.fg::<css::Green>().to_string(),
            Self::Found => text.fg::<css::Orange>().to_string(),
            Self::Failed => text.fg::<css::Red>().to_string(),
        }
    }
}

/// Highlights the outcome of a command, such as `Created`.
pub fn outcome(text: impl Display) -> String {
    if colors_enabled() {
        text.fg::<css::Green>().to_string()
    } else {
        text.to_string()
    }
}

/// Dims secondary detail and next-step hints.
pub fn hint(text: impl Display) -> String {
    if colors_enabled() {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

//! Inserts the blank line `AsciiDoc` needs before a list.
//!
//! The fixer is a sequence of textual rewrite rules, each pairing a kind of
//! triggering line (bold run, colon-terminated sentence, section heading, code
//! fence) with a kind of list opener. Rules run in a fixed order, each over
//! the output of the previous one.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::markup;

/// A line ending in a bold run.
const BOLD_LEAD: &str = r"[^\r\n]*\*\*[^*\r\n]+\*\*[ \t]*";
/// A sentence starting with a capital and ending at its only colon.
const COLON_LEAD: &str = r"[A-Z][^:\r\n]+:";
/// A section heading of level one or deeper.
const HEADING_LEAD: &str = r"={2,}[ \t]+[^\r\n]+";
/// A listing or fenced code delimiter.
const FENCE_LEAD: &str = r"(?:----|```)";

const BULLET_ITEM: &str = r"[ \t]*\*+[ \t]+\S";
const NUMBERED_ITEM: &str = r"[ \t]*\.+[ \t]+\S";
const DIGIT_ITEM: &str = r"[ \t]*(?:\d+|[a-z])\.[ \t]+\S";

/// One rewrite rule: a triggering line directly followed by a list opener.
#[derive(Debug)]
struct Rule {
    name: &'static str,
    pattern: Regex,
}

impl Rule {
    fn new(name: &'static str, lead: &str, item: &str) -> Self {
        let pattern = Regex::new(&format!(r"(?m)^(?P<lead>{lead})(?P<eol>\r?\n)(?P<item>{item})"))
            .unwrap_or_else(|e| panic!("invalid pattern for rule {name}: {e}"));
        Self { name, pattern }
    }

    fn apply(&self, text: &str) -> (String, usize) {
        let mut count = 0;
        let replaced = self.pattern.replace_all(text, |caps: &Captures<'_>| {
            let (lead, eol, item) = (&caps["lead"], &caps["eol"], &caps["item"]);
            if markup::is_list_item(lead)
                || markup::is_block_title(lead)
                || markup::list_marker(item).is_some_and(|m| m.is_nested())
            {
                return caps[0].to_string();
            }
            count += 1;
            format!("{lead}{eol}{eol}{item}")
        });
        if count > 0 {
            tracing::debug!(rule = self.name, count, "applied list spacing rule");
        }
        (replaced.into_owned(), count)
    }
}

static RULES: LazyLock<[Rule; 9]> = LazyLock::new(|| {
    [
        Rule::new("bold-bullet", BOLD_LEAD, BULLET_ITEM),
        Rule::new("colon-bullet", COLON_LEAD, BULLET_ITEM),
        Rule::new("bold-numbered-dot", BOLD_LEAD, NUMBERED_ITEM),
        Rule::new("bold-numbered-digit", BOLD_LEAD, DIGIT_ITEM),
        Rule::new("colon-numbered-dot", COLON_LEAD, NUMBERED_ITEM),
        Rule::new("colon-numbered-digit", COLON_LEAD, DIGIT_ITEM),
        Rule::new("heading-bullet", HEADING_LEAD, BULLET_ITEM),
        Rule::new("heading-numbered", HEADING_LEAD, NUMBERED_ITEM),
        Rule::new("code-fence-bullet", FENCE_LEAD, BULLET_ITEM),
    ]
});

/// The result of [`fix_list_spacing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixed {
    /// The rewritten text.
    pub text: String,
    /// How many blank lines were inserted.
    pub fixes: usize,
}

impl Fixed {
    /// Whether any rule fired.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.fixes > 0
    }
}

/// Inserts blank lines between triggering lines and the lists that follow
/// them.
#[must_use]
pub fn fix_list_spacing(text: &str) -> Fixed {
    let mut current = text.to_string();
    let mut fixes = 0;
    for rule in RULES.iter() {
        let (next, count) = rule.apply(&current);
        current = next;
        fixes += count;
    }
    Fixed {
        text: current,
        fixes,
    }
}

//! Step script parser.
//!
//! Model output is loosely structured: prose, headings and stray markdown sit
//! between the steps. The parser scans the whole text, in document order, for
//! bracketed step tags. Each tag yields one [`Step`]:
//!
//! - the argument is the rest of the tag line, trimmed;
//! - if the next non-blank text opens a ```` ``` ```` fence, everything up to
//!   the next ```` ``` ```` becomes the payload and scanning resumes after it;
//! - otherwise the step has no payload and scanning resumes on the next line.
//!
//! Text outside recognised steps is skipped, never rejected; the skipped byte
//! count is reported so callers can surface it. Fences do not nest: a ```` ``` ````
//! inside a payload closes the block early.

use std::sync::LazyLock;

use regex::Regex;

use super::step::{Step, StepKind};

pub const FENCE: &str = "```";

// Built from `StepKind::ALL`, so every capture maps back to a kind.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    let tags: Vec<&str> = StepKind::ALL.iter().map(|kind| kind.tag()).collect();
    Regex::new(&format!(r"\[({})\]", tags.join("|"))).expect("step tag pattern is valid")
});

/// Parser output: steps in source order plus how much text was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parsed {
    pub steps: Vec<Step>,
    /// Bytes of input that belong to no step (prose, unknown tags, ...).
    pub ignored_bytes: usize,
}

pub fn parse_steps(text: &str) -> Parsed {
    let mut steps = Vec::new();
    let mut consumed = 0usize;
    let mut cursor = 0usize;

    while let Some(caps) = TAG_RE.captures_at(text, cursor) {
        let (Some(tag), Some(kind)) = (
            caps.get(0),
            caps.get(1).and_then(|m| StepKind::from_tag(m.as_str())),
        ) else {
            break;
        };

        let line_end = text[tag.end()..]
            .find('\n')
            .map_or(text.len(), |offset| tag.end() + offset);
        let argument = text[tag.end()..line_end].trim().to_string();
        let next_line = (line_end + 1).min(text.len());

        let (payload, end) = match fenced_block(text, next_line) {
            Some((body, end)) => (Some(body.to_string()), end),
            None => (None, next_line),
        };

        consumed += end - tag.start();
        steps.push(Step::new(kind, argument, payload));
        cursor = end;
    }

    Parsed {
        steps,
        ignored_bytes: text.len() - consumed,
    }
}

/// Find a fenced block starting at `from`, skipping blank lines first.
///
/// Returns the block body and the offset just past the closing fence.
fn fenced_block(text: &str, from: usize) -> Option<(&str, usize)> {
    let rest = &text[from..];
    let trimmed = rest.trim_start();
    if !trimmed.starts_with(FENCE) {
        return None;
    }
    let body_start = from + (rest.len() - trimmed.len()) + FENCE.len();
    let body_len = text[body_start..].find(FENCE)?;
    let body_end = body_start + body_len;
    Some((&text[body_start..body_end], body_end + FENCE.len()))
}

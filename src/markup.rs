//! Inline markup tokenizer for post text.
//!
//! Post text is plain prose with four inline forms:
//!
//! | Form | Example | Span |
//! |------|---------|------|
//! | URL | `https://club.example/tickets` | [`SpanKind::Url`] |
//! | Email | `board@club.example` | [`SpanKind::Email`] |
//! | Bold | `*Vamos*` | [`SpanKind::Bold`] (delimiters stripped) |
//! | Italic | `_away end_` | [`SpanKind::Italic`] (delimiters stripped) |
//!
//! At every position the forms are tried in that order (URL first, italic
//! last). If none matches, the character joins the current plain run, which
//! extends until the next position where some form matches. Sentence
//! punctuation trailing a URL (`.`, `,`, `;`, `:`, `!`, `?`) stays plain text.
//!
//! Parsing is total: a lone `*` or `_` without a partner on the same line is
//! just literal text, and the empty string yields no spans. Every span records
//! the byte range of the source it covers; consecutive ranges tile the input
//! with no gaps and no overlaps.

use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::sync::OnceLock;

pub const BOLD_DELIMITER: char = '*';
pub const ITALIC_DELIMITER: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Plain,
    Bold,
    Italic,
    Url,
    Email,
}

/// One typed run of post text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSpan {
    pub kind: SpanKind,
    /// Visible text. For bold and italic this excludes the delimiters.
    pub text: String,
    /// Byte range of the source text this span was read from, delimiters included.
    pub source: Range<usize>,
}

impl TextSpan {
    /// What activating this span should open, if anything.
    ///
    /// URLs open as-is; emails open a `mailto:` link.
    pub fn link_target(&self) -> Option<String> {
        match self.kind {
            SpanKind::Url => Some(self.text.clone()),
            SpanKind::Email => Some(format!("mailto:{}", self.text)),
            _ => None,
        }
    }
}

/// Trailing characters that end a sentence rather than a URL.
const URL_TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// All four forms as one alternation, in priority order.
///
/// Leftmost-first matching picks the earliest start, then the first
/// alternative that matches there.
fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"(?P<url>(?i:(?:https?://|www\.)[-a-z0-9@:%._+~#=]{1,256}\.[a-z]{2,63}\b[-a-z0-9@:%_+.~#?&/=]*))",
            r"|(?P<email>[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})",
            r"|\*(?P<bold>[^*\n]+)\*",
            r"|_(?P<italic>[^_\n]+)_",
        ))
        .expect("markup pattern is valid")
    })
}

/// Tokenize post text into ordered spans.
pub fn parse(text: &str) -> Vec<TextSpan> {
    let re = pattern();
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        let (kind, visible, end) = if let Some(url) = caps.name("url") {
            let trimmed = url.as_str().trim_end_matches(URL_TRAILING_PUNCTUATION);
            (SpanKind::Url, trimmed, url.start() + trimmed.len())
        } else if let Some(email) = caps.name("email") {
            (SpanKind::Email, email.as_str(), whole.end())
        } else if let Some(bold) = caps.name("bold") {
            (SpanKind::Bold, bold.as_str(), whole.end())
        } else if let Some(italic) = caps.name("italic") {
            (SpanKind::Italic, italic.as_str(), whole.end())
        } else {
            break;
        };
        if end <= whole.start() {
            break;
        }

        push_plain(&mut spans, text, pos..whole.start());
        spans.push(TextSpan {
            kind,
            text: visible.to_string(),
            source: whole.start()..end,
        });
        pos = end;
    }
    push_plain(&mut spans, text, pos..text.len());

    spans
}

fn push_plain(spans: &mut Vec<TextSpan>, text: &str, range: Range<usize>) {
    if range.is_empty() {
        return;
    }
    spans.push(TextSpan {
        kind: SpanKind::Plain,
        text: text[range.clone()].to_string(),
        source: range,
    });
}

/// The text a reader sees: all span texts concatenated.
pub fn visible_text(spans: &[TextSpan]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

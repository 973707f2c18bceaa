use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::node::{Block, Document, Inline};

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Message content as received, before enhancement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Raw text the pipeline is responsible for structuring.
    Plain(String),
    /// Pre-formatted backend output, already escaped server-side.
    Formatted(String),
}

impl MessageBody {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain(text.into())
    }

    pub fn formatted(markup: impl Into<String>) -> Self {
        Self::Formatted(markup.into())
    }

    /// Returns the underlying text regardless of formatting state.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(text) | Self::Formatted(text) => text,
        }
    }
}

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"]+"#).expect("url pattern must compile")
});

/// Converts message content into the structured tree both panes render.
///
/// Formatted backend output passes through unchanged as trusted markup, but
/// only for backend-originated roles; user-authored content never crosses the
/// trust boundary and is structured as plain text instead. Plain text gets
/// URL auto-linking and newline-to-break conversion.
pub fn enhance(body: &MessageBody, role: Role) -> Document {
    match (body, role) {
        (MessageBody::Formatted(markup), Role::Assistant | Role::System) => {
            Document::trusted_markup(markup.clone())
        }
        (MessageBody::Formatted(text), Role::User) | (MessageBody::Plain(text), _) => {
            enhance_plain(text)
        }
    }
}

fn enhance_plain(text: &str) -> Document {
    let mut inlines = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if index > 0 {
            inlines.push(Inline::Break);
        }
        autolink_line(line, &mut inlines);
    }

    Document::new().with_block(Block::Paragraph(inlines))
}

/// Splits one line into text and link inlines.
///
/// Candidates are validated with a real URL parse; anything that fails stays
/// plain text rather than becoming a broken anchor.
fn autolink_line(line: &str, out: &mut Vec<Inline>) {
    let mut cursor = 0;

    for found in URL_PATTERN.find_iter(line) {
        let candidate = trim_trailing_punctuation(found.as_str());
        let end = found.start() + candidate.len();

        if candidate.is_empty() || Url::parse(candidate).is_err() {
            continue;
        }

        if found.start() > cursor {
            out.push(Inline::Text(line[cursor..found.start()].to_string()));
        }
        out.push(Inline::Link {
            href: candidate.to_string(),
            label: candidate.to_string(),
        });
        cursor = end;
    }

    if cursor < line.len() {
        out.push(Inline::Text(line[cursor..].to_string()));
    }
}

fn trim_trailing_punctuation(candidate: &str) -> &str {
    candidate.trim_end_matches(['.', ',', ';', ':', '!', '?', ')'])
}

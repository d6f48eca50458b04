//! Assistant reply formatting
//!
//! Turns raw model text into escaped, segmented markup. Blocks are separated
//! by blank lines; a block that opens with a short `Label:` becomes a
//! labeled section, anything else becomes a paragraph.

#[cfg(test)]
mod proptests;

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// 3-20 letters/spaces, a colon, then everything else (newlines included)
const LABEL_PATTERN: &str = r"(?s)^([A-Za-z ]{3,20}):\s*(.*)$";
const BLOCK_SEPARATOR: &str = r"\n{2,}";

fn label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LABEL_PATTERN).expect("label pattern is a valid regex"))
}

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BLOCK_SEPARATOR).expect("separator pattern is a valid regex"))
}

/// One rendered block. All text is already escaped; newlines are kept as
/// `\n` and become line breaks when rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Section { label: String, body: String },
    Paragraph(String),
}

/// Escaped, segmented assistant reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    blocks: Vec<Block>,
}

impl Markup {
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Render as HTML fragments joined by newlines
    pub fn to_html(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Section { label, body } => format!(
                    "<div class=\"section\">\n  <div class=\"section-label\">{label}</div>\n  <div class=\"section-body\">{}</div>\n</div>",
                    line_breaks(body)
                ),
                Block::Paragraph(text) => format!("<p>{}</p>", line_breaks(text)),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

/// Escape `&`, `<` and `>`. `&` goes first so entities are not doubled.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn line_breaks(text: &str) -> String {
    text.replace('\n', "<br>")
}

/// Format raw assistant text into markup.
pub fn format(text: &str) -> Markup {
    let blocks = separator_regex()
        .split(text)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| format_block(&escape(block)))
        .collect();

    Markup { blocks }
}

/// `escaped` must already be escaped; the label charset excludes the
/// escaped characters, so matching after escaping is equivalent.
fn format_block(escaped: &str) -> Block {
    match label_regex().captures(escaped) {
        Some(caps) => {
            let label = caps.get(1).map_or("", |m| m.as_str()).trim();
            let body = caps.get(2).map_or("", |m| m.as_str()).trim();
            Block::Section {
                label: label.to_string(),
                body: body.to_string(),
            }
        }
        None => Block::Paragraph(escaped.to_string()),
    }
}

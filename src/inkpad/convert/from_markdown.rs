//! Markdown → markup.
//!
//! A line-oriented converter, not a CommonMark implementation. It runs a fixed sequence
//! of passes over the text, each one working on the output of the one before:
//!
//! 1. fenced code blocks
//! 2. inline code spans
//! 3. ATX headings, `######` down to `#`
//! 4. horizontal rules (`---` or `***` alone on a line)
//! 5. bold (`**`, `__`) then italic (`*`, `_`)
//! 6. images, then links
//! 7. unordered list blocks
//! 8. ordered list blocks
//! 9. blockquote blocks
//! 10. paragraph wrapping
//! 11. newline cleanup
//!
//! Passes 1 and 2 park the escaped code in a side table and leave a placeholder behind,
//! so later passes cannot rewrite `**` or `- ` inside code. Lists are single-level:
//! indentation is ignored, and every item gets exactly one `<li>`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::markup::{escape_attr, escape_text};
use crate::model::collapse_newlines;

const SHIELD_OPEN: char = '\u{E000}';
const SHIELD_CLOSE: char = '\u{E001}';

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

static FENCED_CODE: Lazy<Regex> = Lazy::new(|| re(r"(?s)```[^\n`]*\n(.*?)```"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| re(r"`([^`\n]+)`"));
static HEADINGS: Lazy<Vec<Regex>> = Lazy::new(|| {
    (1..=6)
        .map(|level| re(&format!(r"(?m)^#{{{level}}} +(.+?)[ \t]*$")))
        .collect()
});
static RULE: Lazy<Regex> = Lazy::new(|| re(r"(?m)^(?:---|\*\*\*)[ \t]*$"));
static BOLD_STARS: Lazy<Regex> = Lazy::new(|| re(r"\*\*(\S(?:.*?\S)?)\*\*"));
static BOLD_UNDERSCORES: Lazy<Regex> = Lazy::new(|| re(r"__(\S(?:.*?\S)?)__"));
static ITALIC_STAR: Lazy<Regex> = Lazy::new(|| re(r"\*([^\s*](?:[^*\n]*[^\s*])?)\*"));
static ITALIC_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| re(r"(^|[^\w])_([^\s_](?:[^_\n]*[^\s_])?)_"));
static IMAGE: Lazy<Regex> = Lazy::new(|| re(r"!\[([^\]]*)\]\(([^)\s]*)\)"));
static LINK: Lazy<Regex> = Lazy::new(|| re(r"\[([^\]]+)\]\(([^)\s]+)\)"));
static UNORDERED_ITEM: Lazy<Regex> = Lazy::new(|| re(r"^\s*[-*+] +(.+)$"));
static ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| re(r"^\s*\d+\. +(.+)$"));
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| re(r"\n[ \t]*\n"));
static BLOCK_START: Lazy<Regex> =
    Lazy::new(|| re(r"^<(?:h[1-6]|ul|ol|blockquote|pre|hr|p|div)[\s>/]"));
static SHIELDED: Lazy<Regex> = Lazy::new(|| re("\u{E000}(\\d+)\u{E001}"));

pub fn from_markdown(text: &str) -> String {
    let mut shield = Shield::default();
    // Placeholder delimiters may only come from `Shield::park`.
    let text: String = text
        .replace("\r\n", "\n")
        .chars()
        .filter(|&c| c != SHIELD_OPEN && c != SHIELD_CLOSE)
        .collect();

    let text = FENCED_CODE.replace_all(&text, |caps: &Captures| {
        let code = caps[1].trim_end_matches('\n');
        format!("<pre>{}</pre>", shield.park(escape_text(code)))
    });
    let text = INLINE_CODE.replace_all(&text, |caps: &Captures| {
        format!("<code>{}</code>", shield.park(escape_text(&caps[1])))
    });

    let mut text = text.into_owned();
    for level in (1..=6).rev() {
        text = HEADINGS[level - 1]
            .replace_all(&text, |caps: &Captures| {
                format!("<h{level}>{}</h{level}>", caps[1].trim())
            })
            .into_owned();
    }

    let text = RULE.replace_all(&text, "<hr>");

    let text = BOLD_STARS.replace_all(&text, "<strong>$1</strong>");
    let text = BOLD_UNDERSCORES.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC_STAR.replace_all(&text, "<em>$1</em>");
    let text = ITALIC_UNDERSCORE.replace_all(&text, "$1<em>$2</em>");

    let text = IMAGE.replace_all(&text, |caps: &Captures| {
        format!(
            "<img src=\"{}\" alt=\"{}\">",
            escape_attr(&caps[2]),
            escape_attr(&caps[1])
        )
    });
    let text = LINK.replace_all(&text, |caps: &Captures| {
        format!("<a href=\"{}\">{}</a>", escape_attr(&caps[2]), &caps[1])
    });

    let text = wrap_line_runs(&text, &UNORDERED_ITEM, |items| list_block("ul", items));
    let text = wrap_line_runs(&text, &ORDERED_ITEM, |items| list_block("ol", items));
    let text = wrap_quote_runs(&text);

    let text = wrap_paragraphs(&text);
    let text = collapse_newlines(&text);

    shield.restore(&text)
}

/// Side table for code that later passes must not touch.
#[derive(Default)]
struct Shield {
    parked: Vec<String>,
}

impl Shield {
    fn park(&mut self, html: String) -> String {
        let token = format!("{SHIELD_OPEN}{}{SHIELD_CLOSE}", self.parked.len());
        self.parked.push(html);
        token
    }

    fn restore(&self, text: &str) -> String {
        SHIELDED
            .replace_all(text, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| self.parked.get(i))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

/// Replaces each run of consecutive lines matching `item` with one rendered block.
/// The first non-matching line ends the run.
fn wrap_line_runs(text: &str, item: &Regex, render: impl Fn(&[&str]) -> String) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        match item.captures(line).and_then(|caps| caps.get(1)) {
            Some(content) => run.push(content.as_str()),
            None => {
                if !run.is_empty() {
                    out.push(render(&run));
                    run.clear();
                }
                out.push(line.to_string());
            }
        }
    }
    if !run.is_empty() {
        out.push(render(&run));
    }
    out.join("\n")
}

fn list_block(tag: &str, items: &[&str]) -> String {
    let mut block = format!("<{tag}>");
    for item in items {
        block.push_str("<li>");
        block.push_str(item.trim());
        block.push_str("</li>");
    }
    block.push_str(&format!("</{tag}>"));
    block
}

fn wrap_quote_runs(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    let flush = |run: &mut Vec<&str>, out: &mut Vec<String>| {
        if !run.is_empty() {
            out.push(format!("<blockquote>{}</blockquote>", run.join("<br>")));
            run.clear();
        }
    };

    for line in text.split('\n') {
        match line.strip_prefix("> ") {
            Some(content) => run.push(content),
            None => {
                flush(&mut run, &mut out);
                out.push(line.to_string());
            }
        }
    }
    flush(&mut run, &mut out);
    out.join("\n")
}

/// Splits on blank lines. Lines that already hold a block element stand alone; every
/// other run of lines becomes a paragraph with `<br>` between its lines.
fn wrap_paragraphs(text: &str) -> String {
    let mut chunks = Vec::new();

    for chunk in BLANK_LINES.split(text) {
        let mut parts: Vec<String> = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();

        for line in chunk.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
            if BLOCK_START.is_match(line) {
                if !paragraph.is_empty() {
                    parts.push(format!("<p>{}</p>", paragraph.join("<br>")));
                    paragraph.clear();
                }
                parts.push(line.to_string());
            } else {
                paragraph.push(line);
            }
        }
        if !paragraph.is_empty() {
            parts.push(format!("<p>{}</p>", paragraph.join("<br>")));
        }
        if !parts.is_empty() {
            chunks.push(parts.join("\n"));
        }
    }

    chunks.join("\n\n")
}

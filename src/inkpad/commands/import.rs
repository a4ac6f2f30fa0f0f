use crate::commands::{CmdMessage, CmdResult};
use crate::convert::from_markdown;
use crate::error::Result;
use crate::markup::escape_text;
use crate::model::Note;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<body[^>]*>(.*)</body>")
        .unwrap_or_else(|e| panic!("invalid body pattern: {e}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImportKind {
    Markdown,
    Html,
    Text,
}

impl ImportKind {
    fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "md" | "markdown" => ImportKind::Markdown,
            "html" | "htm" => ImportKind::Html,
            _ => ImportKind::Text,
        }
    }
}

/// Turns the raw contents of `file_name` into a new note titled after the file.
pub fn run(file_name: &str, raw: &str) -> Result<CmdResult> {
    let note = to_note(file_name, raw);
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Imported {} as \"{}\"",
        file_name, note.title
    )));
    Ok(result.with_notes(vec![note]))
}

pub fn to_note(file_name: &str, raw: &str) -> Note {
    let path = Path::new(file_name);
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let content = match ImportKind::of(path) {
        ImportKind::Markdown => from_markdown(raw),
        ImportKind::Html => extract_body(raw).to_string(),
        ImportKind::Text => text_to_markup(raw),
    };

    let mut note = Note::untitled();
    note.save(&title, &content);
    note
}

/// The inside of `<body>` when present, otherwise the whole document.
pub fn extract_body(html: &str) -> &str {
    BODY.captures(html)
        .and_then(|caps| caps.get(1))
        .map_or(html, |m| m.as_str())
}

pub fn text_to_markup(text: &str) -> String {
    escape_text(&text.replace("\r\n", "\n")).replace('\n', "<br>")
}

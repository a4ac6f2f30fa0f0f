use crate::config::EditorConfig;
use crate::error::{InkpadError, Result};
use crate::model::Note;
use std::fmt;
use std::str::FromStr;

pub mod config;
pub mod export;
pub mod import;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Markdown,
    Rtf,
    /// The stored markup, unchanged.
    #[default]
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Markdown => "md",
            ExportFormat::Rtf => "rtf",
            ExportFormat::Html => "html",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain",
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Rtf => "application/rtf",
            ExportFormat::Html => "text/html",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = InkpadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Text),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "rtf" => Ok(ExportFormat::Rtf),
            "html" | "htm" => Ok(ExportFormat::Html),
            other => Err(InkpadError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A rendered note, ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub exported: Option<ExportedFile>,
    pub notes: Vec<Note>,
    pub config: Option<EditorConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_exported(mut self, file: ExportedFile) -> Self {
        self.exported = Some(file);
        self
    }

    pub fn with_notes(mut self, notes: Vec<Note>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = Some(config);
        self
    }
}

//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for UI clients.
//! It dispatches to `commands/*.rs` and hands out editor sessions configured from the
//! same [`EditorConfig`].
//!
//! The facade reads no files and prints nothing: callers pass raw file contents in and
//! get structured [`CmdResult`]s back.

use std::path::PathBuf;
use std::time::Instant;

use crate::commands::{self, config::ConfigAction, CmdResult, ExportFormat};
use crate::config::EditorConfig;
use crate::convert::RtfVariant;
use crate::error::Result;
use crate::model::Note;
use crate::session::EditorSession;

pub struct InkpadApi {
    config_dir: PathBuf,
    config: EditorConfig,
}

impl InkpadApi {
    /// Loads the configuration from `config_dir` (defaults when absent).
    pub fn new(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        let config = EditorConfig::load(&config_dir)?;
        Ok(Self { config_dir, config })
    }

    pub fn with_config(config_dir: impl Into<PathBuf>, config: EditorConfig) -> Self {
        Self {
            config_dir: config_dir.into(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn export_note(
        &self,
        note: &Note,
        format: ExportFormat,
        variant: RtfVariant,
    ) -> Result<CmdResult> {
        commands::export::run(note, format, variant, &self.config)
    }

    pub fn import_note(&self, file_name: &str, raw: &str) -> Result<CmdResult> {
        commands::import::run(file_name, raw)
    }

    pub fn configure(&mut self, action: ConfigAction) -> Result<CmdResult> {
        let result = commands::config::run(&self.config_dir, action)?;
        if let Some(config) = &result.config {
            self.config = config.clone();
        }
        Ok(result)
    }

    /// A fresh editing session on `note`, with empty history.
    pub fn open_session(&self, note: Note, now: Instant) -> EditorSession {
        EditorSession::new(self.config.clone(), note, now)
    }
}

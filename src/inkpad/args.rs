use clap::{Parser, Subcommand};
use once_cell::sync::Lazy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inkpad")]
#[command(about = "Convert rich-text notes to plain text, Markdown and RTF", long_about = None)]
#[command(version = version())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration directory (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a note body (markup) to another format
    #[command(alias = "x")]
    Export {
        /// File holding the note markup
        input: PathBuf,

        /// Output format: txt, md, rtf or html
        #[arg(short, long, default_value = "html")]
        format: String,

        /// Note title (defaults to the input file name)
        #[arg(short, long)]
        title: Option<String>,

        /// Output path (defaults to the sanitized title plus extension)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Leave images out of RTF output
        #[arg(long)]
        no_images: bool,
    },

    /// Import a Markdown, HTML or text file as a note
    #[command(alias = "i")]
    Import {
        /// File to import
        file: PathBuf,

        /// Write the note as JSON here instead of printing its markup
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (e.g., history_limit, rtf.hex_line_width)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

/// "1.0.1" for releases, "1.0.1@abc1234 2024-01-15 14:30" for dev builds.
fn version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    static VERSION_STRING: Lazy<String> = Lazy::new(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    });
    &VERSION_STRING
}

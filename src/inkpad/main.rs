use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use inkpad::api::InkpadApi;
use inkpad::commands::config::ConfigAction;
use inkpad::commands::{CmdMessage, ExportFormat, MessageLevel};
use inkpad::config::EditorConfig;
use inkpad::convert::RtfVariant;
use inkpad::error::{InkpadError, Result};
use inkpad::model::Note;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

mod args;
mod logging;
use args::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_dir = resolve_config_dir(cli.config)?;
    debug!(config_dir = %config_dir.display(), "starting");
    let mut api = InkpadApi::new(&config_dir)?;

    match cli.command {
        Commands::Export {
            input,
            format,
            title,
            out,
            no_images,
        } => handle_export(&api, &input, &format, title, out, no_images),
        Commands::Import { file, out } => handle_import(&api, &file, out),
        Commands::Config { key, value } => handle_config(&mut api, key, value),
    }
}

fn resolve_config_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    ProjectDirs::from("com", "inkpad", "inkpad")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| InkpadError::Config("Could not determine config dir".into()))
}

fn handle_export(
    api: &InkpadApi,
    input: &Path,
    format: &str,
    title: Option<String>,
    out: Option<PathBuf>,
    no_images: bool,
) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    let markup = fs::read_to_string(input)?;
    let title = title.unwrap_or_else(|| file_stem(input));
    let mut note = Note::untitled();
    note.save(&title, &markup);

    let variant = if no_images {
        RtfVariant::TextOnly
    } else {
        RtfVariant::Embedded
    };
    let result = api.export_note(&note, format, variant)?;
    print_messages(&result.messages);

    if let Some(file) = result.exported {
        let target = out.unwrap_or_else(|| PathBuf::from(&file.file_name));
        fs::write(&target, &file.content)?;
        println!("{} {}", "Wrote".green(), target.display());
    }
    Ok(())
}

fn handle_import(api: &InkpadApi, file: &Path, out: Option<PathBuf>) -> Result<()> {
    let raw = fs::read_to_string(file)?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let result = api.import_note(&file_name, &raw)?;

    for note in &result.notes {
        match &out {
            Some(path) => {
                fs::write(path, serde_json::to_string_pretty(note)?)?;
                print_messages(&result.messages);
                println!("{} {}", "Wrote".green(), path.display());
            }
            // Markup goes to stdout alone so it can be piped.
            None => println!("{}", note.content),
        }
    }
    Ok(())
}

fn handle_config(api: &mut InkpadApi, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);
    let result = api.configure(action)?;

    if show_all {
        if let Some(config) = &result.config {
            print_config(config)?;
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn print_config(config: &EditorConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

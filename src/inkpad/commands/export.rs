use crate::commands::{CmdMessage, CmdResult, ExportFormat, ExportedFile};
use crate::config::EditorConfig;
use crate::convert::rtf::render_rtf;
use crate::convert::{to_markdown, to_plain_text, RtfOptions, RtfVariant};
use crate::error::Result;
use crate::markup;
use crate::model::Note;
use tracing::debug;

pub fn run(
    note: &Note,
    format: ExportFormat,
    variant: RtfVariant,
    config: &EditorConfig,
) -> Result<CmdResult> {
    let (file, skipped_images) = render_with_report(note, format, variant, config);
    debug!(file = %file.file_name, bytes = file.content.len(), "note exported");

    let mut result = CmdResult::default();
    if skipped_images > 0 {
        result.add_message(CmdMessage::warning(format!(
            "{} image(s) could not be embedded and were left out",
            skipped_images
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Exported \"{}\" as {}",
        note.title, format
    )));
    Ok(result.with_exported(file))
}

pub fn render(
    note: &Note,
    format: ExportFormat,
    variant: RtfVariant,
    config: &EditorConfig,
) -> ExportedFile {
    render_with_report(note, format, variant, config).0
}

fn render_with_report(
    note: &Note,
    format: ExportFormat,
    variant: RtfVariant,
    config: &EditorConfig,
) -> (ExportedFile, usize) {
    let mut skipped_images = 0;
    let content = match format {
        ExportFormat::Html => note.content.clone(),
        ExportFormat::Text => to_plain_text(&markup::parse(&note.content)),
        ExportFormat::Markdown => to_markdown(&markup::parse(&note.content)),
        ExportFormat::Rtf => {
            let options = RtfOptions::from_config(&config.rtf, variant);
            let output = render_rtf(&markup::parse(&note.content), &note.title, &options);
            skipped_images = output.skipped_images;
            output.rtf
        }
    };
    let file = ExportedFile {
        file_name: format!("{}.{}", sanitize_filename(&note.title), format.extension()),
        mime: format.mime(),
        content,
    };
    (file, skipped_images)
}

/// Every character outside `[A-Za-z0-9]` becomes `_`, then lowercase.
pub fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .to_ascii_lowercase()
}

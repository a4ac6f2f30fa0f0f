//! Converters between the markup tree and the export formats, plus the Markdown parser.
//!
//! Every serializer is a pure function of the tree: no global state, no I/O.

pub mod from_markdown;
pub mod image;
pub mod markdown;
pub mod plain;
pub mod rtf;

pub use from_markdown::from_markdown;
pub use markdown::to_markdown;
pub use plain::to_plain_text;
pub use rtf::{render_rtf, to_rtf, RtfOptions, RtfOutput, RtfVariant};

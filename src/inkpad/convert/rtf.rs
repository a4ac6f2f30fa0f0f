//! Tree → RTF.
//!
//! Targets the subset common word processors read: one font table, one color table,
//! grouped character formatting, `\par` paragraphs and `\pict` pictures.

use std::cell::Cell;
use std::fmt::Write;

use tracing::debug;

use super::image::{decode_data_uri, display_size, twips, EmbeddedImage};
use crate::config::RtfConfig;
use crate::model::{Document, Element, Node, Tag};

const HEADER: &str = concat!(
    "{\\rtf1\\ansi\\ansicpg1252\\cocoartf2580\\cocoasubrtf220\n",
    "{\\fonttbl\\f0\\fswiss\\fcharset0 Helvetica;\\f1\\fmodern\\fcharset0 Courier;}\n",
    "{\\colortbl;\\red0\\green0\\blue0;}\n",
    "\\vieww12000\\viewh15840\\viewkind0\n",
    "\\pard\\tx720\\tx1440\\tx2160\\tx2880\\tx3600\\tx4320\\tx5040\\tx5760\\tx6480\\tx7200\\tx7920\\tx8640\\pardirnatural\\partightenfactor0\n\n",
    "\\f0\\fs24 \\cf0 "
);

const LIST_INDENT_TWIPS: usize = 360;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtfVariant {
    /// Embeds `data:` URI images as pictures.
    Embedded,
    /// Drops every image.
    TextOnly,
}

#[derive(Debug, Clone)]
pub struct RtfOptions {
    pub variant: RtfVariant,
    pub max_image_width_px: u32,
    pub hex_line_width: usize,
    pub max_image_bytes: usize,
}

impl RtfOptions {
    pub fn from_config(config: &RtfConfig, variant: RtfVariant) -> Self {
        Self {
            variant,
            max_image_width_px: config.max_image_width_px,
            hex_line_width: config.hex_line_width,
            max_image_bytes: config.max_image_bytes,
        }
    }
}

impl Default for RtfOptions {
    fn default() -> Self {
        Self::from_config(&RtfConfig::default(), RtfVariant::Embedded)
    }
}

pub fn to_rtf(doc: &Document, title: &str, options: &RtfOptions) -> String {
    render_rtf(doc, title, options).rtf
}

/// RTF text plus how many images could not be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtfOutput {
    pub rtf: String,
    pub skipped_images: usize,
}

pub fn render_rtf(doc: &Document, title: &str, options: &RtfOptions) -> RtfOutput {
    let writer = RtfWriter {
        options,
        skipped: Cell::new(0),
    };
    let mut rtf = String::from(HEADER);
    let _ = writeln!(rtf, "{{\\b\\fs32 {}}}\\par\\par", escape_rtf(title));
    for child in &doc.children {
        rtf.push_str(&writer.node(child, false, 0));
    }
    rtf.push('}');
    RtfOutput {
        rtf,
        skipped_images: writer.skipped.get(),
    }
}

struct RtfWriter<'a> {
    options: &'a RtfOptions,
    skipped: Cell<usize>,
}

impl RtfWriter<'_> {
    fn node(&self, node: &Node, in_list: bool, level: usize) -> String {
        match node {
            Node::Text(content) => escape_rtf(content),
            Node::Element(el) => self.element(el, in_list, level),
        }
    }

    fn children(&self, el: &Element, in_list: bool, level: usize) -> String {
        el.children
            .iter()
            .map(|c| self.node(c, in_list, level))
            .collect()
    }

    fn element(&self, el: &Element, in_list: bool, level: usize) -> String {
        match el.tag() {
            Tag::Bold => format!("{{\\b {}}}", self.children(el, in_list, level)),
            Tag::Italic => format!("{{\\i {}}}", self.children(el, in_list, level)),
            Tag::Underline => format!("{{\\ul {}}}", self.children(el, in_list, level)),
            Tag::Heading(n) => format!(
                "{{\\b\\fs{} {}}}\\par\\par\n",
                heading_size(n),
                self.children(el, in_list, level)
            ),
            Tag::Paragraph => format!("{}\\par\\par\n", self.children(el, in_list, level)),
            Tag::LineBreak => "\\line ".to_string(),
            Tag::UnorderedList => self.list(el, false, in_list, level),
            Tag::OrderedList => self.list(el, true, in_list, level),
            Tag::ListItem if !in_list => {
                format!("\\bullet {}\\par\n", self.children(el, in_list, level))
            }
            Tag::ListItem => self.children(el, in_list, level),
            Tag::Container => {
                let body = self.children(el, in_list, level);
                if el.has_element_children() || !el.text_content().trim().is_empty() {
                    format!("{body}\\par\n")
                } else {
                    body
                }
            }
            Tag::Blockquote => format!(
                "{{\\li720 \\i {}\\par}}\n",
                self.children(el, in_list, level)
            ),
            Tag::Code => format!("{{\\f1 {}}}", self.children(el, in_list, level)),
            Tag::Preformatted => format!(
                "{{\\f1 {}}}\\par\\par\n",
                escape_rtf(el.text_content().trim_end_matches('\n'))
            ),
            Tag::Link => {
                let text = self.children(el, in_list, level);
                match el.attr("href").filter(|href| !href.is_empty()) {
                    Some(href) => format!(
                        "{{\\field{{\\*\\fldinst{{HYPERLINK \"{}\"}}}}{{\\fldrslt{{\\ul {}}}}}}}",
                        escape_rtf(href),
                        text
                    ),
                    None => text,
                }
            }
            Tag::Image => self.image(el),
            Tag::Rule => "{\\pard\\brdrb\\brdrs\\brdrw10\\brsp20 \\par}\n".to_string(),
            Tag::Other => self.children(el, in_list, level),
        }
    }

    /// Emits only the list's items; any other child of the list is skipped.
    fn list(&self, el: &Element, ordered: bool, in_list: bool, level: usize) -> String {
        let indent = format!("\\li{} \\fi-360 ", (level + 1) * LIST_INDENT_TWIPS);
        let mut out = String::new();
        for (position, item) in el.list_items().enumerate() {
            out.push_str(&indent);
            if ordered {
                let _ = write!(out, "{}. ", position + 1);
            } else {
                out.push_str("\\bullet ");
            }
            out.push_str(&self.children(item, true, level + 1));
            out.push_str("\\par\n");
        }
        if !in_list {
            out.push_str("\\li0 \\fi0 ");
        }
        out
    }

    fn image(&self, el: &Element) -> String {
        if self.options.variant == RtfVariant::TextOnly {
            return String::new();
        }
        let src = el.attr("src").unwrap_or_default();
        match decode_data_uri(src, self.options.max_image_bytes) {
            Ok(image) => self.picture(el, &image),
            Err(err) => {
                debug!(error = %err, "skipping image in RTF export");
                self.skipped.set(self.skipped.get() + 1);
                String::new()
            }
        }
    }

    fn picture(&self, el: &Element, image: &EmbeddedImage) -> String {
        let (width, height) = display_size(
            el,
            (image.width_px, image.height_px),
            self.options.max_image_width_px,
        );
        let mut out = format!(
            "{{\\pict{}\\picw{}\\pich{}\\picwgoal{}\\pichgoal{}\n",
            image.format.rtf_control(),
            image.width_px,
            image.height_px,
            twips(width),
            twips(height)
        );
        let encoded = hex::encode(&image.bytes);
        let line_width = self.options.hex_line_width.max(2);
        for line in encoded.as_bytes().chunks(line_width) {
            // hex output is ASCII, so any chunk boundary is a char boundary
            out.push_str(std::str::from_utf8(line).unwrap_or_default());
            out.push('\n');
        }
        out.push('}');
        out
    }
}

fn heading_size(level: u8) -> u8 {
    match level {
        1 => 40,
        2 => 36,
        3 => 32,
        _ => 28,
    }
}

/// Escapes a text run for RTF.
pub fn escape_rtf(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut units = [0u16; 2];
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\n' => out.push_str("\\par\n"),
            '\r' => {}
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{FFFD}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' => out.push('"'),
            '\u{2013}' => out.push('-'),
            '\u{2014}' => out.push_str("--"),
            '\u{2026}' => out.push_str("..."),
            c if c.is_ascii() => out.push(c),
            c => {
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{}?", unit);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::image::tests::png_data_uri;
    use crate::markup;

    fn rtf(src: &str) -> String {
        to_rtf(&markup::parse(src), "T", &RtfOptions::default())
    }

    fn body(src: &str) -> String {
        let full = rtf(src);
        let start = full.find("}\\par\\par\n").map(|i| i + 10).unwrap_or(0);
        full[start..full.len() - 1].to_string()
    }

    #[test]
    fn test_document_frame() {
        let out = to_rtf(&Document::default(), "My {Note}", &RtfOptions::default());
        assert!(out.starts_with("{\\rtf1\\ansi"));
        assert!(out.contains("{\\fonttbl"));
        assert!(out.contains("{\\colortbl;"));
        assert!(out.contains("{\\b\\fs32 My \\{Note\\}}\\par\\par\n"));
        assert!(out.ends_with('}'));
    }

    #[test]
    fn test_escape_rules() {
        assert_eq!(escape_rtf("a\\b{c}"), "a\\\\b\\{c\\}");
        assert_eq!(escape_rtf("l1\r\nl2"), "l1\\par\nl2");
        assert_eq!(escape_rtf("\u{2018}x\u{2019} \u{201C}y\u{201D}"), "'x' \"y\"");
        assert_eq!(escape_rtf("a\u{2013}b\u{2014}c\u{2026}"), "a-b--c...");
        assert_eq!(escape_rtf("café"), "caf\\u233?");
        assert_eq!(escape_rtf("😀"), "\\u55357?\\u56832?");
    }

    #[test]
    fn test_inline_and_heading_controls() {
        assert_eq!(
            body("<h1>A</h1><h4>B</h4><p><b>x</b><i>y</i><u>z</u></p>"),
            "{\\b\\fs40 A}\\par\\par\n{\\b\\fs28 B}\\par\\par\n{\\b x}{\\i y}{\\ul z}\\par\\par\n"
        );
    }

    #[test]
    fn test_unordered_list_indents_by_depth() {
        assert_eq!(
            body("<ul><li>a<ul><li>b</li></ul></li></ul>"),
            "\\li360 \\fi-360 \\bullet a\\li720 \\fi-360 \\bullet b\\par\n\\par\n\\li0 \\fi0 "
        );
    }

    #[test]
    fn test_ordered_list_numbers_only_items() {
        assert_eq!(
            body("<ol><li>a</li><span>stray</span><li>b</li></ol><ol><li>c</li></ol>"),
            "\\li360 \\fi-360 1. a\\par\n\\li360 \\fi-360 2. b\\par\n\\li0 \\fi0 \
             \\li360 \\fi-360 1. c\\par\n\\li0 \\fi0 "
        );
    }

    #[test]
    fn test_stray_item_and_containers() {
        assert_eq!(body("<li>x</li>"), "\\bullet x\\par\n");
        assert_eq!(body("<div>x</div><div> </div>"), "x\\par\n ");
        assert_eq!(body("a<br>b"), "a\\line b");
    }

    #[test]
    fn test_embeds_png_at_fifteen_twips_per_pixel() {
        let src = format!(r#"<p>before <img src="{}"> after</p>"#, png_data_uri(10, 10));
        let out = rtf(&src);
        assert!(out.contains("{\\pict\\pngblip\\picw10\\pich10\\picwgoal150\\pichgoal150\n"));
        assert!(out.contains("before "));
        assert!(out.contains(" after"));
        let pict = &out[out.find("{\\pict").unwrap()..];
        let hex_line = pict.lines().nth(1).unwrap();
        assert!(hex_line.starts_with("89504e47"));
        assert!(hex_line.len() <= 128);
    }

    #[test]
    fn test_wide_image_is_capped() {
        let src = format!(r#"<img src="{}">"#, png_data_uri(1000, 400));
        let out = rtf(&src);
        assert!(out.contains("\\picwgoal7500\\pichgoal3000"));
    }

    #[test]
    fn test_oversized_dimensions_do_not_overflow() {
        let src = format!(
            r#"<img src="{}" width="10" height="300000000">"#,
            png_data_uri(10, 10)
        );
        let out = rtf(&src);
        assert!(out.contains("\\picwgoal150\\pichgoal150"));

        let uncapped = RtfOptions {
            max_image_width_px: 0,
            ..RtfOptions::default()
        };
        let src = format!(
            r#"<img src="{}" style="width: 99999999px; height: 4294967295px">"#,
            png_data_uri(10, 10)
        );
        let out = to_rtf(&markup::parse(&src), "T", &uncapped);
        assert!(out.contains("\\picwgoal150\\pichgoal150"));
    }

    #[test]
    fn test_skipped_images_are_counted() {
        let src = format!(
            r#"<img src="https://x/y.png"><img src="{}"><img src="data:image/png;base64,!!">"#,
            png_data_uri(2, 2)
        );
        let out = render_rtf(&markup::parse(&src), "T", &RtfOptions::default());
        assert_eq!(out.skipped_images, 2);
        assert_eq!(out.rtf.matches("{\\pict").count(), 1);
    }

    #[test]
    fn test_skipped_images() {
        let remote = rtf(r#"<p>x<img src="https://example.com/a.png">y</p>"#);
        assert!(!remote.contains("\\pict"));
        assert!(remote.contains("xy"));

        let broken = rtf(r#"<p>x<img src="data:image/png;base64,!!notbase64!!">y</p>"#);
        assert!(!broken.contains("\\pict"));
        assert!(broken.contains("xy\\par\\par"));

        let options = RtfOptions {
            variant: RtfVariant::TextOnly,
            ..RtfOptions::default()
        };
        let src = format!(r#"<img src="{}">"#, png_data_uri(4, 4));
        let text_only = to_rtf(&markup::parse(&src), "T", &options);
        assert!(!text_only.contains("\\pict"));
    }

    #[test]
    fn test_links_become_hyperlink_fields() {
        assert_eq!(
            body(r#"<a href="https://x.y">go</a>"#),
            "{\\field{\\*\\fldinst{HYPERLINK \"https://x.y\"}}{\\fldrslt{\\ul go}}}"
        );
    }
}

//! Decoding of `data:` URI images for embedding into RTF.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use std::io::Cursor;
use thiserror::Error;

use crate::model::Element;

/// 1 px ≈ 15 twips.
pub const TWIPS_PER_PIXEL: u32 = 15;

/// `width`/`height` values above this are ignored.
pub const MAX_DISPLAY_PX: u32 = 16_384;

pub fn twips(px: u32) -> u32 {
    px.saturating_mul(TWIPS_PER_PIXEL)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureFormat {
    Png,
    Jpeg,
}

impl PictureFormat {
    pub fn rtf_control(self) -> &'static str {
        match self {
            PictureFormat::Png => "\\pngblip",
            PictureFormat::Jpeg => "\\jpegblip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub format: PictureFormat,
    pub width_px: u32,
    pub height_px: u32,
    pub bytes: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("not a base64 data URI")]
    NotDataUri,

    #[error("unsupported image type: {0}")]
    Unsupported(String),

    #[error("payload of ~{0} bytes exceeds the embedding limit")]
    TooLarge(usize),

    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("unreadable image: {0}")]
    Image(#[from] image::ImageError),
}

/// Decodes `data:image/<type>;base64,<payload>` into raw bytes plus intrinsic size.
///
/// The declared MIME type must be PNG or JPEG, and the decoded bytes must sniff as one
/// of the two; the sniffed format wins when they disagree.
pub fn decode_data_uri(src: &str, max_bytes: usize) -> Result<EmbeddedImage, ImageError> {
    let rest = src
        .trim()
        .strip_prefix("data:")
        .ok_or(ImageError::NotDataUri)?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or(ImageError::NotDataUri)?;
    match mime.to_ascii_lowercase().as_str() {
        "image/png" | "image/jpeg" | "image/jpg" => {}
        other => return Err(ImageError::Unsupported(other.to_string())),
    }

    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let estimated = payload.len() / 4 * 3;
    if estimated > max_bytes {
        return Err(ImageError::TooLarge(estimated));
    }

    let bytes = STANDARD.decode(payload.as_bytes())?;
    let (format, image_format) = match image::guess_format(&bytes)? {
        ImageFormat::Png => (PictureFormat::Png, ImageFormat::Png),
        ImageFormat::Jpeg => (PictureFormat::Jpeg, ImageFormat::Jpeg),
        other => return Err(ImageError::Unsupported(format!("{other:?}"))),
    };
    let (width_px, height_px) =
        image::ImageReader::with_format(Cursor::new(&bytes), image_format).into_dimensions()?;

    Ok(EmbeddedImage {
        format,
        width_px,
        height_px,
        bytes,
    })
}

/// Size the picture is shown at, in pixels.
///
/// Honors a `width`/`height` attribute or a `width:`/`height:` declaration in `style`
/// (left by the resize handle), keeps the aspect ratio when only one side is set, and
/// caps the width at `max_width`.
pub fn display_size(el: &Element, intrinsic: (u32, u32), max_width: u32) -> (u32, u32) {
    let (iw, ih) = intrinsic;
    let width = dimension(el, "width");
    let height = dimension(el, "height");

    let (mut w, mut h) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, scale(ih, w, iw)),
        (None, Some(h)) => (scale(iw, h, ih), h),
        (None, None) => (iw, ih),
    };

    if max_width > 0 && w > max_width {
        h = scale(h, max_width, w);
        w = max_width;
    }
    (w, h)
}

fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return value;
    }
    (f64::from(value) * f64::from(numerator) / f64::from(denominator)).round() as u32
}

fn dimension(el: &Element, name: &str) -> Option<u32> {
    el.attr(name).and_then(parse_px).or_else(|| {
        el.attr("style")?.split(';').find_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            if key.trim().eq_ignore_ascii_case(name) {
                parse_px(value)
            } else {
                None
            }
        })
    })
}

fn parse_px(value: &str) -> Option<u32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    let parsed = number.parse::<f64>().ok()?;
    (parsed > 0.0 && parsed <= f64::from(MAX_DISPLAY_PX)).then(|| parsed.round() as u32)
}

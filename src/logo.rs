//! # Logo payload
//!
//! A business logo is a self-contained in-memory image blob (data URI or
//! raw base64), never a URL reference. Attachment validates the media type
//! and decodability up front, so a `Logo` at rest in the model is always a
//! decodable raster image; absence is `Option::None` on
//! [`BusinessInfo`](crate::model::BusinessInfo), not an empty string.
//!
//! JPEG bytes pass through undecoded — the PDF writer embeds them natively
//! with DCTDecode. PNGs are decoded to RGB pixels plus a separate alpha
//! channel for SMask transparency.

use crate::error::ProposalError;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// An attached logo: the raw data-URI/base64 source string.
///
/// Serializes transparently as a string, matching the wire shape of the
/// persisted `businessInfo.logo` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Logo(String);

/// A decoded logo ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct DecodedLogo {
    pub pixels: LogoPixels,
    pub width_px: u32,
    pub height_px: u32,
}

/// Pixel data in a form the PDF serializer consumes directly.
#[derive(Debug, Clone)]
pub enum LogoPixels {
    /// Raw JPEG bytes — embed with DCTDecode.
    Jpeg { data: Vec<u8>, grayscale: bool },
    /// Decoded RGB pixels + optional alpha channel (width*height bytes).
    Rgb { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

impl Logo {
    /// Accept an uploaded file as the logo.
    ///
    /// Rejects non-`image/*` media types and undecodable data with a
    /// user-facing message; on failure the existing logo (or its absence)
    /// is left unchanged by callers.
    pub fn from_upload(media_type: &str, bytes: &[u8]) -> Result<Logo, ProposalError> {
        if !media_type.starts_with("image/") {
            return Err(ProposalError::InvalidLogo(format!(
                "'{}' is not an image file",
                media_type
            )));
        }
        // Validate decodability now so every Logo at rest is renderable.
        decode_bytes(bytes).map_err(ProposalError::InvalidLogo)?;

        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(Logo(format!("data:{};base64,{}", media_type, b64)))
    }

    /// Wrap an already-encoded source string (a data URI or raw base64),
    /// as loaded back from the store. Decodability is re-checked lazily at
    /// render time.
    pub fn from_source(source: impl Into<String>) -> Logo {
        Logo(source.into())
    }

    pub fn as_source(&self) -> &str {
        &self.0
    }

    /// Decode for rendering. Callers in the PDF path swallow the error and
    /// proceed without the logo rather than failing the whole export.
    pub fn decode(&self) -> Result<DecodedLogo, ProposalError> {
        let bytes = self.raw_bytes().map_err(ProposalError::InvalidLogo)?;
        decode_bytes(&bytes).map_err(ProposalError::InvalidLogo)
    }

    fn raw_bytes(&self) -> Result<Vec<u8>, String> {
        use base64::Engine;
        let b64 = if self.0.starts_with("data:") {
            let comma = self
                .0
                .find(',')
                .ok_or_else(|| "invalid data URI: missing comma".to_string())?;
            &self.0[comma + 1..]
        } else {
            self.0.as_str()
        };
        base64::engine::general_purpose::STANDARD
            .decode(b64)
            .map_err(|e| format!("base64 decode error: {}", e))
    }
}

impl DecodedLogo {
    /// Scale into a bounding box preserving aspect ratio. Returns display
    /// size in the caller's units.
    pub fn fit_within(&self, max_w: f64, max_h: f64) -> (f64, f64) {
        let ratio = self.width_px as f64 / self.height_px.max(1) as f64;
        let mut w = max_w;
        let mut h = w / ratio;
        if h > max_h {
            h = max_h;
            w = h * ratio;
        }
        (w, h)
    }
}

/// Detect the image format from magic bytes and decode accordingly.
fn decode_bytes(data: &[u8]) -> Result<DecodedLogo, String> {
    if data.len() < 4 {
        return Err("image data too short".to_string());
    }
    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err("unsupported image format (expected JPEG or PNG)".to_string())
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// JPEG: read dimensions and component count without decoding pixels;
/// the raw bytes are embedded as-is.
fn decode_jpeg(data: &[u8]) -> Result<DecodedLogo, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("format detection error: {}", e))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| format!("failed to read JPEG dimensions: {}", e))?;

    Ok(DecodedLogo {
        pixels: LogoPixels::Jpeg {
            data: data.to_vec(),
            grayscale: jpeg_is_grayscale(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan JPEG markers for the SOF segment and read the component count.
fn jpeg_is_grayscale(data: &[u8]) -> bool {
    let mut i = 2; // skip SOI
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof {
            if i + 9 < data.len() {
                return data[i + 9] == 1;
            }
            break;
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    false
}

/// PNG: decode to RGBA, split into RGB + alpha, drop the alpha channel
/// when the image is fully opaque.
fn decode_png(data: &[u8]) -> Result<DecodedLogo, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("format detection error: {}", e))?;
    let img = reader
        .decode()
        .map_err(|e| format!("failed to decode PNG: {}", e))?;

    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
        if pixel[3] != 255 {
            has_transparency = true;
        }
    }

    Ok(DecodedLogo {
        pixels: LogoPixels::Rgb {
            rgb,
            alpha: if has_transparency { Some(alpha) } else { None },
        },
        width_px: width,
        height_px: height,
    })
}

#[cfg(test)]
pub(crate) fn test_png_bytes(r: u8, g: u8, b: u8, a: u8) -> Vec<u8> {
    let mut img = image::RgbaImage::new(1, 1);
    img.put_pixel(0, 0, image::Rgba([r, g, b, a]));
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(encoder, img.as_raw(), 1, 1, image::ColorType::Rgba8).unwrap();
    buf
}

//! # PDF Serializer
//!
//! Takes the laid-out pages from the layout module and writes a valid PDF
//! file. This is a from-scratch PDF 1.7 writer: the subset needed for a
//! proposal document (text in the two standard Helvetica fonts, filled
//! rectangles, stroked lines, one image XObject for the logo) is small
//! enough that writing the raw bytes keeps the exporter self-contained.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Standard fonts need no embedding; text is written in WinAnsiEncoding
//! with octal escapes for the non-ASCII bytes.

pub mod layout;
pub mod metrics;

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use crate::error::ProposalError;
use crate::logo::LogoPixels;
use crate::model::ProposalData;
use crate::pdf::layout::{Element, Font, Page, Rgb};
use crate::view;
use miniz_oxide::deflate::compress_to_vec_zlib;

/// Render the proposal to PDF bytes.
pub fn render(data: &ProposalData) -> Result<Vec<u8>, ProposalError> {
    let pages = layout::paginate(data);
    PdfWriter::new().write(&pages, data)
}

/// Render and pair with the download filename.
pub fn export(data: &ProposalData) -> Result<(String, Vec<u8>), ProposalError> {
    let bytes = render(data)?;
    Ok((view::export_filename(data), bytes))
}

pub struct PdfWriter;

struct PdfObject {
    data: Vec<u8>,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// XObject obj IDs indexed as /Im0, /Im1, ...
    image_objects: Vec<usize>,
    /// Image indices used by each page, in draw order.
    page_images: Vec<Vec<usize>>,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[Page], data: &ProposalData) -> Result<Vec<u8>, ProposalError> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            image_objects: Vec::new(),
            page_images: Vec::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3 = Helvetica, 4 = Helvetica-Bold
        // 5+ = images, then per page a content stream and a page object
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });

        for font in [Font::Helvetica, Font::HelveticaBold] {
            let dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_name()
            );
            builder.objects.push(PdfObject {
                data: dict.into_bytes(),
            });
        }

        self.register_images(&mut builder, pages);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for (page_idx, page) in pages.iter().enumerate() {
            let content = Self::page_content(page, &builder.page_images[page_idx]);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let page_obj_id = builder.objects.len();
            let xobjects = self.build_xobject_resource_dict(&builder, page_idx);
            let resources = if xobjects.is_empty() {
                "/Font << /F0 3 0 R /F1 4 0 R >>".to_string()
            } else {
                format!("/Font << /F0 3 0 R /F1 4 0 R >> /XObject << {} >>", xobjects)
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                layout::PAGE_WIDTH,
                layout::PAGE_HEIGHT,
                content_obj_id,
                resources
            );
            builder.objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        // Catalog (object 1)
        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        // Pages tree (object 2)
        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        // Info dictionary
        let info_obj_id = {
            let id = builder.objects.len();
            let mut info = String::from("<< ");
            if !data.proposal_number.is_empty() {
                let _ = write!(
                    info,
                    "/Title (Proposal {}) ",
                    Self::escape_pdf_string(&data.proposal_number)
                );
            }
            if !data.business_info.name.is_empty() {
                let _ = write!(
                    info,
                    "/Author ({}) ",
                    Self::escape_pdf_string(&data.business_info.name)
                );
            }
            let _ = write!(info, "/Producer (Proposely) /Creator (Proposely) >>");
            builder.objects.push(PdfObject {
                data: info.into_bytes(),
            });
            id
        };

        Ok(self.serialize(&builder, info_obj_id))
    }

    /// Build the PDF content stream for a single page.
    fn page_content(page: &Page, image_indices: &[usize]) -> String {
        let mut stream = String::new();
        let mut next_image = 0usize;
        let page_h = layout::PAGE_HEIGHT;

        for element in &page.elements {
            match element {
                Element::Rect {
                    x,
                    y,
                    width,
                    height,
                    fill,
                } => {
                    let pdf_y = page_h - y - height;
                    let _ = write!(
                        stream,
                        "q\n{} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        Self::fill_color(*fill),
                        x,
                        pdf_y,
                        width,
                        height
                    );
                }

                Element::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    stroke_width,
                    color,
                } => {
                    let _ = write!(
                        stream,
                        "q\n{} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        Self::stroke_color(*color),
                        stroke_width,
                        x1,
                        page_h - y1,
                        x2,
                        page_h - y2
                    );
                }

                Element::Text {
                    x,
                    y,
                    text,
                    font,
                    size,
                    color,
                } => {
                    let font_name = match font {
                        Font::Helvetica => "F0",
                        Font::HelveticaBold => "F1",
                    };
                    let _ = write!(
                        stream,
                        "BT\n{} rg\n/{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                        Self::fill_color(*color),
                        font_name,
                        size,
                        x,
                        page_h - y,
                        Self::encode_text(text)
                    );
                }

                Element::Image {
                    x,
                    y,
                    width,
                    height,
                    ..
                } => {
                    let img_idx = image_indices[next_image];
                    next_image += 1;
                    let pdf_y = page_h - y - height;
                    let _ = write!(
                        stream,
                        "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                        width, height, x, pdf_y, img_idx
                    );
                }
            }
        }

        stream
    }

    /// Encode text for a literal PDF string in WinAnsiEncoding: escape the
    /// delimiters, octal-escape non-ASCII bytes, and substitute '?' for
    /// anything WinAnsi cannot represent.
    fn encode_text(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Register each page's images as XObject PDF objects.
    fn register_images(&self, builder: &mut PdfBuilder, pages: &[Page]) {
        for page in pages {
            let mut indices = Vec::new();
            for element in &page.elements {
                if let Element::Image { image, .. } = element {
                    let img_idx = builder.image_objects.len();
                    let obj_id = Self::write_image_xobject(builder, image);
                    builder.image_objects.push(obj_id);
                    indices.push(img_idx);
                }
            }
            builder.page_images.push(indices);
        }
    }

    /// Write a logo as one or two XObject PDF objects (an SMask carries the
    /// alpha channel). Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &crate::logo::DecodedLogo) -> usize {
        match &image.pixels {
            LogoPixels::Jpeg { data, grayscale } => {
                let color_space = if *grayscale { "/DeviceGray" } else { "/DeviceRGB" };
                let obj_id = builder.objects.len();
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace {} \
                     /BitsPerComponent 8 \
                     /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space,
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }

            LogoPixels::Rgb { rgb, alpha } => {
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed = compress_to_vec_zlib(alpha_data, 6);
                    let smask_obj_id = builder.objects.len();
                    let mut smask_data: Vec<u8> = Vec::new();
                    let _ = write!(
                        smask_data,
                        "<< /Type /XObject /Subtype /Image \
                         /Width {} /Height {} \
                         /ColorSpace /DeviceGray \
                         /BitsPerComponent 8 \
                         /Filter /FlateDecode \
                         /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed.len()
                    );
                    smask_data.extend_from_slice(&compressed);
                    smask_data.extend_from_slice(b"\nendstream");
                    builder.objects.push(PdfObject { data: smask_data });
                    smask_obj_id
                });

                let compressed = compress_to_vec_zlib(rgb, 6);
                let obj_id = builder.objects.len();
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace /DeviceRGB \
                     /BitsPerComponent 8 \
                     /Filter /FlateDecode \
                     /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed.len(),
                    smask_ref
                );
                obj_data.extend_from_slice(&compressed);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }
        }
    }

    fn build_xobject_resource_dict(&self, builder: &PdfBuilder, page_idx: usize) -> String {
        builder.page_images[page_idx]
            .iter()
            .map(|&idx| format!("/Im{} {} 0 R", idx, builder.image_objects[idx]))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn fill_color(c: Rgb) -> String {
        format!(
            "{:.3} {:.3} {:.3}",
            c.0 as f64 / 255.0,
            c.1 as f64 / 255.0,
            c.2 as f64 / 255.0
        )
    }

    fn stroke_color(c: Rgb) -> String {
        Self::fill_color(c)
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// contains special mappings for smart quotes, bullets, dashes, etc.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82), // Single low-9 quotation mark
            0x0192 => Some(0x83), // Latin small letter f with hook
            0x201E => Some(0x84), // Double low-9 quotation mark
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2020 => Some(0x86), // Dagger
            0x2021 => Some(0x87), // Double dagger
            0x02C6 => Some(0x88), // Modifier letter circumflex accent
            0x2030 => Some(0x89), // Per mille sign
            0x0160 => Some(0x8A), // Latin capital letter S with caron
            0x2039 => Some(0x8B), // Single left-pointing angle quotation
            0x0152 => Some(0x8C), // Latin capital ligature OE
            0x017D => Some(0x8E), // Latin capital letter Z with caron
            0x2018 => Some(0x91), // Left single quotation mark
            0x2019 => Some(0x92), // Right single quotation mark
            0x201C => Some(0x93), // Left double quotation mark
            0x201D => Some(0x94), // Right double quotation mark
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98), // Small tilde
            0x2122 => Some(0x99), // Trade mark sign
            0x0161 => Some(0x9A), // Latin small letter s with caron
            0x203A => Some(0x9B), // Single right-pointing angle quotation
            0x0153 => Some(0x9C), // Latin small ligature oe
            0x017E => Some(0x9E), // Latin small letter z with caron
            0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{} 0 obj\n", i);
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for i in 1..builder.objects.len() {
            let _ = write!(output, "{:010} 00000 n \n", offsets[i]);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logo::Logo;
    use crate::model::LineItem;

    fn pdf_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_render_produces_valid_pdf_shell() {
        let bytes = render(&ProposalData::sample()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7\n"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        let text = pdf_text(&bytes);
        assert!(text.contains("/BaseFont /Helvetica"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("/Filter /FlateDecode"));
        assert!(text.contains("/Type /Catalog"));
    }

    #[test]
    fn test_xref_offset_points_at_xref_table() {
        let bytes = render(&ProposalData::sample()).unwrap();
        let text = pdf_text(&bytes);
        let start = text.rfind("startxref\n").unwrap() + "startxref\n".len();
        let end = text[start..].find('\n').unwrap() + start;
        let offset: usize = text[start..end].trim().parse().unwrap();
        assert_eq!(&bytes[offset..offset + 4], b"xref");
    }

    #[test]
    fn test_page_count_matches_layout() {
        let mut data = ProposalData::sample();
        data.line_items = (0..80)
            .map(|i| LineItem::new(format!("i{}", i), "Work", 1.0, 10.0))
            .collect();
        let pages = layout::paginate(&data);
        let bytes = render(&data).unwrap();
        let text = pdf_text(&bytes);
        assert!(text.contains(&format!("/Count {}", pages.len())));
        assert!(pages.len() > 1);
    }

    #[test]
    fn test_content_stream_draws_title_and_colors() {
        let pages = layout::paginate(&ProposalData::sample());
        let content = PdfWriter::page_content(&pages[0], &[]);
        assert!(content.contains("(PROPOSAL) Tj"));
        // Header band fill is slate-50.
        assert!(content.contains("0.973 0.980 0.988 rg"));
        // Title is set in the bold font.
        assert!(content.contains("/F1 26.0 Tf"));
    }

    #[test]
    fn test_euro_symbol_encodes_as_winansi_octal() {
        let mut data = ProposalData::sample();
        let patch = ProposalData::currency_patch("EUR").unwrap();
        data = data.apply(patch);
        let pages = layout::paginate(&data);
        let content = PdfWriter::page_content(&pages[0], &[]);
        assert!(content.contains("\\200"), "euro must map to WinAnsi 0x80");
    }

    #[test]
    fn test_parentheses_in_text_are_escaped() {
        let mut data = ProposalData::sample();
        data.line_items = vec![LineItem::new("1", "Work (phase 1)", 1.0, 10.0)];
        let pages = layout::paginate(&data);
        let content = PdfWriter::page_content(&pages[0], &[]);
        assert!(content.contains("(Work \\(phase 1\\)) Tj"));
    }

    #[test]
    fn test_logo_becomes_image_xobject() {
        let mut data = ProposalData::sample();
        let png = crate::logo::test_png_bytes(10, 20, 30, 255);
        data.business_info.logo = Some(Logo::from_upload("image/png", &png).unwrap());
        let bytes = render(&data).unwrap();
        let text = pdf_text(&bytes);
        assert!(text.contains("/Subtype /Image"));
        assert!(text.contains("/Im0"));

        data.business_info.logo = None;
        let text = pdf_text(&render(&data).unwrap());
        assert!(!text.contains("/Subtype /Image"));
    }

    #[test]
    fn test_translucent_logo_gets_smask() {
        let mut data = ProposalData::sample();
        let png = crate::logo::test_png_bytes(10, 20, 30, 100);
        data.business_info.logo = Some(Logo::from_upload("image/png", &png).unwrap());
        let text = pdf_text(&render(&data).unwrap());
        assert!(text.contains("/SMask"));
    }

    #[test]
    fn test_undecodable_logo_is_skipped_not_fatal() {
        let mut data = ProposalData::sample();
        data.business_info.logo = Some(Logo::from_source("data:image/png;base64,not-base64!"));
        let bytes = render(&data).unwrap();
        assert!(!pdf_text(&bytes).contains("/Subtype /Image"));
    }

    #[test]
    fn test_info_dictionary_carries_title() {
        let mut data = ProposalData::sample();
        data.business_info.name = "Acme".to_string();
        let text = pdf_text(&render(&data).unwrap());
        assert!(text.contains("/Title (Proposal PRO-001)"));
        assert!(text.contains("/Author (Acme)"));
    }

    #[test]
    fn test_export_pairs_bytes_with_filename() {
        let mut data = ProposalData::sample();
        data.client_info.name = "Acme Corp".to_string();
        let (filename, bytes) = export(&data).unwrap();
        assert_eq!(filename, "proposal-pro-001-acme-corp.pdf");
        assert!(bytes.starts_with(b"%PDF-1.7"));
    }
}

//! # Page layout
//!
//! Fixed-geometry composition of a proposal onto A4 pages. All positions
//! are computed here, in points, against the font metric tables; the
//! serializer only translates the resulting elements into PDF operators.
//!
//! The geometry is deliberately independent of the HTML preview: a header
//! band, right-aligned document meta, two address columns, the line item
//! table (paginating, header row repeated per page), the totals block,
//! notes and terms, and a centered footer on every page.

use crate::logo::DecodedLogo;
use crate::model::ProposalData;
pub use crate::pdf::metrics::Font;
use crate::text;
use crate::view::ProposalView;

/// Millimetres to points.
const MM: f64 = 72.0 / 25.4;

/// A4 portrait.
pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;

/// sRGB color, 0..=255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const PRIMARY: Rgb = Rgb(37, 99, 235);
pub const DARK: Rgb = Rgb(17, 24, 39);
pub const MUTED: Rgb = Rgb(107, 114, 128);
pub const LIGHT_BG: Rgb = Rgb(248, 250, 252);
pub const ALT_ROW: Rgb = Rgb(249, 250, 251);
pub const WHITE: Rgb = Rgb(255, 255, 255);

/// One resolved draw element. Coordinates are points with the origin at
/// the top-left corner; text `y` is the baseline. The serializer flips
/// into PDF's bottom-up space.
#[derive(Debug, Clone)]
pub enum Element {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Rgb,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke_width: f64,
        color: Rgb,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        font: Font,
        size: f64,
        color: Rgb,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: DecodedLogo,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub elements: Vec<Element>,
}

const MARGIN: f64 = 18.0 * MM;
const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;
/// Content must stay above this line; the footer sits below it.
const BOTTOM_LIMIT: f64 = PAGE_HEIGHT - 20.0 * MM;

/// Table geometry: fixed numeric column widths, description takes the rest.
const CELL_PAD: f64 = 4.0 * MM;
const QTY_W: f64 = 18.0 * MM;
const PRICE_W: f64 = 32.0 * MM;
const TOTAL_W: f64 = 32.0 * MM;
const DESC_W: f64 = CONTENT_WIDTH - QTY_W - PRICE_W - TOTAL_W;
const TABLE_FONT_SIZE: f64 = 9.0;
const TABLE_LINE_H: f64 = 3.7 * MM;

/// Lay the proposal out onto one or more pages.
pub fn paginate(data: &ProposalData) -> Vec<Page> {
    let view = ProposalView::of(data);

    // A logo that fails to decode is skipped, not fatal.
    let logo = data.business_info.logo.as_ref().and_then(|l| match l.decode() {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            log::warn!("skipping logo: {}", err);
            None
        }
    });

    let mut composer = Composer::new();
    composer.header(&view, logo);
    let mut y = composer.address_blocks(&view, 58.0 * MM);
    y = composer.items_table(&view, y + 4.0 * MM);
    y = composer.totals(&view, y + 6.0 * MM);
    composer.notes_and_terms(&view, y + 8.0 * MM);
    composer.finish(&view.footer)
}

struct Composer {
    pages: Vec<Page>,
    current: Page,
}

impl Composer {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Page::default(),
        }
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
    }

    /// Close the current page and stamp the footer on every page.
    fn finish(mut self, footer: &str) -> Vec<Page> {
        self.pages.push(self.current);
        let footer_y = PAGE_HEIGHT - 8.0 * MM;
        for page in &mut self.pages {
            let x = (PAGE_WIDTH - Font::Helvetica.text_width(footer, 7.5)) / 2.0;
            page.elements.push(Element::Text {
                x,
                y: footer_y,
                text: footer.to_string(),
                font: Font::Helvetica,
                size: 7.5,
                color: MUTED,
            });
        }
        self.pages
    }

    fn text_left(&mut self, x: f64, y: f64, s: &str, font: Font, size: f64, color: Rgb) {
        if s.is_empty() {
            return;
        }
        self.current.elements.push(Element::Text {
            x,
            y,
            text: s.to_string(),
            font,
            size,
            color,
        });
    }

    fn text_right(&mut self, right: f64, y: f64, s: &str, font: Font, size: f64, color: Rgb) {
        let x = right - font.text_width(s, size);
        self.text_left(x, y, s, font, size, color);
    }

    /// Header band: logo on the left, title and document meta on the right.
    fn header(&mut self, view: &ProposalView, logo: Option<DecodedLogo>) {
        self.current.elements.push(Element::Rect {
            x: 0.0,
            y: 0.0,
            width: PAGE_WIDTH,
            height: 52.0 * MM,
            fill: LIGHT_BG,
        });

        if let Some(image) = logo {
            let (w, h) = image.fit_within(55.0 * MM, 22.0 * MM);
            self.current.elements.push(Element::Image {
                x: MARGIN,
                y: 22.0 * MM,
                width: w,
                height: h,
                image,
            });
        }

        let right = PAGE_WIDTH - MARGIN;
        self.text_right(right, 28.0 * MM, "PROPOSAL", Font::HelveticaBold, 26.0, PRIMARY);
        self.text_right(right, 35.0 * MM, &format!("#{}", view.number), Font::Helvetica, 9.0, MUTED);
        self.text_right(
            right,
            40.0 * MM,
            &format!("Date: {}", view.date),
            Font::Helvetica,
            9.0,
            MUTED,
        );
        if !view.valid_until.is_empty() {
            self.text_right(
                right,
                45.0 * MM,
                &format!("Valid until: {}", view.valid_until),
                Font::Helvetica,
                9.0,
                MUTED,
            );
        }
    }

    /// FROM and BILL TO columns side by side. Detail lines word-wrap
    /// inside their column. Returns the y below the taller of the two.
    fn address_blocks(&mut self, view: &ProposalView, y: f64) -> f64 {
        let col_w = CONTENT_WIDTH / 2.0 - 4.0 * MM;
        let to_x = MARGIN + col_w + 8.0 * MM;

        let from_rows =
            self.address_column(MARGIN, y, "FROM", &view.business_name, &view.from_lines, col_w);
        let to_rows =
            self.address_column(to_x, y, "BILL TO", &view.client_name, &view.to_lines, col_w);

        let rows = from_rows.max(to_rows);
        y + (rows as f64 * 5.0 + 20.0) * MM
    }

    /// One address column. Returns how many detail rows it drew after
    /// wrapping.
    fn address_column(
        &mut self,
        x: f64,
        y: f64,
        heading: &str,
        name: &str,
        lines: &[String],
        col_w: f64,
    ) -> usize {
        self.text_left(x, y, heading, Font::HelveticaBold, 8.0, MUTED);
        self.text_left(x, y + 6.0 * MM, name, Font::HelveticaBold, 10.0, DARK);
        let mut row = 0;
        for line in lines {
            for wrapped in text::wrap(line, Font::Helvetica, 8.5, col_w) {
                self.text_left(
                    x,
                    y + (12.0 + row as f64 * 5.0) * MM,
                    &wrapped,
                    Font::Helvetica,
                    8.5,
                    MUTED,
                );
                row += 1;
            }
        }
        row
    }

    fn table_header(&mut self, y: f64) -> f64 {
        let h = 2.0 * CELL_PAD + TABLE_LINE_H;
        self.current.elements.push(Element::Rect {
            x: MARGIN,
            y,
            width: CONTENT_WIDTH,
            height: h,
            fill: PRIMARY,
        });
        let baseline = y + CELL_PAD + 0.72 * TABLE_FONT_SIZE;
        let font = Font::HelveticaBold;
        self.text_left(MARGIN + CELL_PAD, baseline, "Description", font, TABLE_FONT_SIZE, WHITE);
        let qty_right = MARGIN + DESC_W + QTY_W - CELL_PAD;
        let price_right = MARGIN + DESC_W + QTY_W + PRICE_W - CELL_PAD;
        let total_right = MARGIN + CONTENT_WIDTH - CELL_PAD;
        self.text_right(qty_right, baseline, "Qty", font, TABLE_FONT_SIZE, WHITE);
        self.text_right(price_right, baseline, "Unit Price", font, TABLE_FONT_SIZE, WHITE);
        self.text_right(total_right, baseline, "Total", font, TABLE_FONT_SIZE, WHITE);
        y + h
    }

    /// The line item table. Rows that would cross the bottom limit move to
    /// a fresh page, where the header row is drawn again. Returns the y
    /// below the last row.
    fn items_table(&mut self, view: &ProposalView, y: f64) -> f64 {
        let mut y = self.table_header(y);

        for (i, item) in view.items.iter().enumerate() {
            let desc_lines = text::wrap(
                &item.description,
                Font::Helvetica,
                TABLE_FONT_SIZE,
                DESC_W - 2.0 * CELL_PAD,
            );
            let row_h = 2.0 * CELL_PAD + desc_lines.len() as f64 * TABLE_LINE_H;

            if y + row_h > BOTTOM_LIMIT {
                self.break_page();
                y = self.table_header(MARGIN);
            }

            if i % 2 == 1 {
                self.current.elements.push(Element::Rect {
                    x: MARGIN,
                    y,
                    width: CONTENT_WIDTH,
                    height: row_h,
                    fill: ALT_ROW,
                });
            }

            let baseline = y + CELL_PAD + 0.72 * TABLE_FONT_SIZE;
            for (li, line) in desc_lines.iter().enumerate() {
                self.text_left(
                    MARGIN + CELL_PAD,
                    baseline + li as f64 * TABLE_LINE_H,
                    line,
                    Font::Helvetica,
                    TABLE_FONT_SIZE,
                    DARK,
                );
            }
            let qty_right = MARGIN + DESC_W + QTY_W - CELL_PAD;
            let price_right = MARGIN + DESC_W + QTY_W + PRICE_W - CELL_PAD;
            let total_right = MARGIN + CONTENT_WIDTH - CELL_PAD;
            self.text_right(qty_right, baseline, &item.quantity, Font::Helvetica, TABLE_FONT_SIZE, DARK);
            self.text_right(price_right, baseline, &item.unit_price, Font::Helvetica, TABLE_FONT_SIZE, DARK);
            self.text_right(total_right, baseline, &item.total, Font::Helvetica, TABLE_FONT_SIZE, DARK);

            y += row_h;
        }

        y
    }

    /// Subtotal, optional tax, divider, grand total. Moves to a new page
    /// as a unit if it would cross the bottom limit.
    fn totals(&mut self, view: &ProposalView, y: f64) -> f64 {
        let block_h = (5.5 + 4.0 + 7.0) * MM + if view.tax.is_some() { 5.5 * MM } else { 0.0 };
        let mut ty = if y + block_h > BOTTOM_LIMIT {
            self.break_page();
            MARGIN
        } else {
            y
        };

        let totals_x = PAGE_WIDTH - MARGIN - 75.0 * MM;
        let right = PAGE_WIDTH - MARGIN;

        self.text_left(totals_x, ty, "Subtotal:", Font::Helvetica, 9.0, MUTED);
        self.text_right(right, ty, &view.subtotal, Font::Helvetica, 9.0, MUTED);
        ty += 5.5 * MM;

        if let Some(tax) = &view.tax {
            self.text_left(totals_x, ty, &format!("{}:", tax.label), Font::Helvetica, 9.0, MUTED);
            self.text_right(right, ty, &tax.amount, Font::Helvetica, 9.0, MUTED);
            ty += 5.5 * MM;
        }

        self.current.elements.push(Element::Line {
            x1: totals_x,
            y1: ty,
            x2: right,
            y2: ty,
            stroke_width: 0.5 * MM,
            color: PRIMARY,
        });
        ty += 4.0 * MM;

        self.text_left(totals_x, ty, "TOTAL:", Font::HelveticaBold, 11.0, DARK);
        self.text_right(right, ty, &view.grand_total, Font::HelveticaBold, 11.0, DARK);
        ty + 7.0 * MM
    }

    /// Notes at half width, terms at full width. Each heading moves to a
    /// new page with its text if the heading would cross the limit;
    /// overlong wrapped text paginates line by line.
    fn notes_and_terms(&mut self, view: &ProposalView, y: f64) {
        let mut ty = y;
        if !view.notes.is_empty() {
            ty = self.text_block(
                ty,
                "Notes",
                &view.notes,
                CONTENT_WIDTH / 2.0 - 4.0 * MM,
            );
        }
        if !view.terms.is_empty() {
            if !view.notes.is_empty() {
                ty += 4.0 * MM;
            }
            self.text_block(ty, "Terms & Conditions", &view.terms, CONTENT_WIDTH);
        }
    }

    fn text_block(&mut self, y: f64, heading: &str, body: &str, width: f64) -> f64 {
        let mut ty = if y + 10.0 * MM > BOTTOM_LIMIT {
            self.break_page();
            MARGIN
        } else {
            y
        };

        self.text_left(MARGIN, ty, heading, Font::HelveticaBold, 9.0, DARK);
        ty += 5.0 * MM;
        for line in text::wrap(body, Font::Helvetica, 8.5, width) {
            if ty > BOTTOM_LIMIT {
                self.break_page();
                ty = MARGIN;
            }
            self.text_left(MARGIN, ty, &line, Font::Helvetica, 8.5, MUTED);
            ty += 5.0 * MM;
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineItem;

    fn texts(page: &Page) -> Vec<&str> {
        page.elements
            .iter()
            .filter_map(|e| match e {
                Element::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_sample_fits_one_page() {
        let pages = paginate(&ProposalData::sample());
        assert_eq!(pages.len(), 1);
        let texts = texts(&pages[0]);
        assert!(texts.contains(&"PROPOSAL"));
        assert!(texts.contains(&"#PRO-001"));
        assert!(texts.contains(&"Subtotal:"));
        assert!(texts.contains(&"TOTAL:"));
        assert!(texts.contains(&"USD $3740.00"));
    }

    #[test]
    fn test_many_items_paginate_with_repeated_header() {
        let mut data = ProposalData::sample();
        data.line_items = (0..80)
            .map(|i| LineItem::new(format!("i{}", i), format!("Item {}", i), 1.0, 10.0))
            .collect();
        let pages = paginate(&data);
        assert!(pages.len() > 1, "80 rows must overflow one A4 page");
        // Every page restates the table header.
        for page in &pages {
            let texts = texts(page);
            assert!(texts.contains(&"Description"), "header row missing on a page");
        }
        // Totals land on the last page only.
        assert!(texts(pages.last().unwrap()).contains(&"TOTAL:"));
        assert!(!texts(&pages[0]).contains(&"TOTAL:"));
    }

    #[test]
    fn test_every_page_has_footer() {
        let mut data = ProposalData::sample();
        data.business_info.name = "Acme".to_string();
        data.line_items = (0..80)
            .map(|i| LineItem::new(format!("i{}", i), "Work", 1.0, 10.0))
            .collect();
        let pages = paginate(&data);
        for page in &pages {
            assert!(texts(page)
                .iter()
                .any(|t| t.starts_with("Generated by Proposely")));
        }
    }

    #[test]
    fn test_long_address_line_wraps_within_its_column() {
        let mut data = ProposalData::sample();
        data.terms = String::new();
        data.business_info.address =
            "Unit 4, The Old Printworks, 128 Long Acre Industrial Estate, Building C".to_string();
        let pages = paginate(&data);

        let col_w = CONTENT_WIDTH / 2.0 - 4.0 * MM;
        let to_x = MARGIN + col_w + 8.0 * MM;
        // With terms cleared, the left-edge 8.5pt regular texts are
        // exactly the FROM detail lines.
        let mut from_lines = 0;
        for e in &pages[0].elements {
            if let Element::Text { x, text, font, size, .. } = e {
                let is_from_detail =
                    (*x - MARGIN).abs() < 1e-6 && *size == 8.5 && *font == Font::Helvetica;
                if is_from_detail {
                    from_lines += 1;
                    let right = x + font.text_width(text, *size);
                    assert!(
                        right <= to_x - 1e-6,
                        "{:?} crosses into the BILL TO column",
                        text
                    );
                    assert!(right <= MARGIN + col_w + 1e-6);
                }
            }
        }
        assert!(from_lines > 1, "overlong address should wrap to multiple lines");
    }

    #[test]
    fn test_numeric_columns_right_aligned() {
        let mut data = ProposalData::sample();
        data.line_items = vec![
            LineItem::new("1", "a", 1.0, 5.0),
            LineItem::new("2", "b", 100.0, 5000.0),
        ];
        let pages = paginate(&data);
        let price_right = MARGIN + DESC_W + QTY_W + PRICE_W - CELL_PAD;
        let total_right = MARGIN + CONTENT_WIDTH - CELL_PAD;
        let totals_block_right = PAGE_WIDTH - MARGIN;
        // Every money string ends exactly on one of the right-aligned edges.
        let mut checked = 0;
        for e in &pages[0].elements {
            if let Element::Text { x, text, font, size, .. } = e {
                if text.starts_with('$') {
                    let edge = x + font.text_width(text, *size);
                    assert!(
                        [price_right, total_right, totals_block_right]
                            .iter()
                            .any(|r| (edge - r).abs() < 1e-6),
                        "{} not right-aligned", text
                    );
                    checked += 1;
                }
            }
        }
        assert!(checked >= 5);
    }

    #[test]
    fn test_zero_tax_has_no_tax_row() {
        let mut data = ProposalData::sample();
        data.tax_rate = 0.0;
        let pages = paginate(&data);
        assert!(!texts(&pages[0]).iter().any(|t| t.starts_with("Tax (")));
    }

    #[test]
    fn test_empty_items_renders_header_only_table() {
        let mut data = ProposalData::sample();
        data.line_items.clear();
        let pages = paginate(&data);
        assert_eq!(pages.len(), 1);
        let texts = texts(&pages[0]);
        assert!(texts.contains(&"Description"));
        assert!(texts.contains(&"$0.00"));
    }

    #[test]
    fn test_long_description_wraps_within_column() {
        let mut data = ProposalData::sample();
        data.line_items = vec![LineItem::new(
            "1",
            "Full redesign of the marketing website including discovery workshops, \
             wireframes, visual design, and responsive implementation",
            1.0,
            9000.0,
        )];
        let pages = paginate(&data);
        // Description cells sit at the left cell padding in the regular
        // table font; collect them and check they stay inside the column.
        let mut desc_lines = 0;
        for e in &pages[0].elements {
            if let Element::Text { x, text, font, size, .. } = e {
                let is_desc_cell = (*x - (MARGIN + CELL_PAD)).abs() < 1e-6
                    && *size == TABLE_FONT_SIZE
                    && *font == Font::Helvetica;
                if is_desc_cell {
                    desc_lines += 1;
                    let right = x + font.text_width(text, *size);
                    assert!(right <= MARGIN + DESC_W - CELL_PAD + 1e-6);
                }
            }
        }
        assert!(desc_lines > 1, "long description should wrap to multiple lines");
    }
}

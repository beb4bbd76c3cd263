//! # Font metrics
//!
//! Advance widths for the two standard PDF fonts the document uses,
//! taken from the Adobe AFM files (1000 units per em). Standard fonts
//! need no embedding, so measurement is a table lookup.

/// The fonts available to the layout. Both map to standard Type1 fonts
/// every PDF viewer ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    /// PostScript base font name for the /BaseFont entry.
    pub fn base_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Advance width of a character in 1/1000 em.
    pub fn advance(&self, ch: char) -> u16 {
        let table = match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        let code = ch as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            self.extended_advance(ch)
        }
    }

    /// Advance width of a character in points at the given size.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.advance(ch) as f64 / 1000.0 * font_size
    }

    /// Width of a string in points at the given size.
    pub fn text_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }

    /// WinAnsi characters outside ASCII that show up in proposal text:
    /// currency symbols, typographic punctuation, accented Latin-1.
    fn extended_advance(&self, ch: char) -> u16 {
        let bold = matches!(self, Font::HelveticaBold);
        match ch {
            '\u{20AC}' => 556,                     // euro
            '\u{00A3}' | '\u{00A5}' => 556,        // pound, yen
            '\u{00A9}' | '\u{00AE}' => 737,        // copyright, registered
            '\u{00B0}' => 400,                     // degree
            '\u{2013}' => 556,                     // en dash
            '\u{2014}' => 1000,                    // em dash
            '\u{2018}' | '\u{2019}' => {
                if bold { 278 } else { 222 }
            }
            '\u{201C}' | '\u{201D}' => {
                if bold { 500 } else { 333 }
            }
            '\u{2022}' => 350,                     // bullet
            '\u{00C0}'..='\u{00FF}' => {
                // Accented Latin letters inherit their base letter's width
                // closely enough for layout; fall through to the default.
                DEFAULT_ADVANCE
            }
            _ => DEFAULT_ADVANCE,
        }
    }
}

/// Fallback for characters outside the tables (roughly a lowercase 'o').
const DEFAULT_ADVANCE: u16 = 556;

/// Helvetica advance widths for chars 32..=126, from Helvetica.afm.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, // A..P
    778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // Q..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, // a..p
    556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // q..z
    334, 260, 334, 584, // {..~
];

/// Helvetica-Bold advance widths for chars 32..=126, from Helvetica-Bold.afm.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, // A..P
    778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // Q..Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, // a..p
    611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // q..z
    389, 280, 389, 584, // {..~
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_widths() {
        assert_eq!(Font::Helvetica.advance(' '), 278);
        assert_eq!(Font::Helvetica.advance('0'), 556);
        assert_eq!(Font::Helvetica.advance('@'), 1015);
        assert_eq!(Font::Helvetica.advance('i'), 222);
        assert_eq!(Font::Helvetica.advance('W'), 944);
        assert_eq!(Font::HelveticaBold.advance('i'), 278);
        assert_eq!(Font::HelveticaBold.advance('@'), 975);
    }

    #[test]
    fn test_digits_are_tabular() {
        // All digits share one width so numeric columns align.
        for font in [Font::Helvetica, Font::HelveticaBold] {
            for d in '0'..='9' {
                assert_eq!(font.advance(d), 556);
            }
        }
    }

    #[test]
    fn test_currency_symbols() {
        assert_eq!(Font::Helvetica.advance('$'), 556);
        assert_eq!(Font::Helvetica.advance('\u{20AC}'), 556);
        assert_eq!(Font::Helvetica.advance('\u{00A3}'), 556);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let at_10 = Font::Helvetica.text_width("Total", 10.0);
        let at_20 = Font::Helvetica.text_width("Total", 20.0);
        assert!((at_20 - at_10 * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_bold_is_at_least_as_wide() {
        for code in 32u32..=126 {
            let ch = char::from_u32(code).unwrap();
            assert!(
                Font::HelveticaBold.advance(ch) + 60 >= Font::Helvetica.advance(ch),
                "char {:?}",
                ch
            );
        }
    }
}

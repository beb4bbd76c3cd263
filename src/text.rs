//! # Text wrapping
//!
//! Greedy word-wrapping against the font metric tables. Layout hands
//! every multi-line region (item descriptions, notes, terms) through
//! here so cell heights and page breaks are computed from the same
//! measurements the content stream is drawn with.

use crate::pdf::metrics::Font;

/// Break `text` into lines no wider than `max_width` points.
///
/// Words longer than the full width are split mid-word rather than
/// overflowing. Explicit newlines in the input force breaks. Always
/// returns at least one (possibly empty) line.
pub fn wrap(text: &str, font: Font, font_size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, font, font_size, max_width, &mut lines);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn wrap_paragraph(
    paragraph: &str,
    font: Font,
    font_size: f64,
    max_width: f64,
    lines: &mut Vec<String>,
) {
    let mut line = String::new();
    let mut line_width = 0.0;
    let space_width = font.char_width(' ', font_size);

    for word in paragraph.split_whitespace() {
        let word_width = font.text_width(word, font_size);
        if line.is_empty() {
            if word_width <= max_width {
                line.push_str(word);
                line_width = word_width;
            } else {
                line_width = push_split_word(word, font, font_size, max_width, lines, &mut line);
            }
        } else if line_width + space_width + word_width <= max_width {
            line.push(' ');
            line.push_str(word);
            line_width += space_width + word_width;
        } else {
            lines.push(std::mem::take(&mut line));
            if word_width <= max_width {
                line.push_str(word);
                line_width = word_width;
            } else {
                line_width = push_split_word(word, font, font_size, max_width, lines, &mut line);
            }
        }
    }
    lines.push(line);
}

/// Hard-split an overlong word character by character. The final
/// fragment becomes the new current line; returns its width.
fn push_split_word(
    word: &str,
    font: Font,
    font_size: f64,
    max_width: f64,
    lines: &mut Vec<String>,
    line: &mut String,
) -> f64 {
    let mut width = 0.0;
    for ch in word.chars() {
        let cw = font.char_width(ch, font_size);
        if width + cw > max_width && !line.is_empty() {
            lines.push(std::mem::take(line));
            width = 0.0;
        }
        line.push(ch);
        width += cw;
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_stays_on_one_line() {
        let lines = wrap("Consulting", Font::Helvetica, 9.0, 200.0);
        assert_eq!(lines, vec!["Consulting"]);
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        let lines = wrap(
            "Design and development of marketing website",
            Font::Helvetica,
            9.0,
            80.0,
        );
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(Font::Helvetica.text_width(line, 9.0) <= 80.0 + 1e-9);
        }
        // No words lost or reordered.
        assert_eq!(
            lines.join(" "),
            "Design and development of marketing website"
        );
    }

    #[test]
    fn test_empty_text_is_one_empty_line() {
        assert_eq!(wrap("", Font::Helvetica, 9.0, 100.0), vec![""]);
    }

    #[test]
    fn test_explicit_newlines_force_breaks() {
        let lines = wrap("a\nb\nc", Font::Helvetica, 9.0, 500.0);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_overlong_word_is_split() {
        let word = "x".repeat(200);
        let lines = wrap(&word, Font::Helvetica, 9.0, 50.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(Font::Helvetica.text_width(line, 9.0) <= 50.0 + 1e-9);
        }
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_whitespace_collapses() {
        let lines = wrap("a   b \t c", Font::Helvetica, 9.0, 500.0);
        assert_eq!(lines, vec!["a b c"]);
    }

}

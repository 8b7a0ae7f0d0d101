//! Text measurement and word wrapping.
//!
//! Widths use the Helvetica metrics of the standard PDF fonts, which is
//! what the writer embeds by default. Characters outside printable ASCII
//! get an average width; East Asian wide characters count as a full em.

use super::types::FontStyle;
use unicode_width::UnicodeWidthChar;

/// Points to millimetres
pub const PT_TO_MM: f32 = 25.4 / 72.0;

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const DEFAULT_WIDTH: u16 = 556;
const BOLD_FACTOR: f32 = 1.06;

fn char_units(c: char) -> f32 {
    let code = c as u32;
    let base = if (32..=126).contains(&code) {
        HELVETICA_WIDTHS[(code - 32) as usize]
    } else if c.width().unwrap_or(1) > 1 {
        1000
    } else {
        DEFAULT_WIDTH
    };
    base as f32
}

/// Characters of the Windows-1252 upper half that are not Latin-1
const WIN_ANSI_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

/// True when the builtin PDF fonts can encode `c`
pub fn is_win_ansi(c: char) -> bool {
    let code = c as u32;
    (32..=126).contains(&code) || (0xA0..=0xFF).contains(&code) || WIN_ANSI_EXTRAS.contains(c)
}

/// Rendered width of `text` in millimetres
pub fn text_width(text: &str, size: f32, style: FontStyle) -> f32 {
    let units: f32 = text.chars().map(char_units).sum();
    let factor = if style == FontStyle::Bold { BOLD_FACTOR } else { 1.0 };
    units / 1000.0 * size * PT_TO_MM * factor
}

/// Greedy word wrap to `max_width` millimetres.
///
/// Explicit newlines start a new line. A word wider than the whole line is
/// broken between characters. Always returns at least one line.
pub fn wrap_text(text: &str, size: f32, style: FontStyle, max_width: f32) -> Vec<String> {
    let fits = |s: &str| text_width(s, size, style) <= max_width;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() { word.to_string() } else { format!("{} {}", current, word) };
            if fits(&candidate) {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if fits(word) {
                current = word.to_string();
                continue;
            }
            for c in word.chars() {
                current.push(c);
                if !fits(&current) && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
        lines.push(current);
    }

    lines
}

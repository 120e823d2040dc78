// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glyph advance widths for the standard PDF faces, used to measure lines
// before they are placed.
//
// Widths are in thousandths of an em from the Adobe core font metrics, indexed
// by WinAnsi code from 0x20 to 0xFF. Lines are measured over the same bytes
// the writer emits, so substituted characters are measured as '?'.

use wandelwerk_core::FontFamily;

use super::encoding;

type Widths = [u16; 224];

const FIRST_CODE: u8 = 0x20;
const COURIER_WIDTH: u16 = 600;
const SYMBOL_WIDTH: u16 = 600;
const DINGBAT_WIDTH: u16 = 790;

/// Helvetica and Helvetica-Oblique.
static HELVETICA: Widths = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 350, // 0x70
    556, 350, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350, // 0x80
    350, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 350, 500, 667, // 0x90
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

/// Helvetica-Bold and Helvetica-BoldOblique.
static HELVETICA_BOLD: Widths = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0x30
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 0x50
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 0x60
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 350, // 0x70
    556, 350, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350, // 0x80
    350, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 350, 500, 667, // 0x90
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, // 0xF0
];

/// Times-Roman.
static TIMES_ROMAN: Widths = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // 0x20
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444, // 0x30
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, // 0x40
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500, // 0x50
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, // 0x60
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541, 350, // 0x70
    500, 350, 333, 500, 444, 1000, 500, 500, 333, 1000, 556, 333, 889, 350, 611, 350, // 0x80
    350, 333, 333, 444, 444, 350, 500, 1000, 333, 980, 389, 333, 722, 350, 444, 722, // 0x90
    250, 333, 500, 500, 500, 500, 200, 500, 333, 760, 276, 500, 564, 333, 760, 500, // 0xA0
    400, 564, 300, 300, 333, 500, 453, 250, 333, 300, 310, 500, 750, 750, 750, 444, // 0xB0
    722, 722, 722, 722, 722, 722, 889, 667, 611, 611, 611, 611, 333, 333, 333, 333, // 0xC0
    722, 722, 722, 722, 722, 722, 722, 564, 722, 722, 722, 722, 722, 722, 556, 500, // 0xD0
    444, 444, 444, 444, 444, 444, 667, 444, 444, 444, 444, 444, 278, 278, 278, 278, // 0xE0
    500, 500, 500, 500, 500, 500, 500, 564, 500, 500, 500, 500, 500, 500, 500, 500, // 0xF0
];

/// Times-Bold.
static TIMES_BOLD: Widths = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278, // 0x20
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500, // 0x30
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778, // 0x40
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500, // 0x50
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500, // 0x60
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520, 350, // 0x70
    500, 350, 333, 500, 500, 1000, 500, 500, 333, 1000, 556, 333, 1000, 350, 667, 350, // 0x80
    350, 333, 333, 500, 500, 350, 500, 1000, 333, 1000, 389, 333, 722, 350, 444, 722, // 0x90
    250, 333, 500, 500, 500, 500, 220, 500, 333, 747, 300, 500, 570, 333, 747, 500, // 0xA0
    400, 570, 300, 300, 333, 556, 540, 250, 333, 300, 330, 500, 750, 750, 750, 500, // 0xB0
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 389, 389, 389, 389, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 570, 778, 722, 722, 722, 722, 722, 611, 556, // 0xD0
    500, 500, 500, 500, 500, 500, 722, 444, 444, 444, 444, 444, 278, 278, 278, 278, // 0xE0
    500, 556, 500, 500, 500, 500, 500, 570, 500, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

/// Times-Italic.
static TIMES_ITALIC: Widths = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278, // 0x20
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500, // 0x30
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722, // 0x40
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500, // 0x50
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500, // 0x60
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541, 350, // 0x70
    500, 350, 333, 500, 556, 889, 500, 500, 333, 1000, 500, 333, 944, 350, 556, 350, // 0x80
    350, 333, 333, 556, 556, 350, 500, 889, 333, 980, 389, 333, 667, 350, 389, 556, // 0x90
    250, 389, 500, 500, 500, 500, 275, 500, 333, 760, 276, 500, 675, 333, 760, 500, // 0xA0
    400, 675, 300, 300, 333, 500, 523, 333, 333, 300, 310, 500, 750, 750, 750, 500, // 0xB0
    611, 611, 611, 611, 611, 611, 889, 667, 611, 611, 611, 611, 333, 333, 333, 333, // 0xC0
    722, 667, 722, 722, 722, 722, 722, 675, 722, 722, 722, 722, 722, 556, 611, 500, // 0xD0
    500, 500, 500, 500, 500, 500, 667, 444, 444, 444, 444, 444, 278, 278, 278, 278, // 0xE0
    500, 500, 500, 500, 500, 500, 500, 675, 500, 500, 500, 500, 500, 444, 500, 444, // 0xF0
];

/// Times-BoldItalic.
static TIMES_BOLD_ITALIC: Widths = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278, // 0x20
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500, // 0x30
    832, 667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889, 722, 722, // 0x40
    611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611, 333, 278, 333, 570, 500, // 0x50
    333, 500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778, 556, 500, // 0x60
    500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389, 348, 220, 348, 570, 350, // 0x70
    500, 350, 333, 500, 500, 1000, 500, 500, 333, 1000, 556, 333, 944, 350, 611, 350, // 0x80
    350, 333, 333, 500, 500, 350, 500, 1000, 333, 1000, 389, 333, 722, 350, 389, 611, // 0x90
    250, 389, 500, 500, 500, 500, 220, 500, 333, 747, 266, 500, 606, 333, 747, 500, // 0xA0
    400, 570, 300, 300, 333, 576, 500, 250, 333, 300, 300, 500, 750, 750, 750, 500, // 0xB0
    667, 667, 667, 667, 667, 667, 944, 667, 667, 667, 667, 667, 389, 389, 389, 389, // 0xC0
    722, 722, 722, 722, 722, 722, 722, 570, 722, 722, 722, 722, 722, 611, 611, 500, // 0xD0
    500, 500, 500, 500, 500, 500, 722, 444, 444, 444, 444, 444, 278, 278, 278, 278, // 0xE0
    500, 556, 500, 500, 500, 500, 500, 570, 500, 556, 556, 556, 556, 444, 500, 444, // 0xF0
];

/// Width of the WinAnsi code `code` in thousandths of an em.
pub fn code_width(font: FontFamily, code: u8) -> u16 {
    let table = match font {
        FontFamily::Helvetica | FontFamily::HelveticaOblique => &HELVETICA,
        FontFamily::HelveticaBold | FontFamily::HelveticaBoldOblique => &HELVETICA_BOLD,
        FontFamily::TimesRoman => &TIMES_ROMAN,
        FontFamily::TimesBold => &TIMES_BOLD,
        FontFamily::TimesItalic => &TIMES_ITALIC,
        FontFamily::TimesBoldItalic => &TIMES_BOLD_ITALIC,
        FontFamily::Courier
        | FontFamily::CourierBold
        | FontFamily::CourierOblique
        | FontFamily::CourierBoldOblique => return COURIER_WIDTH,
        // Not WinAnsi faces; a flat width keeps wrapping stable.
        FontFamily::Symbol => return SYMBOL_WIDTH,
        FontFamily::ZapfDingbats => return DINGBAT_WIDTH,
    };
    match code.checked_sub(FIRST_CODE) {
        Some(index) => table[usize::from(index)],
        None => 0,
    }
}

/// Width of `text` set in `font` at `size_pt`, in points.
pub fn text_width_pt(font: FontFamily, size_pt: f32, text: &str) -> f32 {
    let units: u32 = encoding::encode(text)
        .into_iter()
        .map(|code| u32::from(code_width(font, code)))
        .sum();
    units as f32 * size_pt / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courier_is_monospaced() {
        let narrow = text_width_pt(FontFamily::Courier, 10.0, "iiii");
        let wide = text_width_pt(FontFamily::Courier, 10.0, "MMMM");
        assert_eq!(narrow, wide);
        assert!((narrow - 24.0).abs() < f32::EPSILON);
    }

    #[test]
    fn courier_bold_has_the_same_advance() {
        for font in [FontFamily::CourierBold, FontFamily::CourierBoldOblique] {
            assert_eq!(
                text_width_pt(font, 11.0, "Wandelwerk"),
                text_width_pt(FontFamily::Courier, 11.0, "Wandelwerk")
            );
        }
    }

    #[test]
    fn proportional_faces_differ_per_glyph() {
        assert!(code_width(FontFamily::Helvetica, b'i') < code_width(FontFamily::Helvetica, b'W'));
        assert!(code_width(FontFamily::TimesRoman, b' ') < code_width(FontFamily::TimesRoman, b'm'));
    }

    #[test]
    fn bold_faces_use_their_own_metrics() {
        assert_eq!(code_width(FontFamily::Helvetica, b'a'), 556);
        assert_eq!(code_width(FontFamily::HelveticaBold, b'a'), 556);
        assert_eq!(code_width(FontFamily::HelveticaBold, b'b'), 611);
        assert_eq!(code_width(FontFamily::TimesRoman, b'A'), 722);
        assert_eq!(code_width(FontFamily::TimesBold, b'M'), 944);
        assert_eq!(code_width(FontFamily::TimesItalic, b'M'), 833);
    }

    #[test]
    fn accented_letters_are_measured() {
        assert_eq!(code_width(FontFamily::Helvetica, 0xFC), 556);
        assert_eq!(code_width(FontFamily::TimesRoman, 0x80), 500);
        let plain = text_width_pt(FontFamily::Helvetica, 10.0, "Grusse");
        let accented = text_width_pt(FontFamily::Helvetica, 10.0, "Grüße");
        assert!(accented > 0.0 && accented < plain);
    }

    #[test]
    fn unencodable_chars_measure_as_question_mark() {
        assert_eq!(
            text_width_pt(FontFamily::TimesRoman, 10.0, "\u{2192}"),
            text_width_pt(FontFamily::TimesRoman, 10.0, "?")
        );
    }

    #[test]
    fn width_scales_with_size() {
        let small = text_width_pt(FontFamily::Helvetica, 10.0, "hello");
        let large = text_width_pt(FontFamily::Helvetica, 20.0, "hello");
        assert!((large - 2.0 * small).abs() < 1e-3);
    }
}

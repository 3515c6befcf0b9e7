//! Advance widths for the standard PDF fonts the measurer knows without
//! any font data, in 1/1000 em.

/// Widths of a standard font for printable ASCII (U+0020..=U+007E).
pub struct StandardFontMetrics {
    ascii: &'static [u16; 95],
    /// Used for everything outside printable ASCII.
    fallback: u16,
}

impl StandardFontMetrics {
    /// Advance width of `ch` in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let code = ch as u32;
        let units = if (0x20..=0x7E).contains(&code) {
            self.ascii[(code - 0x20) as usize]
        } else {
            self.fallback
        };
        units as f64 / 1000.0 * font_size
    }

    /// Width of a whole string in points, `letter_spacing` added per char.
    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font_size) + letter_spacing)
            .sum()
    }
}

#[rustfmt::skip]
static HELVETICA_ASCII: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

static COURIER_ASCII: [u16; 95] = [600; 95];

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    ascii: &HELVETICA_ASCII,
    fallback: 556,
};

pub static COURIER: StandardFontMetrics = StandardFontMetrics {
    ascii: &COURIER_ASCII,
    fallback: 600,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_space() {
        let w = HELVETICA.char_width(' ', 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn courier_is_monospaced() {
        assert_eq!(COURIER.char_width('i', 10.0), COURIER.char_width('W', 10.0));
        assert!((COURIER.measure_string("abc", 10.0, 0.0) - 18.0).abs() < 1e-9);
    }

    #[test]
    fn letter_spacing_adds_per_char() {
        let plain = HELVETICA.measure_string("Hello", 10.0, 0.0);
        let spaced = HELVETICA.measure_string("Hello", 10.0, 1.0);
        assert!((spaced - plain - 5.0).abs() < 1e-9);
    }
}

//! # Font Metrics
//!
//! Glyph advance widths for the built-in table measurer.
//!
//! Helvetica and Courier are known without font data. Anything else comes
//! from TrueType/OpenType data registered under a family name and parsed
//! with ttf-parser. Unknown families fall back to Helvetica.

pub mod metrics;

pub use metrics::StandardFontMetrics;
use std::collections::HashMap;

use crate::error::{ReflowError, Result};

/// Family used when a cell style names no font, or an unknown one.
pub const DEFAULT_FAMILY: &str = "Helvetica";

#[derive(Debug, Clone, Copy)]
pub enum StandardFont {
    Helvetica,
    Courier,
}

impl StandardFont {
    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            StandardFont::Helvetica => &metrics::HELVETICA,
            StandardFont::Courier => &metrics::COURIER,
        }
    }
}

/// Metrics parsed from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
}

impl CustomFontMetrics {
    /// Advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
        })
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    Standard(StandardFont),
    Custom(CustomFontMetrics),
}

impl FontData {
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        match self {
            FontData::Standard(f) => f.metrics().char_width(ch, font_size),
            FontData::Custom(m) => m.char_width(ch, font_size),
        }
    }
}

/// Font families available for measurement, keyed by family name.
#[derive(Debug, Clone)]
pub struct FontBook {
    fonts: HashMap<String, FontData>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBook {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();
        fonts.insert(
            "Helvetica".to_string(),
            FontData::Standard(StandardFont::Helvetica),
        );
        fonts.insert(
            "Courier".to_string(),
            FontData::Standard(StandardFont::Courier),
        );
        Self { fonts }
    }

    /// Look up a family, falling back to Helvetica.
    pub fn resolve(&self, family: Option<&str>) -> &FontData {
        static HELVETICA: FontData = FontData::Standard(StandardFont::Helvetica);
        family
            .and_then(|f| self.fonts.get(f))
            .or_else(|| self.fonts.get(DEFAULT_FAMILY))
            .unwrap_or(&HELVETICA)
    }

    pub fn contains(&self, family: &str) -> bool {
        self.fonts.contains_key(family)
    }

    /// Register raw font data under `family`.
    pub fn register(&mut self, family: &str, data: &[u8]) -> Result<()> {
        let metrics = CustomFontMetrics::from_font_data(data).ok_or_else(|| {
            ReflowError::Measurement(format!("font `{}` is not a readable TrueType font", family))
        })?;
        log::debug!(
            "registered font `{}` ({} glyphs)",
            family,
            metrics.advance_widths.len()
        );
        self.fonts
            .insert(family.to_string(), FontData::Custom(metrics));
        Ok(())
    }

    /// Register font data given as raw base64 or a `data:` URI.
    pub fn register_base64(&mut self, family: &str, src: &str) -> Result<()> {
        let bytes = decode_source(src)
            .map_err(|e| ReflowError::Measurement(format!("font `{}`: {}", family, e)))?;
        self.register(family, &bytes)
    }

    /// Width of a string in points, `letter_spacing` (pt) added per char.
    pub fn measure_string(
        &self,
        text: &str,
        family: Option<&str>,
        font_size: f64,
        letter_spacing: f64,
    ) -> f64 {
        let font = self.resolve(family);
        text.chars()
            .map(|ch| font.char_width(ch, font_size) + letter_spacing)
            .sum()
    }
}

fn decode_source(src: &str) -> std::result::Result<Vec<u8>, String> {
    use base64::Engine;

    let payload = if src.starts_with("data:") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| "invalid data URI: missing comma".to_string())?;
        &src[comma_pos + 1..]
    } else {
        src
    };
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("base64 decode error: {}", e))
}

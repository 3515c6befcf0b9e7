//! # Text Layout
//!
//! Greedy line breaking for cell text. Break opportunities follow UAX#14;
//! a word wider than the line is split at the character that overflows.

use crate::font::FontBook;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    pub text: String,
    /// Width in points.
    pub width: f64,
}

/// Font parameters for one run of cell text.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle<'a> {
    pub family: Option<&'a str>,
    pub font_size: f64,
    pub letter_spacing: f64,
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Entry `i` is the opportunity to break *before* char `i`. Index 0 is
/// always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx > 0 && char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Break `text` into lines no wider than `max_width` points.
///
/// Empty text is a single empty line, so an empty cell still has the height
/// of one line.
pub fn break_into_lines(
    fonts: &FontBook,
    text: &str,
    max_width: f64,
    style: TextStyle<'_>,
) -> Vec<BrokenLine> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![BrokenLine {
            text: String::new(),
            width: 0.0,
        }];
    }

    let font = fonts.resolve(style.family);
    let widths: Vec<f64> = chars
        .iter()
        .map(|&ch| {
            if is_newline(ch) {
                0.0
            } else {
                font.char_width(ch, style.font_size) + style.letter_spacing
            }
        })
        .collect();
    let break_opps = compute_break_opportunities(text);

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0.0;
    let mut last_break: Option<usize> = None;

    for i in 0..chars.len() {
        match break_opps[i] {
            Some(BreakOpportunity::Mandatory) => {
                lines.push(make_line(&chars[line_start..i], &widths[line_start..i]));
                line_start = i;
                line_width = 0.0;
                last_break = None;
            }
            Some(BreakOpportunity::Allowed) => last_break = Some(i),
            None => {}
        }

        if line_width + widths[i] > max_width && line_start < i {
            // Break at the last opportunity inside this line, else force.
            let break_at = match last_break {
                Some(bp) if bp > line_start => bp,
                _ => i,
            };
            lines.push(make_line(
                &chars[line_start..break_at],
                &widths[line_start..break_at],
            ));
            line_start = break_at;
            line_width = widths[break_at..i].iter().sum();
            last_break = None;
        }

        line_width += widths[i];
    }

    lines.push(make_line(&chars[line_start..], &widths[line_start..]));
    lines
}

/// Build a line, dropping line terminators and trailing spaces.
fn make_line(chars: &[char], widths: &[f64]) -> BrokenLine {
    let mut end = chars.len();
    while end > 0 && (is_newline(chars[end - 1]) || chars[end - 1] == ' ') {
        end -= 1;
    }
    BrokenLine {
        text: chars[..end].iter().filter(|c| !is_newline(**c)).collect(),
        width: widths[..end].iter().sum(),
    }
}

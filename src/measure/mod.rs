//! # Table Measurement
//!
//! The boundary to whatever knows how tall a populated table is. The reflow
//! core only needs `{head_height, body_height}` for a table's style, its
//! available width and its bound rows; [`TableMeasurer`] is that contract.
//!
//! [`MetricsTableMeasurer`] is the built-in implementation: it wraps every
//! cell's text against its column width using font metrics and stacks the
//! resulting row heights.

use crate::error::{ReflowError, Result};
use crate::font::FontBook;
use crate::model::Edges;
use crate::table::{CellStyle, Rows, TableSchema};
use crate::text::{break_into_lines, TextStyle};

/// Millimeters per typographic point.
pub const PT_TO_MM: f64 = 25.4 / 72.0;

/// Everything a measurer gets to look at for one table.
#[derive(Debug, Clone, Copy)]
pub struct MeasureRequest<'a> {
    /// Field key of the table, for diagnostics.
    pub key: &'a str,
    pub table: &'a TableSchema,
    /// Declared width of the table schema.
    pub table_width: f64,
    /// Width the page offers the table.
    pub available_width: f64,
    pub rows: &'a Rows,
}

/// Computed geometry of a populated table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableMeasurement {
    pub head_height: f64,
    pub body_height: f64,
    /// Height of each body row, in order.
    pub row_heights: Vec<f64>,
}

impl TableMeasurement {
    pub fn height(&self) -> f64 {
        self.head_height + self.body_height
    }
}

/// Measures tables once their rows are known.
///
/// Implementations must be pure with respect to shared state: no measurement
/// may depend on another one having happened.
pub trait TableMeasurer {
    fn measure(&self, request: &MeasureRequest<'_>) -> Result<TableMeasurement>;
}

/// Measures tables with real glyph metrics and greedy line breaking.
#[derive(Debug, Clone, Default)]
pub struct MetricsTableMeasurer {
    fonts: FontBook,
}

impl MetricsTableMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fonts(fonts: FontBook) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Column widths in mm for a table `table_width` wide with `columns` columns.
    pub fn column_widths(
        &self,
        table: &TableSchema,
        table_width: f64,
        columns: usize,
    ) -> Result<Vec<f64>> {
        let pcts = &table.head_width_percentages;
        if pcts.is_empty() {
            return Ok(vec![table_width / columns.max(1) as f64; columns]);
        }
        if pcts.len() != columns {
            return Err(ReflowError::Measurement(format!(
                "{} column width percentages for {} columns",
                pcts.len(),
                columns
            )));
        }
        if pcts.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(ReflowError::Measurement(
                "column width percentages must be non-negative".to_string(),
            ));
        }
        let total: f64 = pcts.iter().sum();
        if total <= 0.0 {
            return Err(ReflowError::Measurement(
                "column width percentages sum to zero".to_string(),
            ));
        }
        Ok(pcts.iter().map(|p| table_width * p / total).collect())
    }

    /// Height in mm of one row of cells laid into `col_widths`.
    fn row_height(&self, cells: &[&str], col_widths: &[f64], style: &CellStyle) -> f64 {
        let text_style = TextStyle {
            family: style.font_name.as_deref(),
            font_size: style.font_size,
            letter_spacing: style.character_spacing,
        };
        let chrome_h = style.padding.horizontal() + style.border_width.horizontal();
        let chrome_v = style.padding.vertical() + style.border_width.vertical();
        let line_height_mm = style.font_size * style.line_height * PT_TO_MM;

        col_widths
            .iter()
            .enumerate()
            .map(|(i, col_width)| {
                let text = cells.get(i).copied().unwrap_or("");
                let max_width_pt = ((col_width - chrome_h) / PT_TO_MM).max(0.0);
                let lines = break_into_lines(&self.fonts, text, max_width_pt, text_style).len();
                lines as f64 * line_height_mm + chrome_v
            })
            .fold(0.0, f64::max)
    }
}

fn validate_style(section: &str, style: &CellStyle) -> Result<()> {
    if !style.font_size.is_finite() || style.font_size <= 0.0 {
        return Err(ReflowError::Measurement(format!(
            "{} font size must be positive, got {}",
            section, style.font_size
        )));
    }
    if !style.line_height.is_finite() || style.line_height <= 0.0 {
        return Err(ReflowError::Measurement(format!(
            "{} line height must be positive, got {}",
            section, style.line_height
        )));
    }
    let negative = |e: &Edges| [e.top, e.right, e.bottom, e.left].iter().any(|v| *v < 0.0);
    if negative(&style.padding) || negative(&style.border_width) {
        return Err(ReflowError::Measurement(format!(
            "{} padding and border widths must be non-negative",
            section
        )));
    }
    Ok(())
}

impl TableMeasurer for MetricsTableMeasurer {
    fn measure(&self, request: &MeasureRequest<'_>) -> Result<TableMeasurement> {
        let table = request.table;
        validate_style("head", &table.head_styles)?;
        validate_style("body", &table.body_styles)?;
        if table.table_border_width < 0.0 {
            return Err(ReflowError::Measurement(
                "table border width must be non-negative".to_string(),
            ));
        }

        let table_width = request.table_width.min(request.available_width);
        if !table_width.is_finite() || table_width <= 0.0 {
            return Err(ReflowError::Measurement(format!(
                "table `{}` has no width to lay out into",
                request.key
            )));
        }

        let columns = match table.column_count() {
            0 => request.rows.iter().map(Vec::len).max().unwrap_or(0),
            n => n,
        };
        if columns == 0 {
            return Ok(TableMeasurement {
                head_height: 0.0,
                body_height: 2.0 * table.table_border_width,
                row_heights: vec![],
            });
        }
        let col_widths = self.column_widths(table, table_width, columns)?;

        let head_height = if table.head.is_empty() {
            0.0
        } else {
            let labels: Vec<&str> = table.head.iter().map(String::as_str).collect();
            self.row_height(&labels, &col_widths, &table.head_styles)
        };

        let row_heights: Vec<f64> = request
            .rows
            .iter()
            .map(|row| {
                let cells: Vec<&str> = row.iter().map(String::as_str).collect();
                self.row_height(&cells, &col_widths, &table.body_styles)
            })
            .collect();
        let body_height = row_heights.iter().sum::<f64>() + 2.0 * table.table_border_width;

        Ok(TableMeasurement {
            head_height,
            body_height,
            row_heights,
        })
    }
}

//! # Table Fields
//!
//! A typed view over a `table` schema's properties, and parsing of the bound
//! row content a table is measured against.
//!
//! Lengths are millimeters except font size and character spacing, which are
//! points, and line height, which is a multiplier of the font size.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReflowError, Result};
use crate::model::{Edges, Schema};

/// The type tag of table schemas.
pub const TABLE_TYPE: &str = "table";

/// Rows of cell strings, as bound to a table at reflow time.
pub type Rows = Vec<Vec<String>>;

/// Horizontal alignment of cell text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical alignment of cell text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalAlignment {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Style of every cell in a table section (head or body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    pub alignment: Alignment,
    pub vertical_alignment: VerticalAlignment,
    pub font_size: f64,
    pub line_height: f64,
    pub character_spacing: f64,
    pub font_color: String,
    pub border_color: String,
    pub background_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_background_color: Option<String>,
    pub border_width: Edges,
    pub padding: Edges,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            font_name: None,
            alignment: Alignment::Left,
            vertical_alignment: VerticalAlignment::Middle,
            font_size: 13.0,
            line_height: 1.0,
            character_spacing: 0.0,
            font_color: "#000000".to_string(),
            border_color: "#888888".to_string(),
            background_color: String::new(),
            alternate_background_color: None,
            border_width: Edges::uniform(0.1),
            padding: Edges::uniform(5.0),
        }
    }
}

/// The table-specific properties of a `table` schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    #[serde(default)]
    pub head: Vec<String>,
    #[serde(default)]
    pub head_width_percentages: Vec<f64>,
    #[serde(default)]
    pub head_styles: CellStyle,
    #[serde(default)]
    pub body_styles: CellStyle,
    #[serde(default)]
    pub table_border_width: f64,
    #[serde(default = "default_border_color")]
    pub table_border_color: String,
}

fn default_border_color() -> String {
    "#000000".to_string()
}

impl TableSchema {
    /// Read the table view out of a schema's properties.
    ///
    /// Fails with [`ReflowError::Measurement`] when the style properties are
    /// present but malformed, since the measurer cannot use them.
    pub fn from_schema(schema: &Schema) -> Result<Self> {
        serde_json::from_value(Value::Object(schema.properties.clone())).map_err(|e| {
            ReflowError::Measurement(format!("malformed table style: {}", e))
        })
    }

    /// Write this view back into a schema's properties. Properties the view
    /// does not know about are left alone.
    pub fn apply_to(&self, schema: &mut Schema) -> Result<()> {
        let value = serde_json::to_value(self)
            .map_err(|e| ReflowError::Measurement(format!("cannot serialize table: {}", e)))?;
        if let Value::Object(map) = value {
            schema.properties.extend(map);
        }
        Ok(())
    }

    /// Number of columns the table declares.
    pub fn column_count(&self) -> usize {
        self.head.len().max(self.head_width_percentages.len())
    }
}

/// Parse the bound content of table `key`.
///
/// Absent or blank content is an empty table. Content that is present but
/// not a JSON array of string arrays is an error.
pub fn parse_rows(key: &str, content: Option<&str>) -> Result<Rows> {
    match content {
        None => Ok(Vec::new()),
        Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| ReflowError::content_parse(key, e)),
    }
}

/// Serialize rows back into bound-content form.
pub fn rows_to_content(rows: &Rows) -> String {
    serde_json::to_string(rows).unwrap_or_default()
}

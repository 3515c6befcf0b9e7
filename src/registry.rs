//! # Field-Type Registry
//!
//! Maps a schema's `type` tag to what the reflow engine can do with it.
//! Built once, looked up per field; an unregistered tag is an error rather
//! than a silently skipped field.

use std::collections::HashMap;

use crate::error::{ReflowError, Result};
use crate::measure::{MeasureRequest, TableMeasurer};
use crate::model::Schema;
use crate::table::{parse_rows, TableSchema, TABLE_TYPE};

/// Inputs for measuring one content-dependent field.
pub struct MeasureContext<'a> {
    pub key: &'a str,
    pub schema: &'a Schema,
    /// Bound content for `key`, if the caller supplied any.
    pub content: Option<&'a str>,
    pub available_width: f64,
    pub measurer: &'a dyn TableMeasurer,
}

/// Capabilities of one field type.
pub trait FieldType: Send + Sync {
    fn type_name(&self) -> &str;

    /// Whether the rendered height depends on bound data.
    fn content_dependent(&self) -> bool {
        false
    }

    /// Height once populated, or `None` when the declared height stands.
    fn measure_height(&self, _ctx: &MeasureContext<'_>) -> Result<Option<f64>> {
        Ok(None)
    }
}

/// A field drawn at exactly its declared size.
pub struct FixedField {
    name: String,
}

impl FixedField {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl FieldType for FixedField {
    fn type_name(&self) -> &str {
        &self.name
    }
}

/// Tables grow and shrink with their rows.
pub struct TableField;

impl FieldType for TableField {
    fn type_name(&self) -> &str {
        TABLE_TYPE
    }

    fn content_dependent(&self) -> bool {
        true
    }

    fn measure_height(&self, ctx: &MeasureContext<'_>) -> Result<Option<f64>> {
        let table = TableSchema::from_schema(ctx.schema)?;
        if ctx.content.is_none() {
            log::warn!("no bound content for table `{}`, measuring it empty", ctx.key);
        }
        let rows = parse_rows(ctx.key, ctx.content)?;
        let measurement = ctx.measurer.measure(&MeasureRequest {
            key: ctx.key,
            table: &table,
            table_width: ctx.schema.width,
            available_width: ctx.available_width,
            rows: &rows,
        })?;
        let height = measurement.height();
        if !height.is_finite() || height < 0.0 {
            return Err(ReflowError::Measurement(format!(
                "measurer returned height {} for table `{}`",
                height, ctx.key
            )));
        }
        Ok(Some(height))
    }
}

/// Type tags of the fixed-size field types shipped by default.
pub const BUILTIN_FIXED_TYPES: &[&str] = &[
    "text",
    "multiVariableText",
    "readOnlyText",
    "image",
    "svg",
    "line",
    "rectangle",
    "ellipse",
    "qrcode",
    "japanpost",
    "ean13",
    "ean8",
    "code39",
    "code128",
    "nw7",
    "itf14",
    "upca",
    "upce",
    "gs1datamatrix",
];

/// Type tag to field type.
#[derive(Default)]
pub struct Registry {
    types: HashMap<String, Box<dyn FieldType>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in field types, `table` included.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for name in BUILTIN_FIXED_TYPES {
            registry.register(Box::new(FixedField::new(name)));
        }
        registry.register(Box::new(TableField));
        registry
    }

    /// Register a field type, replacing any previous one with the same tag.
    pub fn register(&mut self, field_type: Box<dyn FieldType>) {
        self.types
            .insert(field_type.type_name().to_string(), field_type);
    }

    pub fn resolve(&self, tag: &str) -> Result<&dyn FieldType> {
        self.types
            .get(tag)
            .map(|t| t.as_ref())
            .ok_or_else(|| ReflowError::UnknownFieldType(tag.to_string()))
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }
}

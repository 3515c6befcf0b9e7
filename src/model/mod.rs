//! # Template Model
//!
//! The input and output representation of the reflow engine. A template is
//! an ordered list of pages; each page maps a unique field key to a
//! positioned [`Schema`]. All pages share one [`PageGeometry`].
//!
//! Coordinates are page-local, top-left origin, in millimeters. The order of
//! fields inside a page is display (z) order, not layout order, so pages keep
//! insertion order through serialization.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ReflowError, Result};

pub mod options;

pub use options::{DeltaPolicy, FontEntry, MeasureWidth, ReflowOptions};

/// Bound input: field key to serialized content, supplied at reflow time.
pub type BoundInput = HashMap<String, String>;

/// A complete template: pages of keyed schemas plus shared page geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "schemas")]
    pub pages: Vec<Page>,

    #[serde(rename = "basePdf")]
    pub geometry: PageGeometry,
}

impl Template {
    pub fn new(geometry: PageGeometry, pages: Vec<Page>) -> Self {
        Self { pages, geometry }
    }

    /// Total number of fields across all pages.
    pub fn field_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// Every `(page_index, key, schema)` in page order, then display order.
    pub fn fields(&self) -> impl Iterator<Item = (usize, &str, &Schema)> {
        self.pages
            .iter()
            .enumerate()
            .flat_map(|(i, page)| page.iter().map(move |(k, s)| (i, k, s)))
    }

    /// Find the page index holding `key`, searching from the first page.
    pub fn page_of(&self, key: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.contains_key(key))
    }

    /// Look up a field by key on any page.
    pub fn find(&self, key: &str) -> Option<&Schema> {
        self.pages.iter().find_map(|p| p.get(key))
    }
}

/// Size and padding of every page in a template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    /// Serialized as `[top, right, bottom, left]`.
    #[serde(with = "edges_as_array")]
    pub padding: Edges,
}

impl PageGeometry {
    pub fn new(width: f64, height: f64, padding: Edges) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    /// A4 portrait in millimeters with no padding.
    pub fn a4() -> Self {
        Self::new(210.0, 297.0, Edges::default())
    }

    /// Width available between the left and right padding.
    pub fn usable_width(&self) -> f64 {
        self.width - self.padding.horizontal()
    }

    /// The lowest `y` a field's bottom edge may reach.
    pub fn content_bottom(&self) -> f64 {
        self.height - self.padding.bottom
    }

    /// Reject geometry that cannot describe a printable area.
    pub fn validate(&self) -> Result<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(ReflowError::Configuration(format!(
                "page width must be positive, got {}",
                self.width
            )));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(ReflowError::Configuration(format!(
                "page height must be positive, got {}",
                self.height
            )));
        }
        let p = &self.padding;
        if [p.top, p.right, p.bottom, p.left]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(ReflowError::Configuration(format!(
                "page padding must be non-negative, got [{}, {}, {}, {}]",
                p.top, p.right, p.bottom, p.left
            )));
        }
        if p.vertical() >= self.height {
            return Err(ReflowError::Configuration(format!(
                "vertical padding {} leaves no room on a page {} high",
                p.vertical(),
                self.height
            )));
        }
        if p.horizontal() >= self.width {
            return Err(ReflowError::Configuration(format!(
                "horizontal padding {} leaves no room on a page {} wide",
                p.horizontal(),
                self.width
            )));
        }
        Ok(())
    }
}

/// Edge values (top, right, bottom, left) used for padding and borders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

impl Edges {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(v: f64) -> Self {
        Self::new(v, v, v, v)
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

mod edges_as_array {
    use super::Edges;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(edges: &Edges, s: S) -> Result<S::Ok, S::Error> {
        [edges.top, edges.right, edges.bottom, edges.left].serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Edges, D::Error> {
        let [top, right, bottom, left] = <[f64; 4]>::deserialize(d)?;
        Ok(Edges::new(top, right, bottom, left))
    }
}

/// Top-left corner of a field, page-local.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One positioned field. `kind` is the type tag (`"table"`, `"text"`, ...);
/// type-specific properties ride along untouched in `properties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Position,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl Schema {
    pub fn new(kind: &str, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            kind: kind.to_string(),
            position: Position { x, y },
            width,
            height,
            properties: Map::new(),
        }
    }

    /// Attach a type-specific property.
    pub fn with_property(mut self, key: &str, value: Value) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    /// Bottom edge of the declared box.
    pub fn bottom(&self) -> f64 {
        self.position.y + self.height
    }

    /// A copy of this schema moved to a new `y`.
    pub fn at_y(&self, y: f64) -> Self {
        let mut moved = self.clone();
        moved.position.y = y;
        moved
    }
}

/// One page: field keys to schemas, in display order. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    fields: Vec<(String, Schema)>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Schema> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. A replaced field keeps its display slot and the
    /// previous schema is returned.
    pub fn insert(&mut self, key: impl Into<String>, schema: Schema) -> Option<Schema> {
        let key = key.into();
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, schema));
        }
        self.fields.push((key, schema));
        None
    }

    pub fn remove(&mut self, key: &str) -> Option<Schema> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.fields.iter().map(|(k, s)| (k.as_str(), s))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>> FromIterator<(K, Schema)> for Page {
    fn from_iter<I: IntoIterator<Item = (K, Schema)>>(iter: I) -> Self {
        let mut page = Page::new();
        for (k, s) in iter {
            page.insert(k, s);
        }
        page
    }
}

impl Serialize for Page {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, s) in &self.fields {
            map.serialize_entry(k, s)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Page {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PageVisitor;

        impl<'de> Visitor<'de> for PageVisitor {
            type Value = Page;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field keys to schemas")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Page, A::Error> {
                let mut fields: Vec<(String, Schema)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, schema)) = access.next_entry::<String, Schema>()? {
                    if fields.iter().any(|(k, _)| *k == key) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate field key `{}` on one page",
                            key
                        )));
                    }
                    fields.push((key, schema));
                }
                Ok(Page { fields })
            }
        }

        deserializer.deserialize_map(PageVisitor)
    }
}

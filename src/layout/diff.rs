//! # Diff Map
//!
//! Measures every content-dependent field against its bound data and records
//! how much taller (or shorter) it turned out than declared, keyed by the
//! bottom edge of the field's *original* box.
//!
//! Two tables whose original bottoms coincide produce one threshold; the one
//! measured last wins. Deltas from separate thresholds are never accumulated
//! here. Whether they add up is the normalizer's [`DeltaPolicy`] decision.
//!
//! [`DeltaPolicy`]: crate::model::DeltaPolicy

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::measure::TableMeasurer;
use crate::model::{BoundInput, MeasureWidth, ReflowOptions, Template};
use crate::registry::{MeasureContext, Registry};

/// A `y` coordinate, totally ordered so it can key a map.
#[derive(Debug, Clone, Copy)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(y: f64) -> Self {
        // Adding 0.0 folds -0.0 into 0.0.
        Threshold(y + 0.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Threshold {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Threshold {}

impl PartialOrd for Threshold {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Threshold {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Threshold `y` to signed height delta, iterated in ascending `y`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffMap {
    entries: BTreeMap<Threshold, f64>,
}

impl DiffMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `delta` at `threshold`, returning the delta it overwrote.
    pub fn insert(&mut self, threshold: f64, delta: f64) -> Option<f64> {
        self.entries.insert(Threshold::new(threshold), delta)
    }

    pub fn get(&self, threshold: f64) -> Option<f64> {
        self.entries.get(&Threshold::new(threshold)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(threshold, delta)` pairs in ascending threshold order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (f64, f64)> + '_ {
        self.entries.iter().map(|(t, d)| (t.value(), *d))
    }

    /// Thresholds strictly above-the-field for a field whose top is at `y`,
    /// i.e. every threshold `< y`, ascending.
    pub fn affecting(&self, y: f64) -> impl DoubleEndedIterator<Item = (f64, f64)> + '_ {
        self.entries
            .range(..Threshold::new(y))
            .map(|(t, d)| (t.value(), *d))
    }
}

impl FromIterator<(f64, f64)> for DiffMap {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut map = DiffMap::new();
        for (t, d) in iter {
            map.insert(t, d);
        }
        map
    }
}

/// Measure every content-dependent field of `template` against `input`.
///
/// Every schema's type tag must be registered, content-dependent or not.
pub fn build_diff_map(
    template: &Template,
    input: &BoundInput,
    measurer: &dyn TableMeasurer,
    registry: &Registry,
    options: &ReflowOptions,
) -> Result<DiffMap> {
    let available_width = match options.measure_width {
        MeasureWidth::Usable => template.geometry.usable_width(),
        MeasureWidth::Page => template.geometry.width,
    };

    let mut diff = DiffMap::new();
    for (page_index, key, schema) in template.fields() {
        let field_type = registry.resolve(&schema.kind)?;
        if !field_type.content_dependent() {
            continue;
        }

        let ctx = MeasureContext {
            key,
            schema,
            content: input.get(key).map(String::as_str),
            available_width,
            measurer,
        };
        let Some(measured) = field_type.measure_height(&ctx)? else {
            continue;
        };

        let threshold = schema.bottom();
        let delta = measured - schema.height;
        log::debug!(
            "measured `{}` on page {}: declared {} -> {} (delta {}) at threshold {}",
            key,
            page_index,
            schema.height,
            measured,
            delta,
            threshold
        );
        if let Some(previous) = diff.insert(threshold, delta) {
            log::warn!(
                "threshold {} already had delta {}; `{}` overwrites it with {}",
                threshold,
                previous,
                key,
                delta
            );
        }
    }
    Ok(diff)
}

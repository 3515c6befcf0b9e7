//! # Position Normalizer / Paginator
//!
//! Applies a [`DiffMap`] to a template: fields below a threshold move by its
//! delta, and fields pushed past the bottom padding move to the next page,
//! re-based under the top padding.
//!
//! Thresholds are folded in ascending order. Under [`DeltaPolicy::LastWins`]
//! every threshold a field sits below overwrites the previous placement, so
//! the nearest threshold above the field decides; thresholds the field is
//! not below leave it alone. Under [`DeltaPolicy::Cumulative`] the deltas are
//! summed instead.
//!
//! Relocation is a single hop. A field that still overflows its new page
//! keeps the overflow in its `y`; nothing re-measures or re-checks it.

use crate::error::{ReflowError, Result};
use crate::layout::diff::DiffMap;
use crate::model::{DeltaPolicy, Page, Schema, Template};

/// Where a field ends up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Untouched by every threshold.
    Unchanged,
    /// Shifted, still on its own page.
    Shifted { y: f64 },
    /// Pushed onto the following page.
    NextPage { y: f64 },
}

/// Decide the placement of one field from the deltas affecting it.
///
/// `delta` is `None` when no threshold lies above the field.
pub fn place_field(
    schema: &Schema,
    delta: Option<f64>,
    content_top: f64,
    content_bottom: f64,
) -> Placement {
    let delta = match delta {
        None => return Placement::Unchanged,
        Some(d) if d == 0.0 => return Placement::Unchanged,
        Some(d) => d,
    };

    let shifted_y = schema.position.y + delta;
    if shifted_y + schema.height <= content_bottom {
        return Placement::Shifted { y: shifted_y };
    }

    let relocated_y = (content_top + shifted_y - content_bottom).max(content_top);
    Placement::NextPage { y: relocated_y }
}

/// The delta a field at `y` receives under `policy`.
pub fn delta_for(diff: &DiffMap, y: f64, policy: DeltaPolicy) -> Option<f64> {
    let mut affecting = diff.affecting(y);
    match policy {
        DeltaPolicy::LastWins => affecting.next_back().map(|(_, d)| d),
        DeltaPolicy::Cumulative => {
            let (_, first) = affecting.next()?;
            Some(affecting.fold(first, |sum, (_, d)| sum + d))
        }
    }
}

/// [`normalize_with`] under the default last-wins policy.
pub fn normalize(template: &Template, diff: &DiffMap) -> Result<Template> {
    normalize_with(template, diff, DeltaPolicy::default())
}

/// Produce a new template with every field repositioned per `diff`.
///
/// The input template is never modified. Output pages beyond the input's
/// count exist only if something overflowed onto them.
pub fn normalize_with(template: &Template, diff: &DiffMap, policy: DeltaPolicy) -> Result<Template> {
    let geometry = template.geometry;
    geometry.validate()?;
    let content_top = geometry.padding.top;
    let content_bottom = geometry.content_bottom();

    let mut pages: Vec<Page> = vec![Page::new(); template.pages.len()];

    for (i, page) in template.pages.iter().enumerate() {
        for (key, schema) in page.iter() {
            let delta = delta_for(diff, schema.position.y, policy);
            match place_field(schema, delta, content_top, content_bottom) {
                Placement::Unchanged => {
                    log::trace!("`{}` stays on page {} at y {}", key, i, schema.position.y);
                    put(&mut pages, i, key, schema.clone())?;
                }
                Placement::Shifted { y } => {
                    log::trace!("`{}` shifts on page {}: y {} -> {}", key, i, schema.position.y, y);
                    put(&mut pages, i, key, schema.at_y(y))?;
                }
                Placement::NextPage { y } => {
                    log::debug!(
                        "`{}` overflows page {}, relocated to page {} at y {}",
                        key,
                        i,
                        i + 1,
                        y
                    );
                    if pages.len() == i + 1 {
                        pages.push(Page::new());
                    }
                    put(&mut pages, i + 1, key, schema.at_y(y))?;
                }
            }
        }
    }

    Ok(Template::new(geometry, pages))
}

/// Insert a field, refusing to overwrite a key already on that page.
fn put(pages: &mut [Page], index: usize, key: &str, schema: Schema) -> Result<()> {
    let page = &mut pages[index];
    if page.contains_key(key) {
        return Err(ReflowError::Configuration(format!(
            "field `{}` cannot be placed on page {}: the key is already there",
            key, index
        )));
    }
    page.insert(key, schema);
    Ok(())
}

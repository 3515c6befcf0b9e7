//! # Reflow
//!
//! Dynamic layout reflow for paginated field templates.
//!
//! A template places fields (text, images, tables, ...) at fixed positions on
//! fixed-size pages. Most fields are exactly as tall as declared. Tables are
//! not: how many rows they have is only known once data is bound. Reflow
//! takes a template plus its bound data and returns a new template where
//! everything below a grown (or shrunk) table has moved by the difference,
//! and whatever no longer fits has moved to the next page.
//!
//! ## Architecture
//!
//! ```text
//! Template + bound input
//!       ↓
//!   [registry]          — type tag → field capabilities
//!       ↓
//!   [layout::diff]      — measure tables, threshold → height delta
//!       ↓                  (via a TableMeasurer)
//!   [layout::normalize] — shift fields, paginate overflow
//!       ↓
//! Adjusted template
//! ```
//!
//! Drawing the adjusted template is someone else's job.

pub mod editor;
pub mod error;
pub mod font;
pub mod layout;
pub mod measure;
pub mod model;
pub mod registry;
pub mod table;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{ReflowError, Result};

use font::FontBook;
use layout::{build_diff_map, normalize_with};
use measure::{MetricsTableMeasurer, TableMeasurer};
use model::{BoundInput, ReflowOptions, Template};
use registry::Registry;

/// Reflow a template against its bound input with the built-in field types
/// and default options.
///
/// Either the whole template is adjusted or an error is returned; there is
/// no partial result.
pub fn reflow(
    template: &Template,
    input: &BoundInput,
    measurer: &dyn TableMeasurer,
) -> Result<Template> {
    reflow_with(
        template,
        input,
        measurer,
        &Registry::builtin(),
        &ReflowOptions::default(),
    )
}

/// Reflow with an explicit registry and options.
pub fn reflow_with(
    template: &Template,
    input: &BoundInput,
    measurer: &dyn TableMeasurer,
    registry: &Registry,
    options: &ReflowOptions,
) -> Result<Template> {
    template.geometry.validate()?;
    let diff = build_diff_map(template, input, measurer, registry, options)?;
    log::debug!(
        "reflowing {} pages, {} fields against {} thresholds",
        template.pages.len(),
        template.field_count(),
        diff.len()
    );
    normalize_with(template, &diff, options.delta_policy)
}

/// Build the built-in measurer, registering any fonts named in `options`.
pub fn measurer_for(options: &ReflowOptions) -> Result<MetricsTableMeasurer> {
    let mut fonts = FontBook::new();
    for font in &options.fonts {
        fonts.register_base64(&font.family, &font.src)?;
    }
    Ok(MetricsTableMeasurer::with_fonts(fonts))
}

/// Reflow a template given as JSON, returning the adjusted template as JSON.
///
/// `input_json` is an object of field key to content string; `options_json`
/// is a [`ReflowOptions`] object. Tables are measured with
/// [`MetricsTableMeasurer`].
pub fn reflow_json(
    template_json: &str,
    input_json: Option<&str>,
    options_json: Option<&str>,
) -> Result<String> {
    let template: Template = serde_json::from_str(template_json)?;
    let input: BoundInput = match input_json {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| ReflowError::document_parse("bound input", e))?,
        None => BoundInput::new(),
    };
    let options: ReflowOptions = match options_json {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| ReflowError::document_parse("options", e))?,
        None => ReflowOptions::default(),
    };

    let measurer = measurer_for(&options)?;
    let adjusted = reflow_with(&template, &input, &measurer, &Registry::builtin(), &options)?;
    Ok(serde_json::to_string_pretty(&adjusted)?)
}

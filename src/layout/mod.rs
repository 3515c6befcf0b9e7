//! # Dynamic Layout Reflow
//!
//! Templates are designed with a declared height for every field, but a
//! table only knows how tall it is once its rows are bound. Reflow is two
//! passes over the template:
//!
//! 1. [`diff`]: measure each content-dependent field against its data and
//!    record `measured - declared` at the field's original bottom edge.
//! 2. [`normalize`]: move every field lying below a threshold by its delta,
//!    and push fields that no longer fit onto the next page.
//!
//! Both passes build fresh values; the input template is never touched.
//! Shifted fields are not re-measured, so only the original tables ever
//! contribute thresholds.

pub mod diff;
pub mod normalize;

pub use diff::{build_diff_map, DiffMap, Threshold};
pub use normalize::{normalize, normalize_with, Placement};

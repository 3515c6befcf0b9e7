//! Reflow configuration.

use serde::{Deserialize, Serialize};

/// How deltas from several thresholds above one field combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeltaPolicy {
    /// The nearest threshold above a field decides its shift; deltas of
    /// tables further up are not added in.
    #[default]
    LastWins,
    /// A field shifts by the sum of every delta above it on its page.
    Cumulative,
}

/// Which width a table is measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasureWidth {
    /// Page width minus left and right padding.
    #[default]
    Usable,
    /// The full page width.
    Page,
}

/// A custom font for the built-in measurer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// Family name cell styles refer to through `fontName`.
    pub family: String,
    /// Base64-encoded font data, or a data URI.
    pub src: String,
}

/// Options for one reflow call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflowOptions {
    #[serde(default)]
    pub delta_policy: DeltaPolicy,

    #[serde(default)]
    pub measure_width: MeasureWidth,

    #[serde(default)]
    pub fonts: Vec<FontEntry>,
}

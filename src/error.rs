//! Structured error types for the reflow engine.
//!
//! Every variant aborts the whole reflow call. There is no partial output: a
//! half-adjusted template would carry positions nobody can verify.

use thiserror::Error;

/// The unified error type returned by all public reflow API functions.
#[derive(Debug, Error)]
pub enum ReflowError {
    /// Bound input for a content-dependent field is not the expected shape.
    #[error("Failed to parse content for field `{key}`: {source}{}", format_hint(.hint))]
    ContentParse {
        key: String,
        source: serde_json::Error,
        hint: String,
    },

    /// The table measurer rejected the style or content it was given.
    #[error("Measurement error: {0}")]
    Measurement(String),

    /// Page geometry is internally inconsistent, or a relocation would
    /// collide with a field already on the destination page.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A schema names a type tag that no registered field type handles.
    #[error("No field type registered for `{0}`")]
    UnknownFieldType(String),

    /// A JSON document handed to the engine failed to parse. `document`
    /// names which one: the template, the bound input or the options.
    #[error("Failed to parse {document}: {source}{}", format_hint(.hint))]
    TemplateParse {
        document: &'static str,
        source: serde_json::Error,
        hint: String,
    },
}

pub type Result<T> = std::result::Result<T, ReflowError>;

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

/// Pick a human-readable hint for a serde_json failure.
pub(crate) fn hint_for(e: &serde_json::Error) -> String {
    match e.classify() {
        serde_json::error::Category::Syntax => {
            "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
        }
        serde_json::error::Category::Data => {
            "The JSON is valid but doesn't have the expected shape. Check field names and types."
                .to_string()
        }
        serde_json::error::Category::Eof => {
            "Unexpected end of input, is the JSON truncated?".to_string()
        }
        serde_json::error::Category::Io => String::new(),
    }
}

impl ReflowError {
    /// Wrap a bound-content parse failure for field `key`.
    pub fn content_parse(key: &str, source: serde_json::Error) -> Self {
        let hint = match source.classify() {
            serde_json::error::Category::Data => {
                "Table content must be a JSON array of string arrays, e.g. [[\"a\",\"b\"]]."
                    .to_string()
            }
            _ => hint_for(&source),
        };
        ReflowError::ContentParse {
            key: key.to_string(),
            source,
            hint,
        }
    }
}

impl ReflowError {
    /// Wrap a parse failure of the JSON document named `document`.
    pub fn document_parse(document: &'static str, source: serde_json::Error) -> Self {
        let hint = hint_for(&source);
        ReflowError::TemplateParse {
            document,
            source,
            hint,
        }
    }
}

impl From<serde_json::Error> for ReflowError {
    fn from(e: serde_json::Error) -> Self {
        ReflowError::document_parse("template", e)
    }
}

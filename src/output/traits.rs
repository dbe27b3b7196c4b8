//! Renderer traits and types
//!
//! This module defines the trait interface for report renderers and the
//! errors they can produce.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while rendering an export
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for report renderers
///
/// A renderer turns one audit record (a JSON object whose key order is the
/// field order) into the bytes of a downloadable file.
pub trait ReportRenderer {
    /// MIME type sent with the rendered bytes
    fn content_type(&self) -> &'static str;

    /// File extension without the dot
    fn extension(&self) -> &'static str;

    /// Renders the record
    ///
    /// # Arguments
    ///
    /// * `record` - The audit record as a JSON object
    ///
    /// # Returns
    ///
    /// The encoded file contents
    fn render(&self, record: &Value) -> OutputResult<Vec<u8>>;
}

/// Top-level fields of a record, in order
pub(crate) fn record_fields(record: &Value) -> OutputResult<&serde_json::Map<String, Value>> {
    record
        .as_object()
        .ok_or_else(|| OutputError::Format("audit record is not a JSON object".to_string()))
}

/// A field value as a single line of text
///
/// Strings are written verbatim; objects and arrays as compact JSON;
/// `null` as the word `null`.
pub(crate) fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_text() {
        assert_eq!(field_text(&json!("plain \"text\"")), "plain \"text\"");
        assert_eq!(field_text(&json!(null)), "null");
        assert_eq!(field_text(&json!(true)), "true");
        assert_eq!(field_text(&json!(42)), "42");
        assert_eq!(field_text(&json!(["a", "b"])), r#"["a","b"]"#);
        assert_eq!(field_text(&json!({"H2": 1})), r#"{"H2":1}"#);
    }

    #[test]
    fn test_record_fields_rejects_non_objects() {
        assert!(record_fields(&json!({"a": 1})).is_ok());
        assert!(matches!(
            record_fields(&json!([1, 2])),
            Err(OutputError::Format(_))
        ));
    }
}

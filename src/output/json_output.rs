//! JSON export

use crate::output::traits::{OutputResult, ReportRenderer};
use serde_json::Value;

/// Writes the record as pretty-printed JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, record: &Value) -> OutputResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_keeps_field_order() {
        let bytes = JsonRenderer
            .render(&json!({"title": "T", "canonical": "", "analytics": []}))
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let title = text.find("\"title\"").unwrap();
        let canonical = text.find("\"canonical\"").unwrap();
        let analytics = text.find("\"analytics\"").unwrap();
        assert!(title < canonical && canonical < analytics);
    }
}

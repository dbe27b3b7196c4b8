//! CSV export
//!
//! One header row of field names followed by one row of values. Every value
//! is quoted; the header is left bare.

use crate::output::traits::{field_text, record_fields, OutputResult, ReportRenderer};
use csv::{QuoteStyle, WriterBuilder};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl ReportRenderer for CsvRenderer {
    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, record: &Value) -> OutputResult<Vec<u8>> {
        let fields = record_fields(record)?;
        let mut out = Vec::new();

        {
            let mut header = WriterBuilder::new()
                .quote_style(QuoteStyle::Necessary)
                .from_writer(&mut out);
            header.write_record(fields.keys())?;
            header.flush()?;
        }

        {
            let mut row = WriterBuilder::new()
                .quote_style(QuoteStyle::Always)
                .from_writer(&mut out);
            row.write_record(fields.values().map(field_text))?;
            row.flush()?;
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(record: Value) -> String {
        String::from_utf8(CsvRenderer.render(&record).unwrap()).unwrap()
    }

    #[test]
    fn test_header_bare_values_quoted() {
        let csv = render(json!({"title": "Home", "titleLength": 4, "noindexMeta": false}));
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("title,titleLength,noindexMeta"));
        assert_eq!(lines.next(), Some(r#""Home","4","false""#));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_embedded_quotes_doubled() {
        let csv = render(json!({"title": "Say \"hi\", friend"}));
        assert!(csv.ends_with("\"Say \"\"hi\"\", friend\"\n"));
    }

    #[test]
    fn test_nested_values_stringified_and_null_literal() {
        let csv = render(json!({
            "h1Tags": ["A", "B"],
            "headerUsage": {"H2": 1},
            "gtagCode": null
        }));
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            r#""[""A"",""B""]","{""H2"":1}","null""#
        );
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(CsvRenderer.render(&json!("text")).is_err());
    }
}

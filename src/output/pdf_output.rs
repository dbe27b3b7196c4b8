//! PDF export
//!
//! Writes a minimal PDF 1.4 document by hand: A4 pages, the built-in
//! Helvetica font, a title line and then one `key: value` line per field.

use crate::output::traits::{field_text, record_fields, OutputResult, ReportRenderer};
use serde_json::Value;
use std::fmt::Write as _;

/// A4 in points
const PAGE_WIDTH: f64 = 595.28;
const PAGE_HEIGHT: f64 = 841.89;

const LEFT_MARGIN: f64 = 50.0;
const TOP_MARGIN: f64 = 40.0;
const BOTTOM_LIMIT: f64 = 50.0;

const TITLE_SIZE: u32 = 16;
const TITLE_GAP: f64 = 30.0;
const LINE_SIZE: u32 = 12;
const LINE_HEIGHT: f64 = 20.0;

/// Renders the report with a template name shown in its title
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    template: String,
}

impl PdfRenderer {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new("default")
    }
}

impl ReportRenderer for PdfRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, record: &Value) -> OutputResult<Vec<u8>> {
        let fields = record_fields(record)?;
        let lines = fields
            .iter()
            .map(|(key, value)| format!("{}: {}", key, field_text(value)));
        let pages = layout(&format!("SEO Audit Report ({})", self.template), lines);
        Ok(write_document(&pages))
    }
}

/// One line of text placed on a page
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlacedText {
    pub size: u32,
    pub y: f64,
    pub text: String,
}

/// Positions the title and lines, starting a new page whenever the cursor
/// falls below the bottom limit
pub(crate) fn layout(title: &str, lines: impl Iterator<Item = String>) -> Vec<Vec<PlacedText>> {
    let mut pages = vec![Vec::new()];
    let mut y = PAGE_HEIGHT - TOP_MARGIN;

    pages[0].push(PlacedText {
        size: TITLE_SIZE,
        y,
        text: title.to_string(),
    });
    y -= TITLE_GAP;

    for text in lines {
        if y < BOTTOM_LIMIT {
            pages.push(Vec::new());
            y = PAGE_HEIGHT - TOP_MARGIN;
        }
        if let Some(page) = pages.last_mut() {
            page.push(PlacedText {
                size: LINE_SIZE,
                y,
                text,
            });
        }
        y -= LINE_HEIGHT;
    }

    pages
}

/// Serializes laid-out pages into PDF bytes
///
/// Object layout: 1 catalog, 2 page tree, 3 font, then a page object and
/// its content stream for each page.
fn write_document(pages: &[Vec<PlacedText>]) -> Vec<u8> {
    let mut objects: Vec<Vec<u8>> = Vec::with_capacity(3 + pages.len() * 2);

    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 4 + i * 2))
        .collect();

    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        )
        .into_bytes(),
    );
    objects.push(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    );

    for (i, page) in pages.iter().enumerate() {
        let content_id = 5 + i * 2;
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH, PAGE_HEIGHT, content_id
            )
            .into_bytes(),
        );

        let stream = content_stream(page);
        let mut object = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        object.extend_from_slice(&stream);
        object.extend_from_slice(b"\nendstream");
        objects.push(object);
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = writeln!(xref, "{:010} 00000 n ", offset);
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    );
    out.extend_from_slice(xref.as_bytes());
    out
}

fn content_stream(page: &[PlacedText]) -> Vec<u8> {
    let mut stream = Vec::new();
    for line in page {
        stream.extend_from_slice(
            format!(
                "BT /F1 {} Tf {:.2} {:.2} Td (",
                line.size, LEFT_MARGIN, line.y
            )
            .as_bytes(),
        );
        stream.extend(encode_text(&line.text));
        stream.extend_from_slice(b") Tj ET\n");
    }
    stream
}

/// Latin-1 bytes for a PDF string literal
///
/// Delimiters are escaped, control characters become spaces and characters
/// outside Latin-1 become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                bytes.push(b'\\');
                bytes.push(c as u8);
            }
            c if c.is_control() => bytes.push(b' '),
            c if (c as u32) <= 0xFF => bytes.push(c as u32 as u8),
            _ => bytes.push(b'?'),
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn record_with(fields: usize) -> Value {
        let map: Map<String, Value> = (0..fields)
            .map(|i| (format!("field{}", i), json!(i)))
            .collect();
        Value::Object(map)
    }

    fn page_count(pdf: &[u8]) -> usize {
        String::from_utf8_lossy(pdf)
            .matches("/Type /Page /Parent")
            .count()
    }

    #[test]
    fn test_document_structure() {
        let pdf = PdfRenderer::default().render(&json!({"title": "Home"})).unwrap();
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("(SEO Audit Report \\(default\\)) Tj"));
        assert!(text.contains("(title: Home) Tj"));
        assert!(text.contains("/BaseFont /Helvetica"));
        assert_eq!(page_count(&pdf), 1);
    }

    #[test]
    fn test_template_name_in_title() {
        let pdf = PdfRenderer::new("agency").render(&json!({})).unwrap();
        assert!(String::from_utf8_lossy(&pdf).contains("SEO Audit Report \\(agency\\)"));
    }

    #[test]
    fn test_layout_positions() {
        let pages = layout("T", vec!["a".to_string(), "b".to_string()].into_iter());
        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!(page[0].size, 16);
        assert!((page[0].y - 801.89).abs() < 1e-9);
        assert_eq!(page[1].size, 12);
        assert!((page[1].y - 771.89).abs() < 1e-9);
        assert!((page[2].y - 751.89).abs() < 1e-9);
    }

    #[test]
    fn test_pagination() {
        // 37 lines fit under the title: the 37th sits at y = 51.89
        assert_eq!(page_count(&PdfRenderer::default().render(&record_with(37)).unwrap()), 1);
        assert_eq!(page_count(&PdfRenderer::default().render(&record_with(38)).unwrap()), 2);

        let pages = layout("T", (0..38).map(|i| i.to_string()));
        assert_eq!(pages[1].len(), 1);
        assert!((pages[1][0].y - 801.89).abs() < 1e-9);
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let pdf = PdfRenderer::default().render(&record_with(3)).unwrap();
        let text = String::from_utf8_lossy(&pdf).into_owned();
        let xref_start = text.find("xref\n").unwrap();
        let offsets: Vec<usize> = text[xref_start..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert_eq!(offsets.len(), 5);
        for (i, offset) in offsets.iter().enumerate() {
            assert!(text[*offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("a(b)\\c"), b"a\\(b\\)\\\\c".to_vec());
        assert_eq!(encode_text("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_text("snow\u{2603}\n"), b"snow? ".to_vec());
    }
}

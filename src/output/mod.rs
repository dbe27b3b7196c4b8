//! Output module for exporting audit records
//!
//! This module handles:
//! - Choosing a renderer for the requested export format
//! - Rendering records as JSON, CSV or PDF
//! - Naming downloaded files after the audited host and the time

mod csv_output;
mod json_output;
mod pdf_output;
mod traits;

pub use csv_output::CsvRenderer;
pub use json_output::JsonRenderer;
pub use pdf_output::PdfRenderer;
pub use traits::{OutputError, OutputResult, ReportRenderer};

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Export formats accepted by the API and CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Pdf,
}

impl ExportFormat {
    /// Builds the renderer for this format
    ///
    /// `template` only affects PDF output.
    pub fn renderer(self, template: &str) -> Box<dyn ReportRenderer + Send + Sync> {
        match self {
            Self::Json => Box::new(JsonRenderer),
            Self::Csv => Box::new(CsvRenderer),
            Self::Pdf => Box::new(PdfRenderer::new(template)),
        }
    }

    /// Whether responses in this format are sent as file downloads
    pub fn is_attachment(self) -> bool {
        !matches!(self, Self::Json)
    }
}

/// A rendered export ready to be written or sent
#[derive(Debug, Clone)]
pub struct Export {
    pub content_type: &'static str,
    pub filename: String,
    pub body: Vec<u8>,
}

/// Renders `record` in `format`
///
/// # Arguments
///
/// * `record` - The audit record as a JSON object
/// * `format` - Requested export format
/// * `template` - Template name shown in PDF titles
/// * `url` - The audited URL, used for the filename
/// * `now` - Local time used for the filename
///
/// # Returns
///
/// * `Ok(Export)` - Rendered bytes with content type and filename
/// * `Err(OutputError)` - The record could not be encoded
pub fn export(
    record: &Value,
    format: ExportFormat,
    template: &str,
    url: &Url,
    now: NaiveDateTime,
) -> OutputResult<Export> {
    let renderer = format.renderer(template);
    let body = renderer.render(record)?;
    tracing::debug!("Rendered {} bytes of {:?} for {}", body.len(), format, url);

    Ok(Export {
        content_type: renderer.content_type(),
        filename: export_filename(url, renderer.extension(), now),
        body,
    })
}

/// Builds `<host with dots replaced by underscores>_<YYYYMMDD_HHmmss>.<ext>`
pub fn export_filename(url: &Url, extension: &str, now: NaiveDateTime) -> String {
    let host = url.host_str().unwrap_or("site").replace('.', "_");
    format!("{}_{}.{}", host, now.format("%Y%m%d_%H%M%S"), extension)
}

//! Export adapter
//!
//! Serializes a plan snapshot into one of the supported formats. JSON and
//! CSV are produced here; PDF and DOCX are laid out here and handed to a
//! [`DocumentEncoder`] for byte encoding. DOCX is written natively, PDF
//! defaults to a layout handoff file. Exporting only ever borrows the
//! plan.

mod csv;
mod docx;
mod encoder;
mod json;
mod layout;
mod sink;

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::Catalog;
use crate::plan::Plan;
use crate::{Error, Result};

pub use self::csv::{to_csv, CSV_HEADER};
pub use self::docx::DocxEncoder;
pub use encoder::{DocumentEncoder, EncoderRegistry, LayoutJsonEncoder};
pub use json::{import_json, to_json, JsonExport};
pub use layout::{
    paginate, wrap_text, BlockKind, DocumentLayout, DocumentOutline, OutlineSection, Page,
    PageSettings, PlacedBlock,
};
pub use sink::{DirectorySink, FileSink};

/// Default file name stem for exports
pub const DEFAULT_FILE_STEM: &str = "project-plan";

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Pdf,
    Docx,
}

impl ExportFormat {
    /// Get all supported formats
    pub fn all() -> &'static [ExportFormat] {
        &[
            ExportFormat::Json,
            ExportFormat::Csv,
            ExportFormat::Pdf,
            ExportFormat::Docx,
        ]
    }

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    /// MIME type of the encoded file
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Get a description of what this format is for
    pub fn description(&self) -> &'static str {
        match self {
            ExportFormat::Json => "Complete project data in JSON format",
            ExportFormat::Csv => "Spreadsheet-compatible table format",
            ExportFormat::Pdf => "Formatted document for viewing and printing",
            ExportFormat::Docx => "Microsoft Word document format",
        }
    }

    /// Whether the format goes through layout and a document encoder
    pub fn is_document(&self) -> bool {
        matches!(self, ExportFormat::Pdf | ExportFormat::Docx)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" | "word" => Ok(ExportFormat::Docx),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

/// An encoded export ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Settings shared by all exports
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// File name without extension
    pub file_stem: String,
    /// Author or manager name printed in document title blocks
    pub author: Option<String>,
    pub page: PageSettings,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            file_stem: DEFAULT_FILE_STEM.to_string(),
            author: None,
            page: PageSettings::default(),
        }
    }
}

/// Turns plan snapshots into export payloads
pub struct Exporter {
    registry: EncoderRegistry,
    options: ExportOptions,
}

impl Exporter {
    /// Create an exporter with the default encoders
    pub fn new(options: ExportOptions) -> Self {
        Self {
            registry: EncoderRegistry::with_defaults(),
            options,
        }
    }

    /// Replace the encoder registry
    pub fn with_registry(mut self, registry: EncoderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the author printed in document title blocks
    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.options.author = author;
        self
    }

    /// The options this exporter was built with
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Encoders available for document formats
    pub fn registry(&self) -> &EncoderRegistry {
        &self.registry
    }

    /// Serialize `plan` in `format`
    pub async fn export(
        &self,
        plan: &Plan,
        catalog: &Catalog,
        format: ExportFormat,
    ) -> Result<ExportPayload> {
        let stem = &self.options.file_stem;

        let payload = match format {
            ExportFormat::Json => ExportPayload {
                file_name: format!("{}.json", stem),
                mime_type: format.mime_type().to_string(),
                bytes: to_json(plan, catalog, Utc::now())?.into_bytes(),
            },
            ExportFormat::Csv => ExportPayload {
                file_name: format!("{}.csv", stem),
                mime_type: format.mime_type().to_string(),
                bytes: to_csv(plan, catalog).into_bytes(),
            },
            ExportFormat::Pdf | ExportFormat::Docx => {
                let encoder = self
                    .registry
                    .get(format)
                    .ok_or_else(|| Error::UnsupportedFormat(format!("{} (no encoder)", format)))?;

                let outline =
                    DocumentOutline::from_plan(plan, catalog, self.options.author.as_deref());
                let layout = paginate(&outline, &self.options.page);

                ExportPayload {
                    file_name: encoder.file_name(stem),
                    mime_type: encoder.mime_type().to_string(),
                    bytes: encoder.encode(&layout).await?,
                }
            }
        };

        info!(
            format = %format,
            file = %payload.file_name,
            bytes = payload.bytes.len(),
            "Exported plan"
        );

        Ok(payload)
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(ExportOptions::default())
    }
}

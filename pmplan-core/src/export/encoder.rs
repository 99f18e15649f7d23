//! Document encoders for laid-out exports

use std::collections::HashMap;

use async_trait::async_trait;

use super::{DocumentLayout, DocxEncoder, ExportFormat};
use crate::{Error, Result};

/// Turns a paginated layout into the bytes of one document format
///
/// Encoders are registered per format in an [`EncoderRegistry`]; an
/// embedder with a PDF writer registers it in place of the default
/// [`LayoutJsonEncoder`].
#[async_trait]
pub trait DocumentEncoder: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Format this encoder produces
    fn format(&self) -> ExportFormat;

    /// File name of the encoded document
    fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.format().extension())
    }

    /// MIME type of the encoded document
    fn mime_type(&self) -> &'static str {
        self.format().mime_type()
    }

    /// Encode the layout
    async fn encode(&self, layout: &DocumentLayout) -> Result<Vec<u8>>;
}

/// Writes the layout itself as JSON
///
/// The output is a handoff file for an external typesetting tool, named
/// `<stem>.<format>.layout.json`.
#[derive(Debug, Clone, Copy)]
pub struct LayoutJsonEncoder {
    format: ExportFormat,
}

impl LayoutJsonEncoder {
    pub fn new(format: ExportFormat) -> Self {
        Self { format }
    }
}

#[async_trait]
impl DocumentEncoder for LayoutJsonEncoder {
    fn name(&self) -> &'static str {
        "layout-json"
    }

    fn format(&self) -> ExportFormat {
        self.format
    }

    fn file_name(&self, stem: &str) -> String {
        format!("{}.{}.layout.json", stem, self.format.extension())
    }

    fn mime_type(&self) -> &'static str {
        ExportFormat::Json.mime_type()
    }

    async fn encode(&self, layout: &DocumentLayout) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(layout)
            .map_err(|e| Error::Encoder(format!("{}: {}", self.name(), e)))
    }
}

/// Registry of document encoders, one per format
pub struct EncoderRegistry {
    encoders: HashMap<ExportFormat, Box<dyn DocumentEncoder>>,
}

impl EncoderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            encoders: HashMap::new(),
        }
    }

    /// Create a registry with the native DOCX encoder and a layout
    /// handoff encoder for PDF
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(LayoutJsonEncoder::new(ExportFormat::Pdf)));
        registry.register(Box::new(DocxEncoder::new()));
        registry
    }

    /// Register an encoder, replacing any previous one for its format
    pub fn register(&mut self, encoder: Box<dyn DocumentEncoder>) {
        tracing::debug!(encoder = encoder.name(), format = %encoder.format(), "Registered encoder");
        self.encoders.insert(encoder.format(), encoder);
    }

    /// Get the encoder for a format
    pub fn get(&self, format: ExportFormat) -> Option<&dyn DocumentEncoder> {
        self.encoders.get(&format).map(|e| e.as_ref())
    }

    /// Formats that have an encoder
    pub fn list_registered(&self) -> Vec<ExportFormat> {
        let mut formats: Vec<ExportFormat> = self.encoders.keys().copied().collect();
        formats.sort_by_key(|f| f.extension());
        formats
    }
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{BlockKind, Page, PlacedBlock};

    fn layout() -> DocumentLayout {
        DocumentLayout {
            title: "Plan".to_string(),
            author: None,
            pages: vec![Page {
                number: 1,
                blocks: vec![PlacedBlock {
                    kind: BlockKind::Title,
                    y: 20.0,
                    lines: vec!["Plan".to_string()],
                }],
            }],
        }
    }

    #[test]
    fn test_registry_register() {
        let mut registry = EncoderRegistry::new();
        assert!(registry.get(ExportFormat::Pdf).is_none());

        registry.register(Box::new(LayoutJsonEncoder::new(ExportFormat::Pdf)));
        assert!(registry.get(ExportFormat::Pdf).is_some());
        assert!(registry.get(ExportFormat::Docx).is_none());
    }

    #[test]
    fn test_registry_list_registered() {
        let registry = EncoderRegistry::with_defaults();
        assert_eq!(
            registry.list_registered(),
            vec![ExportFormat::Docx, ExportFormat::Pdf]
        );
        assert_eq!(registry.get(ExportFormat::Docx).unwrap().name(), "docx");
        assert_eq!(
            registry.get(ExportFormat::Pdf).unwrap().name(),
            "layout-json"
        );
    }

    #[test]
    fn test_layout_json_file_name() {
        let encoder = LayoutJsonEncoder::new(ExportFormat::Pdf);
        assert_eq!(encoder.file_name("plan"), "plan.pdf.layout.json");
        assert_eq!(encoder.mime_type(), "application/json");
    }

    #[tokio::test]
    async fn test_layout_json_encode() {
        let encoder = LayoutJsonEncoder::new(ExportFormat::Docx);
        let bytes = encoder.encode(&layout()).await.unwrap();

        let decoded: DocumentLayout = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, layout());
    }
}

//! Word document encoder

use std::io::Cursor;

use async_trait::async_trait;
use docx_rs::{BreakType, Docx, Paragraph, Run};

use super::{BlockKind, DocumentEncoder, DocumentLayout, ExportFormat, PlacedBlock};
use crate::{Error, Result};

/// Writes a layout as a .docx file, one paragraph per laid-out line
///
/// Pages of the layout are separated by hard page breaks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxEncoder;

impl DocxEncoder {
    pub fn new() -> Self {
        Self
    }
}

/// Run for one line of a block; sizes are in half-points
fn styled_run(kind: BlockKind, text: &str) -> Run {
    let run = Run::new().add_text(text);
    match kind {
        BlockKind::Title => run.bold().size(36),
        BlockKind::Author => run.italic().size(20),
        BlockKind::Description => run.size(22),
        BlockKind::Heading => run.bold().size(28),
        BlockKind::Guidance => run.italic().size(20).color("666666"),
        BlockKind::Body => run.size(22),
    }
}

fn block_paragraphs(block: &PlacedBlock) -> impl Iterator<Item = Paragraph> + '_ {
    block
        .lines
        .iter()
        .map(move |line| Paragraph::new().add_run(styled_run(block.kind, line)))
}

#[async_trait]
impl DocumentEncoder for DocxEncoder {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Docx
    }

    async fn encode(&self, layout: &DocumentLayout) -> Result<Vec<u8>> {
        let mut docx = Docx::new();

        for (idx, page) in layout.pages.iter().enumerate() {
            if idx > 0 {
                docx = docx.add_paragraph(
                    Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
                );
            }
            for block in &page.blocks {
                for paragraph in block_paragraphs(block) {
                    docx = docx.add_paragraph(paragraph);
                }
            }
        }

        let mut buffer = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut buffer)
            .map_err(|e| Error::Encoder(format!("{}: {}", self.name(), e)))?;

        tracing::debug!(
            pages = layout.pages.len(),
            bytes = buffer.get_ref().len(),
            "Encoded docx"
        );
        Ok(buffer.into_inner())
    }
}

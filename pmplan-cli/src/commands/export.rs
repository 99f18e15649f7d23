//! Export and import commands

use std::path::PathBuf;

use clap::Args;
use pmplan_core::export::{import_json, DirectorySink, FileSink};
use pmplan_core::{ExportFormat, Exporter};

use super::Session;

/// Export the plan to a file
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// json, csv, pdf or docx
    #[arg(short, long, default_value = "json")]
    pub format: ExportFormat,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// File name without extension (overrides config)
    #[arg(long)]
    pub stem: Option<String>,
}

impl ExportArgs {
    pub async fn execute(&self, session: &Session, verbose: bool) -> anyhow::Result<()> {
        let store = session.load_plan().await?;

        let mut options = session.config.export.options();
        if let Some(stem) = &self.stem {
            options.file_stem = stem.clone();
        }
        let exporter = Exporter::new(options).with_author(session.author().await?);

        let payload = exporter
            .export(store.plan(), store.catalog(), self.format)
            .await?;

        let dir = self
            .out
            .clone()
            .unwrap_or_else(|| session.config.export.output_dir.clone());
        let path = DirectorySink::new(dir).save(&payload).await?;

        println!("Exported {} to {}", self.format, path.display());
        if verbose {
            println!("  {} ({} bytes)", payload.mime_type, payload.bytes.len());
        }
        if self.format.is_document() && payload.mime_type != self.format.mime_type() {
            println!("  Layout handoff file; render it with a {} encoder", self.format);
        }

        Ok(())
    }
}

/// Replace the stored plan with a JSON export
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file written by `pmplan export --format json`
    pub file: PathBuf,
}

impl ImportArgs {
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let json = tokio::fs::read_to_string(&self.file)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", self.file.display(), e))?;

        let store = import_json(session.catalog.clone(), &json)?;
        session.save_plan(&store).await?;

        let stats = store.stats();
        println!(
            "Imported '{}' with {} sections ({}% complete)",
            store.plan().title,
            stats.total_sections,
            stats.completion_percentage
        );
        Ok(())
    }
}

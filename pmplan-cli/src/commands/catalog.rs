//! Catalog and template listings

use clap::Args;
use pmplan_core::{Catalog, TemplateLibrary};

/// List the section catalog
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Show the fields of each section
    #[arg(short, long)]
    pub fields: bool,
}

impl CatalogArgs {
    pub fn execute(&self, catalog: &Catalog) -> anyhow::Result<()> {
        println!("Section catalog {}", catalog.version);
        println!();

        for definition in &catalog.sections {
            println!(
                "  {:<28} {:<34} {:<26} {:>5}h{}",
                definition.id,
                definition.title,
                definition.process_group.label(),
                definition.estimated_hours,
                if definition.required { "  required" } else { "" }
            );
            if self.fields {
                for field in &definition.fields {
                    println!("      - {:<20} {}", field.id, field.label);
                }
            }
        }

        Ok(())
    }
}

/// List the plan templates
#[derive(Args, Debug)]
pub struct TemplatesArgs {}

impl TemplatesArgs {
    pub fn execute(&self, templates: &TemplateLibrary) -> anyhow::Result<()> {
        for template in templates.templates() {
            println!("{} - {}", template.id, template.name);
            println!("    {}", template.summary);
            println!(
                "    {} sections, {}",
                template.sections.len(),
                template.methodology
            );
        }
        Ok(())
    }
}

//! Plan editing commands

use clap::Args;
use pmplan_core::export::to_json;
use pmplan_core::{Methodology, NewSection, PlanDetails, PlanStatus, PlanStore};

use super::Session;

/// Start a new plan from a template
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Template to start from
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// Replace an existing plan
    #[arg(short, long)]
    pub force: bool,
}

impl InitArgs {
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        if !self.force && session.has_plan().await? {
            anyhow::bail!("A plan already exists. Use --force to replace it.");
        }

        let template = session.templates.get(&self.template)?;
        let store = PlanStore::from_template(session.catalog.clone(), template)?;
        session.save_plan(&store).await?;

        println!("Created plan from template '{}'", template.name);
        print_summary(&store);
        Ok(())
    }
}

/// Restore the default template, discarding all content
pub async fn reset(session: &Session) -> anyhow::Result<()> {
    let mut store = session.load_plan().await?;
    store.reset(&session.templates)?;
    session.save_plan(&store).await?;

    println!("Plan reset to the default template");
    print_summary(&store);
    Ok(())
}

/// Show the plan
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Only show this section
    pub section: Option<String>,

    /// Print the JSON export instead
    #[arg(long)]
    pub json: bool,

    /// Include word counts
    #[arg(short, long)]
    pub analytics: bool,
}

impl ShowArgs {
    pub async fn execute(&self, session: &Session, verbose: bool) -> anyhow::Result<()> {
        let store = session.load_plan().await?;

        if self.json {
            println!("{}", to_json(store.plan(), store.catalog(), chrono::Utc::now())?);
            return Ok(());
        }

        if let Some(section_id) = &self.section {
            return show_section(&store, section_id);
        }

        let plan = store.plan();
        let title = if plan.title.is_empty() {
            "(untitled)"
        } else {
            plan.title.as_str()
        };
        println!("{}", title);
        println!("{}", "=".repeat(title.chars().count()));
        if !plan.description.is_empty() {
            println!("{}", plan.description);
        }
        println!();
        println!("Methodology: {}", plan.methodology);
        println!("Status: {}", plan.status);
        if let Some(manager) = session.persistence().load_manager().await? {
            println!("Manager: {}", manager);
        }
        if verbose {
            println!("Id: {}", plan.id);
            println!("Updated: {}", plan.metadata.updated_at.format("%Y-%m-%d %H:%M"));
        }
        println!();

        let effective = plan.effective_catalog(store.catalog());
        for (idx, id) in plan.enabled_section_ids.iter().enumerate() {
            let Some(definition) = effective.get(id) else {
                continue;
            };
            let mark = if plan.is_section_complete(id) { "x" } else { " " };
            let required = if definition.required { " *" } else { "" };
            println!(
                "  [{}] {:>2}. {} ({}h){}",
                mark,
                idx + 1,
                definition.title,
                definition.estimated_hours,
                required
            );
            if verbose {
                println!("         {}", id);
            }
        }
        println!();
        print_stats(&store);

        if self.analytics {
            let analytics = store.analytics();
            println!();
            println!(
                "Words: {} total, {} per section on average",
                analytics.total_words, analytics.average_words_per_section
            );
            for section in &analytics.sections {
                println!("  {:>6}  {}", section.words, section.title);
            }
        }

        Ok(())
    }
}

fn show_section(store: &PlanStore, section_id: &str) -> anyhow::Result<()> {
    let definition = store
        .definition(section_id)
        .ok_or_else(|| pmplan_core::Error::UnknownSection(section_id.to_string()))?;
    let plan = store.plan();
    let content = plan.sections.get(section_id);

    println!("{}", definition.title);
    println!("{}", definition.description);
    println!(
        "Process group: {}  |  {}h  |  {}",
        definition.process_group,
        definition.estimated_hours,
        if plan.is_enabled(section_id) {
            "shown"
        } else {
            "hidden"
        }
    );

    for field in &definition.fields {
        let value = content.map(|c| c.value(&field.id)).unwrap_or_default();
        println!();
        println!("{} [{}]", field.label, field.id);
        if value.trim().is_empty() {
            println!("  (empty)");
        } else {
            for line in value.lines() {
                println!("  {}", line);
            }
        }
    }

    Ok(())
}

/// Edit the plan title, description, methodology or status
#[derive(Args, Debug)]
pub struct DetailsArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// waterfall, agile or hybrid
    #[arg(long)]
    pub methodology: Option<Methodology>,

    /// draft, in_review, approved or archived
    #[arg(long)]
    pub status: Option<PlanStatus>,
}

impl DetailsArgs {
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let mut store = session.load_plan().await?;
        store.update_details(PlanDetails {
            title: self.title.clone(),
            description: self.description.clone(),
            methodology: self.methodology,
            status: self.status,
        })?;
        session.save_plan(&store).await?;

        print_summary(&store);
        Ok(())
    }
}

/// Set field values of a section
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Section id
    pub section: String,

    /// FIELD=VALUE pairs
    #[arg(short = 's', long = "set", value_parser = parse_key_val, required = true)]
    pub values: Vec<(String, String)>,
}

impl EditArgs {
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let mut store = session.load_plan().await?;
        store.update_section(&self.section, self.values.iter().cloned())?;
        session.save_plan(&store).await?;

        println!("Updated {} field(s) of {}", self.values.len(), self.section);
        print_stats(&store);
        Ok(())
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", s))?;
    Ok((key.trim().to_string(), value.replace("\\n", "\n")))
}

/// Add a custom section
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Section title
    pub title: String,

    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Estimated effort in hours
    #[arg(long, default_value_t = 0.0)]
    pub hours: f64,

    #[arg(long)]
    pub category: Option<String>,

    /// Initial text
    #[arg(long)]
    pub content: Option<String>,
}

impl AddArgs {
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        let mut store = session.load_plan().await?;

        let mut new = NewSection::new(&self.title)
            .with_description(&self.description)
            .with_estimated_hours(self.hours);
        if let Some(category) = &self.category {
            new = new.with_category(category);
        }
        if let Some(content) = &self.content {
            new = new.with_value("content", content);
        }

        let id = store.add_section(new)?;
        session.save_plan(&store).await?;

        println!("Added section {}", id);
        Ok(())
    }
}

/// What to do with a section
#[derive(Debug, Clone, Copy)]
pub enum SectionAction {
    /// Hide, keeping content
    Delete,
    /// Remove with content
    Purge,
    /// Show or hide
    Toggle,
}

/// Target of a section visibility command
#[derive(Args, Debug)]
pub struct SectionArgs {
    /// Section id
    pub section: String,
}

impl SectionArgs {
    pub async fn execute(&self, session: &Session, action: SectionAction) -> anyhow::Result<()> {
        let mut store = session.load_plan().await?;
        let id = self.section.as_str();

        match action {
            SectionAction::Delete => {
                store.delete_section(id)?;
                println!("Hid {} (content kept; toggle it to restore)", id);
            }
            SectionAction::Purge => {
                store.purge_section(id)?;
                println!("Removed {} and its content", id);
            }
            SectionAction::Toggle => {
                let enabled = store.toggle_section(id)?;
                println!("{} is now {}", id, if enabled { "shown" } else { "hidden" });
            }
        }

        session.save_plan(&store).await?;
        print_stats(&store);
        Ok(())
    }
}

/// Show or set the plan manager's name
#[derive(Args, Debug)]
pub struct ManagerArgs {
    /// New name
    pub name: Option<String>,
}

impl ManagerArgs {
    pub async fn execute(&self, session: &Session) -> anyhow::Result<()> {
        match &self.name {
            Some(name) => {
                let name = session.persistence().save_manager(name).await?;
                println!("Plan manager set to {}", name);
            }
            None => match session.persistence().load_manager().await? {
                Some(name) => println!("{}", name),
                None => println!("No plan manager set"),
            },
        }
        Ok(())
    }
}

fn print_summary(store: &PlanStore) {
    let plan = store.plan();
    println!(
        "  {} [{}, {}]",
        if plan.title.is_empty() {
            "(untitled)"
        } else {
            plan.title.as_str()
        },
        plan.methodology,
        plan.status
    );
    print_stats(store);
}

fn print_stats(store: &PlanStore) {
    let stats = store.stats();
    println!(
        "  {}/{} sections complete ({}%), {}h estimated, {}h remaining",
        stats.completed_sections,
        stats.total_sections,
        stats.completion_percentage,
        stats.total_estimated_hours,
        stats.remaining_hours
    );
}

//! Shared state for commands that touch the stored plan

use std::sync::Arc;

use pmplan_core::{Catalog, Config, PlanPersistence, PlanStore, TemplateLibrary};
use pmplan_store::{Database, EntriesRepo};

/// Catalog, templates and the plan database for one invocation
pub struct Session {
    pub config: Config,
    pub catalog: Arc<Catalog>,
    pub templates: TemplateLibrary,
    persistence: PlanPersistence<EntriesRepo>,
}

impl Session {
    /// Load the catalog and open the plan database
    pub async fn open(config: &Config, verbose: bool) -> anyhow::Result<Self> {
        let catalog = Arc::new(Catalog::load(config.catalog.path.as_deref())?);
        let templates = TemplateLibrary::builtin()?;

        let db_path = match &config.storage.database_path {
            Some(path) => path.clone(),
            None => Database::default_path()?,
        };
        let db = Database::new(&db_path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open database: {}", e))?;

        if verbose {
            println!("Database: {}", db_path.display());
            println!("Catalog: {} ({} sections)", catalog.version, catalog.sections.len());
        }

        Ok(Self {
            config: config.clone(),
            catalog,
            templates,
            persistence: PlanPersistence::new(db.entries()),
        })
    }

    /// The stored plan, or a fresh one from the default template
    pub async fn load_plan(&self) -> anyhow::Result<PlanStore> {
        match self.persistence.load(self.catalog.clone()).await? {
            Some(store) => Ok(store),
            None => {
                tracing::debug!("No stored plan, starting from the default template");
                let template = self.templates.default_template()?;
                Ok(PlanStore::from_template(self.catalog.clone(), template)?)
            }
        }
    }

    /// Whether a plan has been saved
    pub async fn has_plan(&self) -> anyhow::Result<bool> {
        Ok(self.persistence.load(self.catalog.clone()).await?.is_some())
    }

    /// Persist the plan
    pub async fn save_plan(&self, store: &PlanStore) -> anyhow::Result<()> {
        self.persistence.save(store.plan()).await?;
        Ok(())
    }

    /// Plan persistence, for the manager name
    pub fn persistence(&self) -> &PlanPersistence<EntriesRepo> {
        &self.persistence
    }

    /// Author for document exports: the manager, else the configured author
    pub async fn author(&self) -> anyhow::Result<Option<String>> {
        Ok(self
            .persistence
            .load_manager()
            .await?
            .or_else(|| self.config.export.author.clone()))
    }
}

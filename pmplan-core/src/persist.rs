//! Plan state in a key-value store
//!
//! Four keys are used, each holding JSON or plain text:
//! - `pmplan.sections`: section content by section id
//! - `pmplan.manager`: display name of the plan manager
//! - `pmplan.plan`: everything else about the plan
//! - `pmplan.team`: the collaborator roster
//!
//! Each key is written whole on every save.

use std::collections::BTreeMap;
use std::sync::Arc;

use pmplan_store::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{Catalog, SectionDefinition};
use crate::plan::{Methodology, Plan, PlanMetadata, PlanStatus, PlanStore, SectionContent};
use crate::team::{validate_name, Roster, UserProfile};
use crate::Result;

/// Section content mapping
pub const SECTIONS_KEY: &str = "pmplan.sections";

/// Plan manager display name
pub const MANAGER_KEY: &str = "pmplan.manager";

/// Plan header
pub const PLAN_KEY: &str = "pmplan.plan";

/// Collaborator roster
pub const TEAM_KEY: &str = "pmplan.team";

/// A plan without its section content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanHeader {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub methodology: Methodology,
    #[serde(default)]
    pub status: PlanStatus,
    pub enabled_section_ids: Vec<String>,
    #[serde(default)]
    pub custom_sections: Vec<SectionDefinition>,
    pub metadata: PlanMetadata,
}

impl PlanHeader {
    pub fn from_plan(plan: &Plan) -> Self {
        Self {
            id: plan.id.clone(),
            title: plan.title.clone(),
            description: plan.description.clone(),
            methodology: plan.methodology,
            status: plan.status,
            enabled_section_ids: plan.enabled_section_ids.clone(),
            custom_sections: plan.custom_sections.clone(),
            metadata: plan.metadata.clone(),
        }
    }

    /// Join the header with its section content
    pub fn into_plan(self, sections: BTreeMap<String, SectionContent>) -> Plan {
        Plan {
            id: self.id,
            title: self.title,
            description: self.description,
            methodology: self.methodology,
            status: self.status,
            enabled_section_ids: self.enabled_section_ids,
            sections,
            custom_sections: self.custom_sections,
            metadata: self.metadata,
        }
    }
}

/// Reads and writes plan state through a [`KeyValueStore`]
pub struct PlanPersistence<S> {
    store: S,
}

impl<S: KeyValueStore> PlanPersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give up the underlying store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Stored section content, if any
    pub async fn load_sections(&self) -> Result<Option<BTreeMap<String, SectionContent>>> {
        match self.store.get(SECTIONS_KEY).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn save_sections(&self, sections: &BTreeMap<String, SectionContent>) -> Result<()> {
        let json = serde_json::to_string(sections)?;
        self.store.set(SECTIONS_KEY, &json).await?;
        Ok(())
    }

    /// Stored manager name, if any
    pub async fn load_manager(&self) -> Result<Option<String>> {
        Ok(self.store.get(MANAGER_KEY).await?)
    }

    /// Store the manager name, returning it trimmed
    pub async fn save_manager(&self, name: &str) -> Result<String> {
        let name = validate_name(name)?;
        self.store.set(MANAGER_KEY, &name).await?;
        info!(manager = %name, "Saved plan manager");
        Ok(name)
    }

    /// Stored roster, empty if none was saved
    pub async fn load_roster(&self) -> Result<Roster> {
        match self.store.get(TEAM_KEY).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Roster::new()),
        }
    }

    pub async fn save_roster(&self, roster: &Roster) -> Result<()> {
        let json = serde_json::to_string(roster)?;
        self.store.set(TEAM_KEY, &json).await?;
        Ok(())
    }

    /// Sign in as the plan manager
    ///
    /// The name becomes the manager name. An empty roster is started with
    /// the user as owner; an existing roster is left alone.
    pub async fn sign_in(&self, name: &str, email: &str) -> Result<UserProfile> {
        let profile = UserProfile::sign_in(name, email)?;
        let mut entries = vec![(MANAGER_KEY, profile.name.clone())];
        if self.load_roster().await?.collaborators().is_empty() {
            entries.push((TEAM_KEY, serde_json::to_string(&Roster::with_owner(&profile))?));
        }
        let entries: Vec<(&str, &str)> = entries.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.store.set_many(&entries).await?;
        info!(manager = %profile.name, "Signed in");
        Ok(profile)
    }

    /// Restore the stored plan
    ///
    /// With content but no header, a fresh plan is built around the content
    /// with the required sections and every section that has content enabled.
    pub async fn load(&self, catalog: Arc<Catalog>) -> Result<Option<PlanStore>> {
        let header = match self.store.get(PLAN_KEY).await? {
            Some(json) => Some(serde_json::from_str::<PlanHeader>(&json)?),
            None => None,
        };
        let sections = self.load_sections().await?;

        let plan = match (header, sections) {
            (None, None) => return Ok(None),
            (Some(header), sections) => header.into_plan(sections.unwrap_or_default()),
            (None, Some(sections)) => {
                debug!(sections = sections.len(), "No plan header, rebuilding plan");
                let mut plan = PlanStore::new(catalog.clone()).into_plan();
                plan.enabled_section_ids = catalog
                    .sections
                    .iter()
                    .filter(|d| d.required || sections.contains_key(&d.id))
                    .map(|d| d.id.clone())
                    .collect();
                plan.sections = sections;
                plan
            }
        };

        let store = PlanStore::from_snapshot(catalog, plan)?;
        debug!(plan = %store.plan().id, "Loaded plan");
        Ok(Some(store))
    }

    /// Write the plan header and section content
    ///
    /// Both keys are written in one batch, so a failed save leaves the
    /// previous plan intact.
    pub async fn save(&self, plan: &Plan) -> Result<()> {
        let header = serde_json::to_string(&PlanHeader::from_plan(plan))?;
        let sections = serde_json::to_string(&plan.sections)?;
        self.store
            .set_many(&[(PLAN_KEY, header.as_str()), (SECTIONS_KEY, sections.as_str())])
            .await?;
        debug!(plan = %plan.id, sections = plan.sections.len(), "Saved plan");
        Ok(())
    }

    /// Forget the stored plan, keeping the manager name and roster
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(PLAN_KEY).await?;
        self.store.remove(SECTIONS_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::NewSection;
    use crate::team::Role;
    use crate::template::TemplateLibrary;
    use crate::Error;
    use async_trait::async_trait;
    use pmplan_store::MemoryStore;

    /// Memory store that refuses any write touching section content
    struct ReadOnlySections {
        inner: MemoryStore,
    }

    #[async_trait]
    impl KeyValueStore for ReadOnlySections {
        async fn get(&self, key: &str) -> pmplan_store::Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> pmplan_store::Result<()> {
            if key == SECTIONS_KEY {
                return Err(pmplan_store::Error::Io("disk full".to_string()));
            }
            self.inner.set(key, value).await
        }

        async fn set_many(&self, entries: &[(&str, &str)]) -> pmplan_store::Result<()> {
            if entries.iter().any(|(key, _)| *key == SECTIONS_KEY) {
                return Err(pmplan_store::Error::Io("disk full".to_string()));
            }
            self.inner.set_many(entries).await
        }

        async fn remove(&self, key: &str) -> pmplan_store::Result<bool> {
            self.inner.remove(key).await
        }

        async fn keys(&self) -> pmplan_store::Result<Vec<String>> {
            self.inner.keys().await
        }
    }

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::builtin().unwrap())
    }

    #[tokio::test]
    async fn test_empty_store_loads_nothing() {
        let persistence = PlanPersistence::new(MemoryStore::new());
        assert!(persistence.load(catalog()).await.unwrap().is_none());
        assert!(persistence.load_manager().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let templates = TemplateLibrary::builtin().unwrap();
        let mut store =
            PlanStore::from_template(catalog(), templates.get("basic").unwrap()).unwrap();
        store
            .add_section(NewSection::new("Vendor Onboarding").with_value("content", "Two vendors"))
            .unwrap();

        let persistence = PlanPersistence::new(MemoryStore::new());
        persistence.save(store.plan()).await.unwrap();

        let keys = persistence.store().keys().await.unwrap();
        assert_eq!(keys, vec![PLAN_KEY.to_string(), SECTIONS_KEY.to_string()]);

        let loaded = persistence.load(catalog()).await.unwrap().unwrap();
        assert_eq!(loaded.plan(), store.plan());
    }

    #[tokio::test]
    async fn test_sections_without_header() {
        let persistence = PlanPersistence::new(MemoryStore::new());
        let mut sections = BTreeMap::new();
        sections.insert(
            "cost-management".to_string(),
            SectionContent::with_fields(
                [("budget".to_string(), "$40k".to_string())]
                    .into_iter()
                    .collect(),
            ),
        );
        persistence.save_sections(&sections).await.unwrap();

        let loaded = persistence.load(catalog()).await.unwrap().unwrap();
        assert_eq!(
            loaded.plan().enabled_section_ids,
            vec![
                "project-charter",
                "scope-management",
                "cost-management",
                "risk-management"
            ]
        );
        assert!(loaded.plan().is_section_complete("cost-management"));
    }

    #[tokio::test]
    async fn test_corrupt_sections_rejected() {
        let persistence = PlanPersistence::new(MemoryStore::new());
        persistence
            .store()
            .set(SECTIONS_KEY, "not json")
            .await
            .unwrap();

        let err = persistence.load(catalog()).await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[tokio::test]
    async fn test_manager_name() {
        let persistence = PlanPersistence::new(MemoryStore::new());

        let name = persistence.save_manager("  Grace Hopper ").await.unwrap();
        assert_eq!(name, "Grace Hopper");
        assert_eq!(
            persistence.load_manager().await.unwrap().as_deref(),
            Some("Grace Hopper")
        );

        assert!(persistence.save_manager("   ").await.is_err());
        assert_eq!(
            persistence.load_manager().await.unwrap().as_deref(),
            Some("Grace Hopper")
        );
    }

    #[tokio::test]
    async fn test_clear_keeps_manager() {
        let persistence = PlanPersistence::new(MemoryStore::new());
        let store = PlanStore::new(catalog());
        persistence.save(store.plan()).await.unwrap();
        persistence.save_manager("Ada").await.unwrap();

        persistence.clear().await.unwrap();
        assert!(persistence.load(catalog()).await.unwrap().is_none());
        assert_eq!(
            persistence.store().keys().await.unwrap(),
            vec![MANAGER_KEY.to_string()]
        );
    }

    #[tokio::test]
    async fn test_sign_in_starts_roster() {
        let persistence = PlanPersistence::new(MemoryStore::new());
        assert!(persistence.load_roster().await.unwrap().collaborators().is_empty());

        let profile = persistence
            .sign_in(" Alice ", "alice@example.com")
            .await
            .unwrap();
        assert_eq!(profile.name, "Alice");
        assert_eq!(
            persistence.load_manager().await.unwrap().as_deref(),
            Some("Alice")
        );

        let roster = persistence.load_roster().await.unwrap();
        assert_eq!(roster.collaborators().len(), 1);
        assert_eq!(roster.collaborators()[0].role, Role::Owner);

        // A second sign-in keeps the roster
        persistence
            .sign_in("Bob", "bob@example.com")
            .await
            .unwrap();
        let roster = persistence.load_roster().await.unwrap();
        assert_eq!(roster.collaborators().len(), 1);
        assert_eq!(roster.collaborators()[0].email, "alice@example.com");
        assert_eq!(
            persistence.load_manager().await.unwrap().as_deref(),
            Some("Bob")
        );
    }

    #[tokio::test]
    async fn test_sign_in_invalid_email_writes_nothing() {
        let persistence = PlanPersistence::new(MemoryStore::new());
        let err = persistence.sign_in("Alice", "alice").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(persistence.store().keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_roster_round_trip() {
        let persistence = PlanPersistence::new(MemoryStore::new());
        persistence
            .sign_in("Alice", "alice@example.com")
            .await
            .unwrap();

        let mut roster = persistence.load_roster().await.unwrap();
        roster.invite("carol@example.com").unwrap();
        persistence.save_roster(&roster).await.unwrap();

        let loaded = persistence.load_roster().await.unwrap();
        assert_eq!(loaded, roster);
        assert_eq!(loaded.collaborators()[1].name, "carol");

        persistence.clear().await.unwrap();
        assert_eq!(persistence.load_roster().await.unwrap(), roster);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_plan() {
        let mut store = PlanStore::new(catalog());
        let id = store
            .add_section(NewSection::new("Vendor Onboarding").with_value("content", "Two vendors"))
            .unwrap();

        let seeded = PlanPersistence::new(MemoryStore::new());
        seeded.save(store.plan()).await.unwrap();
        let persistence = PlanPersistence::new(ReadOnlySections {
            inner: seeded.into_store(),
        });

        store.purge_section(&id).unwrap();
        let err = persistence.save(store.plan()).await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));

        let loaded = persistence.load(catalog()).await.unwrap().unwrap();
        assert!(loaded.plan().is_enabled(&id));
        assert!(loaded.plan().is_section_complete(&id));
    }
}

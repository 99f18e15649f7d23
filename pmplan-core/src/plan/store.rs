//! The plan store: single owner of a plan and its mutation API

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::{Catalog, FieldDefinition, ProcessGroup, SectionDefinition};
use crate::template::{PlanTemplate, TemplateLibrary};
use crate::{Error, Result};

use super::analytics::{compute_analytics, PlanAnalytics};
use super::model::{Methodology, Plan, PlanMetadata, PlanStatus, SectionContent, PLAN_FORMAT_VERSION};
use super::stats::{compute_stats, PlanStats};

/// Category given to user-added sections when none is supplied
pub const CUSTOM_CATEGORY: &str = "Custom";

/// A user-defined section to append to a plan
#[derive(Debug, Clone, Default)]
pub struct NewSection {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub process_group: Option<ProcessGroup>,
    pub estimated_hours: f64,
    /// Fields of the section; a single "content" textarea when empty
    pub fields: Vec<FieldDefinition>,
    /// Initial field values
    pub content: BTreeMap<String, String>,
}

impl NewSection {
    /// Create a section with just a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the guidance text
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the effort estimate
    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set an initial field value
    pub fn with_value(mut self, field_id: impl Into<String>, value: impl Into<String>) -> Self {
        self.content.insert(field_id.into(), value.into());
        self
    }
}

/// Plan-level fields that are edited directly
#[derive(Debug, Clone, Default)]
pub struct PlanDetails {
    pub title: Option<String>,
    pub description: Option<String>,
    pub methodology: Option<Methodology>,
    pub status: Option<PlanStatus>,
}

/// Owns one plan and the catalog it is built from
///
/// All mutation goes through this type. Rejected operations leave the plan
/// untouched; successful ones stamp `updatedAt` on the plan.
#[derive(Debug, Clone)]
pub struct PlanStore {
    catalog: Arc<Catalog>,
    plan: Plan,
}

impl PlanStore {
    /// Start a blank plan with only the required sections enabled
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let enabled_section_ids = catalog.required_ids().map(str::to_string).collect();
        let plan = Plan {
            id: Uuid::new_v4().to_string(),
            title: String::new(),
            description: String::new(),
            methodology: Methodology::default(),
            status: PlanStatus::default(),
            enabled_section_ids,
            sections: BTreeMap::new(),
            custom_sections: Vec::new(),
            metadata: PlanMetadata::fresh(PLAN_FORMAT_VERSION),
        };

        Self { catalog, plan }
    }

    /// Start a plan from a template
    pub fn from_template(catalog: Arc<Catalog>, template: &PlanTemplate) -> Result<Self> {
        let mut store = Self::new(catalog);
        store.load_template(template)?;
        Ok(store)
    }

    /// Adopt an existing plan after checking its invariants
    pub fn from_snapshot(catalog: Arc<Catalog>, plan: Plan) -> Result<Self> {
        plan.validate(&catalog)?;
        Ok(Self { catalog, plan })
    }

    /// The catalog this store resolves sections against
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Borrow the current plan
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Clone the current plan
    pub fn snapshot(&self) -> Plan {
        self.plan.clone()
    }

    /// Give up ownership of the plan
    pub fn into_plan(self) -> Plan {
        self.plan
    }

    /// Definition of a section, built-in or custom
    pub fn definition(&self, section_id: &str) -> Option<&SectionDefinition> {
        self.plan.effective_catalog(&self.catalog).get(section_id)
    }

    /// Append a user-defined section and return its generated id
    pub fn add_section(&mut self, new: NewSection) -> Result<String> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("Section title is required.".to_string()));
        }

        let fields = if new.fields.is_empty() {
            vec![FieldDefinition::textarea("content", "Content")]
        } else {
            new.fields
        };

        let definition = SectionDefinition {
            id: format!("custom-{}", Uuid::new_v4()),
            title: title.to_string(),
            description: new.description,
            category: new
                .category
                .unwrap_or_else(|| CUSTOM_CATEGORY.to_string()),
            process_group: new.process_group.unwrap_or_default(),
            knowledge_area: None,
            required: false,
            estimated_hours: new.estimated_hours,
            fields,
        };
        definition.validate().map_err(|e| match e {
            Error::Catalog(msg) => Error::Validation(msg),
            other => other,
        })?;

        if let Some(field_id) = new.content.keys().find(|f| definition.field(f).is_none()) {
            return Err(Error::Validation(format!(
                "Unknown field {} for section {}",
                field_id, definition.title
            )));
        }

        let id = definition.id.clone();
        self.plan
            .sections
            .insert(id.clone(), SectionContent::with_fields(new.content));
        self.plan.custom_sections.push(definition);
        self.plan.enabled_section_ids.push(id.clone());
        self.touch();

        info!(section = %id, title, "Added custom section");
        Ok(id)
    }

    /// Merge field values into a section's content
    pub fn update_section<I, K, V>(&mut self, section_id: &str, updates: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let definition = self
            .definition(section_id)
            .ok_or_else(|| Error::UnknownSection(section_id.to_string()))?;

        let updates: Vec<(String, String)> = updates
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        if let Some((field_id, _)) = updates.iter().find(|(f, _)| definition.field(f).is_none()) {
            return Err(Error::Validation(format!(
                "Unknown field {} for section {}",
                field_id, section_id
            )));
        }

        let now = Utc::now();
        let content = self
            .plan
            .sections
            .entry(section_id.to_string())
            .or_default();
        let count = updates.len();
        content.fields.extend(updates);
        content.updated_at = now;
        self.plan.metadata.updated_at = now;

        debug!(section = section_id, fields = count, "Updated section content");
        Ok(())
    }

    /// Set a single field value
    pub fn set_field(&mut self, section_id: &str, field_id: &str, value: &str) -> Result<()> {
        self.update_section(section_id, [(field_id, value)])
    }

    /// Hide a section, keeping its content
    ///
    /// Re-enabling the section later restores the previous text. Use
    /// [`PlanStore::purge_section`] to discard the content as well.
    pub fn delete_section(&mut self, section_id: &str) -> Result<()> {
        self.ensure_removable(section_id)?;

        let before = self.plan.enabled_section_ids.len();
        self.plan.enabled_section_ids.retain(|id| id != section_id);
        if self.plan.enabled_section_ids.len() != before {
            self.touch();
            info!(section = section_id, "Hid section");
        }
        Ok(())
    }

    /// Remove a section together with its content
    ///
    /// Custom sections also lose their definition.
    pub fn purge_section(&mut self, section_id: &str) -> Result<()> {
        self.ensure_removable(section_id)?;

        self.plan.enabled_section_ids.retain(|id| id != section_id);
        self.plan.sections.remove(section_id);
        self.plan.custom_sections.retain(|d| d.id != section_id);
        self.touch();

        info!(section = section_id, "Purged section");
        Ok(())
    }

    /// Flip a section between shown and hidden, returning the new state
    ///
    /// Content is preserved either way.
    pub fn toggle_section(&mut self, section_id: &str) -> Result<bool> {
        self.ensure_removable(section_id)?;

        let enabled = if self.plan.is_enabled(section_id) {
            self.plan.enabled_section_ids.retain(|id| id != section_id);
            false
        } else {
            self.insert_enabled(section_id);
            true
        };
        self.touch();

        info!(section = section_id, enabled, "Toggled section");
        Ok(enabled)
    }

    /// Edit plan-level fields
    pub fn update_details(&mut self, details: PlanDetails) -> Result<()> {
        if let Some(title) = details.title {
            self.plan.title = title.trim().to_string();
        }
        if let Some(description) = details.description {
            self.plan.description = description;
        }
        if let Some(methodology) = details.methodology {
            self.plan.methodology = methodology;
        }
        if let Some(status) = details.status {
            self.plan.status = status;
        }
        self.touch();
        Ok(())
    }

    /// Replace the plan wholesale with a template
    ///
    /// The plan gets a new id and fresh timestamps. Required sections are
    /// enabled even when the template omits them.
    pub fn load_template(&mut self, template: &PlanTemplate) -> Result<()> {
        template.validate(&self.catalog)?;

        let mut enabled: Vec<String> = Vec::new();
        for id in self
            .catalog
            .required_ids()
            .chain(template.sections.iter().map(String::as_str))
        {
            if !enabled.iter().any(|e| e == id) {
                enabled.push(id.to_string());
            }
        }
        let catalog = &self.catalog;
        enabled.sort_by_key(|id| catalog.sections.iter().position(|s| &s.id == id));

        let sections = template
            .content
            .iter()
            .map(|(id, fields)| (id.clone(), SectionContent::with_fields(fields.clone())))
            .collect();

        self.plan = Plan {
            id: Uuid::new_v4().to_string(),
            title: template.title.clone(),
            description: template.description.clone(),
            methodology: template.methodology,
            status: PlanStatus::Draft,
            enabled_section_ids: enabled,
            sections,
            custom_sections: Vec::new(),
            metadata: PlanMetadata::fresh(
                template
                    .version
                    .clone()
                    .unwrap_or_else(|| PLAN_FORMAT_VERSION.to_string()),
            ),
        };

        info!(template = %template.id, plan = %self.plan.id, "Loaded template");
        Ok(())
    }

    /// Restore the default template
    pub fn reset(&mut self, templates: &TemplateLibrary) -> Result<()> {
        let template = templates.default_template()?;
        self.load_template(template)
    }

    /// Completion and effort statistics, computed from the current state
    pub fn stats(&self) -> PlanStats {
        compute_stats(&self.plan, &self.catalog)
    }

    /// Word-count analytics, computed from the current state
    pub fn analytics(&self) -> PlanAnalytics {
        compute_analytics(&self.plan, &self.catalog)
    }

    fn ensure_removable(&self, section_id: &str) -> Result<()> {
        let definition = self
            .definition(section_id)
            .ok_or_else(|| Error::UnknownSection(section_id.to_string()))?;

        if definition.required {
            return Err(Error::RequiredSection(definition.title.clone()));
        }
        Ok(())
    }

    /// Enable a section at its document-order position
    fn insert_enabled(&mut self, section_id: &str) {
        let effective = self.plan.effective_catalog(&self.catalog);
        let position = effective.position(section_id);
        let index = self
            .plan
            .enabled_section_ids
            .iter()
            .position(|id| effective.position(id) > position)
            .unwrap_or(self.plan.enabled_section_ids.len());

        self.plan
            .enabled_section_ids
            .insert(index, section_id.to_string());
    }

    fn touch(&mut self) {
        self.plan.metadata.updated_at = Utc::now();
    }
}

//! Plan data model

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, EffectiveCatalog, SectionDefinition};
use crate::{Error, Result};

/// Document version written into new plans
pub const PLAN_FORMAT_VERSION: &str = "1.0.0";

/// Delivery approach the plan is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Methodology {
    #[default]
    Waterfall,
    Agile,
    Hybrid,
}

impl Methodology {
    /// Get the short name for this methodology
    pub fn name(&self) -> &'static str {
        match self {
            Methodology::Waterfall => "waterfall",
            Methodology::Agile => "agile",
            Methodology::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Methodology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Methodology {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "waterfall" | "predictive" => Ok(Methodology::Waterfall),
            "agile" | "adaptive" => Ok(Methodology::Agile),
            "hybrid" => Ok(Methodology::Hybrid),
            _ => Err(format!("Unknown methodology: {}", s)),
        }
    }
}

/// Review state of the plan document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    Draft,
    InReview,
    Approved,
    Archived,
}

impl PlanStatus {
    /// Get the short name for this status
    pub fn name(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "draft",
            PlanStatus::InReview => "in_review",
            PlanStatus::Approved => "approved",
            PlanStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "draft" => Ok(PlanStatus::Draft),
            "in_review" | "review" => Ok(PlanStatus::InReview),
            "approved" => Ok(PlanStatus::Approved),
            "archived" => Ok(PlanStatus::Archived),
            _ => Err(format!("Unknown plan status: {}", s)),
        }
    }
}

/// Timestamps and document version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: String,
}

impl PlanMetadata {
    /// Metadata for a plan created now
    pub fn fresh(version: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            version: version.into(),
        }
    }
}

/// User-entered text for one section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionContent {
    /// Field id -> free text
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SectionContent {
    /// Empty content created now
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            fields: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Content created now with the given field values
    pub fn with_fields(fields: BTreeMap<String, String>) -> Self {
        Self {
            fields,
            ..Self::new()
        }
    }

    /// A section is complete once any field holds non-whitespace text
    pub fn is_complete(&self) -> bool {
        self.fields.values().any(|v| !v.trim().is_empty())
    }

    /// Value of a field, empty when unset
    pub fn value(&self, field_id: &str) -> &str {
        self.fields.get(field_id).map(String::as_str).unwrap_or("")
    }
}

impl Default for SectionContent {
    fn default() -> Self {
        Self::new()
    }
}

/// A project plan document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub methodology: Methodology,
    #[serde(default)]
    pub status: PlanStatus,
    /// Visible sections, unique and in document order
    pub enabled_section_ids: Vec<String>,
    /// Content by section id; hidden sections keep their entry
    #[serde(default)]
    pub sections: BTreeMap<String, SectionContent>,
    /// Definitions of sections the user added beyond the catalog
    #[serde(default)]
    pub custom_sections: Vec<SectionDefinition>,
    pub metadata: PlanMetadata,
}

impl Plan {
    /// The catalog as seen by this plan, including custom sections
    pub fn effective_catalog<'a>(&'a self, catalog: &'a Catalog) -> EffectiveCatalog<'a> {
        catalog.with_custom(&self.custom_sections)
    }

    /// Whether a section is currently shown
    pub fn is_enabled(&self, section_id: &str) -> bool {
        self.enabled_section_ids.iter().any(|id| id == section_id)
    }

    /// Whether a section has any non-blank content
    pub fn is_section_complete(&self, section_id: &str) -> bool {
        self.sections
            .get(section_id)
            .is_some_and(SectionContent::is_complete)
    }

    /// Check the structural invariants against a catalog
    ///
    /// Every enabled id, content key and content field must resolve to a
    /// definition. Enabled ids must be unique, required sections must be
    /// enabled and custom sections can never be required.
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        let mut custom_ids = HashSet::new();
        for definition in &self.custom_sections {
            definition.validate()?;
            if definition.required {
                return Err(Error::Validation(format!(
                    "Custom section {} cannot be required",
                    definition.id
                )));
            }
            if catalog.get(&definition.id).is_some() || !custom_ids.insert(definition.id.as_str())
            {
                return Err(Error::Validation(format!(
                    "Custom section id {} collides with another section",
                    definition.id
                )));
            }
        }

        let effective = self.effective_catalog(catalog);

        let mut seen = HashSet::new();
        for id in &self.enabled_section_ids {
            if !effective.contains(id) {
                return Err(Error::UnknownSection(id.clone()));
            }
            if !seen.insert(id.as_str()) {
                return Err(Error::Validation(format!(
                    "Section {} is enabled more than once",
                    id
                )));
            }
        }

        for (id, content) in &self.sections {
            let definition = effective
                .get(id)
                .ok_or_else(|| Error::UnknownSection(id.clone()))?;
            if let Some(field_id) = content.fields.keys().find(|f| definition.field(f).is_none()) {
                return Err(Error::Validation(format!(
                    "Unknown field {} for section {}",
                    field_id, id
                )));
            }
        }

        if let Some(id) = catalog.required_ids().find(|id| !seen.contains(id)) {
            return Err(Error::Validation(format!(
                "Required section {} is not enabled",
                id
            )));
        }

        Ok(())
    }
}

//! Section catalog
//!
//! The catalog is the static, versioned table of section definitions a plan
//! is built from. It is parsed once at startup, either from the table
//! embedded in the binary or from a file named in the configuration.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const BUILTIN_CATALOG: &str = include_str!("data/catalog.toml");

/// PMBOK process group a section belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessGroup {
    Initiating,
    #[default]
    Planning,
    Executing,
    MonitoringControlling,
    Closing,
}

impl ProcessGroup {
    /// Get the display label for this process group
    pub fn label(&self) -> &'static str {
        match self {
            ProcessGroup::Initiating => "Initiating",
            ProcessGroup::Planning => "Planning",
            ProcessGroup::Executing => "Executing",
            ProcessGroup::MonitoringControlling => "Monitoring and Controlling",
            ProcessGroup::Closing => "Closing",
        }
    }
}

impl fmt::Display for ProcessGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for ProcessGroup {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "initiating" => Ok(ProcessGroup::Initiating),
            "planning" => Ok(ProcessGroup::Planning),
            "executing" => Ok(ProcessGroup::Executing),
            "monitoring_controlling" | "monitoring_and_controlling" | "monitoring" => {
                Ok(ProcessGroup::MonitoringControlling)
            }
            "closing" => Ok(ProcessGroup::Closing),
            _ => Err(format!("Unknown process group: {}", s)),
        }
    }
}

/// Input widget a field is edited with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Textarea,
    Text,
}

/// A single free-text field of a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

impl FieldDefinition {
    /// Create a textarea field
    pub fn textarea(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: FieldKind::Textarea,
            required: false,
        }
    }
}

/// Template for one document chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDefinition {
    pub id: String,
    pub title: String,
    /// Guidance text shown above the fields and in exported documents
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub process_group: ProcessGroup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_area: Option<String>,
    /// Required sections can never be hidden or removed from a plan
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub estimated_hours: f64,
    pub fields: Vec<FieldDefinition>,
}

impl SectionDefinition {
    /// Look up a field by id
    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Check the definition on its own, independent of any catalog
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Catalog("Section id must not be empty".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(Error::Catalog(format!("Section {} has no title", self.id)));
        }
        if !self.estimated_hours.is_finite() || self.estimated_hours < 0.0 {
            return Err(Error::Catalog(format!(
                "Section {} has invalid estimated hours {}",
                self.id, self.estimated_hours
            )));
        }
        if self.fields.is_empty() {
            return Err(Error::Catalog(format!("Section {} has no fields", self.id)));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.id.as_str()) {
                return Err(Error::Catalog(format!(
                    "Section {} has duplicate field id {}",
                    self.id, field.id
                )));
            }
        }

        Ok(())
    }
}

/// The versioned table of built-in section definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub version: String,
    pub sections: Vec<SectionDefinition>,
}

impl Catalog {
    /// Parse the catalog embedded in the binary
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    /// Parse and validate a catalog from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(content)
            .map_err(|e| Error::Catalog(format!("Failed to parse catalog: {}", e)))?;
        catalog.validate()?;

        tracing::debug!(
            version = %catalog.version,
            sections = catalog.sections.len(),
            "Loaded section catalog"
        );

        Ok(catalog)
    }

    /// Load a catalog file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load the catalog at `path`, or the built-in one when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::builtin(),
        }
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for section in &self.sections {
            section.validate()?;
            if !seen.insert(section.id.as_str()) {
                return Err(Error::Catalog(format!(
                    "Duplicate section id {}",
                    section.id
                )));
            }
        }
        Ok(())
    }

    /// Look up a section definition by id
    pub fn get(&self, id: &str) -> Option<&SectionDefinition> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Ids of all required sections, in catalog order
    pub fn required_ids(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .filter(|s| s.required)
            .map(|s| s.id.as_str())
    }

    /// View this catalog extended with a plan's custom section definitions
    pub fn with_custom<'a>(&'a self, custom: &'a [SectionDefinition]) -> EffectiveCatalog<'a> {
        EffectiveCatalog {
            catalog: self,
            custom,
        }
    }
}

/// The built-in catalog plus the custom sections of one plan
///
/// Custom sections sort after all built-in ones, in creation order.
#[derive(Debug, Clone, Copy)]
pub struct EffectiveCatalog<'a> {
    catalog: &'a Catalog,
    custom: &'a [SectionDefinition],
}

impl<'a> EffectiveCatalog<'a> {
    /// Look up a section definition by id
    pub fn get(&self, id: &str) -> Option<&'a SectionDefinition> {
        self.catalog
            .get(id)
            .or_else(|| self.custom.iter().find(|s| s.id == id))
    }

    /// Whether `id` names a known section
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All definitions in document order
    pub fn definitions(&self) -> impl Iterator<Item = &'a SectionDefinition> {
        let catalog = self.catalog;
        let custom = self.custom;
        catalog.sections.iter().chain(custom.iter())
    }

    /// Document-order position of a section
    pub fn position(&self, id: &str) -> Option<usize> {
        self.definitions().position(|s| s.id == id)
    }
}

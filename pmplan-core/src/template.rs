//! Plan templates
//!
//! Templates are kept apart from the catalog schema: a template only names
//! catalog sections and optional starter text for their fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::plan::Methodology;
use crate::{Error, Result};

const BUILTIN_TEMPLATES: &str = include_str!("data/templates.toml");

/// Id of the template used to reset a plan
pub const DEFAULT_TEMPLATE_ID: &str = "default";

/// Starting point for a new plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub summary: String,
    /// Plan title the template starts with
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub methodology: Methodology,
    /// Document version stamped into the plan metadata
    #[serde(default)]
    pub version: Option<String>,
    /// Sections to enable; required catalog sections are added regardless
    #[serde(default)]
    pub sections: Vec<String>,
    /// Starter text: section id -> field id -> value
    #[serde(default)]
    pub content: BTreeMap<String, BTreeMap<String, String>>,
}

impl PlanTemplate {
    /// Check every section and field id against the catalog
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        for id in self.sections.iter().chain(self.content.keys()) {
            if catalog.get(id).is_none() {
                return Err(Error::UnknownSection(format!(
                    "{} (template {})",
                    id, self.id
                )));
            }
        }

        for (section_id, fields) in &self.content {
            if let Some(definition) = catalog.get(section_id) {
                for field_id in fields.keys() {
                    if definition.field(field_id).is_none() {
                        return Err(Error::Validation(format!(
                            "Template {} sets unknown field {} of section {}",
                            self.id, field_id, section_id
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TemplateTable {
    templates: Vec<PlanTemplate>,
}

/// The set of templates a user can pick from
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLibrary {
    templates: Vec<PlanTemplate>,
}

impl TemplateLibrary {
    /// Parse the templates embedded in the binary
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_TEMPLATES)
    }

    /// Parse a template table from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let table: TemplateTable = toml::from_str(content)
            .map_err(|e| Error::Catalog(format!("Failed to parse templates: {}", e)))?;

        Ok(Self {
            templates: table.templates,
        })
    }

    /// All templates in declaration order
    pub fn templates(&self) -> &[PlanTemplate] {
        &self.templates
    }

    /// Look up a template by id
    pub fn get(&self, id: &str) -> Result<&PlanTemplate> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::Validation(format!("Unknown template: {}", id)))
    }

    /// The template a reset restores
    pub fn default_template(&self) -> Result<&PlanTemplate> {
        self.get(DEFAULT_TEMPLATE_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates() {
        let library = TemplateLibrary::builtin().unwrap();
        let ids: Vec<&str> = library.templates().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["default", "basic", "agile"]);
    }

    #[test]
    fn test_builtin_templates_match_catalog() {
        let catalog = Catalog::builtin().unwrap();
        let library = TemplateLibrary::builtin().unwrap();
        for template in library.templates() {
            template.validate(&catalog).unwrap();
        }
    }

    #[test]
    fn test_template_content() {
        let library = TemplateLibrary::builtin().unwrap();
        let agile = library.get("agile").unwrap();
        assert_eq!(agile.methodology, Methodology::Agile);
        assert_eq!(agile.title, "Sprint Plan");
        assert_eq!(
            agile.content["project-closure"]["lessons"],
            "Notes and learnings from the sprint."
        );
    }

    #[test]
    fn test_default_template_is_blank() {
        let library = TemplateLibrary::builtin().unwrap();
        let default = library.default_template().unwrap();
        assert!(default.title.is_empty());
        assert!(default.content.is_empty());
    }

    #[test]
    fn test_unknown_template() {
        let library = TemplateLibrary::builtin().unwrap();
        assert!(matches!(library.get("waterfall-xl"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_validate_unknown_section() {
        let catalog = Catalog::builtin().unwrap();
        let library = TemplateLibrary::from_toml(
            r#"
[[templates]]
id = "bad"
name = "Bad"
sections = ["no-such-section"]
"#,
        )
        .unwrap();

        let err = library.get("bad").unwrap().validate(&catalog).unwrap_err();
        assert!(matches!(err, Error::UnknownSection(_)));
    }

    #[test]
    fn test_validate_unknown_field() {
        let catalog = Catalog::builtin().unwrap();
        let library = TemplateLibrary::from_toml(
            r#"
[[templates]]
id = "bad"
name = "Bad"
sections = ["project-charter"]

[templates.content.project-charter]
nonsense = "x"
"#,
        )
        .unwrap();

        let err = library.get("bad").unwrap().validate(&catalog).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}

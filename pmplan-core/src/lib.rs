//! pmplan core - project management plan documents
//!
//! This crate holds the section catalog, plan templates, the plan store
//! that owns and mutates a plan, derived statistics and the export
//! adapter. With the `database` feature it can also persist plans to a
//! key-value store.

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
#[cfg(feature = "database")]
pub mod persist;
pub mod plan;
pub mod team;
pub mod template;

pub use catalog::{Catalog, EffectiveCatalog, FieldDefinition, ProcessGroup, SectionDefinition};
pub use config::Config;
pub use error::{Error, Result};
pub use export::{ExportFormat, ExportOptions, ExportPayload, Exporter};
#[cfg(feature = "database")]
pub use persist::PlanPersistence;
pub use plan::{
    Methodology, NewSection, Plan, PlanAnalytics, PlanDetails, PlanStats, PlanStatus, PlanStore,
    SectionContent,
};
pub use team::{Roster, UserProfile};
pub use template::{PlanTemplate, TemplateLibrary};

//! Plan model
//!
//! A plan is a title, some plan-level metadata and free-text content for a
//! subset of catalog sections. [`PlanStore`] owns a plan and is the only way
//! to mutate it; statistics and analytics are derived on every read.

mod analytics;
mod model;
mod stats;
mod store;

pub use analytics::{compute_analytics, word_count, PlanAnalytics, SectionWords};
pub use model::{
    Methodology, Plan, PlanMetadata, PlanStatus, SectionContent, PLAN_FORMAT_VERSION,
};
pub use stats::{compute_stats, PlanStats};
pub use store::{NewSection, PlanDetails, PlanStore, CUSTOM_CATEGORY};

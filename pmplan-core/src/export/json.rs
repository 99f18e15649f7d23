//! JSON export and import

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::plan::{compute_stats, Plan, PlanStats, PlanStore};
use crate::Result;

/// The plan as written to a JSON export
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonExport<'a> {
    #[serde(flatten)]
    pub plan: &'a Plan,
    pub exported_at: DateTime<Utc>,
    pub stats: PlanStats,
}

/// Pretty-printed JSON of the plan, its export time and its stats
pub fn to_json(plan: &Plan, catalog: &Catalog, now: DateTime<Utc>) -> Result<String> {
    let export = JsonExport {
        plan,
        exported_at: now,
        stats: compute_stats(plan, catalog),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Rebuild a plan from a JSON export
///
/// `exportedAt` and `stats` are ignored; the plan must satisfy the same
/// invariants as one built in place.
pub fn import_json(catalog: Arc<Catalog>, json: &str) -> Result<PlanStore> {
    let plan: Plan = serde_json::from_str(json)?;
    debug!(plan = %plan.id, sections = plan.enabled_section_ids.len(), "Importing plan");
    PlanStore::from_snapshot(catalog, plan)
}

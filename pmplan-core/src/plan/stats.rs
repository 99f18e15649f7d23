//! Derived plan statistics

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

use super::model::Plan;

/// Completion and effort figures derived from the current plan state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStats {
    pub total_sections: usize,
    pub completed_sections: usize,
    /// Rounded percentage in 0..=100
    pub completion_percentage: u32,
    pub total_estimated_hours: f64,
    /// Rounded hours still expected, from the rounded percentage
    pub remaining_hours: f64,
}

/// Compute the statistics for a plan
///
/// Only enabled sections count. Rounding is half away from zero.
pub fn compute_stats(plan: &Plan, catalog: &Catalog) -> PlanStats {
    let effective = plan.effective_catalog(catalog);

    let total_sections = plan.enabled_section_ids.len();
    let completed_sections = plan
        .enabled_section_ids
        .iter()
        .filter(|id| plan.is_section_complete(id))
        .count();

    let completion_percentage = if total_sections == 0 {
        0
    } else {
        (100.0 * completed_sections as f64 / total_sections as f64).round() as u32
    };

    let total_estimated_hours: f64 = plan
        .enabled_section_ids
        .iter()
        .filter_map(|id| effective.get(id))
        .map(|definition| definition.estimated_hours)
        .sum();

    let remaining_hours =
        (total_estimated_hours * (1.0 - completion_percentage as f64 / 100.0)).round();

    PlanStats {
        total_sections,
        completed_sections,
        completion_percentage,
        total_estimated_hours,
        remaining_hours,
    }
}

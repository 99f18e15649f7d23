//! Word-count analytics

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

use super::model::Plan;

/// Words written for one enabled section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionWords {
    pub id: String,
    pub title: String,
    pub words: usize,
}

/// Writing volume across the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAnalytics {
    /// Plan title and description plus every enabled section
    pub total_words: usize,
    /// Rounded mean over enabled sections, 0 when none are enabled
    pub average_words_per_section: usize,
    pub sections: Vec<SectionWords>,
}

/// Count whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Compute word counts for the enabled sections of a plan
///
/// A section's count covers its title and all of its field text.
pub fn compute_analytics(plan: &Plan, catalog: &Catalog) -> PlanAnalytics {
    let effective = plan.effective_catalog(catalog);

    let sections: Vec<SectionWords> = plan
        .enabled_section_ids
        .iter()
        .map(|id| {
            let title = effective
                .get(id)
                .map(|d| d.title.clone())
                .unwrap_or_else(|| id.clone());
            let body_words: usize = plan
                .sections
                .get(id)
                .map(|c| c.fields.values().map(|v| word_count(v)).sum())
                .unwrap_or(0);

            SectionWords {
                id: id.clone(),
                words: word_count(&title) + body_words,
                title,
            }
        })
        .collect();

    let section_total: usize = sections.iter().map(|s| s.words).sum();
    let average_words_per_section = if sections.is_empty() {
        0
    } else {
        (section_total as f64 / sections.len() as f64).round() as usize
    };

    PlanAnalytics {
        total_words: word_count(&plan.title) + word_count(&plan.description) + section_total,
        average_words_per_section,
        sections,
    }
}

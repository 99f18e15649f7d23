//! CSV section table

use crate::catalog::Catalog;
use crate::plan::Plan;

/// Header row of the section table
pub const CSV_HEADER: &str =
    "id,title,category,processGroup,required,estimatedHours,completionStatus";

/// Quote a cell, doubling embedded quotes
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// One row per enabled section, in document order
///
/// Every cell is quoted and rows end with `\n`.
pub fn to_csv(plan: &Plan, catalog: &Catalog) -> String {
    let effective = plan.effective_catalog(catalog);
    let mut out = String::with_capacity(64 * (plan.enabled_section_ids.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');

    for definition in effective.definitions().filter(|d| plan.is_enabled(&d.id)) {
        let status = if plan.is_section_complete(&definition.id) {
            "complete"
        } else {
            "incomplete"
        };

        let row = [
            quote(&definition.id),
            quote(&definition.title),
            quote(&definition.category),
            quote(definition.process_group.label()),
            quote(&definition.required.to_string()),
            quote(&definition.estimated_hours.to_string()),
            quote(status),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

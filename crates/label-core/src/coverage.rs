use std::collections::HashMap;

use anyhow::{Context, Result};
use label_model::Table;
use label_rules::RuleEngine;

use crate::annotators::row_attributes;

/// How many rows carry a family label and whether the rule table has an
/// entry for it. Labels are normalized the way rendering normalizes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyCoverage {
    /// `None` for rows with no family label at all.
    pub family: Option<String>,
    pub rows: usize,
    pub covered: bool,
}

/// Tally every family label in `table`, in first-seen order.
///
/// Unlike rendering, this never stops at the first uncovered family, so
/// one pass lists every rule the table is missing.
pub fn family_coverage(
    table: &Table,
    attributes_column: &str,
    engine: &RuleEngine,
) -> Result<Vec<FamilyCoverage>> {
    let mut index: HashMap<Option<String>, usize> = HashMap::new();
    let mut report: Vec<FamilyCoverage> = Vec::new();
    for (row, dict) in table.row_dicts().enumerate() {
        let attributes = row_attributes(&dict, attributes_column)
            .with_context(|| format!("row {}", row + 1))?;
        let family = engine.normalized_family_label(&attributes);
        match index.get(&family) {
            Some(&slot) => report[slot].rows += 1,
            None => {
                let covered = family
                    .as_deref()
                    .is_some_and(|label| engine.table().family(label).is_some());
                index.insert(family.clone(), report.len());
                report.push(FamilyCoverage {
                    family,
                    rows: 1,
                    covered,
                });
            }
        }
    }
    Ok(report)
}

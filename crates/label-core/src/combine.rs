//! Packs resistor rows that share a grid cell into one three-slot label.

use anyhow::Result;
use label_model::{Fields, RowDict, cell};
use label_resistor::{BLANK_STROKE_HEX, ResistorColor, STROKE_HEX};
use thiserror::Error;
use tracing::debug;

use crate::pipeline::Regroup;

/// Columns that must agree across a group and are carried over as-is.
pub const SHARED_COLUMNS: [&str; 6] = ["quickdesc", "pack", "dippack", "cost", "bg_color", "gridid"];

const SLOT_COLUMNS: [&str; 5] = ["val", "res_color1", "res_color2", "res_color3", "res_stroke"];
const SLOTS: usize = 3;
const GRID_COLUMN: &str = "gridid";
const TITLE: &str = "Resistor";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombineError {
    #[error("grid cell {group:?} has {count} rows, at most {SLOTS} fit")]
    TooManyRows { group: String, count: usize },

    #[error("grid cell {group:?} disagrees on {column}: {first:?} vs {other:?}")]
    Inconsistent {
        group: String,
        column: String,
        first: String,
        other: String,
    },
}

/// Groups rows by `gridid` and lays up to three of them out left to right.
///
/// One row takes the middle slot, two rows take the outer slots and three
/// fill every slot. Unused slots are blank: empty value, white bands and a
/// white outline.
pub struct ResistorGridCombiner {
    out: Vec<String>,
    required: Vec<String>,
}

impl Default for ResistorGridCombiner {
    fn default() -> Self {
        Self::new()
    }
}

impl ResistorGridCombiner {
    pub fn new() -> Self {
        let mut out = vec!["title".to_string()];
        out.extend(SHARED_COLUMNS.iter().map(|c| c.to_string()));
        for slot in 1..=SLOTS {
            out.extend(SLOT_COLUMNS.iter().map(|c| format!("{c}_{slot}")));
        }
        let mut required = vec![GRID_COLUMN.to_string()];
        required.extend(SLOT_COLUMNS[..4].iter().map(|c| c.to_string()));
        Self { out, required }
    }
}

/// Which slot (1-based) each of `count` rows occupies.
fn slot_layout(count: usize) -> Option<&'static [usize]> {
    match count {
        1 => Some(&[2]),
        2 => Some(&[1, 3]),
        3 => Some(&[1, 2, 3]),
        _ => None,
    }
}

fn aggregate(group: &str, column: &str, rows: &[RowDict]) -> Result<String, CombineError> {
    let first = rows.first().map(|row| cell(row, column)).unwrap_or_default();
    if let Some(other) = rows.iter().map(|row| cell(row, column)).find(|v| *v != first) {
        return Err(CombineError::Inconsistent {
            group: group.to_string(),
            column: column.to_string(),
            first: first.to_string(),
            other: other.to_string(),
        });
    }
    Ok(first.to_string())
}

fn fill_slot(fields: &mut Fields, slot: usize, row: Option<&RowDict>) {
    let blank = ResistorColor::White.hex();
    for column in SLOT_COLUMNS {
        let value = match (row, column) {
            (None, "val") => "",
            (None, "res_stroke") => BLANK_STROKE_HEX,
            (None, _) => blank,
            (Some(row), "res_stroke") => match cell(row, column) {
                "" => STROKE_HEX,
                stroke => stroke,
            },
            (Some(row), _) => cell(row, column),
        };
        fields.insert(format!("{column}_{slot}"), value.to_string());
    }
}

impl Regroup for ResistorGridCombiner {
    fn name(&self) -> &str {
        "resistor_grid"
    }

    fn out_names(&self) -> &[String] {
        &self.out
    }

    /// `val` and the three band colors. A missing `res_stroke` falls back
    /// to the default outline and shared columns may be absent.
    fn required_columns(&self) -> &[String] {
        &self.required
    }

    fn key(&self, row: &RowDict) -> String {
        cell(row, GRID_COLUMN).to_string()
    }

    fn combine(&self, key: &str, rows: &[RowDict]) -> Result<Vec<Fields>> {
        let layout = slot_layout(rows.len()).ok_or_else(|| CombineError::TooManyRows {
            group: key.to_string(),
            count: rows.len(),
        })?;
        debug!(group = key, rows = rows.len(), "combining grid cell");

        let mut fields = Fields::new();
        fields.insert("title".to_string(), TITLE.to_string());
        for column in SHARED_COLUMNS {
            fields.insert(column.to_string(), aggregate(key, column, rows)?);
        }
        for slot in 1..=SLOTS {
            let row = layout
                .iter()
                .position(|&taken| taken == slot)
                .map(|index| &rows[index]);
            fill_slot(&mut fields, slot, row);
        }
        Ok(vec![fields])
    }
}

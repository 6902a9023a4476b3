use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::{CoverageReport, RunSummary};

pub fn print_summary(summary: &RunSummary) {
    println!("Command: {}", summary.command);
    println!("Input: {}", summary.input.display());
    println!("Output: {}", summary.output.display());
    if let Some(rules) = &summary.rules {
        println!("Rules: {rules}");
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Step"), header_cell("Kind")]);
    apply_table_style(&mut table);
    for step in &summary.steps {
        table.add_row(vec![Cell::new(step), dim_cell(step_kind(step))]);
    }
    println!("{table}");

    let added = if summary.columns_added.is_empty() {
        "-".to_string()
    } else {
        summary.columns_added.join(", ")
    };
    println!(
        "Rows: {} in, {} out ({:.2?})",
        summary.rows_in, summary.rows_out, summary.duration
    );
    println!("New columns: {added}");
}

pub fn print_coverage(report: &CoverageReport) {
    println!("Input: {}", report.input.display());
    println!("Rules: {}", report.rules);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Family"),
        header_cell("Rows"),
        header_cell("Covered"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Center);

    let mut total_rows = 0usize;
    for entry in &report.families {
        total_rows += entry.rows;
        let family = match &entry.family {
            Some(name) => Cell::new(name),
            None => dim_cell("(no family label)"),
        };
        table.add_row(vec![family, Cell::new(entry.rows), covered_cell(entry.covered)]);
    }
    let uncovered = report.uncovered();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        count_cell(uncovered, Color::Red).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    if uncovered > 0 {
        eprintln!("{uncovered} family label(s) have no rule");
    }
}

/// Shared look for every table the CLI prints.
pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Step names look like `kind(column)` or a bare kind.
fn step_kind(step: &str) -> &str {
    step.split_once('(').map_or(step, |(kind, _)| kind)
}

fn covered_cell(covered: bool) -> Cell {
    if covered {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("✗").fg(Color::Red).add_attribute(Attribute::Bold)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use label_model::Table;

/// Options controlling how delimited files are read.
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub delimiter: u8,
    /// Trim surrounding whitespace from data cells.
    pub trim_cells: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim_cells: true,
        }
    }
}

impl IngestOptions {
    /// Options for `path`, picking a tab delimiter for `.tsv` files.
    pub fn for_path(path: &Path) -> Self {
        let is_tsv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
        Self {
            delimiter: if is_tsv { b'\t' } else { b',' },
            ..Self::default()
        }
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str, trim: bool) -> String {
    let value = raw.trim_matches('\u{feff}');
    if trim {
        value.trim().to_string()
    } else {
        value.to_string()
    }
}

pub fn read_table(path: &Path) -> Result<Table> {
    read_table_with_options(path, IngestOptions::for_path(path))
}

pub fn read_table_with_options(path: &Path, options: IngestOptions) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("open table: {}", path.display()))?;
    let table =
        read_table_from(file, options).with_context(|| format!("read table: {}", path.display()))?;
    debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.header().len(),
        "table loaded"
    );
    Ok(table)
}

/// Read a table whose first record is the header. Blank records are skipped.
pub fn read_table_from<R: Read>(reader: R, options: IngestOptions) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(options.delimiter)
        .from_reader(reader);
    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read record {}", index + 1))?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        match &header {
            None => header = Some(record.iter().map(normalize_header).collect()),
            Some(_) => rows.push(
                record
                    .iter()
                    .map(|value| normalize_cell(value, options.trim_cells))
                    .collect(),
            ),
        }
    }
    let table = Table::new(header.unwrap_or_default(), rows)?;
    Ok(table)
}

pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let delimiter = IngestOptions::for_path(path).delimiter;
    let file = File::create(path).with_context(|| format!("create table: {}", path.display()))?;
    write_table_to(file, table, delimiter)
        .with_context(|| format!("write table: {}", path.display()))?;
    debug!(path = %path.display(), rows = table.len(), "table written");
    Ok(())
}

/// Serialize the header and rows. Consumes nothing; the table stays usable.
pub fn write_table_to<W: Write>(writer: W, table: &Table, delimiter: u8) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    writer.write_record(table.header()).context("write header")?;
    for (index, row) in table.rows().iter().enumerate() {
        writer
            .write_record(row)
            .with_context(|| format!("write row {index}"))?;
    }
    writer.flush().context("flush table")?;
    Ok(())
}

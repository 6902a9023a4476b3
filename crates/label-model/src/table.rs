//! Immutable header + rows table with functional transforms.
//!
//! Every operation borrows the table and returns a new one. Rows are exposed
//! to callbacks as [`RowDict`] values rebuilt from the header on each call,
//! so a callback can never observe or mutate another row's state.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use crate::error::TableError;
use crate::{Fields, RowDict};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, checking that column names are unique and that every
    /// row has exactly one cell per column.
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, TableError> {
        let mut seen = BTreeSet::new();
        for column in &header {
            if !seen.insert(column.as_str()) {
                return Err(TableError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != header.len() {
                return Err(TableError::RaggedRow {
                    row,
                    expected: header.len(),
                    actual: cells.len(),
                });
            }
        }
        Ok(Self { header, rows })
    }

    /// Build a table from row dicts laid out against `header`.
    ///
    /// Keys missing from a dict become empty cells; keys not in `header`
    /// are rejected.
    pub fn from_dicts(header: Vec<String>, dicts: &[Fields]) -> Result<Self, TableError> {
        let known: BTreeSet<&str> = header.iter().map(String::as_str).collect();
        let mut rows = Vec::with_capacity(dicts.len());
        for (row, dict) in dicts.iter().enumerate() {
            if let Some(column) = dict.keys().find(|key| !known.contains(key.as_str())) {
                return Err(TableError::UndeclaredField {
                    column: column.clone(),
                    row,
                });
            }
            rows.push(
                header
                    .iter()
                    .map(|column| dict.get(column).cloned().unwrap_or_default())
                    .collect(),
            );
        }
        Self::new(header, rows)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.header.iter().any(|column| column == name)
    }

    pub fn row_dict(&self, index: usize) -> Option<RowDict> {
        self.rows.get(index).map(|row| self.zip_row(row))
    }

    pub fn row_dicts(&self) -> impl Iterator<Item = RowDict> + '_ {
        self.rows.iter().map(|row| self.zip_row(row))
    }

    fn zip_row(&self, row: &[String]) -> RowDict {
        self.header
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .collect()
    }

    /// Append the fields returned by `f` for every row.
    ///
    /// New columns follow the existing ones in first-seen order across rows
    /// (key order within a row). A returned key that already names a column
    /// fails the whole transform.
    pub fn map_append<F, E>(&self, mut f: F) -> Result<Table, E>
    where
        F: FnMut(&RowDict) -> Result<Fields, E>,
        E: From<TableError>,
    {
        let existing: BTreeSet<&str> = self.header.iter().map(String::as_str).collect();
        let mut new_columns = Vec::new();
        let mut seen_new = BTreeSet::new();
        let mut appended = Vec::with_capacity(self.rows.len());
        for dict in self.row_dicts() {
            let fields = f(&dict)?;
            for key in fields.keys() {
                if existing.contains(key.as_str()) {
                    return Err(TableError::ColumnCollision {
                        column: key.clone(),
                    }
                    .into());
                }
                if seen_new.insert(key.clone()) {
                    new_columns.push(key.clone());
                }
            }
            appended.push(fields);
        }
        Ok(self.extend_with(&new_columns, appended))
    }

    /// Append the declared `columns`, filled per row by `f`.
    ///
    /// The header grows by exactly `columns`, in the given order, even when
    /// no row returns a value for some of them. Omitted keys become empty
    /// cells; keys outside `columns` fail.
    pub fn append_columns<F, E>(&self, columns: &[String], mut f: F) -> Result<Table, E>
    where
        F: FnMut(&RowDict) -> Result<Fields, E>,
        E: From<TableError>,
    {
        let mut declared = BTreeSet::new();
        for column in columns {
            if self.has_column(column) || !declared.insert(column.as_str()) {
                return Err(TableError::ColumnCollision {
                    column: column.clone(),
                }
                .into());
            }
        }
        let mut appended = Vec::with_capacity(self.rows.len());
        for (row, dict) in self.row_dicts().enumerate() {
            let fields = f(&dict)?;
            if let Some(column) = fields.keys().find(|key| !declared.contains(key.as_str())) {
                return Err(TableError::UndeclaredField {
                    column: column.clone(),
                    row,
                }
                .into());
            }
            appended.push(fields);
        }
        Ok(self.extend_with(columns, appended))
    }

    fn extend_with(&self, columns: &[String], appended: Vec<Fields>) -> Table {
        let mut header = self.header.clone();
        header.extend(columns.iter().cloned());
        let rows = self
            .rows
            .iter()
            .zip(appended)
            .map(|(row, mut fields)| {
                let mut cells = row.clone();
                cells.extend(
                    columns
                        .iter()
                        .map(|column| fields.remove(column).unwrap_or_default()),
                );
                cells
            })
            .collect();
        Table { header, rows }
    }

    /// Keep the rows for which `predicate` holds.
    pub fn filter<F>(&self, mut predicate: F) -> Table
    where
        F: FnMut(&RowDict) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(&self.zip_row(row)))
            .cloned()
            .collect();
        Table {
            header: self.header.clone(),
            rows,
        }
    }

    /// Partition rows by `key_fn`, keeping groups in first-seen key order
    /// and rows in table order within a group.
    pub fn group_by<K, F>(&self, mut key_fn: F) -> Groups<K>
    where
        K: Eq + Hash + Clone,
        F: FnMut(&RowDict) -> K,
    {
        let mut index: HashMap<K, usize> = HashMap::new();
        let mut groups: Vec<(K, Vec<RowDict>)> = Vec::new();
        for dict in self.row_dicts() {
            let key = key_fn(&dict);
            match index.get(&key) {
                Some(&slot) => groups[slot].1.push(dict),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push((key, vec![dict]));
                }
            }
        }
        Groups { groups }
    }
}

/// Rows partitioned by [`Table::group_by`].
#[derive(Debug, Clone)]
pub struct Groups<K> {
    groups: Vec<(K, Vec<RowDict>)>,
}

impl<K> Groups<K> {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.groups.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[RowDict])> {
        self.groups.iter().map(|(key, rows)| (key, rows.as_slice()))
    }

    /// Replace every group with the dicts returned by `f`.
    ///
    /// The resulting header is the union of all returned keys. Callers
    /// should depend on which columns are present, not on their order.
    pub fn group_map<F, E>(&self, f: F) -> Result<Table, E>
    where
        F: FnMut(&K, &[RowDict]) -> Result<Vec<Fields>, E>,
        E: From<TableError>,
    {
        let dicts = self.collect_outputs(f)?;
        let mut seen = BTreeSet::new();
        let mut header = Vec::new();
        for dict in &dicts {
            for key in dict.keys() {
                if seen.insert(key.as_str()) {
                    header.push(key.clone());
                }
            }
        }
        Ok(Table::from_dicts(header, &dicts)?)
    }

    /// Like [`Groups::group_map`], but lays the output out against a fixed
    /// header and rejects keys outside it.
    pub fn group_map_into<F, E>(&self, header: &[String], f: F) -> Result<Table, E>
    where
        F: FnMut(&K, &[RowDict]) -> Result<Vec<Fields>, E>,
        E: From<TableError>,
    {
        let dicts = self.collect_outputs(f)?;
        Ok(Table::from_dicts(header.to_vec(), &dicts)?)
    }

    fn collect_outputs<F, E>(&self, mut f: F) -> Result<Vec<Fields>, E>
    where
        F: FnMut(&K, &[RowDict]) -> Result<Vec<Fields>, E>,
    {
        let mut dicts = Vec::new();
        for (key, rows) in &self.groups {
            dicts.extend(f(key, rows)?);
        }
        Ok(dicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn rejects_duplicate_header() {
        let err = Table::new(strings(&["a", "a"]), vec![]).unwrap_err();
        assert_eq!(
            err,
            TableError::DuplicateColumn {
                column: "a".to_string()
            }
        );
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Table::new(strings(&["a", "b"]), vec![strings(&["1"])]).unwrap_err();
        assert!(matches!(
            err,
            TableError::RaggedRow {
                row: 0,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn row_dict_zips_header() {
        let table = Table::new(strings(&["a", "b"]), vec![strings(&["1", "2"])]).unwrap();
        let dict = table.row_dict(0).unwrap();
        assert_eq!(dict.get("a").map(String::as_str), Some("1"));
        assert_eq!(dict.get("b").map(String::as_str), Some("2"));
        assert!(table.row_dict(1).is_none());
    }
}

//! Data model shared by the part label crates.

#![deny(unsafe_code)]

use std::collections::BTreeMap;

pub mod attributes;
pub mod error;
pub mod lookup;
pub mod table;

pub use attributes::Attributes;
pub use error::{AttributesError, TableError};
pub use lookup::CaseInsensitiveSet;
pub use table::{Groups, Table};

/// One row keyed by column name, rebuilt for every transform callback.
pub type RowDict = BTreeMap<String, String>;

/// Column values produced for a row by a transform.
pub type Fields = BTreeMap<String, String>;

/// Read a cell, treating an absent column as empty.
pub fn cell<'a>(row: &'a RowDict, column: &str) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("")
}

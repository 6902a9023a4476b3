use thiserror::Error;

/// Violations of the table shape invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("duplicate column in header: {column}")]
    DuplicateColumn { column: String },

    #[error("row {row} has {actual} cells but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("column {column} already exists in the table")]
    ColumnCollision { column: String },

    #[error("row {row} produced column {column} which was not declared")]
    UndeclaredField { column: String, row: usize },
}

/// Failure to read an attributes cell back into a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributesError {
    #[error("malformed attributes cell at offset {offset}: {message}")]
    Malformed { offset: usize, message: String },
}

impl AttributesError {
    pub(crate) fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            offset,
            message: message.into(),
        }
    }
}

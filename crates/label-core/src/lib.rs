//! Annotator pipeline for part label tables.
//!
//! Annotators append declared columns to every row, a regroup step such as
//! [`ResistorGridCombiner`] folds rows into new ones, and a [`Pipeline`]
//! runs them in order after checking that no two steps write the same
//! column.

pub mod annotators;
pub mod combine;
pub mod coverage;
pub mod pipeline;

pub use annotators::{
    ATTRIBUTES_COLUMN, BackgroundAnnotator, DEFAULT_RESISTOR_FAMILY, DescriptionAnnotator,
    LabelAnnotator, ParametricField, PriorityMerge, ResistorColorAnnotator, StaticField,
    ValueColorAnnotator, resistance_text, row_attributes,
};
pub use combine::{CombineError, ResistorGridCombiner, SHARED_COLUMNS};
pub use coverage::{FamilyCoverage, family_coverage};
pub use pipeline::{Annotator, Pipeline, Regroup, RowFilter, SchemaError, Step};

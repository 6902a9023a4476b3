//! Step pipeline over part tables.
//!
//! A [`Pipeline`] is an ordered list of [`Step`]s. Each annotating step
//! declares its output columns up front, so the whole pipeline can be
//! checked against the input header before any row is processed.
//!
//! # Example
//!
//! ```ignore
//! use label_core::pipeline::{Pipeline, Step};
//! use label_core::annotators::{PriorityMerge, StaticField};
//!
//! let pipeline = Pipeline::new()
//!     .annotate(PriorityMerge::new(["type"], "title"))
//!     .annotate(StaticField::new("pcost", ""));
//! let table = pipeline.run(table)?;
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use anyhow::{Context, Result};
use label_model::{Fields, RowDict, Table};
use thiserror::Error;
use tracing::{debug, info_span};

/// Adds declared columns to every row.
///
/// `annotate` may return any subset of [`Annotator::out_names`]; omitted
/// columns are written as empty cells.
pub trait Annotator {
    /// Human-readable name for logs and error context.
    fn name(&self) -> &str;

    /// Columns this annotator appends, in header order.
    fn out_names(&self) -> &[String];

    /// Columns that must exist before this step runs.
    fn required_columns(&self) -> &[String] {
        &[]
    }

    fn annotate(&self, row: &RowDict) -> Result<Fields>;
}

/// Replaces the table with rows computed per group.
pub trait Regroup {
    fn name(&self) -> &str;

    /// Header of the regrouped table. This replaces every earlier column.
    fn out_names(&self) -> &[String];

    /// Columns each input row must carry.
    fn required_columns(&self) -> &[String] {
        &[]
    }

    fn key(&self, row: &RowDict) -> String;

    fn combine(&self, key: &str, rows: &[RowDict]) -> Result<Vec<Fields>>;
}

type Predicate = Box<dyn Fn(&RowDict) -> bool>;

/// Drops rows for which the predicate is false.
pub struct RowFilter {
    name: String,
    predicate: Predicate,
}

impl RowFilter {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&RowDict) -> bool + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }
}

pub enum Step {
    Annotate(Box<dyn Annotator>),
    Filter(RowFilter),
    Regroup(Box<dyn Regroup>),
}

impl Step {
    pub fn name(&self) -> &str {
        match self {
            Self::Annotate(annotator) => annotator.name(),
            Self::Filter(filter) => &filter.name,
            Self::Regroup(regroup) => regroup.name(),
        }
    }

    /// Columns the step introduces.
    pub fn out_names(&self) -> &[String] {
        match self {
            Self::Annotate(annotator) => annotator.out_names(),
            Self::Filter(_) => &[],
            Self::Regroup(regroup) => regroup.out_names(),
        }
    }

    /// Columns the step reads and cannot do without.
    pub fn required_columns(&self) -> &[String] {
        match self {
            Self::Annotate(annotator) => annotator.required_columns(),
            Self::Filter(_) => &[],
            Self::Regroup(regroup) => regroup.required_columns(),
        }
    }
}

/// Declared columns that would collide or are missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("step {step:?} reads column {column:?}, which is not in the table at that point")]
    MissingInput { step: String, column: String },

    #[error("step {step:?} declares column {column:?} more than once")]
    DuplicateDeclaration { step: String, column: String },

    #[error("step {step:?} adds column {column:?}, which is already in the input")]
    InputCollision { step: String, column: String },

    #[error("step {step:?} adds column {column:?}, which step {owner:?} already adds")]
    StepCollision {
        step: String,
        column: String,
        owner: String,
    },
}

/// Where a known column came from during validation.
enum Origin<'a> {
    Input,
    Step(&'a str),
}

#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn annotate(self, annotator: impl Annotator + 'static) -> Self {
        self.add_step(Step::Annotate(Box::new(annotator)))
    }

    pub fn filter(self, filter: RowFilter) -> Self {
        self.add_step(Step::Filter(filter))
    }

    pub fn regroup(self, regroup: impl Regroup + 'static) -> Self {
        self.add_step(Step::Regroup(Box::new(regroup)))
    }

    /// List step names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(Step::name).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check that every column a step reads exists when it runs and that no
    /// step adds a column that already exists at that point, either in
    /// `header` or from an earlier step. A regroup starts a fresh set of
    /// known columns.
    pub fn validate(&self, header: &[String]) -> Result<(), SchemaError> {
        let mut known: BTreeMap<&str, Origin<'_>> = header
            .iter()
            .map(|column| (column.as_str(), Origin::Input))
            .collect();

        for step in &self.steps {
            let name = step.name();
            if let Some(column) = step
                .required_columns()
                .iter()
                .find(|column| !known.contains_key(column.as_str()))
            {
                return Err(SchemaError::MissingInput {
                    step: name.to_string(),
                    column: column.clone(),
                });
            }

            let mut declared = BTreeSet::new();
            for column in step.out_names() {
                if !declared.insert(column.as_str()) {
                    return Err(SchemaError::DuplicateDeclaration {
                        step: name.to_string(),
                        column: column.clone(),
                    });
                }
            }

            if let Step::Regroup(_) = step {
                known = declared
                    .into_iter()
                    .map(|column| (column, Origin::Step(name)))
                    .collect();
                continue;
            }

            for column in declared {
                match known.get(column) {
                    Some(Origin::Input) => {
                        return Err(SchemaError::InputCollision {
                            step: name.to_string(),
                            column: column.to_string(),
                        });
                    }
                    Some(Origin::Step(owner)) => {
                        return Err(SchemaError::StepCollision {
                            step: name.to_string(),
                            column: column.to_string(),
                            owner: owner.to_string(),
                        });
                    }
                    None => {
                        known.insert(column, Origin::Step(name));
                    }
                }
            }
        }
        Ok(())
    }

    /// Validate against the table's header, then thread the table through
    /// every step in order.
    pub fn run(&self, table: Table) -> Result<Table> {
        self.validate(table.header())
            .context("pipeline does not fit the input columns")?;

        let mut table = table;
        for step in &self.steps {
            let span = info_span!("step", step = step.name());
            let _guard = span.enter();
            let start = Instant::now();
            let rows_in = table.len();

            table = match step {
                Step::Annotate(annotator) => apply_annotator(&table, annotator.as_ref())?,
                Step::Filter(filter) => table.filter(|row| (filter.predicate)(row)),
                Step::Regroup(regroup) => apply_regroup(&table, regroup.as_ref())?,
            };

            debug!(
                rows_in,
                rows_out = table.len(),
                columns = table.header().len(),
                duration_ms = start.elapsed().as_millis(),
                "step complete"
            );
        }
        Ok(table)
    }
}

fn apply_annotator(table: &Table, annotator: &dyn Annotator) -> Result<Table> {
    let mut row = 0usize;
    table
        .append_columns(annotator.out_names(), |dict| {
            row += 1;
            annotator
                .annotate(dict)
                .with_context(|| format!("{} failed on row {row}", annotator.name()))
        })
        .with_context(|| format!("step {} failed", annotator.name()))
}

fn apply_regroup(table: &Table, regroup: &dyn Regroup) -> Result<Table> {
    let groups = table.group_by(|row| regroup.key(row));
    debug!(groups = groups.len(), "grouped rows");
    groups
        .group_map_into(regroup.out_names(), |key: &String, rows| {
            regroup
                .combine(key, rows)
                .with_context(|| format!("{} failed on group {key:?}", regroup.name()))
        })
        .with_context(|| format!("step {} failed", regroup.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        name: String,
        columns: Vec<String>,
    }

    impl Fixed {
        fn new(name: &str, columns: &[&str]) -> Self {
            Self {
                name: name.to_string(),
                columns: columns.iter().map(|c| c.to_string()).collect(),
            }
        }
    }

    impl Annotator for Fixed {
        fn name(&self) -> &str {
            &self.name
        }

        fn out_names(&self) -> &[String] {
            &self.columns
        }

        fn annotate(&self, _row: &RowDict) -> Result<Fields> {
            Ok(Fields::new())
        }
    }

    struct Reads(Vec<String>);

    impl Annotator for Reads {
        fn name(&self) -> &str {
            "reads"
        }

        fn out_names(&self) -> &[String] {
            &[]
        }

        fn required_columns(&self) -> &[String] {
            &self.0
        }

        fn annotate(&self, _row: &RowDict) -> Result<Fields> {
            Ok(Fields::new())
        }
    }

    fn header(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn disjoint_steps_validate() {
        let pipeline = Pipeline::new()
            .annotate(Fixed::new("a", &["x", "y"]))
            .annotate(Fixed::new("b", &["z"]));
        assert!(pipeline.validate(&header(&["id"])).is_ok());
        assert_eq!(pipeline.step_names(), vec!["a", "b"]);
    }

    #[test]
    fn required_columns_may_come_from_earlier_steps() {
        let pipeline = Pipeline::new()
            .annotate(Fixed::new("a", &["x"]))
            .annotate(Reads(vec!["x".to_string(), "id".to_string()]));
        assert!(pipeline.validate(&header(&["id"])).is_ok());

        let pipeline = Pipeline::new().annotate(Reads(vec!["x".to_string()]));
        assert_eq!(
            pipeline.validate(&header(&["id"])),
            Err(SchemaError::MissingInput {
                step: "reads".to_string(),
                column: "x".to_string(),
            })
        );
    }

    #[test]
    fn collision_with_input_is_reported() {
        let pipeline = Pipeline::new().annotate(Fixed::new("a", &["id"]));
        assert_eq!(
            pipeline.validate(&header(&["id"])),
            Err(SchemaError::InputCollision {
                step: "a".to_string(),
                column: "id".to_string(),
            })
        );
    }

    #[test]
    fn collision_between_steps_names_both() {
        let pipeline = Pipeline::new()
            .annotate(Fixed::new("a", &["x"]))
            .annotate(Fixed::new("b", &["x"]));
        assert_eq!(
            pipeline.validate(&header(&["id"])),
            Err(SchemaError::StepCollision {
                step: "b".to_string(),
                column: "x".to_string(),
                owner: "a".to_string(),
            })
        );
    }

    #[test]
    fn duplicate_declaration_is_reported() {
        let pipeline = Pipeline::new().annotate(Fixed::new("a", &["x", "x"]));
        assert!(matches!(
            pipeline.validate(&[]),
            Err(SchemaError::DuplicateDeclaration { .. })
        ));
    }

    #[test]
    fn filter_steps_add_no_columns() {
        let pipeline = Pipeline::new()
            .filter(RowFilter::new("non-empty", |row| !row.is_empty()))
            .annotate(Fixed::new("a", &["x"]));
        assert!(pipeline.validate(&header(&["id"])).is_ok());
        assert_eq!(pipeline.steps[0].out_names(), &[] as &[String]);
    }

    #[test]
    fn filter_may_hold_local_state() {
        use std::cell::Cell;
        use std::rc::Rc;

        let seen = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&seen);
        let pipeline = Pipeline::new().filter(RowFilter::new("count", move |_row| {
            counter.set(counter.get() + 1);
            true
        }));
        let table = Table::new(
            header(&["id"]),
            vec![vec!["1".to_string()], vec!["2".to_string()]],
        )
        .unwrap();

        let output = pipeline.run(table).unwrap();
        assert_eq!(output.len(), 2);
        assert_eq!(seen.get(), 2);
    }
}

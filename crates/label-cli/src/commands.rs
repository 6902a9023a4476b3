use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table as DisplayTable;
use tracing::{info, info_span, warn};

use label_core::{
    BackgroundAnnotator, DescriptionAnnotator, LabelAnnotator, ParametricField, Pipeline,
    PriorityMerge, ResistorColorAnnotator, ResistorGridCombiner, StaticField, ValueColorAnnotator,
    family_coverage, resistance_text,
};
use label_ingest::{read_table, write_table};
use label_model::Table;
use label_resistor::{ResistorColor, decode};
use label_rules::{RuleEngine, RuleSource, RuleTable};

use crate::cli::{CheckArgs, DecodeArgs, FieldsArgs, IoArgs, LabelArgs, SlotsArgs};
use crate::summary::{apply_table_style, header_cell};
use crate::types::{CoverageReport, RunSummary};

/// Raw attribute columns written by `fields`: (column, supplier attribute).
const FIELD_COLUMNS: [(&str, &str); 6] = [
    ("title", "Manufacturer Part Number"),
    ("package", "Package / Case"),
    ("quickdesc", "Tolerance"),
    ("mfrpn", "Manufacturer Part Number"),
    ("desc", "Description"),
    ("code", "Digi-Key Part Number"),
];

fn load_rules(rules: Option<&Path>) -> Result<(RuleEngine, RuleSource)> {
    let (table, source) = RuleTable::resolve(rules).context("load rule table")?;
    info!(rules = %source, families = table.len(), "loaded rule table");
    Ok((RuleEngine::new(table), source))
}

fn load_input(path: &Path) -> Result<Table> {
    let table = read_table(path)?;
    info!(
        input = %path.display(),
        rows = table.len(),
        columns = table.header().len(),
        "loaded input"
    );
    Ok(table)
}

fn run_pipeline(
    command: &'static str,
    pipeline: &Pipeline,
    table: Table,
    io: &IoArgs,
    rules: Option<&RuleSource>,
    start: Instant,
) -> Result<RunSummary> {
    let span = info_span!("command", command);
    let _guard = span.enter();

    let input_header = table.header().to_vec();
    let rows_in = table.len();
    let output = pipeline.run(table)?;
    write_table(&io.output, &output)?;

    let columns_added = output
        .header()
        .iter()
        .filter(|column| !input_header.contains(column))
        .cloned()
        .collect();
    info!(
        rows_in,
        rows_out = output.len(),
        output = %io.output.display(),
        "wrote output"
    );
    Ok(RunSummary {
        command,
        input: io.input.clone(),
        output: io.output.clone(),
        rules: rules.map(ToString::to_string),
        steps: pipeline.step_names().into_iter().map(String::from).collect(),
        rows_in,
        rows_out: output.len(),
        columns_added,
        duration: start.elapsed(),
    })
}

/// Background, description, rendered label text, manual overrides and
/// resistor colors.
pub fn run_label(args: &LabelArgs, rules: Option<&Path>) -> Result<RunSummary> {
    let start = Instant::now();
    let (engine, source) = load_rules(rules)?;
    let family_keys = engine.table().family_keys().to_vec();
    let attributes = args.attributes_column.as_str();

    let pipeline = Pipeline::new()
        .annotate(BackgroundAnnotator::new(attributes))
        .annotate(DescriptionAnnotator::new(attributes))
        .annotate(LabelAnnotator::new(engine, attributes))
        .annotate(PriorityMerge::new(["title", LabelAnnotator::TITLE], "label_title"))
        .annotate(PriorityMerge::new(
            ["package", LabelAnnotator::PACKAGE],
            "label_package",
        ))
        .annotate(PriorityMerge::new(
            ["quickdesc", LabelAnnotator::DESCRIPTION],
            "label_desc",
        ))
        .annotate(ResistorColorAnnotator::new(
            &args.resistor_families,
            &family_keys,
            attributes,
        ));

    let table = load_input(&args.io.input)?;
    run_pipeline("label", &pipeline, table, &args.io, Some(&source), start)
}

pub fn run_fields(args: &FieldsArgs) -> Result<RunSummary> {
    let start = Instant::now();
    let pipeline = FIELD_COLUMNS
        .iter()
        .fold(Pipeline::new(), |pipeline, (column, attribute)| {
            pipeline.annotate(
                ParametricField::new(*column, *attribute)
                    .with_attributes_column(args.attributes_column.as_str()),
            )
        });
    let table = load_input(&args.io.input)?;
    run_pipeline("fields", &pipeline, table, &args.io, None, start)
}

/// Drawer labels: title and quick description from the inventory columns,
/// then colors for every value slot.
pub fn run_slots(args: &SlotsArgs) -> Result<RunSummary> {
    let start = Instant::now();
    let pipeline = Pipeline::new()
        .annotate(PriorityMerge::new(["type"], "title"))
        .annotate(PriorityMerge::new(["desc"], "quickdesc"))
        .annotate(StaticField::new("pcost", ""))
        .annotate(StaticField::new("bg_color", ResistorColor::White.hex()))
        .annotate(ValueColorAnnotator::slots(args.slots));
    let table = load_input(&args.io.input)?;
    run_pipeline("slots", &pipeline, table, &args.io, None, start)
}

pub fn run_combine(args: &IoArgs) -> Result<RunSummary> {
    let start = Instant::now();
    let table = load_input(&args.input)?;
    let mut pipeline = Pipeline::new();
    if !table.has_column("res_color1") {
        info!("input has no band colors, deriving them from val");
        pipeline = pipeline.annotate(ValueColorAnnotator::single("val"));
    }
    let pipeline = pipeline.regroup(ResistorGridCombiner::new());
    run_pipeline("combine", &pipeline, table, args, None, start)
}

pub fn run_check(args: &CheckArgs, rules: Option<&Path>) -> Result<CoverageReport> {
    let (engine, source) = load_rules(rules)?;
    let table = load_input(&args.input)?;
    let families = family_coverage(&table, &args.attributes_column, &engine)
        .with_context(|| format!("check {}", args.input.display()))?;
    for entry in families.iter().filter(|entry| !entry.covered) {
        warn!(
            family = entry.family.as_deref().unwrap_or("<none>"),
            rows = entry.rows,
            "family not covered by rule table"
        );
    }
    Ok(CoverageReport {
        input: args.input.clone(),
        rules: source.to_string(),
        families,
    })
}

pub fn run_families(rules: Option<&Path>) -> Result<()> {
    let (engine, source) = load_rules(rules)?;
    println!("Rules: {source}");
    let mut table = DisplayTable::new();
    table.set_header(vec![
        header_cell("Family"),
        header_cell("Title"),
        header_cell("Description"),
        header_cell("Preprocess"),
    ]);
    apply_table_style(&mut table);
    for family in engine.table().families() {
        let steps = family
            .preprocessors
            .iter()
            .map(|step| format!("{} ({})", step.attribute, step.transform.kind()))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            family.name.clone(),
            family.title.to_string(),
            family.description.to_string(),
            steps,
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_decode(args: &DecodeArgs) -> Result<()> {
    let tolerance = match args.tolerance.as_deref() {
        Some(text) => Some(
            ResistorColor::from_tolerance(text)
                .with_context(|| format!("no tolerance band for {text:?}"))?,
        ),
        None => None,
    };
    let code = decode(&resistance_text(&args.value))?.with_tolerance(tolerance);

    let mut table = DisplayTable::new();
    table.set_header(vec![
        header_cell("Band"),
        header_cell("Color"),
        header_cell("Hex"),
    ]);
    apply_table_style(&mut table);
    let labels = ["1st digit", "2nd digit", "Multiplier"];
    for (label, color) in labels.into_iter().zip(code.bands()) {
        table.add_row(vec![label.to_string(), color.to_string(), color.hex().to_string()]);
    }
    if let Some(color) = code.tolerance() {
        table.add_row(vec!["Tolerance".to_string(), color.to_string(), color.hex().to_string()]);
    }
    println!("{table}");
    Ok(())
}

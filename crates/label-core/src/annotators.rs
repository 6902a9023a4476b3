//! Annotators used by the label commands.

use std::collections::BTreeSet;

use anyhow::{Context, Result, anyhow};
use label_model::{Attributes, CaseInsensitiveSet, Fields, RowDict, cell};
use label_resistor::{BandCode, ResistorColor, decode};
use label_rules::{RuleEngine, normalize_value};

use crate::pipeline::Annotator;

/// Column holding the serialized supplier attributes.
pub const ATTRIBUTES_COLUMN: &str = "parametrics";

/// Family that gets resistor color bands unless configured otherwise.
pub const DEFAULT_RESISTOR_FAMILY: &str = "Through Hole Resistors";

const RESISTANCE_ATTRIBUTES: [&str; 2] = ["Resistance", "Resistance (Ohms)"];
const TOLERANCE_ATTRIBUTE: &str = "Tolerance";
const DESCRIPTION_ATTRIBUTE: &str = "Description";
const MOUNTING_ATTRIBUTE: &str = "Mounting Type";

const BG_PRICED: &str = "#FFC0C0";
const BG_THROUGH_HOLE: &str = "#C0FFC0";
const BG_DEFAULT: &str = "#FFFFFF";

fn columns<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// Parse the attributes cell of `row`. A missing column reads as empty.
pub fn row_attributes(row: &RowDict, column: &str) -> Result<Attributes> {
    Attributes::parse_cell(cell(row, column))
        .with_context(|| format!("column {column} is not an attributes mapping"))
}

/// Copies the first non-empty candidate column into `out`.
///
/// When every candidate is empty or absent nothing is emitted, so the
/// output cell stays empty.
pub struct PriorityMerge {
    name: String,
    candidates: Vec<String>,
    out: Vec<String>,
}

impl PriorityMerge {
    pub fn new<I, S>(candidates: I, out: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let out = out.into();
        Self {
            name: format!("priority_merge({out})"),
            candidates: columns(candidates),
            out: vec![out],
        }
    }
}

impl Annotator for PriorityMerge {
    fn name(&self) -> &str {
        &self.name
    }

    fn out_names(&self) -> &[String] {
        &self.out
    }

    fn annotate(&self, row: &RowDict) -> Result<Fields> {
        let mut fields = Fields::new();
        if let Some(value) = self
            .candidates
            .iter()
            .map(|candidate| cell(row, candidate))
            .find(|value| !value.is_empty())
        {
            fields.insert(self.out[0].clone(), value.to_string());
        }
        Ok(fields)
    }
}

/// A column with the same value on every row.
pub struct StaticField {
    name: String,
    out: Vec<String>,
    value: String,
}

impl StaticField {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            name: format!("static({column})"),
            out: vec![column],
            value: value.into(),
        }
    }
}

impl Annotator for StaticField {
    fn name(&self) -> &str {
        &self.name
    }

    fn out_names(&self) -> &[String] {
        &self.out
    }

    fn annotate(&self, _row: &RowDict) -> Result<Fields> {
        Ok(Fields::from([(self.out[0].clone(), self.value.clone())]))
    }
}

/// Copies one raw supplier attribute into a column. Parts without the
/// attribute fail.
pub struct ParametricField {
    name: String,
    out: Vec<String>,
    attribute: String,
    attributes_column: String,
}

impl ParametricField {
    pub fn new(column: impl Into<String>, attribute: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            name: format!("parametric({column})"),
            out: vec![column],
            attribute: attribute.into(),
            attributes_column: ATTRIBUTES_COLUMN.to_string(),
        }
    }

    pub fn with_attributes_column(mut self, column: impl Into<String>) -> Self {
        self.attributes_column = column.into();
        self
    }
}

impl Annotator for ParametricField {
    fn name(&self) -> &str {
        &self.name
    }

    fn out_names(&self) -> &[String] {
        &self.out
    }

    fn annotate(&self, row: &RowDict) -> Result<Fields> {
        let attributes = row_attributes(row, &self.attributes_column)?;
        let value = attributes
            .get(&self.attribute)
            .ok_or_else(|| anyhow!("attribute {:?} is missing", self.attribute))?;
        Ok(Fields::from([(self.out[0].clone(), value.to_string())]))
    }
}

/// `desc` from the supplier description, when there is one.
pub struct DescriptionAnnotator {
    out: Vec<String>,
    attributes_column: String,
}

impl DescriptionAnnotator {
    pub fn new(attributes_column: impl Into<String>) -> Self {
        Self {
            out: columns(["desc"]),
            attributes_column: attributes_column.into(),
        }
    }
}

impl Annotator for DescriptionAnnotator {
    fn name(&self) -> &str {
        "description"
    }

    fn out_names(&self) -> &[String] {
        &self.out
    }

    fn annotate(&self, row: &RowDict) -> Result<Fields> {
        let attributes = row_attributes(row, &self.attributes_column)?;
        Ok(attributes
            .get(DESCRIPTION_ATTRIBUTE)
            .map(|desc| Fields::from([(self.out[0].clone(), desc.to_string())]))
            .unwrap_or_default())
    }
}

/// Label background: red-ish for priced parts, green-ish for through-hole
/// parts, white otherwise.
pub struct BackgroundAnnotator {
    out: Vec<String>,
    attributes_column: String,
}

impl BackgroundAnnotator {
    pub fn new(attributes_column: impl Into<String>) -> Self {
        Self {
            out: columns(["bg_color"]),
            attributes_column: attributes_column.into(),
        }
    }
}

impl Annotator for BackgroundAnnotator {
    fn name(&self) -> &str {
        "background"
    }

    fn out_names(&self) -> &[String] {
        &self.out
    }

    fn annotate(&self, row: &RowDict) -> Result<Fields> {
        let color = if !cell(row, "cost").is_empty() {
            BG_PRICED
        } else {
            let attributes = row_attributes(row, &self.attributes_column)?;
            match attributes.get(MOUNTING_ATTRIBUTE) {
                Some(mounting) if mounting.contains("Through Hole") => BG_THROUGH_HOLE,
                _ => BG_DEFAULT,
            }
        };
        Ok(Fields::from([(self.out[0].clone(), color.to_string())]))
    }
}

/// Rendered title, package and description from the rule table.
pub struct LabelAnnotator {
    engine: RuleEngine,
    out: Vec<String>,
    attributes_column: String,
}

impl LabelAnnotator {
    pub const TITLE: &'static str = "auto_title";
    pub const PACKAGE: &'static str = "auto_package";
    pub const DESCRIPTION: &'static str = "auto_desc";

    pub fn new(engine: RuleEngine, attributes_column: impl Into<String>) -> Self {
        Self {
            engine,
            out: columns([Self::TITLE, Self::PACKAGE, Self::DESCRIPTION]),
            attributes_column: attributes_column.into(),
        }
    }
}

impl Annotator for LabelAnnotator {
    fn name(&self) -> &str {
        "label"
    }

    fn out_names(&self) -> &[String] {
        &self.out
    }

    fn annotate(&self, row: &RowDict) -> Result<Fields> {
        let attributes = row_attributes(row, &self.attributes_column)?;
        let label = self.engine.render(&attributes)?;
        Ok(Fields::from([
            (Self::TITLE.to_string(), label.title),
            (Self::PACKAGE.to_string(), label.package),
            (Self::DESCRIPTION.to_string(), label.description),
        ]))
    }
}

/// Supplier resistance text in the form the decoder reads: annotations,
/// the `Ohms` unit and inner spaces removed (`4.7 kOhms` becomes `4.7k`).
pub fn resistance_text(value: &str) -> String {
    let value = normalize_value(value);
    let value = value
        .strip_suffix("Ohms")
        .or_else(|| value.strip_suffix("Ohm"))
        .unwrap_or(&value);
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

fn band_fields(code: &BandCode, suffix: &str) -> Fields {
    let [first, second, multiplier] = code.bands();
    Fields::from([
        (format!("res_color1{suffix}"), first.hex().to_string()),
        (format!("res_color2{suffix}"), second.hex().to_string()),
        (format!("res_color3{suffix}"), multiplier.hex().to_string()),
        (format!("res_stroke{suffix}"), code.stroke_hex().to_string()),
    ])
}

fn band_columns(suffix: &str) -> [String; 4] {
    [
        format!("res_color1{suffix}"),
        format!("res_color2{suffix}"),
        format!("res_color3{suffix}"),
        format!("res_stroke{suffix}"),
    ]
}

/// Color bands for parts in a resistor family. Other parts get empty
/// cells.
pub struct ResistorColorAnnotator {
    out: Vec<String>,
    families: BTreeSet<String>,
    family_keys: Vec<String>,
    attributes_column: String,
}

impl ResistorColorAnnotator {
    pub fn new<I, S>(families: I, family_keys: &[String], attributes_column: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = band_columns("").into();
        out.push("res_tolerance".to_string());
        Self {
            out,
            families: families.into_iter().map(Into::into).collect(),
            family_keys: family_keys.to_vec(),
            attributes_column: attributes_column.into(),
        }
    }
}

impl Annotator for ResistorColorAnnotator {
    fn name(&self) -> &str {
        "resistor_colors"
    }

    fn out_names(&self) -> &[String] {
        &self.out
    }

    fn annotate(&self, row: &RowDict) -> Result<Fields> {
        let attributes = row_attributes(row, &self.attributes_column)?;
        let keys = CaseInsensitiveSet::new(attributes.keys());
        let family = keys
            .first_of(self.family_keys.iter().map(String::as_str))
            .and_then(|key| attributes.get(key));
        if !family.is_some_and(|family| self.families.contains(&normalize_value(family))) {
            return Ok(Fields::new());
        }

        let resistance = keys
            .first_of(RESISTANCE_ATTRIBUTES)
            .and_then(|key| attributes.get(key))
            .ok_or_else(|| anyhow!("resistor has no resistance attribute"))?;
        let tolerance = attributes
            .get(TOLERANCE_ATTRIBUTE)
            .and_then(ResistorColor::from_tolerance);
        let code = decode(&resistance_text(resistance))?.with_tolerance(tolerance);
        if code.is_blank() {
            return Err(anyhow!("resistor has an empty resistance"));
        }

        let mut fields = band_fields(&code, "");
        if let Some(tolerance) = code.tolerance() {
            fields.insert("res_tolerance".to_string(), tolerance.hex().to_string());
        }
        Ok(fields)
    }
}

/// Color bands for resistance value columns.
///
/// Each `(value column, suffix)` pair emits `res_color1{suffix}` through
/// `res_color3{suffix}` and `res_stroke{suffix}`. An empty value gives a
/// blank slot.
pub struct ValueColorAnnotator {
    name: String,
    slots: Vec<(String, String)>,
    out: Vec<String>,
    required: Vec<String>,
}

impl ValueColorAnnotator {
    /// Drawer label slots `val_1..=val_{count}`, suffixed `_1..=_{count}`.
    pub fn slots(count: usize) -> Self {
        Self::from_slots(
            "slot_colors",
            (1..=count).map(|i| (format!("val_{i}"), format!("_{i}"))),
        )
    }

    /// A single value column with unsuffixed outputs.
    pub fn single(column: impl Into<String>) -> Self {
        Self::from_slots("value_colors", [(column.into(), String::new())])
    }

    fn from_slots(name: &str, slots: impl IntoIterator<Item = (String, String)>) -> Self {
        let slots: Vec<(String, String)> = slots.into_iter().collect();
        let out = slots
            .iter()
            .flat_map(|(_, suffix)| band_columns(suffix))
            .collect();
        let required = slots.iter().map(|(column, _)| column.clone()).collect();
        Self {
            name: name.to_string(),
            slots,
            out,
            required,
        }
    }
}

impl Annotator for ValueColorAnnotator {
    fn name(&self) -> &str {
        &self.name
    }

    fn out_names(&self) -> &[String] {
        &self.out
    }

    fn required_columns(&self) -> &[String] {
        &self.required
    }

    fn annotate(&self, row: &RowDict) -> Result<Fields> {
        let mut fields = Fields::new();
        for (column, suffix) in &self.slots {
            let value = cell(row, column);
            let code = decode(&resistance_text(value))
                .with_context(|| format!("column {column} holds {value:?}"))?;
            fields.extend(band_fields(&code, suffix));
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RowDict {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn priority_merge_takes_first_non_empty() {
        let merge = PriorityMerge::new(["a", "b"], "out");
        assert_eq!(
            merge.annotate(&row(&[("a", ""), ("b", "X")])).unwrap(),
            Fields::from([("out".to_string(), "X".to_string())])
        );
        assert_eq!(
            merge.annotate(&row(&[("a", "Y"), ("b", "X")])).unwrap(),
            Fields::from([("out".to_string(), "Y".to_string())])
        );
        assert!(merge.annotate(&row(&[("a", ""), ("b", "")])).unwrap().is_empty());
        assert!(merge.annotate(&row(&[])).unwrap().is_empty());
    }

    #[test]
    fn background_prefers_cost_then_mounting() {
        let annotator = BackgroundAnnotator::new(ATTRIBUTES_COLUMN);
        let through_hole = r#"{"Mounting Type": "Through Hole"}"#;
        let bg = |pairs: &[(&str, &str)]| annotator.annotate(&row(pairs)).unwrap()["bg_color"].clone();
        assert_eq!(bg(&[("cost", "0.10"), ("parametrics", through_hole)]), BG_PRICED);
        assert_eq!(bg(&[("cost", ""), ("parametrics", through_hole)]), BG_THROUGH_HOLE);
        assert_eq!(bg(&[("parametrics", "{'Mounting Type': 'Surface Mount'}")]), BG_DEFAULT);
    }

    #[test]
    fn description_is_omitted_when_absent() {
        let annotator = DescriptionAnnotator::new(ATTRIBUTES_COLUMN);
        let fields = annotator
            .annotate(&row(&[("parametrics", r#"{"Description": "RES 4.7K OHM"}"#)]))
            .unwrap();
        assert_eq!(fields["desc"], "RES 4.7K OHM");
        assert!(annotator.annotate(&row(&[("parametrics", "{}")])).unwrap().is_empty());
    }

    #[test]
    fn parametric_field_requires_attribute() {
        let annotator = ParametricField::new("mfrpn", "Manufacturer Part Number");
        let err = annotator
            .annotate(&row(&[("parametrics", "{'Family': 'Crystals'}")]))
            .unwrap_err();
        assert!(err.to_string().contains("Manufacturer Part Number"));
    }

    #[test]
    fn resistance_text_strips_units() {
        assert_eq!(resistance_text("4.7 kOhms"), "4.7k");
        assert_eq!(resistance_text("100 Ohms"), "100");
        assert_eq!(resistance_text("330Ω"), "330Ω");
        assert_eq!(resistance_text(""), "");
    }

    #[test]
    fn resistor_colors_only_for_resistor_families() {
        let keys = vec!["Family".to_string()];
        let annotator =
            ResistorColorAnnotator::new([DEFAULT_RESISTOR_FAMILY], &keys, ATTRIBUTES_COLUMN);
        let resistor = row(&[(
            "parametrics",
            r#"{"Family": "Through Hole Resistors", "Resistance": "4.7 kOhms", "Tolerance": "±5%"}"#,
        )]);
        let fields = annotator.annotate(&resistor).unwrap();
        assert_eq!(fields["res_color1"], ResistorColor::Yellow.hex());
        assert_eq!(fields["res_color2"], ResistorColor::Violet.hex());
        assert_eq!(fields["res_color3"], ResistorColor::Red.hex());
        assert_eq!(fields["res_stroke"], "#000000");
        assert_eq!(fields["res_tolerance"], ResistorColor::Gold.hex());

        let capacitor = row(&[("parametrics", r#"{"Family": "Ceramic Capacitors"}"#)]);
        assert!(annotator.annotate(&capacitor).unwrap().is_empty());
    }

    #[test]
    fn resistor_family_label_is_normalized() {
        let keys = vec!["Family".to_string()];
        let annotator =
            ResistorColorAnnotator::new([DEFAULT_RESISTOR_FAMILY], &keys, ATTRIBUTES_COLUMN);
        let part = row(&[(
            "parametrics",
            "{'Family': 'Through Hole Resistors (Axial)', 'Resistance': '100 Ohms'}",
        )]);
        let fields = annotator.annotate(&part).unwrap();
        assert_eq!(fields["res_color1"], ResistorColor::Brown.hex());
        assert_eq!(fields["res_color3"], ResistorColor::Brown.hex());
    }

    #[test]
    fn resistor_without_resistance_fails() {
        let keys = vec!["Categories".to_string()];
        let annotator =
            ResistorColorAnnotator::new([DEFAULT_RESISTOR_FAMILY], &keys, ATTRIBUTES_COLUMN);
        let part = row(&[("parametrics", "{'Categories': 'Through Hole Resistors'}")]);
        assert!(annotator.annotate(&part).is_err());
    }

    #[test]
    fn slot_colors_cover_every_slot() {
        let annotator = ValueColorAnnotator::slots(3);
        assert_eq!(annotator.out_names().len(), 12);
        let fields = annotator
            .annotate(&row(&[("val_1", "1kΩ"), ("val_2", ""), ("val_3", "47Ω")]))
            .unwrap();
        assert_eq!(fields["res_color3_1"], ResistorColor::Red.hex());
        assert_eq!(fields["res_stroke_1"], "#000000");
        assert_eq!(fields["res_color1_2"], "#FFFFFF");
        assert_eq!(fields["res_stroke_2"], "#FFFFFF");
        assert_eq!(fields["res_color1_3"], ResistorColor::Yellow.hex());
    }
}

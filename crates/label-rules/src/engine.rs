use std::sync::LazyLock;

use label_model::{Attributes, CaseInsensitiveSet};
use regex::Regex;
use tracing::debug;

use crate::error::RuleError;
use crate::table::RuleTable;
use crate::template::Template;

/// Supplier annotations such as ` (2012 Metric)` or ` (Max)`.
static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\([^()]*\)").expect("valid annotation regex"));

/// Marker the supplier uses for "not specified".
const UNSPECIFIED: &str = "-";
const UNSPECIFIED_LABEL: &str = "?";

/// Strip parenthesized annotations and make the unspecified marker visible.
pub fn normalize_value(value: &str) -> String {
    let stripped = ANNOTATION.replace_all(value, "");
    let stripped = stripped.trim();
    if stripped == UNSPECIFIED {
        UNSPECIFIED_LABEL.to_string()
    } else {
        stripped.to_string()
    }
}

/// Normalized copy of every attribute value. The input is left untouched
/// so the raw values stay available for diagnostics.
pub fn normalize_attributes(attributes: &Attributes) -> Attributes {
    attributes
        .iter()
        .map(|(name, value)| (name.clone(), normalize_value(value)))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedLabel {
    pub title: String,
    pub package: String,
    pub description: String,
}

/// Renders label text for parts by dispatching on their family label.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    table: RuleTable,
}

impl RuleEngine {
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Family label of a part, from the first configured family key present
    /// (keys match case-insensitively).
    pub fn family_label<'a>(&self, attributes: &'a Attributes) -> Option<&'a str> {
        let keys = CaseInsensitiveSet::new(attributes.keys());
        let key = keys.first_of(self.table.family_keys().iter().map(String::as_str))?;
        attributes.get(key)
    }

    /// Family label as [`render`](Self::render) dispatches on it, with
    /// annotations stripped.
    pub fn normalized_family_label(&self, attributes: &Attributes) -> Option<String> {
        self.family_label(attributes).map(normalize_value)
    }

    /// Single package designator, or `None` if the part has no package
    /// attribute.
    pub fn disambiguate_package(&self, attributes: &Attributes) -> Result<Option<String>, RuleError> {
        let rule = self.table.package();
        let Some(value) = attributes.get(&rule.attribute) else {
            return Ok(None);
        };
        rule.transform
            .apply(value)
            .map(Some)
            .map_err(|source| RuleError::Package {
                attribute: rule.attribute.clone(),
                source,
            })
    }

    pub fn render(&self, attributes: &Attributes) -> Result<RenderedLabel, RuleError> {
        let mut values = normalize_attributes(attributes);

        let package = match self.disambiguate_package(&values)? {
            Some(package) => {
                values.insert(self.table.package().attribute.clone(), package.clone());
                package
            }
            None => String::new(),
        };

        let label = self
            .family_label(&values)
            .ok_or_else(|| RuleError::MissingFamilyLabel {
                keys: self.table.family_keys().to_vec(),
            })?
            .to_string();
        let rule = self
            .table
            .family(&label)
            .ok_or_else(|| RuleError::UnknownFamily {
                family: label.clone(),
            })?;

        for step in &rule.preprocessors {
            let input = values
                .get(&step.attribute)
                .ok_or_else(|| RuleError::MissingAttribute {
                    family: rule.name.clone(),
                    attribute: step.attribute.clone(),
                })?;
            let output = step
                .transform
                .apply(input)
                .map_err(|source| RuleError::Preprocess {
                    family: rule.name.clone(),
                    attribute: step.attribute.clone(),
                    source,
                })?;
            values.insert(step.attribute.clone(), output);
        }

        let title = fill(&rule.title, &values, &rule.name, "title")?;
        let description = fill(&rule.description, &values, &rule.name, "description")?;
        debug!(family = %rule.name, %title, %package, "rendered label");

        Ok(RenderedLabel {
            title,
            package,
            description,
        })
    }
}

fn fill(
    template: &Template,
    values: &Attributes,
    family: &str,
    which: &'static str,
) -> Result<String, RuleError> {
    template
        .render(|name| values.get(name))
        .map_err(|missing| RuleError::UnresolvedPlaceholder {
            family: family.to_string(),
            template: which,
            attribute: missing.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_annotations() {
        assert_eq!(normalize_value("0805 (2012 Metric)"), "0805");
        assert_eq!(normalize_value("10µF (Max) "), "10µF");
        assert_eq!(normalize_value("SOT-23 (TO-236), SOT-23-5"), "SOT-23, SOT-23-5");
        assert_eq!(normalize_value("16V"), "16V");
    }

    #[test]
    fn unspecified_marker_becomes_question_mark() {
        assert_eq!(normalize_value("-"), "?");
        assert_eq!(normalize_value(" - "), "?");
        assert_eq!(normalize_value("-5V"), "-5V");
    }

    #[test]
    fn normalization_leaves_input_untouched() {
        let raw: Attributes = [("Package / Case".to_string(), "0603 (1608 Metric)".to_string())]
            .into_iter()
            .collect();
        let normalized = normalize_attributes(&raw);
        assert_eq!(normalized.get("Package / Case"), Some("0603"));
        assert_eq!(raw.get("Package / Case"), Some("0603 (1608 Metric)"));
    }
}

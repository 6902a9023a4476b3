//! Family rule table loading.
//!
//! The table is a TOML document:
//!
//! ```toml
//! [rules]
//! schema = "partlabel.rules"
//! schema_version = 1
//! family_keys = ["Family", "Categories"]
//!
//! [package]
//! attribute = "Package / Case"
//! [package.transform]
//! kind = "ranked_select"
//! rules = [{ pattern = 'SOT-\d+', output = "$0" }]
//!
//! [[family]]
//! name = "Ceramic Capacitors"
//! title = "Capacitor, Ceramic, {Capacitance}"
//! description = "{Voltage - Rated} {Temperature Coefficient} {Tolerance}"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RuleError;
use crate::preprocess::Transform;
use crate::template::Template;

/// Environment variable naming a rule table that replaces the bundled one.
pub const RULES_ENV_VAR: &str = "PARTLABEL_RULES";

const SCHEMA: &str = "partlabel.rules";
const SCHEMA_VERSION: u32 = 1;
const BUNDLED: &str = include_str!("../rules/default.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    pub attribute: String,
    pub transform: Transform,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyRule {
    pub name: String,
    /// Applied in order; later steps see earlier results.
    #[serde(rename = "preprocess", default)]
    pub preprocessors: Vec<Preprocessor>,
    pub title: Template,
    pub description: Template,
}

/// Reduces a multi-valued package attribute to one designator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRule {
    pub attribute: String,
    pub transform: Transform,
}

#[derive(Debug, Deserialize)]
struct RulesHeader {
    schema: String,
    schema_version: u32,
    #[serde(default = "default_family_keys")]
    family_keys: Vec<String>,
}

fn default_family_keys() -> Vec<String> {
    vec!["Family".to_string(), "Categories".to_string()]
}

#[derive(Debug, Deserialize)]
struct RuleDocument {
    rules: RulesHeader,
    package: PackageRule,
    #[serde(rename = "family", default)]
    families: Vec<FamilyRule>,
}

/// Where a loaded table came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    Path(PathBuf),
    Env(PathBuf),
    Bundled,
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Env(path) => write!(f, "{} (from {RULES_ENV_VAR})", path.display()),
            Self::Bundled => f.write_str("bundled default"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleTable {
    family_keys: Vec<String>,
    package: PackageRule,
    families: BTreeMap<String, FamilyRule>,
}

impl RuleTable {
    pub fn from_toml_str(source: &str, origin: &str) -> Result<Self, RuleError> {
        let document: RuleDocument = toml::from_str(source).map_err(|source| RuleError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        let RuleDocument {
            rules,
            package,
            families,
        } = document;
        if rules.schema != SCHEMA || rules.schema_version != SCHEMA_VERSION {
            return Err(RuleError::UnsupportedSchema {
                schema: rules.schema,
                version: rules.schema_version,
            });
        }

        let mut by_name = BTreeMap::new();
        for mut family in families {
            family.name = family.name.trim().to_string();
            if by_name.contains_key(&family.name) {
                return Err(RuleError::DuplicateFamily {
                    family: family.name,
                });
            }
            by_name.insert(family.name.clone(), family);
        }
        debug!(origin, families = by_name.len(), "loaded rule table");

        Ok(Self {
            family_keys: rules.family_keys,
            package,
            families: by_name,
        })
    }

    pub fn load(path: &Path) -> Result<Self, RuleError> {
        let text = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// The table compiled into the binary.
    pub fn bundled() -> Result<Self, RuleError> {
        Self::from_toml_str(BUNDLED, "bundled default")
    }

    /// Load the table to use for a run.
    ///
    /// Resolution order:
    /// 1. `explicit`, usually the `--rules` flag
    /// 2. `PARTLABEL_RULES` environment variable
    /// 3. the bundled default
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, RuleSource), RuleError> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, RuleSource::Path(path.to_path_buf())));
        }
        if let Some(path) = std::env::var_os(RULES_ENV_VAR).filter(|value| !value.is_empty()) {
            let path = PathBuf::from(path);
            return Ok((Self::load(&path)?, RuleSource::Env(path)));
        }
        Ok((Self::bundled()?, RuleSource::Bundled))
    }

    /// Rule for an exact family label. `None` means the table does not
    /// cover it; callers decide whether that is an error.
    pub fn family(&self, name: &str) -> Option<&FamilyRule> {
        self.families.get(name.trim())
    }

    pub fn families(&self) -> impl Iterator<Item = &FamilyRule> {
        self.families.values()
    }

    /// Attribute keys that may hold the family label, in priority order.
    pub fn family_keys(&self) -> &[String] {
        &self.family_keys
    }

    pub fn package(&self) -> &PackageRule {
        &self.package
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[rules]
schema = "partlabel.rules"
schema_version = 1

[package]
attribute = "Package / Case"
[package.transform]
kind = "ranked_select"
on_miss = "keep"
rules = [{ pattern = '.*', output = "$0" }]

[[family]]
name = "LEDs"
title = "LED, {Color}"
description = "{Voltage - Forward}"
"#;

    #[test]
    fn minimal_table_uses_default_family_keys() {
        let table = RuleTable::from_toml_str(MINIMAL, "test").unwrap();
        assert_eq!(table.family_keys(), ["Family", "Categories"]);
        assert_eq!(table.len(), 1);
        assert!(table.family("LEDs").is_some());
        assert!(table.family(" LEDs ").is_some());
        assert!(table.family("leds").is_none());
    }

    #[test]
    fn family_names_are_trimmed_at_load() {
        let padded = MINIMAL.replace("name = \"LEDs\"", "name = \"  LEDs \"");
        let table = RuleTable::from_toml_str(&padded, "test").unwrap();
        assert_eq!(table.family("LEDs").map(|rule| rule.name.as_str()), Some("LEDs"));

        let doubled = format!("{padded}\n[[family]]\nname = \"LEDs\"\ntitle = \"x\"\ndescription = \"y\"\n");
        assert!(matches!(
            RuleTable::from_toml_str(&doubled, "test"),
            Err(RuleError::DuplicateFamily { family }) if family == "LEDs"
        ));
    }

    #[test]
    fn rejects_duplicate_families() {
        let doubled = format!("{MINIMAL}\n[[family]]\nname = \"LEDs\"\ntitle = \"x\"\ndescription = \"y\"\n");
        assert!(matches!(
            RuleTable::from_toml_str(&doubled, "test"),
            Err(RuleError::DuplicateFamily { family }) if family == "LEDs"
        ));
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let bumped = MINIMAL.replace("schema_version = 1", "schema_version = 2");
        assert!(matches!(
            RuleTable::from_toml_str(&bumped, "test"),
            Err(RuleError::UnsupportedSchema { version: 2, .. })
        ));
    }

    #[test]
    fn bad_template_fails_at_load() {
        let broken = MINIMAL.replace("LED, {Color}", "LED, {Color");
        let err = RuleTable::from_toml_str(&broken, "broken.toml").unwrap_err();
        assert!(matches!(err, RuleError::Parse { ref origin, .. } if origin == "broken.toml"));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn bundled_table_loads() {
        let table = RuleTable::bundled().unwrap();
        assert!(table.family("Ceramic Capacitors").is_some());
        assert!(table.family("Through Hole Resistors").is_some());
        assert_eq!(table.package().attribute, "Package / Case");
    }
}

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// A regular expression that must match the whole input.
///
/// Serialized as the pattern text the user wrote, without the anchors.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnchoredPattern {
    source: String,
    regex: Regex,
}

impl AnchoredPattern {
    pub fn new(pattern: &str) -> Result<Self, RuleError> {
        let regex =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|source| RuleError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    pub fn captures<'h>(&self, input: &'h str) -> Option<regex::Captures<'h>> {
        self.regex.captures(input)
    }
}

impl fmt::Debug for AnchoredPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnchoredPattern").field(&self.source).finish()
    }
}

impl TryFrom<String> for AnchoredPattern {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<AnchoredPattern> for String {
    fn from(value: AnchoredPattern) -> Self {
        value.source
    }
}

/// A pattern plus the output built from its capture groups.
///
/// `output` uses `regex` replacement syntax: `$0` for the whole match,
/// `${1}` or `${name}` for groups. Write `${1}V` rather than `$1V`, which
/// would name a group called `1V`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRule {
    pub pattern: AnchoredPattern,
    pub output: String,
}

impl PatternRule {
    pub fn new(pattern: &str, output: impl Into<String>) -> Result<Self, RuleError> {
        Ok(Self {
            pattern: AnchoredPattern::new(pattern)?,
            output: output.into(),
        })
    }

    /// The formatted output if `input` matches.
    pub fn apply(&self, input: &str) -> Option<String> {
        let captures = self.pattern.captures(input)?;
        let mut out = String::new();
        captures.expand(&self.output, &mut out);
        Some(out)
    }
}

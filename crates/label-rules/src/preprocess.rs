//! String transforms applied to attribute values before template rendering.
//!
//! Each transform is plain data tagged by `kind`, so a rule table can be
//! written, diffed and printed without embedding code:
//!
//! ```toml
//! [family.preprocess.transform]
//! kind = "remap"
//! entries = { "N-Channel" = "NMOS", "P-Channel" = "PMOS" }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::pattern::PatternRule;

/// What a transform does with input none of its entries cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Fail with the input and every entry that was tried.
    #[default]
    Fail,
    /// Keep a fallback value: the input itself, or for ranked selects the
    /// first list element.
    Keep,
}

fn default_separator() -> String {
    ", ".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    /// Keep the first `count` elements of a separated list, appending `end`
    /// as a final element when anything was dropped.
    TruncateList {
        count: usize,
        #[serde(default)]
        end: String,
        #[serde(default = "default_separator")]
        separator: String,
    },
    /// Exact-match dictionary lookup.
    Remap {
        entries: BTreeMap<String, String>,
        #[serde(default)]
        on_miss: MissPolicy,
    },
    /// First fully-anchored pattern that matches formats the output.
    RegexCapture {
        rules: Vec<PatternRule>,
        #[serde(default)]
        on_miss: MissPolicy,
    },
    /// Split into elements and pick the one matched by the highest-priority
    /// pattern. Element order never decides between patterns.
    RankedSelect {
        rules: Vec<PatternRule>,
        #[serde(default = "default_separator")]
        separator: String,
        #[serde(default)]
        on_miss: MissPolicy,
    },
}

impl Transform {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TruncateList { .. } => "truncate_list",
            Self::Remap { .. } => "remap",
            Self::RegexCapture { .. } => "regex_capture",
            Self::RankedSelect { .. } => "ranked_select",
        }
    }

    pub fn apply(&self, input: &str) -> Result<String, TransformError> {
        match self {
            Self::TruncateList {
                count,
                end,
                separator,
            } => Ok(truncate_list(input, *count, end, separator)),
            Self::Remap { entries, on_miss } => match entries.get(input) {
                Some(mapped) => Ok(mapped.clone()),
                None if *on_miss == MissPolicy::Keep => Ok(input.to_string()),
                None => Err(TransformError::NoRemapEntry {
                    input: input.to_string(),
                    known: entries.keys().cloned().collect(),
                }),
            },
            Self::RegexCapture { rules, on_miss } => {
                if let Some(out) = rules.iter().find_map(|rule| rule.apply(input)) {
                    return Ok(out);
                }
                match on_miss {
                    MissPolicy::Keep => Ok(input.to_string()),
                    MissPolicy::Fail => Err(no_match(input, rules)),
                }
            }
            Self::RankedSelect {
                rules,
                separator,
                on_miss,
            } => {
                let elements = split_elements(input, separator);
                let selected = rules.iter().find_map(|rule| {
                    elements.iter().find_map(|element| rule.apply(element))
                });
                match (selected, on_miss) {
                    (Some(out), _) => Ok(out),
                    (None, MissPolicy::Keep) => {
                        Ok(elements.first().map(|s| s.to_string()).unwrap_or_default())
                    }
                    (None, MissPolicy::Fail) => Err(no_match(input, rules)),
                }
            }
        }
    }
}

fn truncate_list(input: &str, count: usize, end: &str, separator: &str) -> String {
    let elements: Vec<&str> = input.split(separator).collect();
    if elements.len() <= count {
        return input.to_string();
    }
    let mut kept = elements[..count].to_vec();
    if !end.is_empty() {
        kept.push(end);
    }
    kept.join(separator)
}

fn split_elements<'a>(input: &'a str, separator: &str) -> Vec<&'a str> {
    input
        .split(separator)
        .map(str::trim)
        .filter(|element| !element.is_empty())
        .collect()
}

fn no_match(input: &str, rules: &[PatternRule]) -> TransformError {
    TransformError::NoPatternMatch {
        input: input.to_string(),
        patterns: rules
            .iter()
            .map(|rule| rule.pattern.as_str().to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(pairs: &[(&str, &str)]) -> Vec<PatternRule> {
        pairs
            .iter()
            .map(|(pattern, output)| PatternRule::new(pattern, *output).unwrap())
            .collect()
    }

    #[test]
    fn truncate_list_marks_dropped_elements() {
        let transform = Transform::TruncateList {
            count: 2,
            end: "...".to_string(),
            separator: ", ".to_string(),
        };
        assert_eq!(transform.apply("a, b, c, d").unwrap(), "a, b, ...");
        assert_eq!(transform.apply("a, b").unwrap(), "a, b");
        assert_eq!(transform.apply("").unwrap(), "");
    }

    #[test]
    fn truncate_list_without_end_marker() {
        let transform = Transform::TruncateList {
            count: 1,
            end: String::new(),
            separator: "/".to_string(),
        };
        assert_eq!(transform.apply("x/y/z").unwrap(), "x");
    }

    #[test]
    fn remap_is_strict_by_default() {
        let transform: Transform = toml::from_str(
            r#"
            kind = "remap"
            entries = { "N-Channel" = "NMOS", "P-Channel" = "PMOS" }
            "#,
        )
        .unwrap();
        assert_eq!(transform.apply("N-Channel").unwrap(), "NMOS");
        assert_eq!(
            transform.apply("Dual N-Channel").unwrap_err(),
            TransformError::NoRemapEntry {
                input: "Dual N-Channel".to_string(),
                known: vec!["N-Channel".to_string(), "P-Channel".to_string()],
            }
        );
    }

    #[test]
    fn remap_keep_passes_input_through() {
        let transform = Transform::Remap {
            entries: BTreeMap::from([("a".to_string(), "b".to_string())]),
            on_miss: MissPolicy::Keep,
        };
        assert_eq!(transform.apply("z").unwrap(), "z");
    }

    #[test]
    fn regex_capture_first_match_wins() {
        let transform = Transform::RegexCapture {
            rules: rules(&[(r"(\d+)\s*pF", "${1}pF"), (r"(\d+)\s*\w+", "${1}?")]),
            on_miss: MissPolicy::Fail,
        };
        assert_eq!(transform.apply("22 pF").unwrap(), "22pF");
        assert_eq!(transform.apply("22 nH").unwrap(), "22?");
        let err = transform.apply("none").unwrap_err();
        assert_eq!(
            err,
            TransformError::NoPatternMatch {
                input: "none".to_string(),
                patterns: vec![r"(\d+)\s*pF".to_string(), r"(\d+)\s*\w+".to_string()],
            }
        );
    }

    #[test]
    fn ranked_select_ignores_input_order() {
        let transform = Transform::RankedSelect {
            rules: rules(&[(r"SOT-\d+-\d+", "$0"), (r"SOT-\d+", "$0")]),
            separator: ", ".to_string(),
            on_miss: MissPolicy::Fail,
        };
        assert_eq!(transform.apply("SOT-23, SOT-23-5").unwrap(), "SOT-23-5");
        assert_eq!(transform.apply("SOT-23-5, SOT-23").unwrap(), "SOT-23-5");
    }

    #[test]
    fn ranked_select_keep_falls_back_to_first_element() {
        let transform = Transform::RankedSelect {
            rules: rules(&[("Axial", "Axial")]),
            separator: ",".to_string(),
            on_miss: MissPolicy::Keep,
        };
        assert_eq!(transform.apply(" Bulk , Tray").unwrap(), "Bulk");
        assert_eq!(transform.apply("").unwrap(), "");
    }

    #[test]
    fn kinds_deserialize_from_tags() {
        let transform: Transform = toml::from_str(
            r#"
            kind = "ranked_select"
            rules = [{ pattern = "a", output = "A" }]
            "#,
        )
        .unwrap();
        assert_eq!(transform.kind(), "ranked_select");
        assert!(matches!(
            transform,
            Transform::RankedSelect { ref separator, on_miss: MissPolicy::Fail, .. } if separator == ", "
        ));
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// A preprocessor could not transform an attribute value.
///
/// Both variants carry the input and everything that was tried, since the
/// rule table is hand-curated and these are how missing entries are found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("no remap entry for {input:?} (known: {known:?})")]
    NoRemapEntry { input: String, known: Vec<String> },

    #[error("{input:?} matched none of the patterns {patterns:?}")]
    NoPatternMatch {
        input: String,
        patterns: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("no rule for family {family:?}")]
    UnknownFamily { family: String },

    #[error("attributes carry no family label (looked for {keys:?})")]
    MissingFamilyLabel { keys: Vec<String> },

    #[error("family {family:?}: required attribute {attribute:?} is missing")]
    MissingAttribute { family: String, attribute: String },

    #[error("family {family:?}: {template} template references missing attribute {attribute:?}")]
    UnresolvedPlaceholder {
        family: String,
        template: &'static str,
        attribute: String,
    },

    #[error("family {family:?}: preprocessing {attribute:?} failed: {source}")]
    Preprocess {
        family: String,
        attribute: String,
        #[source]
        source: TransformError,
    },

    #[error("package {attribute:?} could not be reduced to one designator: {source}")]
    Package {
        attribute: String,
        #[source]
        source: TransformError,
    },

    #[error("invalid template {template:?}: {message}")]
    InvalidTemplate { template: String, message: String },

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("duplicate rule for family {family:?}")]
    DuplicateFamily { family: String },

    #[error("unsupported rule table schema {schema:?} version {version}")]
    UnsupportedSchema { schema: String, version: u32 },

    #[error("failed to read rule table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule table {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
}

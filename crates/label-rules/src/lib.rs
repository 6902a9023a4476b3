//! Rule-driven label text for electronic parts.
//!
//! A [`RuleTable`] maps a supplier family label (for example
//! `Ceramic Capacitors`) to a [`FamilyRule`]: an ordered list of attribute
//! preprocessors and two templates. The [`RuleEngine`] normalizes a part's
//! attributes, picks a single package designator, dispatches on the family
//! and renders the templates.
//!
//! The table is data, loaded from TOML, so new families need a table
//! entry and no code.

#![deny(unsafe_code)]

pub mod engine;
pub mod error;
pub mod pattern;
pub mod preprocess;
pub mod table;
pub mod template;

pub use engine::{RenderedLabel, RuleEngine, normalize_attributes, normalize_value};
pub use error::{RuleError, TransformError};
pub use pattern::{AnchoredPattern, PatternRule};
pub use preprocess::{MissPolicy, Transform};
pub use table::{FamilyRule, PackageRule, Preprocessor, RULES_ENV_VAR, RuleSource, RuleTable};
pub use template::{Segment, Template};

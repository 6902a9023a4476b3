use std::path::PathBuf;
use std::time::Duration;

use label_core::FamilyCoverage;

/// Outcome of a table-processing command.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub command: &'static str,
    pub input: PathBuf,
    pub output: PathBuf,
    /// Where the rule table came from, for commands that use one.
    pub rules: Option<String>,
    pub steps: Vec<String>,
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns_added: Vec<String>,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct CoverageReport {
    pub input: PathBuf,
    pub rules: String,
    pub families: Vec<FamilyCoverage>,
}

impl CoverageReport {
    pub fn uncovered(&self) -> usize {
        self.families.iter().filter(|entry| !entry.covered).count()
    }
}

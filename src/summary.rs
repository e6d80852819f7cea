use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::process::filter::FilterCounts;
use crate::schema::CleanedRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    pub label: String,
    pub rows: usize,
}

/// Row accounting for one run, also written as the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct CleanSummary {
    pub regions: Vec<RegionCount>,
    pub rows_in: usize,
    pub removed: FilterCounts,
    pub duplicates_collapsed: usize,
    pub rows_out: usize,
    pub output: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CleanSummary {
    /// `rows_in - rows_out == removed + duplicates_collapsed`
    pub fn is_balanced(&self) -> bool {
        self.rows_in >= self.rows_out
            && self.rows_in - self.rows_out == self.removed.total() + self.duplicates_collapsed
    }

    pub fn log(&self) {
        for region in &self.regions {
            info!(region = %region.label, rows = region.rows, "rows read");
        }
        info!(rows_in = self.rows_in, "rows before cleaning");
        info!(
            invalid_ein = self.removed.invalid_ein,
            missing_name = self.removed.missing_name,
            inactive_status = self.removed.inactive_status,
            ineligible_subsection = self.removed.ineligible_subsection,
            "rows removed by filter"
        );
        info!(duplicates = self.duplicates_collapsed, "duplicate EINs collapsed");
        info!(
            rows_out = self.rows_out,
            output = %self.output.display(),
            "rows after cleaning"
        );
    }
}

/// Log the first `n` cleaned rows.
pub fn log_sample(rows: &[CleanedRecord], n: usize) {
    for rec in rows.iter().take(n) {
        info!(
            ein = %rec.ein,
            name = %rec.legal_name,
            city = %rec.city,
            state = %rec.state,
            subsection = %rec.subsection,
            ntee = %rec.ntee_code,
            region = %rec.region,
            "sample"
        );
    }
}

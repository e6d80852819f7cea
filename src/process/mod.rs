// src/process/mod.rs
pub mod dedup;
pub mod filter;
pub mod load;
pub mod normalize;

use chrono::Utc;
use tracing::info;

use crate::config::CleanerConfig;
use crate::error::{CleanError, Result};
use crate::schema::{CleanedRecord, RawRecord};
use crate::summary::{log_sample, CleanSummary, RegionCount};
use crate::write::{stage_dataset, stage_json};

use self::dedup::dedup_keep_first;
use self::filter::{FilterCounts, RecordFilter};
use self::load::load_regions;
use self::normalize::normalize_all;

/// In-memory result of normalize → filter → dedup.
#[derive(Debug)]
pub struct Cleaned {
    pub records: Vec<CleanedRecord>,
    pub removed: FilterCounts,
    pub duplicates_collapsed: usize,
}

/// The pure part of a run: no I/O.
pub fn clean_records(raw: &[RawRecord], eligible_subsections: &[String]) -> Cleaned {
    let normalized = normalize_all(raw);
    let filter = RecordFilter::new(eligible_subsections.iter().cloned());
    let (filtered, removed) = filter.apply(normalized);
    let (records, duplicates_collapsed) = dedup_keep_first(filtered);
    Cleaned {
        records,
        removed,
        duplicates_collapsed,
    }
}

/// Load every configured region, clean, and replace the output file.
/// Any error aborts before the output (or report) is touched: both files
/// are staged in full before either is renamed into place.
#[tracing::instrument(level = "info", skip(config), fields(regions = config.regions.len()))]
pub fn run(config: &CleanerConfig) -> Result<CleanSummary> {
    let started_at = Utc::now();
    let mut config = config.clone();
    config
        .validate()
        .map_err(|detail| CleanError::Config { detail })?;

    let loaded = load_regions(&config.regions)?;
    let rows_in = loaded.records.len();
    info!(rows_in, "loaded all regions");

    let cleaned = clean_records(&loaded.records, &config.eligible_subsections);
    let table = stage_dataset(&config.output, &cleaned.records, config.format)?;

    let summary = CleanSummary {
        regions: loaded
            .rows_per_region
            .into_iter()
            .map(|(label, rows)| RegionCount { label, rows })
            .collect(),
        rows_in,
        removed: cleaned.removed,
        duplicates_collapsed: cleaned.duplicates_collapsed,
        rows_out: cleaned.records.len(),
        output: config.output.clone(),
        started_at,
        finished_at: Utc::now(),
    };
    let report = match &config.report {
        Some(path) => Some(stage_json(path, &summary)?),
        None => None,
    };

    // report first: a failed rename there must not leave a replaced table
    if let Some(report) = report {
        let path = report.path().to_path_buf();
        report.commit()?;
        info!(report = %path.display(), "wrote run report");
    }
    table.commit()?;
    info!(output = %config.output.display(), "replaced cleaned table");

    summary.log();
    log_sample(&cleaned.records, config.sample_rows);
    Ok(summary)
}

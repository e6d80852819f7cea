// src/config/mod.rs
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::error::{CleanError, Result};
use crate::process::normalize::normalize_subsection;
use crate::schema::Subsection;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "cleaner.yaml";

/// One input extract and the label its rows are tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionFile {
    pub label: String,
    pub path: PathBuf,
}

impl RegionFile {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

/// Everything a run needs. `regions` order is processing order, which also
/// decides which duplicate EIN survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleanerConfig {
    pub regions: Vec<RegionFile>,
    pub output: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub report: Option<PathBuf>,
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
    #[serde(default = "default_eligible_subsections")]
    pub eligible_subsections: Vec<String>,
}

fn default_sample_rows() -> usize {
    5
}

fn default_eligible_subsections() -> Vec<String> {
    vec!["03".to_string()]
}

impl Default for CleanerConfig {
    /// The four IRS EO BMF regional extracts under `data/raw/`.
    fn default() -> Self {
        let regions = (1..=4)
            .map(|n| RegionFile::new(format!("eo{n}"), format!("data/raw/eo{n}.csv")))
            .collect();
        Self {
            regions,
            output: PathBuf::from("data/charities_clean.csv"),
            format: OutputFormat::Csv,
            report: None,
            sample_rows: default_sample_rows(),
            eligible_subsections: default_eligible_subsections(),
        }
    }
}

impl CleanerConfig {
    pub fn new(regions: Vec<RegionFile>, output: impl Into<PathBuf>) -> Self {
        Self {
            regions,
            output: output.into(),
            ..Self::default()
        }
    }

    /// Read a YAML config. Relative paths resolve against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |detail: String| CleanError::Config {
            detail: format!("{}: {detail}", path.display()),
        };
        let text = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let mut config: CleanerConfig =
            serde_yaml::from_str(&text).map_err(|e| config_error(e.to_string()))?;

        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        config.validate().map_err(config_error)?;
        debug!(regions = config.regions.len(), "loaded config");
        Ok(config)
    }

    /// Config path given on the command line, else `cleaner.yaml` if present,
    /// else the built-in default.
    pub fn from_args_or_default(arg: Option<&str>) -> Result<Self> {
        match arg {
            Some(p) => Self::load(p),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    fn rebase(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for region in &mut self.regions {
            join(&mut region.path);
        }
        join(&mut self.output);
        if let Some(report) = self.report.as_mut() {
            join(report);
        }
    }

    /// Checks the config and folds `eligible_subsections` to 2-digit codes.
    pub fn validate(&mut self) -> std::result::Result<(), String> {
        if self.regions.is_empty() {
            return Err("at least one region is required".into());
        }
        let mut labels = HashSet::new();
        for region in &self.regions {
            if region.label.trim().is_empty() {
                return Err(format!("region {:?} has an empty label", region.path));
            }
            if !labels.insert(region.label.as_str()) {
                return Err(format!("duplicate region label `{}`", region.label));
            }
        }
        if self.eligible_subsections.is_empty() {
            return Err("eligible_subsections must not be empty".into());
        }
        let mut codes = Vec::with_capacity(self.eligible_subsections.len());
        for raw in &self.eligible_subsections {
            match normalize_subsection(raw) {
                Subsection::Code(code) => codes.push(code),
                Subsection::Unrecognized(_) => {
                    return Err(format!("`{raw}` is not a subsection code"));
                }
            }
        }
        self.eligible_subsections = codes;
        Ok(())
    }
}

use std::{io, path::PathBuf};

use thiserror::Error;

/// Fatal failures of a cleaning run. Row-level problems are never errors;
/// they are filtered and counted instead.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("region file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("{}: required column `{field}` not found in header", path.display())]
    SchemaMismatch { path: PathBuf, field: &'static str },

    #[error("{}: malformed input{}: {detail}", path.display(), line_suffix(*line))]
    MalformedInput {
        path: PathBuf,
        line: Option<u64>,
        detail: String,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {detail}")]
    Config { detail: String },
}

fn line_suffix(line: Option<u64>) -> String {
    line.map(|l| format!(" at line {l}")).unwrap_or_default()
}

impl CleanError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        Self::MalformedInput {
            path: path.into(),
            line: None,
            detail: detail.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanError>;

// src/bin/verify.rs
//
// Re-reads a cleaned CSV and checks the output invariants.

use anyhow::{Context, Result};
use charityclean::{process::normalize::EIN_DIGITS, schema::OUTPUT_COLUMNS};
use std::{
    collections::HashSet,
    env,
    path::{Path, PathBuf},
    process,
};

#[derive(Debug, Default)]
struct Report {
    rows: usize,
    bad_ein: usize,
    empty_name: usize,
    duplicate_ein: usize,
}

impl Report {
    fn ok(&self) -> bool {
        self.bad_ein == 0 && self.empty_name == 0 && self.duplicate_ein == 0
    }
}

fn verify(path: &Path) -> Result<Report> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open '{}'", path.display()))?;

    let headers = rdr.headers()?.clone();
    let expected: Vec<&str> = OUTPUT_COLUMNS.to_vec();
    if headers.iter().collect::<Vec<_>>() != expected {
        anyhow::bail!(
            "unexpected header in '{}': {:?}",
            path.display(),
            headers.iter().collect::<Vec<_>>()
        );
    }

    let mut report = Report::default();
    let mut seen = HashSet::new();
    for record in rdr.records() {
        let record = record.with_context(|| format!("Failed to read '{}'", path.display()))?;
        report.rows += 1;

        let ein = record.get(0).unwrap_or_default();
        if ein.len() != EIN_DIGITS || !ein.bytes().all(|b| b.is_ascii_digit()) {
            report.bad_ein += 1;
        }
        if record.get(1).unwrap_or_default().trim().is_empty() {
            report.empty_name += 1;
        }
        if !seen.insert(ein.to_string()) {
            report.duplicate_ein += 1;
        }
    }
    Ok(report)
}

fn main() -> Result<()> {
    let path = match env::args().nth(1) {
        Some(p) => PathBuf::from(p),
        None => {
            eprintln!("Usage: verify <CLEANED_CSV>");
            process::exit(2);
        }
    };

    let report = verify(&path)?;

    println!("{: <20} {:>12}", "Check", "Count");
    println!("{:-<33}", "");
    println!("{: <20} {:>12}", "rows", report.rows);
    println!("{: <20} {:>12}", "malformed EIN", report.bad_ein);
    println!("{: <20} {:>12}", "empty name", report.empty_name);
    println!("{: <20} {:>12}", "duplicate EIN", report.duplicate_ein);

    if !report.ok() {
        process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn flags_each_broken_invariant() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("clean.csv");
        let header = OUTPUT_COLUMNS.join(",");
        fs::write(
            &path,
            format!(
                "{header}\n\
                 123456789,Acme,,,,,03,,active,,,a\n\
                 123456789,Acme Again,,,,,03,,active,,,b\n\
                 12345,Short,,,,,03,,active,,,a\n\
                 987654321, ,,,,,03,,active,,,a\n"
            ),
        )?;

        let report = verify(&path)?;
        assert_eq!(report.rows, 4);
        assert_eq!(report.duplicate_ein, 1);
        assert_eq!(report.bad_ein, 1);
        assert_eq!(report.empty_name, 1);
        assert!(!report.ok());
        Ok(())
    }

    #[test]
    fn rejects_foreign_header() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("other.csv");
        fs::write(&path, "EIN,NAME\n123456789,Acme\n")?;
        assert!(verify(&path).is_err());
        Ok(())
    }
}

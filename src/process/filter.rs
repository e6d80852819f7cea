use serde::Serialize;
use std::collections::HashSet;

use crate::schema::{CleanedRecord, NormalizedRecord, Subsection};

/// Validity checks, in the order they are applied. A dropped row is
/// charged to the first one it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    InvalidEin,
    MissingName,
    InactiveStatus,
    IneligibleSubsection,
}

/// Rows removed per predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterCounts {
    pub invalid_ein: usize,
    pub missing_name: usize,
    pub inactive_status: usize,
    pub ineligible_subsection: usize,
}

impl FilterCounts {
    pub fn total(&self) -> usize {
        self.invalid_ein + self.missing_name + self.inactive_status + self.ineligible_subsection
    }

    fn bump(&mut self, predicate: Predicate) {
        match predicate {
            Predicate::InvalidEin => self.invalid_ein += 1,
            Predicate::MissingName => self.missing_name += 1,
            Predicate::InactiveStatus => self.inactive_status += 1,
            Predicate::IneligibleSubsection => self.ineligible_subsection += 1,
        }
    }
}

pub struct RecordFilter {
    eligible: HashSet<String>,
}

impl RecordFilter {
    /// `eligible_subsections` must already be 2-digit codes.
    pub fn new<I, S>(eligible_subsections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            eligible: eligible_subsections.into_iter().map(Into::into).collect(),
        }
    }

    /// The first predicate `rec` fails, if any.
    pub fn check(&self, rec: &NormalizedRecord) -> Option<Predicate> {
        if rec.ein.is_none() {
            return Some(Predicate::InvalidEin);
        }
        if rec.legal_name.trim().is_empty() {
            return Some(Predicate::MissingName);
        }
        if !rec.status.is_recognized() {
            return Some(Predicate::InactiveStatus);
        }
        match &rec.subsection {
            Subsection::Code(code) if self.eligible.contains(code) => None,
            _ => Some(Predicate::IneligibleSubsection),
        }
    }

    /// Keep rows passing every predicate, in input order.
    pub fn apply(&self, rows: Vec<NormalizedRecord>) -> (Vec<CleanedRecord>, FilterCounts) {
        let mut counts = FilterCounts::default();
        let mut kept = Vec::with_capacity(rows.len());
        for mut rec in rows {
            if let Some(predicate) = self.check(&rec) {
                counts.bump(predicate);
                continue;
            }
            // every row lands in exactly one of `kept` or `counts`
            match rec.ein.take() {
                Some(ein) => kept.push(into_cleaned(ein, rec)),
                None => counts.bump(Predicate::InvalidEin),
            }
        }
        (kept, counts)
    }
}

fn into_cleaned(ein: String, rec: NormalizedRecord) -> CleanedRecord {
    CleanedRecord {
        ein,
        subsection: rec.subsection.as_str().to_string(),
        deductibility: rec.deductibility.as_str().to_string(),
        status: rec.status.as_str().to_string(),
        legal_name: rec.legal_name,
        street: rec.street,
        city: rec.city,
        state: rec.state,
        zip: rec.zip,
        ntee_code: rec.ntee_code,
        ntee_major: rec.ntee_major,
        region: rec.region,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ActivityStatus, Deductibility};

    fn rec(ein: Option<&str>, name: &str, status: ActivityStatus, sub: &str) -> NormalizedRecord {
        NormalizedRecord {
            ein: ein.map(str::to_string),
            legal_name: name.to_string(),
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            subsection: crate::process::normalize::normalize_subsection(sub),
            deductibility: Deductibility::Unknown,
            status,
            ntee_code: String::new(),
            ntee_major: String::new(),
            region: "eo1".into(),
            line: 2,
        }
    }

    #[test]
    fn first_failing_predicate_is_charged() {
        let filter = RecordFilter::new(["03"]);
        // fails every predicate, counted once as invalid EIN
        let all_bad = rec(None, "", ActivityStatus::Revoked, "04");
        assert_eq!(filter.check(&all_bad), Some(Predicate::InvalidEin));
        let no_name = rec(Some("123456789"), " ", ActivityStatus::Revoked, "04");
        assert_eq!(filter.check(&no_name), Some(Predicate::MissingName));
        let revoked = rec(Some("123456789"), "X", ActivityStatus::Revoked, "03");
        assert_eq!(filter.check(&revoked), Some(Predicate::InactiveStatus));
        let unknown = rec(
            Some("123456789"),
            "X",
            ActivityStatus::Unrecognized("99".into()),
            "03",
        );
        assert_eq!(filter.check(&unknown), Some(Predicate::InactiveStatus));
        let c4 = rec(Some("123456789"), "X", ActivityStatus::Active, "4");
        assert_eq!(filter.check(&c4), Some(Predicate::IneligibleSubsection));
        let garbled = rec(Some("123456789"), "X", ActivityStatus::Active, "charity");
        assert_eq!(filter.check(&garbled), Some(Predicate::IneligibleSubsection));
        let ok = rec(Some("123456789"), "X", ActivityStatus::Trust, "03");
        assert_eq!(filter.check(&ok), None);
    }

    #[test]
    fn apply_counts_balance_with_kept_rows() {
        let filter = RecordFilter::new(["03", "92"]);
        let rows = vec![
            rec(Some("000000001"), "Keep One", ActivityStatus::Active, "03"),
            rec(None, "Bad Ein", ActivityStatus::Active, "03"),
            rec(Some("000000002"), "", ActivityStatus::Active, "03"),
            rec(Some("000000003"), "Gone", ActivityStatus::Terminated, "03"),
            rec(Some("000000004"), "Lodge", ActivityStatus::Active, "10"),
            rec(Some("000000005"), "Keep Two", ActivityStatus::Conditional, "92"),
        ];
        let (kept, counts) = filter.apply(rows);

        assert_eq!(
            counts,
            FilterCounts {
                invalid_ein: 1,
                missing_name: 1,
                inactive_status: 1,
                ineligible_subsection: 1,
            }
        );
        assert_eq!(counts.total() + kept.len(), 6);
        let names: Vec<_> = kept.iter().map(|r| r.legal_name.as_str()).collect();
        assert_eq!(names, ["Keep One", "Keep Two"]);
        assert_eq!(kept[1].status, "conditional");
        assert_eq!(kept[1].subsection, "92");
    }

    #[test]
    fn cleaned_row_carries_the_checked_ein() {
        let row = rec(Some("000000007"), "Seven", ActivityStatus::Active, "501(c)(3)");
        let cleaned = into_cleaned("000000007".into(), row);
        assert_eq!(cleaned.ein, "000000007");
        assert_eq!(cleaned.legal_name, "Seven");
        assert_eq!(cleaned.subsection, "03");
        assert_eq!(cleaned.status, "active");
        assert_eq!(cleaned.region, "eo1");
    }
}

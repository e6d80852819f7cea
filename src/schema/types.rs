use serde::Serialize;
use std::collections::BTreeMap;

use super::CanonicalField;

/// One input row after header resolution. Only recognized columns survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub region: String,
    /// 1-based line in the source CSV (the header is line 1).
    pub line: u64,
    pub values: BTreeMap<CanonicalField, String>,
}

impl RawRecord {
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }
}

/// IRS exemption status, folded from codes and free-text spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityStatus {
    Active,
    Conditional,
    Trust,
    Terminated,
    Revoked,
    Unrecognized(String),
}

impl ActivityStatus {
    /// Currently recognized as exempt: not revoked, terminated or unknown.
    pub fn is_recognized(&self) -> bool {
        matches!(
            self,
            ActivityStatus::Active | ActivityStatus::Conditional | ActivityStatus::Trust
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActivityStatus::Active => "active",
            ActivityStatus::Conditional => "conditional",
            ActivityStatus::Trust => "trust",
            ActivityStatus::Terminated => "terminated",
            ActivityStatus::Revoked => "revoked",
            ActivityStatus::Unrecognized(raw) => raw,
        }
    }
}

/// 501(c) subsection, as a 2-digit code when it could be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subsection {
    Code(String),
    Unrecognized(String),
}

impl Subsection {
    pub fn as_str(&self) -> &str {
        match self {
            Subsection::Code(code) => code,
            Subsection::Unrecognized(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deductibility {
    Deductible,
    NotDeductible,
    Treaty,
    Unknown,
    Other(String),
}

impl Deductibility {
    pub fn as_str(&self) -> &str {
        match self {
            Deductibility::Deductible => "deductible",
            Deductibility::NotDeductible => "not_deductible",
            Deductibility::Treaty => "treaty",
            Deductibility::Unknown => "",
            Deductibility::Other(raw) => raw,
        }
    }
}

/// A row with every value in canonical form. `ein` is `None` when the
/// source value could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub ein: Option<String>,
    pub legal_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub subsection: Subsection,
    pub deductibility: Deductibility,
    pub status: ActivityStatus,
    pub ntee_code: String,
    pub ntee_major: String,
    pub region: String,
    pub line: u64,
}

/// Column order of the cleaned table.
pub const OUTPUT_COLUMNS: [&str; 12] = [
    "ein",
    "legal_name",
    "street",
    "city",
    "state",
    "zip",
    "subsection",
    "deductibility",
    "status",
    "ntee_code",
    "ntee_major",
    "region",
];

/// A row that passed every filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanedRecord {
    pub ein: String,
    pub legal_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub subsection: String,
    pub deductibility: String,
    pub status: String,
    pub ntee_code: String,
    pub ntee_major: String,
    pub region: String,
}

impl CleanedRecord {
    /// Values in `OUTPUT_COLUMNS` order.
    pub fn fields(&self) -> [&str; 12] {
        [
            self.ein.as_str(),
            self.legal_name.as_str(),
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.zip.as_str(),
            self.subsection.as_str(),
            self.deductibility.as_str(),
            self.status.as_str(),
            self.ntee_code.as_str(),
            self.ntee_major.as_str(),
            self.region.as_str(),
        ]
    }
}

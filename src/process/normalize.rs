use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::{
    ActivityStatus, CanonicalField, Deductibility, NormalizedRecord, RawRecord, Subsection,
};

/// Width of a canonical EIN.
pub const EIN_DIGITS: usize = 9;

static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{5})(?:-?[0-9]{4})?$").unwrap());
static NTEE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z])[0-9][0-9A-Z]").unwrap());

/// Trim, strip one pair of outer quotes, collapse inner whitespace runs.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    unquoted.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Coerce an EIN to 9 zero-padded digits. `None` if it cannot be.
pub fn normalize_ein(raw: &str) -> Option<String> {
    let digits: String = raw.trim().chars().filter(|c| *c != '-').collect();
    if digits.is_empty()
        || digits.len() > EIN_DIGITS
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || digits.bytes().all(|b| b == b'0')
    {
        return None;
    }
    Some(format!("{digits:0>width$}", width = EIN_DIGITS))
}

/// Fold a status code or spelling into an `ActivityStatus`.
pub fn normalize_status(raw: &str) -> ActivityStatus {
    let cleaned = clean_str(raw);
    let numeric = !cleaned.is_empty() && cleaned.bytes().all(|b| b.is_ascii_digit());
    if let Some(code) = numeric.then(|| cleaned.parse::<u32>().ok()).flatten() {
        return match code {
            1 => ActivityStatus::Active,
            2 => ActivityStatus::Conditional,
            12 => ActivityStatus::Trust,
            25 => ActivityStatus::Terminated,
            _ => ActivityStatus::Unrecognized(cleaned),
        };
    }
    match cleaned.to_lowercase().as_str() {
        "active" | "unconditional" => ActivityStatus::Active,
        "conditional" => ActivityStatus::Conditional,
        "trust" => ActivityStatus::Trust,
        "terminated" | "terminating" => ActivityStatus::Terminated,
        "revoked" => ActivityStatus::Revoked,
        _ => ActivityStatus::Unrecognized(cleaned),
    }
}

/// `3`, `03`, `c3` and `501(c)(3)` all become `03`.
pub fn normalize_subsection(raw: &str) -> Subsection {
    let cleaned = clean_str(raw);
    let folded: String = cleaned
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | ' '))
        .collect();
    let tail = folded
        .strip_prefix("501c")
        .or_else(|| folded.strip_prefix('c'))
        .unwrap_or(&folded);
    if (1..=2).contains(&tail.len()) && tail.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = tail.parse::<u8>() {
            return Subsection::Code(format!("{n:02}"));
        }
    }
    Subsection::Unrecognized(cleaned)
}

pub fn normalize_deductibility(raw: &str) -> Deductibility {
    let cleaned = clean_str(raw);
    match cleaned.as_str() {
        "" => Deductibility::Unknown,
        "1" => Deductibility::Deductible,
        "2" => Deductibility::NotDeductible,
        "4" => Deductibility::Treaty,
        _ => Deductibility::Other(cleaned),
    }
}

/// Two ASCII letters, uppercased; anything else is dropped.
pub fn normalize_state(raw: &str) -> String {
    let cleaned = clean_str(raw).to_uppercase();
    if cleaned.len() == 2 && cleaned.bytes().all(|b| b.is_ascii_alphabetic()) {
        cleaned
    } else {
        String::new()
    }
}

/// Five-digit ZIP, dropping any +4 suffix.
pub fn normalize_zip(raw: &str) -> String {
    ZIP_RE
        .captures(&clean_str(raw))
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

/// Returns `(ntee_code, ntee_major)`, e.g. `("B20", "B")` for `b20z`.
pub fn normalize_ntee(raw: &str) -> (String, String) {
    let cleaned = clean_str(raw).to_uppercase();
    match NTEE_RE.captures(&cleaned) {
        Some(caps) => (caps[0].to_string(), caps[1].to_string()),
        None => (String::new(), String::new()),
    }
}

/// Put one raw row into canonical form. Never fails; bad values are
/// represented so the filter can drop the row.
pub fn normalize_record(raw: &RawRecord) -> NormalizedRecord {
    let field = |f: CanonicalField| raw.get(f).unwrap_or("");
    let (ntee_code, ntee_major) = normalize_ntee(field(CanonicalField::NteeCode));

    NormalizedRecord {
        ein: normalize_ein(field(CanonicalField::Ein)),
        legal_name: clean_str(field(CanonicalField::LegalName)),
        street: clean_str(field(CanonicalField::Street)),
        city: clean_str(field(CanonicalField::City)).to_uppercase(),
        state: normalize_state(field(CanonicalField::State)),
        zip: normalize_zip(field(CanonicalField::Zip)),
        subsection: normalize_subsection(field(CanonicalField::Subsection)),
        deductibility: normalize_deductibility(field(CanonicalField::Deductibility)),
        status: normalize_status(field(CanonicalField::Status)),
        ntee_code,
        ntee_major,
        region: raw.region.clone(),
        line: raw.line,
    }
}

pub fn normalize_all(rows: &[RawRecord]) -> Vec<NormalizedRecord> {
    rows.iter().map(normalize_record).collect()
}

use once_cell::sync::Lazy;
use std::{collections::HashMap, fmt};

/// Standardized field names every region spelling resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalField {
    Ein,
    LegalName,
    Street,
    City,
    State,
    Zip,
    Subsection,
    Deductibility,
    Status,
    NteeCode,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 10] = [
        CanonicalField::Ein,
        CanonicalField::LegalName,
        CanonicalField::Street,
        CanonicalField::City,
        CanonicalField::State,
        CanonicalField::Zip,
        CanonicalField::Subsection,
        CanonicalField::Deductibility,
        CanonicalField::Status,
        CanonicalField::NteeCode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::Ein => "ein",
            CanonicalField::LegalName => "legal_name",
            CanonicalField::Street => "street",
            CanonicalField::City => "city",
            CanonicalField::State => "state",
            CanonicalField::Zip => "zip",
            CanonicalField::Subsection => "subsection",
            CanonicalField::Deductibility => "deductibility",
            CanonicalField::Status => "status",
            CanonicalField::NteeCode => "ntee_code",
        }
    }

    /// A region without one of these columns cannot be cleaned.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            CanonicalField::Ein
                | CanonicalField::LegalName
                | CanonicalField::Subsection
                | CanonicalField::Status
        )
    }

    /// Header spellings seen across registry extracts.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            CanonicalField::Ein => &[
                "EIN",
                "Employer Identification Number",
                "EIN Number",
                "ein_number",
                "id",
            ],
            CanonicalField::LegalName => &[
                "NAME",
                "Organization Name",
                "Legal Name",
                "org_name",
                "legal_name",
            ],
            CanonicalField::Street => &["STREET", "Address", "Street Address"],
            CanonicalField::City => &["CITY", "Town"],
            CanonicalField::State => &["STATE", "State Code", "ST"],
            CanonicalField::Zip => &["ZIP", "Zip Code", "Postal Code", "ZIP5"],
            CanonicalField::Subsection => &[
                "SUBSECTION",
                "Subsection Code",
                "Sub Code",
                "Classification Code",
            ],
            CanonicalField::Deductibility => &[
                "DEDUCTIBILITY",
                "Deductibility Code",
                "Deductibility Status",
            ],
            CanonicalField::Status => &[
                "STATUS",
                "Exempt Status",
                "Activity Status",
                "Organization Status",
            ],
            CanonicalField::NteeCode => &["NTEE_CD", "NTEE Code", "NTEE"],
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fold a header cell to its lookup key: drop a leading BOM, keep only
/// alphanumerics, lowercase.
pub fn header_key(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

static SYNONYMS: Lazy<HashMap<String, CanonicalField>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for field in CanonicalField::ALL {
        map.insert(header_key(field.name()), field);
        for spelling in field.synonyms() {
            map.insert(header_key(spelling), field);
        }
    }
    map
});

/// Resolve one header cell to its canonical field, if recognized.
pub fn resolve_header(raw: &str) -> Option<CanonicalField> {
    SYNONYMS.get(&header_key(raw)).copied()
}

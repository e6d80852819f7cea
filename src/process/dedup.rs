use std::collections::HashSet;
use tracing::debug;

use crate::schema::CleanedRecord;

/// Collapse rows sharing an EIN, keeping the first one seen. Returns the
/// survivors in input order and how many rows were collapsed.
pub fn dedup_keep_first(rows: Vec<CleanedRecord>) -> (Vec<CleanedRecord>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    let mut kept = Vec::with_capacity(rows.len());
    let mut collapsed = 0;

    for rec in rows {
        if seen.insert(rec.ein.clone()) {
            kept.push(rec);
        } else {
            debug!(ein = %rec.ein, region = %rec.region, "dropping duplicate EIN");
            collapsed += 1;
        }
    }
    (kept, collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(ein: &str, name: &str, region: &str) -> CleanedRecord {
        CleanedRecord {
            ein: ein.into(),
            legal_name: name.into(),
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            subsection: "03".into(),
            deductibility: String::new(),
            status: "active".into(),
            ntee_code: String::new(),
            ntee_major: String::new(),
            region: region.into(),
        }
    }

    #[test]
    fn first_occurrence_wins_across_regions() {
        let rows = vec![
            rec("123456789", "Acme", "eo1"),
            rec("222222222", "Beta", "eo1"),
            rec("123456789", "Acme Dup", "eo2"),
            rec("222222222", "Beta Dup", "eo3"),
            rec("123456789", "Acme Again", "eo4"),
        ];
        let (kept, collapsed) = dedup_keep_first(rows);
        assert_eq!(collapsed, 3);
        let got: Vec<_> = kept
            .iter()
            .map(|r| (r.ein.as_str(), r.legal_name.as_str()))
            .collect();
        assert_eq!(got, [("123456789", "Acme"), ("222222222", "Beta")]);
    }

    #[test]
    fn unique_input_is_untouched() {
        let rows = vec![rec("1", "A", "x"), rec("2", "B", "x")];
        let (kept, collapsed) = dedup_keep_first(rows.clone());
        assert_eq!(collapsed, 0);
        assert_eq!(kept, rows);
    }
}

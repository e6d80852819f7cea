pub mod fields;
pub mod types;

pub use fields::{resolve_header, CanonicalField};
pub use types::{
    ActivityStatus, CleanedRecord, Deductibility, NormalizedRecord, RawRecord, Subsection,
    OUTPUT_COLUMNS,
};

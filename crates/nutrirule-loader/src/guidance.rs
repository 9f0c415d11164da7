//! Guidance file parser.
//!
//! Parses rules_Guidance_*.txt seed files.

use csv::StringRecord;

use crate::parser::{parse, SeedRecord};
use crate::types::LoadResult;

/// Expected columns in a guidance file.
const GUIDANCE_COLUMNS: &[&str] = &["conditionCode", "note"];

/// One guidance note for a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidanceRow {
    /// The condition this note belongs to.
    pub condition_code: String,
    /// The note, verbatim.
    pub note: String,
}

impl SeedRecord for GuidanceRow {
    const EXPECTED_COLUMNS: &'static [&'static str] = GUIDANCE_COLUMNS;
    const FILE_TYPE: &'static str = "Guidance";

    fn from_record(record: &StringRecord) -> LoadResult<Self> {
        Ok(GuidanceRow {
            condition_code: parse::field(record, 0).to_string(),
            note: parse::field(record, 1).to_string(),
        })
    }

    fn condition_code(&self) -> &str {
        &self.condition_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_guidance_record() {
        let record = StringRecord::from(vec!["diabetes_t2", " Ăn nhiều rau xanh "]);

        let row = GuidanceRow::from_record(&record).unwrap();
        assert_eq!(row.condition_code, "diabetes_t2");
        assert_eq!(row.note, "Ăn nhiều rau xanh");
    }
}

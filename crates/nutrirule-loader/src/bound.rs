//! Bound file parser.
//!
//! Parses rules_Bound_*.txt seed files. Nutrient keys are resolved here so
//! an unrecognised key is reported with its condition and line number.

use csv::StringRecord;
use nutrirule_types::{NutrientKey, RawBound};

use crate::parser::{parse, SeedRecord};
use crate::types::{LoadError, LoadResult};

/// Expected columns in a bound file.
const BOUND_COLUMNS: &[&str] = &["conditionCode", "nutrientKey", "min", "max"];

/// One row of a bound file.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundRow {
    /// The condition this bound belongs to.
    pub condition_code: String,
    /// The bounded nutrient.
    pub nutrient: NutrientKey,
    /// Limits as authored; validated during rule assembly.
    pub limits: RawBound,
    /// Line number in the seed file.
    pub line: u64,
}

impl SeedRecord for BoundRow {
    const EXPECTED_COLUMNS: &'static [&'static str] = BOUND_COLUMNS;
    const FILE_TYPE: &'static str = "Bound";

    fn from_record(record: &StringRecord) -> LoadResult<Self> {
        let condition_code = parse::field(record, 0).to_string();
        let line = parse::line(record);
        let key = parse::field(record, 1);

        let nutrient = NutrientKey::from_name(key).ok_or_else(|| LoadError::UnknownNutrientKey {
            condition: condition_code.clone(),
            key: key.to_string(),
            line,
        })?;

        Ok(BoundRow {
            condition_code,
            nutrient,
            limits: RawBound {
                min: parse::optional_number(parse::field(record, 2))?,
                max: parse::optional_number(parse::field(record, 3))?,
            },
            line,
        })
    }

    fn condition_code(&self) -> &str {
        &self.condition_code
    }
}

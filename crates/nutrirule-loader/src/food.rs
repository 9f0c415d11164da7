//! Food list file parser.
//!
//! Parses rules_Food_*.txt seed files.

use csv::StringRecord;
use nutrirule_types::FoodList;

use crate::parser::{parse, SeedRecord};
use crate::types::LoadResult;

/// Expected columns in a food list file.
const FOOD_COLUMNS: &[&str] = &["conditionCode", "listType", "food"];

/// One row of a food list file.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodRow {
    /// The condition this entry belongs to.
    pub condition_code: String,
    /// Which list the entry goes to.
    pub list: FoodList,
    /// Food name, or category name for the category lists, as authored.
    pub food: String,
}

impl SeedRecord for FoodRow {
    const EXPECTED_COLUMNS: &'static [&'static str] = FOOD_COLUMNS;
    const FILE_TYPE: &'static str = "Food";

    fn from_record(record: &StringRecord) -> LoadResult<Self> {
        Ok(FoodRow {
            condition_code: parse::field(record, 0).to_string(),
            list: parse::field(record, 1).parse()?,
            food: parse::field(record, 2).to_string(),
        })
    }

    fn condition_code(&self) -> &str {
        &self.condition_code
    }
}

//! Condition file parser.
//!
//! Parses rules_Condition_*.txt seed files.

use csv::StringRecord;
use nutrirule_types::Priority;

use crate::parser::{parse, SeedRecord};
use crate::types::{LoadResult, LoaderConfig};

/// Expected columns in a condition file.
const CONDITION_COLUMNS: &[&str] = &["code", "active", "priority", "name"];

/// One row of a condition file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionRow {
    /// Stable condition code.
    pub code: String,
    /// Whether the condition is active.
    pub active: bool,
    /// Rule priority.
    pub priority: Priority,
    /// Display name.
    pub name: String,
}

impl SeedRecord for ConditionRow {
    const EXPECTED_COLUMNS: &'static [&'static str] = CONDITION_COLUMNS;
    const FILE_TYPE: &'static str = "Condition";

    fn from_record(record: &StringRecord) -> LoadResult<Self> {
        Ok(ConditionRow {
            code: parse::field(record, 0).to_string(),
            active: parse::boolean(parse::field(record, 1))?,
            priority: parse::field(record, 2).parse()?,
            name: parse::field(record, 3).to_string(),
        })
    }

    fn condition_code(&self) -> &str {
        &self.code
    }

    fn passes_filter(&self, config: &LoaderConfig) -> bool {
        if config.active_only && !self.active {
            return false;
        }
        config.includes(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(fields: &[&str]) -> StringRecord {
        let mut record = StringRecord::new();
        for field in fields {
            record.push_field(field);
        }
        record
    }

    #[test]
    fn test_parse_condition_record() {
        let record = make_record(&["hypertension", "1", "high", "Huyết áp cao"]);

        let row = ConditionRow::from_record(&record).unwrap();
        assert_eq!(row.code, "hypertension");
        assert!(row.active);
        assert_eq!(row.priority, Priority::High);
        assert_eq!(row.name, "Huyết áp cao");
    }

    #[test]
    fn test_parse_numeric_priority() {
        let record = make_record(&["gout", "0", "1", "Gút"]);

        let row = ConditionRow::from_record(&record).unwrap();
        assert!(!row.active);
        assert_eq!(row.priority, Priority::Low);
    }

    #[test]
    fn test_unknown_priority_rejected() {
        let record = make_record(&["gout", "1", "urgent", "Gút"]);
        assert!(ConditionRow::from_record(&record).is_err());
    }

    #[test]
    fn test_filter_active_only() {
        let row = ConditionRow {
            code: "gout".into(),
            active: false,
            priority: Priority::Medium,
            name: "Gút".into(),
        };

        assert!(!row.passes_filter(&LoaderConfig::default()));
        assert!(row.passes_filter(&LoaderConfig {
            active_only: false,
            ..Default::default()
        }));

        let active = ConditionRow { active: true, ..row };
        assert!(active.passes_filter(&LoaderConfig::only(["gout"])));
        assert!(!active.passes_filter(&LoaderConfig::only(["diabetes"])));
    }
}

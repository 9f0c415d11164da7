//! Generic seed file parser.
//!
//! Provides a streaming parser for tab-delimited rule seed files.

use std::fs::File;
use std::io::{BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::types::{LoadError, LoadResult, LoaderConfig};

/// Trait for types that can be parsed from seed file records.
pub trait SeedRecord: Sized {
    /// Header row this file type must start with.
    const EXPECTED_COLUMNS: &'static [&'static str];

    /// Short name of the file this record comes from, for error messages.
    const FILE_TYPE: &'static str;

    /// Builds a row from one tab-delimited record.
    fn from_record(record: &StringRecord) -> LoadResult<Self>;

    /// Returns the condition code the record belongs to.
    fn condition_code(&self) -> &str;

    /// Returns true if the row's condition is selected by `config`.
    fn passes_filter(&self, config: &LoaderConfig) -> bool {
        config.includes(self.condition_code())
    }
}

/// A streaming parser for seed files.
///
/// Unlike a lenient reader, a malformed row is returned as an error rather
/// than skipped: rule data must never be partially applied.
pub struct SeedParser<R: Read, T: SeedRecord> {
    reader: Reader<R>,
    records_read: usize,
    _marker: PhantomData<T>,
}

impl<T: SeedRecord> SeedParser<BufReader<File>, T> {
    /// Opens a seed file.
    ///
    /// # Errors
    /// Fails if the file is missing, unreadable or has the wrong header row.
    pub fn from_path<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read, T: SeedRecord> SeedParser<R, T> {
    /// Wraps any reader holding seed file content.
    pub fn from_reader(reader: R) -> LoadResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(false)
            .quoting(false)
            .comment(Some(b'#'))
            .trim(csv::Trim::None)
            .from_reader(reader);

        Self::validate_headers(&mut csv_reader)?;

        Ok(Self {
            reader: csv_reader,
            records_read: 0,
            _marker: PhantomData,
        })
    }

    /// Checks the header row against `T::EXPECTED_COLUMNS`.
    fn validate_headers(reader: &mut Reader<R>) -> LoadResult<()> {
        let headers = reader.headers()?;
        let expected = T::EXPECTED_COLUMNS;

        if headers.len() != expected.len() {
            return Err(LoadError::InvalidHeader {
                expected: expected.len(),
                found: headers.len(),
            });
        }

        for (i, expected_col) in expected.iter().enumerate() {
            let found = headers.get(i).unwrap_or("");
            // Spreadsheet exports prefix a BOM
            let found = found.trim_start_matches('\u{feff}');
            if found != *expected_col {
                return Err(LoadError::UnexpectedColumn {
                    position: i,
                    expected: expected_col.to_string(),
                    found: found.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Returns the number of data rows read so far, blank rows included.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Parses all records into a Vec, stopping at the first error.
    pub fn parse_all(self) -> LoadResult<Vec<T>> {
        self.collect()
    }
}

impl<R: Read, T: SeedRecord> Iterator for SeedParser<R, T> {
    type Item = LoadResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    self.records_read += 1;

                    // Rows of empty cells
                    if record.iter().all(|f| f.trim().is_empty()) {
                        continue;
                    }

                    return Some(T::from_record(&record));
                }
                Ok(false) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Helper functions for parsing seed field values.
pub mod parse {
    use csv::StringRecord;

    use super::{LoadError, LoadResult};

    /// Returns a trimmed field, or an empty string if the column is absent.
    pub fn field(record: &StringRecord, index: usize) -> &str {
        record.get(index).unwrap_or("").trim()
    }

    /// Returns the 1-based line number of a record, or 0 if unknown.
    pub fn line(record: &StringRecord) -> u64 {
        record.position().map(|p| p.line()).unwrap_or(0)
    }

    /// Parses an `active` flag.
    pub fn boolean(value: &str) -> LoadResult<bool> {
        match value {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(LoadError::InvalidBoolean {
                value: value.to_string(),
            }),
        }
    }

    /// Parses an optional number; an empty cell means "unset".
    pub fn optional_number(value: &str) -> LoadResult<Option<f64>> {
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| LoadError::InvalidNumber {
                value: value.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boolean() {
        assert!(!parse::boolean("0").unwrap());
        assert!(parse::boolean("1").unwrap());
        assert!(parse::boolean("true").is_err());
        assert!(parse::boolean("2").is_err());
    }

    #[test]
    fn test_parse_optional_number() {
        assert_eq!(parse::optional_number("").unwrap(), None);
        assert_eq!(parse::optional_number("400").unwrap(), Some(400.0));
        assert_eq!(parse::optional_number("2.5").unwrap(), Some(2.5));
        assert!(parse::optional_number("four").is_err());
    }

    #[test]
    fn test_reader_skips_comment_rows() {
        let data = "conditionCode\tnote\n# curated 2025-03\ngout\tUống đủ nước\n";
        let mut parser =
            SeedParser::<_, crate::GuidanceRow>::from_reader(data.as_bytes()).unwrap();

        let rows: Vec<_> = parser.by_ref().collect::<LoadResult<_>>().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].condition_code, "gout");
        assert_eq!(parser.records_read(), 1);
    }

    #[test]
    fn test_parse_field_trims() {
        let mut record = StringRecord::new();
        record.push_field("  gout ");
        assert_eq!(parse::field(&record, 0), "gout");
        assert_eq!(parse::field(&record, 3), "");
    }
}

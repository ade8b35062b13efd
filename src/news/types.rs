use super::utils::is_missing;
use csv::StringRecord;

pub const BODY_COLUMN: &str = "body";
pub const SOURCE_COLUMN: &str = "source";
pub const SENTIMENT_COLUMN: &str = "sentiment";
pub const LANGUAGE_COLUMN: &str = "language";
pub const WORD_COUNT_COLUMN: &str = "word_count";

/// A CSV table of articles: one header plus rows of the same width, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

/// Which of the optional article columns the input carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalColumns {
    pub source: bool,
    pub sentiment: bool,
    pub language: bool,
}

impl Dataset {
    pub fn new(headers: StringRecord, records: Vec<StringRecord>) -> Self {
        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Values of a column with missing markers mapped to `None`.
    /// Returns `None` when the column does not exist.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(
            self.records
                .iter()
                .map(|record| record.get(idx).filter(|v| !is_missing(v)))
                .collect(),
        )
    }

    pub fn optional_columns(&self) -> OptionalColumns {
        OptionalColumns {
            source: self.has_column(SOURCE_COLUMN),
            sentiment: self.has_column(SENTIMENT_COLUMN),
            language: self.has_column(LANGUAGE_COLUMN),
        }
    }
}

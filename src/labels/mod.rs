//! Detection label table parsing.
//!
//! Reads the detector label table (CSV with `UTC` and `Species` columns),
//! drops duplicate rows, and skips rows that cannot be parsed. Uses the
//! `csv` crate for robust parsing.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::timestamp;
use crate::error::{Error, Result};

/// Accepted timestamp formats for the `UTC` column, tried in order.
const UTC_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Internal record for CSV deserialization.
#[derive(Debug, Deserialize)]
struct LabelRecord {
    #[serde(rename = "UTC")]
    utc: String,
    #[serde(rename = "Species")]
    species: String,
}

/// A short species code from the label table, e.g. `B` or `F`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesCode(String);

impl SpeciesCode {
    /// Create a species code from a raw string, trimming whitespace.
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_string())
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the code is empty after trimming.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SpeciesCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SpeciesCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// A timestamped record asserting a species was acoustically detected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DetectionLabel {
    /// Detection instant (UTC wall time, second precision).
    pub utc: NaiveDateTime,
    /// Detected species code.
    pub species: SpeciesCode,
}

impl DetectionLabel {
    /// Compact second-precision timestamp key, e.g. `20200601100230`.
    pub fn timestamp_key(&self) -> String {
        self.utc.format(timestamp::KEY_FORMAT).to_string()
    }

    /// Compact date key, e.g. `20200601`.
    pub fn date_key(&self) -> String {
        self.utc.format(timestamp::DATE_FORMAT).to_string()
    }
}

/// Parse a `UTC` column value using the accepted formats.
fn parse_utc(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    UTC_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Read the detection label table from a CSV file.
///
/// Rows that fail to deserialize or carry an unparseable timestamp or an
/// empty species code are logged and skipped; they never abort the run.
/// Duplicate (timestamp, species) pairs are removed, keeping first
/// occurrence order.
///
/// # Errors
///
/// Returns [`Error::LabelTableRead`] if the file cannot be opened and
/// [`Error::EmptyLabelTable`] if no usable rows remain after parsing.
pub fn read_label_table(path: &Path) -> Result<Vec<DetectionLabel>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::LabelTableRead {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut labels = Vec::new();
    let mut seen: HashSet<(NaiveDateTime, SpeciesCode)> = HashSet::new();

    for (line_num, result) in reader.deserialize::<LabelRecord>().enumerate() {
        // Header is line 1, first record line 2.
        let line = line_num + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping label row at line {line}: {e}");
                continue;
            }
        };

        let Some(utc) = parse_utc(&record.utc) else {
            warn!(
                "Skipping label row at line {line}: unparseable UTC timestamp '{}'",
                record.utc
            );
            continue;
        };

        let species = SpeciesCode::new(&record.species);
        if species.is_empty() {
            warn!("Skipping label row at line {line}: empty species code");
            continue;
        }

        if seen.insert((utc, species.clone())) {
            labels.push(DetectionLabel { utc, species });
        }
    }

    if labels.is_empty() {
        return Err(Error::EmptyLabelTable {
            path: path.to_path_buf(),
        });
    }

    Ok(labels)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_simple_table() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "UTC,Species").unwrap();
        writeln!(file, "2020-06-01 10:02:30,B").unwrap();
        writeln!(file, "2020-06-01 10:05:12,F").unwrap();
        file.flush().unwrap();

        let labels = read_label_table(file.path()).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].species, SpeciesCode::from("B"));
        assert_eq!(labels[0].timestamp_key(), "20200601100230");
        assert_eq!(labels[0].date_key(), "20200601");
    }

    #[test]
    fn test_duplicates_removed_keeping_order() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "UTC,Species").unwrap();
        writeln!(file, "2020-06-01 10:02:30,B").unwrap();
        writeln!(file, "2020-06-01 10:02:30,B").unwrap();
        writeln!(file, "2020-06-01 10:02:30,F").unwrap();
        file.flush().unwrap();

        let labels = read_label_table(file.path()).unwrap();
        // Same instant with a different species is not a duplicate.
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].species, SpeciesCode::from("B"));
        assert_eq!(labels[1].species, SpeciesCode::from("F"));
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "UTC,Species").unwrap();
        writeln!(file, "not-a-timestamp,B").unwrap();
        writeln!(file, "2020-06-01 10:02:30,").unwrap();
        writeln!(file, "2020-06-01 10:02:30,B").unwrap();
        file.flush().unwrap();

        let labels = read_label_table(file.path()).unwrap();
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn test_iso_t_separator_accepted() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "UTC,Species").unwrap();
        writeln!(file, "2020-06-01T10:02:30,B").unwrap();
        file.flush().unwrap();

        let labels = read_label_table(file.path()).unwrap();
        assert_eq!(labels[0].timestamp_key(), "20200601100230");
    }

    #[test]
    fn test_empty_table_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "UTC,Species").unwrap();
        file.flush().unwrap();

        let result = read_label_table(file.path());
        assert!(matches!(result, Err(Error::EmptyLabelTable { .. })));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = read_label_table(Path::new("/nonexistent/labels.csv"));
        assert!(matches!(result, Err(Error::LabelTableRead { .. })));
    }
}

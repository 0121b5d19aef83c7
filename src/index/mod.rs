//! Time interval index over recording files.
//!
//! Recording filenames encode a serial number and a start timestamp as
//! dot-separated fields (`{serial}.{YYMMDDHHMMSS}....wav`). Each file covers
//! the half-open interval `[start, start + file_duration)`; the index maps a
//! detection instant to every file whose interval contains it.

use std::ffi::OsStr;
use std::path::Path;

use chrono::{Duration, NaiveDateTime};
use tracing::warn;

use crate::constants::{filename, timestamp};
use crate::error::{Error, Result};

/// A single recording file with its decoded start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    /// Filename without directory, e.g. `A1.200601100000.wav`.
    pub filename: String,
    /// Recorder serial number (first dot-separated field).
    pub serial_number: String,
    /// Start timestamp field exactly as it appears in the filename.
    pub start_key: String,
    /// Decoded start instant.
    pub start: NaiveDateTime,
    /// Recording duration in seconds.
    pub duration_secs: u32,
}

impl AudioFile {
    /// End instant, always recomputed from `start + duration`.
    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::seconds(i64::from(self.duration_secs))
    }

    /// True if the half-open interval `[start, end)` contains `t`.
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t < self.end()
    }
}

/// Parse a recording filename into an [`AudioFile`].
///
/// The second dot-separated field must be a 12-digit `YYMMDDHHMMSS`
/// timestamp (interpreted as year `20YY`) or a full 14-digit
/// `YYYYMMDDHHMMSS` timestamp.
///
/// # Errors
///
/// Returns [`Error::FilenameParse`] when the name does not match the
/// expected encoding.
pub fn parse_audio_filename(name: &str, duration_secs: u32) -> Result<AudioFile> {
    let parse_err = |reason: &str| Error::FilenameParse {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let fields: Vec<&str> = name.split('.').collect();
    if fields.len() < 3 {
        return Err(parse_err("expected at least {serial}.{timestamp}.{ext}"));
    }

    let serial = fields[0];
    if serial.is_empty() {
        return Err(parse_err("empty serial number field"));
    }

    let start_key = fields[1];
    if !start_key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(parse_err("timestamp field is not numeric"));
    }

    let full = match start_key.len() {
        filename::SHORT_TIMESTAMP_LEN => format!("{}{start_key}", filename::CENTURY_PREFIX),
        filename::FULL_TIMESTAMP_LEN => start_key.to_string(),
        n => {
            return Err(parse_err(&format!(
                "timestamp field has {n} digits, expected 12 or 14"
            )));
        }
    };

    let start = NaiveDateTime::parse_from_str(&full, timestamp::KEY_FORMAT)
        .map_err(|_| parse_err("timestamp field is not a valid calendar instant"))?;

    Ok(AudioFile {
        filename: name.to_string(),
        serial_number: serial.to_string(),
        start_key: start_key.to_string(),
        start,
        duration_secs,
    })
}

/// Interval index over recording files.
#[derive(Debug, Clone, Default)]
pub struct TimeIndex {
    files: Vec<AudioFile>,
}

impl TimeIndex {
    /// Build an index from recording filenames.
    ///
    /// With `strict` set, the first unparseable filename aborts the build;
    /// otherwise offending names are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FilenameParse`] in strict mode.
    pub fn build<S: AsRef<str>>(
        filenames: &[S],
        duration_secs: u32,
        strict: bool,
    ) -> Result<Self> {
        let mut files = Vec::with_capacity(filenames.len());

        for name in filenames {
            match parse_audio_filename(name.as_ref(), duration_secs) {
                Ok(file) => files.push(file),
                Err(e) if strict => return Err(e),
                Err(e) => warn!("Skipping audio file: {e}"),
            }
        }

        files.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.filename.cmp(&b.filename)));

        Ok(Self { files })
    }

    /// Every file whose half-open interval contains `t`.
    ///
    /// Well-formed data yields at most one hit; overlapping recordings yield
    /// several and are surfaced downstream as ambiguous matches. Dataset
    /// sizes are small (thousands of files), so a linear scan is fine.
    pub fn find(&self, t: NaiveDateTime) -> Vec<&AudioFile> {
        self.files.iter().filter(|f| f.contains(t)).collect()
    }

    /// All indexed files, ordered by start time.
    pub fn files(&self) -> &[AudioFile] {
        &self.files
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if no files were indexed.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// List recording filenames in a directory (non-recursive).
///
/// Only files with a supported audio extension are returned, sorted by name.
pub fn list_audio_filenames(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && is_audio_file(&path) {
            if let Some(name) = path.file_name().and_then(OsStr::to_str) {
                names.push(name.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

/// Check if a file has a supported audio extension.
fn is_audio_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        filename::AUDIO_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(OsStr::new(known)))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_short_timestamp() {
        let file = parse_audio_filename("A1.200601100000.wav", 300).unwrap();
        assert_eq!(file.serial_number, "A1");
        assert_eq!(file.start_key, "200601100000");
        assert_eq!(file.start, ts(2020, 6, 1, 10, 0, 0));
        assert_eq!(file.end(), ts(2020, 6, 1, 10, 5, 0));
    }

    #[test]
    fn test_parse_full_timestamp() {
        let file = parse_audio_filename("RX7.20200601100000.site3.wav", 300).unwrap();
        assert_eq!(file.serial_number, "RX7");
        assert_eq!(file.start, ts(2020, 6, 1, 10, 0, 0));
    }

    #[test]
    fn test_parse_rejects_bad_names() {
        assert!(parse_audio_filename("noise.wav", 300).is_err());
        assert!(parse_audio_filename("A1.20060110000.wav", 300).is_err()); // 13 digits
        assert!(parse_audio_filename("A1.2006011000zz.wav", 300).is_err());
        assert!(parse_audio_filename("A1.201399250000.wav", 300).is_err()); // month 13
        assert!(parse_audio_filename(".200601100000.wav", 300).is_err());
    }

    #[test]
    fn test_build_skips_unparseable_by_default() {
        let index =
            TimeIndex::build(&["A1.200601100000.wav", "README.txt.wav"], 300, false).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_build_strict_fails_on_unparseable() {
        let result = TimeIndex::build(&["A1.200601100000.wav", "bad.wav"], 300, true);
        assert!(matches!(result, Err(Error::FilenameParse { .. })));
    }

    #[test]
    fn test_find_contains_and_misses() {
        let index = TimeIndex::build(
            &["A1.200601100000.wav", "A1.200601100500.wav"],
            300,
            true,
        )
        .unwrap();

        let hits = index.find(ts(2020, 6, 1, 10, 2, 30));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].filename, "A1.200601100000.wav");

        assert!(index.find(ts(2020, 6, 1, 9, 59, 59)).is_empty());
        assert!(index.find(ts(2020, 6, 1, 10, 10, 0)).is_empty());
    }

    #[test]
    fn test_find_boundary_is_half_open() {
        // t == end of file 1 == start of file 2 must match file 2 only.
        let index = TimeIndex::build(
            &["A1.200601100000.wav", "A1.200601100500.wav"],
            300,
            true,
        )
        .unwrap();

        let hits = index.find(ts(2020, 6, 1, 10, 5, 0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].filename, "A1.200601100500.wav");
    }

    #[test]
    fn test_find_overlapping_files_returns_both() {
        let index = TimeIndex::build(
            &["A1.200601100000.wav", "A2.200601100200.wav"],
            300,
            true,
        )
        .unwrap();

        let hits = index.find(ts(2020, 6, 1, 10, 3, 0));
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("a.wav")));
        assert!(is_audio_file(Path::new("a.FLAC")));
        assert!(is_audio_file(Path::new("a.mp3")));
        assert!(!is_audio_file(Path::new("a.txt")));
        assert!(!is_audio_file(Path::new("a")));
    }
}

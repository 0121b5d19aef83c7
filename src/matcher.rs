//! Label-to-recording matching.
//!
//! Joins each detection label against the [`TimeIndex`] and classifies the
//! outcome. Zero hits and multiple hits are first-class outcomes, not
//! errors: multiple hits indicate overlapping recording files and are
//! surfaced as a data-quality diagnostic rather than silently resolved.

use tracing::info;

use crate::index::{AudioFile, TimeIndex};
use crate::labels::DetectionLabel;

/// Outcome of associating one detection label with the recording files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// Exactly one file's `[start, end)` interval contains the label.
    Matched(AudioFile),
    /// No file contains the label.
    Unmatched,
    /// Two or more files contain the label (overlapping recordings).
    Ambiguous(Vec<AudioFile>),
}

/// Per-outcome counts for an entire label set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    /// Labels matched to exactly one file.
    pub matched: usize,
    /// Labels matched to no file.
    pub unmatched: usize,
    /// Labels matched to more than one file.
    pub ambiguous: usize,
}

impl MatchSummary {
    /// Total number of classified labels.
    pub fn total(&self) -> usize {
        self.matched + self.unmatched + self.ambiguous
    }
}

/// Match every label against the index.
///
/// Returns one `(label, result)` pair per input label, in input order.
pub fn match_labels(
    labels: &[DetectionLabel],
    index: &TimeIndex,
) -> Vec<(DetectionLabel, MatchResult)> {
    labels
        .iter()
        .map(|label| {
            let hits = index.find(label.utc);
            let result = match hits.as_slice() {
                [] => MatchResult::Unmatched,
                [file] => MatchResult::Matched((*file).clone()),
                _ => MatchResult::Ambiguous(hits.into_iter().cloned().collect()),
            };
            (label.clone(), result)
        })
        .collect()
}

/// Tally outcomes across a matched label set.
pub fn summarize(matches: &[(DetectionLabel, MatchResult)]) -> MatchSummary {
    let mut summary = MatchSummary::default();
    for (_, result) in matches {
        match result {
            MatchResult::Matched(_) => summary.matched += 1,
            MatchResult::Unmatched => summary.unmatched += 1,
            MatchResult::Ambiguous(_) => summary.ambiguous += 1,
        }
    }
    summary
}

/// Report match outcome counts. Required diagnostic output, not optional
/// debug logging.
pub fn report_summary(summary: &MatchSummary) {
    info!(
        "Label matching: {} matched, {} unmatched, {} ambiguous ({} total)",
        summary.matched,
        summary.unmatched,
        summary.ambiguous,
        summary.total()
    );
}

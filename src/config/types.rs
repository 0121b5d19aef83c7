//! Configuration type definitions.

use crate::constants::{
    DEFAULT_BACKGROUND_SAMPLE_SIZE, DEFAULT_BACKGROUND_TAG, DEFAULT_FILE_DURATION_SECS,
    DEFAULT_SPECIES_FILTER, DEFAULT_WINDOW_SECS,
};
use crate::labels::SpeciesCode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
///
/// There is no process-wide state: the whole configuration is loaded once
/// per run and passed explicitly to each component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Extraction settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Batch runner settings.
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Path to the CSV label table.
    pub labels: Option<PathBuf>,

    /// Directory of raw audio recordings.
    pub audio_dir: Option<PathBuf>,

    /// Directory for extracted spectrogram images (created if absent).
    pub output_dir: Option<PathBuf>,
}

/// Extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Duration of each recording file in seconds.
    pub file_duration_secs: u32,

    /// Spectrogram window duration in seconds.
    pub window_secs: u32,

    /// Species codes rendered from detections; others are skipped.
    pub species: Vec<SpeciesCode>,

    /// Number of background segments to sample.
    pub background_sample_size: usize,

    /// Species tag applied to background segments.
    pub background_tag: String,

    /// Seed for reproducible background sampling.
    pub seed: Option<u64>,

    /// Fail on unparseable audio filenames instead of skipping them.
    pub strict_filenames: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            file_duration_secs: DEFAULT_FILE_DURATION_SECS,
            window_secs: DEFAULT_WINDOW_SECS,
            species: DEFAULT_SPECIES_FILTER
                .iter()
                .map(|code| SpeciesCode::from(*code))
                .collect(),
            background_sample_size: DEFAULT_BACKGROUND_SAMPLE_SIZE,
            background_tag: DEFAULT_BACKGROUND_TAG.to_string(),
            seed: None,
            strict_filenames: false,
        }
    }
}

/// Batch runner settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Worker count; 0 selects the available hardware concurrency.
    pub parallelism: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_defaults() {
        let extraction = ExtractionConfig::default();
        assert_eq!(extraction.file_duration_secs, 300);
        assert_eq!(extraction.window_secs, 2);
        assert_eq!(extraction.background_sample_size, 2500);
        assert_eq!(extraction.background_tag, "N");
        assert_eq!(
            extraction.species,
            vec![SpeciesCode::from("B"), SpeciesCode::from("F")]
        );
        assert!(!extraction.strict_filenames);
    }

    #[test]
    fn test_runner_defaults_to_auto_parallelism() {
        assert_eq!(RunnerConfig::default().parallelism, 0);
    }
}

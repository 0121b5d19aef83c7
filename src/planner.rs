//! Segment planning.
//!
//! Turns matched detection labels into spectrogram render jobs and samples
//! background (non-detection) segments from recordings that carry no
//! detections. Planning is pure apart from the caller-supplied RNG, so a
//! fixed seed yields an identical job list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::warn;

use crate::constants::IMAGE_EXTENSION;
use crate::index::AudioFile;
use crate::labels::{DetectionLabel, SpeciesCode};

/// One unit of render work: a fixed-duration window of one recording.
///
/// The output filename is fully determined by
/// `{serial}.{audio_start_key}_{offset}_{tag}`, so identical jobs produce
/// identical filenames and re-running overwrites. The planner guarantees
/// job uniqueness (labels are deduplicated, background files are sampled
/// without replacement), which is what makes concurrent writes safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpectrogramJob {
    /// Full path to the source recording.
    pub source_path: PathBuf,
    /// Recorder serial number.
    pub serial_number: String,
    /// Start timestamp field as encoded in the source filename.
    pub audio_start_key: String,
    /// Window offset within the recording, in whole seconds.
    pub offset_secs: u32,
    /// Species code, or the background sentinel tag.
    pub species_tag: String,
    /// Window duration in seconds.
    pub window_secs: u32,
}

impl SpectrogramJob {
    /// Output image filename, e.g. `A1.200601100000_150_B.png`.
    pub fn output_filename(&self) -> String {
        format!(
            "{}.{}_{}_{}.{IMAGE_EXTENSION}",
            self.serial_number, self.audio_start_key, self.offset_secs, self.species_tag
        )
    }

    /// Output image path under `output_dir`.
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.output_filename())
    }
}

fn make_job(
    audio_dir: &Path,
    file: &AudioFile,
    offset_secs: u32,
    tag: &str,
    window_secs: u32,
) -> SpectrogramJob {
    SpectrogramJob {
        source_path: audio_dir.join(&file.filename),
        serial_number: file.serial_number.clone(),
        audio_start_key: file.start_key.clone(),
        offset_secs,
        species_tag: tag.to_string(),
        window_secs,
    }
}

/// Plan render jobs for matched detection labels.
///
/// Labels whose species is not in `species_filter` are skipped. For the
/// rest, `offset = floor(detection - file_start)` seconds. Detections whose
/// window would not fit inside the file (`offset > duration - window`) are
/// dropped with a warning rather than clamped; clamping would shift the
/// labeled instant out of the rendered window.
pub fn plan_detection_segments(
    matched: &[(DetectionLabel, AudioFile)],
    species_filter: &HashSet<SpeciesCode>,
    audio_dir: &Path,
    window_secs: u32,
) -> Vec<SpectrogramJob> {
    let mut jobs = Vec::new();

    for (label, file) in matched {
        if !species_filter.contains(&label.species) {
            continue;
        }

        let offset = (label.utc - file.start).num_seconds();
        let max_offset = i64::from(file.duration_secs) - i64::from(window_secs);

        if offset < 0 || offset > max_offset {
            warn!(
                "Dropping detection {} ({}): offset {offset}s leaves no {window_secs}s window in {}",
                label.timestamp_key(),
                label.species,
                file.filename
            );
            continue;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let offset_secs = offset as u32;
        jobs.push(make_job(
            audio_dir,
            file,
            offset_secs,
            label.species.as_str(),
            window_secs,
        ));
    }

    jobs
}

/// Plan background (non-detection) render jobs.
///
/// Candidates are the recordings in `all_files` whose filename does not
/// appear in `labeled_files`. Up to `sample_size` candidates are drawn
/// uniformly without replacement; each sampled file gets one uniform
/// integer offset in `[0, duration - window]` INCLUSIVE, so the window
/// always fits inside the file.
pub fn plan_background_segments(
    all_files: &[AudioFile],
    labeled_files: &HashSet<String>,
    audio_dir: &Path,
    sample_size: usize,
    window_secs: u32,
    background_tag: &str,
    rng: &mut StdRng,
) -> Vec<SpectrogramJob> {
    let candidates: Vec<&AudioFile> = all_files
        .iter()
        .filter(|f| !labeled_files.contains(&f.filename))
        .filter(|f| {
            if f.duration_secs < window_secs {
                warn!(
                    "Skipping background candidate {}: shorter than the {window_secs}s window",
                    f.filename
                );
                return false;
            }
            true
        })
        .collect();

    let sampled: Vec<&&AudioFile> = candidates
        .choose_multiple(rng, sample_size.min(candidates.len()))
        .collect();

    sampled
        .into_iter()
        .map(|file| {
            let max_offset = file.duration_secs - window_secs;
            let offset = rng.random_range(0..=max_offset);
            make_job(audio_dir, file, offset, background_tag, window_secs)
        })
        .collect()
}

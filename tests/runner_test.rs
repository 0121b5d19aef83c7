//! Batch runner tests: per-job failure isolation and truncated reads.

#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use spectract::planner::SpectrogramJob;
use spectract::runner::run_all;

fn write_silence_wav(path: &Path, sample_rate: u32, secs: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..sample_rate * secs {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn job(source: PathBuf, offset_secs: u32, tag: &str) -> SpectrogramJob {
    SpectrogramJob {
        source_path: source,
        serial_number: "A1".to_string(),
        audio_start_key: "200601100000".to_string(),
        offset_secs,
        species_tag: tag.to_string(),
        window_secs: 2,
    }
}

#[test]
fn test_truncated_file_fails_job_but_not_batch() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("A1.200601100000.wav");
    // Only 10 seconds of audio on disk.
    write_silence_wav(&audio, 2000, 10);

    let jobs = vec![
        job(audio.clone(), 3, "B"),   // fits
        job(audio.clone(), 150, "F"), // beyond end of file
    ];

    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();
    let report = run_all(jobs, &out, 1, false).unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(
        report.failed[0].1,
        spectract::Error::TruncatedAudio { .. }
    ));
    assert!(out.join("A1.200601100000_3_B.png").is_file());
    assert!(!out.join("A1.200601100000_150_F.png").exists());
}

#[test]
fn test_window_ending_exactly_at_eof_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("A1.200601100000.wav");
    write_silence_wav(&audio, 2000, 10);

    // Offset 8 with a 2s window reads samples [16000, 20000) of 20000.
    let report = run_all(vec![job(audio, 8, "B")], dir.path(), 1, false).unwrap();

    assert_eq!(report.succeeded, 1);
    assert!(report.failed.is_empty());
}

#[test]
fn test_parallel_batch_renders_all_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("A1.200601100000.wav");
    write_silence_wav(&audio, 2000, 30);

    let jobs: Vec<SpectrogramJob> = (0..8).map(|i| job(audio.clone(), i * 3, "N")).collect();

    let report = run_all(jobs, dir.path(), 4, false).unwrap();

    assert_eq!(report.succeeded, 8);
    for i in 0..8u32 {
        assert!(dir
            .path()
            .join(format!("A1.200601100000_{}_N.png", i * 3))
            .is_file());
    }
}

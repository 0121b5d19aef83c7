//! Spectract - spectrogram training-data extraction tool.
//!
//! Aligns timestamped detection labels with raw multi-file audio recordings
//! and renders fixed-duration spectrogram images for labeled detection
//! windows and randomly sampled background windows.

#![warn(missing_docs)]
#![allow(clippy::print_stdout)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod index;
pub mod labels;
pub mod matcher;
pub mod output;
pub mod planner;
pub mod render;
pub mod runner;

use std::collections::HashSet;
use std::time::Instant;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use cli::{Cli, Command, ExtractArgs};
use config::{Config, config_file_path, load_default_config, save_default_config};
use index::TimeIndex;
use labels::SpeciesCode;
use matcher::MatchResult;

pub use error::{Error, Result};

/// Main entry point for the spectract CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.extract.verbose, cli.extract.quiet);

    if let Some(command) = cli.command {
        return handle_command(command);
    }

    let config = resolve_config(&cli)?;
    config::validate_config(&config)?;

    let progress_enabled = !cli.extract.quiet && !cli.extract.no_progress;
    extract(&config, progress_enabled)
}

/// Merge the config file with CLI/env overrides into one explicit config.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = load_default_config()?;
    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    let args: &ExtractArgs = &cli.extract;

    if let Some(labels) = &cli.labels {
        config.paths.labels = Some(labels.clone());
    }
    if let Some(audio_dir) = &args.audio_dir {
        config.paths.audio_dir = Some(audio_dir.clone());
    }
    if let Some(output_dir) = &args.output_dir {
        config.paths.output_dir = Some(output_dir.clone());
    }
    if let Some(duration) = args.file_duration {
        config.extraction.file_duration_secs = duration;
    }
    if let Some(window) = args.window {
        config.extraction.window_secs = window;
    }
    if let Some(species) = &args.species {
        config.extraction.species = species
            .iter()
            .map(|code| SpeciesCode::from(code.as_str()))
            .collect();
    }
    if let Some(sample_size) = args.sample_size {
        config.extraction.background_sample_size = sample_size;
    }
    if let Some(seed) = args.seed {
        config.extraction.seed = Some(seed);
    }
    if let Some(jobs) = args.jobs {
        config.runner.parallelism = jobs;
    }
    if args.strict_filenames {
        config.extraction.strict_filenames = true;
    }
}

/// Run the full extraction pipeline with the given configuration.
pub fn extract(config: &Config, progress_enabled: bool) -> Result<()> {
    let total_start = Instant::now();
    let extraction = &config.extraction;

    // Validation guarantees these are set.
    let labels_path = config.paths.labels.as_deref().ok_or_else(missing_path)?;
    let audio_dir = config.paths.audio_dir.as_deref().ok_or_else(missing_path)?;
    let output_dir = config.paths.output_dir.as_deref().ok_or_else(missing_path)?;

    // Load labels.
    let labels = labels::read_label_table(labels_path)?;
    info!("Loaded {} detection labels from {}", labels.len(), labels_path.display());

    // Index recordings.
    let filenames = index::list_audio_filenames(audio_dir)?;
    let time_index = TimeIndex::build(
        &filenames,
        extraction.file_duration_secs,
        extraction.strict_filenames,
    )?;
    if time_index.is_empty() {
        return Err(Error::NoValidAudioFiles {
            dir: audio_dir.to_path_buf(),
        });
    }
    info!(
        "Indexed {} of {} audio files in {}",
        time_index.len(),
        filenames.len(),
        audio_dir.display()
    );

    // Match labels to recordings.
    let matches = matcher::match_labels(&labels, &time_index);
    let summary = matcher::summarize(&matches);
    matcher::report_summary(&summary);

    let matched: Vec<_> = matches
        .iter()
        .filter_map(|(label, result)| match result {
            MatchResult::Matched(file) => Some((label.clone(), file.clone())),
            _ => None,
        })
        .collect();

    // Any file containing a detection is off-limits for background sampling,
    // including files only named by ambiguous matches.
    let labeled_files: HashSet<String> = matches
        .iter()
        .flat_map(|(_, result)| match result {
            MatchResult::Matched(file) => std::slice::from_ref(file),
            MatchResult::Ambiguous(files) => files.as_slice(),
            MatchResult::Unmatched => &[],
        })
        .map(|file| file.filename.clone())
        .collect();

    // Plan jobs.
    let species_filter: HashSet<SpeciesCode> = extraction.species.iter().cloned().collect();
    let mut jobs = planner::plan_detection_segments(
        &matched,
        &species_filter,
        audio_dir,
        extraction.window_secs,
    );
    let detection_jobs = jobs.len();

    let mut rng = extraction
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let background = planner::plan_background_segments(
        time_index.files(),
        &labeled_files,
        audio_dir,
        extraction.background_sample_size,
        extraction.window_secs,
        &extraction.background_tag,
        &mut rng,
    );
    info!(
        "Planned {} detection and {} background segments",
        detection_jobs,
        background.len()
    );
    jobs.extend(background);

    // Render.
    std::fs::create_dir_all(output_dir).map_err(|e| Error::OutputDirCreateFailed {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let report = runner::run_all(jobs, output_dir, config.runner.parallelism, progress_enabled)?;

    // End-of-run summary.
    for (job, error) in &report.failed {
        warn!("Failed to render {}: {error}", job.output_filename());
    }
    let total_duration = total_start.elapsed().as_secs_f64();
    info!(
        "Complete: {} rendered, {} failed in {:.2}s",
        report.succeeded,
        report.failed.len(),
        total_duration
    );
    if report.succeeded > 0 && total_duration > 0.0 {
        #[allow(clippy::cast_precision_loss)]
        let rate = report.succeeded as f64 / total_duration;
        info!("Performance: {rate:.1} segments/sec overall");
    }

    Ok(())
}

fn missing_path() -> Error {
    Error::Internal {
        message: "path missing after validation".to_string(),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    fmt().with_env_filter(filter).init();
}

fn handle_command(command: Command) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action),
    }
}

fn handle_config_command(action: cli::ConfigAction) -> Result<()> {
    use cli::ConfigAction;

    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let saved_path = save_default_config(&Config::default())?;
                println!("Created configuration file: {}", saved_path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            println!("{config:#?}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

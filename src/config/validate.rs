//! Configuration validation.
//!
//! Configuration-time failures are the only fatal errors in a run; they
//! abort before any job is scheduled.

use crate::config::Config;
use crate::constants::MAX_WINDOW_SECS;
use crate::error::{Error, Result};

/// Validate the resolved configuration.
///
/// # Errors
///
/// Returns [`Error::ConfigValidation`] on the first violation found.
pub fn validate_config(config: &Config) -> Result<()> {
    let Some(labels) = config.paths.labels.as_deref() else {
        return Err(validation(
            "no label table specified (positional argument or paths.labels in config)",
        ));
    };
    if !labels.is_file() {
        return Err(validation(&format!(
            "label table does not exist: {}",
            labels.display()
        )));
    }

    let Some(audio_dir) = config.paths.audio_dir.as_deref() else {
        return Err(validation(
            "no audio directory specified (--audio-dir or paths.audio_dir in config)",
        ));
    };
    if !audio_dir.is_dir() {
        return Err(validation(&format!(
            "audio directory does not exist: {}",
            audio_dir.display()
        )));
    }

    if config.paths.output_dir.is_none() {
        return Err(validation(
            "no output directory specified (--output-dir or paths.output_dir in config)",
        ));
    }

    let extraction = &config.extraction;
    if extraction.window_secs == 0 {
        return Err(validation("window_secs must be at least 1"));
    }
    // Same bound as the CLI validator; config files must not bypass it.
    if extraction.window_secs > MAX_WINDOW_SECS {
        return Err(validation(&format!(
            "window_secs must be between 1 and {MAX_WINDOW_SECS}, got {}",
            extraction.window_secs
        )));
    }
    if extraction.file_duration_secs < extraction.window_secs {
        return Err(validation(&format!(
            "file_duration_secs ({}) must be at least window_secs ({})",
            extraction.file_duration_secs, extraction.window_secs
        )));
    }
    if extraction.species.is_empty() {
        return Err(validation("species filter must name at least one code"));
    }
    if extraction.background_tag.trim().is_empty() {
        return Err(validation("background_tag must not be empty"));
    }

    Ok(())
}

fn validation(message: &str) -> Error {
    Error::ConfigValidation {
        message: message.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config(dir: &std::path::Path) -> Config {
        let labels = dir.join("labels.csv");
        let mut file = std::fs::File::create(&labels).unwrap();
        writeln!(file, "UTC,Species").unwrap();

        let mut config = Config::default();
        config.paths.labels = Some(labels);
        config.paths.audio_dir = Some(dir.to_path_buf());
        config.paths.output_dir = Some(dir.join("out"));
        config
    }

    #[test]
    fn test_valid_config_passes() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_config(&valid_config(dir.path())).is_ok());
    }

    #[test]
    fn test_missing_label_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(dir.path());
        config.paths.labels = Some(dir.path().join("missing.csv"));

        assert!(matches!(
            validate_config(&config),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_missing_audio_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(dir.path());
        config.paths.audio_dir = Some(dir.path().join("nope"));

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_window_larger_than_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(dir.path());
        config.extraction.window_secs = 600;

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_window_beyond_cap_fails_even_within_file_duration() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(dir.path());
        // 61 fits inside the 300s file duration but exceeds the window cap.
        config.extraction.window_secs = 61;

        assert!(matches!(
            validate_config(&config),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_empty_species_filter_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(dir.path());
        config.extraction.species.clear();

        assert!(validate_config(&config).is_err());
    }
}

//! CLI argument validators.
//!
//! Shared validation functions for CLI argument parsing.

use crate::constants::MAX_WINDOW_SECS;

/// Parse and validate a positive (non-zero) u32 value.
pub fn parse_positive_u32(s: &str) -> Result<u32, String> {
    let value: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid positive integer"))?;

    if value == 0 {
        return Err("value must be at least 1".to_string());
    }

    Ok(value)
}

/// Parse and validate the spectrogram window duration in seconds.
pub fn parse_window_secs(s: &str) -> Result<u32, String> {
    let value = parse_positive_u32(s)?;

    if value > MAX_WINDOW_SECS {
        return Err(format!(
            "window must be between 1 and {MAX_WINDOW_SECS} seconds, got {value}"
        ));
    }

    Ok(value)
}

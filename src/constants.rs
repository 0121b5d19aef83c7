//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "spectract";

/// Default duration of each recording file in seconds (5 minutes).
pub const DEFAULT_FILE_DURATION_SECS: u32 = 300;

/// Default spectrogram window duration in seconds.
pub const DEFAULT_WINDOW_SECS: u32 = 2;

/// Longest accepted spectrogram window in seconds. Anything beyond a minute
/// is not a short segment anymore and almost certainly a mixed-up setting.
pub const MAX_WINDOW_SECS: u32 = 60;

/// Default number of background (non-detection) segments to sample.
pub const DEFAULT_BACKGROUND_SAMPLE_SIZE: usize = 2500;

/// Default species tag for background segments.
pub const DEFAULT_BACKGROUND_TAG: &str = "N";

/// Default detection species filter.
pub const DEFAULT_SPECIES_FILTER: &[&str] = &["B", "F"];

/// Timestamp encoding in audio filenames.
pub mod filename {
    /// Length of the compact `YYMMDDHHMMSS` timestamp field.
    pub const SHORT_TIMESTAMP_LEN: usize = 12;

    /// Length of the full `YYYYMMDDHHMMSS` timestamp field.
    pub const FULL_TIMESTAMP_LEN: usize = 14;

    /// Century prefix applied to 12-digit timestamps.
    pub const CENTURY_PREFIX: &str = "20";

    /// Supported audio file extensions.
    pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac", "mp3"];
}

/// Timestamp key formats (chrono strftime).
pub mod timestamp {
    /// Compact second-precision key, e.g. `20200601100230`.
    pub const KEY_FORMAT: &str = "%Y%m%d%H%M%S";

    /// Compact date key, e.g. `20200601`.
    pub const DATE_FORMAT: &str = "%Y%m%d";
}

/// Spectrogram rendering parameters.
pub mod spectrogram {
    /// FFT size in samples.
    pub const FFT_SIZE: usize = 512;

    /// Hop between successive STFT frames in samples.
    pub const HOP_SIZE: usize = 128;

    /// Output image width in pixels (time axis).
    pub const IMAGE_WIDTH: u32 = 512;

    /// Output image height in pixels (frequency axis).
    pub const IMAGE_HEIGHT: u32 = 256;

    /// Dynamic range floor in dB below the per-image peak.
    pub const FLOOR_DB: f32 = -80.0;
}

/// Spectrogram image file extension.
pub const IMAGE_EXTENSION: &str = "png";

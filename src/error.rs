//! Error types for spectract.

/// Result type alias for spectract operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for spectract.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Failed to read the label table.
    #[error("failed to read label table '{path}'")]
    LabelTableRead {
        /// Path to the label table.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Label table contained no usable rows.
    #[error("label table '{path}' contains no usable detection labels")]
    EmptyLabelTable {
        /// Path to the label table.
        path: std::path::PathBuf,
    },

    /// No valid audio files found.
    #[error("no audio files with parseable timestamps found in '{dir}'")]
    NoValidAudioFiles {
        /// Audio directory that was scanned.
        dir: std::path::PathBuf,
    },

    /// Audio filename does not match the expected timestamp encoding.
    #[error("unparseable audio filename '{name}': {reason}")]
    FilenameParse {
        /// The offending filename.
        name: String,
        /// Why it could not be parsed.
        reason: String,
    },

    /// Failed to open audio file.
    #[error("failed to open audio file '{path}'")]
    AudioOpen {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to decode audio.
    #[error("failed to decode audio from '{path}'")]
    AudioDecode {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No audio tracks found.
    #[error("no audio tracks found in '{path}'")]
    NoAudioTracks {
        /// Path to the audio file.
        path: std::path::PathBuf,
    },

    /// Audio file ended before the requested window could be read.
    #[error(
        "truncated read from '{path}': wanted {expected} samples at offset {offset_secs}s, file has {available}"
    )]
    TruncatedAudio {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Offset of the requested window in seconds.
        offset_secs: u32,
        /// Number of samples requested.
        expected: usize,
        /// Number of samples actually available from the offset.
        available: usize,
    },

    /// Failed to encode or write a spectrogram image.
    #[error("failed to write spectrogram image '{path}'")]
    Render {
        /// Path to the image file.
        path: std::path::PathBuf,
        /// Underlying image error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

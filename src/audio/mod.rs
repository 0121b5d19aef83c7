//! Audio decoding and window extraction.

mod decode;

pub use decode::{DecodedAudio, decode_audio_file, read_window};

//! Audio decoding using symphonia.
//!
//! Recordings are decoded in full to mono f32, then the requested window is
//! sliced out. Files are five minutes at moderate sample rates, so a full
//! decode is cheap and avoids codec-dependent seek accuracy issues. Every
//! decoder resource is scoped to the call.

use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoded audio data.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Audio samples as mono f32 in range [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

/// Read exactly `window_secs` seconds of mono samples starting at
/// `offset_secs`.
///
/// # Errors
///
/// Returns [`Error::TruncatedAudio`] if the file holds fewer samples than
/// the requested window needs; a short window is never returned silently.
pub fn read_window(path: &Path, offset_secs: u32, window_secs: u32) -> Result<DecodedAudio> {
    let decoded = decode_audio_file(path)?;

    let start = offset_secs as usize * decoded.sample_rate as usize;
    let wanted = window_secs as usize * decoded.sample_rate as usize;
    let available = decoded.samples.len().saturating_sub(start);

    if available < wanted {
        return Err(Error::TruncatedAudio {
            path: path.to_path_buf(),
            offset_secs,
            expected: wanted,
            available,
        });
    }

    Ok(DecodedAudio {
        samples: decoded.samples[start..start + wanted].to_vec(),
        sample_rate: decoded.sample_rate,
    })
}

/// Decode an audio file to mono f32 samples.
pub fn decode_audio_file(path: &Path) -> Result<DecodedAudio> {
    let file = File::open(path).map_err(|e| Error::AudioOpen {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::AudioOpen {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::NoAudioTracks {
            path: path.to_path_buf(),
        })?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::AudioDecode {
            path: path.to_path_buf(),
            source: "missing sample rate".into(),
        })?;
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(Error::AudioDecode {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet).map_err(|e| Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        mix_to_mono(&decoded, channels, &mut samples).map_err(|reason| Error::AudioDecode {
            path: path.to_path_buf(),
            source: reason.into(),
        })?;
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

/// Append a decoded buffer to `output` as mono, averaging channels.
///
/// Unsupported sample formats are a hard error: silently skipping packets
/// would later surface as a misleading truncated-read failure.
fn mix_to_mono(
    buffer: &AudioBufferRef,
    channels: usize,
    output: &mut Vec<f32>,
) -> std::result::Result<(), String> {
    match buffer {
        AudioBufferRef::F32(buf) => {
            mix_frames(buf.frames(), channels, output, |ch, i| buf.chan(ch)[i]);
        }
        AudioBufferRef::S16(buf) => {
            const NORM: f32 = 32768.0;
            mix_frames(buf.frames(), channels, output, |ch, i| {
                f32::from(buf.chan(ch)[i]) / NORM
            });
        }
        AudioBufferRef::S32(buf) => {
            const NORM: f32 = 2_147_483_648.0;
            #[allow(clippy::cast_precision_loss)]
            mix_frames(buf.frames(), channels, output, |ch, i| {
                buf.chan(ch)[i] as f32 / NORM
            });
        }
        other => {
            return Err(format!(
                "unsupported sample format (expected f32, s16, or s32 PCM, got {})",
                buffer_format_name(other)
            ));
        }
    }
    Ok(())
}

fn buffer_format_name(buffer: &AudioBufferRef) -> &'static str {
    match buffer {
        AudioBufferRef::U8(_) => "u8",
        AudioBufferRef::U16(_) => "u16",
        AudioBufferRef::U24(_) => "u24",
        AudioBufferRef::U32(_) => "u32",
        AudioBufferRef::S8(_) => "s8",
        AudioBufferRef::S16(_) => "s16",
        AudioBufferRef::S24(_) => "s24",
        AudioBufferRef::S32(_) => "s32",
        AudioBufferRef::F32(_) => "f32",
        AudioBufferRef::F64(_) => "f64",
    }
}

fn mix_frames<F: Fn(usize, usize) -> f32>(
    frames: usize,
    channels: usize,
    output: &mut Vec<f32>,
    sample_at: F,
) {
    output.reserve(frames);
    if channels == 1 {
        output.extend((0..frames).map(|i| sample_at(0, i)));
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    let scale = 1.0 / channels as f32;
    for i in 0..frames {
        let sum: f32 = (0..channels).map(|ch| sample_at(ch, i)).sum();
        output.push(sum * scale);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, bits_per_sample: u16, sample_rate: u32, secs: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..sample_rate * secs {
            writer.write_sample(0i32).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decode_s16_wav_yields_expected_sample_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A1.200601100000.wav");
        write_wav(&path, 16, 2000, 3);

        let decoded = decode_audio_file(&path).unwrap();
        assert_eq!(decoded.sample_rate, 2000);
        assert_eq!(decoded.samples.len(), 6000);
    }

    #[test]
    fn test_unsupported_sample_format_is_explicit_decode_error() {
        // 24-bit PCM is not mixed down; the failure must name the format
        // instead of surfacing later as a truncated read.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A1.200601100000.wav");
        write_wav(&path, 24, 2000, 1);

        let result = decode_audio_file(&path);
        assert!(matches!(result, Err(Error::AudioDecode { .. })));
    }
}

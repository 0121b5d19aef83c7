//! Spectrogram rendering.
//!
//! Computes a Hann-windowed STFT over a sample window and rasterizes the
//! magnitude spectrum into a fixed-size PNG: time on the x axis, frequency
//! on the y axis (low at the bottom), no axes or borders. Pixels below the
//! dynamic-range floor are fully transparent.

use std::f32::consts::PI;
use std::path::Path;

use image::{Rgba, RgbaImage};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

use crate::constants::spectrogram::{FFT_SIZE, FLOOR_DB, HOP_SIZE, IMAGE_HEIGHT, IMAGE_WIDTH};
use crate::error::{Error, Result};

/// Magnitude floor to keep log10 finite on silent bins.
const EPSILON: f32 = 1e-10;

/// STFT magnitude columns in dB. One inner vector per frame, one entry per
/// frequency bin (`FFT_SIZE / 2` bins, DC first).
pub fn compute_stft_db(samples: &[f32]) -> Vec<Vec<f32>> {
    // Zero-pad very short windows up to one full frame.
    let padded;
    let samples = if samples.len() < FFT_SIZE {
        padded = {
            let mut v = samples.to_vec();
            v.resize(FFT_SIZE, 0.0);
            v
        };
        &padded[..]
    } else {
        samples
    };

    #[allow(clippy::cast_precision_loss)]
    let hann: Vec<f32> = (0..FFT_SIZE)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / FFT_SIZE as f32).cos()))
        .collect();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);

    let num_frames = (samples.len() - FFT_SIZE) / HOP_SIZE + 1;
    let bins = FFT_SIZE / 2;
    let mut columns = Vec::with_capacity(num_frames);
    let mut buf: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); FFT_SIZE];

    for frame in 0..num_frames {
        let start = frame * HOP_SIZE;
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = Complex::new(samples[start + i] * hann[i], 0.0);
        }
        fft.process(&mut buf);

        let column: Vec<f32> = buf[..bins]
            .iter()
            .map(|c| 20.0 * (c.norm() + EPSILON).log10())
            .collect();
        columns.push(column);
    }

    columns
}

/// Render a sample window to a fixed-size spectrogram PNG at `out_path`.
///
/// The dB scale is normalized per image to its own peak; anything more than
/// [`FLOOR_DB`] below the peak is transparent. All FFT and pixel buffers
/// are scoped to this call.
///
/// # Errors
///
/// Returns [`Error::Render`] if the PNG cannot be encoded or written.
pub fn render_spectrogram(samples: &[f32], out_path: &Path) -> Result<()> {
    let columns = compute_stft_db(samples);
    let image = rasterize(&columns);

    image.save(out_path).map_err(|e| Error::Render {
        path: out_path.to_path_buf(),
        source: e,
    })
}

/// Map dB columns onto the fixed image grid by nearest-neighbor lookup.
fn rasterize(columns: &[Vec<f32>]) -> RgbaImage {
    let peak = columns
        .iter()
        .flatten()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max);

    let frames = columns.len().max(1);
    let bins = columns.first().map_or(1, Vec::len);

    RgbaImage::from_fn(IMAGE_WIDTH, IMAGE_HEIGHT, |x, y| {
        let frame = (x as usize * frames) / IMAGE_WIDTH as usize;
        // Low frequencies at the bottom of the image.
        let bin = ((IMAGE_HEIGHT - 1 - y) as usize * bins) / IMAGE_HEIGHT as usize;

        let db = columns
            .get(frame)
            .and_then(|c| c.get(bin))
            .copied()
            .unwrap_or(f32::NEG_INFINITY);

        // 0 at the floor, 1 at the per-image peak.
        let t = 1.0 - (peak - db) / -FLOOR_DB;
        if t <= 0.0 {
            Rgba([0, 0, 0, 0])
        } else {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let v = (t.min(1.0) * 255.0) as u8;
            Rgba([v, v, v, 255])
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;

    fn tone(freq: f32, sample_rate: u32, secs: u32) -> Vec<f32> {
        let n = (sample_rate * secs) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_stft_peak_bin_tracks_tone_frequency() {
        // 1 kHz at 8 kHz sample rate: bin = 1000 / (8000 / 512) = 64.
        let samples = tone(1000.0, 8000, 2);
        let columns = compute_stft_db(&samples);
        assert!(!columns.is_empty());

        let mid = &columns[columns.len() / 2];
        let peak_bin = mid
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert!((peak_bin as i64 - 64).abs() <= 1, "peak at bin {peak_bin}");
    }

    #[test]
    fn test_stft_handles_window_shorter_than_fft() {
        let columns = compute_stft_db(&[0.1; 100]);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].len(), FFT_SIZE / 2);
    }

    #[test]
    fn test_render_writes_fixed_size_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.png");

        render_spectrogram(&tone(500.0, 8000, 2), &path).unwrap();

        let (width, height) = image::image_dimensions(&path).unwrap();
        assert_eq!(width, IMAGE_WIDTH);
        assert_eq!(height, IMAGE_HEIGHT);
    }

    #[test]
    fn test_render_fails_on_unwritable_path() {
        let result = render_spectrogram(&[0.0; 1024], Path::new("/nonexistent/dir/out.png"));
        assert!(matches!(result, Err(Error::Render { .. })));
    }
}

//! Spectral front-end: short-time Fourier transform and its inverse.
//!
//! [`forward`] and [`inverse`] are the fixed-parameter pair used by the
//! separation pipeline (periodic Hann window, hop of a quarter frame,
//! centered frames). [`stft`] and [`istft`] expose the same machinery with an
//! explicit [`StftConfig`].

use crate::fft::FftPlan;
use crate::utils::{fix_length, fix_length_in_place, frame_count, valid_audio};
use crate::window;
use ndarray::{Array2, Axis};
use num_complex::Complex32;

#[derive(Debug, Clone)]
pub struct StftConfig {
    pub n_fft: usize,
    pub hop_length: usize,
    pub center: bool,
    pub window: Vec<f32>,
}

impl StftConfig {
    /// Hann window of `frame_size` samples, hop of `frame_size / 4`, centered frames.
    pub fn for_frame_size(frame_size: usize) -> Self {
        Self {
            n_fft: frame_size,
            hop_length: frame_size / 4,
            center: true,
            window: window::hann(frame_size),
        }
    }

    /// Number of frequency bins produced per frame.
    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }
}

impl Default for StftConfig {
    fn default() -> Self {
        Self::for_frame_size(2048)
    }
}

/// Check a frame size for use with [`forward`] / [`inverse`].
///
/// The frame must be even (so the bin count determines it uniquely) and at
/// least 4 samples (so the quarter-frame hop is nonzero).
pub fn validate_frame_size(frame_size: usize) -> crate::Result<()> {
    if frame_size < 4 || frame_size % 2 != 0 {
        return Err(crate::Error::Configuration {
            name: "frame_size",
            value: frame_size.to_string(),
            reason: "must be an even integer of at least 4",
        });
    }
    Ok(())
}

fn check_config(config: &StftConfig) -> crate::Result<()> {
    if config.n_fft == 0 {
        return Err(crate::Error::Configuration {
            name: "n_fft",
            value: "0".to_string(),
            reason: "must be > 0",
        });
    }
    if config.hop_length == 0 {
        return Err(crate::Error::Configuration {
            name: "hop_length",
            value: "0".to_string(),
            reason: "must be > 0",
        });
    }
    if config.window.len() > config.n_fft {
        return Err(crate::Error::Configuration {
            name: "window",
            value: config.window.len().to_string(),
            reason: "window must not be longer than n_fft",
        });
    }
    Ok(())
}

fn pad_window(window: &[f32], n_fft: usize) -> Vec<f32> {
    if window.len() == n_fft {
        return window.to_vec();
    }
    let mut padded = vec![0.0f32; n_fft];
    let start = (n_fft - window.len()) / 2;
    padded[start..start + window.len()].copy_from_slice(window);
    padded
}

fn pad_center(y: &[f32], n_fft: usize, center: bool) -> Vec<f32> {
    if !center {
        return y.to_vec();
    }
    let pad = n_fft / 2;
    let mut out = vec![0.0f32; y.len() + 2 * pad];
    out[pad..pad + y.len()].copy_from_slice(y);
    out
}

#[inline]
fn compute_frame(
    frame: usize,
    padded: &[f32],
    window: &[f32],
    fft: &FftPlan,
    hop_length: usize,
) -> crate::Result<Vec<Complex32>> {
    let start = frame * hop_length;
    let mut buffer: Vec<f32> = window
        .iter()
        .enumerate()
        .map(|(i, &w)| padded.get(start + i).copied().unwrap_or(0.0) * w)
        .collect();
    let mut spectrum = fft.make_spectrum();
    fft.forward(&mut buffer, &mut spectrum)?;
    Ok(spectrum)
}

/// Compute the Short-Time Fourier Transform (STFT).
///
/// # Arguments
/// * `y` - Input audio signal
/// * `config` - STFT configuration (FFT size, hop length, window, centering)
///
/// # Returns
/// Complex STFT matrix of shape (n_bins, n_frames) where n_bins = n_fft/2 + 1
///
/// # Errors
/// Returns an error if the audio is empty or non-finite, or if n_fft/hop_length is zero.
pub fn stft(y: &[f32], config: &StftConfig) -> crate::Result<Array2<Complex32>> {
    valid_audio(y)?;
    check_config(config)?;

    let window = pad_window(&config.window, config.n_fft);
    let padded = pad_center(y, config.n_fft, config.center);
    let n_frames = frame_count(padded.len(), config.n_fft, config.hop_length);
    let n_bins = config.n_bins();
    let fft = FftPlan::new(config.n_fft);

    let frames: Vec<Vec<Complex32>> = {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..n_frames)
                .into_par_iter()
                .map(|frame| compute_frame(frame, &padded, &window, &fft, config.hop_length))
                .collect::<crate::Result<_>>()?
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..n_frames)
                .map(|frame| compute_frame(frame, &padded, &window, &fft, config.hop_length))
                .collect::<crate::Result<_>>()?
        }
    };

    Ok(Array2::from_shape_fn((n_bins, n_frames), |(f, t)| {
        frames[t][f]
    }))
}

/// Compute the Inverse Short-Time Fourier Transform (ISTFT).
///
/// Reconstructs a time-domain signal by weighted overlap-add, normalized by
/// the squared-window envelope.
///
/// # Arguments
/// * `stft_matrix` - Complex STFT matrix (n_bins x n_frames)
/// * `config` - STFT configuration (must match the forward STFT)
/// * `length` - Optional output length; the result is truncated or zero-padded to it
///
/// # Errors
/// Returns an error if the STFT matrix is empty or its bin count does not
/// match `config.n_fft`.
pub fn istft(
    stft_matrix: &Array2<Complex32>,
    config: &StftConfig,
    length: Option<usize>,
) -> crate::Result<Vec<f32>> {
    let (n_bins, n_frames) = stft_matrix.dim();
    if n_bins == 0 || n_frames == 0 {
        return Err(crate::Error::EmptySpectrogram);
    }
    check_config(config)?;
    if n_bins != config.n_bins() {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("{} frequency bins (n_fft = {})", config.n_bins(), config.n_fft),
            got: format!("{n_bins} frequency bins"),
        });
    }

    let n_fft = config.n_fft;
    let window = pad_window(&config.window, n_fft);
    let envelope = window::window_sumsquare(&window, n_frames, config.hop_length);
    let fft = FftPlan::new(n_fft);

    let mut y = vec![0.0f32; envelope.len()];
    let mut spectrum = fft.make_spectrum();
    let mut frame_buf = vec![0.0f32; n_fft];

    for (frame, column) in stft_matrix.axis_iter(Axis(1)).enumerate() {
        for (dst, &src) in spectrum.iter_mut().zip(column.iter()) {
            *dst = src;
        }
        fft.inverse(&mut spectrum, &mut frame_buf)?;

        let start = frame * config.hop_length;
        for (i, (&sample, &w)) in frame_buf.iter().zip(window.iter()).enumerate() {
            y[start + i] += sample * w;
        }
    }

    for (v, &norm) in y.iter_mut().zip(envelope.iter()) {
        if norm > 1e-8 {
            *v /= norm;
        }
    }

    if config.center {
        let pad = (n_fft / 2).min(y.len());
        y.drain(..pad);
        if length.is_none() {
            let keep = y.len().saturating_sub(n_fft / 2);
            y.truncate(keep);
        }
    }

    if let Some(len) = length {
        fix_length_in_place(&mut y, len, 0.0);
    }
    Ok(y)
}

/// Transform `signal` into a complex spectrogram with frames of `frame_size` samples.
///
/// The signal is first zero-extended by `frame_size / 2` samples so that
/// [`inverse`] can recover every original sample without truncation.
///
/// # Example
/// ```
/// use hpsep::spectrum::{forward, inverse};
///
/// let signal: Vec<f32> = (0..1000).map(|i| (i as f32 * 0.05).sin()).collect();
/// let spec = forward(&signal, 256).unwrap();
/// assert_eq!(spec.nrows(), 129);
///
/// let restored = inverse(&spec, signal.len()).unwrap();
/// assert_eq!(restored.len(), signal.len());
/// ```
pub fn forward(signal: &[f32], frame_size: usize) -> crate::Result<Array2<Complex32>> {
    validate_frame_size(frame_size)?;
    valid_audio(signal)?;
    let padded = fix_length(signal, signal.len() + frame_size / 2, 0.0);
    stft(&padded, &StftConfig::for_frame_size(frame_size))
}

/// Invert a spectrogram produced by [`forward`] to exactly `target_length` samples.
///
/// The frame size is recovered from the bin count as `2 * (n_bins - 1)`.
pub fn inverse(spectrogram: &Array2<Complex32>, target_length: usize) -> crate::Result<Vec<f32>> {
    if spectrogram.is_empty() {
        return Err(crate::Error::EmptySpectrogram);
    }
    let frame_size = 2 * (spectrogram.nrows() - 1);
    validate_frame_size(frame_size)?;
    istft(
        spectrogram,
        &StftConfig::for_frame_size(frame_size),
        Some(target_length),
    )
}

/// Magnitude `|F|` of every bin.
pub fn magnitude(stft_matrix: &Array2<Complex32>) -> Array2<f32> {
    stft_matrix.mapv(|c| c.norm())
}

/// Unit phasors `e^{i·angle(F)}`; zero bins get angle 0.
pub fn phase(stft_matrix: &Array2<Complex32>) -> Array2<Complex32> {
    stft_matrix.mapv(|c| Complex32::from_polar(1.0, c.arg()))
}

/// Convert power spectrogram to dB scale.
/// S_db = 10 * log10(S / ref)
pub fn power_to_db(
    power: &Array2<f32>,
    ref_power: f32,
    amin: f32,
    top_db: Option<f32>,
) -> Array2<f32> {
    let log_ref = 10.0 * ref_power.max(amin).log10();
    let mut db = power.mapv(|p| 10.0 * p.max(amin).log10() - log_ref);
    clip_top_db(&mut db, top_db);
    db
}

/// Convert amplitude spectrogram to dB scale.
/// S_db = 20 * log10(S / ref)
pub fn amplitude_to_db(
    amplitude: &Array2<f32>,
    ref_amplitude: f32,
    amin: f32,
    top_db: Option<f32>,
) -> Array2<f32> {
    let log_ref = 20.0 * ref_amplitude.max(amin).log10();
    let mut db = amplitude.mapv(|a| 20.0 * a.max(amin).log10() - log_ref);
    clip_top_db(&mut db, top_db);
    db
}

fn clip_top_db(db: &mut Array2<f32>, top_db: Option<f32>) {
    if let Some(top) = top_db {
        let max_db = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let threshold = max_db - top;
        db.mapv_inplace(|v| v.max(threshold));
    }
}

//! Harmonic-percussive separation by iterative energy redistribution.
//!
//! The power spectrogram `W = |F|^(2γ)` is split into a harmonic part `H`
//! and a percussive part `P = W - H`. Starting from an even split, each
//! update nudges `H` towards smoothness along time (sustained partials) and
//! `P` towards smoothness along frequency (broadband transients). The mixing
//! coefficient `a = a_p² / (a_h² + a_p²)` balances the two constraints.
//! After `k_max - 1` updates, every bin is assigned wholly to whichever
//! side holds more of its energy, and the two hard-masked spectrograms are
//! resynthesized with the phase of the input.
//!
//! # Example
//! ```
//! use hpsep::{SeparationConfig, separate_signal};
//!
//! let signal: Vec<f32> = (0..4096).map(|i| (i as f32 * 0.1).sin()).collect();
//! let cfg = SeparationConfig::default().with_frame_size(512);
//! let out = separate_signal(&signal, &cfg).unwrap();
//! assert_eq!(out.harmonic.len(), signal.len());
//! assert_eq!(out.percussive.len(), signal.len());
//! ```

mod config;
pub mod engine;
pub mod mask;
pub mod reconstruct;

pub use config::{Mixing, SeparationConfig};
pub use engine::{Refinement, power_spectrogram, refine};

use crate::spectrum;
use log::debug;
use ndarray::Array2;
use num_complex::Complex32;

/// Harmonic and percussive waveforms, each as long as the input signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Separation {
    pub harmonic: Vec<f32>,
    pub percussive: Vec<f32>,
}

/// Separate a complex spectrogram into harmonic and percussive spectrograms.
///
/// Uses `gamma`, the two weights and `max_iterations` from `config`; the
/// frame size is implied by the spectrogram and `config.frame_size` is
/// ignored. Both outputs share the phase of `stft` and have its shape.
///
/// # Errors
/// * `Error::Configuration` for invalid parameters, before any work is done
/// * `Error::EmptySpectrogram` if `stft` has no bins or no frames
/// * `Error::NumericInstability` if the refinement produces non-finite values
pub fn separate(
    stft: &Array2<Complex32>,
    config: &SeparationConfig,
) -> crate::Result<(Array2<Complex32>, Array2<Complex32>)> {
    config.validate_parameters()?;
    let (harmonic_mask, percussive_mask) = hard_masks(stft, config)?;

    let harmonic = reconstruct::apply_phase(&harmonic_mask, stft, config.gamma)?;
    let percussive = reconstruct::apply_phase(&percussive_mask, stft, config.gamma)?;
    Ok((harmonic, percussive))
}

/// Separate a mono signal into harmonic and percussive waveforms.
///
/// Runs the full pipeline: forward transform, refinement, hard masking and
/// inverse transform back to `signal.len()` samples.
pub fn separate_signal(signal: &[f32], config: &SeparationConfig) -> crate::Result<Separation> {
    config.validate()?;
    let stft = spectrum::forward(signal, config.frame_size)?;
    debug!(
        "separating {} samples: {} bins x {} frames, gamma = {}, k_max = {}",
        signal.len(),
        stft.nrows(),
        stft.ncols(),
        config.gamma,
        config.max_iterations
    );

    let (harmonic_mask, percussive_mask) = hard_masks(&stft, config)?;
    let length = signal.len();
    Ok(Separation {
        harmonic: reconstruct::reconstruct(&harmonic_mask, &stft, config.gamma, length)?,
        percussive: reconstruct::reconstruct(&percussive_mask, &stft, config.gamma, length)?,
    })
}

// config must already be validated
fn hard_masks(
    stft: &Array2<Complex32>,
    config: &SeparationConfig,
) -> crate::Result<(Array2<f32>, Array2<f32>)> {
    if stft.is_empty() {
        return Err(crate::Error::EmptySpectrogram);
    }
    let mixing = config.mixing_coefficient()?;
    let power = power_spectrogram(stft, config.gamma)?;
    refine(power, mixing, config.max_iterations)
}

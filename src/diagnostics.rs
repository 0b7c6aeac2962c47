//! Signal-level diagnostics: energy, signal-to-noise ratio, output gain and
//! parameter sweeps.

use crate::separation::{SeparationConfig, separate_signal};
use log::debug;

/// Total energy `Σ x²`, accumulated in `f64`.
pub fn energy(x: &[f32]) -> f64 {
    x.iter().map(|&v| (v as f64) * (v as f64)).sum()
}

/// Signal-to-noise ratio of `estimate` against `reference`, in dB.
///
/// `10·log10(Σ ref² / Σ (ref - est)²)`. Identical signals give `+∞`; a
/// silent reference with a nonzero error gives `-∞`.
///
/// # Errors
/// * `Error::EmptyAudio` if `reference` is empty
/// * `Error::ShapeMismatch` if the lengths differ
///
/// # Example
/// ```
/// use hpsep::diagnostics::snr_db;
///
/// let x = vec![1.0f32, -1.0, 1.0, -1.0];
/// let y: Vec<f32> = x.iter().map(|v| v * 0.9).collect();
/// let snr = snr_db(&x, &y).unwrap();
/// assert!((snr - 20.0).abs() < 1e-3);
/// ```
pub fn snr_db(reference: &[f32], estimate: &[f32]) -> crate::Result<f64> {
    if reference.is_empty() {
        return Err(crate::Error::EmptyAudio);
    }
    if reference.len() != estimate.len() {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("[{}]", reference.len()),
            got: format!("[{}]", estimate.len()),
        });
    }

    let signal = energy(reference);
    let noise: f64 = reference
        .iter()
        .zip(estimate)
        .map(|(&r, &e)| {
            let d = r as f64 - e as f64;
            d * d
        })
        .sum();

    if noise == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (signal / noise).log10())
}

/// Scale `x` so its largest absolute sample equals `target_peak`.
///
/// Silent input is returned unchanged.
pub fn normalize_peak(x: &[f32], target_peak: f32) -> Vec<f32> {
    let peak = x.iter().fold(0.0f32, |m, &v| m.max(v.abs()));
    if peak == 0.0 {
        return x.to_vec();
    }
    let scale = target_peak / peak;
    x.iter().map(|&v| v * scale).collect()
}

/// Apply a gain of `gain_db` decibels.
pub fn apply_gain_db(x: &[f32], gain_db: f32) -> Vec<f32> {
    let scale = 10f32.powf(gain_db / 20.0);
    x.iter().map(|&v| v * scale).collect()
}

/// One point of a parameter sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    /// Swept parameter value (`γ` or `k_max`).
    pub value: f64,
    /// SNR of the harmonic output against the input signal, in dB.
    pub harmonic_snr_db: f64,
    /// SNR of the percussive output against the input signal, in dB.
    pub percussive_snr_db: f64,
}

/// Separate `signal` once per `γ` in `gammas`, all other parameters from `base`.
///
/// Points are returned in input order.
///
/// # Errors
/// Fails with `Error::Configuration` before any separation runs if any
/// resulting configuration is invalid.
pub fn sweep_gamma(
    signal: &[f32],
    base: &SeparationConfig,
    gammas: &[f32],
) -> crate::Result<Vec<SweepPoint>> {
    let configs: Vec<(f64, SeparationConfig)> = gammas
        .iter()
        .map(|&g| (g as f64, base.clone().with_gamma(g)))
        .collect();
    run_sweep(signal, &configs)
}

/// Separate `signal` once per iteration budget in `k_values`; see [`sweep_gamma`].
pub fn sweep_iterations(
    signal: &[f32],
    base: &SeparationConfig,
    k_values: &[usize],
) -> crate::Result<Vec<SweepPoint>> {
    let configs: Vec<(f64, SeparationConfig)> = k_values
        .iter()
        .map(|&k| (k as f64, base.clone().with_max_iterations(k)))
        .collect();
    run_sweep(signal, &configs)
}

fn run_sweep(signal: &[f32], configs: &[(f64, SeparationConfig)]) -> crate::Result<Vec<SweepPoint>> {
    for (_, cfg) in configs {
        cfg.validate()?;
    }
    debug!("running sweep over {} configurations", configs.len());

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        configs
            .par_iter()
            .map(|(value, cfg)| sweep_point(signal, *value, cfg))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        configs
            .iter()
            .map(|(value, cfg)| sweep_point(signal, *value, cfg))
            .collect()
    }
}

fn sweep_point(signal: &[f32], value: f64, cfg: &SeparationConfig) -> crate::Result<SweepPoint> {
    let out = separate_signal(signal, cfg)?;
    let point = SweepPoint {
        value,
        harmonic_snr_db: snr_db(signal, &out.harmonic)?,
        percussive_snr_db: snr_db(signal, &out.percussive)?,
    };
    debug!(
        "sweep point {}: harmonic {:.2} dB, percussive {:.2} dB",
        value, point.harmonic_snr_db, point.percussive_snr_db
    );
    Ok(point)
}

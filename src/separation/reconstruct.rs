use crate::spectrum;
use crate::utils::ensure_same_shape;
use ndarray::{Array2, Zip};
use num_complex::Complex32;

/// Rebuild a complex spectrogram from a masked power spectrogram.
///
/// Each bin becomes `mask^(γ/2) · e^{i·angle(F)}`: magnitude from the
/// mask, phase from the original spectrogram `stft`. For `γ = 1` the
/// masked bins keep their original magnitude.
///
/// # Errors
/// `Error::ShapeMismatch` if `mask` and `stft` differ in shape.
pub fn apply_phase(
    mask: &Array2<f32>,
    stft: &Array2<Complex32>,
    gamma: f32,
) -> crate::Result<Array2<Complex32>> {
    ensure_same_shape(stft, mask)?;
    let exponent = gamma / 2.0;
    let mut out = Array2::<Complex32>::zeros(stft.raw_dim());
    Zip::from(&mut out)
        .and(mask)
        .and(stft)
        .for_each(|o, &m, &f| *o = Complex32::from_polar(m.powf(exponent), f.arg()));
    Ok(out)
}

/// Rebuild the waveform for one mask, `length` samples long.
pub fn reconstruct(
    mask: &Array2<f32>,
    stft: &Array2<Complex32>,
    gamma: f32,
    length: usize,
) -> crate::Result<Vec<f32>> {
    let masked = apply_phase(mask, stft, gamma)?;
    spectrum::inverse(&masked, length)
}

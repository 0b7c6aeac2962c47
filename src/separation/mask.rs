use crate::utils::ensure_same_shape;
use ndarray::{Array2, Zip};

/// Replace soft estimates with a hard partition of the power spectrogram.
///
/// At every bin, `H = W, P = 0` where `H >= P`, otherwise `H = 0, P = W`.
///
/// # Errors
/// `Error::ShapeMismatch` if the three arrays differ in shape.
pub fn binarize_in_place(
    power: &Array2<f32>,
    harmonic: &mut Array2<f32>,
    percussive: &mut Array2<f32>,
) -> crate::Result<()> {
    ensure_same_shape(power, harmonic)?;
    ensure_same_shape(power, percussive)?;

    Zip::from(harmonic)
        .and(percussive)
        .and(power)
        .for_each(|h, p, &w| {
            if *h >= *p {
                *h = w;
                *p = 0.0;
            } else {
                *h = 0.0;
                *p = w;
            }
        });
    Ok(())
}

/// Allocating variant of [`binarize_in_place`].
///
/// # Example
/// ```
/// use hpsep::separation::mask::binarize;
/// use ndarray::array;
///
/// let w = array![[4.0f32, 2.0, 6.0]];
/// let h = array![[3.0f32, 1.0, 3.0]];
/// let p = &w - &h;
/// let (h_bin, p_bin) = binarize(&w, &h, &p).unwrap();
/// assert_eq!(h_bin, array![[4.0, 0.0, 6.0]]);
/// assert_eq!(p_bin, array![[0.0, 2.0, 0.0]]);
/// ```
pub fn binarize(
    power: &Array2<f32>,
    harmonic: &Array2<f32>,
    percussive: &Array2<f32>,
) -> crate::Result<(Array2<f32>, Array2<f32>)> {
    let mut h = harmonic.clone();
    let mut p = percussive.clone();
    binarize_in_place(power, &mut h, &mut p)?;
    Ok((h, p))
}

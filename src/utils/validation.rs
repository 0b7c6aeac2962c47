use ndarray::{ArrayBase, Data, Dimension, RawData};

/// Validate audio data.
///
/// Checks that the audio data satisfies the following conditions:
/// - Data is not empty
/// - All samples are finite (no NaN or Inf)
///
/// # Example
/// ```
/// use hpsep::utils::valid_audio;
///
/// let y = vec![0.0, 0.5, -0.5, 0.0];
/// assert!(valid_audio(&y).is_ok());
///
/// let empty: Vec<f32> = vec![];
/// assert!(valid_audio(&empty).is_err());
/// ```
pub fn valid_audio(y: &[f32]) -> crate::Result<()> {
    if y.is_empty() {
        return Err(crate::Error::EmptyAudio);
    }

    if !y.iter().all(|&v| v.is_finite()) {
        return Err(crate::Error::NonFiniteAudio);
    }

    Ok(())
}

/// Check that two arrays have identical shapes.
///
/// Returns `Error::ShapeMismatch` naming both shapes otherwise.
pub fn ensure_same_shape<S1, S2, D>(
    expected: &ArrayBase<S1, D>,
    got: &ArrayBase<S2, D>,
) -> crate::Result<()>
where
    S1: RawData,
    S2: RawData,
    D: Dimension,
{
    if expected.shape() != got.shape() {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("{:?}", expected.shape()),
            got: format!("{:?}", got.shape()),
        });
    }
    Ok(())
}

/// Fail with `Error::NegativePower` if any entry is below zero.
///
/// NaN entries are left to [`ensure_finite`].
pub fn ensure_non_negative<S, D>(
    values: &ArrayBase<S, D>,
    stage: &'static str,
) -> crate::Result<()>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    if values.iter().any(|&v| v < 0.0) {
        Err(crate::Error::NegativePower { stage })
    } else {
        Ok(())
    }
}

/// Fail with `Error::NumericInstability` if any entry is NaN or infinite.
pub fn ensure_finite<S, D>(
    values: &ArrayBase<S, D>,
    stage: &'static str,
    iteration: usize,
) -> crate::Result<()>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(crate::Error::NumericInstability { stage, iteration })
    }
}

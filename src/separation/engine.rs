use super::config::Mixing;
use super::mask::binarize_in_place;
use crate::utils::{ensure_finite, ensure_non_negative, ensure_same_shape};
use log::{debug, trace};
use ndarray::{Array2, ArrayView2, Zip};
use num_complex::Complex32;

/// Range-compressed power spectrogram `W = |F|^(2γ)`.
///
/// # Errors
/// `Error::NumericInstability` if any bin overflows to a non-finite value.
pub fn power_spectrogram(stft: &Array2<Complex32>, gamma: f32) -> crate::Result<Array2<f32>> {
    let exponent = 2.0 * gamma;
    let power = stft.mapv(|c| c.norm().powf(exponent));
    ensure_finite(&power, "power spectrogram", 0)?;
    Ok(power)
}

/// Working state of the iterative harmonic/percussive refinement.
///
/// `H` and `P` start at `W / 2`. Each [`step`](Refinement::step) moves energy
/// between them so that `H` becomes smooth along time and `P` smooth along
/// frequency, keeping `0 <= H <= W` and `P = W - H` at every bin.
///
/// # Example
/// ```
/// use hpsep::separation::{Mixing, Refinement};
/// use ndarray::array;
///
/// let power = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
/// let mut state = Refinement::new(power, Mixing::from_weights(1.0, 1.0).unwrap()).unwrap();
/// state.step().unwrap();
///
/// let total = state.harmonic() + state.percussive();
/// assert!(total.iter().zip(state.power().iter()).all(|(s, w)| (s - w).abs() < 1e-5));
/// ```
pub struct Refinement {
    power: Array2<f32>,
    harmonic: Array2<f32>,
    percussive: Array2<f32>,
    scratch: Array2<f32>,
    mixing: Mixing,
    iterations: usize,
}

impl Refinement {
    /// Start from `H = P = W / 2`.
    ///
    /// # Errors
    /// * `Error::NumericInstability` if `power` has a non-finite entry
    /// * `Error::NegativePower` if `power` has a negative entry
    pub fn new(power: Array2<f32>, mixing: Mixing) -> crate::Result<Self> {
        ensure_finite(&power, "power spectrogram", 0)?;
        ensure_non_negative(&power, "power spectrogram")?;

        let harmonic = power.mapv(|w| w / 2.0);
        let percussive = harmonic.clone();
        let scratch = Array2::zeros(power.raw_dim());
        Ok(Self {
            power,
            harmonic,
            percussive,
            scratch,
            mixing,
            iterations: 0,
        })
    }

    pub fn power(&self) -> &Array2<f32> {
        &self.power
    }

    pub fn harmonic(&self) -> &Array2<f32> {
        &self.harmonic
    }

    pub fn percussive(&self) -> &Array2<f32> {
        &self.percussive
    }

    pub fn mixing(&self) -> Mixing {
        self.mixing
    }

    /// Number of updates applied so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Apply one update: `H <- clamp(H + delta, 0, W)`, then `P <- W - H`.
    ///
    /// Every bin of the new `H` is computed from the previous `H` and `P`
    /// before `P` is rederived.
    pub fn step(&mut self) -> crate::Result<()> {
        ensure_same_shape(&self.power, &self.harmonic)?;
        ensure_same_shape(&self.power, &self.percussive)?;

        let update = HarmonicUpdate {
            harmonic: self.harmonic.view(),
            percussive: self.percussive.view(),
            mixing: self.mixing,
        };
        let sweep = Zip::indexed(&mut self.scratch).and(&self.power);
        #[cfg(feature = "parallel")]
        sweep.par_for_each(|idx, out, &w| *out = update.at(idx, w));
        #[cfg(not(feature = "parallel"))]
        sweep.for_each(|idx, out, &w| *out = update.at(idx, w));

        std::mem::swap(&mut self.harmonic, &mut self.scratch);
        self.iterations += 1;
        ensure_finite(&self.harmonic, "harmonic update", self.iterations)?;

        let derive = Zip::from(&mut self.percussive)
            .and(&self.power)
            .and(&self.harmonic);
        #[cfg(feature = "parallel")]
        derive.par_for_each(|p, &w, &h| *p = w - h);
        #[cfg(not(feature = "parallel"))]
        derive.for_each(|p, &w, &h| *p = w - h);

        if log::log_enabled!(log::Level::Trace) {
            let total = self.power.sum();
            let share = if total > 0.0 {
                self.harmonic.sum() / total
            } else {
                0.0
            };
            trace!(
                "refinement iteration {}: harmonic share {:.4}",
                self.iterations, share
            );
        }
        Ok(())
    }

    /// Finish the refinement with hard masks: `(H_final, P_final)`.
    pub fn binarize(self) -> crate::Result<(Array2<f32>, Array2<f32>)> {
        let Self {
            power,
            mut harmonic,
            mut percussive,
            ..
        } = self;
        binarize_in_place(&power, &mut harmonic, &mut percussive)?;
        Ok((harmonic, percussive))
    }
}

/// Per-bin update rule, reading the previous iteration's estimates.
struct HarmonicUpdate<'a> {
    harmonic: ArrayView2<'a, f32>,
    percussive: ArrayView2<'a, f32>,
    mixing: Mixing,
}

impl HarmonicUpdate<'_> {
    #[inline]
    fn at(&self, (f, t): (usize, usize), w: f32) -> f32 {
        let h = &self.harmonic;
        let p = &self.percussive;

        let centre_h = h[(f, t)];
        let prev_h = t.checked_sub(1).map_or(0.0, |t| or_zero(h, f, t));
        let next_h = or_zero(h, f, t + 1);

        let centre_p = p[(f, t)];
        let below_p = f.checked_sub(1).map_or(0.0, |f| or_zero(p, f, t));
        let above_p = or_zero(p, f + 1, t);

        let time_curvature = prev_h - 2.0 * centre_h + next_h;
        let freq_curvature = below_p - 2.0 * centre_p + above_p;
        let delta = self.mixing.a * time_curvature / 4.0
            - self.mixing.complement * freq_curvature / 4.0;

        let updated = centre_h + delta;
        if updated.is_finite() {
            updated.clamp(0.0, w)
        } else {
            updated
        }
    }
}

// out-of-range neighbours read as zero
#[inline]
fn or_zero(m: &ArrayView2<'_, f32>, f: usize, t: usize) -> f32 {
    m.get((f, t)).copied().unwrap_or(0.0)
}

/// Run `max_iterations - 1` refinement updates on `power` and binarize.
///
/// Returns `(H_final, P_final)`: at every bin one of them equals `W` and the
/// other is zero, with ties going to the harmonic side.
///
/// # Errors
/// * `Error::Configuration` if `max_iterations` is zero
/// * `Error::NumericInstability` if `power` or an update is non-finite
/// * `Error::NegativePower` if `power` has a negative entry
pub fn refine(
    power: Array2<f32>,
    mixing: Mixing,
    max_iterations: usize,
) -> crate::Result<(Array2<f32>, Array2<f32>)> {
    if max_iterations < 1 {
        return Err(crate::Error::Configuration {
            name: "max_iterations",
            value: max_iterations.to_string(),
            reason: "must be at least 1",
        });
    }
    let (n_bins, n_frames) = power.dim();
    let mut state = Refinement::new(power, mixing)?;
    for _ in 1..max_iterations {
        state.step()?;
    }
    debug!(
        "refined {}x{} power spectrogram with {} updates (a = {:.4})",
        n_bins,
        n_frames,
        state.iterations(),
        state.mixing().a
    );
    state.binarize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn mixing(a_h: f32, a_p: f32) -> Mixing {
        Mixing::from_weights(a_h, a_p).unwrap()
    }

    fn textured(n_bins: usize, n_frames: usize) -> Array2<f32> {
        Array2::from_shape_fn((n_bins, n_frames), |(f, t)| {
            ((f * 7 + t * 3) % 11) as f32 * 0.37 + (f as f32 * 0.5).sin().abs()
        })
    }

    fn assert_invariants(state: &Refinement) {
        for ((&w, &h), &p) in state
            .power()
            .iter()
            .zip(state.harmonic().iter())
            .zip(state.percussive().iter())
        {
            assert!((0.0..=w).contains(&h), "H = {h} outside [0, {w}]");
            assert!((0.0..=w).contains(&p), "P = {p} outside [0, {w}]");
            assert!((h + p - w).abs() <= 1e-5 * w.max(1.0));
        }
    }

    #[test]
    fn test_power_spectrogram_gamma() {
        let stft = array![[Complex32::new(3.0, 4.0), Complex32::new(0.0, 0.0)]];
        let squared = power_spectrogram(&stft, 1.0).unwrap();
        assert_relative_eq!(squared[(0, 0)], 25.0, epsilon = 1e-4);
        assert_eq!(squared[(0, 1)], 0.0);

        let compressed = power_spectrogram(&stft, 0.5).unwrap();
        assert_relative_eq!(compressed[(0, 0)], 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_power_spectrogram_overflow() {
        let stft = array![[Complex32::new(1e20, 0.0)]];
        assert!(matches!(
            power_spectrogram(&stft, 1.0),
            Err(crate::Error::NumericInstability {
                stage: "power spectrogram",
                iteration: 0
            })
        ));
    }

    #[test]
    fn test_power_spectrogram_large_magnitude_with_compression() {
        // |F|^2 would overflow f32, |F|^(2 * 0.5) does not
        let stft = array![[Complex32::new(1e20, 0.0)]];
        let power = power_spectrogram(&stft, 0.5).unwrap();
        assert_relative_eq!(power[(0, 0)], 1e20, max_relative = 1e-5);
    }

    #[test]
    fn test_negative_power_is_rejected() {
        assert!(matches!(
            refine(array![[1.0f32, -1.0, 2.0]], mixing(1.0, 1.0), 3),
            Err(crate::Error::NegativePower { .. })
        ));
        assert!(matches!(
            Refinement::new(array![[-1.0f32]], mixing(1.0, 1.0)),
            Err(crate::Error::NegativePower { .. })
        ));
    }

    #[test]
    fn test_non_finite_power_is_rejected_up_front() {
        assert!(matches!(
            Refinement::new(array![[f32::NAN, 1.0]], mixing(1.0, 1.0)),
            Err(crate::Error::NumericInstability { iteration: 0, .. })
        ));
    }

    #[test]
    fn test_mixing_is_kept() {
        let state = Refinement::new(textured(2, 2), mixing(1.0, 2.0)).unwrap();
        assert_relative_eq!(state.mixing().a, 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_initial_state_splits_power_evenly() {
        let state = Refinement::new(textured(4, 5), mixing(1.0, 1.0)).unwrap();
        assert_eq!(state.iterations(), 0);
        for ((&w, &h), &p) in state
            .power()
            .iter()
            .zip(state.harmonic().iter())
            .zip(state.percussive().iter())
        {
            assert_eq!(h, w / 2.0);
            assert_eq!(p, w / 2.0);
        }
    }

    #[test]
    fn test_single_step_matches_hand_computed_values() {
        let power = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let mut state = Refinement::new(power, mixing(1.0, 1.0)).unwrap();
        state.step().unwrap();

        assert_relative_eq!(state.harmonic()[(0, 0)], 0.375, epsilon = 1e-6);
        assert_relative_eq!(state.percussive()[(0, 0)], 0.625, epsilon = 1e-6);
        assert_relative_eq!(state.harmonic()[(1, 1)], 2.5, epsilon = 1e-6);
        assert_relative_eq!(state.harmonic()[(2, 2)], 4.625, epsilon = 1e-6);
        assert_relative_eq!(state.percussive()[(2, 2)], 4.375, epsilon = 1e-6);
        assert_eq!(state.iterations(), 1);
    }

    #[test]
    fn test_update_clips_to_bounds() {
        // frequency spike: the edge bins are pushed below zero
        let mut column =
            Refinement::new(array![[1.0f32], [100.0], [1.0]], mixing(1.0, 1.0)).unwrap();
        column.step().unwrap();
        assert_eq!(column.harmonic()[(0, 0)], 0.0);
        assert_eq!(column.percussive()[(0, 0)], 1.0);

        // time spike: the edge frames are pushed above W
        let mut row = Refinement::new(array![[1.0f32, 100.0, 1.0]], mixing(1.0, 1.0)).unwrap();
        row.step().unwrap();
        assert_eq!(row.harmonic()[(0, 0)], 1.0);
        assert_eq!(row.percussive()[(0, 0)], 0.0);
    }

    #[test]
    fn test_invariants_hold_every_iteration() {
        let mut state = Refinement::new(textured(12, 15), mixing(1.3, 0.7)).unwrap();
        for _ in 0..25 {
            state.step().unwrap();
            assert_invariants(&state);
        }
        assert_eq!(state.iterations(), 25);

        let power = state.power().clone();
        let (h, p) = state.binarize().unwrap();
        for ((&w, &h), &p) in power.iter().zip(h.iter()).zip(p.iter()) {
            assert!((h == w && p == 0.0) || (h == 0.0 && p == w));
        }
    }

    #[test]
    fn test_single_iteration_budget_is_all_harmonic() {
        let power = textured(6, 7);
        let (h, p) = refine(power.clone(), mixing(1.0, 1.0), 1).unwrap();
        assert_eq!(h, power);
        assert!(p.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_refine_rejects_zero_iterations() {
        assert!(matches!(
            refine(textured(2, 2), mixing(1.0, 1.0), 0),
            Err(crate::Error::Configuration {
                name: "max_iterations",
                ..
            })
        ));
    }

    #[test]
    fn test_time_ridge_stays_harmonic_when_a_near_one() {
        let k_max = 20;
        let mut power = Array2::<f32>::zeros((5, 60));
        power.row_mut(2).fill(1.0);

        let (h, p) = refine(power, mixing(1e-2, 1.0), k_max).unwrap();

        // the zero boundary only reaches k_max - 1 frames in from either edge
        for t in (k_max - 1)..(60 - (k_max - 1)) {
            assert_eq!(h[(2, t)], 1.0, "frame {t}");
            assert_eq!(p[(2, t)], 0.0, "frame {t}");
        }
        assert_eq!(p[(2, 0)], 1.0);
        assert_eq!(p[(2, 59)], 1.0);
    }

    #[test]
    fn test_frequency_ridge_turns_percussive_when_a_near_zero() {
        let k_max = 20;
        let mut power = Array2::<f32>::zeros((60, 5));
        power.column_mut(2).fill(1.0);

        let (h, p) = refine(power, mixing(1.0, 1e-2), k_max).unwrap();

        for f in (k_max - 1)..(60 - (k_max - 1)) {
            assert_eq!(p[(f, 2)], 1.0, "bin {f}");
            assert_eq!(h[(f, 2)], 0.0, "bin {f}");
        }
        assert_eq!(h[(0, 2)], 1.0);
        assert_eq!(h[(59, 2)], 1.0);
    }

    #[test]
    fn test_overflowing_update_is_numeric_instability() {
        let power = Array2::from_elem((1, 3), f32::MAX);
        let mut state = Refinement::new(power, mixing(1.0, 1.0)).unwrap();
        assert!(state.step().is_ok());
        assert!(matches!(
            state.step(),
            Err(crate::Error::NumericInstability {
                stage: "harmonic update",
                iteration: 2
            })
        ));
    }
}

use num_complex::Complex32;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Real-input FFT plan for one frame length.
///
/// Holds the forward (real to half-spectrum) and inverse (half-spectrum to
/// real) plans so a whole spectrogram can be transformed without replanning.
///
/// # Example
/// ```
/// use hpsep::fft::FftPlan;
///
/// let plan = FftPlan::new(8);
/// let mut frame = vec![1.0f32; 8];
/// let mut spectrum = plan.make_spectrum();
/// plan.forward(&mut frame, &mut spectrum).unwrap();
/// assert_eq!(spectrum.len(), 5);
/// assert!((spectrum[0].re - 8.0).abs() < 1e-5);
/// ```
pub struct FftPlan {
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn ComplexToReal<f32>>,
    len: usize,
}

impl FftPlan {
    /// Plan transforms of `len` real samples.
    pub fn new(len: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        Self {
            forward,
            inverse,
            len,
        }
    }

    /// Frame length in samples.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of non-redundant frequency bins, `len / 2 + 1`.
    pub fn n_bins(&self) -> usize {
        self.len / 2 + 1
    }

    /// Allocate a zeroed spectrum buffer of `n_bins` values.
    pub fn make_spectrum(&self) -> Vec<Complex32> {
        self.forward.make_output_vec()
    }

    /// Forward transform. `frame` is used as scratch and left unspecified.
    pub fn forward(&self, frame: &mut [f32], spectrum: &mut [Complex32]) -> crate::Result<()> {
        self.forward.process(frame, spectrum)?;
        Ok(())
    }

    /// Inverse transform, scaled by `1 / len`.
    ///
    /// The imaginary parts of the DC and (for even lengths) Nyquist bins are
    /// discarded, as they carry no information for a real signal.
    pub fn inverse(&self, spectrum: &mut [Complex32], frame: &mut [f32]) -> crate::Result<()> {
        if let Some(dc) = spectrum.first_mut() {
            dc.im = 0.0;
        }
        if self.len % 2 == 0
            && let Some(nyquist) = spectrum.last_mut()
        {
            nyquist.im = 0.0;
        }
        self.inverse.process(spectrum, frame)?;
        let scale = 1.0 / self.len as f32;
        for v in frame.iter_mut() {
            *v *= scale;
        }
        Ok(())
    }
}

#[cfg(feature = "parallel")]
const _: () = {
    fn _assert_send_sync<T: Send + Sync>() {}
    fn _check() {
        _assert_send_sync::<FftPlan>();
    }
};

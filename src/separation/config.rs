use crate::spectrum::validate_frame_size;

/// Parameters of one harmonic-percussive separation.
///
/// # Example
/// ```
/// use hpsep::SeparationConfig;
///
/// let cfg = SeparationConfig::default().with_gamma(0.3).with_max_iterations(50);
/// assert!(cfg.validate().is_ok());
///
/// let bad = SeparationConfig::default().with_weights(0.0, 1.0);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SeparationConfig {
    /// Range-compression exponent `γ` in `(0, 1]`; the power spectrogram is `|F|^(2γ)`.
    pub gamma: f32,
    /// Smoothness weight `a_h` of the harmonic (time) axis.
    pub harmonic_weight: f32,
    /// Smoothness weight `a_p` of the percussive (frequency) axis.
    pub percussive_weight: f32,
    /// Iteration budget `k_max`; the refinement applies `k_max - 1` updates.
    pub max_iterations: usize,
    /// Transform frame length in samples.
    pub frame_size: usize,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            harmonic_weight: 1.0,
            percussive_weight: 1.0,
            max_iterations: 20,
            frame_size: 2048,
        }
    }
}

impl SeparationConfig {
    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_weights(mut self, harmonic_weight: f32, percussive_weight: f32) -> Self {
        self.harmonic_weight = harmonic_weight;
        self.percussive_weight = percussive_weight;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size;
        self
    }

    /// Check every parameter; nothing is allocated or computed on failure.
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_parameters()?;
        validate_frame_size(self.frame_size)
    }

    /// Check the parameters used on an existing spectrogram: `gamma`, the
    /// weights and `max_iterations`. `frame_size` is not consulted.
    pub fn validate_parameters(&self) -> crate::Result<()> {
        if !(self.gamma.is_finite() && self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(crate::Error::Configuration {
                name: "gamma",
                value: self.gamma.to_string(),
                reason: "must lie in (0, 1]",
            });
        }
        if self.max_iterations < 1 {
            return Err(crate::Error::Configuration {
                name: "max_iterations",
                value: self.max_iterations.to_string(),
                reason: "must be at least 1",
            });
        }
        self.mixing_coefficient()?;
        Ok(())
    }

    /// Derive the mixing coefficient from the two smoothness weights.
    pub fn mixing_coefficient(&self) -> crate::Result<Mixing> {
        Mixing::from_weights(self.harmonic_weight, self.percussive_weight)
    }
}

/// Mixing coefficient `a = a_p² / (a_h² + a_p²)` and its complement `1 - a`.
///
/// Both are derived in double precision, and the complement is computed
/// directly as `a_h² / (a_h² + a_p²)` rather than by subtraction. Weight
/// ratios so extreme that either value rounds to 0 or 1 in `f32` are
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mixing {
    /// Weight of the time-axis (harmonic) curvature.
    pub a: f32,
    /// Weight of the frequency-axis (percussive) curvature, `1 - a`.
    pub complement: f32,
}

impl Mixing {
    pub fn from_weights(harmonic_weight: f32, percussive_weight: f32) -> crate::Result<Self> {
        for (name, weight) in [
            ("harmonic_weight", harmonic_weight),
            ("percussive_weight", percussive_weight),
        ] {
            if !(weight.is_finite() && weight > 0.0) {
                return Err(crate::Error::Configuration {
                    name,
                    value: weight.to_string(),
                    reason: "must be a finite value > 0",
                });
            }
        }

        let h2 = f64::from(harmonic_weight).powi(2);
        let p2 = f64::from(percussive_weight).powi(2);
        let total = h2 + p2;
        let a = (p2 / total) as f32;
        let complement = (h2 / total) as f32;
        // both must survive the narrowing to f32
        if !(a > 0.0 && a < 1.0 && complement > 0.0 && complement < 1.0) {
            return Err(crate::Error::Configuration {
                name: "mixing_coefficient",
                value: a.to_string(),
                reason: "weights must yield a coefficient strictly inside (0, 1)",
            });
        }

        Ok(Self { a, complement })
    }
}

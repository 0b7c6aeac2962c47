/// Crate-level error type for harmonic-percussive separation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A separation or transform parameter is out of range.
    #[error("invalid configuration `{name}`: got {value}, {reason}")]
    Configuration {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// Two matrices that must share a shape do not.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// A non-finite value appeared in the working spectrograms.
    #[error("non-finite values in {stage} at iteration {iteration}")]
    NumericInstability {
        stage: &'static str,
        iteration: usize,
    },

    /// A power spectrogram holds a negative entry.
    #[error("negative values in {stage}")]
    NegativePower { stage: &'static str },

    /// Audio data is empty when a non-empty signal was required.
    #[error("audio data is empty")]
    EmptyAudio,

    /// Audio data contains non-finite values (NaN or Inf).
    #[error("audio data contains non-finite values")]
    NonFiniteAudio,

    /// A spectrogram with no bins or no frames was passed in.
    #[error("spectrogram is empty")]
    EmptySpectrogram,

    /// FFT buffer errors.
    #[error(transparent)]
    Fft(#[from] realfft::FftError),

    /// Audio codec errors.
    #[error(transparent)]
    Audio(#[from] crate::io::AudioError),

    /// File I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for hpsep operations.
pub type Result<T> = std::result::Result<T, Error>;

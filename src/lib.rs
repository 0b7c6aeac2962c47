//! Harmonic-percussive source separation for Rust.
//!
//! hpsep splits a mono signal into a *harmonic* component (sustained,
//! pitched content that is smooth along time) and a *percussive* component
//! (transients that are smooth along frequency). It refines a compressed
//! power spectrogram with an iterative, anisotropic diffusion update, then
//! partitions every time-frequency bin with a hard mask and resynthesizes
//! both parts with the original phase.
//!
//! # Quick Start
//!
//! ```rust
//! use hpsep::{io, SeparationConfig, separate_signal};
//!
//! // A 440 Hz tone plus a few clicks (1 second at 22050 Hz)
//! let mut signal = io::tone(440.0, 22050, 1.0);
//! let clicks = io::impulse_train(signal.len(), 5512, 2756, 1.0);
//! for (s, c) in signal.iter_mut().zip(&clicks) {
//!     *s = 0.5 * *s + c;
//! }
//!
//! let cfg = SeparationConfig::default().with_max_iterations(10);
//! let out = separate_signal(&signal, &cfg).unwrap();
//! assert_eq!(out.harmonic.len(), signal.len());
//! assert_eq!(out.percussive.len(), signal.len());
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`separation`] | Configuration, refinement engine, hard masks, reconstruction |
//! | [`spectrum`] | STFT/ISTFT front-end, magnitude/phase, dB conversions |
//! | [`io`] | WAV/compressed audio loading, WAV writing, signal generators |
//! | [`diagnostics`] | Energy, SNR, gain helpers, parameter sweeps |
//! | [`window`] | Hann window and overlap normalization |
//! | [`fft`] | Cached real FFT plans |
//! | [`utils`] | Validation and length fixing |
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`. The [`Error`] enum covers invalid
//! configuration, shape mismatches, numeric instability and I/O failures.
//!
//! # Safety
//!
//! This crate uses `#![forbid(unsafe_code)]`.
//!
//! # Feature Flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `parallel` | Rayon-backed framing, refinement sweeps and parameter sweeps |
//! | `display` | PPM spectrogram rendering |

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod diagnostics;
pub mod fft;
pub mod io;
pub mod separation;
pub mod spectrum;
pub mod utils;
pub mod window;

#[cfg(feature = "display")]
pub mod display;

pub use separation::{Separation, SeparationConfig, separate, separate_signal};

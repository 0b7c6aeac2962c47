//! Spectrogram rendering to PPM images.
//!
//! Enable with the `display` feature in Cargo.toml:
//!
//! ```toml
//! [dependencies]
//! hpsep = { version = "0.1", features = ["display"] }
//! ```

use crate::spectrum;
use ndarray::Array2;
use num_complex::Complex32;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Dynamic range shown by [`save_spectrogram`], in dB below the peak.
pub const DEFAULT_TOP_DB: f32 = 80.0;

/// Color map types for spectrograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMap {
    /// Viridis colormap (perceptually uniform, colorblind-friendly)
    #[default]
    Viridis,
    /// Magma colormap (perceptually uniform, dark background)
    Magma,
    Grayscale,
}

impl ColorMap {
    /// Convert a normalized value (0.0 to 1.0) to RGB color.
    pub fn to_rgb(&self, value: f32) -> (u8, u8, u8) {
        let v = value.clamp(0.0, 1.0);
        match self {
            ColorMap::Viridis => viridis(v),
            ColorMap::Magma => magma(v),
            ColorMap::Grayscale => {
                let g = (v * 255.0) as u8;
                (g, g, g)
            }
        }
    }
}

impl FromStr for ColorMap {
    type Err = crate::Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            "viridis" => Ok(ColorMap::Viridis),
            "magma" => Ok(ColorMap::Magma),
            "grayscale" | "gray" | "grey" => Ok(ColorMap::Grayscale),
            _ => Err(crate::Error::Configuration {
                name: "colormap",
                value: name.to_string(),
                reason: "expected viridis, magma or grayscale",
            }),
        }
    }
}

fn viridis(t: f32) -> (u8, u8, u8) {
    let r = (0.267004 + t * (0.003991 + t * (1.096452 + t * (-2.146305 + t * 1.167419))))
        .clamp(0.0, 1.0);
    let g = (0.004874 + t * (1.015861 + t * (-0.107203 + t * (-0.449175 + t * 0.539506))))
        .clamp(0.0, 1.0);
    let b = (0.329415 + t * (1.421511 + t * (-2.482568 + t * (1.871714 + t * (-0.140092)))))
        .clamp(0.0, 1.0);
    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

fn magma(t: f32) -> (u8, u8, u8) {
    let r = (0.001462 + t * (0.169823 + t * (2.240361 + t * (-1.106994)))).clamp(0.0, 1.0);
    let g = (0.000466 + t * (0.100897 + t * (0.699060 + t * 0.203185))).clamp(0.0, 1.0);
    let b = (0.013866 + t * (0.563622 + t * (-0.543021 + t * 0.966020))).clamp(0.0, 1.0);
    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// Convert a 2D spectrogram to RGB image data.
///
/// Rows are flipped so the lowest frequency bin ends up at the bottom of the
/// image. Values are scaled linearly between `vmin` and `vmax` (data
/// extremes when `None`).
///
/// # Returns
/// `(width, height, pixels)` with `pixels` in row-major RGB order.
///
/// # Example
/// ```
/// use hpsep::display::{spectrogram_to_rgb, ColorMap};
/// use ndarray::Array2;
///
/// let spec = Array2::<f32>::zeros((128, 100));
/// let (width, height, pixels) = spectrogram_to_rgb(&spec, ColorMap::Viridis, None, None);
/// assert_eq!((width, height), (100, 128));
/// assert_eq!(pixels.len(), 100 * 128 * 3);
/// ```
pub fn spectrogram_to_rgb(
    data: &Array2<f32>,
    cmap: ColorMap,
    vmin: Option<f32>,
    vmax: Option<f32>,
) -> (usize, usize, Vec<u8>) {
    let (n_freq, n_time) = data.dim();
    if n_freq == 0 || n_time == 0 {
        return (0, 0, Vec::new());
    }

    let data_min = vmin.unwrap_or_else(|| data.iter().copied().fold(f32::INFINITY, f32::min));
    let data_max = vmax.unwrap_or_else(|| data.iter().copied().fold(f32::NEG_INFINITY, f32::max));
    let range = (data_max - data_min).max(1e-10);

    let mut pixels = Vec::with_capacity(n_freq * n_time * 3);
    for f in (0..n_freq).rev() {
        for t in 0..n_time {
            let normalized = ((data[(f, t)] - data_min) / range).clamp(0.0, 1.0);
            let (r, g, b) = cmap.to_rgb(normalized);
            pixels.extend_from_slice(&[r, g, b]);
        }
    }

    (n_time, n_freq, pixels)
}

/// Save RGB pixel data as a binary PPM (P6) image.
pub fn save_ppm<P: AsRef<Path>>(
    path: P,
    width: usize,
    height: usize,
    pixels: &[u8],
) -> crate::Result<()> {
    if pixels.len() != width * height * 3 {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("[{}]", width * height * 3),
            got: format!("[{}]", pixels.len()),
        });
    }
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(file, "P6")?;
    writeln!(file, "{} {}", width, height)?;
    writeln!(file, "255")?;
    file.write_all(pixels)?;
    file.flush()?;
    Ok(())
}

/// Render a complex spectrogram as a dB image.
///
/// Magnitudes are converted with [`spectrum::amplitude_to_db`] relative to
/// the peak and floored [`DEFAULT_TOP_DB`] below it.
///
/// # Errors
/// `Error::EmptySpectrogram` for an empty matrix, or any I/O error.
pub fn save_spectrogram<P: AsRef<Path>>(
    stft: &Array2<Complex32>,
    path: P,
    cmap: ColorMap,
) -> crate::Result<()> {
    if stft.is_empty() {
        return Err(crate::Error::EmptySpectrogram);
    }
    let magnitude = spectrum::magnitude(stft);
    let peak = magnitude.iter().copied().fold(0.0f32, f32::max);
    let db = spectrum::amplitude_to_db(&magnitude, peak, 1e-5, Some(DEFAULT_TOP_DB));
    let (width, height, pixels) = spectrogram_to_rgb(&db, cmap, None, None);
    save_ppm(path, width, height, &pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colormap_grayscale() {
        assert_eq!(ColorMap::Grayscale.to_rgb(0.0), (0, 0, 0));
        assert_eq!(ColorMap::Grayscale.to_rgb(1.0), (255, 255, 255));
        assert_eq!(ColorMap::Grayscale.to_rgb(2.0), (255, 255, 255));
    }

    #[test]
    fn test_colormap_viridis_brightens() {
        let (r, _, _) = ColorMap::Viridis.to_rgb(0.0);
        assert!(r < 100);
        let (r, g, _) = ColorMap::Viridis.to_rgb(1.0);
        assert!(g > 200 || r > 200);
    }

    #[test]
    fn test_colormap_from_str() {
        assert_eq!("viridis".parse::<ColorMap>().unwrap(), ColorMap::Viridis);
        assert_eq!("MAGMA".parse::<ColorMap>().unwrap(), ColorMap::Magma);
        assert_eq!("grey".parse::<ColorMap>().unwrap(), ColorMap::Grayscale);
        assert!("jet".parse::<ColorMap>().is_err());
    }

    #[test]
    fn test_low_frequency_at_bottom() {
        let mut data = Array2::<f32>::zeros((3, 2));
        data[(0, 0)] = 1.0;
        let (w, h, pixels) = spectrogram_to_rgb(&data, ColorMap::Grayscale, None, None);
        assert_eq!((w, h), (2, 3));
        // bottom-left pixel
        let idx = (2 * w) * 3;
        assert_eq!(&pixels[idx..idx + 3], &[255, 255, 255]);
        assert_eq!(&pixels[0..3], &[0, 0, 0]);
    }

    #[test]
    fn test_save_spectrogram_writes_header() {
        let dir = std::env::temp_dir().join(format!("hpsep-display-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("spec.ppm");

        let stft = Array2::from_shape_fn((5, 4), |(f, t)| Complex32::new((f + t) as f32, 0.0));
        save_spectrogram(&stft, &path, ColorMap::Magma).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P6\n4 5\n255\n"));
        assert_eq!(bytes.len(), b"P6\n4 5\n255\n".len() + 4 * 5 * 3);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_ppm_rejects_wrong_buffer() {
        let path = std::env::temp_dir().join("hpsep-display-bad.ppm");
        assert!(matches!(
            save_ppm(&path, 2, 2, &[0u8; 5]),
            Err(crate::Error::ShapeMismatch { .. })
        ));
    }
}

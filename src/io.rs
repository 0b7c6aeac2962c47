//! Audio codec collaborator and test-signal generators.
//!
//! Files are always loaded as mono at their native sample rate; the
//! separation itself never sees paths or formats.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("hound error: {0}")]
    Hound(#[from] hound::Error),
    #[error("symphonia error: {0}")]
    Symphonia(SymphoniaError),
    #[error("no audio track found")]
    NoAudioTrack,
    #[error("unsupported number of channels")]
    UnsupportedChannels,
    #[error("unsupported sample format: {bits}-bit {format}")]
    UnsupportedBitDepth { bits: u16, format: &'static str },
}

impl From<SymphoniaError> for AudioError {
    fn from(err: SymphoniaError) -> Self {
        Self::Symphonia(err)
    }
}

/// Sample encoding for [`save_wav`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    Pcm16,
    #[default]
    Pcm24,
    Float32,
}

impl BitDepth {
    fn spec(self, sample_rate: u32) -> WavSpec {
        let (bits_per_sample, sample_format) = match self {
            BitDepth::Pcm16 => (16, SampleFormat::Int),
            BitDepth::Pcm24 => (24, SampleFormat::Int),
            BitDepth::Float32 => (32, SampleFormat::Float),
        };
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample,
            sample_format,
        }
    }
}

/// Load an audio file as a mono signal at its native sample rate.
///
/// WAV files are read with hound; anything else is probed and decoded with
/// symphonia. Multi-channel audio is averaged down to one channel.
///
/// # Returns
/// `(samples, sample_rate)`
pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<(Vec<f32>, u32)> {
    let path = path.as_ref();
    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));

    let (interleaved, spec) = if is_wav {
        read_wav_interleaved(path)?
    } else {
        decode_interleaved(path)?
    };

    if spec.channels > 1 {
        debug!(
            "downmixing {} channels to mono ({})",
            spec.channels,
            path.display()
        );
    }
    Ok((to_mono(&interleaved, spec.channels), spec.sample_rate))
}

/// Load a WAV file as a mono signal; see [`load`].
pub fn load_wav<P: AsRef<Path>>(path: P) -> crate::Result<(Vec<f32>, u32)> {
    let (interleaved, spec) = read_wav_interleaved(path.as_ref())?;
    Ok((to_mono(&interleaved, spec.channels), spec.sample_rate))
}

fn read_wav_interleaved(path: &Path) -> Result<(Vec<f32>, AudioSpec), AudioError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::UnsupportedChannels);
    }

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        (SampleFormat::Int, bits @ 1..=16) => {
            let scale = (1i32 << (bits - 1)) as f32;
            reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
        (SampleFormat::Int, bits @ 17..=32) => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
        (SampleFormat::Float, bits) => {
            return Err(AudioError::UnsupportedBitDepth {
                bits,
                format: "float",
            });
        }
        (SampleFormat::Int, bits) => {
            return Err(AudioError::UnsupportedBitDepth {
                bits,
                format: "integer",
            });
        }
    };

    Ok((
        samples,
        AudioSpec {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        },
    ))
}

fn decode_interleaved(path: &Path) -> Result<(Vec<f32>, AudioSpec), AudioError> {
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let file = std::fs::File::open(path).map_err(SymphoniaError::IoError)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.sample_rate.is_some())
        .ok_or(AudioError::NoAudioTrack)?
        .clone();

    let sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);
    if channels == 0 {
        return Err(AudioError::UnsupportedChannels);
    }

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            // end of stream
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track.id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(audio) => audio,
            Err(SymphoniaError::IoError(_)) => break,
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        let mut sb = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        sb.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sb.samples());
    }

    Ok((
        samples,
        AudioSpec {
            sample_rate,
            channels,
        },
    ))
}

/// Average interleaved multi-channel samples down to one channel.
///
/// A trailing partial frame is dropped.
pub fn to_mono(interleaved: &[f32], channels: u16) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Save a mono signal to a WAV file.
///
/// Integer encodings clip samples to `[-1.0, 1.0]` before quantizing.
///
/// # Errors
/// Returns `Error::Audio` if the file cannot be created or written.
pub fn save_wav<P: AsRef<Path>>(
    path: P,
    signal: &[f32],
    sample_rate: u32,
    bit_depth: BitDepth,
) -> crate::Result<()> {
    let mut writer = WavWriter::create(path, bit_depth.spec(sample_rate)).map_err(AudioError::Hound)?;
    match bit_depth {
        BitDepth::Pcm16 => {
            for &x in signal {
                let s = (x.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer.write_sample(s).map_err(AudioError::Hound)?;
            }
        }
        BitDepth::Pcm24 => {
            const PCM24_MAX: f32 = 8_388_607.0;
            for &x in signal {
                let s = (x.clamp(-1.0, 1.0) * PCM24_MAX) as i32;
                writer.write_sample(s).map_err(AudioError::Hound)?;
            }
        }
        BitDepth::Float32 => {
            for &x in signal {
                writer.write_sample(x).map_err(AudioError::Hound)?;
            }
        }
    }
    writer.finalize().map_err(AudioError::Hound)?;
    Ok(())
}

/// Generate a pure tone.
pub fn tone(frequency: f32, sr: u32, duration: f32) -> Vec<f32> {
    let n_samples = (duration * sr as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sr as f32;
    (0..n_samples)
        .map(|i| (angular_freq * i as f32).sin())
        .collect()
}

/// Generate a click signal: short exponentially decaying sine bursts at `times` (seconds).
pub fn clicks(
    times: &[f32],
    sr: u32,
    length: usize,
    click_duration: f32,
    click_freq: f32,
) -> Vec<f32> {
    let mut y = vec![0.0f32; length];

    let click_samples = (click_duration * sr as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * click_freq / sr as f32;

    for &time in times {
        let start = (time * sr as f32) as usize;
        for (i, slot) in y.iter_mut().skip(start).take(click_samples).enumerate() {
            let t = i as f32;
            let envelope = (-t / (click_samples as f32 * 0.1)).exp();
            *slot += envelope * (angular_freq * t).sin();
        }
    }
    y
}

/// Generate a periodic train of single-sample impulses.
///
/// Impulses of height `amplitude` sit at `offset`, `offset + period`, ...
/// up to `length`. A zero `period` yields a single impulse at `offset`.
pub fn impulse_train(length: usize, period: usize, offset: usize, amplitude: f32) -> Vec<f32> {
    let mut y = vec![0.0f32; length];
    if period == 0 {
        if let Some(v) = y.get_mut(offset) {
            *v = amplitude;
        }
        return y;
    }
    for v in y.iter_mut().skip(offset).step_by(period) {
        *v = amplitude;
    }
    y
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tone_length_and_range() {
        let y = tone(440.0, 22050, 0.5);
        assert_eq!(y.len(), 11025);
        assert!(y.iter().all(|v| v.abs() <= 1.0));
        assert_eq!(y[0], 0.0);
    }

    #[test]
    fn test_clicks_positions() {
        let y = clicks(&[0.1, 0.5], 1000, 1000, 0.01, 200.0);
        assert_eq!(y.len(), 1000);
        assert!(y[..100].iter().all(|&v| v == 0.0));
        assert!(y[100..110].iter().any(|&v| v != 0.0));
        assert!(y[110..500].iter().all(|&v| v == 0.0));
        assert!(y[500..510].iter().any(|&v| v != 0.0));
    }

    #[test]
    fn test_clicks_past_end_are_ignored() {
        let y = clicks(&[2.0], 1000, 500, 0.01, 200.0);
        assert!(y.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_impulse_train() {
        let y = impulse_train(20, 6, 2, 0.5);
        let hits: Vec<usize> = y
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(hits, vec![2, 8, 14]);
        assert_eq!(y[8], 0.5);

        let single = impulse_train(5, 0, 3, 1.0);
        assert_eq!(single, vec![0.0, 0.0, 0.0, 1.0, 0.0]);
        assert!(impulse_train(5, 0, 9, 1.0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_to_mono() {
        let stereo = [1.0f32, 0.0, 0.5, 0.5, -1.0, 1.0, 0.25];
        let mono = to_mono(&stereo, 2);
        assert_eq!(mono.len(), 3);
        assert_relative_eq!(mono[0], 0.5);
        assert_relative_eq!(mono[1], 0.5);
        assert_relative_eq!(mono[2], 0.0);

        assert_eq!(to_mono(&[0.1, 0.2], 1), vec![0.1, 0.2]);
    }

    #[test]
    fn test_default_bit_depth_is_24() {
        let spec = BitDepth::default().spec(44100);
        assert_eq!(spec.bits_per_sample, 24);
        assert_eq!(spec.channels, 1);
    }
}

//! Separate an audio file into harmonic and percussive WAV files.
//!
//! Usage: `cargo run --example separate_file -- <input> [output_dir]`
//!
//! Writes `H.wav` and `P.wav` (24-bit PCM at the input's sample rate) into
//! `output_dir` (default `output`). With the `display` feature, spectrogram
//! images of the input and both components are written alongside.

use hpsep::io::{self, BitDepth};
use hpsep::{SeparationConfig, diagnostics, separate_signal};
use log::info;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .ok_or("usage: separate_file <input> [output_dir]")?;
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "output".to_string()));

    info!("Loading {}", input);
    let (signal, sr) = io::load(&input)?;
    info!(
        "Loaded {} samples at {} Hz ({:.2} s)",
        signal.len(),
        sr,
        signal.len() as f32 / sr as f32
    );

    let cfg = SeparationConfig::default();
    info!(
        "Separating with gamma = {}, a_h = {}, a_p = {}, k_max = {}, frame = {}",
        cfg.gamma, cfg.harmonic_weight, cfg.percussive_weight, cfg.max_iterations, cfg.frame_size
    );
    let out = separate_signal(&signal, &cfg)?;

    std::fs::create_dir_all(&out_dir)?;
    let h_path = out_dir.join("H.wav");
    let p_path = out_dir.join("P.wav");
    io::save_wav(&h_path, &out.harmonic, sr, BitDepth::Pcm24)?;
    io::save_wav(&p_path, &out.percussive, sr, BitDepth::Pcm24)?;
    info!("Wrote {} and {}", h_path.display(), p_path.display());

    let total = diagnostics::energy(&signal);
    let h_energy = diagnostics::energy(&out.harmonic);
    let p_energy = diagnostics::energy(&out.percussive);
    info!("Energy:");
    info!("  - Input: {:.4}", total);
    info!(
        "  - Harmonic: {:.4} ({:.1}%)",
        h_energy,
        h_energy / total.max(f64::MIN_POSITIVE) * 100.0
    );
    info!(
        "  - Percussive: {:.4} ({:.1}%)",
        p_energy,
        p_energy / total.max(f64::MIN_POSITIVE) * 100.0
    );
    info!(
        "SNR vs input: harmonic {:.2} dB, percussive {:.2} dB",
        diagnostics::snr_db(&signal, &out.harmonic)?,
        diagnostics::snr_db(&signal, &out.percussive)?
    );

    #[cfg(feature = "display")]
    {
        use hpsep::display::{ColorMap, save_spectrogram};
        use hpsep::spectrum;

        for (name, y) in [
            ("input", &signal),
            ("H", &out.harmonic),
            ("P", &out.percussive),
        ] {
            let stft = spectrum::forward(y, cfg.frame_size)?;
            let path = out_dir.join(format!("{name}.ppm"));
            save_spectrogram(&stft, &path, ColorMap::Magma)?;
            info!("Wrote {}", path.display());
        }
    }

    Ok(())
}

//! Sweep the compression exponent and the iteration budget and log SNR tables.
//!
//! Usage: `cargo run --example parameter_sweep -- [input]`
//!
//! Without an input file, a synthetic tone-plus-clicks signal is used.

use hpsep::diagnostics::{SweepPoint, sweep_gamma, sweep_iterations};
use hpsep::{SeparationConfig, io};
use log::info;

fn log_table(label: &str, points: &[SweepPoint]) {
    info!("{:>10} | {:>12} | {:>12}", label, "harmonic dB", "percussive dB");
    for p in points {
        info!(
            "{:>10.3} | {:>12.2} | {:>12.2}",
            p.value, p.harmonic_snr_db, p.percussive_snr_db
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let signal = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading {}", path);
            io::load(&path)?.0
        }
        None => {
            let sr = 22050;
            let tone = io::tone(440.0, sr, 2.0);
            let clicks = io::impulse_train(tone.len(), sr as usize / 4, sr as usize / 8, 1.0);
            tone.iter().zip(&clicks).map(|(t, c)| 0.5 * t + c).collect()
        }
    };
    info!("Signal: {} samples", signal.len());

    let base = SeparationConfig::default();

    let gammas = [0.25, 0.5, 0.75, 1.0];
    info!("Gamma sweep (k_max = {})", base.max_iterations);
    log_table("gamma", &sweep_gamma(&signal, &base, &gammas)?);

    let k_values = [5, 10, 20, 60, 100];
    info!("Iteration sweep (gamma = {})", base.gamma);
    log_table("k_max", &sweep_iterations(&signal, &base, &k_values)?);

    Ok(())
}

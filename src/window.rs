/// Compute a periodic Hann (raised cosine) window.
///
/// The periodic form satisfies constant overlap-add at hops of `n / 2` and
/// `n / 4`, which the spectral front-end relies on for exact resynthesis.
///
/// # Arguments
/// * `n` - Window length
///
/// # Returns
/// Hann window of length `n`
pub fn hann(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = n as f32;
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / m).cos())
        .collect()
}

/// Sum of squared windows over `n_frames` frames spaced `hop_length` apart.
///
/// This is the normalization envelope of weighted overlap-add: dividing the
/// overlap-added output by it undoes the analysis and synthesis windows.
/// The output has length `(n_frames - 1) * hop_length + window.len()`.
pub fn window_sumsquare(window: &[f32], n_frames: usize, hop_length: usize) -> Vec<f32> {
    if window.is_empty() || n_frames == 0 || hop_length == 0 {
        return Vec::new();
    }

    let out_len = (n_frames - 1) * hop_length + window.len();
    let mut wss = vec![0.0f32; out_len];

    for frame_idx in 0..n_frames {
        let offset = frame_idx * hop_length;
        for (i, &w) in window.iter().enumerate() {
            wss[offset + i] += w * w;
        }
    }

    wss
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hann_window() {
        let w = hann(512);
        assert_eq!(w.len(), 512);
        assert!(w.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(w[0] < 1e-6);
        assert_relative_eq!(w[256], 1.0, epsilon = 1e-6);
        // periodic: symmetric around n/2, not (n-1)/2
        assert_relative_eq!(w[1], w[511], epsilon = 1e-6);
    }

    #[test]
    fn test_hann_degenerate_lengths() {
        assert!(hann(0).is_empty());
        assert_eq!(hann(1), vec![1.0]);
    }

    #[test]
    fn test_window_sumsquare_quarter_hop_is_flat() {
        let window = hann(256);
        let wss = window_sumsquare(&window, 12, 64);
        assert_eq!(wss.len(), 11 * 64 + 256);

        // fully overlapped region: four frames, sum of w^2 is 1.5
        for &v in &wss[256..wss.len() - 256] {
            assert_relative_eq!(v, 1.5, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_window_sumsquare_single_frame() {
        let window = hann(128);
        let wss = window_sumsquare(&window, 1, 32);
        assert_eq!(wss.len(), 128);
        for (v, w) in wss.iter().zip(window.iter()) {
            assert_relative_eq!(*v, w * w, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_window_sumsquare_empty() {
        assert!(window_sumsquare(&[], 10, 256).is_empty());
        assert!(window_sumsquare(&hann(64), 0, 16).is_empty());
    }
}

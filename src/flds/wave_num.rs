use crate::Float;

/// Sample frequencies of an `n` point DFT with sample spacing `d`, in cycles
/// per unit length. Same ordering as the transform output: zero first, then
/// the positive frequencies, then the negative ones from the upper half.
pub fn fft_freq(n: usize, d: Float) -> Vec<Float> {
    let norm = 1.0 / (n as Float * d);
    (0..n)
        .map(|i| {
            let mut k = i as Float;
            if i >= (n + 1) / 2 {
                k -= n as Float;
            }
            k * norm
        })
        .collect()
}

/// Wavenumbers along both homogeneous directions of a (th, z) plane, in
/// cycles per unit length.
pub struct WaveNumbers {
    pub k_th: Vec<Float>,
    pub k_z: Vec<Float>,
}

impl WaveNumbers {
    /// `d_th` is the azimuthal spacing as arc length, `d_z` the axial spacing.
    pub fn new(n_th: usize, d_th: Float, n_z: usize, d_z: Float) -> WaveNumbers {
        WaveNumbers {
            k_th: fft_freq(n_th, d_th),
            k_z: fft_freq(n_z, d_z),
        }
    }
}

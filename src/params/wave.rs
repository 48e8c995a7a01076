//! Wave synthesis and heightfield parameters.

use crate::idft::{Idft, Magnitude};
use crate::noise::NoiseKind;

/// Frequency components used when none are given on the command line
pub const DEFAULT_MAGNITUDES: [Magnitude; 3] = [
    Magnitude::new(2.0, 0.0, 2.5),
    Magnitude::new(4.0, 1.25, 0.0),
    Magnitude::new(6.0, 0.0, 0.625),
];

/// Heightfield layout and wave synthesis parameters
#[derive(Debug, Clone)]
pub struct WavePhysics {
    /// Sample rows along X (one synthesis call per row)
    pub rows: usize,

    /// Samples per row along Y
    pub columns: usize,

    /// World position of the first sample (x, y)
    pub origin: [f64; 2],

    /// Distance between neighbouring samples (world units)
    pub spacing: f64,

    /// Frequency components summed by the inverse DFT
    pub magnitudes: Vec<Magnitude>,

    /// Synthesis time between consecutive samples of a row
    pub sample_step: f64,

    /// Synthesis time advance per row
    pub time_step: f64,

    pub noise: NoiseKind,

    /// Multiplier on the [0, 0.99] noise range
    pub noise_scale: f64,

    /// Noise RNG / permutation seed
    pub noise_seed: u32,

    /// Perlin spatial frequency (cycles per world unit)
    pub perlin_frequency: f64,

    /// Perlin scroll speed relative to synthesis time
    pub perlin_speed: f64,
}

impl Default for WavePhysics {
    fn default() -> Self {
        Self {
            rows: 101, // x = -50..=50
            columns: 100,
            origin: [-50.0, -50.0],
            spacing: 1.0,
            magnitudes: DEFAULT_MAGNITUDES.to_vec(),
            sample_step: Idft::DEFAULT_SAMPLE_STEP,
            time_step: Idft::DEFAULT_TIME_STEP,
            noise: NoiseKind::White,
            noise_scale: 1.0,
            noise_seed: 1,
            perlin_frequency: 0.15,
            perlin_speed: 10.0,
        }
    }
}

impl WavePhysics {
    /// World X coordinate of a sample row
    pub fn row_x(&self, row: usize) -> f64 {
        self.origin[0] + row as f64 * self.spacing
    }

    /// World Y coordinate of a sample column
    pub fn column_y(&self, column: usize) -> f64 {
        self.origin[1] + column as f64 * self.spacing
    }

    pub fn sample_count(&self) -> usize {
        self.rows * self.columns
    }
}

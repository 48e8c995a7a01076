//! Noise generation for perturbing the wave surface.
//!
//! White noise reproduces the classic jittery look (fresh uniform values each
//! frame); Perlin gives a smoother, coherent shimmer.

use clap::ValueEnum;
use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Noise flavour applied on top of the synthesized wave
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum NoiseKind {
    /// Uniform random steps of 0.01 in [0, 0.99]
    #[default]
    White,
    /// Coherent Perlin noise mapped into the same range
    Perlin,
    /// No perturbation
    Off,
}

enum Source {
    White(StdRng),
    Perlin {
        perlin: Perlin,
        frequency: f64,
        speed: f64,
    },
    Off,
}

/// Noise generator for the wave heightfield
pub struct NoiseGenerator {
    source: Source,
    scale: f64,
}

impl NoiseGenerator {
    /// Largest value produced before scaling
    pub const PEAK: f64 = 0.99;

    /// Create new noise generator with seed
    ///
    /// `frequency` and `speed` only matter for [`NoiseKind::Perlin`].
    pub fn new(kind: NoiseKind, seed: u32, scale: f64, frequency: f64, speed: f64) -> Self {
        let source = match kind {
            NoiseKind::White => Source::White(StdRng::seed_from_u64(u64::from(seed))),
            NoiseKind::Perlin => Source::Perlin {
                perlin: Perlin::new(seed),
                frequency,
                speed,
            },
            NoiseKind::Off => Source::Off,
        };

        Self { source, scale }
    }

    pub fn kind(&self) -> NoiseKind {
        match self.source {
            Source::White(_) => NoiseKind::White,
            Source::Perlin { .. } => NoiseKind::Perlin,
            Source::Off => NoiseKind::Off,
        }
    }

    /// Fill one heightfield row located at `x`, with samples at
    /// `y_start + i * spacing`, for synthesis time `t`.
    pub fn fill_row(&mut self, x: f64, y_start: f64, spacing: f64, t: f64, out: &mut [f64]) {
        let scale = self.scale;

        match &mut self.source {
            Source::White(rng) => {
                for sample in out.iter_mut() {
                    *sample = 0.01 * f64::from(rng.gen_range(0..100u32)) * scale;
                }
            }
            Source::Perlin {
                perlin,
                frequency,
                speed,
            } => {
                for (i, sample) in out.iter_mut().enumerate() {
                    let y = y_start + i as f64 * spacing;
                    let value = perlin.get([x * *frequency, y * *frequency, t * *speed]);
                    // Perlin is nominally [-1, 1]; clamp the rare overshoot
                    *sample = (0.5 * (value + 1.0)).clamp(0.0, 1.0) * Self::PEAK * scale;
                }
            }
            Source::Off => out.fill(0.0),
        }
    }
}

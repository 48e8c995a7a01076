//! Per-frame heightfield synthesis: inverse DFT plus noise.

use super::mesh::SurfaceGrid;
use crate::idft::{Idft, IdftError};
use crate::noise::NoiseGenerator;
use crate::params::WavePhysics;

/// Wave surface owning the synthesizer, the noise source and the mesh
pub struct WaveSurface {
    pub grid: SurfaceGrid,
    physics: WavePhysics,
    idft: Idft,
    noise: NoiseGenerator,
    heights: Vec<f64>,
    dft_row: Vec<f64>,
    noise_row: Vec<f64>,
}

impl WaveSurface {
    /// Create new wave surface with specified parameters
    pub fn new(physics: WavePhysics) -> Result<Self, IdftError> {
        let idft = Idft::new(&physics.magnitudes)?
            .with_steps(physics.sample_step, physics.time_step);
        let noise = NoiseGenerator::new(
            physics.noise,
            physics.noise_seed,
            physics.noise_scale,
            physics.perlin_frequency,
            physics.perlin_speed,
        );

        Ok(Self {
            grid: SurfaceGrid::new(&physics),
            idft,
            noise,
            heights: vec![0.0; physics.sample_count()],
            dft_row: vec![0.0; physics.columns],
            noise_row: vec![0.0; physics.columns],
            physics,
        })
    }

    /// Recompute every row of the heightfield and refresh the mesh
    ///
    /// Rows are synthesized in order and each one advances the synthesis time,
    /// so row `r` is sampled `r * time_step` later than row 0.
    pub fn update(&mut self) -> Result<(), IdftError> {
        let columns = self.physics.columns;

        for row in 0..self.physics.rows {
            self.noise.fill_row(
                self.physics.row_x(row),
                self.physics.origin[1],
                self.physics.spacing,
                self.idft.time(),
                &mut self.noise_row,
            );
            self.idft.calc(&mut self.dft_row)?;

            let out = &mut self.heights[row * columns..(row + 1) * columns];
            for ((height, dft), noise) in out.iter_mut().zip(&self.dft_row).zip(&self.noise_row) {
                *height = dft + noise;
            }
        }

        self.grid.set_heights(&self.heights);
        Ok(())
    }

    /// Raw heights, row-major
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    pub fn height(&self, row: usize, column: usize) -> f64 {
        self.heights[row * self.physics.columns + column]
    }

    /// Current synthesis time
    pub fn time(&self) -> f64 {
        self.idft.time()
    }
}

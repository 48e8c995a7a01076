//! Surface mesh with static topology and per-frame heights.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::params::WavePhysics;

/// Vertex data for the surface mesh (position + normal)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Grid mesh laid out row-major: `rows` along X, `columns` along Y, Z is height
pub struct SurfaceGrid {
    pub vertices: Vec<Vertex>,
    /// Segments joining each sample to the same column in the next row
    pub line_indices: Vec<u32>,
    /// Two counter-clockwise (seen from +Z) triangles per cell
    pub triangle_indices: Vec<u32>,
    rows: usize,
    columns: usize,
    spacing: f32,
}

impl SurfaceGrid {
    /// Create a flat grid with the layout from `physics`
    pub fn new(physics: &WavePhysics) -> Self {
        let rows = physics.rows;
        let columns = physics.columns;

        let mut vertices = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for column in 0..columns {
                vertices.push(Vertex {
                    position: [
                        physics.row_x(row) as f32,
                        physics.column_y(column) as f32,
                        0.0,
                    ],
                    normal: [0.0, 0.0, 1.0],
                });
            }
        }

        let mut line_indices = Vec::new();
        for row in 0..rows.saturating_sub(1) {
            for column in 0..columns {
                let here = (row * columns + column) as u32;
                line_indices.extend_from_slice(&[here, here + columns as u32]);
            }
        }

        let mut triangle_indices = Vec::new();
        for row in 0..rows.saturating_sub(1) {
            for column in 0..columns.saturating_sub(1) {
                let top_left = (row * columns + column) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((row + 1) * columns + column) as u32;
                let bottom_right = bottom_left + 1;

                triangle_indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        }

        Self {
            vertices,
            line_indices,
            triangle_indices,
            rows,
            columns,
            spacing: physics.spacing as f32,
        }
    }

    pub fn index(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }

    /// Write `heights` (row-major, one per vertex) into Z and refresh normals
    pub fn set_heights(&mut self, heights: &[f64]) {
        for (vertex, height) in self.vertices.iter_mut().zip(heights) {
            vertex.position[2] = *height as f32;
        }
        self.recompute_normals();
    }

    fn height(&self, row: usize, column: usize) -> f32 {
        self.vertices[self.index(row, column)].position[2]
    }

    /// Central differences inside the grid, one-sided along the edges
    fn recompute_normals(&mut self) {
        let (rows, columns) = (self.rows, self.columns);

        for row in 0..rows {
            for column in 0..columns {
                let (r0, r1) = (row.saturating_sub(1), (row + 1).min(rows - 1));
                let (c0, c1) = (column.saturating_sub(1), (column + 1).min(columns - 1));

                let dz_dx = if r1 > r0 {
                    (self.height(r1, column) - self.height(r0, column))
                        / ((r1 - r0) as f32 * self.spacing)
                } else {
                    0.0
                };
                let dz_dy = if c1 > c0 {
                    (self.height(row, c1) - self.height(row, c0))
                        / ((c1 - c0) as f32 * self.spacing)
                } else {
                    0.0
                };

                let normal = Vec3::new(-dz_dx, -dz_dy, 1.0).normalize();
                let idx = self.index(row, column);
                self.vertices[idx].normal = normal.to_array();
            }
        }
    }
}

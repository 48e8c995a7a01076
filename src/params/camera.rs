//! Camera presets.

/// Stationary camera looking at the middle of the surface
#[derive(Debug, Clone)]
pub struct FixedCamera {
    /// Eye position (world units, Z up)
    pub position: [f32; 3],

    /// Look-at target
    pub target: [f32; 3],
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            position: [-110.0, -30.0, 50.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// Camera circling the surface around the Z axis
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Starting eye position; radius and altitude are kept from here
    pub start: [f32; 3],

    /// Look-at target (also the orbit centre in XY)
    pub target: [f32; 3],

    /// Angular speed (degrees per second, positive = counter-clockwise)
    pub degrees_per_s: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let fixed = FixedCamera::default();
        Self {
            start: fixed.position,
            target: fixed.target,
            degrees_per_s: 10.0,
        }
    }
}

/// Camera preset selection
#[derive(Debug, Clone)]
pub enum CameraPreset {
    Fixed(FixedCamera),
    Orbit(OrbitCamera),
}

impl Default for CameraPreset {
    fn default() -> Self {
        Self::Fixed(FixedCamera::default())
    }
}

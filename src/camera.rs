//! Camera system: fixed or orbiting view of the wave surface (Z up).

use glam::{Mat4, Quat, Vec3};

use crate::params::{CameraPreset, FixedCamera, OrbitCamera, RenderConfig};

/// Camera system driven by a preset
pub struct CameraSystem {
    preset: CameraPreset,
}

impl CameraSystem {
    /// Create new camera system with specified preset
    pub fn new(preset: CameraPreset) -> Self {
        Self { preset }
    }

    /// Compute camera position and look-at target for given time
    ///
    /// # Returns
    /// Tuple of (eye_position, target_position)
    pub fn compute_position_and_target(&self, time_s: f32) -> (Vec3, Vec3) {
        match &self.preset {
            CameraPreset::Fixed(params) => Self::compute_fixed(params),
            CameraPreset::Orbit(params) => Self::compute_orbit(params, time_s),
        }
    }

    fn compute_fixed(p: &FixedCamera) -> (Vec3, Vec3) {
        (Vec3::from_array(p.position), Vec3::from_array(p.target))
    }

    /// Rotate the start offset around the vertical axis through the target
    fn compute_orbit(p: &OrbitCamera, time_s: f32) -> (Vec3, Vec3) {
        let target = Vec3::from_array(p.target);
        let offset = Vec3::from_array(p.start) - target;
        let rotation = Quat::from_rotation_z((time_s * p.degrees_per_s).to_radians());

        (target + rotation * offset, target)
    }

    /// Create view-projection matrix for rendering
    ///
    /// # Returns
    /// Tuple of (view_proj_matrix, camera_position)
    pub fn create_view_proj_matrix(
        &self,
        time_s: f32,
        aspect_ratio: f32,
        render_config: &RenderConfig,
    ) -> (Mat4, Vec3) {
        let (eye, target) = self.compute_position_and_target(time_s);

        let view = Mat4::look_at_rh(eye, target, Vec3::Z);
        let proj = Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            aspect_ratio,
            render_config.near_plane,
            render_config.far_plane,
        );

        (proj * view, eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4Swizzles;

    #[test]
    fn test_fixed_camera_ignores_time() {
        let camera = CameraSystem::new(CameraPreset::default());
        let (eye0, target0) = camera.compute_position_and_target(0.0);
        let (eye1, target1) = camera.compute_position_and_target(12.5);

        assert_eq!(eye0, Vec3::new(-110.0, -30.0, 50.0));
        assert_eq!(target0, Vec3::ZERO);
        assert_eq!(eye0, eye1);
        assert_eq!(target0, target1);
    }

    #[test]
    fn test_orbit_keeps_radius_and_altitude() {
        let params = OrbitCamera::default();
        let camera = CameraSystem::new(CameraPreset::Orbit(params.clone()));
        let start = Vec3::from_array(params.start);

        for t in 0..36 {
            let (eye, target) = camera.compute_position_and_target(t as f32);
            assert!((eye.z - start.z).abs() < 1e-3);
            assert!((eye.truncate().length() - start.truncate().length()).abs() < 1e-3);
            assert_eq!(target, Vec3::ZERO);
        }
    }

    #[test]
    fn test_orbit_quarter_turn() {
        let params = OrbitCamera {
            start: [10.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
            degrees_per_s: 90.0,
        };
        let camera = CameraSystem::new(CameraPreset::Orbit(params));
        let (eye, _) = camera.compute_position_and_target(1.0);

        assert!(eye.distance(Vec3::new(0.0, 10.0, 5.0)) < 1e-4);
    }

    #[test]
    fn test_orbit_screenshot_differs_from_first_frame() {
        use crate::params::ScreenshotConfig;

        let camera = CameraSystem::new(CameraPreset::Orbit(OrbitCamera::default()));
        let screenshot = ScreenshotConfig::new("out.png", 120);
        let (start, _) = camera.compute_position_and_target(0.0);
        let (captured, _) = camera.compute_position_and_target(screenshot.capture_time_s());

        // 120 frames at 60 fps is 2 s, or 20 degrees at the default speed
        assert!(start.distance(captured) > 1.0);
    }

    #[test]
    fn test_target_projects_to_screen_centre() {
        let camera = CameraSystem::new(CameraPreset::default());
        let config = RenderConfig::default();
        let (view_proj, eye) = camera.create_view_proj_matrix(0.0, config.aspect_ratio(), &config);

        let clip = view_proj * Vec3::ZERO.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
        assert!(eye.is_finite());
    }

    #[test]
    fn test_up_is_positive_z() {
        let camera = CameraSystem::new(CameraPreset::default());
        let config = RenderConfig::default();
        let (view_proj, _) = camera.create_view_proj_matrix(0.0, config.aspect_ratio(), &config);

        // A point above the target lands above the screen centre
        let clip = view_proj * Vec3::new(0.0, 0.0, 10.0).extend(1.0);
        assert!(clip.y / clip.w > 0.0);
    }
}

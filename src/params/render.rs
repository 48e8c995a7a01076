//! Rendering and screenshot configuration.

use std::path::PathBuf;

use clap::ValueEnum;

/// How the heightfield is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DrawStyle {
    /// Flat-coloured line segments between neighbouring rows
    #[default]
    Lines,
    /// Depth-tested triangles with a directional light
    Lit,
}

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub window_title: String,

    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Initial window position (pixels)
    pub window_position: [i32; 2],

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (world units)
    pub near_plane: f32,

    /// Far clipping plane, i.e. render distance (world units)
    pub far_plane: f32,

    pub style: DrawStyle,

    /// Surface colour (sRGB, as it should appear on screen)
    pub color: [f32; 3],

    /// Direction the light travels (world space, need not be normalized)
    pub light_direction: [f32; 3],

    /// Ambient term for the lit style, 0..1
    pub ambient: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_title: "Wave noise simulator".to_string(),
            window_width: 800,
            window_height: 600,
            window_position: [80, 80],
            fov_degrees: 50.0,
            near_plane: 1.0,
            far_plane: 200.0,
            style: DrawStyle::Lines,
            color: [0.0, 0.6, 1.0],
            light_direction: [1.0, 0.5, -1.0],
            ambient: 0.2,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        aspect_ratio(self.window_width, self.window_height)
    }
}

/// Width over height, treating a zero height as one pixel
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}

/// Headless screenshot configuration
#[derive(Debug, Clone)]
pub struct ScreenshotConfig {
    /// Output PNG path
    pub path: PathBuf,

    /// Frames simulated before the captured one (at least 1)
    pub frames: usize,
}

impl ScreenshotConfig {
    /// Nominal frame rate used to turn simulated frames into camera time
    pub const FRAME_RATE: f32 = 60.0;

    pub fn new(path: impl Into<PathBuf>, frames: usize) -> Self {
        Self {
            path: path.into(),
            frames: frames.max(1),
        }
    }

    /// Camera time of the captured frame, as if the window had run at `FRAME_RATE`
    pub fn capture_time_s(&self) -> f32 {
        self.frames as f32 / Self::FRAME_RATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_guards_zero_height() {
        assert_eq!(aspect_ratio(800, 0), 800.0);
        assert!((RenderConfig::default().aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_screenshot_renders_at_least_one_frame() {
        assert_eq!(ScreenshotConfig::new("a.png", 0).frames, 1);
        assert_eq!(ScreenshotConfig::new("a.png", 30).frames, 30);
    }

    #[test]
    fn test_capture_time_follows_frame_count() {
        assert_eq!(ScreenshotConfig::new("a.png", 30).capture_time_s(), 0.5);
        assert_eq!(ScreenshotConfig::new("a.png", 120).capture_time_s(), 2.0);
    }
}

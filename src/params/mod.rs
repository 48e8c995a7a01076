//! Parameter definitions with units and documented semantics.
//!
//! Defaults reproduce the classic demo; the command line overrides them.

mod camera;
mod render;
mod wave;

// Re-export all types
pub use camera::{CameraPreset, FixedCamera, OrbitCamera};
pub use render::{aspect_ratio, DrawStyle, RenderConfig, ScreenshotConfig};
pub use wave::{WavePhysics, DEFAULT_MAGNITUDES};

//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::idft::Magnitude;
use crate::noise::NoiseKind;
use crate::params::{
    CameraPreset, DrawStyle, FixedCamera, OrbitCamera, RenderConfig, ScreenshotConfig,
    WavePhysics,
};

/// Camera choice on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CameraChoice {
    #[default]
    Fixed,
    Orbit,
}

/// Time steps must be finite or every height turns to NaN
fn parse_finite(s: &str) -> Result<f64, String> {
    let value: f64 = s.trim().parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{s} is not a finite number"))
    }
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "waves")]
#[command(about = "Animated wave surface from inverse DFT synthesis plus noise", long_about = None)]
pub struct Args {
    /// How the surface is drawn
    #[arg(long, value_enum, default_value_t = DrawStyle::Lines)]
    pub style: DrawStyle,

    /// Noise applied on top of the wave
    #[arg(long, value_enum, default_value_t = NoiseKind::White)]
    pub noise: NoiseKind,

    /// Multiplier on the noise amplitude
    #[arg(long, value_name = "FACTOR", default_value_t = 1.0)]
    pub noise_scale: f64,

    /// Noise seed
    #[arg(long, default_value_t = 1)]
    pub seed: u32,

    /// Frequency component as frequency:sine:cosine (repeatable, replaces the defaults)
    #[arg(long = "magnitude", value_name = "F:S:C", allow_hyphen_values = true)]
    pub magnitudes: Vec<Magnitude>,

    /// Synthesis time advance per heightfield row
    #[arg(long, value_name = "SECONDS", value_parser = parse_finite)]
    pub time_step: Option<f64>,

    /// Synthesis time between samples within a row
    #[arg(long, value_name = "SECONDS", value_parser = parse_finite)]
    pub sample_step: Option<f64>,

    /// Camera preset
    #[arg(long, value_enum, default_value_t = CameraChoice::Fixed)]
    pub camera: CameraChoice,

    /// Orbit speed for the orbit camera (degrees per second)
    #[arg(long, value_name = "DEG_PER_S", default_value_t = 10.0)]
    pub orbit_speed: f32,

    /// Window (or screenshot) width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Window (or screenshot) height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Render headless and write a PNG instead of opening a window
    #[arg(long, value_name = "PATH")]
    pub screenshot: Option<PathBuf>,

    /// Frames to simulate before taking the screenshot
    #[arg(long, default_value_t = 1)]
    pub frames: usize,
}

impl Args {
    /// Wave parameters with command-line overrides applied
    pub fn wave_physics(&self) -> WavePhysics {
        let mut physics = WavePhysics {
            noise: self.noise,
            noise_scale: self.noise_scale,
            noise_seed: self.seed,
            ..WavePhysics::default()
        };

        if !self.magnitudes.is_empty() {
            physics.magnitudes = self.magnitudes.clone();
        }
        if let Some(step) = self.time_step {
            physics.time_step = step;
        }
        if let Some(step) = self.sample_step {
            physics.sample_step = step;
        }

        physics
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width,
            window_height: self.height,
            style: self.style,
            ..RenderConfig::default()
        }
    }

    pub fn camera_preset(&self) -> CameraPreset {
        match self.camera {
            CameraChoice::Fixed => CameraPreset::Fixed(FixedCamera::default()),
            CameraChoice::Orbit => CameraPreset::Orbit(OrbitCamera {
                degrees_per_s: self.orbit_speed,
                ..OrbitCamera::default()
            }),
        }
    }

    pub fn screenshot_config(&self) -> Option<ScreenshotConfig> {
        self.screenshot
            .as_ref()
            .map(|path| ScreenshotConfig::new(path.clone(), self.frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DEFAULT_MAGNITUDES;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("waves").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_match_classic_demo() {
        let args = parse(&[]);
        let physics = args.wave_physics();
        let render = args.render_config();

        assert_eq!(physics.magnitudes, DEFAULT_MAGNITUDES.to_vec());
        assert_eq!(physics.noise, NoiseKind::White);
        assert_eq!(physics.noise_seed, 1);
        assert_eq!(render.style, DrawStyle::Lines);
        assert_eq!((render.window_width, render.window_height), (800, 600));
        assert!(matches!(args.camera_preset(), CameraPreset::Fixed(_)));
        assert!(args.screenshot_config().is_none());
    }

    #[test]
    fn test_magnitudes_replace_defaults() {
        let args = parse(&["--magnitude", "1:0:1", "--magnitude", "3:-0.5:0"]);

        assert_eq!(
            args.wave_physics().magnitudes,
            vec![Magnitude::new(1.0, 0.0, 1.0), Magnitude::new(3.0, -0.5, 0.0)]
        );
    }

    #[test]
    fn test_rejects_malformed_magnitude() {
        let result = Args::try_parse_from(["waves", "--magnitude", "1:2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_non_finite_steps() {
        assert!(Args::try_parse_from(["waves", "--sample-step", "NaN"]).is_err());
        assert!(Args::try_parse_from(["waves", "--time-step", "inf"]).is_err());
        assert!(Args::try_parse_from(["waves", "--time-step", "-inf"]).is_err());
        assert!(Args::try_parse_from(["waves", "--sample-step", "abc"]).is_err());

        let args = parse(&["--sample-step", "0.1"]);
        assert_eq!(args.wave_physics().sample_step, 0.1);
    }

    #[test]
    fn test_style_noise_and_camera() {
        let args = parse(&[
            "--style",
            "lit",
            "--noise",
            "perlin",
            "--camera",
            "orbit",
            "--orbit-speed",
            "45",
            "--time-step",
            "0.001",
        ]);

        assert_eq!(args.render_config().style, DrawStyle::Lit);
        assert_eq!(args.wave_physics().noise, NoiseKind::Perlin);
        assert_eq!(args.wave_physics().time_step, 0.001);
        match args.camera_preset() {
            CameraPreset::Orbit(orbit) => assert_eq!(orbit.degrees_per_s, 45.0),
            other => panic!("expected orbit camera, got {:?}", other),
        }
    }

    #[test]
    fn test_screenshot_config() {
        let args = parse(&["--screenshot", "out.png", "--frames", "0"]);
        let config = args.screenshot_config().unwrap();

        assert_eq!(config.path, PathBuf::from("out.png"));
        assert_eq!(config.frames, 1);
    }
}

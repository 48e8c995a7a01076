//! Waves library - animated wave surface from inverse DFT synthesis plus noise

pub mod camera;
pub mod cli;
pub mod fps;
pub mod idft;
pub mod noise;
pub mod params;
pub mod rendering;
pub mod surface;

//! Window surface target.

use super::{Gpu, RenderError};

/// Surface sizes must be non-zero; a minimized window reports 0
pub fn clamp_size(width: u32, height: u32) -> (u32, u32) {
    (width.max(1), height.max(1))
}

/// Swapchain-backed colour target for a window
pub struct SurfaceTarget {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

impl SurfaceTarget {
    /// Configure `surface` for `gpu`, preferring an sRGB format
    pub fn new(
        surface: wgpu::Surface<'static>,
        gpu: &Gpu,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let surface_caps = surface.get_capabilities(&gpu.adapter);
        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let (width, height) = clamp_size(width, height);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &config);
        log::info!("Surface: {:?} {}x{}", format, width, height);

        Ok(Self { surface, config })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure for a new window size; returns the size actually used
    pub fn resize(&mut self, gpu: &Gpu, width: u32, height: u32) -> (u32, u32) {
        let (width, height) = clamp_size(width, height);
        self.config.width = width;
        self.config.height = height;
        self.reconfigure(gpu);
        (width, height)
    }

    /// Re-apply the current configuration (after the surface was lost)
    pub fn reconfigure(&self, gpu: &Gpu) {
        self.surface.configure(&gpu.device, &self.config);
    }

    pub fn acquire(&self) -> Result<wgpu::SurfaceTexture, RenderError> {
        Ok(self.surface.get_current_texture()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_size() {
        assert_eq!(clamp_size(800, 0), (800, 1));
        assert_eq!(clamp_size(0, 0), (1, 1));
        assert_eq!(clamp_size(1280, 720), (1280, 720));
    }
}

//! Offscreen colour target with CPU readback, for headless screenshots.

use std::path::Path;
use std::sync::mpsc;

use image::RgbaImage;

use super::{Gpu, RenderError};

/// Rows copied out of a texture must be padded to this alignment
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Clamp a requested size to at least 1x1 and reject sides over `max_dimension`
pub fn check_target_size(
    width: u32,
    height: u32,
    max_dimension: u32,
) -> Result<(u32, u32), RenderError> {
    let (width, height) = super::clamp_size(width, height);
    if width > max_dimension || height > max_dimension {
        return Err(RenderError::TargetTooLarge(width, height));
    }
    Ok((width, height))
}

pub struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    pub fn new(gpu: &Gpu, width: u32, height: u32) -> Result<Self, RenderError> {
        let max_dimension = gpu.device.limits().max_texture_dimension_2d;
        let (width, height) = check_target_size(width, height, max_dimension)?;

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            width,
            height,
        })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Copy the texture back to the CPU
    pub fn read_pixels(&self, gpu: &Gpu) -> Result<RgbaImage, RenderError> {
        let (width, height) = (self.width, self.height);
        let unpadded_bytes_per_row = width * 4;
        let padded_bytes_per_row = padded_bytes_per_row(width);

        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: u64::from(padded_bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        gpu.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        gpu.device.poll(wgpu::Maintain::Wait);
        rx.recv().map_err(|_| RenderError::ReadbackDropped)??;

        let data = buffer_slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);

        // Remove padding
        for row in data.chunks(padded_bytes_per_row as usize) {
            pixels.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
        }

        drop(data);
        buffer.unmap();

        RgbaImage::from_raw(width, height, pixels).ok_or(RenderError::ReadbackSize(width, height))
    }

    /// Read the texture back and write it as PNG
    pub fn save_png(&self, gpu: &Gpu, path: &Path) -> Result<(), RenderError> {
        self.read_pixels(gpu)?.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_bytes_per_row() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(800), 3328);
    }

    #[test]
    fn test_target_size_respects_device_limit() {
        assert_eq!(check_target_size(800, 600, 8192).unwrap(), (800, 600));
        assert_eq!(check_target_size(0, 0, 8192).unwrap(), (1, 1));
        assert_eq!(check_target_size(8192, 8192, 8192).unwrap(), (8192, 8192));

        assert!(matches!(
            check_target_size(20000, 600, 8192),
            Err(RenderError::TargetTooLarge(20000, 600))
        ));
        assert!(matches!(
            check_target_size(800, u32::MAX, 8192),
            Err(RenderError::TargetTooLarge(800, u32::MAX))
        ));
    }

    #[test]
    fn test_padding_fits_any_accepted_width() {
        // Widths past the check never reach the row math, so width * 4 stays in range
        let max_dimension = wgpu::Limits::default().max_texture_dimension_2d;
        let (width, _) = check_target_size(max_dimension, 1, max_dimension).unwrap();
        assert_eq!(padded_bytes_per_row(width), width * 4);
    }
}

//! # Depth Target
//!
//! The depth image a depth-tested pipeline compares against. It is created once, sized to the
//! output at configuration time, and cleared to `1.0` at the start of every pass.

use crate::error::RenderError;

/// A depth texture and the view the render pass attaches.
#[derive(Debug)]
pub struct DepthTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTarget {
    /// The format every depth-tested sample uses.
    pub const DEFAULT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    /// Creates a `width × height` depth image in `format`.
    ///
    /// # Errors
    ///
    /// [`RenderError::Allocation`] if `format` has no depth aspect, or the size is zero or larger
    /// than the device's 2D texture limit.
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Result<Self, RenderError> {
        check_depth_image(width, height, format, device.limits().max_texture_dimension_2d)?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Depth Texture View"),
            format: Some(format),
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::DepthOnly,
            ..Default::default()
        });

        Ok(Self { texture, view })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

fn check_depth_image(
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    max_dimension: u32,
) -> Result<(), RenderError> {
    if !format.has_depth_aspect() {
        return Err(RenderError::allocation(
            "depth texture",
            format!("{format:?} has no depth aspect"),
        ));
    }
    if width == 0 || height == 0 {
        return Err(RenderError::allocation(
            "depth texture",
            format!("{width}x{height} is empty"),
        ));
    }
    if width > max_dimension || height > max_dimension {
        return Err(RenderError::allocation(
            "depth texture",
            format!("{width}x{height} exceeds the {max_dimension} texel limit"),
        ));
    }
    Ok(())
}

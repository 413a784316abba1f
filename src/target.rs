//! # Presentation Targets
//!
//! Where a frame ends up. A [`PresentationTarget`] hands out one [`PresentableImage`] per frame;
//! the render pass draws into its view and the frame loop presents it after submission.
//!
//! Two targets exist:
//!
//! - [`WindowSurface`], the configured `wgpu::Surface` of the sample's window.
//! - [`OffscreenTarget`], a plain texture whose pixels can be read back. It renders exactly like
//!   the window and is what the headless tests draw into.

use futures::channel::oneshot;

use crate::error::RenderError;
use crate::gpu::Gpu;

/// An image acquired for one frame.
pub trait PresentableImage {
    fn view(&self) -> &wgpu::TextureView;

    /// Hands the finished image back to the target. Called after the frame's submission.
    fn present(self);
}

/// A source of presentable images with a fixed format and size.
pub trait PresentationTarget {
    type Image: PresentableImage;

    fn color_format(&self) -> wgpu::TextureFormat;

    /// `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    /// Acquires the image for the current frame.
    ///
    /// # Errors
    ///
    /// [`RenderError::SurfaceUnavailable`] when no image can be produced for this frame.
    fn acquire(&mut self, gpu: &Gpu) -> Result<Self::Image, RenderError>;
}

/// The configured surface of a window.
pub struct WindowSurface {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

impl WindowSurface {
    pub(crate) fn new(surface: wgpu::Surface<'static>, config: wgpu::SurfaceConfiguration) -> Self {
        Self { surface, config }
    }

    pub fn config(&self) -> &wgpu::SurfaceConfiguration {
        &self.config
    }
}

/// The current surface texture and a view of it.
pub struct SurfaceImage {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

impl PresentableImage for SurfaceImage {
    fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    fn present(self) {
        self.texture.present();
    }
}

impl PresentationTarget for WindowSurface {
    type Image = SurfaceImage;

    fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn acquire(&mut self, gpu: &Gpu) -> Result<SurfaceImage, RenderError> {
        let texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(error @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                // Reconfigure so a later frame can acquire again; this one is lost.
                log::info!("Surface {error}, reconfiguring");
                self.surface.configure(&gpu.device, &self.config);
                return Err(error.into());
            }
            Err(error) => return Err(error.into()),
        };

        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Ok(SurfaceImage { texture, view })
    }
}

/// A texture rendered to instead of a window, with pixel read-back.
#[derive(Debug)]
pub struct OffscreenTarget {
    texture: wgpu::Texture,
}

/// A view of the offscreen texture, handed out every frame. Presenting it does nothing.
#[derive(Debug)]
pub struct OffscreenImage {
    view: wgpu::TextureView,
}

impl PresentableImage for OffscreenImage {
    fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    fn present(self) {}
}

impl OffscreenTarget {
    /// Four bytes per pixel, so rows can be read back without conversion.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    const BYTES_PER_PIXEL: u32 = 4;

    /// # Errors
    ///
    /// [`RenderError::Allocation`] if either side is zero or above the device's 2D texture
    /// limit.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self, RenderError> {
        let max = device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(RenderError::allocation(
                "offscreen texture",
                format!("{width}x{height} is outside 1..={max}"),
            ));
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
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

        Ok(Self { texture })
    }

    /// Copies the texture into host memory as tightly packed RGBA rows, top row first.
    ///
    /// Waits for all submitted work on the device to complete.
    pub async fn read_pixels(&self, gpu: &Gpu) -> Result<Vec<u8>, RenderError> {
        let (width, height) = (self.texture.width(), self.texture.height());
        let unpadded_row = width * Self::BYTES_PER_PIXEL;
        let padded_row = padded_bytes_per_row(unpadded_row);

        let staging = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Offscreen Readback"),
            size: padded_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Offscreen Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            self.texture.size(),
        );
        gpu.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = gpu.device.poll(wgpu::Maintain::Wait);

        match receiver.await {
            Ok(result) => result?,
            Err(_) => return Err(RenderError::Readback(wgpu::BufferAsyncError)),
        }

        let pixels = {
            let mapped = slice.get_mapped_range();
            mapped
                .chunks_exact(padded_row as usize)
                .flat_map(|row| &row[..unpadded_row as usize])
                .copied()
                .collect::<Vec<_>>()
        };
        staging.unmap();

        Ok(pixels)
    }
}

impl PresentationTarget for OffscreenTarget {
    type Image = OffscreenImage;

    fn color_format(&self) -> wgpu::TextureFormat {
        Self::FORMAT
    }

    fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    fn acquire(&mut self, _gpu: &Gpu) -> Result<OffscreenImage, RenderError> {
        Ok(OffscreenImage {
            view: self
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
        })
    }
}

/// Rounds a row up to the alignment buffer-texture copies require.
pub fn padded_bytes_per_row(unpadded: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

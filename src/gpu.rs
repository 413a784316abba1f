//! # GPU Management Module
//!
//! The `gpu` module brings up the device and queue every sample renders with.
//!
//! ## Overview
//!
//! [`Gpu`] owns the `wgpu::Device` and `wgpu::Queue`. It is created in one of two ways:
//!
//! - [`Gpu::new_async`] creates an instance, a surface for the given window, a compatible adapter
//!   and a device, then configures the surface. It returns the `Gpu` together with the
//!   [`WindowSurface`] the frame loop presents to.
//! - [`Gpu::headless_async`] requests an adapter without a surface, for offscreen rendering.
//!
//! Both are `async` because adapter and device requests are. Natively they are driven with
//! `pollster::block_on`; on the web they run on the browser's executor.
//!
//! ## Surface format
//!
//! The first non-sRGB format the surface supports is preferred, so the clear colors and the
//! shader outputs reach the screen unconverted. If the surface only offers sRGB formats, the first
//! one is used.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use samples_core::Gpu;
//!
//! # fn main() -> Result<(), samples_core::InitError> {
//! let gpu = pollster::block_on(Gpu::headless_async())?;
//! println!("max buffer size: {}", gpu.device.limits().max_buffer_size);
//! # Ok(())
//! # }
//! ```

use crate::error::InitError;
use crate::target::WindowSurface;

/// The device and queue of a sample.
#[derive(Debug)]
pub struct Gpu {
    /// The logical device every resource is created on.
    pub device: wgpu::Device,

    /// The queue uniform writes and command buffers are submitted to.
    pub queue: wgpu::Queue,
}

impl Gpu {
    /// Creates a device able to present to `window` and configures its surface at
    /// `width × height`.
    ///
    /// # Errors
    ///
    /// - [`InitError::Surface`] if no surface can be created for the window.
    /// - [`InitError::AdapterUnavailable`] if no adapter can present to it.
    /// - [`InitError::Device`] if the device request is refused.
    /// - [`InitError::SurfaceUnsupported`] if the surface reports no usable configuration.
    pub async fn new_async(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<(Self, WindowSurface), InitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(InitError::AdapterUnavailable)?;

        let gpu = Self::request_device(&adapter).await?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or(InitError::SurfaceUnsupported)?;
        let (Some(&present_mode), Some(&alpha_mode)) = (
            capabilities.present_modes.first(),
            capabilities.alpha_modes.first(),
        ) else {
            return Err(InitError::SurfaceUnsupported);
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &config);
        log::info!(
            "Configured {:?} surface at {}x{}",
            config.format,
            config.width,
            config.height
        );

        Ok((gpu, WindowSurface::new(surface, config)))
    }

    /// Creates a device without any surface.
    ///
    /// # Errors
    ///
    /// [`InitError::AdapterUnavailable`] when the machine exposes no adapter at all, which is
    /// the normal case on CI runners without a GPU or software rasterizer.
    pub async fn headless_async() -> Result<Self, InitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(InitError::AdapterUnavailable)?;

        Self::request_device(&adapter).await
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<Self, InitError> {
        log::info!("WGPU Adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    memory_hints: wgpu::MemoryHints::default(),
                    required_features: wgpu::Features::default(),
                    #[cfg(not(target_arch = "wasm32"))]
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    #[cfg(all(target_arch = "wasm32", feature = "webgpu"))]
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    #[cfg(all(target_arch = "wasm32", feature = "webgl"))]
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;

        Ok(Self { device, queue })
    }
}

//! # `renderer.rs` - Render Context
//!
//! The `RenderContext` owns every GPU resource of one running sample and knows how to turn them
//! into one frame. It replaces a set of globals with a single value that the frame loop borrows
//! mutably for each tick, so several contexts (a window and an offscreen target, say) can exist
//! side by side.
//!
//! ## Assembly
//!
//! [`RenderContext::new`] builds the resources of a [`SampleDescriptor`] in a fixed order:
//!
//! 1. the [`GeometryResource`], for samples that upload vertices,
//! 2. the [`TransformUniform`], for samples with a camera,
//! 3. the [`DepthTarget`], for samples with a depth test, sized to the presentation target,
//! 4. the [`PipelineState`], checked against the depth target bound in step 3,
//! 5. the [`BindingSet`], built from the binding layout cached in the pipeline.
//!
//! Any failure aborts assembly and nothing partially built is kept.
//!
//! ## Per-frame work
//!
//! The context implements [`FrameBackend`]. A frame writes the transform, acquires an image from
//! the [`PresentationTarget`], records one render pass (clear color, depth cleared to `1.0`, one
//! draw of every vertex with a single instance), submits it and presents the image.

use crate::depth::DepthTarget;
use crate::error::{InitError, RenderError};
use crate::frame::FrameBackend;
use crate::geometry::GeometryResource;
use crate::gpu::Gpu;
use crate::pipeline::PipelineState;
use crate::sample::{GeometrySource, SampleDescriptor};
use crate::target::{PresentableImage, PresentationTarget, WindowSurface};
use crate::uniform_binding::BindingSet;
use crate::uniform_buffer::{TransformMatrix, TransformUniform};

/// All GPU state of one sample, bound to one presentation target.
pub struct RenderContext<T: PresentationTarget> {
    gpu: Gpu,
    target: T,
    geometry: Option<GeometryResource>,
    vertex_count: u32,
    uniform: Option<TransformUniform>,
    depth: Option<DepthTarget>,
    pipeline: PipelineState,
    binding_set: Option<BindingSet>,
    clear_color: wgpu::Color,
}

impl RenderContext<WindowSurface> {
    /// Brings up a device for `window` and assembles `descriptor` on its surface.
    pub async fn new_async(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        descriptor: &SampleDescriptor,
    ) -> Result<Self, InitError> {
        let (gpu, surface) = Gpu::new_async(window, width, height).await?;
        Ok(Self::new(gpu, surface, descriptor)?)
    }
}

impl<T: PresentationTarget> RenderContext<T> {
    /// Assembles the resources of `descriptor` for `target`.
    ///
    /// # Errors
    ///
    /// - [`RenderError::Allocation`] when the geometry or depth image cannot be created.
    /// - [`RenderError::PipelineConfiguration`] when the pipeline is inconsistent, or does not
    ///   match the depth target or uniform it is assembled with.
    pub fn new(gpu: Gpu, target: T, descriptor: &SampleDescriptor) -> Result<Self, RenderError> {
        let device = &gpu.device;
        let (width, height) = target.size();

        let geometry = match descriptor.geometry {
            GeometrySource::Vertices(vertices) => Some(GeometryResource::new(device, vertices)?),
            GeometrySource::Procedural { .. } => None,
        };
        let vertex_count = geometry
            .as_ref()
            .map_or(descriptor.geometry.vertex_count(), GeometryResource::vertex_count);

        let uniform = descriptor
            .camera
            .map(|_| TransformUniform::new(device));

        let depth = descriptor
            .depth
            .map(|depth| DepthTarget::new(device, width, height, depth.format))
            .transpose()?;

        let config = descriptor.pipeline_config(target.color_format());
        let pipeline = PipelineState::new(device, &config)?;
        pipeline.check_depth_target(depth.as_ref().map(DepthTarget::format))?;

        let binding_set = match &uniform {
            Some(uniform) => Some(BindingSet::new(device, &pipeline, uniform)?),
            None if pipeline.binding_layout().is_empty() => None,
            None => {
                return Err(RenderError::pipeline(format!(
                    "'{}' declares bindings but has no uniform to bind",
                    descriptor.name
                )))
            }
        };

        log::info!(
            "Assembled '{}' at {width}x{height}: {vertex_count} vertices",
            descriptor.name
        );

        Ok(Self {
            gpu,
            target,
            geometry,
            vertex_count,
            uniform,
            depth,
            pipeline,
            binding_set,
            clear_color: descriptor.clear_color,
        })
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn pipeline(&self) -> &PipelineState {
        &self.pipeline
    }

    pub fn geometry(&self) -> Option<&GeometryResource> {
        self.geometry.as_ref()
    }

    pub fn has_uniform(&self) -> bool {
        self.uniform.is_some()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn size(&self) -> (u32, u32) {
        self.target.size()
    }
}

impl<T: PresentationTarget> FrameBackend for RenderContext<T> {
    type Image = T::Image;
    type Commands = wgpu::CommandBuffer;

    fn update_transform(&mut self, transform: &TransformMatrix) -> bool {
        match &self.uniform {
            Some(uniform) => {
                uniform.update(&self.gpu.queue, transform);
                true
            }
            None => false,
        }
    }

    fn acquire_image(&mut self) -> Result<T::Image, RenderError> {
        self.target.acquire(&self.gpu)
    }

    fn encode_pass(&mut self, image: &T::Image) -> wgpu::CommandBuffer {
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        encoder.insert_debug_marker("Render sample");

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: image.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: self.depth.as_ref().map(|depth| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view: depth.view(),
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(self.pipeline.raw());
            if let Some(binding_set) = &self.binding_set {
                render_pass.set_bind_group(binding_set.group(), binding_set.bind_group(), &[]);
            }
            if let Some(geometry) = &self.geometry {
                render_pass.set_vertex_buffer(0, geometry.slice());
            }
            render_pass.draw(0..self.vertex_count, 0..1);
        }

        encoder.finish()
    }

    fn submit(&mut self, commands: wgpu::CommandBuffer, image: T::Image) {
        self.gpu.queue.submit(std::iter::once(commands));
        image.present();
    }
}

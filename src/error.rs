//! # Errors
//!
//! Two error types cover the samples:
//!
//! - [`RenderError`] is raised by the rendering core: resource allocation, pipeline
//!   configuration and per-frame image acquisition.
//! - [`InitError`] is raised by the collaborators around the core (adapter, device,
//!   surface and event loop) and wraps any [`RenderError`] hit while the core is
//!   being assembled.
//!
//! Setup errors are fatal: the sample stops before its first frame. A
//! [`RenderError::SurfaceUnavailable`] raised during a frame only skips that frame.

use thiserror::Error;

/// Errors produced by the rendering core.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A device buffer or image could not be created with the requested size or format.
    #[error("failed to allocate {resource}: {reason}")]
    Allocation {
        resource: &'static str,
        reason: String,
    },

    /// The pipeline description is inconsistent with itself or with the resources bound to it.
    #[error("invalid pipeline configuration: {0}")]
    PipelineConfiguration(String),

    /// The presentable image for the current frame could not be acquired.
    #[error("presentable image unavailable: {0}")]
    SurfaceUnavailable(#[from] wgpu::SurfaceError),

    /// A read-back buffer could not be mapped for reading.
    #[error("failed to map buffer for read-back: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),
}

impl RenderError {
    pub(crate) fn allocation(resource: &'static str, reason: impl Into<String>) -> Self {
        Self::Allocation {
            resource,
            reason: reason.into(),
        }
    }

    pub(crate) fn pipeline(reason: impl Into<String>) -> Self {
        Self::PipelineConfiguration(reason.into())
    }
}

/// Errors raised while bringing a sample up, before its frame loop starts.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("no compatible GPU adapter found")]
    AdapterUnavailable,

    #[error("failed to request a GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to create a presentation surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("the presentation surface reports no supported formats")]
    SurfaceUnsupported,

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

//! # WebGPU Samples Core
//!
//! This library holds everything the sample binaries share: GPU bring-up, the resources of a
//! sample, its render pipeline and the per-frame loop that redraws it. The samples are small on
//! purpose (a triangle, a square ring drawn as one strip, a rotating cube) and each one is a
//! [`SampleDescriptor`] constant run through the same code.
//!
//! ## Modules
//!
//! - [`app`]: the winit application handler and [`run`].
//! - [`renderer`]: [`RenderContext`], which owns a sample's resources and encodes its frames.
//! - [`gpu`]: device, queue and surface setup.
//! - [`target`]: the window surface and the offscreen texture frames are drawn into.
//! - [`pipeline`]: pipeline configuration, validation and the derived binding layout.
//! - [`geometry`], [`uniform_buffer`], [`uniform_binding`], [`depth`]: the sample's resources.
//! - [`camera`]: the cube's projection and time-dependent view.
//! - [`frame`]: the frame loop state machine.
//! - [`sample`]: the per-sample constants.
//! - [`vertex`]: the vertex record and the cube data.
//!
//! ## Resource lifecycle
//!
//! A sample's resources are created once, in order (geometry, uniform, depth target, pipeline,
//! binding set), and live until the sample exits. Only the uniform changes afterwards: every frame
//! writes a fresh transform into it before the frame's render pass is submitted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use samples_core::{run, Sample};
//!
//! fn main() -> Result<(), samples_core::InitError> {
//!     run(Sample::RotatingCube)
//! }
//! ```

pub mod app;
pub mod camera;
pub mod depth;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod gpu;
mod logging;
pub mod pipeline;
pub mod renderer;
pub mod sample;
pub mod target;
pub mod uniform_binding;
pub mod uniform_buffer;
pub mod vertex;

pub use crate::app::{run, App};
pub use crate::camera::{Camera, CameraConfig, CUBE_CAMERA};
pub use crate::depth::DepthTarget;
pub use crate::error::{InitError, RenderError};
pub use crate::frame::{
    Clock, FrameBackend, FrameLoop, FrameScheduler, FrameState, FrameStats, SystemClock,
    TickOutcome,
};
pub use crate::geometry::GeometryResource;
pub use crate::gpu::Gpu;
pub use crate::logging::init_logging;
pub use crate::pipeline::{
    BindingKind, BindingLayout, BindingRequirement, CullMode, DeclaredBinding, DepthTest,
    PipelineConfig, PipelineState, ShaderProgram, Topology, VertexAttribute, VertexLayout,
};
pub use crate::renderer::RenderContext;
pub use crate::sample::{
    DepthSettings, GeometrySource, Sample, SampleDescriptor, RECTANGLE_WITH_HOLE_VERTEX_COUNT,
};
pub use crate::target::{OffscreenTarget, PresentableImage, PresentationTarget, WindowSurface};
pub use crate::uniform_binding::BindingSet;
pub use crate::uniform_buffer::{TransformMatrix, TransformUniform};
pub use crate::vertex::{Vertex, CUBE_VERTEX_COUNT, CUBE_VERTICES};

/// Browser entry point: runs the sample named by `name`, e.g. `"rotating-cube"`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn start_sample(name: &str) -> Result<(), wasm_bindgen::JsValue> {
    let sample = Sample::from_name(name)
        .ok_or_else(|| wasm_bindgen::JsValue::from_str(&format!("unknown sample '{name}'")))?;
    run(sample).map_err(|error| wasm_bindgen::JsValue::from_str(&error.to_string()))
}

//! # Binding Set
//!
//! A `BindingSet` attaches the [`TransformUniform`] to the slot the pipeline's shaders read it
//! from. It is built once, against the [`BindingLayout`] cached in the [`PipelineState`], and is
//! bound unchanged every frame.
//!
//! The binding set only refers to the uniform buffer; the buffer must outlive it, which
//! [`crate::RenderContext`] guarantees by owning both.
//!
//! [`BindingLayout`]: crate::pipeline::BindingLayout

use crate::error::RenderError;
use crate::pipeline::{BindingKind, PipelineState};
use crate::uniform_buffer::TransformUniform;

/// The bind group connecting the transform uniform to its shader slot.
#[derive(Debug)]
pub struct BindingSet {
    group: u32,
    bind_group: wgpu::BindGroup,
}

impl BindingSet {
    /// Creates the bind group for the pipeline's uniform requirement.
    ///
    /// # Errors
    ///
    /// [`RenderError::PipelineConfiguration`] if the pipeline does not require exactly one
    /// uniform buffer, or requires one larger than `uniform`.
    pub fn new(
        device: &wgpu::Device,
        pipeline: &PipelineState,
        uniform: &TransformUniform,
    ) -> Result<Self, RenderError> {
        let requirements = pipeline.binding_layout().requirements();
        let [requirement] = requirements else {
            return Err(RenderError::pipeline(format!(
                "expected one uniform binding, the pipeline requires {}",
                requirements.len()
            )));
        };

        match requirement.kind {
            BindingKind::UniformBuffer { min_size } if min_size > uniform.size() => {
                return Err(RenderError::pipeline(format!(
                    "binding {}:{} needs {min_size} bytes but the uniform holds {}",
                    requirement.group,
                    requirement.binding,
                    uniform.size()
                )));
            }
            BindingKind::UniformBuffer { .. } => {}
        }

        let layout = pipeline
            .bind_group_layout(requirement.group)
            .ok_or_else(|| {
                RenderError::pipeline(format!("bind group {} has no layout", requirement.group))
            })?;

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: requirement.binding,
                resource: uniform.buffer().as_entire_binding(),
            }],
        });

        Ok(Self {
            group: requirement.group,
            bind_group,
        })
    }

    /// The group index this set is bound at.
    pub fn group(&self) -> u32 {
        self.group
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

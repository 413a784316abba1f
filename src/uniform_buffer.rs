//! # Transform Uniform
//!
//! The cube's single uniform: one column-major 4×4 `f32` matrix, 64 bytes, rewritten every frame.
//!
//! [`TransformMatrix`] is the host-side value and [`TransformUniform`] owns the device buffer it is
//! copied into. The buffer is created with `UNIFORM | COPY_DST` so the shader can read it and the
//! queue can overwrite it.
//!
//! Writes go through `wgpu::Queue::write_buffer`. The queue executes them before any command
//! buffer submitted afterwards, so a frame that updates the matrix and then submits its pass
//! always draws with the new value.

use wgpu::util::DeviceExt;

/// The model-view-projection matrix as it is laid out in the uniform buffer.
#[repr(C)]
#[derive(Default, Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformMatrix {
    pub matrix: nalgebra_glm::Mat4,
}

const _: () = assert!(std::mem::size_of::<TransformMatrix>() == 64);

impl TransformMatrix {
    /// Size of the matrix in the uniform buffer, in bytes.
    pub const SIZE: wgpu::BufferAddress = std::mem::size_of::<Self>() as wgpu::BufferAddress;

    pub fn new(matrix: nalgebra_glm::Mat4) -> Self {
        Self { matrix }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// The device buffer holding the current [`TransformMatrix`].
#[derive(Debug)]
pub struct TransformUniform {
    buffer: wgpu::Buffer,
}

impl TransformUniform {
    /// Allocates exactly [`TransformMatrix::SIZE`] bytes, zero-initialized.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&TransformMatrix::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self { buffer }
    }

    /// Schedules a copy of `transform` into the buffer, ahead of the next submission.
    pub fn update(&self, queue: &wgpu::Queue, transform: &TransformMatrix) {
        queue.write_buffer(&self.buffer, 0, transform.as_bytes());
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn size(&self) -> wgpu::BufferAddress {
        self.buffer.size()
    }
}

//! # Geometry Resource
//!
//! Uploads an ordered vertex sequence into a device buffer exactly once.
//!
//! The buffer is created with `mapped_at_creation`, the vertex bytes are copied through the
//! mapped range, and the buffer is unmapped before it is ever bound. After that the buffer is
//! immutable for the life of the sample.
//!
//! ## Size rules
//!
//! The byte length must be non-zero, a multiple of [`wgpu::COPY_BUFFER_ALIGNMENT`] and no larger
//! than the device's `max_buffer_size`. Anything else is an [`RenderError::Allocation`] raised
//! before the device is touched.

use crate::error::RenderError;
use crate::vertex::Vertex;

/// The uploaded vertex data of a sample.
#[derive(Debug)]
pub struct GeometryResource {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl GeometryResource {
    /// Allocates a buffer of exactly `vertices`' byte length and copies the vertices into it.
    ///
    /// # Errors
    ///
    /// [`RenderError::Allocation`] if the sequence is empty or its byte length breaks the
    /// alignment or device limits.
    pub fn new(device: &wgpu::Device, vertices: &[Vertex]) -> Result<Self, RenderError> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let size = check_allocation_size(bytes.len() as u64, device.limits().max_buffer_size)?;
        let vertex_count = u32::try_from(vertices.len())
            .map_err(|_| RenderError::allocation("vertex buffer", "too many vertices"))?;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Vertex Buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: true,
        });
        buffer
            .slice(..)
            .get_mapped_range_mut()
            .copy_from_slice(bytes);
        buffer.unmap();

        log::info!("Uploaded {vertex_count} vertices ({size} bytes)");

        Ok(Self {
            buffer,
            vertex_count,
        })
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn byte_len(&self) -> wgpu::BufferAddress {
        self.buffer.size()
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// The whole buffer, ready for `set_vertex_buffer`.
    pub fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.buffer.slice(..)
    }
}

/// Checks a requested buffer size against the copy alignment and `max_buffer_size`.
pub fn check_allocation_size(
    len: wgpu::BufferAddress,
    max_buffer_size: u64,
) -> Result<wgpu::BufferAddress, RenderError> {
    if len == 0 {
        return Err(RenderError::allocation("vertex buffer", "no vertices"));
    }
    if len % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
        return Err(RenderError::allocation(
            "vertex buffer",
            format!(
                "{len} bytes is not a multiple of {}",
                wgpu::COPY_BUFFER_ALIGNMENT
            ),
        ));
    }
    if len > max_buffer_size {
        return Err(RenderError::allocation(
            "vertex buffer",
            format!("{len} bytes exceeds the device limit of {max_buffer_size}"),
        ));
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: u64 = 256 << 20;

    #[test]
    fn cube_size_is_accepted() {
        assert_eq!(check_allocation_size(36 * 24, LIMIT).unwrap(), 864);
    }

    #[test]
    fn empty_sequence_is_an_allocation_error() {
        assert!(matches!(
            check_allocation_size(0, LIMIT),
            Err(RenderError::Allocation { .. })
        ));
    }

    #[test]
    fn unaligned_length_is_an_allocation_error() {
        let error = check_allocation_size(6, LIMIT).unwrap_err();
        assert!(matches!(error, RenderError::Allocation { .. }));
        assert!(error.to_string().contains("multiple of 4"));
    }

    #[test]
    fn oversized_length_is_an_allocation_error() {
        assert!(check_allocation_size(LIMIT + 4, LIMIT).is_err());
        assert!(check_allocation_size(LIMIT, LIMIT).is_ok());
    }
}

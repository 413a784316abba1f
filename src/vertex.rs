//! # Vertex Module
//!
//! This module provides the `Vertex` record uploaded by the rotating-cube sample and the cube
//! geometry table itself.
//!
//! A vertex is a fixed-stride record of a homogeneous position (`4 × f32`) followed by a texture
//! coordinate (`2 × f32`), 24 bytes in total. The layout is described to the pipeline through
//! [`Vertex::LAYOUT`], which carries the stride and the per-attribute offsets and formats; the
//! pipeline checks that description before anything is created on the device.
//!
//! ```rust
//! use samples_core::{Vertex, CUBE_VERTICES};
//!
//! let bytes: &[u8] = bytemuck::cast_slice(&CUBE_VERTICES);
//! assert_eq!(bytes.len() as u64, Vertex::STRIDE * CUBE_VERTICES.len() as u64);
//! ```
//!
//! # Crate Dependencies
//!
//! - `wgpu` for the attribute formats.
//! - `bytemuck` for casting vertex tables to raw bytes.

use crate::pipeline::{VertexAttribute, VertexLayout};

/// Represents a single vertex of the cube: its position and texture coordinate.
///
/// # Fields
///
/// - `position`: `[x, y, z, w]` in model space. `w` is always `1.0` for the cube.
/// - `uv`: `[u, v]` texture coordinate in the `[0, 1]` range.
///
/// # Memory Layout
///
/// `#[repr(C)]` together with `bytemuck::Pod` guarantees the record is exactly
/// [`Vertex::STRIDE`] bytes with `position` at offset 0 and `uv` at offset 16, which is what
/// [`Vertex::LAYOUT`] declares to the pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// The homogeneous position of the vertex.
    pub position: [f32; 4],

    /// The texture coordinate of the vertex.
    pub uv: [f32; 2],
}

impl Vertex {
    /// Size of one vertex record, in bytes.
    pub const STRIDE: wgpu::BufferAddress = std::mem::size_of::<Vertex>() as wgpu::BufferAddress;

    /// Byte offset of `position` inside the record.
    pub const POSITION_OFFSET: wgpu::BufferAddress = 0;

    /// Byte offset of `uv` inside the record.
    pub const UV_OFFSET: wgpu::BufferAddress = 16;

    /// The shader-visible attributes: `@location(0)` position and `@location(1)` uv.
    pub const ATTRIBUTES: [VertexAttribute; 2] = [
        VertexAttribute {
            location: 0,
            offset: Self::POSITION_OFFSET,
            format: wgpu::VertexFormat::Float32x4,
        },
        VertexAttribute {
            location: 1,
            offset: Self::UV_OFFSET,
            format: wgpu::VertexFormat::Float32x2,
        },
    ];

    /// The buffer layout handed to the pipeline for this record.
    pub const LAYOUT: VertexLayout = VertexLayout {
        stride: Self::STRIDE,
        attributes: &Self::ATTRIBUTES,
    };

    /// Creates a vertex from its position and texture coordinate.
    pub const fn new(position: [f32; 4], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }
}

/// Number of vertices in [`CUBE_VERTICES`]: 6 faces × 2 triangles × 3 vertices.
pub const CUBE_VERTEX_COUNT: u32 = 36;

const fn v(x: f32, y: f32, z: f32, u: f32, w: f32) -> Vertex {
    Vertex::new([x, y, z, 1.0], [u, w])
}

/// The unit cube as a triangle list, 36 vertices.
///
/// Every face is wound counter-clockwise when seen from outside the cube, so back-face culling
/// with the default counter-clockwise front face removes the faces pointing away from the camera.
pub const CUBE_VERTICES: [Vertex; CUBE_VERTEX_COUNT as usize] = [
    // -y
    v(1.0, -1.0, 1.0, 0.0, 1.0),
    v(-1.0, -1.0, 1.0, 1.0, 1.0),
    v(-1.0, -1.0, -1.0, 1.0, 0.0),
    v(1.0, -1.0, -1.0, 0.0, 0.0),
    v(1.0, -1.0, 1.0, 0.0, 1.0),
    v(-1.0, -1.0, -1.0, 1.0, 0.0),
    // +x
    v(1.0, 1.0, 1.0, 0.0, 1.0),
    v(1.0, -1.0, 1.0, 1.0, 1.0),
    v(1.0, -1.0, -1.0, 1.0, 0.0),
    v(1.0, 1.0, -1.0, 0.0, 0.0),
    v(1.0, 1.0, 1.0, 0.0, 1.0),
    v(1.0, -1.0, -1.0, 1.0, 0.0),
    // +y
    v(-1.0, 1.0, 1.0, 0.0, 1.0),
    v(1.0, 1.0, 1.0, 1.0, 1.0),
    v(1.0, 1.0, -1.0, 1.0, 0.0),
    v(-1.0, 1.0, -1.0, 0.0, 0.0),
    v(-1.0, 1.0, 1.0, 0.0, 1.0),
    v(1.0, 1.0, -1.0, 1.0, 0.0),
    // -x
    v(-1.0, -1.0, 1.0, 0.0, 1.0),
    v(-1.0, 1.0, 1.0, 1.0, 1.0),
    v(-1.0, 1.0, -1.0, 1.0, 0.0),
    v(-1.0, -1.0, -1.0, 0.0, 0.0),
    v(-1.0, -1.0, 1.0, 0.0, 1.0),
    v(-1.0, 1.0, -1.0, 1.0, 0.0),
    // +z
    v(1.0, 1.0, 1.0, 0.0, 1.0),
    v(-1.0, 1.0, 1.0, 1.0, 1.0),
    v(-1.0, -1.0, 1.0, 1.0, 0.0),
    v(-1.0, -1.0, 1.0, 1.0, 0.0),
    v(1.0, -1.0, 1.0, 0.0, 0.0),
    v(1.0, 1.0, 1.0, 0.0, 1.0),
    // -z
    v(1.0, -1.0, -1.0, 0.0, 1.0),
    v(-1.0, -1.0, -1.0, 1.0, 1.0),
    v(-1.0, 1.0, -1.0, 1.0, 0.0),
    v(1.0, 1.0, -1.0, 0.0, 0.0),
    v(1.0, -1.0, -1.0, 0.0, 1.0),
    v(-1.0, 1.0, -1.0, 1.0, 0.0),
];

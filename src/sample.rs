//! # Samples
//!
//! The compile-time configuration of each sample. A [`SampleDescriptor`] names everything that
//! differs between samples: geometry, shaders, topology, culling, depth test, clear color and
//! camera. The rest of the crate is shared.

use crate::camera::{CameraConfig, CUBE_CAMERA};
use crate::depth::DepthTarget;
use crate::pipeline::{
    BindingKind, CullMode, DeclaredBinding, DepthTest, PipelineConfig, ShaderProgram, Topology,
};
use crate::uniform_buffer::TransformMatrix;
use crate::vertex::{Vertex, CUBE_VERTICES};

/// Vertices the rectangle-with-hole strip draws: the ring of 8 outer and 8 inner corners, the
/// closing pair, and one degenerate vertex.
pub const RECTANGLE_WITH_HOLE_VERTEX_COUNT: u32 = 19;

const TRIANGLE_VERT: ShaderProgram = ShaderProgram {
    label: "triangle.vert.wgsl",
    source: include_str!("shaders/triangle.vert.wgsl"),
    entry_point: "main",
    bindings: &[],
};

const RECTANGLE_VERT: ShaderProgram = ShaderProgram {
    label: "rectangle.vert.wgsl",
    source: include_str!("shaders/rectangle.vert.wgsl"),
    entry_point: "main",
    bindings: &[],
};

const RED_FRAG: ShaderProgram = ShaderProgram {
    label: "red.frag.wgsl",
    source: include_str!("shaders/red.frag.wgsl"),
    entry_point: "main",
    bindings: &[],
};

const BASIC_VERT: ShaderProgram = ShaderProgram {
    label: "basic.vert.wgsl",
    source: include_str!("shaders/basic.vert.wgsl"),
    entry_point: "main",
    bindings: &[DeclaredBinding {
        group: 0,
        binding: 0,
        kind: BindingKind::UniformBuffer {
            min_size: TransformMatrix::SIZE,
        },
    }],
};

const VERTEX_POSITION_COLOR_FRAG: ShaderProgram = ShaderProgram {
    label: "vertex_position_color.frag.wgsl",
    source: include_str!("shaders/vertex_position_color.frag.wgsl"),
    entry_point: "main",
    bindings: &[],
};

const BLACK: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

const GREY: wgpu::Color = wgpu::Color {
    r: 0.5,
    g: 0.5,
    b: 0.5,
    a: 1.0,
};

/// Where a sample's vertices come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometrySource {
    /// Positions are generated in the vertex shader from the vertex index; no buffer is bound.
    Procedural { vertex_count: u32 },
    /// Vertices are uploaded into a vertex buffer.
    Vertices(&'static [Vertex]),
}

impl GeometrySource {
    pub fn vertex_count(&self) -> u32 {
        match self {
            GeometrySource::Procedural { vertex_count } => *vertex_count,
            GeometrySource::Vertices(vertices) => vertices.len() as u32,
        }
    }
}

/// Everything that distinguishes one sample from another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleDescriptor {
    pub name: &'static str,
    pub geometry: GeometrySource,
    pub vertex_shader: ShaderProgram,
    pub fragment_shader: ShaderProgram,
    pub topology: Topology,
    pub cull_mode: CullMode,
    /// Depth test settings; the depth target is created in `format`.
    pub depth: Option<DepthSettings>,
    pub clear_color: wgpu::Color,
    pub camera: Option<CameraConfig>,
}

/// The depth test and target format of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthSettings {
    pub format: wgpu::TextureFormat,
    pub compare: wgpu::CompareFunction,
    pub write_enabled: bool,
}

impl SampleDescriptor {
    /// The pipeline configuration for rendering into `color_format`.
    pub fn pipeline_config(&self, color_format: wgpu::TextureFormat) -> PipelineConfig {
        PipelineConfig {
            label: self.name,
            vertex: self.vertex_shader,
            vertex_layout: match self.geometry {
                GeometrySource::Procedural { .. } => None,
                GeometrySource::Vertices(_) => Some(Vertex::LAYOUT),
            },
            fragment: self.fragment_shader,
            color_format,
            topology: self.topology,
            cull_mode: self.cull_mode,
            front_face: wgpu::FrontFace::Ccw,
            depth: self.depth.map(|depth| DepthTest {
                write_enabled: depth.write_enabled,
                compare: depth.compare,
                format: depth.format,
            }),
        }
    }
}

pub const HELLO_TRIANGLE: SampleDescriptor = SampleDescriptor {
    name: "hello-triangle",
    geometry: GeometrySource::Procedural { vertex_count: 3 },
    vertex_shader: TRIANGLE_VERT,
    fragment_shader: RED_FRAG,
    topology: Topology::TriangleList,
    cull_mode: CullMode::None,
    depth: None,
    clear_color: BLACK,
    camera: None,
};

pub const RECTANGLE_WITH_HOLE: SampleDescriptor = SampleDescriptor {
    name: "rectangle-with-hole",
    geometry: GeometrySource::Procedural {
        vertex_count: RECTANGLE_WITH_HOLE_VERTEX_COUNT,
    },
    vertex_shader: RECTANGLE_VERT,
    fragment_shader: RED_FRAG,
    topology: Topology::TriangleStrip,
    cull_mode: CullMode::None,
    depth: None,
    clear_color: BLACK,
    camera: None,
};

pub const ROTATING_CUBE: SampleDescriptor = SampleDescriptor {
    name: "rotating-cube",
    geometry: GeometrySource::Vertices(&CUBE_VERTICES),
    vertex_shader: BASIC_VERT,
    fragment_shader: VERTEX_POSITION_COLOR_FRAG,
    topology: Topology::TriangleList,
    cull_mode: CullMode::Back,
    depth: Some(DepthSettings {
        format: DepthTarget::DEFAULT_FORMAT,
        compare: wgpu::CompareFunction::Less,
        write_enabled: true,
    }),
    clear_color: GREY,
    camera: Some(CUBE_CAMERA),
};

/// The samples this crate ships, one binary each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    HelloTriangle,
    RectangleWithHole,
    RotatingCube,
}

impl Sample {
    pub const ALL: [Sample; 3] = [
        Sample::HelloTriangle,
        Sample::RectangleWithHole,
        Sample::RotatingCube,
    ];

    /// Looks a sample up by its descriptor name, e.g. `"rotating-cube"`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|sample| sample.descriptor().name == name)
    }

    pub fn descriptor(self) -> &'static SampleDescriptor {
        match self {
            Sample::HelloTriangle => &HELLO_TRIANGLE,
            Sample::RectangleWithHole => &RECTANGLE_WITH_HOLE,
            Sample::RotatingCube => &ROTATING_CUBE,
        }
    }
}

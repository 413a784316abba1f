//! # Pipeline State
//!
//! This module turns a [`PipelineConfig`] into an immutable [`PipelineState`]: the compiled
//! `wgpu::RenderPipeline` plus the [`BindingLayout`] it was built against.
//!
//! ## Overview
//!
//! A pipeline is described entirely by layouts, never by resource contents:
//!
//! - the vertex stage ([`ShaderProgram`]) and the vertex buffer layout ([`VertexLayout`]),
//! - the fragment stage and the color target format,
//! - the primitive [`Topology`] and the [`CullMode`] (counter-clockwise front faces by default),
//! - an optional [`DepthTest`].
//!
//! Each shader program declares the bindings it reads. Instead of asking the device to infer a
//! layout from shader reflection, [`PipelineConfig::derive_layout`] merges those declarations into
//! an explicit [`BindingLayout`] once, at build time. The same cached layout is used to create the
//! pipeline layout and, later, to check the resources a [`crate::BindingSet`] supplies.
//!
//! ## Validation
//!
//! [`PipelineConfig::validate`] runs before any device object is created and fails with
//! [`RenderError::PipelineConfiguration`] when the vertex layout is inconsistent (attribute
//! outside the stride, misaligned stride, duplicate locations), when the depth format has no depth
//! aspect, or when the shader stages disagree about a binding slot.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::RenderError;

/// The rule by which the vertex sequence is grouped into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
}

impl Topology {
    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::PointList => wgpu::PrimitiveTopology::PointList,
            Topology::LineList => wgpu::PrimitiveTopology::LineList,
            Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

/// Which faces, if any, are discarded before rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    #[default]
    None,
    Front,
    Back,
}

impl CullMode {
    pub fn to_wgpu(self) -> Option<wgpu::Face> {
        match self {
            CullMode::None => None,
            CullMode::Front => Some(wgpu::Face::Front),
            CullMode::Back => Some(wgpu::Face::Back),
        }
    }
}

/// Depth-test configuration of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthTest {
    /// Whether fragments that pass the test write their depth.
    pub write_enabled: bool,

    /// The comparison between the incoming and the stored depth.
    pub compare: wgpu::CompareFunction,

    /// The format of the depth target the pipeline renders against.
    pub format: wgpu::TextureFormat,
}

/// One attribute inside a vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// The `@location(n)` the attribute is fed to.
    pub location: u32,

    /// Byte offset of the attribute inside the record.
    pub offset: wgpu::BufferAddress,

    /// Scalar type and component count of the attribute.
    pub format: wgpu::VertexFormat,
}

/// Stride and attributes of the single vertex buffer a pipeline reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: wgpu::BufferAddress,
    pub attributes: &'static [VertexAttribute],
}

impl VertexLayout {
    /// Checks the attributes against the stride.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.stride == 0 || self.stride % wgpu::VERTEX_STRIDE_ALIGNMENT != 0 {
            return Err(RenderError::pipeline(format!(
                "vertex stride {} is not a non-zero multiple of {}",
                self.stride,
                wgpu::VERTEX_STRIDE_ALIGNMENT
            )));
        }

        for (index, attribute) in self.attributes.iter().enumerate() {
            let end = attribute.offset + attribute.format.size();
            if end > self.stride {
                return Err(RenderError::pipeline(format!(
                    "attribute at location {} ends at byte {end}, past the stride of {}",
                    attribute.location, self.stride
                )));
            }

            if self.attributes[..index]
                .iter()
                .any(|other| other.location == attribute.location)
            {
                return Err(RenderError::pipeline(format!(
                    "location {} is declared by more than one attribute",
                    attribute.location
                )));
            }
        }

        Ok(())
    }

    fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .map(|attribute| wgpu::VertexAttribute {
                format: attribute.format,
                offset: attribute.offset,
                shader_location: attribute.location,
            })
            .collect()
    }
}

/// The kind of resource a shader expects at a binding slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// A uniform buffer of at least `min_size` bytes.
    UniformBuffer { min_size: wgpu::BufferAddress },
}

/// A binding a shader program reads, as declared in its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredBinding {
    pub group: u32,
    pub binding: u32,
    pub kind: BindingKind,
}

/// A compiled-elsewhere shader program: its WGSL source, entry point and declared bindings.
///
/// The source is treated as opaque; the bindings listed here must match the `@group`/`@binding`
/// attributes the source declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderProgram {
    pub label: &'static str,
    pub source: &'static str,
    pub entry_point: &'static str,
    pub bindings: &'static [DeclaredBinding],
}

/// One slot the binding set must fill, with the stages that read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingRequirement {
    pub group: u32,
    pub binding: u32,
    pub kind: BindingKind,
    pub visibility: wgpu::ShaderStages,
}

/// The resources a pipeline requires, derived from its shader programs.
///
/// Requirements are kept sorted by `(group, binding)`, so two layouts derived from the same
/// configuration compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingLayout {
    requirements: Vec<BindingRequirement>,
}

impl BindingLayout {
    pub fn requirements(&self) -> &[BindingRequirement] {
        &self.requirements
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Number of bind groups the pipeline layout needs.
    pub fn group_count(&self) -> u32 {
        self.requirements
            .iter()
            .map(|requirement| requirement.group + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn requirement(&self, group: u32, binding: u32) -> Option<&BindingRequirement> {
        self.requirements
            .iter()
            .find(|requirement| requirement.group == group && requirement.binding == binding)
    }

    /// The requirements of one bind group.
    pub fn group(&self, group: u32) -> impl Iterator<Item = &BindingRequirement> {
        self.requirements
            .iter()
            .filter(move |requirement| requirement.group == group)
    }
}

/// Everything a [`PipelineState`] is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub label: &'static str,
    pub vertex: ShaderProgram,
    pub vertex_layout: Option<VertexLayout>,
    pub fragment: ShaderProgram,
    pub color_format: wgpu::TextureFormat,
    pub topology: Topology,
    pub cull_mode: CullMode,
    pub front_face: wgpu::FrontFace,
    pub depth: Option<DepthTest>,
}

impl PipelineConfig {
    /// Merges the bindings declared by both stages into one layout.
    ///
    /// A slot declared by both stages is required once, visible to both. A slot declared with
    /// two different kinds, or a gap in the group numbering, is a configuration error.
    pub fn derive_layout(&self) -> Result<BindingLayout, RenderError> {
        let mut slots: BTreeMap<(u32, u32), BindingRequirement> = BTreeMap::new();
        let stages = [
            (&self.vertex, wgpu::ShaderStages::VERTEX),
            (&self.fragment, wgpu::ShaderStages::FRAGMENT),
        ];

        for (program, stage) in stages {
            for declared in program.bindings {
                let key = (declared.group, declared.binding);
                match slots.get_mut(&key) {
                    Some(existing) if existing.kind != declared.kind => {
                        return Err(RenderError::pipeline(format!(
                            "binding {}:{} is declared as {:?} and as {:?}",
                            declared.group, declared.binding, existing.kind, declared.kind
                        )));
                    }
                    Some(existing) => existing.visibility |= stage,
                    None => {
                        slots.insert(
                            key,
                            BindingRequirement {
                                group: declared.group,
                                binding: declared.binding,
                                kind: declared.kind,
                                visibility: stage,
                            },
                        );
                    }
                }
            }
        }

        let layout = BindingLayout {
            requirements: slots.into_values().collect(),
        };

        for group in 0..layout.group_count() {
            if layout.group(group).next().is_none() {
                return Err(RenderError::pipeline(format!(
                    "bind group {group} is empty; groups must be contiguous from 0"
                )));
            }
        }

        Ok(layout)
    }

    /// Checks the configuration and returns the derived binding layout.
    pub fn validate(&self) -> Result<BindingLayout, RenderError> {
        if let Some(vertex_layout) = &self.vertex_layout {
            vertex_layout.validate()?;
        }

        if let Some(depth) = &self.depth {
            if !depth.format.has_depth_aspect() {
                return Err(RenderError::pipeline(format!(
                    "{:?} cannot be used for depth testing",
                    depth.format
                )));
            }
        }

        self.derive_layout()
    }
}

/// The immutable, compiled pipeline together with the layout it was built from.
///
/// A different configuration needs a new `PipelineState`; nothing here can be changed after
/// [`PipelineState::new`] returns.
pub struct PipelineState {
    pipeline: wgpu::RenderPipeline,
    layout: BindingLayout,
    bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    depth: Option<DepthTest>,
    topology: Topology,
}

impl PipelineState {
    /// Validates `config` and builds the pipeline on `device`.
    ///
    /// # Errors
    ///
    /// [`RenderError::PipelineConfiguration`] when [`PipelineConfig::validate`] fails. Nothing is
    /// created on the device in that case.
    pub fn new(device: &wgpu::Device, config: &PipelineConfig) -> Result<Self, RenderError> {
        let layout = config.validate()?;

        let bind_group_layouts = (0..layout.group_count())
            .map(|group| create_bind_group_layout(device, &layout, group))
            .collect::<Vec<_>>();

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(config.label),
            bind_group_layouts: &bind_group_layouts.iter().collect::<Vec<_>>(),
            push_constant_ranges: &[],
        });

        let vertex_module = create_shader_module(device, &config.vertex);
        let fragment_module = create_shader_module(device, &config.fragment);

        let attributes = config
            .vertex_layout
            .as_ref()
            .map(VertexLayout::wgpu_attributes)
            .unwrap_or_default();
        let vertex_buffers = config
            .vertex_layout
            .as_ref()
            .map(|vertex_layout| wgpu::VertexBufferLayout {
                array_stride: vertex_layout.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &attributes,
            })
            .into_iter()
            .collect::<Vec<_>>();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(config.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(config.vertex.entry_point),
                buffers: &vertex_buffers,
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: config.topology.to_wgpu(),
                strip_index_format: None, // draws are non-indexed
                front_face: config.front_face,
                cull_mode: config.cull_mode.to_wgpu(),
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: config.depth.map(|depth| wgpu::DepthStencilState {
                format: depth.format,
                depth_write_enabled: depth.write_enabled,
                depth_compare: depth.compare,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(config.fragment.entry_point),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        log::info!(
            "Built pipeline '{}' ({:?}, {} binding(s))",
            config.label,
            config.topology,
            layout.requirements().len()
        );

        Ok(Self {
            pipeline,
            layout,
            bind_group_layouts,
            depth: config.depth,
            topology: config.topology,
        })
    }

    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// The binding requirements derived when the pipeline was built.
    pub fn binding_layout(&self) -> &BindingLayout {
        &self.layout
    }

    pub fn bind_group_layout(&self, group: u32) -> Option<&wgpu::BindGroupLayout> {
        self.bind_group_layouts.get(group as usize)
    }

    pub fn depth(&self) -> Option<&DepthTest> {
        self.depth.as_ref()
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Checks that the depth target bound at assembly matches the pipeline's depth test.
    pub fn check_depth_target(
        &self,
        target_format: Option<wgpu::TextureFormat>,
    ) -> Result<(), RenderError> {
        match (self.depth.map(|depth| depth.format), target_format) {
            (None, None) => Ok(()),
            (Some(expected), Some(actual)) if expected == actual => Ok(()),
            (Some(expected), Some(actual)) => Err(RenderError::pipeline(format!(
                "depth test expects {expected:?} but the depth target is {actual:?}"
            ))),
            (Some(expected), None) => Err(RenderError::pipeline(format!(
                "depth test expects a {expected:?} target but none is bound"
            ))),
            (None, Some(actual)) => Err(RenderError::pipeline(format!(
                "a {actual:?} depth target is bound but the pipeline has no depth test"
            ))),
        }
    }
}

fn create_shader_module(device: &wgpu::Device, program: &ShaderProgram) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(program.label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(program.source)),
    })
}

fn create_bind_group_layout(
    device: &wgpu::Device,
    layout: &BindingLayout,
    group: u32,
) -> wgpu::BindGroupLayout {
    let entries = layout
        .group(group)
        .map(|requirement| wgpu::BindGroupLayoutEntry {
            binding: requirement.binding,
            visibility: requirement.visibility,
            ty: match requirement.kind {
                BindingKind::UniformBuffer { min_size } => wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(min_size),
                },
            },
            count: None,
        })
        .collect::<Vec<_>>();

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("derived_bind_group_layout"),
        entries: &entries,
    })
}

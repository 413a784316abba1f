//! Rendering tests against a real device, drawing into an offscreen target.
//!
//! Each test returns early when the machine has no adapter at all.

use samples_core::{
    Camera, Clock, CullMode, FrameLoop, FrameScheduler, FrameStats, GeometryResource,
    GeometrySource, Gpu, OffscreenTarget, PipelineState, RenderContext, RenderError,
    SampleDescriptor, ShaderProgram, TickOutcome, Topology, Vertex, CUBE_VERTICES,
};

const SIZE: u32 = 64;

struct FixedClock(f64);

impl Clock for FixedClock {
    fn seconds(&self) -> f64 {
        self.0
    }
}

struct NoScheduler;

impl FrameScheduler for NoScheduler {
    fn request_next_frame(&self) {}
}

fn headless_gpu() -> Option<Gpu> {
    match pollster::block_on(Gpu::headless_async()) {
        Ok(gpu) => Some(gpu),
        Err(error) => {
            eprintln!("skipping GPU test: {error}");
            None
        }
    }
}

fn render(gpu: Gpu, descriptor: &SampleDescriptor, frames: u64) -> (Vec<u8>, FrameStats) {
    let target = OffscreenTarget::new(&gpu.device, SIZE, SIZE).unwrap();
    let camera = descriptor
        .camera
        .map(|config| Camera::for_size(config, SIZE, SIZE));
    let mut context = RenderContext::new(gpu, target, descriptor).unwrap();
    let mut frame_loop = FrameLoop::new(FixedClock(0.3), camera);

    for _ in 0..frames {
        assert_eq!(
            frame_loop.tick(&mut context, &NoScheduler),
            TickOutcome::Submitted
        );
    }

    let pixels = pollster::block_on(context.target().read_pixels(context.gpu())).unwrap();
    (pixels, frame_loop.stats())
}

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let start = ((y * SIZE + x) * 4) as usize;
    [
        pixels[start],
        pixels[start + 1],
        pixels[start + 2],
        pixels[start + 3],
    ]
}

#[test]
fn geometry_upload_round_trips() {
    let Some(gpu) = headless_gpu() else { return };

    let geometry = GeometryResource::new(&gpu.device, &CUBE_VERTICES).unwrap();
    assert_eq!(geometry.vertex_count(), 36);
    assert_eq!(geometry.byte_len(), 36 * Vertex::STRIDE);

    let staging = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("staging"),
        size: geometry.byte_len(),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
    encoder.copy_buffer_to_buffer(geometry.buffer(), 0, &staging, 0, geometry.byte_len());
    gpu.queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (sender, receiver) = futures::channel::oneshot::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        sender.send(result).unwrap();
    });
    let _ = gpu.device.poll(wgpu::Maintain::Wait);
    pollster::block_on(receiver).unwrap().unwrap();

    let uploaded = slice.get_mapped_range();
    let expected: &[u8] = bytemuck::cast_slice(&CUBE_VERTICES);
    assert_eq!(&uploaded[..], expected);
}

#[test]
fn empty_geometry_is_rejected_by_the_device_path() {
    let Some(gpu) = headless_gpu() else { return };

    assert!(matches!(
        GeometryResource::new(&gpu.device, &[]),
        Err(RenderError::Allocation { .. })
    ));
}

#[test]
fn rotating_cube_covers_the_center() {
    let Some(gpu) = headless_gpu() else { return };

    let (pixels, stats) = render(gpu, &samples_core::sample::ROTATING_CUBE, 3);
    assert_eq!(stats.submitted, 3);
    assert_eq!(stats.uniform_updates, 3);
    assert_eq!(stats.skipped, 0);

    // Every point on the cube has one coordinate at ±1, so one channel is far from the grey clear.
    let center = pixel(&pixels, SIZE / 2, SIZE / 2);
    let distance = center[..3]
        .iter()
        .map(|channel| (*channel as i32 - 128).abs())
        .max()
        .unwrap();
    assert!(distance > 40, "center pixel {center:?} looks like the clear color");

    let corner = pixel(&pixels, 0, 0);
    assert!(
        corner[..3].iter().all(|channel| (127..=128).contains(channel)),
        "corner pixel {corner:?} is not the clear color"
    );
}

#[test]
fn hello_triangle_is_red_on_black() {
    let Some(gpu) = headless_gpu() else { return };

    let (pixels, stats) = render(gpu, &samples_core::sample::HELLO_TRIANGLE, 1);
    assert_eq!(stats.uniform_updates, 0);
    assert_eq!(pixel(&pixels, SIZE / 2, SIZE / 2), [255, 0, 0, 255]);
    assert_eq!(pixel(&pixels, 1, 1), [0, 0, 0, 255]);
}

#[test]
fn rectangle_with_hole_leaves_the_center_empty() {
    let Some(gpu) = headless_gpu() else { return };

    let (pixels, _) = render(gpu, &samples_core::sample::RECTANGLE_WITH_HOLE, 1);
    assert_eq!(pixel(&pixels, SIZE / 2, SIZE / 2), [0, 0, 0, 255]);
    // x ≈ 0.6 in clip space, inside the right side of the ring.
    assert_eq!(pixel(&pixels, 51, SIZE / 2), [255, 0, 0, 255]);
}

const UV_COLOR_SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vertex_main(@location(0) position: vec4<f32>, @location(1) uv: vec2<f32>) -> VertexOutput {
    var output: VertexOutput;
    output.position = position;
    output.uv = uv;
    return output;
}

@fragment
fn fragment_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(uv, 0.0, 1.0);
}
"#;

const fn screen_triangle(z: f32, uv: [f32; 2]) -> [Vertex; 3] {
    [
        Vertex::new([-1.0, -1.0, z, 1.0], uv),
        Vertex::new([3.0, -1.0, z, 1.0], uv),
        Vertex::new([-1.0, 3.0, z, 1.0], uv),
    ]
}

const NEAR_GREEN: [Vertex; 3] = screen_triangle(0.2, [0.0, 1.0]);
const FAR_RED: [Vertex; 3] = screen_triangle(0.8, [1.0, 0.0]);

static NEAR_FIRST: [Vertex; 6] = [
    NEAR_GREEN[0], NEAR_GREEN[1], NEAR_GREEN[2], FAR_RED[0], FAR_RED[1], FAR_RED[2],
];
static FAR_FIRST: [Vertex; 6] = [
    FAR_RED[0], FAR_RED[1], FAR_RED[2], NEAR_GREEN[0], NEAR_GREEN[1], NEAR_GREEN[2],
];

fn overlapping_triangles(vertices: &'static [Vertex]) -> SampleDescriptor {
    let mut descriptor = samples_core::sample::ROTATING_CUBE;
    descriptor.name = "depth-order";
    descriptor.geometry = GeometrySource::Vertices(vertices);
    descriptor.vertex_shader = ShaderProgram {
        label: "uv_color",
        source: UV_COLOR_SHADER,
        entry_point: "vertex_main",
        bindings: &[],
    };
    descriptor.fragment_shader = ShaderProgram {
        label: "uv_color",
        source: UV_COLOR_SHADER,
        entry_point: "fragment_main",
        bindings: &[],
    };
    descriptor.cull_mode = CullMode::None;
    descriptor.topology = Topology::TriangleList;
    descriptor.camera = None;
    descriptor
}

#[test]
fn closer_fragment_wins_regardless_of_draw_order() {
    for vertices in [&NEAR_FIRST, &FAR_FIRST] {
        let Some(gpu) = headless_gpu() else { return };

        let (pixels, _) = render(gpu, &overlapping_triangles(vertices), 1);
        assert_eq!(pixel(&pixels, SIZE / 2, SIZE / 2), [0, 255, 0, 255]);
    }
}

#[test]
fn depth_target_must_match_the_pipeline() {
    let Some(gpu) = headless_gpu() else { return };

    let config = samples_core::sample::ROTATING_CUBE.pipeline_config(OffscreenTarget::FORMAT);
    let pipeline = PipelineState::new(&gpu.device, &config).unwrap();

    assert!(pipeline
        .check_depth_target(Some(wgpu::TextureFormat::Depth24Plus))
        .is_ok());
    assert!(matches!(
        pipeline.check_depth_target(None),
        Err(RenderError::PipelineConfiguration(_))
    ));
    assert!(pipeline
        .check_depth_target(Some(wgpu::TextureFormat::Depth32Float))
        .is_err());
    assert_eq!(pipeline.binding_layout().group_count(), 1);
}

fn assembly_error(descriptor: &SampleDescriptor) -> RenderError {
    let gpu = headless_gpu().expect("adapter checked by caller");
    let target = OffscreenTarget::new(&gpu.device, SIZE, SIZE).unwrap();
    match RenderContext::new(gpu, target, descriptor) {
        Ok(_) => panic!("'{}' assembled", descriptor.name),
        Err(error) => error,
    }
}

#[test]
fn uniform_smaller_than_declared_binding_is_rejected() {
    if headless_gpu().is_none() {
        return;
    }

    let mut descriptor = samples_core::sample::ROTATING_CUBE;
    descriptor.vertex_shader.bindings = &[samples_core::DeclaredBinding {
        group: 0,
        binding: 0,
        kind: samples_core::BindingKind::UniformBuffer { min_size: 128 },
    }];

    let error = assembly_error(&descriptor);
    assert!(matches!(error, RenderError::PipelineConfiguration(_)));
    assert!(error.to_string().contains("needs 128 bytes"), "{error}");
}

#[test]
fn declared_binding_without_uniform_is_rejected() {
    if headless_gpu().is_none() {
        return;
    }

    let mut descriptor = samples_core::sample::ROTATING_CUBE;
    descriptor.camera = None;

    let error = assembly_error(&descriptor);
    assert!(matches!(error, RenderError::PipelineConfiguration(_)));
    assert!(error.to_string().contains("no uniform"), "{error}");
}

#[test]
fn uniform_without_declared_binding_is_rejected() {
    if headless_gpu().is_none() {
        return;
    }

    let mut descriptor = samples_core::sample::HELLO_TRIANGLE;
    descriptor.camera = Some(samples_core::CUBE_CAMERA);

    assert!(matches!(
        assembly_error(&descriptor),
        RenderError::PipelineConfiguration(_)
    ));
}

#[test]
fn pipeline_builds_derive_the_same_layout() {
    let Some(gpu) = headless_gpu() else { return };

    let config = samples_core::sample::ROTATING_CUBE.pipeline_config(OffscreenTarget::FORMAT);
    let first = PipelineState::new(&gpu.device, &config).unwrap();
    let second = PipelineState::new(&gpu.device, &config).unwrap();

    assert_eq!(first.binding_layout(), second.binding_layout());
    assert_eq!(first.binding_layout().requirements().len(), 1);
    assert!(first.bind_group_layout(0).is_some());
    assert!(first.bind_group_layout(1).is_none());
}

#[test]
fn camera_on_a_context_without_uniform_counts_no_updates() {
    let Some(gpu) = headless_gpu() else { return };

    let target = OffscreenTarget::new(&gpu.device, SIZE, SIZE).unwrap();
    let mut context =
        RenderContext::new(gpu, target, &samples_core::sample::HELLO_TRIANGLE).unwrap();
    assert!(!context.has_uniform());

    let camera = Camera::for_size(samples_core::CUBE_CAMERA, SIZE, SIZE);
    let mut frame_loop = FrameLoop::new(FixedClock(0.0), Some(camera));
    frame_loop.tick(&mut context, &NoScheduler);

    let stats = frame_loop.stats();
    assert_eq!(stats.submitted, 1);
    assert_eq!(stats.uniform_updates, 0);
}

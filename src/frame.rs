//! # Frame Loop
//!
//! The per-frame state machine of a sample. Every refresh tick from the host drives one pass
//! through
//!
//! ```text
//! Idle ──tick──▶ Encoding ──submit──▶ Submitted ──reschedule──▶ Idle
//!                   │                                   ▲
//!                   └──── image unavailable (skip) ─────┘
//! ```
//!
//! - **Idle → Encoding**: the transform is recomputed from the [`Clock`] and written into the
//!   uniform. Samples without a camera skip this step.
//! - **Encoding**: the presentable image is acquired and a single render pass is encoded.
//! - **Encoding → Submitted**: the encoded commands are submitted and the image is presented.
//! - **Submitted → Idle**: the next refresh is requested from the [`FrameScheduler`]. The loop
//!   never waits for the GPU to finish.
//!
//! If the image cannot be acquired, the frame is skipped with a warning and the next refresh is
//! still requested, so a transient surface failure never stops the loop.
//!
//! The GPU side is behind the [`FrameBackend`] trait. [`crate::RenderContext`] implements it for
//! real devices; the tests below implement it with a recorder.

use web_time::{SystemTime, UNIX_EPOCH};

use crate::camera::Camera;
use crate::error::RenderError;
use crate::uniform_buffer::TransformMatrix;

/// Where the loop currently is inside a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    #[default]
    Idle,
    Encoding,
    Submitted,
}

/// What happened to one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Submitted,
    Skipped,
}

/// Running totals kept by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub ticks: u64,
    pub submitted: u64,
    pub skipped: u64,
    pub uniform_updates: u64,
}

/// A monotonically advancing time source, in seconds.
pub trait Clock {
    fn seconds(&self) -> f64;
}

/// Wall-clock time since the Unix epoch. Works natively and in the browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn seconds(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}

/// The host's refresh primitive.
pub trait FrameScheduler {
    /// Asks the host to call back once more at its next refresh.
    fn request_next_frame(&self);
}

impl FrameScheduler for winit::window::Window {
    fn request_next_frame(&self) {
        self.request_redraw();
    }
}

/// The GPU work of one frame, split at the points where the loop changes state.
pub trait FrameBackend {
    /// The presentable image acquired for a frame.
    type Image;

    /// The encoded, not yet submitted, commands of a frame.
    type Commands;

    /// Writes `transform` into the uniform. Returns `false` when there is no uniform to write.
    fn update_transform(&mut self, transform: &TransformMatrix) -> bool;

    fn acquire_image(&mut self) -> Result<Self::Image, RenderError>;

    fn encode_pass(&mut self, image: &Self::Image) -> Self::Commands;

    /// Submits `commands` and presents `image`.
    fn submit(&mut self, commands: Self::Commands, image: Self::Image);
}

/// Drives a [`FrameBackend`] once per host refresh.
#[derive(Debug)]
pub struct FrameLoop<C = SystemClock> {
    clock: C,
    camera: Option<Camera>,
    state: FrameState,
    stats: FrameStats,
}

impl FrameLoop<SystemClock> {
    pub fn with_system_clock(camera: Option<Camera>) -> Self {
        Self::new(SystemClock, camera)
    }
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(clock: C, camera: Option<Camera>) -> Self {
        Self {
            clock,
            camera,
            state: FrameState::Idle,
            stats: FrameStats::default(),
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// Runs one full frame and requests the next one.
    pub fn tick<B, S>(&mut self, backend: &mut B, scheduler: &S) -> TickOutcome
    where
        B: FrameBackend,
        S: FrameScheduler + ?Sized,
    {
        self.transition(FrameState::Encoding);

        if let Some(camera) = &self.camera {
            let transform = camera.transform(self.clock.seconds());
            if backend.update_transform(&transform) {
                self.stats.uniform_updates += 1;
            } else if self.stats.ticks == 0 {
                log::warn!("Camera is set but the render backend has no uniform to update");
            }
        }

        let outcome = match backend.acquire_image() {
            Ok(image) => {
                let commands = backend.encode_pass(&image);
                backend.submit(commands, image);
                self.transition(FrameState::Submitted);
                self.stats.submitted += 1;
                TickOutcome::Submitted
            }
            Err(error) => {
                log::warn!("Skipping frame {}: {error}", self.stats.ticks);
                self.stats.skipped += 1;
                TickOutcome::Skipped
            }
        };

        self.stats.ticks += 1;
        self.transition(FrameState::Idle);
        scheduler.request_next_frame();

        outcome
    }

    fn transition(&mut self, next: FrameState) {
        log::trace!("Frame {}: {:?} -> {:?}", self.stats.ticks, self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CUBE_CAMERA;
    use std::cell::Cell;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Event {
        Update,
        Acquire,
        Draw,
        Submit,
    }

    #[derive(Default)]
    struct RecordingBackend {
        events: Vec<Event>,
        transforms: Vec<TransformMatrix>,
        failing_frames: Vec<usize>,
        acquisitions: usize,
        without_uniform: bool,
    }

    impl RecordingBackend {
        fn count(&self, event: Event) -> usize {
            self.events.iter().filter(|recorded| **recorded == event).count()
        }
    }

    impl FrameBackend for RecordingBackend {
        type Image = usize;
        type Commands = usize;

        fn update_transform(&mut self, transform: &TransformMatrix) -> bool {
            if self.without_uniform {
                return false;
            }
            self.events.push(Event::Update);
            self.transforms.push(*transform);
            true
        }

        fn acquire_image(&mut self) -> Result<usize, RenderError> {
            let frame = self.acquisitions;
            self.acquisitions += 1;
            self.events.push(Event::Acquire);
            if self.failing_frames.contains(&frame) {
                return Err(RenderError::SurfaceUnavailable(wgpu::SurfaceError::Timeout));
            }
            Ok(frame)
        }

        fn encode_pass(&mut self, image: &usize) -> usize {
            self.events.push(Event::Draw);
            *image
        }

        fn submit(&mut self, commands: usize, image: usize) {
            assert_eq!(commands, image);
            self.events.push(Event::Submit);
        }
    }

    #[derive(Default)]
    struct CountingScheduler {
        requests: Cell<u32>,
    }

    impl FrameScheduler for CountingScheduler {
        fn request_next_frame(&self) {
            self.requests.set(self.requests.get() + 1);
        }
    }

    /// Advances by one second each time it is read.
    #[derive(Default)]
    struct SteppingClock {
        now: Cell<f64>,
    }

    impl Clock for SteppingClock {
        fn seconds(&self) -> f64 {
            let now = self.now.get();
            self.now.set(now + 1.0);
            now
        }
    }

    fn cube_loop() -> FrameLoop<SteppingClock> {
        FrameLoop::new(
            SteppingClock::default(),
            Some(Camera::for_size(CUBE_CAMERA, 640, 480)),
        )
    }

    #[test]
    fn every_tick_updates_then_draws_then_submits() {
        let mut frame_loop = cube_loop();
        let mut backend = RecordingBackend::default();
        let scheduler = CountingScheduler::default();

        for _ in 0..5 {
            assert_eq!(
                frame_loop.tick(&mut backend, &scheduler),
                TickOutcome::Submitted
            );
            assert_eq!(frame_loop.state(), FrameState::Idle);
        }

        assert_eq!(backend.count(Event::Draw), 5);
        assert_eq!(backend.count(Event::Submit), 5);
        assert_eq!(scheduler.requests.get(), 5);
        for frame in backend.events.chunks_exact(4) {
            assert_eq!(
                frame,
                &[Event::Update, Event::Acquire, Event::Draw, Event::Submit]
            );
        }

        let stats = frame_loop.stats();
        assert_eq!(stats.ticks, 5);
        assert_eq!(stats.submitted, 5);
        assert_eq!(stats.uniform_updates, 5);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn transform_advances_with_the_clock() {
        let mut frame_loop = cube_loop();
        let mut backend = RecordingBackend::default();
        let scheduler = CountingScheduler::default();

        frame_loop.tick(&mut backend, &scheduler);
        frame_loop.tick(&mut backend, &scheduler);

        let camera = Camera::for_size(CUBE_CAMERA, 640, 480);
        assert_eq!(backend.transforms, vec![camera.transform(0.0), camera.transform(1.0)]);
    }

    #[test]
    fn unavailable_image_skips_the_frame_but_reschedules() {
        let mut frame_loop = cube_loop();
        let mut backend = RecordingBackend {
            failing_frames: vec![1],
            ..Default::default()
        };
        let scheduler = CountingScheduler::default();

        let outcomes: Vec<_> = (0..3)
            .map(|_| frame_loop.tick(&mut backend, &scheduler))
            .collect();

        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Submitted,
                TickOutcome::Skipped,
                TickOutcome::Submitted
            ]
        );
        assert_eq!(backend.count(Event::Draw), 2);
        assert_eq!(backend.count(Event::Submit), 2);
        assert_eq!(scheduler.requests.get(), 3);
        assert_eq!(frame_loop.state(), FrameState::Idle);

        let stats = frame_loop.stats();
        assert_eq!((stats.submitted, stats.skipped), (2, 1));
        assert_eq!(stats.uniform_updates, 3);
    }

    #[test]
    fn loop_without_camera_never_touches_the_uniform() {
        let mut frame_loop = FrameLoop::new(SteppingClock::default(), None);
        let mut backend = RecordingBackend::default();
        let scheduler = CountingScheduler::default();

        for _ in 0..3 {
            frame_loop.tick(&mut backend, &scheduler);
        }

        assert_eq!(backend.count(Event::Update), 0);
        assert_eq!(backend.count(Event::Submit), 3);
        assert_eq!(frame_loop.stats().uniform_updates, 0);
    }

    #[test]
    fn camera_without_uniform_counts_no_updates() {
        let mut frame_loop = cube_loop();
        let mut backend = RecordingBackend {
            without_uniform: true,
            ..Default::default()
        };
        let scheduler = CountingScheduler::default();

        for _ in 0..2 {
            assert_eq!(
                frame_loop.tick(&mut backend, &scheduler),
                TickOutcome::Submitted
            );
        }

        assert_eq!(frame_loop.stats().uniform_updates, 0);
        assert_eq!(frame_loop.stats().submitted, 2);
        assert!(backend.transforms.is_empty());
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.seconds();
        let second = clock.seconds();
        assert!(first > 0.0);
        assert!(second >= first);
    }
}

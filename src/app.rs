//! # Application Module
//!
//! The `app` module connects a sample to the host: it opens the window (or, on the web, adopts
//! the `canvas` element), assembles the [`RenderContext`] for it and forwards every refresh to the
//! [`FrameLoop`].
//!
//! ## Overview
//!
//! [`App`] implements winit's `ApplicationHandler`:
//!
//! - **`resumed`** creates a fixed-size window and starts building the render context. Natively
//!   this blocks on `pollster`; on the web the context is built on the browser executor and handed
//!   back through a `futures` oneshot channel.
//! - **`window_event`** ticks the frame loop on `RedrawRequested` and exits on `CloseRequested`.
//!   Each tick requests the next redraw itself, so the loop keeps running without recursion.
//!
//! Any error while bringing the sample up is logged, stops the event loop and is returned from
//! [`run`].
//!
//! ## Platform Notes
//!
//! - Natively the window is created non-resizable, so the depth target sized at startup stays
//!   valid for the whole run.
//! - On the web the canvas with id `canvas` is used when present, and the context is sized from
//!   its `width`/`height` attributes.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::camera::Camera;
use crate::error::InitError;
use crate::frame::FrameLoop;
use crate::renderer::RenderContext;
use crate::sample::Sample;
use crate::target::WindowSurface;

#[cfg(target_arch = "wasm32")]
type ContextReceiver =
    futures::channel::oneshot::Receiver<Result<RenderContext<WindowSurface>, InitError>>;

/// Runs one sample until its window is closed.
///
/// # Errors
///
/// Returns the first [`InitError`] hit while the sample was being brought up, or the event loop's
/// own failure.
pub fn run(sample: Sample) -> Result<(), InitError> {
    crate::logging::init_logging();
    log::info!("Starting '{}'", sample.descriptor().name);

    let event_loop = EventLoop::new()?;
    let app = App::new(sample);

    #[cfg(not(target_arch = "wasm32"))]
    {
        let mut app = app;
        event_loop.run_app(&mut app)?;
        if let Some(error) = app.init_error.take() {
            return Err(error);
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        event_loop.spawn_app(app);
    }

    Ok(())
}

/// The host side of one running sample.
pub struct App {
    sample: Sample,
    window: Option<Arc<Window>>,
    context: Option<RenderContext<WindowSurface>>,
    frame_loop: Option<FrameLoop>,
    init_error: Option<InitError>,
    #[cfg(target_arch = "wasm32")]
    context_receiver: Option<ContextReceiver>,
}

impl App {
    pub fn new(sample: Sample) -> Self {
        Self {
            sample,
            window: None,
            context: None,
            frame_loop: None,
            init_error: None,
            #[cfg(target_arch = "wasm32")]
            context_receiver: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: InitError) {
        log::error!("Failed to start '{}': {error}", self.sample.descriptor().name);
        self.init_error = Some(error);
        event_loop.exit();
    }

    /// Installs a finished context and kicks off the first frame.
    fn start(&mut self, context: RenderContext<WindowSurface>) {
        let (width, height) = context.size();
        let camera = self
            .sample
            .descriptor()
            .camera
            .map(|config| Camera::for_size(config, width, height));

        self.frame_loop = Some(FrameLoop::with_system_clock(camera));
        self.context = Some(context);

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn poll_context(&mut self, event_loop: &ActiveEventLoop) {
        let Some(receiver) = self.context_receiver.as_mut() else {
            return;
        };
        match receiver.try_recv() {
            Ok(Some(Ok(context))) => {
                self.context_receiver = None;
                self.start(context);
            }
            Ok(Some(Err(error))) => {
                self.context_receiver = None;
                self.fail(event_loop, error);
            }
            Ok(None) => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Err(_) => {
                self.context_receiver = None;
                log::error!("Render context creation was cancelled");
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut attributes = Window::default_attributes();

        #[allow(unused_mut)]
        let mut canvas_size: Option<(u32, u32)> = None;

        #[cfg(not(target_arch = "wasm32"))]
        {
            attributes = attributes
                .with_title(self.sample.descriptor().name)
                .with_resizable(false);
        }

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas = wgpu::web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id("canvas"))
                .and_then(|element| element.dyn_into::<wgpu::web_sys::HtmlCanvasElement>().ok());
            match canvas {
                Some(canvas) => {
                    log::info!("Canvas dimensions: ({} x {})", canvas.width(), canvas.height());
                    canvas_size = Some((canvas.width(), canvas.height()));
                    attributes = attributes.with_canvas(Some(canvas));
                }
                None => log::warn!("No #canvas element, letting winit create one"),
            }
        }

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(error) => return self.fail(event_loop, error.into()),
        };
        self.window = Some(window.clone());

        let (width, height) = canvas_size.unwrap_or_else(|| {
            let size = window.inner_size();
            (size.width, size.height)
        });
        let descriptor = self.sample.descriptor();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let context = pollster::block_on(RenderContext::new_async(
                window,
                width,
                height,
                descriptor,
            ));
            match context {
                Ok(context) => self.start(context),
                Err(error) => self.fail(event_loop, error),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let (sender, receiver) = futures::channel::oneshot::channel();
            self.context_receiver = Some(receiver);
            wasm_bindgen_futures::spawn_local(async move {
                let context =
                    RenderContext::new_async(window, width, height, descriptor).await;
                if sender.send(context).is_err() {
                    log::error!("Failed to send render context!");
                }
            });
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        #[cfg(target_arch = "wasm32")]
        self.poll_context(event_loop);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting...");
                if let Some(frame_loop) = &self.frame_loop {
                    log::info!("{:?}", frame_loop.stats());
                }
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let (Some(window), Some(context), Some(frame_loop)) = (
                    self.window.as_ref(),
                    self.context.as_mut(),
                    self.frame_loop.as_mut(),
                ) else {
                    return;
                };
                frame_loop.tick(context, window.as_ref());
            }
            _ => (),
        }
    }
}

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::color::Color;
use crate::composer::SceneComposer;
use crate::error::{AppError, RenderError};
use crate::gpu::GpuContext;
use crate::input::{Controls, Input};
use crate::mesh::DEFAULT_CONE_SLICES;
use crate::model_pass::ModelPass;
use crate::render_loop::{AppState, DEFAULT_DRAG_SENSITIVITY, FrameReport, RenderLoop};

/// Frames between window title refreshes.
const TITLE_REFRESH_FRAMES: u64 = 30;

/// Configuration for the app window and the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Degrees of global rotation per pixel of horizontal drag.
    pub drag_sensitivity: f32,
    pub ear_slices: u32,
    /// Start with the idle animation running.
    pub auto_animate: bool,
    pub background: Color,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Critter".to_string(),
            width: 800,
            height: 800,
            drag_sensitivity: DEFAULT_DRAG_SENSITIVITY,
            ear_slices: DEFAULT_CONE_SLICES,
            auto_animate: false,
            background: Color::rgb(0.9, 0.9, 0.9),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn drag_sensitivity(mut self, degrees_per_pixel: f32) -> Self {
        self.drag_sensitivity = degrees_per_pixel;
        self
    }

    pub fn ear_slices(mut self, slices: u32) -> Self {
        self.ear_slices = slices;
        self
    }

    pub fn auto_animate(mut self, on: bool) -> Self {
        self.auto_animate = on;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// The pose loop this configuration starts with.
    pub fn render_loop(&self) -> RenderLoop {
        let mut state = AppState::new(self.drag_sensitivity);
        state.pose.set_auto_animate(self.auto_animate);
        let composer = SceneComposer::new().ear_slices(self.ear_slices);
        RenderLoop::new(state, composer)
    }
}

/// Run the viewer with the default configuration.
pub fn run() -> Result<(), AppError> {
    run_with_config(AppConfig::default())
}

/// Open a window and render the creature until it is closed.
///
/// # Example
/// ```no_run
/// critter::run_with_config(
///     critter::AppConfig::new().title("Critter").size(1024, 1024).auto_animate(true),
/// )
/// .expect("viewer failed");
/// ```
pub fn run_with_config(config: AppConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = CritterApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        CritterApp::Failed(error) => Err(error),
        _ => Ok(()),
    }
}

enum CritterApp {
    Pending {
        config: AppConfig,
    },
    Running(Box<Running>),
    /// Setup failed; the event loop has been asked to exit.
    Failed(AppError),
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    pass: ModelPass,
    render_loop: RenderLoop,
    input: Input,
    controls: Controls,
    title: String,
    background: Color,
    start_time: Instant,
    frames: u64,
}

impl Running {
    fn new(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self, AppError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;
        let pass = ModelPass::new(&gpu);
        log::info!(
            "Window ready: {}x{}, {:?}",
            gpu.width(),
            gpu.height(),
            gpu.config.format
        );

        Ok(Self {
            window,
            gpu,
            pass,
            render_loop: config.render_loop(),
            input: Input::new(),
            controls: Controls::new(),
            title: config.title.clone(),
            background: config.background,
            start_time: Instant::now(),
            frames: 0,
        })
    }

    fn redraw(&mut self) {
        for event in self.controls.poll(&self.input) {
            self.render_loop.state.apply(event);
        }
        self.input.end_frame();

        let elapsed = self.start_time.elapsed().as_secs_f32();
        let frame = self.render_loop.tick(elapsed);
        let report = self.render_loop.submit(&frame, &mut self.pass);

        match self.present() {
            Ok(()) => {}
            Err(RenderError::Frame(
                e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated),
            )) => {
                log::warn!("Surface {e}; reconfiguring");
                self.gpu.reconfigure();
            }
            Err(e) => log::warn!("Skipping frame: {e}"),
        }

        self.frames += 1;
        self.report(&report);
    }

    /// Encodes the queued draws into the next surface texture and presents it.
    fn present(&mut self) -> Result<(), RenderError> {
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Critter Encoder"),
            });

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(e) => {
                self.pass.discard();
                return Err(e.into());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.pass
            .encode(&self.gpu, &mut encoder, &view, self.background);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn report(&self, report: &FrameReport) {
        log::debug!("{report}");
        if self.frames % TITLE_REFRESH_FRAMES == 0 {
            self.window
                .set_title(&format!("{} | {}", self.title, report));
        }
    }
}

impl ApplicationHandler for CritterApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let CritterApp::Pending { config } = self else {
            return;
        };

        *self = match Running::new(event_loop, config) {
            Ok(running) => {
                running.window.request_redraw();
                CritterApp::Running(Box::new(running))
            }
            Err(e) => {
                log::error!("Setup failed: {e}");
                event_loop.exit();
                CritterApp::Failed(e)
            }
        };
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let CritterApp::Running(app) = self else {
            return;
        };

        app.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Closing after {} frames", app.frames);
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                app.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                app.redraw();
                app.window.request_redraw();
            }
            _ => {}
        }
    }
}

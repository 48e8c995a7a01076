//! Waves - a noisy wave surface, resynthesized every frame.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalPosition, LogicalSize},
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use waves::camera::CameraSystem;
use waves::cli::Args;
use waves::fps::FpsTracker;
use waves::params::{aspect_ratio, RenderConfig, ScreenshotConfig};
use waves::rendering::{
    create_instance, Gpu, OffscreenTarget, RenderError, SurfaceTarget, Uniforms, WaveRenderer,
};
use waves::surface::WaveSurface;

/// GPU state that exists once the window does
struct Graphics {
    window: Arc<Window>,
    gpu: Gpu,
    target: SurfaceTarget,
    renderer: WaveRenderer,
}

/// Main application state
struct App {
    graphics: Option<Graphics>,
    surface: WaveSurface,
    camera: CameraSystem,
    render_config: RenderConfig,
    fps: FpsTracker,
    start_time: Instant,
}

impl App {
    fn new(surface: WaveSurface, camera: CameraSystem, render_config: RenderConfig) -> Self {
        Self {
            graphics: None,
            surface,
            camera,
            render_config,
            fps: FpsTracker::new(),
            start_time: Instant::now(),
        }
    }

    fn init_graphics(
        &self,
        event_loop: &ActiveEventLoop,
    ) -> Result<Graphics, Box<dyn std::error::Error>> {
        let [x, y] = self.render_config.window_position;
        let window_attributes = Window::default_attributes()
            .with_title(self.render_config.window_title.clone())
            .with_position(LogicalPosition::new(x, y))
            .with_inner_size(LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();

        let instance = create_instance();
        let surface = instance.create_surface(Arc::clone(&window))?;
        let gpu = pollster::block_on(Gpu::request(&instance, Some(&surface)))?;
        let target = SurfaceTarget::new(surface, &gpu, size.width, size.height)?;
        let renderer = WaveRenderer::new(
            &gpu,
            target.format(),
            target.size(),
            &self.surface.grid,
            self.render_config.style,
        );

        Ok(Graphics {
            window,
            gpu,
            target,
            renderer,
        })
    }

    /// Reshape: keep the surface, depth buffer and projection in step with the window
    fn resize(&mut self, width: u32, height: u32) {
        let Some(graphics) = &mut self.graphics else {
            return;
        };

        let (width, height) = graphics.target.resize(&graphics.gpu, width, height);
        graphics.renderer.resize(&graphics.gpu, width, height);
        log::debug!("Resized to {}x{}", width, height);
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.surface.update() {
            log::error!("Wave synthesis failed: {}", e);
            event_loop.exit();
            return;
        }

        let Some(graphics) = &self.graphics else {
            return;
        };

        let time_s = self.start_time.elapsed().as_secs_f32();
        let (width, height) = graphics.renderer.size();
        let (view_proj, _) = self.camera.create_view_proj_matrix(
            time_s,
            aspect_ratio(width, height),
            &self.render_config,
        );

        let uniforms = Uniforms::new(view_proj, &self.render_config);
        graphics
            .renderer
            .update(&graphics.gpu, &self.surface.grid.vertices, &uniforms);

        let frame = match graphics.target.acquire() {
            Ok(frame) => frame,
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("Surface lost, reconfiguring");
                graphics.target.reconfigure(&graphics.gpu);
                return;
            }
            Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                log::error!("Out of GPU memory");
                event_loop.exit();
                return;
            }
            Err(e) => {
                log::warn!("Render error: {}", e);
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        graphics.renderer.draw(&graphics.gpu, &view);
        frame.present();

        self.fps.record_frame();
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(graphics) = &self.graphics {
            graphics.window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return; // Already initialized
        }

        match self.init_graphics(event_loop) {
            Ok(graphics) => {
                log::info!("Press ESC to quit");
                self.graphics = Some(graphics);
            }
            Err(e) => {
                log::error!("Failed to initialize graphics: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

/// Simulate `config.frames` frames and write the last one to disk
fn run_headless(
    mut surface: WaveSurface,
    camera: CameraSystem,
    render_config: &RenderConfig,
    config: &ScreenshotConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    for _ in 0..config.frames {
        surface.update()?;
    }

    let instance = create_instance();
    let gpu = pollster::block_on(Gpu::request(&instance, None))?;
    let target = OffscreenTarget::new(
        &gpu,
        render_config.window_width,
        render_config.window_height,
    )?;
    let renderer = WaveRenderer::new(
        &gpu,
        OffscreenTarget::FORMAT,
        target.size(),
        &surface.grid,
        render_config.style,
    );

    let (width, height) = target.size();
    let (view_proj, _) = camera.create_view_proj_matrix(
        config.capture_time_s(),
        aspect_ratio(width, height),
        render_config,
    );
    renderer.update(
        &gpu,
        &surface.grid.vertices,
        &Uniforms::new(view_proj, render_config),
    );
    renderer.draw(&gpu, target.view());

    target.save_png(&gpu, &config.path)?;
    log::info!(
        "Saved {} ({} frames simulated)",
        config.path.display(),
        config.frames
    );

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let physics = args.wave_physics();
    let render_config = args.render_config();
    let camera = CameraSystem::new(args.camera_preset());

    log::info!(
        "Waves: {} components, {:?} noise, {:?} style",
        physics.magnitudes.len(),
        physics.noise,
        render_config.style
    );

    let surface = WaveSurface::new(physics)?;

    if let Some(screenshot) = args.screenshot_config() {
        return run_headless(surface, camera, &render_config, &screenshot);
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(surface, camera, render_config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

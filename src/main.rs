use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

use stereo_camera::{AutoFocuser, Camera, FocusMode, FrameMatrices, StereoCamera};
use stereo_config::AppConfig;
use stereo_input::OrbitController;
use stereo_render::{DepthSampler, Scene, StereoRenderer};

/// Application state.
struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    orbit: OrbitController,
    focuser: AutoFocuser,
    /// Side-by-side stereo (true) or plain mono rendering (false).
    stereo_enabled: bool,
}

struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: StereoRenderer,
    depth_sampler: DepthSampler,
    scene: Scene,
    camera: StereoCamera,
    started: Instant,
    last_frame: Instant,
    frame_count: u64,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let orbit = OrbitController::new(config.camera.eye, config.camera.center);
        let focuser = AutoFocuser::new(
            config.focus.mode,
            config.focus.depth_fraction,
            config.focus.speed,
            config.focus.min_focal_length,
            config.focus.max_focal_length,
        );
        Self {
            config,
            window: None,
            gpu: None,
            orbit,
            focuser,
            stereo_enabled: true,
        }
    }

    /// Push the orbit controller's pose into the stereo camera.
    fn sync_camera_pose(&mut self) {
        if let Some(gpu) = &mut self.gpu {
            gpu.camera
                .camera_mut()
                .set_look_at(self.orbit.eye(), self.orbit.center());
        }
    }

    fn render_frame(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let dt = gpu.last_frame.elapsed().as_secs_f32();
        gpu.last_frame = Instant::now();

        // Survey the previous frame's depth buffer before drawing over it.
        // One frame of focus latency, absorbed by the rate limiter.
        let depth_sample = if self.focuser.mode().uses_depth_buffer() {
            let (w, h) = (gpu.surface_config.width, gpu.surface_config.height);
            // In stereo the left eye's image occupies the left half.
            let center_x = if self.stereo_enabled { w / 4 } else { w / 2 };
            gpu.depth_sampler.sample_nearest(
                &gpu.device,
                &gpu.queue,
                gpu.renderer.depth_texture(),
                center_x,
                h / 2,
                gpu.camera.camera().near(),
                gpu.camera.camera().far(),
            )
        } else {
            None
        };

        self.focuser.update(&mut gpu.camera, dt, depth_sample);

        // This mode adjusts the focal length only; keeping the separation
        // sensible is the application's job.
        if self.focuser.mode() == FocusMode::FocalLength {
            gpu.camera
                .set_eye_separation(self.config.camera.eye_separation);
        }

        let matrices = FrameMatrices::snapshot(&gpu.camera);
        let items = gpu.scene.draw_items(gpu.started.elapsed().as_secs_f32());

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(e) => {
                warn!(?e, "failed to get surface texture");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render_frame(
            &gpu.device,
            &gpu.queue,
            &view,
            &items,
            &matrices,
            self.stereo_enabled,
            gpu.surface_config.width,
            gpu.surface_config.height,
        );

        output.present();

        gpu.frame_count += 1;
        if gpu.frame_count % 30 == 0 {
            // The original drew these values as on-screen text; the title
            // bar stands in for that here.
            if let Some(window) = &self.window {
                window.set_title(&format!(
                    "{} — {:?} | focal {:.3} | separation {:.3} | depth {:.2} | speed {:.3}",
                    self.config.window.title,
                    self.focuser.mode(),
                    gpu.camera.focal_length(),
                    gpu.camera.eye_separation(),
                    self.focuser.depth_fraction(),
                    self.focuser.speed(),
                ));
            }
        }
        if gpu.frame_count % 300 == 0 {
            tracing::debug!(frames = gpu.frame_count, "render heartbeat");
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode, repeat: bool) {
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::KeyF if !repeat => {
                if let Some(window) = &self.window {
                    let fullscreen = match window.fullscreen() {
                        Some(_) => None,
                        None => Some(Fullscreen::Borderless(None)),
                    };
                    window.set_fullscreen(fullscreen);
                }
            }
            KeyCode::KeyS if !repeat => {
                self.stereo_enabled = !self.stereo_enabled;
                info!(stereo = self.stereo_enabled, "stereo rendering toggled");
            }
            KeyCode::Digit1 => self.focuser.set_mode(FocusMode::FocalLength),
            KeyCode::Digit2 => self.focuser.set_mode(FocusMode::Focus),
            KeyCode::Digit3 => self.focuser.set_mode(FocusMode::AutoSimple),
            KeyCode::Digit4 => self.focuser.set_mode(FocusMode::AutoDepth),
            // Depth fraction: up toward negative parallax, down toward
            // positive; only meaningful in the auto modes.
            KeyCode::ArrowUp if self.focuser.mode().is_auto() => {
                self.focuser.adjust_depth_fraction(0.05);
            }
            KeyCode::ArrowDown if self.focuser.mode().is_auto() => {
                self.focuser.adjust_depth_fraction(-0.05);
            }
            KeyCode::Space => self.focuser.set_depth_fraction(1.0),
            KeyCode::ArrowLeft => self.focuser.adjust_speed(-0.01),
            KeyCode::ArrowRight => self.focuser.adjust_speed(0.01),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let size = PhysicalSize::new(self.config.window.width, self.config.window.height);
        let attrs = Window::default_attributes()
            .with_title(&self.config.window.title)
            .with_inner_size(size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .expect("failed to create window"),
        );
        self.window = Some(window.clone());

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .expect("failed to create surface");

        let (device, queue, adapter) = pollster::block_on(async {
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .expect("no suitable GPU adapter found");

            info!(name = adapter.get_info().name, "using GPU");

            let (device, queue) = adapter
                .request_device(
                    &wgpu::DeviceDescriptor {
                        label: Some("stereoscope_device"),
                        required_features: wgpu::Features::empty(),
                        required_limits: wgpu::Limits::default(),
                        memory_hints: Default::default(),
                    },
                    None,
                )
                .await
                .expect("failed to create device");

            (device, queue, adapter)
        });

        let win_size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: win_size.width,
            height: win_size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let renderer = StereoRenderer::new(&device, format, win_size.width, win_size.height);
        let depth_sampler = DepthSampler::new(&device);

        let base = Camera::new(
            self.config.camera.eye,
            self.config.camera.center,
            self.config.camera.fov_y_degrees,
            win_size.width as f32 / win_size.height as f32,
        );
        let mut camera = StereoCamera::new(base);
        camera.set_eye_separation(self.config.camera.eye_separation);

        let now = Instant::now();
        self.gpu = Some(GpuState {
            device,
            queue,
            surface,
            surface_config,
            renderer,
            depth_sampler,
            scene: Scene::new(),
            camera,
            started: now,
            last_frame: now,
            frame_count: 0,
        });

        info!(
            width = win_size.width,
            height = win_size.height,
            mode = ?self.focuser.mode(),
            "application initialized"
        );
        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                // Persist the runtime focus settings.
                self.config.focus.mode = self.focuser.mode();
                self.config.focus.depth_fraction = self.focuser.depth_fraction();
                self.config.focus.speed = self.focuser.speed();
                if let Err(e) = stereo_config::save_config(&self.config) {
                    error!(?e, "failed to save config");
                }
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    if let Some(gpu) = &mut self.gpu {
                        gpu.surface_config.width = size.width;
                        gpu.surface_config.height = size.height;
                        gpu.surface.configure(&gpu.device, &gpu.surface_config);
                        gpu.renderer.resize(&gpu.device, size.width, size.height);
                        // A resize may only touch the aspect ratio; focal
                        // length and eye separation stay put.
                        gpu.camera
                            .set_aspect_ratio(size.width as f32 / size.height as f32);
                    }
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == winit::event::ElementState::Pressed {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        self.handle_key(event_loop, code, event.repeat);
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if self.orbit.on_cursor_moved(position.x, position.y) {
                    self.sync_camera_pose();
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                self.orbit.on_mouse_button(button, state);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                if self.orbit.on_scroll(delta) {
                    self.sync_camera_pose();
                }
            }

            WindowEvent::RedrawRequested => {
                self.render_frame();
            }

            _ => {}
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stereoscope=info,stereo_camera=info,stereo_render=info".into()),
        )
        .init();

    info!("stereoscope starting");

    let config = stereo_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "failed to load config, using defaults");
        AppConfig::default()
    });

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

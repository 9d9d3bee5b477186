use anyhow::{Context, Result};
use blockyard_common::Material;
use blockyard_frame::{FrameReport, Session, SessionConfig};
use blockyard_input::{Action, Key};
use blockyard_kernel::PickHit;
use blockyard_render_wgpu::{FirstPersonCamera, WgpuRenderer};
use blockyard_tools::WorldInspector;
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "blockyard-desktop", about = "First-person block world")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON session config
    #[arg(long)]
    config: Option<PathBuf>,

    /// World generation seed
    #[arg(short, long)]
    seed: Option<u64>,
}

fn movement_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(Key::Forward),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(Key::Backward),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::Space => Some(Key::Jump),
        _ => None,
    }
}

fn hotbar_slot(code: KeyCode) -> Option<usize> {
    match code {
        KeyCode::Digit1 => Some(1),
        KeyCode::Digit2 => Some(2),
        KeyCode::Digit3 => Some(3),
        KeyCode::Digit4 => Some(4),
        _ => None,
    }
}

/// Application state.
struct AppState {
    session: Session,
    show_hud: bool,
    cursor_grabbed: bool,
    ctrl_held: bool,
    last_frame: Instant,
    last_report: Option<FrameReport>,
    target: Option<PickHit>,
    fps: f32,
}

impl AppState {
    fn new(session: Session) -> Self {
        Self {
            session,
            show_hud: true,
            cursor_grabbed: false,
            ctrl_held: false,
            last_frame: Instant::now(),
            last_report: None,
            target: None,
            fps: 0.0,
        }
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        if matches!(code, KeyCode::ControlLeft | KeyCode::ControlRight) {
            self.ctrl_held = pressed;
        }

        if let Some(key) = movement_key(code) {
            let input = self.session.input_mut();
            if pressed {
                input.key_down(key);
            } else {
                input.key_up(key);
            }
            return;
        }

        if !pressed {
            return;
        }

        let action = match code {
            KeyCode::KeyZ if self.ctrl_held => Some(Action::Undo),
            KeyCode::KeyY if self.ctrl_held => Some(Action::Redo),
            KeyCode::F1 => {
                self.show_hud = !self.show_hud;
                None
            }
            _ => hotbar_slot(code).and_then(Action::from_hotbar_slot),
        };
        if let Some(action) = action {
            if self.session.apply(action) {
                tracing::info!(?action, "world edited");
            }
        }
    }

    fn draw_crosshair(&self, ctx: &EguiContext) {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("crosshair"),
        ));
        let c = ctx.screen_rect().center();
        let stroke = egui::Stroke::new(2.0, egui::Color32::WHITE);
        painter.line_segment([c - egui::vec2(8.0, 0.0), c + egui::vec2(8.0, 0.0)], stroke);
        painter.line_segment([c - egui::vec2(0.0, 8.0), c + egui::vec2(0.0, 8.0)], stroke);
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        self.draw_crosshair(ctx);
        if !self.show_hud {
            return;
        }

        let summary = WorldInspector::summary(self.session.registry(), self.session.body());

        egui::Window::new("Blockyard")
            .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.0}", self.fps));
                ui.label(format!(
                    "Blocks: {}  Candidates: {}",
                    summary.block_count, summary.candidate_count
                ));
                ui.label(format!(
                    "Feet: ({:.2}, {:.2}, {:.2})  {:?}",
                    summary.position.x, summary.position.y, summary.position.z, summary.state
                ));
                if let Some(report) = &self.last_report {
                    ui.label(format!(
                        "Frame {}  dt={:.3}  synced={}",
                        report.frame, report.dt, report.changes_applied
                    ));
                }
                match &self.target {
                    Some(hit) => {
                        let material = self
                            .session
                            .registry()
                            .material(hit.coord)
                            .map_or("?", |m| m.name());
                        ui.label(format!("Target: {} {} at {:.2}", hit.coord, material, hit.distance));
                    }
                    None => {
                        ui.label("Target: none");
                    }
                }
                ui.separator();

                ui.horizontal(|ui| {
                    let selected = self.session.selected_material();
                    for (i, material) in Material::ALL.iter().enumerate() {
                        let label = format!("{} {}", i + 1, material.name());
                        if ui.selectable_label(selected == *material, label).clicked() {
                            self.session.apply(Action::SelectMaterial(*material));
                        }
                    }
                });
                ui.horizontal(|ui| {
                    if ui.button("Undo (Ctrl+Z)").clicked() {
                        self.session.apply(Action::Undo);
                    }
                    if ui.button("Redo (Ctrl+Y)").clicked() {
                        self.session.apply(Action::Redo);
                    }
                });
                ui.label(format!(
                    "Undo: {} / Redo: {}",
                    self.session.editor().undo_count(),
                    self.session.editor().redo_count()
                ));

                ui.separator();
                ui.small("Click: capture mouse | LMB: break | RMB: place");
                ui.small("WASD: move | Space: jump | 1-4: material | F1: HUD | Esc: release");
            });
    }
}

/// Window, device and the two renderers. Created on first resume.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    camera: FirstPersonCamera,
    egui_ctx: EguiContext,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, block_size: f32) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Blockyard")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("blockyard_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut camera = FirstPersonCamera::default();
        camera.set_viewport(config.width, config.height);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            block_size,
        );

        let egui_ctx = EguiContext::default();
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            camera,
            egui_ctx,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.camera.set_viewport(self.config.width, self.config.height);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn set_cursor_grab(&self, grab: bool) -> bool {
        if grab {
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                tracing::warn!("cursor grab unavailable: {e}");
                return false;
            }
        } else if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            tracing::warn!("cursor release failed: {e}");
        }
        self.window.set_cursor_visible(!grab);
        grab
    }

    fn draw_ui(&mut self, state: &mut AppState, view: &wgpu::TextureView) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });

        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
}

impl GpuApp {
    fn new(session: Session) -> Self {
        Self {
            state: AppState::new(session),
            gpu: None,
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let state = &mut self.state;

        let now = Instant::now();
        let dt = (now - state.last_frame).as_secs_f32();
        state.last_frame = now;
        if dt > 0.0 {
            state.fps = state.fps * 0.9 + (1.0 / dt) * 0.1;
        }

        let report = state.session.frame(dt, &mut gpu.renderer);
        state.last_report = Some(report);
        state.target = state.session.target();

        let session = &state.session;
        gpu.camera
            .set_pose(session.eye(), session.yaw(), session.pitch());

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &gpu.camera,
            state.target.map(|hit| hit.handle),
        );
        gpu.draw_ui(state, &view);

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, self.state.session.config().block_size) {
            Ok(mut gpu) => {
                // The registry log may already have been drained into a
                // previous backend.
                if self.state.session.frame_count() > 0 {
                    self.state.session.resync(&mut gpu.renderer);
                }
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialise graphics: {e:#}");
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
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        if !self.state.cursor_grabbed {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size.width, new_size.height);
            }
            WindowEvent::Focused(false) => {
                self.state.session.input_mut().clear();
                self.state.ctrl_held = false;
                self.state.cursor_grabbed = gpu.set_cursor_grab(false);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if key == KeyCode::Escape && pressed {
                    self.state.cursor_grabbed = gpu.set_cursor_grab(false);
                } else {
                    self.state.handle_key(key, pressed);
                }
            }
            WindowEvent::MouseInput {
                button,
                state: ElementState::Pressed,
                ..
            } => {
                if !self.state.cursor_grabbed {
                    self.state.cursor_grabbed = gpu.set_cursor_grab(true);
                    return;
                }
                let action = match button {
                    MouseButton::Left => Action::BreakBlock,
                    MouseButton::Right => Action::PlaceBlock,
                    _ => return,
                };
                if self.state.session.apply(action) {
                    tracing::info!(?action, "world edited");
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.cursor_grabbed {
                self.state.session.look(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("blockyard-desktop starting");

    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.world.seed = seed;
    }
    let session = Session::new(config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(session);
    event_loop.run_app(&mut app)?;

    Ok(())
}

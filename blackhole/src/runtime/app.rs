use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use super::driver::BlackHole;
use super::mount::StaticDocument;
use super::scheduler::{
    CancellationToken, FrameScheduler, HostEvent, IntervalScheduler,
};
use super::viewport::ContainerSize;
use crate::config::SceneConfig;
use crate::framework::logging;
use crate::render::gpu::{
    GpuCompositor, GpuContext, PresentTarget, choose_alpha_mode,
    choose_surface_format,
};

#[derive(Clone, Debug)]
pub struct ViewerOptions {
    pub config: SceneConfig,
    pub reduced_motion: bool,
    /// Initial window size in logical pixels.
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug)]
pub struct HeadlessOptions {
    pub config: SceneConfig,
    pub reduced_motion: bool,
    /// Container size in CSS pixels.
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
    /// Ticks to run before stopping.
    pub ticks: u64,
    pub force_fallback_adapter: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct HeadlessReport {
    pub frames_rendered: u64,
    pub average_fps: f32,
    pub buffer_size: [u32; 2],
}

struct ViewerRuntime {
    options: ViewerOptions,
    window: Option<Arc<Window>>,
    window_id: Option<WindowId>,
    black_hole: Option<BlackHole<GpuCompositor>>,
    last_average_fps_emit: Instant,
}

impl ViewerRuntime {
    fn new(options: ViewerOptions) -> Self {
        Self {
            options,
            window: None,
            window_id: None,
            black_hole: None,
            last_average_fps_emit: Instant::now(),
        }
    }

    fn init_runtime(
        &mut self,
        event_loop: &ActiveEventLoop,
    ) -> Result<(), String> {
        let attrs = WindowAttributes::default()
            .with_title("blackhole")
            .with_transparent(true)
            .with_inner_size(LogicalSize::new(
                self.options.width,
                self.options.height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|err| err.to_string())?,
        );

        self.window_id = Some(window.id());
        self.window = Some(window.clone());

        if let Err(err) = self.mount(&window) {
            error!("failed to set up rendering: {}", err);
        }

        Ok(())
    }

    fn mount(&mut self, window: &Arc<Window>) -> Result<(), String> {
        let instance =
            wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance
            .create_surface(window.clone())
            .map_err(|err| err.to_string())?;

        let (adapter, gpu) = pollster::block_on(GpuContext::request(
            &instance,
            Some(&surface),
            false,
        ))?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats)
            .ok_or_else(|| "surface has no supported formats".to_string())?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: choose_alpha_mode(&caps.alpha_modes),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(gpu.device.as_ref(), &surface_config);

        let document = StaticDocument::with_mount(
            logical_container(window, size),
            self.options.reduced_motion,
            window.scale_factor() as f32,
        );

        let config = &self.options.config;
        let target = PresentTarget::Surface {
            surface,
            config: surface_config,
        };

        // Mount logs its own failure; the window stays open and empty.
        let Ok(black_hole) =
            BlackHole::mount(&document, config, Instant::now(), |scene| {
                GpuCompositor::new(gpu, target, scene, config)
            })
        else {
            return Ok(());
        };

        if black_hole.is_none() {
            warn!("nothing mounted; the window stays empty");
        }

        self.black_hole = black_hole;

        Ok(())
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let Some(black_hole) = self.black_hole.as_mut() else {
            return;
        };

        // Minimized windows report a zero size; treat them as off screen.
        if new_size.width == 0 || new_size.height == 0 {
            black_hole.on_visible_fraction(0.0);
            return;
        }

        black_hole
            .compositor_mut()
            .resize_surface(new_size.width, new_size.height);
        black_hole.on_visible_fraction(window_visible_fraction(window));
        black_hole.handle_event(HostEvent::Resized(logical_container(
            window, new_size,
        )));
    }

    fn moved(&mut self) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let Some(black_hole) = self.black_hole.as_mut() else {
            return;
        };

        black_hole.on_visible_fraction(window_visible_fraction(window));
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let Some(black_hole) = self.black_hole.as_mut() else {
            return;
        };

        if let Err(err) = black_hole.tick(Instant::now()) {
            error!("render error: {}", err);
            self.shutdown(event_loop);
        }
    }

    fn emit_average_fps_if_due(&mut self, now: Instant) {
        if now.duration_since(self.last_average_fps_emit)
            < Duration::from_secs(1)
        {
            return;
        }

        self.last_average_fps_emit = now;

        if let Some(black_hole) = self.black_hole.as_ref() {
            debug!("average fps: {:.1}", black_hole.average_fps());
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(black_hole) = self.black_hole.as_mut() {
            black_hole.dispose();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for ViewerRuntime {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_runtime(event_loop) {
            error!("failed to initialize blackhole viewer: {}", err);
            event_loop.exit();
            return;
        }

        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window_id != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(new_size) => self.resize(new_size),
            WindowEvent::Moved(_) => self.moved(),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(black_hole) = self.black_hole.as_mut() {
                    black_hole.on_scale_factor_change(scale_factor as f32);
                }
            }
            WindowEvent::Occluded(occluded) => {
                if let Some(black_hole) = self.black_hole.as_mut() {
                    black_hole.handle_event(HostEvent::VisibilityChanged {
                        hidden: occluded,
                    });
                }
            }
            WindowEvent::RedrawRequested => {
                self.render(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        self.emit_average_fps_if_due(now);

        let Some(black_hole) = self.black_hole.as_ref() else {
            return;
        };

        // Gated: sleep until a window event reopens the gate.
        if !black_hole.viewport().should_render() {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }

        let deadline = black_hole.next_deadline(now);

        if deadline <= now {
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(
            deadline.max(now + Duration::from_millis(1)),
        ));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(black_hole) = self.black_hole.as_mut() {
            black_hole.dispose();
        }
    }
}

fn logical_container(
    window: &Window,
    size: PhysicalSize<u32>,
) -> ContainerSize {
    let logical: LogicalSize<f32> = size.to_logical(window.scale_factor());
    ContainerSize::new(logical.width, logical.height)
}

/// Physical-pixel rectangle: top-left corner and size.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ScreenRect {
    position: [i64; 2],
    size: [u64; 2],
}

impl ScreenRect {
    fn area(&self) -> u64 {
        self.size[0] * self.size[1]
    }

    fn overlap(&self, other: &ScreenRect) -> u64 {
        let extent = |axis: usize| {
            let start = self.position[axis].max(other.position[axis]);
            let end = (self.position[axis] + self.size[axis] as i64)
                .min(other.position[axis] + other.size[axis] as i64);
            (end - start).max(0) as u64
        };

        extent(0) * extent(1)
    }
}

/// Share of `window` that lands on any monitor. Monitors do not overlap, so
/// the per-monitor overlaps add up.
fn visible_fraction(window: ScreenRect, monitors: &[ScreenRect]) -> f32 {
    if window.area() == 0 {
        return 0.0;
    }

    let covered: u64 = monitors
        .iter()
        .map(|monitor| window.overlap(monitor))
        .sum();

    (covered as f64 / window.area() as f64).min(1.0) as f32
}

/// Platforms that hide window positions (Wayland) count as fully visible.
fn window_visible_fraction(window: &Window) -> f32 {
    let Ok(position) = window.outer_position() else {
        return 1.0;
    };
    let size = window.outer_size();

    let monitors = window
        .available_monitors()
        .map(|monitor| {
            let (origin, extent) = (monitor.position(), monitor.size());
            ScreenRect {
                position: [origin.x as i64, origin.y as i64],
                size: [extent.width as u64, extent.height as u64],
            }
        })
        .collect::<Vec<_>>();

    if monitors.is_empty() {
        return 1.0;
    }

    visible_fraction(
        ScreenRect {
            position: [position.x as i64, position.y as i64],
            size: [size.width as u64, size.height as u64],
        },
        &monitors,
    )
}

/// Opens a window and renders until it is closed.
pub fn run_viewer(options: ViewerOptions) -> Result<(), String> {
    logging::init_logger();
    options.config.validate()?;

    let event_loop = EventLoop::new().map_err(|err| err.to_string())?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut runner = ViewerRuntime::new(options);

    event_loop
        .run_app(&mut runner)
        .map_err(|err| err.to_string())
}

/// Stops the loop once a fixed number of ticks has been handed out.
struct TickBudget<'a> {
    inner: IntervalScheduler,
    remaining: u64,
    token: &'a CancellationToken,
}

impl FrameScheduler for TickBudget<'_> {
    fn await_next_tick(&mut self) -> Instant {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.token.cancel();
        }
        self.inner.await_next_tick()
    }

    fn take_events(&mut self) -> Vec<HostEvent> {
        self.inner.take_events()
    }
}

/// Renders into an offscreen target for a fixed number of ticks.
pub fn run_headless(
    options: HeadlessOptions,
) -> Result<HeadlessReport, String> {
    logging::init_logger();
    options.config.validate()?;

    let gpu = GpuContext::headless(options.force_fallback_adapter)?;

    let document = StaticDocument::with_mount(
        ContainerSize::new(options.width, options.height),
        options.reduced_motion,
        options.device_pixel_ratio,
    );

    let config = &options.config;
    let Some(mut black_hole) =
        BlackHole::mount(&document, config, Instant::now(), |scene| {
            GpuCompositor::offscreen(gpu, scene, config)
        })?
    else {
        return Err("nothing mounted".to_string());
    };

    let token = CancellationToken::new();
    if options.ticks == 0 {
        token.cancel();
    }

    let mut scheduler = TickBudget {
        inner: IntervalScheduler::new(black_hole.profile().frame_cap_hz),
        remaining: options.ticks,
        token: &token,
    };

    black_hole.run(&mut scheduler, &token)?;

    let report = HeadlessReport {
        frames_rendered: black_hole.frame_count(),
        average_fps: black_hole.average_fps(),
        buffer_size: black_hole
            .viewport()
            .layout()
            .map(|layout| layout.buffer_size())
            .unwrap_or([1, 1]),
    };

    info!(
        "rendered {} frames at {:?} (avg {:.1} fps)",
        report.frames_rendered, report.buffer_size, report.average_fps
    );

    black_hole.dispose();

    Ok(report)
}

use std::time::Instant;

use log::{debug, error, info, warn};

use super::frame_clock::{Admission, FrameLimiter, SceneClock};
use super::mount::{Document, MOUNT_ID};
use super::scheduler::{CancellationToken, FrameScheduler, HostEvent};
use super::viewport::{BufferLayout, ContainerSize, ViewportController};
use crate::config::SceneConfig;
use crate::profile::RenderProfile;
use crate::render::Compositor;
use crate::scene::Scene;
use crate::shading::lensing::LensingState;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FrameOutcome {
    Rendered,
    /// Hidden, off screen, or disposed.
    Gated,
    /// Arrived before the frame cap allows another frame.
    Throttled,
}

/// One mounted black hole: its scene, timing, viewport state and the
/// compositor that draws it. Instances share nothing.
pub struct BlackHole<C: Compositor> {
    profile: RenderProfile,
    scene: Scene,
    lensing: LensingState,
    viewport: ViewportController,
    limiter: FrameLimiter,
    clock: SceneClock,
    compositor: C,
    disposed: bool,
}

impl<C: Compositor> BlackHole<C> {
    /// Mounts into the `#blackholeWrap` container of `document`.
    ///
    /// A missing container is not an error: it is logged and `Ok(None)` is
    /// returned. Failing to build the compositor (for example a shader that
    /// does not validate) is.
    pub fn mount<D, F>(
        document: &D,
        config: &SceneConfig,
        now: Instant,
        build_compositor: F,
    ) -> Result<Option<Self>, String>
    where
        D: Document + ?Sized,
        F: FnOnce(&Scene) -> Result<C, String>,
    {
        let Some(container) = document.container(MOUNT_ID) else {
            warn!("#{} not found; nothing to mount", MOUNT_ID);
            return Ok(None);
        };

        let profile = RenderProfile::detect(
            document.viewport_width(),
            document.prefers_reduced_motion(),
        );

        let scene = Scene::assemble(&profile, config);

        let compositor = build_compositor(&scene).map_err(|err| {
            let err = format!("failed to build compositor: {}", err);
            error!("{}", err);
            err
        })?;

        info!(
            "mounted #{}: {:?} tier, {} Hz cap",
            container.id, profile.tier, profile.frame_cap_hz
        );

        let mut black_hole = Self {
            profile,
            scene,
            lensing: LensingState::from_config(&config.lensing),
            viewport: ViewportController::new(
                profile,
                document.device_pixel_ratio(),
            ),
            limiter: FrameLimiter::new(profile.frame_cap_hz),
            clock: SceneClock::start(now),
            compositor,
            disposed: false,
        };

        black_hole.on_resize(container.size);

        Ok(Some(black_hole))
    }

    pub fn on_resize(&mut self, container: ContainerSize) {
        let layout = self.viewport.on_resize(container);
        self.apply_layout(&layout);
    }

    pub fn on_visibility_change(&mut self, hidden: bool) {
        self.viewport.on_visibility_change(hidden);
    }

    pub fn on_intersection_change(&mut self, intersecting: bool) {
        self.viewport.on_intersection_change(intersecting);
    }

    pub fn on_visible_fraction(&mut self, fraction: f32) {
        self.viewport.on_visible_fraction(fraction);
    }

    /// Applies a new device pixel ratio by re-running the last layout.
    pub fn on_scale_factor_change(&mut self, device_pixel_ratio: f32) {
        self.viewport.set_device_pixel_ratio(device_pixel_ratio);

        if let Some(layout) = self.viewport.layout() {
            let container =
                ContainerSize::new(layout.container[0], layout.container[1]);
            self.on_resize(container);
        }
    }

    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Resized(size) => self.on_resize(size),
            HostEvent::VisibilityChanged { hidden } => {
                self.on_visibility_change(hidden)
            }
            HostEvent::IntersectionChanged { intersecting } => {
                self.on_intersection_change(intersecting)
            }
        }
    }

    fn apply_layout(&mut self, layout: &BufferLayout) {
        debug!(
            "layout: display {:?}, buffer {:?} @ {}x",
            layout.display, layout.buffer, layout.pixel_ratio
        );

        self.scene.camera.set_aspect(layout.camera_aspect());
        self.lensing.aspect_ratio = layout.lensing_aspect();

        if !self.disposed {
            self.compositor.set_size(layout);
        }
    }

    /// Runs one display refresh. The gate is checked before the limiter,
    /// so gated ticks never consume a frame slot.
    pub fn tick(&mut self, now: Instant) -> Result<FrameOutcome, String> {
        if self.disposed || !self.viewport.should_render() {
            return Ok(FrameOutcome::Gated);
        }

        if self.limiter.admit(now) == Admission::Throttled {
            return Ok(FrameOutcome::Throttled);
        }

        let elapsed = self.clock.elapsed_seconds(now);

        self.scene.set_time(elapsed);
        self.scene.set_camera_uniforms();
        self.lensing
            .track(&self.scene.camera, self.scene.core_position());

        self.compositor.render(&self.scene, &self.lensing)?;

        Ok(FrameOutcome::Rendered)
    }

    /// Drives ticks from `scheduler` until `token` is cancelled. Host
    /// events are applied before the tick they arrive with.
    pub fn run<S>(
        &mut self,
        scheduler: &mut S,
        token: &CancellationToken,
    ) -> Result<(), String>
    where
        S: FrameScheduler + ?Sized,
    {
        while !token.is_cancelled() {
            let now = scheduler.await_next_tick();

            for event in scheduler.take_events() {
                self.handle_event(event);
            }

            self.tick(now)?;
        }

        Ok(())
    }

    /// Releases the compositor's resources. Further ticks are gated.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.disposed = true;
        self.compositor.dispose();
        info!("disposed #{}", MOUNT_ID);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn profile(&self) -> &RenderProfile {
        &self.profile
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn lensing(&self) -> &LensingState {
        &self.lensing
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut C {
        &mut self.compositor
    }

    pub fn frame_count(&self) -> u64 {
        self.limiter.frame_count()
    }

    pub fn average_fps(&self) -> f32 {
        self.limiter.average_fps()
    }

    pub fn next_deadline(&self, now: Instant) -> Instant {
        self.limiter.next_deadline(now)
    }
}

impl<C: Compositor> Drop for BlackHole<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

use crate::profile::RenderProfile;

/// Fraction of the container that must be on screen for hosts to report it
/// as intersecting.
pub const INTERSECTION_THRESHOLD: f32 = 0.05;

/// Container size in CSS (logical) pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerSize {
    pub width: f32,
    pub height: f32,
}

impl ContainerSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Sizes derived from one container measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BufferLayout {
    /// Container size, each side at least 1.
    pub container: [f32; 2],
    /// Displayed canvas size: `floor(container * overscan)`.
    pub display: [u32; 2],
    pub pixel_ratio: f32,
    /// Drawing buffer: `floor(display * pixel_ratio)`, at least 1.
    pub buffer: [u32; 2],
}

impl BufferLayout {
    pub fn compute(
        container: ContainerSize,
        profile: &RenderProfile,
        device_pixel_ratio: f32,
    ) -> Self {
        let clamp = |value: f32| {
            if value.is_finite() { value.max(1.0) } else { 1.0 }
        };
        let container = [clamp(container.width), clamp(container.height)];

        let display = container
            .map(|side| ((side * profile.overscan).floor() as u32).max(1));

        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0
        {
            device_pixel_ratio
        } else {
            1.0
        };
        let pixel_ratio = dpr.min(profile.device_pixel_ratio_cap);

        let buffer = display
            .map(|side| ((side as f32 * pixel_ratio).floor() as u32).max(1));

        Self {
            container,
            display,
            pixel_ratio,
            buffer,
        }
    }

    pub fn buffer_size(&self) -> [u32; 2] {
        self.buffer
    }

    pub fn camera_aspect(&self) -> f32 {
        self.container[0] / self.container[1]
    }

    /// Taken from the container, not the floored buffer, so it is exactly
    /// `w / h`.
    pub fn lensing_aspect(&self) -> f32 {
        self.container[0] / self.container[1]
    }
}

pub fn is_intersecting(visible_fraction: f32) -> bool {
    visible_fraction >= INTERSECTION_THRESHOLD
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VisibilityState {
    /// Page/window is in the foreground.
    pub foreground: bool,
    /// Container overlaps the viewport.
    pub intersecting: bool,
}

impl Default for VisibilityState {
    fn default() -> Self {
        Self {
            foreground: true,
            intersecting: true,
        }
    }
}

impl VisibilityState {
    pub fn should_render(&self) -> bool {
        self.foreground && self.intersecting
    }
}

/// Turns host signals into layouts and the render gate. Never touches GPU
/// resources itself.
#[derive(Debug)]
pub struct ViewportController {
    profile: RenderProfile,
    device_pixel_ratio: f32,
    visibility: VisibilityState,
    layout: Option<BufferLayout>,
}

impl ViewportController {
    pub fn new(profile: RenderProfile, device_pixel_ratio: f32) -> Self {
        Self {
            profile,
            device_pixel_ratio,
            visibility: VisibilityState::default(),
            layout: None,
        }
    }

    pub fn on_resize(&mut self, container: ContainerSize) -> BufferLayout {
        let layout = BufferLayout::compute(
            container,
            &self.profile,
            self.device_pixel_ratio,
        );
        self.layout = Some(layout);
        layout
    }

    pub fn set_device_pixel_ratio(&mut self, device_pixel_ratio: f32) {
        self.device_pixel_ratio = device_pixel_ratio;
    }

    pub fn on_visibility_change(&mut self, hidden: bool) {
        self.visibility.foreground = !hidden;
    }

    pub fn on_intersection_change(&mut self, intersecting: bool) {
        self.visibility.intersecting = intersecting;
    }

    /// Intersection from the fraction of the container on screen.
    pub fn on_visible_fraction(&mut self, fraction: f32) {
        self.on_intersection_change(is_intersecting(fraction));
    }

    pub fn should_render(&self) -> bool {
        self.visibility.should_render()
    }

    pub fn layout(&self) -> Option<&BufferLayout> {
        self.layout.as_ref()
    }

    pub fn profile(&self) -> &RenderProfile {
        &self.profile
    }
}

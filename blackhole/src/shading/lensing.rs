//! Screen-space lensing. `lensing.wgsl` applies this per fragment; the
//! functions here are the CPU reference used by tests.
//!
//! Screen positions are in [0, 1]² with the origin at the bottom left.

use glam::{Vec2, Vec3};

use crate::config::LensingConfig;
use crate::framework::math::smoothstep;
use crate::scene::camera::Camera;

/// Keeps the pull finite at the centre.
const SOFTENING: f32 = 0.003;
const MAX_DISPLACEMENT: f32 = 0.7;
const LUMA: Vec3 = Vec3::new(0.299, 0.587, 0.114);

#[derive(Clone, Debug, PartialEq)]
pub struct LensingState {
    pub center: Vec2,
    pub strength: f32,
    pub radius: f32,
    pub aspect_ratio: f32,
    pub chromatic_aberration: f32,
}

impl LensingState {
    pub fn from_config(config: &LensingConfig) -> Self {
        Self {
            center: Vec2::splat(0.5),
            strength: config.strength,
            radius: config.radius,
            aspect_ratio: 1.0,
            chromatic_aberration: config.chromatic_aberration,
        }
    }

    /// Re-centres the effect on `world` as seen through `camera`.
    pub fn track(&mut self, camera: &Camera, world: Vec3) {
        let ndc = camera.project(world);
        self.center = Vec2::new((ndc.x + 1.0) / 2.0, (ndc.y + 1.0) / 2.0);
    }

    /// Vector from the centre to `screen`, with x stretched to square
    /// pixels.
    fn to_center(&self, screen: Vec2) -> Vec2 {
        let mut delta = screen - self.center;
        delta.x *= self.aspect_ratio;
        delta
    }

    /// Displacement magnitude at `screen`: strongest at the centre, gone by
    /// `radius`.
    pub fn amount(&self, screen: Vec2) -> f32 {
        let dist = self.to_center(screen).length();
        let pull = (self.strength / (dist * dist + SOFTENING))
            .clamp(0.0, MAX_DISPLACEMENT);
        pull * smoothstep(self.radius, self.radius * 0.3, dist)
    }

    /// Offset subtracted from `screen` to find the green-channel source.
    pub fn offset(&self, screen: Vec2) -> Vec2 {
        let delta = self.to_center(screen);
        let mut offset = delta.normalize_or_zero() * self.amount(screen);
        offset.x /= self.aspect_ratio;
        offset
    }

    /// Source coordinates for the red, green and blue channels.
    pub fn sample_coords(&self, screen: Vec2) -> [Vec2; 3] {
        let offset = self.offset(screen);
        [
            screen - offset * (1.0 + self.chromatic_aberration),
            screen - offset,
            screen - offset * (1.0 - self.chromatic_aberration),
        ]
    }

    /// Resolves one output pixel given a sampler over the source frame.
    pub fn resolve(
        &self,
        screen: Vec2,
        sample: impl Fn(Vec2) -> Vec3,
    ) -> (Vec3, f32) {
        let [r, g, b] = self.sample_coords(screen);
        let rgb = Vec3::new(sample(r).x, sample(g).y, sample(b).z);
        (rgb, coverage(rgb))
    }
}

/// Output alpha from luminance: near-black becomes fully transparent.
pub fn coverage(rgb: Vec3) -> f32 {
    smoothstep(0.04, 0.14, rgb.dot(LUMA))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    fn state() -> LensingState {
        LensingState::from_config(&LensingConfig::default())
    }

    #[test]
    fn tracks_origin_to_screen_center() {
        let mut camera = Camera::framing(&CameraConfig::default());
        camera.set_aspect(16.0 / 9.0);
        let mut lensing = state();
        lensing.center = Vec2::ZERO;

        lensing.track(&camera, Vec3::ZERO);

        assert!((lensing.center - Vec2::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn no_displacement_beyond_radius() {
        let lensing = state();
        assert_eq!(lensing.amount(Vec2::new(0.5 + 0.31, 0.5)), 0.0);
        assert_eq!(lensing.offset(Vec2::new(0.5, 0.95)), Vec2::ZERO);
    }

    #[test]
    fn no_displacement_at_exact_center() {
        let lensing = state();
        assert_eq!(lensing.offset(Vec2::splat(0.5)), Vec2::ZERO);
    }

    #[test]
    fn displacement_is_capped() {
        let lensing = state();
        let amount = lensing.amount(Vec2::new(0.5001, 0.5));
        assert!(amount <= MAX_DISPLACEMENT);
        assert!(amount > 0.6);
    }

    #[test]
    fn aspect_correction_keeps_distortion_radial() {
        let mut lensing = state();
        lensing.aspect_ratio = 2.0;

        // Same physical distance: 0.05 horizontally (x2 aspect) vs 0.1
        // vertically.
        let horizontal = lensing.amount(Vec2::new(0.55, 0.5));
        let vertical = lensing.amount(Vec2::new(0.5, 0.6));
        assert!((horizontal - vertical).abs() < 1e-5);
    }

    #[test]
    fn offset_points_toward_center() {
        let lensing = state();
        let screen = Vec2::new(0.6, 0.5);
        let [_, g, _] = lensing.sample_coords(screen);
        assert!(g.x < screen.x);
        assert_eq!(g.y, screen.y);
    }

    #[test]
    fn chromatic_channels_straddle_green() {
        let lensing = state();
        // Far enough out that the displacement does not overshoot the centre.
        let [r, g, b] = lensing.sample_coords(Vec2::new(0.7, 0.65));
        let center = lensing.center;
        assert!((r - center).length() < (g - center).length());
        assert!((b - center).length() > (g - center).length());
    }

    #[test]
    fn coverage_is_transparent_on_black_and_opaque_on_white() {
        assert_eq!(coverage(Vec3::ZERO), 0.0);
        assert_eq!(coverage(Vec3::ONE), 1.0);
        assert_eq!(coverage(Vec3::splat(0.02)), 0.0);
    }

    #[test]
    fn resolve_picks_one_channel_per_tap() {
        let lensing = state();
        let (rgb, alpha) =
            lensing.resolve(Vec2::new(0.1, 0.1), |_| Vec3::new(1.0, 0.5, 0.25));
        assert_eq!(rgb, Vec3::new(1.0, 0.5, 0.25));
        assert!(alpha > 0.99);
    }
}

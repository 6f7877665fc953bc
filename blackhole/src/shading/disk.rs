//! Accretion disk colour model. `disk.wgsl` evaluates the same procedure
//! per fragment; this module is its CPU reference.

use glam::{Vec2, Vec3};

use super::noise;
use crate::config::SceneConfig;
use crate::framework::math::{mix3, smoothstep};

/// Gradient stops from the outer edge inward, keyed on normalized radius.
const GRADIENT_BANDS: [(f32, f32); 4] =
    [(0.0, 0.25), (0.2, 0.55), (0.5, 0.75), (0.7, 0.95)];

#[derive(Clone, Debug, PartialEq)]
pub struct DiskMaterial {
    pub time: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub color_hot: Vec3,
    pub color_mid1: Vec3,
    pub color_mid2: Vec3,
    pub color_mid3: Vec3,
    pub color_outer: Vec3,
    pub noise_scale: f32,
    pub flow_speed: f32,
    pub density: f32,
}

/// Interpolated inputs for one disk fragment, in the ring's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiskFragment {
    pub uv: Vec2,
    pub radius: f32,
    pub angle: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiskSample {
    pub color: Vec3,
    pub alpha: f32,
}

impl DiskFragment {
    /// Builds the fragment inputs for a point on the ring plane, with the
    /// same planar UV the ring geometry carries.
    pub fn at(local: Vec2, outer_radius: f32) -> Self {
        Self {
            uv: (local / outer_radius + Vec2::ONE) * 0.5,
            radius: local.length(),
            angle: local.y.atan2(local.x),
        }
    }
}

impl DiskMaterial {
    pub fn from_config(config: &SceneConfig) -> Self {
        let disk = &config.disk;

        Self {
            time: 0.0,
            inner_radius: config.disk_inner_radius(),
            outer_radius: disk.outer_radius,
            color_hot: disk.color_hot.0,
            color_mid1: disk.color_mid1.0,
            color_mid2: disk.color_mid2.0,
            color_mid3: disk.color_mid3.0,
            color_outer: disk.color_outer.0,
            noise_scale: disk.noise_scale,
            flow_speed: disk.flow_speed,
            density: disk.density,
        }
    }

    /// Eased radial position: 0 at the inner edge, 1 at the outer edge.
    pub fn normalized_radius(&self, radius: f32) -> f32 {
        smoothstep(self.inner_radius, self.outer_radius, radius)
    }

    /// Noise lookup coordinate. The flow term drifts faster near the centre
    /// and the spiral term winds harder there, reading as a logarithmic
    /// spiral.
    pub fn noise_coord(&self, fragment: &DiskFragment, nr: f32) -> Vec2 {
        let spiral = spiral(fragment.angle, nr);
        let flow = self.time
            * self.flow_speed
            * (2.0 / (fragment.radius * 0.3 + 1.0));

        Vec2::new(
            fragment.uv.x + flow + spiral.sin() * 0.1,
            fragment.uv.y * 0.8 + spiral.cos() * 0.1,
        )
    }

    pub fn noise(&self, fragment: &DiskFragment, nr: f32) -> f32 {
        noise::layered(
            self.noise_coord(fragment, nr),
            self.noise_scale,
            self.time,
        )
    }

    /// Layered colour ramp from the outer stop to the hot stop.
    pub fn gradient(&self, nr: f32) -> Vec3 {
        let stops = [
            self.color_mid3,
            self.color_mid2,
            self.color_mid1,
            self.color_hot,
        ];

        GRADIENT_BANDS.iter().zip(stops).fold(
            self.color_outer,
            |color, (&(lo, hi), stop)| {
                mix3(color, stop, smoothstep(lo, hi, nr))
            },
        )
    }

    pub fn brightness(&self, nr: f32, noise: f32, angle: f32) -> f32 {
        let base = (1.0 - nr) * 3.5 + 0.5;
        let pulse = (self.time * 1.8 + nr * 12.0 + angle * 2.0).sin() * 0.15
            + 0.85;
        base * (0.3 + noise * 2.2) * pulse
    }

    pub fn alpha(&self, nr: f32, noise: f32) -> f32 {
        disk_alpha(self.density, nr, noise)
    }

    pub fn shade(&self, fragment: &DiskFragment) -> DiskSample {
        let nr = self.normalized_radius(fragment.radius);
        let noise = self.noise(fragment, nr);

        let color = self.gradient(nr) * (0.5 + noise);
        let brightness = self.brightness(nr, noise, fragment.angle);

        DiskSample {
            color: color * brightness,
            alpha: self.alpha(nr, noise),
        }
    }
}

pub fn spiral(angle: f32, nr: f32) -> f32 {
    angle * 3.0 - 2.0 / (nr + 0.1)
}

/// Noise-driven opacity tapered to zero at both radial edges. The taper is
/// multiplicative, so the edges are transparent whatever the noise does.
pub fn disk_alpha(density: f32, nr: f32, noise: f32) -> f32 {
    let alpha = density
        * (0.2 + noise * 0.9)
        * smoothstep(0.0, 0.15, nr)
        * (1.0 - smoothstep(0.85, 1.0, nr));
    alpha.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material() -> DiskMaterial {
        DiskMaterial::from_config(&SceneConfig::default())
    }

    #[test]
    fn alpha_vanishes_at_both_edges_for_any_noise() {
        for step in 0..=20 {
            let noise = step as f32 / 20.0;
            assert_eq!(disk_alpha(1.3, 0.0, noise), 0.0);
            assert_eq!(disk_alpha(1.3, 1.0, noise), 0.0);
            assert!(disk_alpha(1.3, 1e-4, noise) < 1e-4);
            assert!(disk_alpha(1.3, 1.0 - 1e-4, noise) < 1e-3);
        }
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(disk_alpha(10.0, 0.5, 1.0), 1.0);
        assert!(disk_alpha(1.3, 0.5, 0.5) > 0.0);
    }

    #[test]
    fn normalized_radius_spans_the_ring() {
        let material = material();
        assert_eq!(material.normalized_radius(1.5), 0.0);
        assert_eq!(material.normalized_radius(8.0), 1.0);
        assert_eq!(material.normalized_radius(0.5), 0.0);
        let mid = material.normalized_radius(4.75);
        assert!((mid - 0.5).abs() < 1e-5);
    }

    #[test]
    fn gradient_hits_outer_and_hot_stops() {
        let material = material();
        let outer = material.gradient(0.0) - material.color_outer;
        let hot = material.gradient(1.0) - material.color_hot;
        assert!(outer.length() < 1e-6);
        assert!(hot.length() < 1e-6);
    }

    #[test]
    fn spiral_winds_harder_near_center() {
        let near = spiral(0.0, 0.0);
        let far = spiral(0.0, 1.0);
        assert!(near < far);
        assert!((near + 20.0).abs() < 1e-4);
    }

    #[test]
    fn shaded_edges_are_transparent() {
        let mut material = material();

        for time in [0.0, 3.7, 120.0] {
            material.time = time;
            for angle in [0.0, 1.0, 2.5, -2.0] {
                let dir = Vec2::new(f32::cos(angle), f32::sin(angle));
                let inner = DiskFragment::at(dir * 1.5, 8.0);
                let outer = DiskFragment::at(dir * 8.0, 8.0);
                assert!(material.shade(&inner).alpha < 1e-5);
                assert!(material.shade(&outer).alpha < 1e-5);
            }
        }
    }

    #[test]
    fn mid_disk_is_visible_and_finite() {
        let material = material();
        let fragment = DiskFragment::at(Vec2::new(3.0, 2.0), 8.0);
        let sample = material.shade(&fragment);
        assert!(sample.alpha > 0.0);
        assert!(sample.color.is_finite());
        assert!(sample.color.min_element() >= 0.0);
    }

    #[test]
    fn fragment_uv_is_planar() {
        let fragment = DiskFragment::at(Vec2::new(8.0, 0.0), 8.0);
        assert_eq!(fragment.uv, Vec2::new(1.0, 0.5));
        assert_eq!(fragment.radius, 8.0);
        assert_eq!(fragment.angle, 0.0);
    }
}

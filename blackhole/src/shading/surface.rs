//! View-dependent shading for the two spheres: the dark core and the glow
//! shell around it. Mirrors `core.wgsl` and `glow.wgsl`.

use glam::Vec3;

use crate::config::SceneConfig;
use crate::framework::math::{mix3, smoothstep};

#[derive(Clone, Debug, PartialEq)]
pub struct CoreMaterial {
    pub camera_position: Vec3,
    pub inner_color: Vec3,
    pub edge_color: Vec3,
    pub rim_color: Vec3,
    pub opacity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GlowMaterial {
    pub time: f32,
    pub camera_position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub pulse_speed: f32,
}

impl CoreMaterial {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            camera_position: Vec3::ZERO,
            inner_color: config.core.inner_color.0,
            edge_color: config.core.edge_color.0,
            rim_color: config.core.rim_color.0,
            opacity: config.core.opacity,
        }
    }

    /// Returns linear colour and alpha for a surface point with world-space
    /// `normal` at `world_position`.
    pub fn shade(&self, normal: Vec3, world_position: Vec3) -> (Vec3, f32) {
        let view = (self.camera_position - world_position).normalize_or_zero();
        let rim = rim(normal.normalize_or_zero(), view);

        let base =
            mix3(self.inner_color, self.edge_color, smoothstep(0.15, 0.9, rim));
        (base + self.rim_color * rim * 0.35, self.opacity)
    }
}

impl GlowMaterial {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            time: 0.0,
            camera_position: Vec3::ZERO,
            color: config.glow.color.0,
            intensity: config.glow.intensity,
            pulse_speed: config.glow.pulse_speed,
        }
    }

    pub fn pulse(&self) -> f32 {
        (self.time * self.pulse_speed).sin() * 0.15 + 0.85
    }

    /// The shell is drawn from the inside (back faces), so the facing term
    /// uses the absolute cosine.
    pub fn shade(&self, normal: Vec3, local_position: Vec3) -> (Vec3, f32) {
        let view = (self.camera_position - local_position).normalize_or_zero();
        let fresnel = (1.0 - normal.dot(view).abs()).powf(2.5);

        (
            self.color * fresnel * self.pulse(),
            fresnel * self.intensity,
        )
    }
}

/// Cubed Fresnel: 0 facing the viewer, 1 at the silhouette.
pub fn rim(normal: Vec3, view: Vec3) -> f32 {
    (1.0 - normal.dot(view).max(0.0)).powi(3)
}

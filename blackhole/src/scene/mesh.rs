use glam::Mat4;

use super::geometry::Geometry;
use crate::shading::disk::DiskMaterial;
use crate::shading::surface::{CoreMaterial, GlowMaterial};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MeshRole {
    GlowShell,
    Core,
    Disk,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BlendMode {
    /// Source-over with straight alpha.
    Normal,
    /// `src * src_alpha + dst`.
    Additive,
}

/// Which faces are rasterized.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Front,
    Back,
    Double,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Material {
    Core(CoreMaterial),
    Glow(GlowMaterial),
    Disk(DiskMaterial),
}

#[derive(Clone, Debug)]
pub struct ShadedMesh {
    pub role: MeshRole,
    pub geometry: Geometry,
    pub material: Material,
    pub blend: BlendMode,
    pub side: Side,
    pub depth_write: bool,
    pub render_order: i32,
    pub model: Mat4,
}

impl ShadedMesh {
    pub fn label(&self) -> &'static str {
        match self.role {
            MeshRole::GlowShell => "blackhole-glow-shell",
            MeshRole::Core => "blackhole-core",
            MeshRole::Disk => "blackhole-disk",
        }
    }
}

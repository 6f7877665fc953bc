pub mod camera;
pub mod geometry;
pub mod mesh;

use glam::{Mat4, Vec3};

use self::camera::Camera;
use self::geometry::Geometry;
use self::mesh::{BlendMode, Material, MeshRole, ShadedMesh, Side};
use crate::config::SceneConfig;
use crate::profile::RenderProfile;
use crate::shading::disk::DiskMaterial;
use crate::shading::surface::{CoreMaterial, GlowMaterial};

pub struct Scene {
    pub camera: Camera,
    meshes: Vec<ShadedMesh>,
}

impl Scene {
    /// Builds the camera and the three meshes. Insertion order is glow
    /// shell, core, disk; draw order comes from `render_order` alone.
    pub fn assemble(profile: &RenderProfile, config: &SceneConfig) -> Self {
        let camera = Camera::framing(&config.camera);
        let core_radius = config.core.radius;

        let glow_shell = ShadedMesh {
            role: MeshRole::GlowShell,
            geometry: Geometry::sphere(
                core_radius * config.glow.scale,
                profile.sphere,
            ),
            material: Material::Glow(GlowMaterial::from_config(config)),
            blend: BlendMode::Additive,
            side: Side::Back,
            depth_write: false,
            render_order: 0,
            model: Mat4::IDENTITY,
        };

        let core = ShadedMesh {
            role: MeshRole::Core,
            geometry: Geometry::sphere(core_radius, profile.sphere),
            material: Material::Core(CoreMaterial::from_config(config)),
            blend: BlendMode::Normal,
            side: Side::Front,
            depth_write: false,
            render_order: 0,
            model: Mat4::IDENTITY,
        };

        let disk = ShadedMesh {
            role: MeshRole::Disk,
            geometry: Geometry::ring(
                config.disk_inner_radius(),
                config.disk.outer_radius,
                profile.disk,
            ),
            material: Material::Disk(DiskMaterial::from_config(config)),
            blend: BlendMode::Additive,
            side: Side::Double,
            depth_write: false,
            render_order: 1,
            model: Mat4::from_rotation_x(config.disk.tilt),
        };

        let mut scene = Self {
            camera,
            meshes: vec![glow_shell, core, disk],
        };
        scene.set_camera_uniforms();
        scene
    }

    pub fn meshes(&self) -> &[ShadedMesh] {
        &self.meshes
    }

    pub fn mesh(&self, role: MeshRole) -> Option<&ShadedMesh> {
        self.meshes.iter().find(|mesh| mesh.role == role)
    }

    /// Meshes in draw order: ascending `render_order`, ties in insertion
    /// order.
    pub fn draw_order(&self) -> Vec<&ShadedMesh> {
        let mut ordered = self.meshes.iter().collect::<Vec<_>>();
        ordered.sort_by_key(|mesh| mesh.render_order);
        ordered
    }

    pub fn core_position(&self) -> Vec3 {
        self.mesh(MeshRole::Core)
            .map(|mesh| mesh.model.transform_point3(Vec3::ZERO))
            .unwrap_or(Vec3::ZERO)
    }

    pub fn set_time(&mut self, time: f32) {
        for mesh in &mut self.meshes {
            match &mut mesh.material {
                Material::Glow(glow) => glow.time = time,
                Material::Disk(disk) => disk.time = time,
                Material::Core(_) => {}
            }
        }
    }

    pub fn set_camera_uniforms(&mut self) {
        let position = self.camera.position();

        for mesh in &mut self.meshes {
            match &mut mesh.material {
                Material::Glow(glow) => glow.camera_position = position,
                Material::Core(core) => core.camera_position = position,
                Material::Disk(_) => {}
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn meshes_mut(&mut self) -> &mut Vec<ShadedMesh> {
        &mut self.meshes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::assemble(&RenderProfile::FULL, &SceneConfig::default())
    }

    fn roles(scene: &Scene) -> Vec<MeshRole> {
        scene.draw_order().iter().map(|mesh| mesh.role).collect()
    }

    #[test]
    fn core_draws_before_disk() {
        assert_eq!(
            roles(&scene()),
            vec![MeshRole::GlowShell, MeshRole::Core, MeshRole::Disk]
        );
    }

    #[test]
    fn draw_order_ignores_insertion_order() {
        let mut scene = scene();
        scene.meshes_mut().reverse();

        let order = roles(&scene);
        let core = order.iter().position(|r| *r == MeshRole::Core).unwrap();
        let disk = order.iter().position(|r| *r == MeshRole::Disk).unwrap();
        assert!(core < disk);
        assert_eq!(order.last(), Some(&MeshRole::Disk));
    }

    #[test]
    fn no_mesh_writes_depth() {
        assert!(scene().meshes().iter().all(|mesh| !mesh.depth_write));
    }

    #[test]
    fn tessellation_follows_profile() {
        let compact =
            Scene::assemble(&RenderProfile::COMPACT, &SceneConfig::default());
        let core = compact.mesh(MeshRole::Core).unwrap();
        assert_eq!(core.geometry.vertices.len(), 65 * 33);

        let full = scene();
        let disk = full.mesh(MeshRole::Disk).unwrap();
        assert_eq!(disk.geometry.vertices.len(), 193 * 97);
    }

    #[test]
    fn time_reaches_animated_materials() {
        let mut scene = scene();
        scene.set_time(4.2);

        for mesh in scene.meshes() {
            match &mesh.material {
                Material::Glow(glow) => assert_eq!(glow.time, 4.2),
                Material::Disk(disk) => assert_eq!(disk.time, 4.2),
                Material::Core(_) => {}
            }
        }
    }

    #[test]
    fn camera_uniforms_track_camera() {
        let scene = scene();
        let position = scene.camera.position();

        for mesh in scene.meshes() {
            match &mesh.material {
                Material::Glow(glow) => {
                    assert_eq!(glow.camera_position, position)
                }
                Material::Core(core) => {
                    assert_eq!(core.camera_position, position)
                }
                Material::Disk(_) => {}
            }
        }
    }

    #[test]
    fn disk_is_tilted_about_x() {
        let scene = scene();
        let disk = scene.mesh(MeshRole::Disk).unwrap();
        let normal = disk.model.transform_vector3(Vec3::Z);
        let expected = Vec3::new(0.0, -(60f32.to_radians().sin()), 0.5);
        assert!((normal - expected).length() < 1e-5);
        assert_eq!(scene.core_position(), Vec3::ZERO);
    }
}

use glam::{Mat4, Quat, Vec3};

use crate::config::CameraConfig;

/// Right-handed perspective camera. The orientation is fixed at
/// construction; only the aspect ratio changes afterwards.
#[derive(Clone, Debug)]
pub struct Camera {
    position: Vec3,
    orientation: Quat,
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

impl Camera {
    /// Orients the camera at `config.eye` toward the origin, then scales the
    /// position by `config.magnification`. Scaling happens after the
    /// orientation is fixed so the camera backs away along its own position
    /// vector.
    pub fn framing(config: &CameraConfig) -> Self {
        let mut camera = Self {
            position: Vec3::from_array(config.eye),
            orientation: Quat::IDENTITY,
            fov_y: config.fov_degrees.to_radians(),
            aspect: 1.0,
            near: config.near,
            far: config.far,
        };

        camera.look_at(Vec3::ZERO);
        camera.position *= config.magnification;
        camera
    }

    fn look_at(&mut self, target: Vec3) {
        let view = Mat4::look_at_rh(self.position, target, Vec3::Y);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.orientation = rotation;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect.max(1e-6);
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
            .inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Projects a world position to normalized device coordinates
    /// (x and y in [-1, 1], y up).
    pub fn project(&self, world: Vec3) -> Vec3 {
        let clip = self.view_projection() * world.extend(1.0);
        clip.truncate() / clip.w
    }
}

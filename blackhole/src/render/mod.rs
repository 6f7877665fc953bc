pub mod bloom;
pub mod frame;
pub mod gpu;
pub mod mesh_pass;
pub mod passes;
pub mod shaders;
pub mod uniforms;

use crate::runtime::viewport::BufferLayout;
use crate::scene::Scene;
use crate::shading::lensing::LensingState;

/// The composed render path the driver talks to: scene geometry, then
/// bloom, then lensing onto the presentation target.
pub trait Compositor {
    /// Resizes every offscreen target to `layout.buffer`.
    fn set_size(&mut self, layout: &BufferLayout);

    /// Renders one frame. Uniforms must already be written into `scene`
    /// and `lensing`.
    fn render(
        &mut self,
        scene: &Scene,
        lensing: &LensingState,
    ) -> Result<(), String>;

    /// Releases GPU resources. Rendering after this is a no-op.
    fn dispose(&mut self);
}

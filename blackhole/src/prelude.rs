pub use crate::config::{
    BloomConfig, CameraConfig, CoreConfig, DiskConfig, GlowConfig,
    LensingConfig, Rgb, SceneConfig,
};
pub use crate::framework::logging::init_logger;
pub use crate::framework::logging::{debug, error, info, trace, warn};
pub use crate::profile::{RenderProfile, Tier};
pub use crate::render::Compositor;
pub use crate::render::gpu::{GpuCompositor, GpuContext, PresentTarget};
pub use crate::runtime::app::{
    HeadlessOptions, HeadlessReport, ViewerOptions, run_headless, run_viewer,
};
pub use crate::runtime::driver::{BlackHole, FrameOutcome};
pub use crate::runtime::mount::{Container, Document, MOUNT_ID, StaticDocument};
pub use crate::runtime::scheduler::{
    CancellationToken, FrameScheduler, HostEvent, IntervalScheduler,
};
pub use crate::runtime::viewport::{BufferLayout, ContainerSize};
pub use crate::scene::Scene;
pub use crate::scene::mesh::MeshRole;
pub use crate::shading::lensing::LensingState;
pub use crate::warn_once;

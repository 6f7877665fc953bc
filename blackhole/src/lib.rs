pub mod config;
pub mod framework;
pub mod prelude;
pub mod profile;
pub mod render;
pub mod runtime;
pub mod scene;
pub mod shading;

pub use runtime::app::{
    HeadlessOptions, HeadlessReport, ViewerOptions, run_headless, run_viewer,
};
pub use runtime::driver::{BlackHole, FrameOutcome};

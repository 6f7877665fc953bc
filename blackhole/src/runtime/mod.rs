pub mod app;
pub mod driver;
pub mod frame_clock;
pub mod mount;
pub mod scheduler;
pub mod viewport;

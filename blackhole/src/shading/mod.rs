pub mod disk;
pub mod lensing;
pub mod noise;
pub mod surface;

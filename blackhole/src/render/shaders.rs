//! WGSL sources, embedded at compile time. Mesh shaders share the
//! transform prelude; post-process shaders share the fullscreen prelude.

use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

#[derive(Clone, Copy, Debug)]
pub struct ShaderAsset {
    pub name: &'static str,
    pub source: &'static str,
}

macro_rules! mesh_shader {
    ($name:literal) => {
        ShaderAsset {
            name: $name,
            source: concat!(
                include_str!("shaders/transform.wgsl"),
                include_str!(concat!("shaders/", $name, ".wgsl")),
            ),
        }
    };
}

macro_rules! fullscreen_shader {
    ($name:literal) => {
        ShaderAsset {
            name: $name,
            source: concat!(
                include_str!("shaders/fullscreen.wgsl"),
                include_str!(concat!("shaders/", $name, ".wgsl")),
            ),
        }
    };
}

pub const CORE: ShaderAsset = mesh_shader!("core");
pub const GLOW: ShaderAsset = mesh_shader!("glow");
pub const DISK: ShaderAsset = mesh_shader!("disk");
pub const LENSING: ShaderAsset = fullscreen_shader!("lensing");
pub const BLOOM_HIGHPASS: ShaderAsset = fullscreen_shader!("bloom_highpass");
pub const BLOOM_BLUR: ShaderAsset = fullscreen_shader!("bloom_blur");
pub const BLOOM_COMPOSITE: ShaderAsset =
    fullscreen_shader!("bloom_composite");

pub const ALL: [ShaderAsset; 7] = [
    CORE,
    GLOW,
    DISK,
    LENSING,
    BLOOM_HIGHPASS,
    BLOOM_BLUR,
    BLOOM_COMPOSITE,
];

impl ShaderAsset {
    /// Parses and validates the source before it reaches the device, so a
    /// bad asset surfaces as an error instead of a device panic.
    pub fn module(
        &self,
        device: &wgpu::Device,
    ) -> Result<wgpu::ShaderModule, String> {
        validate_shader(self.source).map_err(|err| {
            format!("shader validation failed for '{}': {}", self.name, err)
        })?;

        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.name),
            source: wgpu::ShaderSource::Wgsl(self.source.into()),
        }))
    }
}

pub fn validate_shader(source: &str) -> Result<(), String> {
    let module = wgsl::parse_str(source).map_err(|err| err.to_string())?;

    let mut validator =
        Validator::new(ValidationFlags::all(), Capabilities::all());

    validator
        .validate(&module)
        .map_err(|err| err.to_string())
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_asset_validates() {
        for asset in ALL {
            if let Err(err) = validate_shader(asset.source) {
                panic!("{} failed validation: {}", asset.name, err);
            }
        }
    }

    #[test]
    fn entry_points_are_present() {
        for asset in ALL {
            assert!(asset.source.contains("fn vs_main"), "{}", asset.name);
            assert!(asset.source.contains("fn fs_main"), "{}", asset.name);
        }
    }

    #[test]
    fn rejects_broken_source() {
        assert!(validate_shader("fn fs_main( -> {").is_err());
        assert!(
            validate_shader("fn f() -> f32 { return vec2f(1.0); }").is_err()
        );
    }
}

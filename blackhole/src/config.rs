use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::Deserialize;

/// Linear RGB colour. Deserializes from a `"#rrggbb"` sRGB hex string
/// (converted to linear) or from a `[r, g, b]` array taken as linear.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(try_from = "ColorRepr")]
pub struct Rgb(pub Vec3);

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Linear([f32; 3]),
}

impl TryFrom<ColorRepr> for Rgb {
    type Error = String;

    fn try_from(value: ColorRepr) -> Result<Self, Self::Error> {
        match value {
            ColorRepr::Hex(hex) => Rgb::from_hex(&hex),
            ColorRepr::Linear([r, g, b]) => Ok(Rgb(Vec3::new(r, g, b))),
        }
    }
}

impl Rgb {
    pub const fn linear(r: f32, g: f32, b: f32) -> Self {
        Self(Vec3::new(r, g, b))
    }

    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);

        if digits.len() != 6 || !digits.is_ascii() {
            return Err(format!("expected a #rrggbb colour, got '{}'", hex));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map(|value| srgb_to_linear(value as f32 / 255.0))
                .map_err(|err| format!("invalid colour '{}': {}", hex, err))
        };

        Ok(Self(Vec3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?)))
    }

    fn hex_or_black(hex: &str) -> Self {
        Self::from_hex(hex).unwrap_or(Self(Vec3::ZERO))
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub core: CoreConfig,
    pub glow: GlowConfig,
    pub disk: DiskConfig,
    pub lensing: LensingConfig,
    pub bloom: BloomConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: [f32; 3],
    /// Applied to the eye position after it has been oriented toward the
    /// origin.
    pub magnification: f32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub radius: f32,
    pub inner_color: Rgb,
    pub edge_color: Rgb,
    pub rim_color: Rgb,
    pub opacity: f32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlowConfig {
    /// Shell radius relative to the core radius.
    pub scale: f32,
    pub color: Rgb,
    pub intensity: f32,
    pub pulse_speed: f32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DiskConfig {
    /// Gap between the core surface and the inner disk edge.
    pub inner_gap: f32,
    pub outer_radius: f32,
    pub tilt: f32,
    pub color_hot: Rgb,
    pub color_mid1: Rgb,
    pub color_mid2: Rgb,
    pub color_mid3: Rgb,
    pub color_outer: Rgb,
    pub noise_scale: f32,
    pub flow_speed: f32,
    pub density: f32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LensingConfig {
    pub strength: f32,
    pub radius: f32,
    pub chromatic_aberration: f32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BloomConfig {
    pub enabled: bool,
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 4000.0,
            eye: [-3.5, 5.0, 4.5],
            magnification: 1.6,
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            radius: 1.3,
            inner_color: Rgb::hex_or_black("#050308"),
            edge_color: Rgb::hex_or_black("#4b1d7a"),
            rim_color: Rgb::hex_or_black("#ff4fd8"),
            opacity: 1.0,
        }
    }
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            scale: 1.05,
            color: Rgb::linear(0.85, 0.45, 1.0),
            intensity: 0.4,
            pulse_speed: 2.5,
        }
    }
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            inner_gap: 0.2,
            outer_radius: 8.0,
            tilt: PI / 3.0,
            color_hot: Rgb::hex_or_black("#E9B6FF"),
            color_mid1: Rgb::hex_or_black("#FF4FD8"),
            color_mid2: Rgb::hex_or_black("#B35CFF"),
            color_mid3: Rgb::hex_or_black("#6A4CFF"),
            color_outer: Rgb::hex_or_black("#2D2A5A"),
            noise_scale: 2.5,
            flow_speed: 0.22,
            density: 1.3,
        }
    }
}

impl Default for LensingConfig {
    fn default() -> Self {
        Self {
            strength: 0.12,
            radius: 0.3,
            chromatic_aberration: 0.005,
        }
    }
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 0.65,
            radius: 0.75,
            threshold: 0.85,
        }
    }
}

impl SceneConfig {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let source = fs::read_to_string(path).map_err(|err| {
            format!("failed to read config '{}': {}", path.display(), err)
        })?;

        Self::from_yaml_str(&source).map_err(|err| {
            format!("invalid config '{}': {}", path.display(), err)
        })
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, String> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self =
            serde_yml::from_str(source).map_err(|err| err.to_string())?;
        config.validate()?;
        Ok(config)
    }

    pub fn disk_inner_radius(&self) -> f32 {
        self.core.radius + self.disk.inner_gap
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.core.radius <= 0.0 {
            return Err("core.radius must be > 0".to_string());
        }

        if self.disk.outer_radius <= self.disk_inner_radius() {
            return Err(format!(
                "disk.outer_radius ({}) must exceed the inner radius ({})",
                self.disk.outer_radius,
                self.disk_inner_radius()
            ));
        }

        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return Err("camera requires 0 < near < far".to_string());
        }

        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0)
        {
            return Err("camera.fov_degrees must be in (0, 180)".to_string());
        }

        if self.lensing.radius <= 0.0 {
            return Err("lensing.radius must be > 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scene_constants() {
        let config = SceneConfig::default();
        assert_eq!(config.core.radius, 1.3);
        assert!((config.disk_inner_radius() - 1.5).abs() < 1e-6);
        assert_eq!(config.disk.outer_radius, 8.0);
        assert_eq!(config.lensing.strength, 0.12);
        assert_eq!(config.bloom.threshold, 0.85);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn hex_colours_are_linearized() {
        let white = Rgb::from_hex("#ffffff").unwrap();
        assert!((white.0 - Vec3::ONE).abs().max_element() < 1e-4);

        let mid = Rgb::from_hex("808080").unwrap();
        // sRGB 0.5 is roughly 0.2159 in linear light.
        assert!((mid.0.x - 0.2159).abs() < 1e-3);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#gg0000").is_err());
    }

    #[test]
    fn yaml_overrides_merge_over_defaults() {
        let config = SceneConfig::from_yaml_str(
            r##"
lensing:
  strength: 0.2
disk:
  color_hot: "#ffffff"
glow:
  color: [0.1, 0.2, 0.3]
"##,
        )
        .unwrap();

        assert_eq!(config.lensing.strength, 0.2);
        assert_eq!(config.lensing.radius, 0.3);
        assert_eq!(config.glow.color, Rgb::linear(0.1, 0.2, 0.3));
        assert_eq!(config.disk.density, 1.3);
    }

    #[test]
    fn yaml_rejects_bad_colour_and_unknown_keys() {
        assert!(
            SceneConfig::from_yaml_str("disk:\n  color_hot: \"#zz\"\n")
                .is_err()
        );
        assert!(
            SceneConfig::from_yaml_str("lensing:\n  power: 1.0\n").is_err()
        );
    }

    #[test]
    fn empty_source_yields_defaults() {
        assert_eq!(
            SceneConfig::from_yaml_str("  \n").unwrap(),
            SceneConfig::default()
        );
    }

    #[test]
    fn validation_rejects_inverted_disk() {
        let mut config = SceneConfig::default();
        config.disk.outer_radius = 1.0;
        assert!(config.validate().is_err());
    }
}

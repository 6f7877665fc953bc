/// Widest viewport (CSS px) still treated as a compact device. Inclusive.
pub const COMPACT_MAX_WIDTH: f32 = 980.0;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tier {
    Compact,
    Full,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SphereTessellation {
    pub width_segments: u32,
    pub height_segments: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RingTessellation {
    /// Segments around the ring.
    pub theta_segments: u32,
    /// Segments across the ring, from inner to outer edge.
    pub phi_segments: u32,
}

/// Performance settings picked once at mount.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderProfile {
    pub tier: Tier,
    pub frame_cap_hz: f32,
    pub overscan: f32,
    pub device_pixel_ratio_cap: f32,
    pub sphere: SphereTessellation,
    pub disk: RingTessellation,
}

impl RenderProfile {
    pub const COMPACT: Self = Self {
        tier: Tier::Compact,
        frame_cap_hz: 30.0,
        overscan: 1.0,
        device_pixel_ratio_cap: 1.0,
        sphere: SphereTessellation {
            width_segments: 64,
            height_segments: 32,
        },
        disk: RingTessellation {
            theta_segments: 128,
            phi_segments: 64,
        },
    };

    pub const FULL: Self = Self {
        tier: Tier::Full,
        frame_cap_hz: 60.0,
        overscan: 1.2,
        device_pixel_ratio_cap: 1.5,
        sphere: SphereTessellation {
            width_segments: 96,
            height_segments: 48,
        },
        disk: RingTessellation {
            theta_segments: 192,
            phi_segments: 96,
        },
    };

    pub fn detect(viewport_width_px: f32, reduced_motion: bool) -> Self {
        if viewport_width_px <= COMPACT_MAX_WIDTH || reduced_motion {
            Self::COMPACT
        } else {
            Self::FULL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_width_is_compact() {
        let profile = RenderProfile::detect(980.0, false);
        assert_eq!(profile.tier, Tier::Compact);
        assert_eq!(profile.frame_cap_hz, 30.0);
        assert_eq!(profile.sphere.width_segments, 64);
        assert_eq!(profile.disk.theta_segments, 128);
    }

    #[test]
    fn wide_viewport_is_full() {
        let profile = RenderProfile::detect(981.0, false);
        assert_eq!(profile, RenderProfile::FULL);
        assert_eq!(profile.overscan, 1.2);
        assert_eq!(profile.device_pixel_ratio_cap, 1.5);
    }

    #[test]
    fn reduced_motion_forces_compact() {
        assert_eq!(RenderProfile::detect(2560.0, true), RenderProfile::COMPACT);
    }
}

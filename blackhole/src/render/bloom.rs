//! Mip-chain bloom: a luminosity high-pass at half resolution, a separable
//! Gaussian blur per level with the kernel widening as the level shrinks,
//! then a weighted composite added back onto the scene target.

use crate::config::BloomConfig;
use crate::framework::math::mix;

use super::passes::{FullscreenPass, HDR_FORMAT, RenderTexture, TRANSPARENT};
use super::shaders;
use super::uniforms::{
    BlurUniforms, CompositeUniforms, HighPassUniforms, UniformBlock,
};

pub const LEVELS: usize = 5;
pub const KERNEL_RADII: [u32; LEVELS] = [3, 5, 7, 9, 11];
pub const BLOOM_FACTORS: [f32; LEVELS] = [1.0, 0.8, 0.6, 0.4, 0.2];
pub const SMOOTH_WIDTH: f32 = 0.01;

const HORIZONTAL: [f32; 2] = [1.0, 0.0];
const VERTICAL: [f32; 2] = [0.0, 1.0];

/// Per-level weights. `radius` 0 favours the sharp levels; 1 flips the ramp
/// toward the wide ones.
pub fn level_factors(radius: f32) -> [f32; LEVELS] {
    BLOOM_FACTORS.map(|factor| mix(factor, 1.2 - factor, radius))
}

/// Size of mip level `level` for a source of `size`. Level 0 is half
/// resolution, rounded.
pub fn level_size(size: [u32; 2], level: usize) -> [u32; 2] {
    let half = |extent: u32| ((extent as f32 / 2.0).round() as u32).max(1);
    let mut level_size = [half(size[0]), half(size[1])];

    for _ in 0..level {
        level_size = [half(level_size[0]), half(level_size[1])];
    }

    level_size
}

pub fn additive_blend() -> wgpu::BlendState {
    let add = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    };

    wgpu::BlendState {
        color: add,
        alpha: add,
    }
}

struct Level {
    horizontal: RenderTexture,
    vertical: RenderTexture,
    horizontal_uniforms: UniformBlock<BlurUniforms>,
    vertical_uniforms: UniformBlock<BlurUniforms>,
}

pub struct BloomPass {
    enabled: bool,
    highpass: FullscreenPass,
    highpass_uniforms: UniformBlock<HighPassUniforms>,
    blur: FullscreenPass,
    composite: FullscreenPass,
    composite_uniforms: UniformBlock<CompositeUniforms>,
    bright: Option<RenderTexture>,
    levels: Vec<Level>,
    size: [u32; 2],
}

impl BloomPass {
    pub fn new(
        device: &wgpu::Device,
        config: &BloomConfig,
    ) -> Result<Self, String> {
        let highpass_uniforms = UniformBlock::new(
            device,
            "blackhole-bloom-highpass-uniforms",
            HighPassUniforms::new(config.threshold, SMOOTH_WIDTH),
        );

        let composite_uniforms = UniformBlock::new(
            device,
            "blackhole-bloom-composite-uniforms",
            CompositeUniforms::from(config),
        );

        let blur_layout = UniformBlock::<BlurUniforms>::create_layout(
            device,
            "blackhole-bloom-blur-layout",
        );

        let highpass = FullscreenPass::new(
            device,
            shaders::BLOOM_HIGHPASS,
            highpass_uniforms.bind_group_layout(),
            1,
            HDR_FORMAT,
            wgpu::BlendState::REPLACE,
        )?;

        let blur = FullscreenPass::new(
            device,
            shaders::BLOOM_BLUR,
            &blur_layout,
            1,
            HDR_FORMAT,
            wgpu::BlendState::REPLACE,
        )?;

        let composite = FullscreenPass::new(
            device,
            shaders::BLOOM_COMPOSITE,
            composite_uniforms.bind_group_layout(),
            LEVELS,
            HDR_FORMAT,
            additive_blend(),
        )?;

        Ok(Self {
            enabled: config.enabled,
            highpass,
            highpass_uniforms,
            blur,
            composite,
            composite_uniforms,
            bright: None,
            levels: Vec::new(),
            size: [0, 0],
        })
    }

    /// Recreates the mip chain when the source size changes.
    pub fn resize(&mut self, device: &wgpu::Device, size: [u32; 2]) {
        if self.size == size && self.bright.is_some() {
            return;
        }

        self.destroy();
        self.size = size;
        self.bright = Some(RenderTexture::new(
            device,
            "blackhole-bloom-bright",
            HDR_FORMAT,
            level_size(size, 0),
        ));

        self.levels = (0..LEVELS)
            .map(|level| {
                let extent = level_size(size, level);
                let radius = KERNEL_RADII[level];

                Level {
                    horizontal: RenderTexture::new(
                        device,
                        "blackhole-bloom-horizontal",
                        HDR_FORMAT,
                        extent,
                    ),
                    vertical: RenderTexture::new(
                        device,
                        "blackhole-bloom-vertical",
                        HDR_FORMAT,
                        extent,
                    ),
                    horizontal_uniforms: UniformBlock::new(
                        device,
                        "blackhole-bloom-blur-h",
                        BlurUniforms::new(extent, HORIZONTAL, radius),
                    ),
                    vertical_uniforms: UniformBlock::new(
                        device,
                        "blackhole-bloom-blur-v",
                        BlurUniforms::new(extent, VERTICAL, radius),
                    ),
                }
            })
            .collect();
    }

    /// Blooms `scene` in place: reads it, then adds the composite onto it.
    pub fn encode(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        scene: &RenderTexture,
    ) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        let bright = self
            .bright
            .as_ref()
            .ok_or_else(|| "bloom targets were not sized".to_string())?;

        self.highpass_uniforms.upload(queue);
        self.composite_uniforms.upload(queue);

        self.highpass.draw(
            encoder,
            &bright.view,
            wgpu::LoadOp::Clear(TRANSPARENT),
            self.highpass_uniforms.bind_group(),
            &self.highpass.bind_textures(device, &[&scene.view]),
        );

        let mut input = &bright.view;

        for level in &self.levels {
            level.horizontal_uniforms.upload(queue);
            level.vertical_uniforms.upload(queue);

            self.blur.draw(
                encoder,
                &level.horizontal.view,
                wgpu::LoadOp::Clear(TRANSPARENT),
                level.horizontal_uniforms.bind_group(),
                &self.blur.bind_textures(device, &[input]),
            );

            self.blur.draw(
                encoder,
                &level.vertical.view,
                wgpu::LoadOp::Clear(TRANSPARENT),
                level.vertical_uniforms.bind_group(),
                &self.blur.bind_textures(device, &[&level.horizontal.view]),
            );

            input = &level.vertical.view;
        }

        let views = self
            .levels
            .iter()
            .map(|level| &level.vertical.view)
            .collect::<Vec<_>>();

        self.composite.draw(
            encoder,
            &scene.view,
            wgpu::LoadOp::Load,
            self.composite_uniforms.bind_group(),
            &self.composite.bind_textures(device, &views),
        );

        Ok(())
    }

    pub fn destroy(&mut self) {
        if let Some(bright) = self.bright.take() {
            bright.destroy();
        }

        for level in self.levels.drain(..) {
            level.horizontal.destroy();
            level.vertical.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors_at_default_radius() {
        let factors = level_factors(0.75);
        let expected = [0.4, 0.5, 0.6, 0.7, 0.8];

        for (factor, expected) in factors.iter().zip(expected) {
            assert!((factor - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_radius_keeps_base_factors() {
        assert_eq!(level_factors(0.0), BLOOM_FACTORS);
    }

    #[test]
    fn levels_halve_from_half_resolution() {
        assert_eq!(level_size([1920, 1080], 0), [960, 540]);
        assert_eq!(level_size([1920, 1080], 1), [480, 270]);
        assert_eq!(level_size([1920, 1080], 4), [60, 34]);
    }

    #[test]
    fn tiny_sources_stay_at_least_one_texel() {
        assert_eq!(level_size([1, 1], 4), [1, 1]);
        assert_eq!(level_size([3, 1], 0), [2, 1]);
    }
}

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::config::BloomConfig;
use crate::scene::camera::Camera;
use crate::shading::disk::DiskMaterial;
use crate::shading::lensing::LensingState;
use crate::shading::surface::{CoreMaterial, GlowMaterial};

/// A single uniform buffer at binding 0 of its own bind group, holding one
/// `T`. Layouts of `T` must match the WGSL structs byte for byte.
pub struct UniformBlock<T: Pod> {
    data: T,
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl<T: Pod> UniformBlock<T> {
    pub fn new(device: &wgpu::Device, label: &str, data: T) -> Self {
        let bind_group_layout = Self::create_layout(device, label);

        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(&data),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            data,
            buffer,
            bind_group_layout,
            bind_group,
        }
    }

    /// Layout shared by every block of `T`, for pipelines built before any
    /// block exists.
    pub fn create_layout(
        device: &wgpu::Device,
        label: &str,
    ) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[uniform_layout_entry(std::mem::size_of::<T>() as u64)],
        })
    }

    pub fn set(&mut self, data: T) {
        self.data = data;
    }

    pub fn upload(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&self.data));
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

fn uniform_layout_entry(size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size),
        },
        count: None,
    }
}

fn rgbw(rgb: Vec3, w: f32) -> [f32; 4] {
    rgb.extend(w).to_array()
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct TransformUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
}

impl TransformUniforms {
    pub fn new(camera: &Camera, model: Mat4) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            model: model.to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CoreUniforms {
    camera: [f32; 4],
    inner_color: [f32; 4],
    edge_color: [f32; 4],
    rim_color: [f32; 4],
}

impl From<&CoreMaterial> for CoreUniforms {
    fn from(material: &CoreMaterial) -> Self {
        Self {
            camera: rgbw(material.camera_position, material.opacity),
            inner_color: rgbw(material.inner_color, 1.0),
            edge_color: rgbw(material.edge_color, 1.0),
            rim_color: rgbw(material.rim_color, 1.0),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GlowUniforms {
    camera: [f32; 4],
    color: [f32; 4],
    pulse: [f32; 4],
}

impl From<&GlowMaterial> for GlowUniforms {
    fn from(material: &GlowMaterial) -> Self {
        Self {
            camera: rgbw(material.camera_position, material.time),
            color: rgbw(material.color, material.intensity),
            pulse: [material.pulse_speed, 0.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DiskUniforms {
    hot: [f32; 4],
    mid1: [f32; 4],
    mid2: [f32; 4],
    mid3: [f32; 4],
    outer: [f32; 4],
    extra: [f32; 4],
}

impl From<&DiskMaterial> for DiskUniforms {
    fn from(material: &DiskMaterial) -> Self {
        Self {
            hot: rgbw(material.color_hot, material.time),
            mid1: rgbw(material.color_mid1, material.inner_radius),
            mid2: rgbw(material.color_mid2, material.outer_radius),
            mid3: rgbw(material.color_mid3, material.noise_scale),
            outer: rgbw(material.color_outer, material.flow_speed),
            extra: [material.density, 0.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LensingUniforms {
    center: [f32; 2],
    strength: f32,
    radius: f32,
    aspect_ratio: f32,
    chromatic_aberration: f32,
    _pad: [f32; 2],
}

impl From<&LensingState> for LensingUniforms {
    fn from(state: &LensingState) -> Self {
        Self {
            center: state.center.to_array(),
            strength: state.strength,
            radius: state.radius,
            aspect_ratio: state.aspect_ratio,
            chromatic_aberration: state.chromatic_aberration,
            _pad: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct HighPassUniforms {
    pub threshold: f32,
    pub smooth_width: f32,
    _pad: [f32; 2],
}

impl HighPassUniforms {
    pub fn new(threshold: f32, smooth_width: f32) -> Self {
        Self {
            threshold,
            smooth_width,
            _pad: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BlurUniforms {
    pub texel_size: [f32; 2],
    pub direction: [f32; 2],
    pub kernel_radius: i32,
    pub sigma: f32,
    _pad: [f32; 2],
}

impl BlurUniforms {
    pub fn new(
        size: [u32; 2],
        direction: [f32; 2],
        kernel_radius: u32,
    ) -> Self {
        Self {
            texel_size: size.map(|side| 1.0 / side.max(1) as f32),
            direction,
            kernel_radius: kernel_radius as i32,
            sigma: kernel_radius as f32,
            _pad: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CompositeUniforms {
    strength: f32,
    _pad: [f32; 3],
    factors: [[f32; 4]; 2],
}

impl CompositeUniforms {
    pub fn new(strength: f32, factors: [f32; 5]) -> Self {
        Self {
            strength,
            _pad: [0.0; 3],
            factors: [
                [factors[0], factors[1], factors[2], factors[3]],
                [factors[4], 0.0, 0.0, 0.0],
            ],
        }
    }
}

impl From<&BloomConfig> for CompositeUniforms {
    fn from(config: &BloomConfig) -> Self {
        Self::new(
            config.strength,
            crate::render::bloom::level_factors(config.radius),
        )
    }
}

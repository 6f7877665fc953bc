use wgpu::util::DeviceExt;

use super::passes::HDR_FORMAT;
use super::shaders::{self, ShaderAsset};
use super::uniforms::{
    CoreUniforms, DiskUniforms, GlowUniforms, TransformUniforms, UniformBlock,
};
use crate::scene::camera::Camera;
use crate::scene::geometry::Vertex;
use crate::scene::mesh::{BlendMode, Material, MeshRole, ShadedMesh, Side};

enum MaterialBlock {
    Core(UniformBlock<CoreUniforms>),
    Glow(UniformBlock<GlowUniforms>),
    Disk(UniformBlock<DiskUniforms>),
}

impl MaterialBlock {
    fn new(device: &wgpu::Device, label: &str, material: &Material) -> Self {
        match material {
            Material::Core(core) => {
                Self::Core(UniformBlock::new(device, label, core.into()))
            }
            Material::Glow(glow) => {
                Self::Glow(UniformBlock::new(device, label, glow.into()))
            }
            Material::Disk(disk) => {
                Self::Disk(UniformBlock::new(device, label, disk.into()))
            }
        }
    }

    fn write(&mut self, material: &Material) -> Result<(), String> {
        match (self, material) {
            (Self::Core(block), Material::Core(core)) => block.set(core.into()),
            (Self::Glow(block), Material::Glow(glow)) => block.set(glow.into()),
            (Self::Disk(block), Material::Disk(disk)) => block.set(disk.into()),
            _ => return Err("mesh material changed kind".to_string()),
        }

        Ok(())
    }

    fn upload(&self, queue: &wgpu::Queue) {
        match self {
            Self::Core(block) => block.upload(queue),
            Self::Glow(block) => block.upload(queue),
            Self::Disk(block) => block.upload(queue),
        }
    }

    fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        match self {
            Self::Core(block) => block.bind_group_layout(),
            Self::Glow(block) => block.bind_group_layout(),
            Self::Disk(block) => block.bind_group_layout(),
        }
    }

    fn bind_group(&self) -> &wgpu::BindGroup {
        match self {
            Self::Core(block) => block.bind_group(),
            Self::Glow(block) => block.bind_group(),
            Self::Disk(block) => block.bind_group(),
        }
    }
}

/// GPU residency of one `ShadedMesh`: buffers, uniforms and a pipeline
/// baked with the mesh's blend mode and face culling.
pub struct GpuMesh {
    pub role: MeshRole,
    label: &'static str,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    transform: UniformBlock<TransformUniforms>,
    material: MaterialBlock,
}

impl GpuMesh {
    pub fn new(
        device: &wgpu::Device,
        mesh: &ShadedMesh,
        camera: &Camera,
    ) -> Result<Self, String> {
        let label = mesh.label();

        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&mesh.geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&mesh.geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let transform = UniformBlock::new(
            device,
            label,
            TransformUniforms::new(camera, mesh.model),
        );
        let material = MaterialBlock::new(device, label, &mesh.material);

        let pipeline = create_mesh_pipeline(
            device,
            shader_for(&mesh.material),
            &[transform.bind_group_layout(), material.bind_group_layout()],
            mesh,
        )?;

        Ok(Self {
            role: mesh.role,
            label,
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count: mesh.geometry.index_count(),
            transform,
            material,
        })
    }

    pub fn write(
        &mut self,
        queue: &wgpu::Queue,
        mesh: &ShadedMesh,
        camera: &Camera,
    ) -> Result<(), String> {
        self.transform.set(TransformUniforms::new(camera, mesh.model));
        self.material.write(&mesh.material).map_err(|err| {
            format!("failed to update '{}': {}", self.label, err)
        })?;

        self.transform.upload(queue);
        self.material.upload(queue);
        Ok(())
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.transform.bind_group(), &[]);
        pass.set_bind_group(1, self.material.bind_group(), &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(
            self.index_buffer.slice(..),
            wgpu::IndexFormat::Uint32,
        );
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

fn shader_for(material: &Material) -> ShaderAsset {
    match material {
        Material::Core(_) => shaders::CORE,
        Material::Glow(_) => shaders::GLOW,
        Material::Disk(_) => shaders::DISK,
    }
}

pub fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Normal => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
        },
        BlendMode::Additive => super::bloom::additive_blend(),
    }
}

pub fn cull_mode(side: Side) -> Option<wgpu::Face> {
    match side {
        Side::Front => Some(wgpu::Face::Back),
        Side::Back => Some(wgpu::Face::Front),
        Side::Double => None,
    }
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    asset: ShaderAsset,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    mesh: &ShadedMesh,
) -> Result<wgpu::RenderPipeline, String> {
    let shader = asset.module(device)?;

    let layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(mesh.label()),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

    Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(mesh.label()),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[Vertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: Some(blend_state(mesh.blend)),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: cull_mode(mesh.side),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        // Nothing writes depth, so there is no depth attachment.
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn culling_follows_side() {
        assert_eq!(cull_mode(Side::Front), Some(wgpu::Face::Back));
        assert_eq!(cull_mode(Side::Back), Some(wgpu::Face::Front));
        assert_eq!(cull_mode(Side::Double), None);
    }

    #[test]
    fn additive_keeps_destination() {
        let blend = blend_state(BlendMode::Additive);
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::One);

        let normal = blend_state(BlendMode::Normal);
        assert_eq!(
            normal.color.dst_factor,
            wgpu::BlendFactor::OneMinusSrcAlpha
        );
    }
}

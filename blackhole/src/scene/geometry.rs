use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};

use crate::profile::{RingTessellation, SphereTessellation};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Indexed triangle list.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// UV sphere centred on the origin. Rows run pole to pole; the first and
    /// last rows skip the triangles that would collapse onto the poles.
    pub fn sphere(radius: f32, tessellation: SphereTessellation) -> Self {
        let width = tessellation.width_segments.max(3);
        let height = tessellation.height_segments.max(2);

        let mut vertices =
            Vec::with_capacity(((width + 1) * (height + 1)) as usize);

        for iy in 0..=height {
            let v = iy as f32 / height as f32;
            let theta = v * PI;

            for ix in 0..=width {
                let u = ix as f32 / width as f32;
                let phi = u * TAU;

                let normal = [
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                ];

                vertices.push(Vertex {
                    position: normal.map(|c| c * radius),
                    normal,
                    uv: [u, 1.0 - v],
                });
            }
        }

        let row = width + 1;
        let mut indices = Vec::new();

        for iy in 0..height {
            for ix in 0..width {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;

                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }

    /// Flat annulus in the XY plane facing +Z. UVs are planar, mapping the
    /// outer radius to the [0, 1] square.
    pub fn ring(
        inner_radius: f32,
        outer_radius: f32,
        tessellation: RingTessellation,
    ) -> Self {
        let theta_segments = tessellation.theta_segments.max(3);
        let phi_segments = tessellation.phi_segments.max(1);
        let radius_step = (outer_radius - inner_radius) / phi_segments as f32;

        let mut vertices = Vec::with_capacity(
            ((theta_segments + 1) * (phi_segments + 1)) as usize,
        );

        for j in 0..=phi_segments {
            let radius = inner_radius + j as f32 * radius_step;

            for i in 0..=theta_segments {
                let segment = i as f32 / theta_segments as f32 * TAU;
                let x = radius * segment.cos();
                let y = radius * segment.sin();

                vertices.push(Vertex {
                    position: [x, y, 0.0],
                    normal: [0.0, 0.0, 1.0],
                    uv: [
                        (x / outer_radius + 1.0) / 2.0,
                        (y / outer_radius + 1.0) / 2.0,
                    ],
                });
            }
        }

        let mut indices = Vec::with_capacity(
            (theta_segments * phi_segments * 6) as usize,
        );

        for j in 0..phi_segments {
            let level = j * (theta_segments + 1);

            for i in 0..theta_segments {
                let segment = i + level;
                let a = segment;
                let b = segment + theta_segments + 1;
                let c = segment + theta_segments + 2;
                let d = segment + 1;

                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self { vertices, indices }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

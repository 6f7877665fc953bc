//! Scalar helpers with the same semantics as their WGSL builtins so the CPU
//! shading functions and the shader assets agree.

use glam::Vec3;

/// Hermite ease between `edge0` and `edge1`. Reversed edges are allowed and
/// produce a falling curve.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn mix3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

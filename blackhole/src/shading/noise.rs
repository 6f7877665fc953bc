//! 3D simplex gradient noise (the permutation-polynomial variant that needs
//! no lookup tables) and the three-octave stack the disk samples.
//! `disk.wgsl` carries the same arithmetic; keep the two in step.

use glam::{Vec2, Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};

const C: Vec2 = Vec2::new(1.0 / 6.0, 1.0 / 3.0);

/// Scale and weight of each octave, plus the offset and time rate that
/// decorrelate them.
pub const OCTAVES: [Octave; 3] = [
    Octave {
        scale: 1.0,
        offset: 0.0,
        time_rate: 0.15,
        weight: 0.45,
    },
    Octave {
        scale: 3.0,
        offset: 0.8,
        time_rate: 0.22,
        weight: 0.35,
    },
    Octave {
        scale: 6.0,
        offset: 1.5,
        time_rate: 0.3,
        weight: 0.2,
    },
];

#[derive(Clone, Copy, Debug)]
pub struct Octave {
    pub scale: f32,
    pub offset: f32,
    pub time_rate: f32,
    pub weight: f32,
}

fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: Vec4) -> Vec4 {
    mod289_4((x * 34.0 + 1.0) * x)
}

fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    1.792_842_9 - 0.853_734_7 * r
}

/// Component-wise `step(edge, x)`: 0 where `x < edge`, else 1.
fn step3(edge: Vec3, x: Vec3) -> Vec3 {
    Vec3::select(x.cmplt(edge), Vec3::ZERO, Vec3::ONE)
}

fn step4(edge: Vec4, x: Vec4) -> Vec4 {
    Vec4::select(x.cmplt(edge), Vec4::ZERO, Vec4::ONE)
}

/// Simplex noise in roughly [-1, 1].
pub fn simplex3(v: Vec3) -> f32 {
    // Skew into simplex cell space and find the cell origin.
    let i = (v + v.dot(Vec3::splat(C.y))).floor();
    let x0 = v - i + i.dot(Vec3::splat(C.x));

    // Pick the simplex corners by ordering the fractional components.
    let g = step3(x0.yzx(), x0);
    let l = Vec3::ONE - g;
    let i1 = g.min(l.zxy());
    let i2 = g.max(l.zxy());

    let x1 = x0 - i1 + C.x;
    let x2 = x0 - i2 + C.y;
    let x3 = x0 - 0.5;

    let i = mod289_3(i);
    let p = permute(
        permute(
            permute(Vec4::splat(i.z) + Vec4::new(0.0, i1.z, i2.z, 1.0))
                + i.y
                + Vec4::new(0.0, i1.y, i2.y, 1.0),
        ) + i.x
            + Vec4::new(0.0, i1.x, i2.x, 1.0),
    );

    // Gradients on a 7x7 grid mapped onto an octahedron.
    let n = 0.142_857_15;
    let ns = Vec3::new(2.0 * n, 0.5 * n - 1.0, n);

    let j = p - 49.0 * (p * ns.z * ns.z).floor();
    let x_ = (j * ns.z).floor();
    let y_ = (j - 7.0 * x_).floor();

    let x = x_ * ns.x + ns.y;
    let y = y_ * ns.x + ns.y;
    let h = Vec4::ONE - x.abs() - y.abs();

    let b0 = Vec4::new(x.x, x.y, y.x, y.y);
    let b1 = Vec4::new(x.z, x.w, y.z, y.w);

    let s0 = b0.floor() * 2.0 + 1.0;
    let s1 = b1.floor() * 2.0 + 1.0;
    let sh = -step4(h, Vec4::ZERO);

    let a0 = b0.xzyw() + s0.xzyw() * sh.xxyy();
    let a1 = b1.xzyw() + s1.xzyw() * sh.zzww();

    let mut p0 = Vec3::new(a0.x, a0.y, h.x);
    let mut p1 = Vec3::new(a0.z, a0.w, h.y);
    let mut p2 = Vec3::new(a1.x, a1.y, h.z);
    let mut p3 = Vec3::new(a1.z, a1.w, h.w);

    let norm = taylor_inv_sqrt(Vec4::new(
        p0.dot(p0),
        p1.dot(p1),
        p2.dot(p2),
        p3.dot(p3),
    ));
    p0 *= norm.x;
    p1 *= norm.y;
    p2 *= norm.z;
    p3 *= norm.w;

    let m = (Vec4::splat(0.6)
        - Vec4::new(x0.dot(x0), x1.dot(x1), x2.dot(x2), x3.dot(x3)))
    .max(Vec4::ZERO);
    let m = m * m;

    42.0 * (m * m).dot(Vec4::new(
        p0.dot(x0),
        p1.dot(x1),
        p2.dot(x2),
        p3.dot(x3),
    ))
}

/// Weighted sum of the three octaves at `coord × scale`, remapped from
/// [-1, 1] to [0, 1]. Time is the third noise dimension, so the field
/// evolves rather than scrolls.
pub fn layered(coord: Vec2, scale: f32, time: f32) -> f32 {
    let sum: f32 = OCTAVES
        .iter()
        .map(|octave| {
            let xy = coord * scale * octave.scale + octave.offset;
            octave.weight * simplex3(xy.extend(time * octave.time_rate))
        })
        .sum();

    (sum + 1.0) * 0.5
}

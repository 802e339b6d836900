//! Procedural meshes used by the sections.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::scene::Mesh;

/// UV sphere; `width_segments` around the equator, `height_segments` pole to pole.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let (w, h) = (width_segments.max(3), height_segments.max(2));
    let mut positions = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            positions.push(Vec3::new(
                -radius * (u * TAU).cos() * (v * PI).sin(),
                radius * (v * PI).cos(),
                radius * (u * TAU).sin() * (v * PI).sin(),
            ));
        }
    }

    let row = w + 1;
    let mut indices = Vec::new();
    for iy in 0..h {
        for ix in 0..w {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                indices.extend([a, b, d]);
            }
            if iy != h - 1 {
                indices.extend([b, c, d]);
            }
        }
    }
    Mesh::triangles(positions, indices)
}

/// Each point pushed along its direction onto the surface of an axis-aligned
/// box of edge `size`.
pub fn box_surface(points: &[Vec3], size: f32) -> Vec<Vec3> {
    let half = size * 0.5;
    points
        .iter()
        .map(|p| {
            let m = p.abs().max_element();
            if m > f32::EPSILON {
                *p / m * half
            } else {
                Vec3::ZERO
            }
        })
        .collect()
}

/// (2, 3) torus knot.
pub fn torus_knot(radius: f32, tube: f32, tubular_segments: u32, radial_segments: u32) -> Mesh {
    const P: f32 = 2.0;
    const Q: f32 = 3.0;

    let curve = |u: f32| {
        let qu = Q / P * u;
        let cs = qu.cos();
        Vec3::new(
            radius * (2.0 + cs) * 0.5 * u.cos(),
            radius * (2.0 + cs) * 0.5 * u.sin(),
            radius * qu.sin() * 0.5,
        )
    };

    let mut positions = Vec::new();
    for i in 0..=tubular_segments {
        let u = i as f32 / tubular_segments as f32 * P * TAU;
        let p1 = curve(u);
        let p2 = curve(u + 0.01);
        let t = p2 - p1;
        let mut n = p2 + p1;
        let b = t.cross(n).normalize_or_zero();
        n = b.cross(t).normalize_or_zero();
        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            positions.push(p1 + n * cx + b * cy);
        }
    }

    let row = radial_segments + 1;
    let mut indices = Vec::new();
    for j in 1..=tubular_segments {
        for i in 1..=radial_segments {
            let a = row * (j - 1) + (i - 1);
            let b = row * j + (i - 1);
            let c = row * j + i;
            let d = row * (j - 1) + i;
            indices.extend([a, b, d, b, c, d]);
        }
    }
    Mesh::triangles(positions, indices)
}

pub fn icosahedron(radius: f32, detail: u32) -> Mesh {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    #[rustfmt::skip]
    let vertices = [
        [-1.0, t, 0.0], [1.0, t, 0.0], [-1.0, -t, 0.0], [1.0, -t, 0.0],
        [0.0, -1.0, t], [0.0, 1.0, t], [0.0, -1.0, -t], [0.0, 1.0, -t],
        [t, 0.0, -1.0], [t, 0.0, 1.0], [-t, 0.0, -1.0], [-t, 0.0, 1.0],
    ];
    #[rustfmt::skip]
    let faces = [
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11,
        1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1, 8,
        3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9,
        4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
    ];
    polyhedron(&vertices, &faces, radius, detail)
}

pub fn dodecahedron(radius: f32) -> Mesh {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    let r = 1.0 / t;
    #[rustfmt::skip]
    let vertices = [
        [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0],
        [0.0, -r, -t], [0.0, -r, t], [0.0, r, -t], [0.0, r, t],
        [-r, -t, 0.0], [-r, t, 0.0], [r, -t, 0.0], [r, t, 0.0],
        [-t, 0.0, -r], [t, 0.0, -r], [-t, 0.0, r], [t, 0.0, r],
    ];
    #[rustfmt::skip]
    let faces = [
        3, 11, 7, 3, 7, 15, 3, 15, 13,
        7, 19, 17, 7, 17, 6, 7, 6, 15,
        17, 4, 8, 17, 8, 10, 17, 10, 6,
        8, 0, 16, 8, 16, 2, 8, 2, 10,
        0, 12, 1, 0, 1, 18, 0, 18, 16,
        6, 10, 2, 6, 2, 13, 6, 13, 15,
        2, 16, 18, 2, 18, 3, 2, 3, 13,
        18, 1, 9, 18, 9, 11, 18, 11, 3,
        4, 14, 12, 4, 12, 0, 4, 0, 8,
        11, 9, 5, 11, 5, 19, 11, 19, 7,
        19, 5, 14, 19, 14, 4, 19, 4, 17,
        1, 12, 14, 1, 14, 5, 1, 5, 9,
    ];
    polyhedron(&vertices, &faces, radius, 0)
}

/// Projects a base solid onto a sphere of `radius`, splitting every edge of
/// each face into `detail + 1` segments.
fn polyhedron(vertices: &[[f32; 3]], faces: &[u32], radius: f32, detail: u32) -> Mesh {
    let base: Vec<Vec3> = vertices.iter().map(|&v| Vec3::from_array(v)).collect();
    let cols = detail + 1;
    let mut positions = Vec::new();
    let mut indices = Vec::new();

    for face in faces.chunks_exact(3) {
        let (a, b, c) = (base[face[0] as usize], base[face[1] as usize], base[face[2] as usize]);
        // Triangular lattice: row i holds cols - i + 1 points.
        let mut row_start = Vec::with_capacity(cols as usize + 1);
        for i in 0..=cols {
            row_start.push(positions.len() as u32);
            let aj = a.lerp(c, i as f32 / cols as f32);
            let bj = b.lerp(c, i as f32 / cols as f32);
            let rows = cols - i;
            for j in 0..=rows {
                let p = if rows == 0 { aj } else { aj.lerp(bj, j as f32 / rows as f32) };
                positions.push(p.normalize() * radius);
            }
        }
        for i in 0..cols {
            let rows = cols - i;
            for j in 0..rows {
                let p = row_start[i as usize] + j;
                let q = row_start[i as usize + 1] + j;
                indices.extend([p, p + 1, q]);
                if j + 1 < rows {
                    indices.extend([p + 1, q + 1, q]);
                }
            }
        }
    }
    Mesh::triangles(positions, indices)
}

/// HSL (all components in `[0, 1]`) to linear RGB components.
pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Vec3 {
    let h = hue.rem_euclid(1.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);
    if s == 0.0 {
        return Vec3::splat(l);
    }
    let high = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let low = 2.0 * l - high;
    Vec3::new(
        hue_channel(low, high, h + 1.0 / 3.0),
        hue_channel(low, high, h),
        hue_channel(low, high, h - 1.0 / 3.0),
    )
}

fn hue_channel(low: f32, high: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        low + (high - low) * 6.0 * t
    } else if t < 0.5 {
        high
    } else if t < 2.0 / 3.0 {
        low + (high - low) * 6.0 * (2.0 / 3.0 - t)
    } else {
        low
    }
}

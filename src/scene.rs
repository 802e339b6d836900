//! What a section hands to the graphics backend each frame.

use std::collections::HashSet;

use glam::{EulerRot, Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Points,
    Lines,
    Triangles,
}

/// CPU-side geometry, uploaded once per section.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    /// Alternative positions blended in by `Draw::morph`.
    pub morph_target: Option<Vec<Vec3>>,
    pub colors: Option<Vec<Vec3>>,
    pub sizes: Option<Vec<f32>>,
    pub indices: Option<Vec<u32>>,
    pub primitive: Primitive,
}

impl Mesh {
    pub fn triangles(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            morph_target: None,
            colors: None,
            sizes: None,
            indices: Some(indices),
            primitive: Primitive::Triangles,
        }
    }

    pub fn points(positions: Vec<Vec3>, colors: Vec<Vec3>, sizes: Vec<f32>) -> Self {
        Self {
            positions,
            morph_target: None,
            colors: Some(colors),
            sizes: Some(sizes),
            indices: None,
            primitive: Primitive::Points,
        }
    }

    pub fn with_morph_target(mut self, target: Vec<Vec3>) -> Self {
        self.morph_target = Some(target);
        self
    }

    /// Replaces triangles with their unique edges.
    pub fn wireframe(mut self) -> Self {
        if self.primitive != Primitive::Triangles {
            return self;
        }
        let Some(indices) = self.indices.take() else {
            return self;
        };
        let mut seen = HashSet::new();
        let mut lines = Vec::with_capacity(indices.len() * 2);
        for tri in indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                if seen.insert((a.min(b), a.max(b))) {
                    lines.extend([a, b]);
                }
            }
        }
        self.indices = Some(lines);
        self.primitive = Primitive::Lines;
        self
    }

    pub fn element_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or(self.positions.len(), Vec::len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    Basic { color: Vec3, opacity: f32 },
    /// Soft additive points displaced over time in the vertex stage.
    Particles { time: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles, applied in XYZ order.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub transform: Transform,
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn perspective(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            transform: Transform::default(),
            fov_deg,
            aspect,
            near,
            far,
        }
    }

    pub fn view(&self) -> Mat4 {
        self.transform.matrix().inverse()
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_deg.to_radians(), self.aspect, self.near, self.far)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    pub mesh: MeshHandle,
    pub model: Mat4,
    pub material: Material,
    pub morph: f32,
}

impl Draw {
    pub fn new(mesh: MeshHandle, transform: &Transform, material: Material) -> Self {
        Self {
            mesh,
            model: transform.matrix(),
            material,
            morph: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub camera: &'a Camera,
    pub draws: &'a [Draw],
}

/// The graphics backend one section draws through.
pub trait SceneHost {
    fn upload(&mut self, mesh: &Mesh) -> MeshHandle;
    /// CSS size of the drawing surface.
    fn set_size(&mut self, width: f32, height: f32);
    fn set_pixel_ratio(&mut self, ratio: f32);
    fn pixel_ratio(&self) -> f32;
    fn render(&mut self, frame: &Frame<'_>);
    fn dispose(&mut self) {}
}

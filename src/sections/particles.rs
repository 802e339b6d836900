use std::f32::consts::TAU;

use glam::Vec3;

use super::{QualityHandle, SectionKind, SectionRuntime, Stage};
use crate::geometry::hsl;
use crate::host::Viewport;
use crate::scene::{Draw, Material, Mesh, MeshHandle, Transform};

const PARTICLE_COUNT: usize = 5000;
const EXTENT: f32 = 50.0;

/// A cube of drifting points that spins a full turn over the region while
/// the camera dollies in.
pub struct ParticlesSection {
    stage: Stage,
    mesh: MeshHandle,
}

impl ParticlesSection {
    pub fn new(mut stage: Stage, seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut rand = |a: f32, b: f32| a + (b - a) * rng.f32();

        let mut positions = Vec::with_capacity(PARTICLE_COUNT);
        let mut colors = Vec::with_capacity(PARTICLE_COUNT);
        let mut sizes = Vec::with_capacity(PARTICLE_COUNT);
        for _ in 0..PARTICLE_COUNT {
            positions.push(Vec3::new(
                rand(-EXTENT, EXTENT),
                rand(-EXTENT, EXTENT),
                rand(-EXTENT, EXTENT),
            ));
            colors.push(hsl(rand(0.0, 1.0), 0.8, 0.6));
            sizes.push(rand(1.0, 3.0));
        }

        let mesh = stage.upload(&Mesh::points(positions, colors, sizes));
        Self { stage, mesh }
    }
}

impl SectionRuntime for ParticlesSection {
    fn kind(&self) -> SectionKind {
        SectionKind::Particles
    }

    fn update(&mut self, progress: f32) {
        let time = self.stage.elapsed();

        let camera = self.stage.camera();
        camera.transform.position.z = 30.0 - progress * 20.0;

        let transform = Transform {
            rotation: Vec3::new(progress * TAU, time * 0.1, 0.0),
            ..Transform::default()
        };
        let mesh = self.mesh;
        self.stage
            .begin()
            .push(Draw::new(mesh, &transform, Material::Particles { time }));
        self.stage.render();
    }

    fn resize(&mut self, viewport: Viewport) {
        self.stage.resize(viewport);
    }

    fn quality(&mut self) -> Option<&mut dyn QualityHandle> {
        Some(&mut self.stage)
    }

    fn dispose(&mut self) {
        self.stage.dispose();
    }
}

use glam::Vec3;

use super::{QualityHandle, SectionKind, SectionRuntime, Stage};
use crate::geometry::{hsl, sphere};
use crate::host::Viewport;
use crate::scene::{Draw, Material, MeshHandle, Transform};

const SPHERE_COUNT: usize = 50;

struct Orb {
    origin: Vec3,
    color: Vec3,
    speed: f32,
    amplitude: f32,
}

/// Field of translucent spheres bobbing in place; scrolling pushes them away
/// and tilts the camera down.
pub struct HeroSection {
    stage: Stage,
    mesh: MeshHandle,
    orbs: Vec<Orb>,
}

impl HeroSection {
    pub fn new(mut stage: Stage, seed: u64) -> Self {
        let mesh = stage.upload(&sphere(0.5, 32, 32));
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut rand = |a: f32, b: f32| a + (b - a) * rng.f32();

        let orbs = (0..SPHERE_COUNT)
            .map(|_| {
                let color = hsl(rand(0.0, 1.0), 0.7, 0.5);
                let origin = Vec3::new(rand(-20.0, 20.0), rand(-10.0, 10.0), rand(-20.0, 20.0));
                Orb {
                    origin,
                    color,
                    speed: rand(0.5, 2.0),
                    amplitude: rand(1.0, 3.0),
                }
            })
            .collect();

        Self { stage, mesh, orbs }
    }
}

impl SectionRuntime for HeroSection {
    fn kind(&self) -> SectionKind {
        SectionKind::Hero
    }

    fn update(&mut self, progress: f32) {
        let time = self.stage.elapsed();

        let camera = self.stage.camera();
        camera.transform.position.y = -progress * 5.0;
        camera.transform.rotation.x = progress * 0.1;

        let mesh = self.mesh;
        let draws = self.stage.begin();
        for (i, orb) in self.orbs.iter().enumerate() {
            let bob = (time * orb.speed + i as f32).sin() * orb.amplitude;
            let transform = Transform {
                position: Vec3::new(orb.origin.x, orb.origin.y + bob, orb.origin.z - progress * 10.0),
                rotation: Vec3::new(time * 0.5, time * 0.3, 0.0),
                ..Transform::default()
            };
            draws.push(Draw::new(
                mesh,
                &transform,
                Material::Basic {
                    color: orb.color,
                    opacity: 0.6,
                },
            ));
        }
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

use std::f32::consts::PI;

use glam::Vec3;

use super::{QualityHandle, SectionKind, SectionRuntime, Stage};
use crate::geometry::{dodecahedron, icosahedron, torus_knot};
use crate::host::Viewport;
use crate::scene::{Draw, Material, MeshHandle, Transform};

struct Solid {
    mesh: MeshHandle,
    x: f32,
    color: Vec3,
}

/// Three wireframe solids in a row, tumbling on their own and swaying with
/// scroll.
pub struct PolyhedraSection {
    stage: Stage,
    solids: Vec<Solid>,
}

impl PolyhedraSection {
    pub fn new(mut stage: Stage) -> Self {
        let solids = vec![
            Solid {
                mesh: stage.upload(&torus_knot(3.0, 1.0, 100, 16).wireframe()),
                x: -8.0,
                color: Vec3::new(0.0, 1.0, 1.0),
            },
            Solid {
                mesh: stage.upload(&icosahedron(3.0, 1).wireframe()),
                x: 0.0,
                color: Vec3::new(1.0, 0.0, 1.0),
            },
            Solid {
                mesh: stage.upload(&dodecahedron(3.0).wireframe()),
                x: 8.0,
                color: Vec3::new(1.0, 1.0, 0.0),
            },
        ];
        Self { stage, solids }
    }
}

impl SectionRuntime for PolyhedraSection {
    fn kind(&self) -> SectionKind {
        SectionKind::Polyhedra
    }

    fn update(&mut self, progress: f32) {
        let time = self.stage.elapsed();

        let camera = self.stage.camera();
        camera.transform.position.x = (progress * PI).sin() * 5.0;

        let draws = self.stage.begin();
        for (i, solid) in self.solids.iter().enumerate() {
            let k = i as f32 * 0.1;
            let transform = Transform {
                position: Vec3::new(solid.x, (progress * PI + i as f32).sin() * 3.0, 0.0),
                rotation: time * Vec3::new(0.5 + k, 0.3 + k, 0.2 + k),
                scale: Vec3::splat(1.0 + progress * 0.5),
            };
            draws.push(Draw::new(
                solid.mesh,
                &transform,
                Material::Basic {
                    color: solid.color,
                    opacity: 0.8,
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

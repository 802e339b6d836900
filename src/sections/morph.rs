use glam::Vec3;

use super::{QualityHandle, SectionKind, SectionRuntime, Stage};
use crate::geometry::{box_surface, sphere};
use crate::host::Viewport;
use crate::scene::{Draw, Material, MeshHandle, Transform};

const BOX_SIZE: f32 = 4.0;

/// Wire sphere breathing into a cube and back on its own clock.
pub struct MorphSection {
    stage: Stage,
    mesh: MeshHandle,
}

impl MorphSection {
    pub fn new(mut stage: Stage) -> Self {
        let base = sphere(3.0, 32, 32);
        let target = box_surface(&base.positions, BOX_SIZE);
        let mesh = stage.upload(&base.with_morph_target(target).wireframe());
        Self { stage, mesh }
    }

    /// Weight of the cube target at `time` seconds.
    pub fn influence(time: f32) -> f32 {
        ((time * 0.5).sin() + 1.0) * 0.5
    }
}

impl SectionRuntime for MorphSection {
    fn kind(&self) -> SectionKind {
        SectionKind::Morph
    }

    fn update(&mut self, progress: f32) {
        let time = self.stage.elapsed();

        let camera = self.stage.camera();
        camera.transform.position.y = progress * 5.0;

        let transform = Transform {
            rotation: Vec3::new(time * 0.3, time * 0.5, 0.0),
            scale: Vec3::splat(1.0 + progress * 0.5),
            ..Transform::default()
        };
        let mut draw = Draw::new(
            self.mesh,
            &transform,
            Material::Basic {
                color: Vec3::new(0.0, 1.0, 0.533),
                opacity: 0.9,
            },
        );
        draw.morph = Self::influence(time);
        self.stage.begin().push(draw);
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

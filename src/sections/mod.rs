//! Visual modules driven by scroll progress.
//!
//! Every section owns its scene state outright. Progress couples to camera
//! offset, displacement and scale; elapsed time independently drives idle
//! motion, and the two are summed rather than one overriding the other.

mod hero;
mod morph;
mod particles;
mod polyhedra;

use serde::{Deserialize, Serialize};

use crate::host::{Clock, Viewport};
use crate::scene::{Camera, Draw, Frame, Mesh, MeshHandle, SceneHost};

pub use hero::HeroSection;
pub use morph::MorphSection;
pub use particles::ParticlesSection;
pub use polyhedra::PolyhedraSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Hero,
    Particles,
    Polyhedra,
    Morph,
}

/// Render-quality knob a degrade policy may turn down.
pub trait QualityHandle {
    fn set_pixel_ratio(&mut self, ratio: f32);
    fn pixel_ratio(&self) -> f32;
}

pub trait SectionRuntime {
    fn kind(&self) -> SectionKind;

    /// Renders one frame. Output depends only on `progress`, the section's
    /// elapsed clock and the layout fixed at construction.
    fn update(&mut self, progress: f32);

    /// Recomputes projection for a new viewport without touching
    /// progress-driven state.
    fn resize(&mut self, viewport: Viewport);

    fn quality(&mut self) -> Option<&mut dyn QualityHandle> {
        None
    }

    fn dispose(&mut self) {}
}

#[derive(Debug, Clone, Copy)]
pub struct SectionOptions {
    pub seed: u64,
    pub max_pixel_ratio: f32,
}

pub fn build(
    kind: SectionKind,
    host: Box<dyn SceneHost>,
    clock: Clock,
    viewport: Viewport,
    options: SectionOptions,
) -> Box<dyn SectionRuntime> {
    let stage = |camera_z| Stage::new(host, clock, viewport, options.max_pixel_ratio, camera_z);
    match kind {
        SectionKind::Hero => Box::new(HeroSection::new(stage(15.0), options.seed)),
        SectionKind::Particles => Box::new(ParticlesSection::new(stage(30.0), options.seed)),
        SectionKind::Polyhedra => Box::new(PolyhedraSection::new(stage(15.0))),
        SectionKind::Morph => Box::new(MorphSection::new(stage(10.0))),
    }
}

/// Host, camera and clock shared by every section.
pub struct Stage {
    host: Box<dyn SceneHost>,
    camera: Camera,
    camera_home: Camera,
    clock: Clock,
    draws: Vec<Draw>,
}

impl Stage {
    pub fn new(
        mut host: Box<dyn SceneHost>,
        clock: Clock,
        viewport: Viewport,
        max_pixel_ratio: f32,
        camera_z: f32,
    ) -> Self {
        host.set_size(viewport.width as f32, viewport.height as f32);
        host.set_pixel_ratio((viewport.device_pixel_ratio as f32).min(max_pixel_ratio));

        let mut camera = Camera::perspective(75.0, viewport.aspect(), 0.1, 1000.0);
        camera.transform.position.z = camera_z;
        Self {
            host,
            camera,
            camera_home: camera,
            clock,
            draws: Vec::new(),
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    pub fn upload(&mut self, mesh: &Mesh) -> MeshHandle {
        self.host.upload(mesh)
    }

    /// Camera reset to its construction pose, for progress offsets to build on.
    pub fn camera(&mut self) -> &mut Camera {
        let aspect = self.camera.aspect;
        self.camera = Camera {
            aspect,
            ..self.camera_home
        };
        &mut self.camera
    }

    pub fn begin(&mut self) -> &mut Vec<Draw> {
        self.draws.clear();
        &mut self.draws
    }

    pub fn render(&mut self) {
        self.host.render(&Frame {
            camera: &self.camera,
            draws: &self.draws,
        });
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.camera.aspect = viewport.aspect();
        self.camera_home.aspect = self.camera.aspect;
        self.host.set_size(viewport.width as f32, viewport.height as f32);
    }

    pub fn dispose(&mut self) {
        self.draws.clear();
        self.host.dispose();
    }
}

impl QualityHandle for Stage {
    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.host.set_pixel_ratio(ratio);
    }

    fn pixel_ratio(&self) -> f32 {
        self.host.pixel_ratio()
    }
}

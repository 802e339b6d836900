mod common;

use std::rc::Rc;

use common::{ManualTime, RecordingHost};
use glam::Vec3;
use scrollviz_wasm::host::{Clock, Viewport};
use scrollviz_wasm::scene::{Material, Primitive};
use scrollviz_wasm::sections::{self, MorphSection, SectionKind, SectionOptions, SectionRuntime};

struct Rig {
    host: RecordingHost,
    time: Rc<ManualTime>,
    section: Box<dyn SectionRuntime>,
}

fn rig_with_seed(kind: SectionKind, seed: u64) -> Rig {
    let host = RecordingHost::default();
    let time = ManualTime::shared(0.0);
    let viewport = Viewport {
        width: 1280.0,
        height: 800.0,
        device_pixel_ratio: 3.0,
    };
    let section = sections::build(
        kind,
        Box::new(host.clone()),
        Clock::new(time.clone()),
        viewport,
        SectionOptions {
            seed,
            max_pixel_ratio: 2.0,
        },
    );
    Rig { host, time, section }
}

fn rig(kind: SectionKind) -> Rig {
    rig_with_seed(kind, 42)
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn each_section_draws_its_scene() {
    for (kind, draws) in [
        (SectionKind::Hero, 50),
        (SectionKind::Particles, 1),
        (SectionKind::Polyhedra, 3),
        (SectionKind::Morph, 1),
    ] {
        let mut r = rig(kind);
        assert_eq!(r.section.kind(), kind);
        assert!(r.host.0.borrow().frames.is_empty());
        r.section.update(0.0);
        assert_eq!(r.host.last_frame().1.len(), draws, "{kind:?}");
    }
}

#[test]
fn construction_sizes_the_surface_and_caps_pixel_ratio() {
    let mut r = rig(SectionKind::Hero);
    assert_eq!(r.host.0.borrow().size, (1280.0, 800.0));
    assert_eq!(r.host.0.borrow().pixel_ratio, 2.0);

    let quality = r.section.quality().expect("hero exposes quality");
    assert_eq!(quality.pixel_ratio(), 2.0);
    quality.set_pixel_ratio(1.0);
    assert_eq!(r.host.0.borrow().pixel_ratio, 1.0);
}

#[test]
fn same_seed_same_scene() {
    let mut a = rig_with_seed(SectionKind::Hero, 7);
    let mut b = rig_with_seed(SectionKind::Hero, 7);
    let mut c = rig_with_seed(SectionKind::Hero, 8);
    for r in [&mut a, &mut b, &mut c] {
        r.section.update(0.4);
    }
    assert_eq!(a.host.last_frame(), b.host.last_frame());
    assert_ne!(a.host.last_frame().1, c.host.last_frame().1);
}

#[test]
fn hero_progress_pushes_orbs_back_regardless_of_time() {
    let mut r = rig(SectionKind::Hero);
    let depth_shift = |r: &mut Rig| {
        r.section.update(0.0);
        let (_, rest) = r.host.last_frame();
        r.section.update(0.5);
        let (camera, pushed) = r.host.last_frame();
        assert!(close(camera.transform.position.y, -2.5));
        assert!(close(camera.transform.rotation.x, 0.05));
        rest.iter()
            .zip(&pushed)
            .map(|(a, b)| b.model.w_axis.z - a.model.w_axis.z)
            .collect::<Vec<_>>()
    };

    let at_start = depth_shift(&mut r);
    r.time.set(3_700.0);
    let later = depth_shift(&mut r);

    assert!(at_start.iter().chain(&later).all(|&dz| close(dz, -5.0)));
}

#[test]
fn hero_idle_motion_follows_the_clock() {
    let mut r = rig(SectionKind::Hero);
    r.section.update(0.2);
    let (_, before) = r.host.last_frame();
    r.time.set(1_000.0);
    r.section.update(0.2);
    let (_, after) = r.host.last_frame();
    assert_ne!(before, after);
}

#[test]
fn particles_dolly_in_and_spin() {
    let mut r = rig(SectionKind::Particles);
    {
        let log = r.host.0.borrow();
        assert_eq!(log.meshes.len(), 1);
        assert_eq!(log.meshes[0].primitive, Primitive::Points);
        assert_eq!(log.meshes[0].positions.len(), 5000);
        assert!(log.meshes[0]
            .positions
            .iter()
            .all(|p| p.abs().max_element() <= 50.0));
    }

    r.time.set(2_000.0);
    r.section.update(0.25);
    let (camera, draws) = r.host.last_frame();
    assert!(close(camera.transform.position.z, 25.0));
    assert_eq!(draws[0].material, Material::Particles { time: 2.0 });

    r.section.update(1.0);
    assert!(close(r.host.last_frame().0.transform.position.z, 10.0));
}

#[test]
fn polyhedra_sway_and_grow() {
    let mut r = rig(SectionKind::Polyhedra);
    assert!(r
        .host
        .0
        .borrow()
        .meshes
        .iter()
        .all(|m| m.primitive == Primitive::Lines));

    r.section.update(0.5);
    let (camera, draws) = r.host.last_frame();
    assert!(close(camera.transform.position.x, 5.0));
    let xs: Vec<f32> = draws.iter().map(|d| d.model.w_axis.x).collect();
    assert!(close(xs[0], -8.0) && close(xs[1], 0.0) && close(xs[2], 8.0));
    // No rotation at t = 0, so the basis carries the scale.
    assert!(draws.iter().all(|d| close(d.model.x_axis.x, 1.25)));
    assert!(close(draws[0].model.w_axis.y, 3.0));
}

#[test]
fn morph_influence_breathes_with_time() {
    assert!(close(MorphSection::influence(0.0), 0.5));
    assert!(close(MorphSection::influence(std::f32::consts::PI), 1.0));

    let mut r = rig(SectionKind::Morph);
    {
        let log = r.host.0.borrow();
        let mesh = &log.meshes[0];
        let target = mesh.morph_target.as_ref().expect("cube target");
        assert_eq!(target.len(), mesh.positions.len());
        assert!(target.iter().all(|p| close(p.abs().max_element(), 2.0)));
    }

    r.section.update(0.4);
    let (camera, draws) = r.host.last_frame();
    assert!(close(camera.transform.position.y, 2.0));
    assert!(close(draws[0].morph, 0.5));
    assert!(matches!(draws[0].material, Material::Basic { color, .. } if color == Vec3::new(0.0, 1.0, 0.533)));
}

#[test]
fn resize_only_changes_projection() {
    let mut r = rig(SectionKind::Polyhedra);
    r.section.update(0.3);
    let (camera, draws) = r.host.last_frame();

    r.section.resize(Viewport::new(640.0, 480.0));
    r.section.update(0.3);
    let (resized, redrawn) = r.host.last_frame();

    assert_eq!(r.host.0.borrow().size, (640.0, 480.0));
    assert!(close(resized.aspect, 640.0 / 480.0));
    assert_ne!(camera.projection(), resized.projection());
    assert_eq!(camera.transform, resized.transform);
    assert_eq!(draws, redrawn);
}

#[test]
fn camera_resets_between_updates() {
    let mut r = rig(SectionKind::Morph);
    r.section.update(1.0);
    r.section.update(0.0);
    let (camera, _) = r.host.last_frame();
    assert_eq!(camera.transform.position, Vec3::new(0.0, 0.0, 10.0));
}

#[test]
fn dispose_releases_the_host() {
    let mut r = rig(SectionKind::Particles);
    r.section.dispose();
    assert!(r.host.0.borrow().disposed);
}

mod common;

use common::{approx, FakeLayout, RecordingChrome, ScriptedSection};
use scrollviz_wasm::events::{EventKind, HostEvent};
use scrollviz_wasm::host::ElementRef;
use scrollviz_wasm::regions::RegionKind;
use scrollviz_wasm::reveal::Playback;
use scrollviz_wasm::scheduler::FrameScheduler;
use scrollviz_wasm::{Experience, ExperienceConfig, Runtime};

fn page() -> FakeLayout {
    FakeLayout::new(1280.0, 800.0)
        .with("hero", 0.0, 1000.0)
        .with("particles", 500.0, 1000.0)
        .with("geometry", 2000.0, 1000.0)
        .with("content", 1000.0, 200.0)
}

fn experience(layout: &FakeLayout, chrome: &RecordingChrome) -> Experience {
    let mut exp = Experience::new(
        ExperienceConfig::default(),
        Box::new(layout.clone()),
        Box::new(chrome.clone()),
    )
    .unwrap();
    exp.add_region(ElementRef::new("hero"), RegionKind::Primary);
    exp.add_region(ElementRef::new("particles"), RegionKind::Secondary);
    exp.add_region(ElementRef::new("geometry"), RegionKind::Secondary);
    exp
}

#[test]
fn arming_twice_is_refused() {
    let layout = page();
    let chrome = RecordingChrome::default();
    let mut exp = experience(&layout, &chrome);
    let mut scheduler = FrameScheduler::new();

    assert!(scheduler.start(&mut exp, 0.0));
    assert!(!scheduler.start(&mut exp, 5.0));
    assert!(scheduler.is_armed());
    assert!(scheduler.stop());
    assert!(!scheduler.stop());
    assert!(!scheduler.is_armed());
}

#[test]
fn tick_smooths_the_scroll_position() {
    let layout = page();
    let chrome = RecordingChrome::default();
    let mut exp = experience(&layout, &chrome);
    let mut scheduler = FrameScheduler::new();

    layout.scroll_to(100.0);
    exp.handle_scroll(100.0);
    scheduler.start(&mut exp, 0.0);
    scheduler.tick(&mut exp, 16.0);
    assert!(approx(exp.scroll().state().smoothed(), 10.0, 1e-9));
    scheduler.tick(&mut exp, 32.0);
    assert!(approx(exp.scroll().state().smoothed(), 19.0, 1e-9));
    assert_eq!(scheduler.frames(), 2);
}

#[test]
fn degrade_applies_once_to_sections_with_a_quality_handle() {
    let layout = page();
    let chrome = RecordingChrome::default();
    let mut exp = experience(&layout, &chrome);
    let hero = exp.regions().find("hero").unwrap();
    let particles = exp.regions().find("particles").unwrap();
    let (tunable, tunable_log) = ScriptedSection::new(true);
    let (fixed, fixed_log) = ScriptedSection::new(false);
    exp.attach_section(hero, tunable);
    exp.attach_section(particles, fixed);

    let mut scheduler = FrameScheduler::new();
    scheduler.start(&mut exp, 0.0);
    let mut degraded_at = Vec::new();
    for i in 0..=25 {
        let now = f64::from(i) * 100.0;
        if scheduler.tick(&mut exp, now).degraded {
            degraded_at.push(now);
        }
    }

    assert_eq!(degraded_at, vec![1000.0]);
    assert!(exp.is_degraded());
    assert_eq!(exp.perf().history().collect::<Vec<_>>(), vec![11, 10]);
    assert_eq!(tunable_log.borrow().pixel_ratio, 1.0);
    assert_eq!(fixed_log.borrow().pixel_ratio, 2.0);
}

#[test]
fn healthy_frame_rate_never_degrades() {
    let layout = page();
    let chrome = RecordingChrome::default();
    let mut exp = experience(&layout, &chrome);
    let mut scheduler = FrameScheduler::new();
    scheduler.start(&mut exp, 0.0);
    for i in 0..200 {
        assert!(!scheduler.tick(&mut exp, f64::from(i) * 16.0).degraded);
    }
    assert!(!exp.is_degraded());
    assert!(exp.perf().history().count() >= 2);
}

#[test]
fn ticks_do_not_redraw_sections() {
    let layout = page();
    let chrome = RecordingChrome::default();
    let mut exp = experience(&layout, &chrome);
    let hero = exp.regions().find("hero").unwrap();
    let (section, log) = ScriptedSection::new(true);
    exp.attach_section(hero, section);

    let mut scheduler = FrameScheduler::new();
    scheduler.start(&mut exp, 0.0);
    for i in 0..10 {
        scheduler.tick(&mut exp, f64::from(i) * 16.0);
    }
    assert!(log.borrow().progress.is_empty());

    exp.handle_scroll(0.0);
    assert_eq!(log.borrow().progress.len(), 1);
}

#[test]
fn prime_renders_only_primary_regions() {
    let layout = page();
    let chrome = RecordingChrome::default();
    let mut exp = experience(&layout, &chrome);
    let hero = exp.regions().find("hero").unwrap();
    let particles = exp.regions().find("particles").unwrap();
    let (hero_section, hero_log) = ScriptedSection::new(true);
    let (particle_section, particle_log) = ScriptedSection::new(true);
    exp.attach_section(hero, hero_section);
    exp.attach_section(particles, particle_section);

    exp.prime();
    // (vh - top) / (vh + height) with the hero at the top of the page.
    let primed = hero_log.borrow().progress.clone();
    assert_eq!(primed.len(), 1);
    assert!(approx(f64::from(primed[0]), 800.0 / 1800.0, 1e-6));
    assert!(particle_log.borrow().progress.is_empty());
    assert_eq!(chrome.0.borrow().highlights, vec!["hero".to_owned()]);
    assert_eq!(exp.current_section(), Some("hero"));

    layout.scroll_to(10.0);
    exp.handle_scroll(10.0);
    assert_eq!(hero_log.borrow().progress.len(), 2);
    assert_eq!(particle_log.borrow().progress.len(), 1);
}

#[test]
fn resize_forwards_the_viewport_and_redraws() {
    let layout = page();
    let chrome = RecordingChrome::default();
    let mut exp = experience(&layout, &chrome);
    let hero = exp.regions().find("hero").unwrap();
    let (section, log) = ScriptedSection::new(true);
    exp.attach_section(hero, section);

    layout.resize(640.0, 480.0);
    exp.handle_resize();
    let log = log.borrow();
    assert_eq!(log.resizes.len(), 1);
    assert_eq!(log.resizes[0].height, 480.0);
    assert_eq!(log.progress.len(), 1);
}

#[test]
fn reveal_timelines_advance_with_frame_time() {
    let layout = page();
    let chrome = RecordingChrome::default();
    let mut exp = experience(&layout, &chrome);
    exp.bind_reveal(ElementRef::new("content"));
    assert_eq!(chrome.0.borrow().styles.len(), 1);
    assert_eq!(chrome.0.borrow().styles[0].1.opacity, 0.0);

    exp.handle_scroll(0.0);
    layout.scroll_to(400.0);
    exp.handle_scroll(400.0);

    let mut scheduler = FrameScheduler::new();
    scheduler.start(&mut exp, 0.0);
    scheduler.tick(&mut exp, 0.0);
    scheduler.tick(&mut exp, 250.0);
    let position = exp.reveals().bindings()[0].timeline().position();
    assert!(approx(position, 0.25, 1e-9));
    assert_eq!(chrome.0.borrow().styles.len(), 2);

    // A stall is replaced by a nominal frame.
    scheduler.tick(&mut exp, 5000.0);
    let position = exp.reveals().bindings()[0].timeline().position();
    assert!(approx(position, 0.283, 1e-9));
}

#[test]
fn go_to_section_tweens_the_page() {
    let layout = page();
    let chrome = RecordingChrome::default();
    let mut exp = experience(&layout, &chrome);
    let mut scheduler = FrameScheduler::new();

    assert!(!exp.go_to_section("nowhere"));
    assert!(exp.go_to_section("geometry"));

    scheduler.start(&mut exp, 0.0);
    for now in [0.0, 500.0, 1000.0, 1100.0] {
        scheduler.tick(&mut exp, now);
    }
    let scrolls = chrome.0.borrow().scrolls.clone();
    assert_eq!(scrolls.len(), 3);
    assert!(approx(scrolls[0], 0.0, 1e-9));
    assert!(approx(scrolls[1], 1000.0, 1e-9));
    assert!(approx(scrolls[2], 2000.0, 1e-9));
}

#[test]
fn runtime_routes_host_events() {
    let layout = page();
    let chrome = RecordingChrome::default();
    let mut rt = Runtime::new(experience(&layout, &chrome));
    assert!(rt.subscriptions_mut().is_subscribed(EventKind::Scroll));

    layout.scroll_to(700.0);
    assert_eq!(rt.dispatch(HostEvent::Scroll { offset: 700.0 }), 1);
    assert_eq!(rt.experience.scroll().state().raw(), 700.0);
    assert_eq!(rt.experience.current_section(), Some("particles"));

    assert!(rt.start(0.0));
    rt.dispatch(HostEvent::Visibility {
        hidden: true,
        now_ms: 100.0,
    });
    assert!(!rt.scheduler.is_armed());
    rt.dispatch(HostEvent::Visibility {
        hidden: false,
        now_ms: 200.0,
    });
    assert!(rt.scheduler.is_armed());
}

#[test]
fn extra_subscribers_run_after_the_builtin_ones() {
    fn mark(rt: &mut Runtime, _: &HostEvent) {
        rt.stop();
    }

    let layout = page();
    let chrome = RecordingChrome::default();
    let mut rt = Runtime::new(experience(&layout, &chrome));
    rt.start(0.0);
    rt.subscriptions_mut().subscribe(EventKind::Resize, mark);
    assert_eq!(rt.dispatch(HostEvent::Resize), 2);
    assert!(!rt.scheduler.is_armed());
}

#[test]
fn resuming_discards_the_hidden_interval() {
    let layout = page();
    let chrome = RecordingChrome::default();
    let mut rt = Runtime::new(experience(&layout, &chrome));
    rt.start(0.0);
    for now in [0.0, 16.0, 32.0] {
        rt.tick(now);
    }
    rt.dispatch(HostEvent::Visibility {
        hidden: true,
        now_ms: 40.0,
    });
    rt.dispatch(HostEvent::Visibility {
        hidden: false,
        now_ms: 60_000.0,
    });
    let outcome = rt.tick(60_016.0);

    assert!(!outcome.degraded);
    assert_eq!(rt.experience.perf().history().count(), 0);
    assert!(!rt.experience.is_degraded());
}

#[test]
fn sections_attached_after_the_degrade_start_reduced() {
    let layout = page();
    let chrome = RecordingChrome::default();
    let mut exp = experience(&layout, &chrome);
    let mut scheduler = FrameScheduler::new();
    scheduler.start(&mut exp, 0.0);
    for i in 0..=10 {
        scheduler.tick(&mut exp, f64::from(i) * 100.0);
    }
    assert!(exp.is_degraded());

    let geometry = exp.regions().find("geometry").unwrap();
    let (tunable, tunable_log) = ScriptedSection::new(true);
    let (fixed, fixed_log) = ScriptedSection::new(false);
    exp.attach_section(geometry, tunable);
    exp.attach_section(geometry, fixed);
    assert_eq!(tunable_log.borrow().pixel_ratio, 1.0);
    assert_eq!(fixed_log.borrow().pixel_ratio, 2.0);
}

#[test]
fn resize_moves_the_highlight_to_the_region_under_the_line() {
    let layout = FakeLayout::new(1280.0, 800.0)
        .with("a", 0.0, 1000.0)
        .with("b", 1000.0, 1000.0);
    let chrome = RecordingChrome::default();
    let mut exp = Experience::new(
        ExperienceConfig::default(),
        Box::new(layout.clone()),
        Box::new(chrome.clone()),
    )
    .unwrap();
    exp.add_region(ElementRef::new("a"), RegionKind::Primary);
    exp.add_region(ElementRef::new("b"), RegionKind::Secondary);

    layout.scroll_to(550.0);
    exp.handle_scroll(550.0);
    assert_eq!(exp.current_section(), Some("a"));

    layout.resize(1280.0, 1200.0);
    exp.handle_resize();
    assert_eq!(exp.current_section(), Some("b"));
    assert_eq!(chrome.0.borrow().highlights.last().map(String::as_str), Some("b"));

    layout.scroll_to(560.0);
    exp.handle_scroll(560.0);
    assert_eq!(exp.current_section(), Some("b"));
}

#[test]
fn resize_plays_reveals_whose_start_dropped_below_the_offset() {
    let layout = page();
    let chrome = RecordingChrome::default();
    let mut exp = experience(&layout, &chrome);
    exp.bind_reveal(ElementRef::new("content"));
    layout.scroll_to(300.0);
    exp.prime();
    let playback = |exp: &Experience| exp.reveals().bindings()[0].timeline().playback();
    assert_eq!(playback(&exp), Playback::Paused);

    layout.resize(1280.0, 1000.0);
    exp.handle_resize();
    let (start, end) = exp.reveals().bindings()[0].window();
    assert!(approx(start, 200.0, 1e-9) && approx(end, 1000.0, 1e-9));
    assert_eq!(playback(&exp), Playback::Forward);

    layout.scroll_to(310.0);
    exp.handle_scroll(310.0);
    assert_eq!(playback(&exp), Playback::Forward);
}

//! The context object tying trackers, triggers and sections together.

use crate::config::ExperienceConfig;
use crate::error::Result;
use crate::host::{Chrome, ElementRef, Layout, Viewport};
use crate::perf::{PerformanceMonitor, PerformanceStats};
use crate::regions::{RegionId, RegionKind, RegionTriggerSet};
use crate::reveal::RevealSet;
use crate::scroll::{ScrollAnimation, ScrollTracker};
use crate::sections::{SectionKind, SectionRuntime};

struct SectionSlot {
    region: RegionId,
    runtime: Box<dyn SectionRuntime>,
}

pub struct Experience {
    config: ExperienceConfig,
    layout: Box<dyn Layout>,
    chrome: Box<dyn Chrome>,
    scroll: ScrollTracker,
    perf: PerformanceMonitor,
    regions: RegionTriggerSet,
    reveals: RevealSet,
    sections: Vec<SectionSlot>,
    scroll_to: Option<ScrollAnimation>,
    degraded: bool,
}

impl Experience {
    pub fn new(config: ExperienceConfig, layout: Box<dyn Layout>, chrome: Box<dyn Chrome>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scroll: ScrollTracker::new(config.ease),
            perf: PerformanceMonitor::new(
                config.fps_history_capacity,
                config.degrade_threshold_fps,
                config.fps_window_ms,
            ),
            regions: RegionTriggerSet::new(config.activation_line),
            reveals: RevealSet::new(config.reveal_window, config.reveal_duration_s),
            sections: Vec::new(),
            scroll_to: None,
            degraded: false,
            layout,
            chrome,
            config,
        })
    }

    pub fn config(&self) -> &ExperienceConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.layout.viewport()
    }

    pub fn scroll(&self) -> &ScrollTracker {
        &self.scroll
    }

    pub fn perf(&self) -> &PerformanceMonitor {
        &self.perf
    }

    pub fn regions(&self) -> &RegionTriggerSet {
        &self.regions
    }

    pub fn reveals(&self) -> &RevealSet {
        &self.reveals
    }

    /// Registers a region, or returns the existing one for the same element.
    pub fn add_region(&mut self, element: ElementRef, kind: RegionKind) -> RegionId {
        match self.regions.find(element.as_str()) {
            Some(id) => id,
            None => self.regions.add(element, kind),
        }
    }

    /// Sections attached after the degrade start at the reduced pixel ratio.
    pub fn attach_section(&mut self, region: RegionId, mut runtime: Box<dyn SectionRuntime>) {
        log::info!("section {:?} attached", runtime.kind());
        if self.degraded {
            if let Some(quality) = runtime.quality() {
                quality.set_pixel_ratio(self.config.degraded_pixel_ratio);
            }
        }
        self.sections.push(SectionSlot { region, runtime });
    }

    pub fn section_kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.runtime.kind()).collect()
    }

    pub fn bind_reveal(&mut self, element: ElementRef) {
        let style = self.reveals.bind(element.clone());
        self.chrome.style_reveal(&element, style);
    }

    /// Startup pass: adopts the current offset, runs the discrete triggers
    /// and renders primary-region sections once.
    pub fn prime(&mut self) {
        let offset = self.layout.scroll_offset();
        self.scroll.observe(offset);
        self.run_discrete_triggers(offset);
        self.dispatch_progress(Some(RegionKind::Primary));
    }

    pub fn handle_scroll(&mut self, offset: f64) {
        self.scroll.observe(offset);
        self.run_discrete_triggers(offset);
        self.dispatch_progress(None);
    }

    /// Re-runs the discrete triggers against the new geometry, then resizes
    /// and redraws the sections.
    pub fn handle_resize(&mut self) {
        let offset = self.layout.scroll_offset();
        if let Some(id) = self.regions.refresh(offset, self.layout.as_ref()) {
            if let Some(region) = self.regions.get(id) {
                self.chrome.highlight(region.element().as_str());
            }
        }
        self.reveals.refresh(offset, self.layout.as_ref());

        let viewport = self.layout.viewport();
        for slot in &mut self.sections {
            slot.runtime.resize(viewport);
        }
        self.dispatch_progress(None);
    }

    fn run_discrete_triggers(&mut self, offset: f64) {
        if let Some(id) = self.regions.evaluate(offset, self.layout.as_ref()) {
            if let Some(region) = self.regions.get(id) {
                self.chrome.highlight(region.element().as_str());
            }
        }
        self.reveals.evaluate(offset, self.layout.as_ref());
    }

    /// Pushes progress into every section whose region window contains the
    /// current offset, optionally restricted to one region kind.
    fn dispatch_progress(&mut self, only: Option<RegionKind>) {
        let samples = self.regions.continuous(self.layout.as_ref(), &self.scroll);
        for slot in &mut self.sections {
            let kind = self.regions.get(slot.region).map(|r| r.kind());
            if only.is_some() && kind != only {
                continue;
            }
            if let Some(&(_, progress)) = samples.iter().find(|(id, _)| *id == slot.region) {
                slot.runtime.update(progress);
            }
        }
    }

    /// Starts a tween toward the top of the named region. Unknown or
    /// detached regions are ignored.
    pub fn go_to_section(&mut self, id: &str) -> bool {
        let Some(bounds) = self.layout.bounds(&ElementRef::new(id)) else {
            log::warn!("go_to_section: `{id}` not on the page");
            return false;
        };
        let from = self.layout.scroll_offset();
        let to = bounds.document_top(from);
        self.scroll_to = Some(ScrollAnimation::new(from, to, self.config.scroll_to_duration_s));
        true
    }

    pub fn current_section(&self) -> Option<&str> {
        let id = self.regions.active()?;
        self.regions.get(id).map(|r| r.element().as_str())
    }

    pub fn performance_stats(&self) -> PerformanceStats {
        self.perf.stats()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub(crate) fn sample_frame(&mut self, now_ms: f64) {
        self.perf.tick(now_ms);
        self.scroll.tick();
    }

    pub(crate) fn resume_sampling(&mut self, now_ms: f64) {
        self.perf.resume(now_ms);
    }

    /// Lowers every section's pixel ratio the first time the average frame
    /// rate falls below threshold. The flag never resets.
    pub(crate) fn apply_degrade(&mut self) -> bool {
        if self.degraded || !self.perf.should_degrade() {
            return false;
        }
        let ratio = self.config.degraded_pixel_ratio;
        let mut touched = 0;
        for slot in &mut self.sections {
            if let Some(quality) = slot.runtime.quality() {
                quality.set_pixel_ratio(ratio);
                touched += 1;
            }
        }
        self.degraded = true;
        log::warn!(
            "average fps {:.1} below {}; pixel ratio capped at {ratio} on {touched} section(s)",
            self.perf.average_fps(),
            self.config.degrade_threshold_fps,
        );
        true
    }

    pub(crate) fn advance_animations(&mut self, dt_s: f64) {
        for (element, style) in self.reveals.advance(dt_s) {
            self.chrome.style_reveal(&element, style);
        }
        if let Some(animation) = &mut self.scroll_to {
            let offset = animation.advance(dt_s);
            self.chrome.scroll_to(offset);
            if animation.is_finished() {
                self.scroll_to = None;
            }
        }
    }

    pub fn dispose(&mut self) {
        for slot in &mut self.sections {
            slot.runtime.dispose();
        }
        self.sections.clear();
        self.scroll_to = None;
    }
}

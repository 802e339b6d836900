//! Scroll-gated content reveals backed by interruptible timelines.

use crate::config::RevealWindow;
use crate::easing::power2_out;
use crate::host::{Bounds, ElementRef, Layout};

/// Vertical offset of a fully hidden block, in CSS pixels.
pub const HIDDEN_OFFSET_PX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Paused,
    Forward,
    Reverse,
}

/// A linear position in `[0, 1]` travelling toward one of its ends.
///
/// Changing direction keeps the current position, so an interrupted reverse
/// resumes forward from wherever it stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    position: f64,
    duration_s: f64,
    playback: Playback,
}

impl Timeline {
    pub fn new(duration_s: f64) -> Self {
        Self {
            position: 0.0,
            duration_s,
            playback: Playback::Paused,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn seek(&mut self, position: f64) {
        self.position = position.clamp(0.0, 1.0);
    }

    pub fn play(&mut self) {
        self.playback = if self.position < 1.0 {
            Playback::Forward
        } else {
            Playback::Paused
        };
    }

    pub fn reverse(&mut self) {
        self.playback = if self.position > 0.0 {
            Playback::Reverse
        } else {
            Playback::Paused
        };
    }

    /// Moves the position by `dt_s`; returns whether it changed.
    pub fn advance(&mut self, dt_s: f64) -> bool {
        // A non-positive duration completes in one step.
        let step = if self.duration_s > 0.0 {
            dt_s / self.duration_s
        } else {
            1.0
        };
        let target = match self.playback {
            Playback::Paused => return false,
            Playback::Forward => (self.position + step).min(1.0),
            Playback::Reverse => (self.position - step).max(0.0),
        };
        let moved = target != self.position;
        self.position = target;
        let at_end = match self.playback {
            Playback::Forward => self.position >= 1.0,
            _ => self.position <= 0.0,
        };
        if at_end {
            self.playback = Playback::Paused;
        }
        moved
    }

    pub fn eased(&self) -> f64 {
        power2_out(self.position)
    }
}

/// Style the host applies to a reveal element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealStyle {
    pub translate_y: f64,
    pub opacity: f64,
}

impl RevealStyle {
    pub fn at(eased: f64) -> Self {
        Self {
            translate_y: HIDDEN_OFFSET_PX * (1.0 - eased),
            opacity: eased,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RevealBinding {
    element: ElementRef,
    window_start: f64,
    window_end: f64,
    timeline: Timeline,
}

impl RevealBinding {
    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    /// Activation window in document coordinates, as of the last evaluation.
    pub fn window(&self) -> (f64, f64) {
        (self.window_start, self.window_end)
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    pub fn style(&self) -> RevealStyle {
        RevealStyle::at(self.timeline.eased())
    }
}

#[derive(Debug, Clone)]
pub struct RevealSet {
    bindings: Vec<RevealBinding>,
    window: RevealWindow,
    duration_s: f64,
    last_offset: Option<f64>,
}

impl RevealSet {
    pub fn new(window: RevealWindow, duration_s: f64) -> Self {
        Self {
            bindings: Vec::new(),
            window,
            duration_s,
            last_offset: None,
        }
    }

    /// Binds a block in its hidden state and returns that initial style.
    pub fn bind(&mut self, element: ElementRef) -> RevealStyle {
        let binding = RevealBinding {
            element,
            window_start: f64::NAN,
            window_end: f64::NAN,
            timeline: Timeline::new(self.duration_s),
        };
        let style = binding.style();
        self.bindings.push(binding);
        style
    }

    pub fn bindings(&self) -> &[RevealBinding] {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut [RevealBinding] {
        &mut self.bindings
    }

    fn window_for(&self, bounds: Bounds, offset: f64, viewport_height: f64) -> (f64, f64) {
        let top = bounds.document_top(offset);
        (
            top - self.window.start * viewport_height,
            top + bounds.height - self.window.end * viewport_height,
        )
    }

    /// Plays blocks whose window start was crossed going forward and reverses
    /// those whose window start was crossed going backward.
    pub fn evaluate(&mut self, offset: f64, layout: &dyn Layout) {
        let previous = self.last_offset.replace(offset).unwrap_or(f64::NEG_INFINITY);
        if previous == offset {
            return;
        }
        let viewport_height = layout.viewport().height;
        for i in 0..self.bindings.len() {
            let Some(bounds) = layout.bounds(&self.bindings[i].element) else {
                continue;
            };
            let (start, end) = self.window_for(bounds, offset, viewport_height);
            let binding = &mut self.bindings[i];
            binding.window_start = start;
            binding.window_end = end;

            if previous < start && offset >= start {
                log::debug!("reveal `{}` play from {:.2}", binding.element, binding.timeline.position);
                binding.timeline.play();
            } else if previous >= start && offset < start {
                log::debug!("reveal `{}` reverse from {:.2}", binding.element, binding.timeline.position);
                binding.timeline.reverse();
            }
        }
    }

    /// Recomputes every window at `offset` and sets each timeline's direction
    /// from which side of its start the offset now lies on.
    pub fn refresh(&mut self, offset: f64, layout: &dyn Layout) {
        self.last_offset = Some(offset);
        let viewport_height = layout.viewport().height;
        for i in 0..self.bindings.len() {
            let Some(bounds) = layout.bounds(&self.bindings[i].element) else {
                continue;
            };
            let (start, end) = self.window_for(bounds, offset, viewport_height);
            let binding = &mut self.bindings[i];
            binding.window_start = start;
            binding.window_end = end;
            if offset >= start {
                binding.timeline.play();
            } else {
                binding.timeline.reverse();
            }
        }
    }

    /// Advances every timeline and returns the styles that changed.
    pub fn advance(&mut self, dt_s: f64) -> Vec<(ElementRef, RevealStyle)> {
        self.bindings
            .iter_mut()
            .filter_map(|b| b.timeline.advance(dt_s).then(|| (b.element.clone(), b.style())))
            .collect()
    }
}

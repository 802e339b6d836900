//! Smoothed scroll position and per-region progress.

use crate::easing::{lerp, power2_in_out};
use crate::host::Bounds;

/// Raw and smoothed scroll offsets.
///
/// `smoothed` only ever moves by exponential approach toward `raw`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    raw: f64,
    smoothed: f64,
    ease: f64,
}

impl ScrollState {
    pub fn raw(&self) -> f64 {
        self.raw
    }

    pub fn smoothed(&self) -> f64 {
        self.smoothed
    }

    pub fn ease(&self) -> f64 {
        self.ease
    }
}

#[derive(Debug, Clone)]
pub struct ScrollTracker {
    state: ScrollState,
}

impl ScrollTracker {
    pub fn new(ease: f64) -> Self {
        Self {
            state: ScrollState {
                raw: 0.0,
                smoothed: 0.0,
                ease,
            },
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Records the latest offset observed by the host.
    pub fn observe(&mut self, raw: f64) {
        self.state.raw = raw;
    }

    /// One smoothing step, run once per frame.
    pub fn tick(&mut self) {
        let s = &mut self.state;
        s.smoothed = lerp(s.smoothed, s.raw, s.ease);
    }

    /// Normalised position of the smoothed scroll within a region's window.
    ///
    /// `bounds.top` comes from live layout while the fraction uses the lagged
    /// smoothed offset; the mismatch is what gives sections their inertia.
    pub fn progress_of(&self, bounds: Bounds, viewport_height: f64) -> f32 {
        let smoothed = self.state.smoothed;
        let element_top = bounds.top + smoothed;
        let start = element_top - viewport_height;
        let end = element_top + bounds.height;
        let span = end - start;
        if !(span > 0.0) {
            return 0.0;
        }
        let progress = ((smoothed - start) / span).clamp(0.0, 1.0);
        if progress.is_nan() {
            0.0
        } else {
            progress as f32
        }
    }
}

/// Programmatic scroll from one offset to another over a fixed duration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollAnimation {
    from: f64,
    to: f64,
    elapsed_s: f64,
    duration_s: f64,
}

impl ScrollAnimation {
    pub fn new(from: f64, to: f64, duration_s: f64) -> Self {
        Self {
            from,
            to,
            elapsed_s: 0.0,
            duration_s,
        }
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_s >= self.duration_s
    }

    /// Steps the animation and returns the offset to scroll to.
    pub fn advance(&mut self, dt_s: f64) -> f64 {
        self.elapsed_s = (self.elapsed_s + dt_s).min(self.duration_s);
        let fraction = if self.duration_s > 0.0 {
            self.elapsed_s / self.duration_s
        } else {
            1.0
        };
        lerp(self.from, self.to, power2_in_out(fraction))
    }
}

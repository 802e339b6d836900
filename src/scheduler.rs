//! Per-frame tick with an explicit armed flag.
//!
//! The host drives `tick` from its display-refresh callback and consults
//! `is_armed` before requesting the next one, so at most one loop runs.

use crate::experience::Experience;

/// Frame deltas above this are treated as a stall rather than motion.
const LAG_THRESHOLD_MS: f64 = 500.0;
const LAG_SUBSTITUTE_MS: f64 = 33.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Set on the one tick that applied the quality reduction.
    pub degraded: bool,
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    armed: bool,
    last_tick_ms: Option<f64>,
    frames: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Arms the loop. Returns `false`, changing nothing, if already armed.
    pub fn start(&mut self, ctx: &mut Experience, now_ms: f64) -> bool {
        if self.armed {
            log::debug!("scheduler already armed");
            return false;
        }
        self.armed = true;
        self.last_tick_ms = None;
        ctx.resume_sampling(now_ms);
        log::debug!("scheduler armed");
        true
    }

    /// Disarms the loop. Returns `false` if it was not armed.
    pub fn stop(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        self.armed = false;
        log::debug!("scheduler disarmed after {} frames", self.frames);
        true
    }

    /// One frame: sample performance, smooth the scroll position, evaluate
    /// the degrade policy, then step the time-based animations. Sections are
    /// not redrawn here; they render from scroll events.
    pub fn tick(&mut self, ctx: &mut Experience, now_ms: f64) -> TickOutcome {
        ctx.sample_frame(now_ms);
        let degraded = ctx.apply_degrade();

        let dt_ms = match self.last_tick_ms.replace(now_ms) {
            None => 0.0,
            Some(last) if now_ms - last > LAG_THRESHOLD_MS => LAG_SUBSTITUTE_MS,
            Some(last) => (now_ms - last).max(0.0),
        };
        ctx.advance_animations(dt_ms / 1000.0);

        self.frames += 1;
        TickOutcome { degraded }
    }
}

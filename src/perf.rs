//! Frame-rate sampling and the degrade decision.

use std::collections::VecDeque;

use serde::Serialize;

/// Frame rate assumed before the first sample lands.
pub const OPTIMISTIC_FPS: f64 = 60.0;

#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    frames: u32,
    window_started_ms: Option<f64>,
    window_ms: f64,
    fps: u32,
    history: VecDeque<u32>,
    capacity: usize,
    threshold_fps: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub fps: u32,
    pub average_fps: f64,
}

impl PerformanceMonitor {
    pub fn new(capacity: usize, threshold_fps: f64, window_ms: f64) -> Self {
        Self {
            frames: 0,
            window_started_ms: None,
            window_ms,
            fps: 0,
            history: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            threshold_fps,
        }
    }

    /// Counts one frame and flushes a sample once the window has elapsed.
    pub fn tick(&mut self, now_ms: f64) {
        let started = *self.window_started_ms.get_or_insert(now_ms);
        self.frames += 1;

        let elapsed = now_ms - started;
        if elapsed >= self.window_ms {
            self.fps = (f64::from(self.frames) * 1000.0 / elapsed).round() as u32;
            self.record(self.fps);
            self.frames = 0;
            self.window_started_ms = Some(now_ms);
        }
    }

    /// Appends a sample, evicting the oldest beyond capacity.
    pub fn record(&mut self, fps: u32) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(fps);
        log::debug!("fps sample {fps}, average {:.1}", self.average_fps());
    }

    /// Restarts the current window so a paused interval is not sampled.
    pub fn resume(&mut self, now_ms: f64) {
        self.frames = 0;
        self.window_started_ms = Some(now_ms);
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn history(&self) -> impl Iterator<Item = u32> + '_ {
        self.history.iter().copied()
    }

    pub fn average_fps(&self) -> f64 {
        if self.history.is_empty() {
            return OPTIMISTIC_FPS;
        }
        let sum: u64 = self.history.iter().map(|&f| u64::from(f)).sum();
        sum as f64 / self.history.len() as f64
    }

    /// Pure read; applying the degrade is up to the caller.
    pub fn should_degrade(&self) -> bool {
        self.average_fps() < self.threshold_fps
    }

    pub fn stats(&self) -> PerformanceStats {
        PerformanceStats {
            fps: self.fps,
            average_fps: self.average_fps(),
        }
    }
}

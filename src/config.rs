//! Recognised options for the scroll experience.
//!
//! Every field has a default so a bootstrap may pass `{}` (or nothing at all)
//! and only override what it needs.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::regions::RegionKind;
use crate::sections::SectionKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceConfig {
    /// Smoothing factor applied to the scroll position every frame.
    pub ease: f64,
    pub fps_history_capacity: usize,
    pub degrade_threshold_fps: f64,
    /// Wall-clock length of one fps sample.
    pub fps_window_ms: f64,
    pub max_pixel_ratio: f32,
    pub degraded_pixel_ratio: f32,
    pub reveal_window: RevealWindow,
    /// Highlight line, as a fraction of the viewport height from its top.
    pub activation_line: f64,
    pub reveal_duration_s: f64,
    pub scroll_to_duration_s: f64,
    pub seed: u64,
    pub log_level: String,
    pub regions: Vec<RegionConfig>,
    pub highlight_selector: String,
    pub reveal_selector: String,
    pub nav_selector: String,
}

/// Activation window of a reveal binding. `start` is the viewport line the
/// element top must reach, `end` the line its bottom must reach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealWindow {
    pub start: f64,
    pub end: f64,
}

impl Default for RevealWindow {
    fn default() -> Self {
        Self { start: 0.8, end: 0.2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub id: String,
    #[serde(default)]
    pub kind: RegionKind,
    #[serde(default)]
    pub canvas: Option<String>,
    #[serde(default)]
    pub section: Option<SectionKind>,
}

impl RegionConfig {
    fn with_section(id: &str, kind: RegionKind, canvas: &str, section: SectionKind) -> Self {
        Self {
            id: id.to_owned(),
            kind,
            canvas: Some(canvas.to_owned()),
            section: Some(section),
        }
    }
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            ease: 0.1,
            fps_history_capacity: 60,
            degrade_threshold_fps: 30.0,
            fps_window_ms: 1000.0,
            max_pixel_ratio: 2.0,
            degraded_pixel_ratio: 1.0,
            reveal_window: RevealWindow::default(),
            activation_line: 0.5,
            reveal_duration_s: 1.0,
            scroll_to_duration_s: 1.0,
            seed: 0x5eed_c0de,
            log_level: "info".to_owned(),
            regions: vec![
                RegionConfig::with_section("hero", RegionKind::Primary, "hero-canvas", SectionKind::Hero),
                RegionConfig::with_section(
                    "particles",
                    RegionKind::Secondary,
                    "particles-canvas",
                    SectionKind::Particles,
                ),
                RegionConfig::with_section(
                    "geometry",
                    RegionKind::Secondary,
                    "geometry-canvas",
                    SectionKind::Polyhedra,
                ),
                RegionConfig::with_section(
                    "morphing",
                    RegionKind::Secondary,
                    "morphing-canvas",
                    SectionKind::Morph,
                ),
            ],
            highlight_selector: ".section".to_owned(),
            reveal_selector: ".section-content".to_owned(),
            nav_selector: ".nav-link".to_owned(),
        }
    }
}

impl ExperienceConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.ease > 0.0 && self.ease < 1.0) {
            return Err(Error::Ease(self.ease));
        }
        if self.fps_history_capacity == 0 {
            return Err(Error::HistoryCapacity);
        }
        positive("degrade_threshold_fps", self.degrade_threshold_fps)?;
        positive("fps_window_ms", self.fps_window_ms)?;
        positive("max_pixel_ratio", f64::from(self.max_pixel_ratio))?;
        positive("degraded_pixel_ratio", f64::from(self.degraded_pixel_ratio))?;
        positive("reveal_duration_s", self.reveal_duration_s)?;
        positive("scroll_to_duration_s", self.scroll_to_duration_s)?;
        for fraction in [self.reveal_window.start, self.reveal_window.end, self.activation_line] {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(Error::WindowFraction(fraction));
            }
        }
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<log::Level> {
        self.log_level
            .parse()
            .map_err(|_| Error::LogLevel(self.log_level.clone()))
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::NonPositive { field, value })
    }
}

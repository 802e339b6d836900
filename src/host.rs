//! Boundary between the core and the page hosting it.
//!
//! The wasm build implements these traits over `web-sys`; tests implement them
//! over plain structs so the whole engine runs without a browser.

use std::fmt;
use std::rc::Rc;

use crate::reveal::RevealStyle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio: 1.0,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            (self.width / self.height) as f32
        } else {
            1.0
        }
    }
}

/// Live element geometry. `top` is relative to the viewport, the way a
/// bounding client rect reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    /// Top edge in document coordinates for the given scroll offset.
    pub fn document_top(&self, scroll_offset: f64) -> f64 {
        self.top + scroll_offset
    }
}

/// Opaque key the host resolves to one element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait Layout {
    fn viewport(&self) -> Viewport;
    fn scroll_offset(&self) -> f64;
    /// `None` when the element is not (or no longer) on the page.
    fn bounds(&self, element: &ElementRef) -> Option<Bounds>;
}

/// Page chrome the core drives but does not own.
pub trait Chrome {
    /// Marks the navigation entry for `region` as the only highlighted one.
    fn highlight(&mut self, region: &str);
    fn style_reveal(&mut self, element: &ElementRef, style: RevealStyle);
    fn scroll_to(&mut self, offset: f64);
}

pub trait TimeSource {
    fn now_ms(&self) -> f64;
}

/// Seconds elapsed since construction, read from a shared time source.
#[derive(Clone)]
pub struct Clock {
    source: Rc<dyn TimeSource>,
    started_ms: f64,
}

impl Clock {
    pub fn new(source: Rc<dyn TimeSource>) -> Self {
        let started_ms = source.now_ms();
        Self { source, started_ms }
    }

    pub fn elapsed(&self) -> f32 {
        ((self.source.now_ms() - self.started_ms) / 1000.0).max(0.0) as f32
    }
}

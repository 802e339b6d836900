//! Scroll-bound regions and the single-active highlight state machine.

use serde::{Deserialize, Serialize};

use crate::host::{Bounds, ElementRef, Layout};
use crate::scroll::ScrollTracker;

/// Boundary convention of a region.
///
/// Both kinds share the same progress window; a primary region is expected
/// to be on screen at load and is rendered once before any scroll arrives,
/// a secondary one is entered from below.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Primary,
    #[default]
    Secondary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    fn between(from: f64, to: f64) -> Option<Self> {
        if to > from {
            Some(Direction::Forward)
        } else if to < from {
            Some(Direction::Backward)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(usize);

impl RegionId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Region {
    element: ElementRef,
    kind: RegionKind,
    active: bool,
    last_direction: Direction,
}

impl Region {
    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Direction of the crossing that last activated this region.
    pub fn last_direction(&self) -> Direction {
        self.last_direction
    }
}

#[derive(Debug, Clone)]
pub struct RegionTriggerSet {
    regions: Vec<Region>,
    active: Option<RegionId>,
    last_offset: Option<f64>,
    activation_line: f64,
}

impl RegionTriggerSet {
    pub fn new(activation_line: f64) -> Self {
        Self {
            regions: Vec::new(),
            active: None,
            last_offset: None,
            activation_line,
        }
    }

    pub fn add(&mut self, element: ElementRef, kind: RegionKind) -> RegionId {
        let id = RegionId(self.regions.len());
        self.regions.push(Region {
            element,
            kind,
            active: false,
            last_direction: Direction::Forward,
        });
        id
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0)
    }

    pub fn find(&self, key: &str) -> Option<RegionId> {
        self.regions
            .iter()
            .position(|r| r.element.as_str() == key)
            .map(RegionId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.regions.iter().enumerate().map(|(i, r)| (RegionId(i), r))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn active(&self) -> Option<RegionId> {
        self.active
    }

    /// Runs the highlight trigger for a newly observed scroll offset.
    ///
    /// The highlight line (`activation_line` of the viewport height) entering
    /// a region's top while scrolling forward, or its bottom while scrolling
    /// backward, activates that region and deactivates every other one. When
    /// one jump crosses several regions the last crossed in the direction of
    /// travel wins. Returns the newly active region when the highlight moved.
    pub fn evaluate(&mut self, offset: f64, layout: &dyn Layout) -> Option<RegionId> {
        let previous = self.last_offset.replace(offset).unwrap_or(f64::NEG_INFINITY);
        let direction = Direction::between(previous, offset)?;

        let line = self.activation_line * layout.viewport().height;
        let (prev_line, line_now) = (previous + line, offset + line);

        let mut crossed: Vec<(f64, usize)> = self
            .regions
            .iter()
            .enumerate()
            .filter_map(|(i, region)| {
                let bounds = layout.bounds(&region.element)?;
                let top = bounds.document_top(offset);
                let bottom = top + bounds.height;
                match direction {
                    Direction::Forward if prev_line < top && line_now >= top => Some((top, i)),
                    Direction::Backward if prev_line > bottom && line_now <= bottom => {
                        Some((bottom, i))
                    }
                    _ => None,
                }
            })
            .collect();

        match direction {
            Direction::Forward => crossed.sort_by(|a, b| a.0.total_cmp(&b.0)),
            Direction::Backward => crossed.sort_by(|a, b| b.0.total_cmp(&a.0)),
        }
        let &(_, winner) = crossed.last()?;

        for &(_, i) in &crossed {
            self.regions[i].last_direction = direction;
        }
        let changed = self.active != Some(RegionId(winner));
        self.activate(RegionId(winner));
        if changed {
            log::debug!(
                "region `{}` entered ({direction:?})",
                self.regions[winner].element
            );
            Some(RegionId(winner))
        } else {
            None
        }
    }

    /// Re-derives the highlight from current geometry at a fixed offset.
    ///
    /// Layout changes move the line or the regions without any crossing, so
    /// the region now under the line is entered directly. Returns it when the
    /// highlight moved; keeps the current one when the line is over no region.
    pub fn refresh(&mut self, offset: f64, layout: &dyn Layout) -> Option<RegionId> {
        self.last_offset = Some(offset);
        let line = offset + self.activation_line * layout.viewport().height;
        let index = self.regions.iter().position(|region| {
            layout.bounds(&region.element).is_some_and(|bounds| {
                let top = bounds.document_top(offset);
                line >= top && line < top + bounds.height
            })
        })?;
        let id = RegionId(index);
        if self.active == Some(id) {
            return None;
        }
        self.activate(id);
        log::debug!("region `{}` entered on refresh", self.regions[index].element);
        Some(id)
    }

    fn activate(&mut self, id: RegionId) {
        for (i, region) in self.regions.iter_mut().enumerate() {
            region.active = i == id.0;
        }
        self.active = Some(id);
    }

    /// Progress samples for every region whose window contains the current
    /// scroll offset. A region is in its window while any part of it
    /// intersects the viewport.
    pub fn continuous(&self, layout: &dyn Layout, tracker: &ScrollTracker) -> Vec<(RegionId, f32)> {
        let viewport_height = layout.viewport().height;
        self.iter()
            .filter_map(|(id, region)| {
                let bounds = layout.bounds(&region.element)?;
                in_window(bounds, viewport_height)
                    .then(|| (id, tracker.progress_of(bounds, viewport_height)))
            })
            .collect()
    }
}

/// `offset ∈ [top - viewport_height, top + height]` with `top` in document
/// coordinates, expressed on viewport-relative bounds.
pub fn in_window(bounds: Bounds, viewport_height: f64) -> bool {
    bounds.top <= viewport_height && bounds.top + bounds.height >= 0.0
}

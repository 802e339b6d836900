#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use scrollviz_wasm::host::{Bounds, Chrome, ElementRef, Layout, TimeSource, Viewport};
use scrollviz_wasm::reveal::RevealStyle;
use scrollviz_wasm::scene::{Camera, Draw, Frame, Mesh, MeshHandle, SceneHost};
use scrollviz_wasm::sections::{QualityHandle, SectionKind, SectionRuntime};

/// A page of stacked elements with document-space geometry.
pub struct Page {
    pub viewport: Viewport,
    pub scroll: f64,
    pub elements: HashMap<String, (f64, f64)>,
}

#[derive(Clone)]
pub struct FakeLayout(pub Rc<RefCell<Page>>);

impl FakeLayout {
    pub fn new(width: f64, height: f64) -> Self {
        Self(Rc::new(RefCell::new(Page {
            viewport: Viewport::new(width, height),
            scroll: 0.0,
            elements: HashMap::new(),
        })))
    }

    pub fn with(self, key: &str, top: f64, height: f64) -> Self {
        self.0.borrow_mut().elements.insert(key.to_owned(), (top, height));
        self
    }

    pub fn scroll_to(&self, offset: f64) {
        self.0.borrow_mut().scroll = offset;
    }

    pub fn resize(&self, width: f64, height: f64) {
        let mut page = self.0.borrow_mut();
        page.viewport.width = width;
        page.viewport.height = height;
    }
}

impl Layout for FakeLayout {
    fn viewport(&self) -> Viewport {
        self.0.borrow().viewport
    }

    fn scroll_offset(&self) -> f64 {
        self.0.borrow().scroll
    }

    fn bounds(&self, element: &ElementRef) -> Option<Bounds> {
        let page = self.0.borrow();
        let &(top, height) = page.elements.get(element.as_str())?;
        Some(Bounds {
            top: top - page.scroll,
            height,
        })
    }
}

#[derive(Default)]
pub struct ChromeLog {
    pub highlights: Vec<String>,
    pub styles: Vec<(ElementRef, RevealStyle)>,
    pub scrolls: Vec<f64>,
}

#[derive(Clone, Default)]
pub struct RecordingChrome(pub Rc<RefCell<ChromeLog>>);

impl Chrome for RecordingChrome {
    fn highlight(&mut self, region: &str) {
        self.0.borrow_mut().highlights.push(region.to_owned());
    }

    fn style_reveal(&mut self, element: &ElementRef, style: RevealStyle) {
        self.0.borrow_mut().styles.push((element.clone(), style));
    }

    fn scroll_to(&mut self, offset: f64) {
        self.0.borrow_mut().scrolls.push(offset);
    }
}

#[derive(Default)]
pub struct ManualTime(pub Cell<f64>);

impl ManualTime {
    pub fn shared(start_ms: f64) -> Rc<Self> {
        Rc::new(Self(Cell::new(start_ms)))
    }

    pub fn set(&self, ms: f64) {
        self.0.set(ms);
    }
}

impl TimeSource for ManualTime {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}

#[derive(Default)]
pub struct HostLog {
    pub meshes: Vec<Mesh>,
    pub frames: Vec<(Camera, Vec<Draw>)>,
    pub size: (f32, f32),
    pub pixel_ratio: f32,
    pub disposed: bool,
}

#[derive(Clone, Default)]
pub struct RecordingHost(pub Rc<RefCell<HostLog>>);

impl RecordingHost {
    pub fn last_frame(&self) -> (Camera, Vec<Draw>) {
        self.0.borrow().frames.last().cloned().expect("no frame rendered")
    }
}

impl SceneHost for RecordingHost {
    fn upload(&mut self, mesh: &Mesh) -> MeshHandle {
        let mut log = self.0.borrow_mut();
        log.meshes.push(mesh.clone());
        MeshHandle(log.meshes.len() as u32 - 1)
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.0.borrow_mut().size = (width, height);
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.0.borrow_mut().pixel_ratio = ratio;
    }

    fn pixel_ratio(&self) -> f32 {
        self.0.borrow().pixel_ratio
    }

    fn render(&mut self, frame: &Frame<'_>) {
        self.0
            .borrow_mut()
            .frames
            .push((*frame.camera, frame.draws.to_vec()));
    }

    fn dispose(&mut self) {
        self.0.borrow_mut().disposed = true;
    }
}

#[derive(Default)]
pub struct SectionLog {
    pub progress: Vec<f32>,
    pub resizes: Vec<Viewport>,
    pub pixel_ratio: f32,
    pub disposed: bool,
}

/// Section that records what the engine asks of it.
pub struct ScriptedSection {
    pub log: Rc<RefCell<SectionLog>>,
    pub with_quality: bool,
}

impl ScriptedSection {
    pub fn new(with_quality: bool) -> (Box<Self>, Rc<RefCell<SectionLog>>) {
        let log = Rc::new(RefCell::new(SectionLog {
            pixel_ratio: 2.0,
            ..SectionLog::default()
        }));
        (
            Box::new(Self {
                log: log.clone(),
                with_quality,
            }),
            log,
        )
    }
}

impl QualityHandle for ScriptedSection {
    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.log.borrow_mut().pixel_ratio = ratio;
    }

    fn pixel_ratio(&self) -> f32 {
        self.log.borrow().pixel_ratio
    }
}

impl SectionRuntime for ScriptedSection {
    fn kind(&self) -> SectionKind {
        SectionKind::Hero
    }

    fn update(&mut self, progress: f32) {
        self.log.borrow_mut().progress.push(progress);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.log.borrow_mut().resizes.push(viewport);
    }

    fn quality(&mut self) -> Option<&mut dyn QualityHandle> {
        if self.with_quality {
            Some(self)
        } else {
            None
        }
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().disposed = true;
    }
}

pub fn approx(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Performance, Window};

use crate::host::{Bounds, Chrome, ElementRef, Layout, TimeSource, Viewport};
use crate::reveal::RevealStyle;

/// Resolves element keys: explicitly registered elements first, then ids.
pub struct Registry {
    document: Document,
    elements: RefCell<HashMap<String, Element>>,
}

impl Registry {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            elements: RefCell::new(HashMap::new()),
        }
    }

    pub fn register(&self, key: &str, element: Element) {
        self.elements.borrow_mut().insert(key.to_owned(), element);
    }

    pub fn lookup(&self, key: &ElementRef) -> Option<Element> {
        if let Some(element) = self.elements.borrow().get(key.as_str()) {
            return Some(element.clone());
        }
        self.document.get_element_by_id(key.as_str())
    }
}

/// Every element matching `selector`, in document order.
pub fn select_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        log::warn!("invalid selector `{selector}`");
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub struct DomLayout {
    window: Window,
    registry: Rc<Registry>,
}

impl DomLayout {
    pub fn new(window: Window, registry: Rc<Registry>) -> Self {
        Self { window, registry }
    }
}

fn dimension(value: Result<JsValue, JsValue>) -> f64 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

impl Layout for DomLayout {
    fn viewport(&self) -> Viewport {
        Viewport {
            width: dimension(self.window.inner_width()),
            height: dimension(self.window.inner_height()),
            device_pixel_ratio: self.window.device_pixel_ratio(),
        }
    }

    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn bounds(&self, element: &ElementRef) -> Option<Bounds> {
        let rect = self.registry.lookup(element)?.get_bounding_client_rect();
        Some(Bounds {
            top: rect.top(),
            height: rect.height(),
        })
    }
}

pub struct DomChrome {
    window: Window,
    document: Document,
    registry: Rc<Registry>,
    nav_selector: String,
}

impl DomChrome {
    pub fn new(window: Window, document: Document, registry: Rc<Registry>, nav_selector: &str) -> Self {
        Self {
            window,
            document,
            registry,
            nav_selector: nav_selector.to_owned(),
        }
    }
}

impl Chrome for DomChrome {
    fn highlight(&mut self, region: &str) {
        let href = format!("#{region}");
        for link in select_all(&self.document, &self.nav_selector) {
            let classes = link.class_list();
            let result = if link.get_attribute("href").as_deref() == Some(href.as_str()) {
                classes.add_1("active")
            } else {
                classes.remove_1("active")
            };
            if let Err(err) = result {
                log::debug!("nav class update failed: {err:?}");
            }
        }
    }

    fn style_reveal(&mut self, element: &ElementRef, style: RevealStyle) {
        let Some(el) = self.registry.lookup(element) else {
            return;
        };
        let Ok(el) = el.dyn_into::<HtmlElement>() else {
            return;
        };
        let css = el.style();
        let applied = css
            .set_property("transform", &format!("translate3d(0, {:.2}px, 0)", style.translate_y))
            .and_then(|_| css.set_property("opacity", &format!("{:.3}", style.opacity)));
        if let Err(err) = applied {
            log::debug!("reveal style on `{element}` failed: {err:?}");
        }
    }

    fn scroll_to(&mut self, offset: f64) {
        self.window.scroll_to_with_x_and_y(0.0, offset);
    }
}

pub struct PerformanceTime {
    performance: Performance,
}

impl PerformanceTime {
    pub fn new(window: &Window) -> Result<Self, JsValue> {
        let performance = window.performance().ok_or("no performance timer")?;
        Ok(Self { performance })
    }
}

impl TimeSource for PerformanceTime {
    fn now_ms(&self) -> f64 {
        self.performance.now()
    }
}

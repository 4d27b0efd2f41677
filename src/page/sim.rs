//! In-memory page used by the preview, the replay command, and tests.
//!
//! A layout is a TOML file listing elements with page-relative boxes:
//!
//! ```toml
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [[element]]
//! id = "about"
//! tag = "section"
//! class = ["about-section"]
//! rect = [0, 900, 1280, 1400]     # left, top, width, height
//!
//! [[element]]
//! parent = "about"
//! class = ["section-title"]
//! rect = [80, 960, 600, 80]
//! text = "About Me"
//! ```
//!
//! Parents must be declared before their children; declaration order is
//! document order.
//!
//! HTML layouts work too (see [`SimDocument::from_html`]): any element with
//! a `data-rect="left,top,width,height"` attribute becomes a page element.
//!
//! Selector queries run against an HTML rendering of the live tree (see
//! `mirror`), so they see classes added by effects.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use scraper::{ElementRef, Html};
use serde::Deserialize;

use crate::core::geometry::{ElementHandle, Rect};
use crate::error::LayoutError;

use super::dom::Document;
use super::mirror::QueryMirror;

/// Layout bundled with the binary.
pub const DEMO_LAYOUT: &str = include_str!("../../demos/portfolio.toml");

// ───────────────────────────────────────── layout file ───────

#[derive(Debug, Deserialize)]
struct LayoutFile {
    viewport: ViewportSpec,
    #[serde(default, rename = "element")]
    elements: Vec<ElementSpec>,
}

#[derive(Debug, Deserialize)]
struct ViewportSpec {
    width: f64,
    height: f64,
    #[serde(default)]
    scroll_y: f64,
}

#[derive(Debug, Deserialize)]
struct ElementSpec {
    #[serde(default)]
    id: Option<String>,
    #[serde(default = "default_tag")]
    tag: String,
    #[serde(default)]
    class: Vec<String>,
    #[serde(default)]
    parent: Option<String>,
    rect: [f64; 4],
    #[serde(default)]
    fixed: bool,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    attrs: BTreeMap<String, String>,
}

fn default_tag() -> String {
    "div".into()
}

// ───────────────────────────────────────── elements ──────────

#[derive(Debug, Clone)]
pub struct SimElement {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub parent: Option<ElementHandle>,
    pub children: Vec<ElementHandle>,
    /// Page-relative box (viewport-relative when `fixed`).
    pub rect: Rect,
    /// `position: fixed`, does not move with scroll.
    pub fixed: bool,
    pub text: Option<String>,
    pub styles: BTreeMap<String, String>,
    detached: bool,
}

impl SimElement {
    fn new(tag: &str, rect: Rect) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
            rect,
            fixed: false,
            text: None,
            styles: BTreeMap::new(),
            detached: false,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub(crate) fn is_detached(&self) -> bool {
        self.detached
    }

    /// Short human label: `tag#id.class1.class2`.
    pub fn label(&self) -> String {
        let mut s = self.tag.clone();
        if let Some(id) = &self.id {
            s.push('#');
            s.push_str(id);
        }
        for c in &self.classes {
            s.push('.');
            s.push_str(c);
        }
        s
    }
}

// ───────────────────────────────────────── document ──────────

#[derive(Debug, Clone)]
pub struct SimDocument {
    elements: Vec<SimElement>,
    scroll_y: f64,
    viewport_width: f64,
    viewport_height: f64,
    /// When set, `scroll_into_view` records a target instead of jumping.
    smooth_scroll: bool,
    scroll_request: Option<f64>,
    queries: RefCell<QueryMirror>,
}

const BODY: ElementHandle = ElementHandle(0);

impl SimDocument {
    /// Empty page: just a body.
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        let body = SimElement::new("body", Rect::new(0.0, 0.0, viewport_width, viewport_height));
        Self {
            elements: vec![body],
            scroll_y: 0.0,
            viewport_width,
            viewport_height,
            smooth_scroll: false,
            scroll_request: None,
            queries: RefCell::new(QueryMirror::default()),
        }
    }

    pub fn from_toml(src: &str) -> Result<Self, LayoutError> {
        let file: LayoutFile = toml::from_str(src)?;
        let ViewportSpec {
            width,
            height,
            scroll_y,
        } = file.viewport;
        if !(width > 0.0 && height > 0.0) {
            return Err(LayoutError::BadViewport { width, height });
        }

        let mut doc = Self::new(width, height);
        let mut by_id: BTreeMap<String, ElementHandle> = BTreeMap::new();

        for spec in file.elements {
            let parent = match &spec.parent {
                Some(p) => *by_id.get(p).ok_or_else(|| LayoutError::UnknownParent {
                    child: spec.id.clone().unwrap_or_else(|| spec.tag.clone()),
                    parent: p.clone(),
                })?,
                None => BODY,
            };
            let [left, top, w, h] = spec.rect;
            let handle = doc.push_element(parent, &spec.tag, Rect::new(left, top, w, h));
            let el = &mut doc.elements[handle.0 as usize];
            el.classes = spec.class;
            el.fixed |= spec.fixed;
            el.text = spec.text;
            el.attrs = spec.attrs;
            if let Some(id) = spec.id {
                if by_id.contains_key(&id) {
                    return Err(LayoutError::DuplicateId(id));
                }
                el.attrs.insert("id".into(), id.clone());
                el.id = Some(id.clone());
                by_id.insert(id, handle);
            }
        }

        doc.refresh_body();
        doc.set_scroll_y(scroll_y);
        tracing::debug!(elements = doc.elements.len(), "layout loaded");
        Ok(doc)
    }

    /// Build a page from HTML.
    ///
    /// Elements carrying `data-rect` become page elements; the rest only
    /// contribute nesting.  `data-fixed` marks fixed elements.  The body's
    /// `data-viewport="WxH"` sets the viewport (1280x800 when absent) and
    /// `data-scroll-y` the initial offset.
    pub fn from_html(src: &str) -> Result<Self, LayoutError> {
        let html = Html::parse_document(src);
        let body = html
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "body");

        let (width, height) = match body.and_then(|b| b.value().attr("data-viewport")) {
            Some(raw) => {
                let [w, h] = parse_numbers(raw).ok_or_else(|| LayoutError::BadAttribute {
                    attr: "data-viewport",
                    value: raw.to_string(),
                })?;
                (w, h)
            }
            None => (1280.0, 800.0),
        };
        if !(width > 0.0 && height > 0.0) {
            return Err(LayoutError::BadViewport { width, height });
        }

        let mut doc = Self::new(width, height);
        if let Some(body) = body {
            doc.load_html_children(body, BODY, &mut BTreeSet::new())?;
        }
        let scroll_y = body
            .and_then(|b| b.value().attr("data-scroll-y"))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0.0);

        doc.refresh_body();
        doc.set_scroll_y(scroll_y);
        tracing::debug!(elements = doc.elements.len(), "html layout loaded");
        Ok(doc)
    }

    fn load_html_children(
        &mut self,
        node: ElementRef<'_>,
        parent: ElementHandle,
        ids: &mut BTreeSet<String>,
    ) -> Result<(), LayoutError> {
        for child in node.children().filter_map(ElementRef::wrap) {
            let el = child.value();
            let Some(raw) = el.attr("data-rect") else {
                self.load_html_children(child, parent, ids)?;
                continue;
            };
            let [left, top, w, h] = parse_numbers(raw).ok_or_else(|| LayoutError::BadAttribute {
                attr: "data-rect",
                value: raw.to_string(),
            })?;
            let handle = self.push_element(parent, el.name(), Rect::new(left, top, w, h));
            let text = direct_text(child);

            let sim = &mut self.elements[handle.0 as usize];
            sim.fixed |= el.attr("data-fixed").is_some();
            sim.classes = el.classes().map(str::to_string).collect();
            sim.text = text;
            for (name, value) in el.attrs() {
                if !matches!(name, "class" | "data-rect" | "data-fixed") {
                    sim.attrs.insert(name.to_string(), value.to_string());
                }
            }
            if let Some(id) = el.id() {
                if !ids.insert(id.to_string()) {
                    return Err(LayoutError::DuplicateId(id.to_string()));
                }
                sim.id = Some(id.to_string());
            }

            self.load_html_children(child, handle, ids)?;
        }
        Ok(())
    }

    /// Loads `.html`/`.htm` files as HTML, anything else as TOML.
    pub fn from_path(path: &Path) -> Result<Self, LayoutError> {
        let src = std::fs::read_to_string(path).map_err(|source| LayoutError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let is_html = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
        if is_html {
            Self::from_html(&src)
        } else {
            Self::from_toml(&src)
        }
    }

    /// The bundled portfolio layout.
    pub fn demo() -> Result<Self, LayoutError> {
        Self::from_toml(DEMO_LAYOUT)
    }

    fn push_element(&mut self, parent: ElementHandle, tag: &str, rect: Rect) -> ElementHandle {
        let handle = ElementHandle(self.elements.len() as u32);
        let mut el = SimElement::new(tag, rect);
        el.parent = Some(parent);
        el.fixed = self.elements[parent.0 as usize].fixed;
        self.elements.push(el);
        self.elements[parent.0 as usize].children.push(handle);
        self.queries.get_mut().invalidate();
        handle
    }

    /// Keep the body box spanning the full document.
    fn refresh_body(&mut self) {
        let h = self.document_height();
        self.elements[0].rect = Rect::new(0.0, 0.0, self.viewport_width, h);
    }

    pub fn element(&self, el: ElementHandle) -> Option<&SimElement> {
        self.elements.get(el.0 as usize)
    }

    pub(crate) fn elements(&self) -> &[SimElement] {
        &self.elements
    }

    /// Set an attribute on a live element.
    pub fn set_attribute(&mut self, el: ElementHandle, name: &str, value: &str) {
        if let Some(e) = self.live_mut(el) {
            e.attrs.insert(name.to_string(), value.to_string());
            self.queries.get_mut().invalidate();
        }
    }

    fn live(&self, el: ElementHandle) -> Option<&SimElement> {
        let mut cur = Some(el);
        while let Some(h) = cur {
            let e = self.elements.get(h.0 as usize)?;
            if e.detached {
                return None;
            }
            cur = e.parent;
        }
        self.elements.get(el.0 as usize)
    }

    fn live_mut(&mut self, el: ElementHandle) -> Option<&mut SimElement> {
        self.live(el)?;
        self.elements.get_mut(el.0 as usize)
    }

    /// Detach an element (and with it, its subtree).
    pub fn remove(&mut self, el: ElementHandle) {
        if el == BODY {
            return;
        }
        if let Some(e) = self.elements.get_mut(el.0 as usize) {
            e.detached = true;
            self.queries.get_mut().invalidate();
        }
    }

    /// Live elements in document order (pre-order from the body).
    pub fn document_order(&self) -> Vec<ElementHandle> {
        let mut out = Vec::with_capacity(self.elements.len());
        let mut stack = vec![BODY];
        while let Some(h) = stack.pop() {
            let e = &self.elements[h.0 as usize];
            if e.detached {
                continue;
            }
            out.push(h);
            stack.extend(e.children.iter().rev().copied());
        }
        out
    }

    /// Depth below the body (body = 0).
    pub fn depth(&self, el: ElementHandle) -> usize {
        let mut depth = 0;
        let mut cur = self.element(el).and_then(|e| e.parent);
        while let Some(p) = cur {
            depth += 1;
            cur = self.element(p).and_then(|e| e.parent);
        }
        depth
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport_width = width.max(1.0);
        self.viewport_height = height.max(1.0);
        self.refresh_body();
        self.set_scroll_y(self.scroll_y);
    }

    pub fn max_scroll(&self) -> f64 {
        (self.document_height() - self.viewport_height).max(0.0)
    }

    pub fn set_smooth_scroll(&mut self, on: bool) {
        self.smooth_scroll = on;
    }

    /// Target recorded by the last smooth `scroll_into_view`, if any.
    pub fn take_scroll_request(&mut self) -> Option<f64> {
        self.scroll_request.take()
    }

    fn select(&self, selector: &str, within: Option<ElementHandle>) -> Vec<ElementHandle> {
        let matches = self.queries.borrow_mut().select(&self.elements, selector);
        match within {
            Some(root) => matches
                .into_iter()
                .filter(|&h| h != root && self.is_descendant(h, root))
                .collect(),
            None => matches,
        }
    }

    fn is_descendant(&self, el: ElementHandle, root: ElementHandle) -> bool {
        let mut cur = self.element(el).and_then(|e| e.parent);
        while let Some(p) = cur {
            if p == root {
                return true;
            }
            cur = self.element(p).and_then(|e| e.parent);
        }
        false
    }
}

impl Document for SimDocument {
    fn query_all(&self, selector: &str) -> Vec<ElementHandle> {
        self.select(selector, None)
    }

    fn query_within(&self, root: ElementHandle, selector: &str) -> Vec<ElementHandle> {
        if self.live(root).is_none() {
            return Vec::new();
        }
        self.select(selector, Some(root))
    }

    fn children(&self, el: ElementHandle) -> Vec<ElementHandle> {
        self.live(el)
            .map(|e| {
                e.children
                    .iter()
                    .copied()
                    .filter(|c| !self.elements[c.0 as usize].detached)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn body(&self) -> ElementHandle {
        BODY
    }

    fn attribute(&self, el: ElementHandle, name: &str) -> Option<String> {
        self.live(el).and_then(|e| e.attrs.get(name).cloned())
    }

    fn bounding_rect(&self, el: ElementHandle) -> Option<Rect> {
        let e = self.live(el)?;
        if e.fixed {
            Some(e.rect)
        } else {
            Some(e.rect.shifted(-self.scroll_y))
        }
    }

    fn offset_box(&self, el: ElementHandle) -> Option<(f64, f64)> {
        self.live(el).map(|e| (e.rect.top, e.rect.height))
    }

    fn add_class(&mut self, el: ElementHandle, class: &str) {
        if let Some(e) = self.live_mut(el) {
            if !e.has_class(class) {
                e.classes.push(class.to_string());
                self.queries.get_mut().invalidate();
            }
        }
    }

    fn remove_class(&mut self, el: ElementHandle, class: &str) {
        if let Some(e) = self.live_mut(el) {
            let before = e.classes.len();
            e.classes.retain(|c| c != class);
            if e.classes.len() != before {
                self.queries.get_mut().invalidate();
            }
        }
    }

    fn has_class(&self, el: ElementHandle, class: &str) -> bool {
        self.live(el).is_some_and(|e| e.has_class(class))
    }

    fn set_style(&mut self, el: ElementHandle, property: &str, value: &str) {
        if let Some(e) = self.live_mut(el) {
            e.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn style(&self, el: ElementHandle, property: &str) -> Option<String> {
        self.live(el).and_then(|e| e.styles.get(property).cloned())
    }

    fn create_child(&mut self, parent: ElementHandle, class: &str) -> Option<ElementHandle> {
        let prect = self.live(parent)?.rect;
        let handle = self.push_element(parent, "div", Rect::new(prect.left, prect.top, 12.0, 12.0));
        self.elements[handle.0 as usize].classes.push(class.to_string());
        self.queries.get_mut().invalidate();
        Some(handle)
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn set_scroll_y(&mut self, y: f64) {
        let y = if y.is_finite() { y } else { 0.0 };
        self.scroll_y = y.clamp(0.0, self.max_scroll());
    }

    fn scroll_into_view(&mut self, el: ElementHandle) {
        let Some((top, _)) = self.offset_box(el) else {
            return;
        };
        let target = top.clamp(0.0, self.max_scroll());
        if self.smooth_scroll {
            self.scroll_request = Some(target);
        } else {
            self.set_scroll_y(target);
        }
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn document_height(&self) -> f64 {
        let content = self
            .elements
            .iter()
            .skip(1)
            .filter(|e| !e.fixed && !e.detached)
            .map(|e| e.rect.bottom())
            .fold(0.0, f64::max);
        content.max(self.viewport_height)
    }
}

/// `N` numbers separated by commas, whitespace, or `x`.
fn parse_numbers<const N: usize>(raw: &str) -> Option<[f64; N]> {
    let mut parts = raw
        .split(|c: char| c == ',' || c == 'x' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    let mut out = [0.0; N];
    for slot in &mut out {
        *slot = parts.next()?.parse().ok().filter(|v: &f64| v.is_finite())?;
    }
    parts.next().is_none().then_some(out)
}

/// The element's own text nodes, whitespace-collapsed.
fn direct_text(el: ElementRef<'_>) -> Option<String> {
    let words: Vec<&str> = el
        .children()
        .filter_map(|n| n.value().as_text())
        .flat_map(|t| t.split_whitespace())
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

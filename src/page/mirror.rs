//! HTML view of the simulated page for selector queries.
//!
//! The live element tree is serialised to markup, parsed with `scraper`, and
//! kept until a class, attribute, or structural change invalidates it.  Every
//! element carries a `data-sim` attribute holding its handle so matches map
//! back to the arena.

use std::collections::HashMap;
use std::fmt::{self, Write as _};

use scraper::{ElementRef, Html, Selector};

use crate::core::geometry::ElementHandle;

use super::sim::SimElement;

const HANDLE_ATTR: &str = "data-sim";

#[derive(Default)]
pub(crate) struct QueryMirror {
    html: Option<Html>,
    /// Parsed selectors; `None` marks one that failed to parse.
    selectors: HashMap<String, Option<Selector>>,
}

impl QueryMirror {
    pub(crate) fn invalidate(&mut self) {
        self.html = None;
    }

    /// Handles matching `selector`, in document order.  An invalid selector
    /// matches nothing and is reported once.
    pub(crate) fn select(&mut self, elements: &[SimElement], selector: &str) -> Vec<ElementHandle> {
        let Some(sel) = self.parsed(selector) else {
            return Vec::new();
        };
        let html = self.html(elements);
        html.select(&sel).filter_map(handle_of).collect()
    }

    fn parsed(&mut self, selector: &str) -> Option<Selector> {
        self.selectors
            .entry(selector.to_string())
            .or_insert_with(|| match Selector::parse(selector) {
                Ok(sel) => Some(sel),
                Err(err) => {
                    tracing::warn!(selector, error = ?err, "invalid selector");
                    None
                }
            })
            .clone()
    }

    fn html(&mut self, elements: &[SimElement]) -> &Html {
        self.html.get_or_insert_with(|| {
            let html = Html::parse_document(&render_markup(elements));
            let moved = reparented(&html, elements);
            if moved > 0 {
                tracing::warn!(moved, "layout nesting is not valid HTML; some elements were reparented");
            }
            tracing::trace!(elements = elements.len(), "query mirror rebuilt");
            html
        })
    }
}

impl Clone for QueryMirror {
    /// The parsed tree is a cache; clones rebuild it on first query.
    fn clone(&self) -> Self {
        Self {
            html: None,
            selectors: self.selectors.clone(),
        }
    }
}

impl fmt::Debug for QueryMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryMirror")
            .field("built", &self.html.is_some())
            .field("selectors", &self.selectors.len())
            .finish()
    }
}

fn handle_of(el: ElementRef<'_>) -> Option<ElementHandle> {
    el.value()
        .attr(HANDLE_ATTR)
        .and_then(|raw| raw.parse().ok())
        .map(ElementHandle)
}

/// Elements whose parsed parent differs from their arena parent.
fn reparented(html: &Html, elements: &[SimElement]) -> usize {
    let Ok(all) = Selector::parse("[data-sim]") else {
        return 0;
    };
    html.select(&all)
        .filter(|el| {
            let Some(handle) = handle_of(*el) else {
                return false;
            };
            let Some(expected) = elements.get(handle.0 as usize).and_then(|e| e.parent) else {
                return false;
            };
            el.parent().and_then(ElementRef::wrap).and_then(handle_of) != Some(expected)
        })
        .count()
}

/// Markup for the live tree, starting at the body (handle 0).
pub(crate) fn render_markup(elements: &[SimElement]) -> String {
    let mut out = String::from("<!DOCTYPE html><html><head></head>");
    if !elements.is_empty() {
        write_element(&mut out, elements, 0);
    }
    out.push_str("</html>");
    out
}

fn write_element(out: &mut String, elements: &[SimElement], idx: usize) {
    let el = &elements[idx];
    if el.is_detached() {
        return;
    }
    let _ = write!(out, "<{} {HANDLE_ATTR}=\"{idx}\"", el.tag);
    if !el.classes.is_empty() {
        let _ = write!(out, " class=\"{}\"", escape(&el.classes.join(" ")));
    }
    for (name, value) in &el.attrs {
        if name == "class" || name == HANDLE_ATTR || !is_attr_name(name) {
            continue;
        }
        let _ = write!(out, " {name}=\"{}\"", escape(value));
    }
    out.push('>');
    for child in &el.children {
        write_element(out, elements, child.0 as usize);
    }
    let _ = write!(out, "</{}>", el.tag);
}

fn is_attr_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

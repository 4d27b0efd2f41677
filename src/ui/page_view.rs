//! Page pane widget. Draws the simulated viewport as terminal cells.
//!
//! * **Geometry** (`PageGeometry`): maps viewport pixels to cells and back.
//!   Shared between the widget (rendering) and the handler (hit-testing).
//! * **Style helpers**: read classes and inline styles the effects wrote
//!   and turn them into Ratatui styles.
//! * **Widget** (`PageView`): draws the background, section rules, then
//!   every element label at its box's top-left cell.  Fixed elements draw
//!   last so the navbar sits on top.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::core::geometry::ElementHandle;
use crate::core::theme::Theme;
use crate::page::dom::{Bindings, Document};
use crate::page::sim::{SimDocument, SimElement};

use super::theme::Palette;

// ───────────────────────────────────────── geometry ──────────

#[derive(Debug, Clone, Copy)]
pub struct PageGeometry {
    pub area: Rect,
    pub col_px: f64,
    pub row_px: f64,
}

impl PageGeometry {
    pub fn new(area: Rect, viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            area,
            col_px: viewport_width / f64::from(area.width.max(1)),
            row_px: viewport_height / f64::from(area.height.max(1)),
        }
    }

    /// Cell for a viewport point, or `None` outside the pane.
    pub fn cell(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        let col = (x / self.col_px).floor();
        let row = (y / self.row_px).floor();
        let (w, h) = (f64::from(self.area.width), f64::from(self.area.height));
        if !(0.0..w).contains(&col) || !(0.0..h).contains(&row) {
            return None;
        }
        Some((self.area.x + col as u16, self.area.y + row as u16))
    }

    /// Viewport point at the centre of a terminal cell.
    pub fn point(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let a = self.area;
        if column < a.x || row < a.y || column >= a.x + a.width || row >= a.y + a.height {
            return None;
        }
        Some((
            (f64::from(column - a.x) + 0.5) * self.col_px,
            (f64::from(row - a.y) + 0.5) * self.row_px,
        ))
    }
}

/// Deepest element whose box contains the cell.  Fixed elements win over
/// scrolling ones; the body is never hit.
pub fn hit_test(
    doc: &SimDocument,
    geom: &PageGeometry,
    column: u16,
    row: u16,
) -> Option<ElementHandle> {
    let (x, y) = geom.point(column, row)?;
    let body = doc.body();
    let contains = |h: ElementHandle| {
        doc.bounding_rect(h)
            .is_some_and(|r| x >= r.left && x < r.right() && y >= r.top && y < r.bottom())
    };
    let order = doc.document_order();
    let fixed = |h: &ElementHandle| doc.element(*h).is_some_and(|e| e.fixed);
    order
        .iter()
        .rev()
        .filter(|h| **h != body && fixed(h))
        .find(|h| contains(**h))
        .or_else(|| order.iter().rev().filter(|h| **h != body).find(|h| contains(**h)))
        .copied()
}

// ───────────────────────────────────────── style helpers ─────

/// `px` value of `translateY(<px>px)` inside a transform, if present.
fn translate_y(transform: &str) -> Option<f64> {
    let start = transform.find("translateY(")? + "translateY(".len();
    let rest = &transform[start..];
    let end = rest.find("px")?;
    rest[..end].trim().parse().ok()
}

fn opacity(doc: &SimDocument, h: ElementHandle) -> f64 {
    doc.style(h, "opacity")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1.0)
}

// ───────────────────────────────────────── widget ────────────

pub struct PageView<'a> {
    doc: &'a SimDocument,
    bindings: &'a Bindings,
    theme: Theme,
    background: Option<f64>,
    focused: Option<ElementHandle>,
    hovered: Option<ElementHandle>,
    inspected: Option<ElementHandle>,
    block: Option<Block<'a>>,
}

impl<'a> PageView<'a> {
    pub fn new(doc: &'a SimDocument, bindings: &'a Bindings, theme: Theme) -> Self {
        Self {
            doc,
            bindings,
            theme,
            background: None,
            focused: None,
            hovered: None,
            inspected: None,
            block: None,
        }
    }

    /// Mean gradient lightness for the page background.
    pub fn background(mut self, lightness: Option<f64>) -> Self {
        self.background = lightness;
        self
    }

    pub fn focused(mut self, el: Option<ElementHandle>) -> Self {
        self.focused = el;
        self
    }

    pub fn hovered(mut self, el: Option<ElementHandle>) -> Self {
        self.hovered = el;
        self
    }

    pub fn inspected(mut self, el: Option<ElementHandle>) -> Self {
        self.inspected = el;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn element_style(
        &self,
        h: ElementHandle,
        el: &SimElement,
        candidates: &[ElementHandle],
    ) -> Style {
        let classes = &self.bindings.classes;
        let theme = self.theme;

        let is_candidate = candidates.contains(&h);
        let mut style = if is_candidate && !el.has_class(&classes.visible) {
            Palette::hidden_style(theme)
        } else {
            Palette::text_style(theme)
        };
        if el.has_class(&classes.scaled_in) || el.has_class(&classes.split_joined) {
            style = style.patch(Palette::accent_style(theme));
        }
        if el.has_class(&classes.scrolled) {
            style = style.patch(Palette::navbar_scrolled_style(theme));
        }
        if el.has_class(&classes.active) {
            style = style.patch(Palette::active_link_style());
        }
        if opacity(self.doc, h) < 0.5 {
            style = style.patch(Palette::hidden_style(theme));
        }
        if self.focused == Some(h) {
            style = style.patch(Palette::focused_link_style());
        }
        if self.hovered == Some(h) {
            style = style.patch(Palette::hovered_style());
        }
        if self.inspected == Some(h) {
            style = style.patch(Palette::inspected_style());
        }
        style
    }

    fn draw_element(
        &self,
        h: ElementHandle,
        geom: &PageGeometry,
        candidates: &[ElementHandle],
        buf: &mut Buffer,
    ) {
        let Some(el) = self.doc.element(h) else {
            return;
        };
        let Some(mut rect) = self.doc.bounding_rect(h) else {
            return;
        };
        if let Some(dy) = self.doc.style(h, "transform").as_deref().and_then(translate_y) {
            rect = rect.shifted(dy);
        }
        // Hidden by an entrance in progress.
        if opacity(self.doc, h) <= 0.0 && el.text.is_some() {
            return;
        }

        let classes = &self.bindings.classes;
        if el.has_class(&classes.timeline_dot) {
            self.draw_timeline_dot(h, el, geom, buf);
            return;
        }

        let Some((x, y)) = geom.cell(rect.left.max(0.0), rect.top) else {
            return;
        };
        let style = self.element_style(h, el, candidates);
        let width = geom.area.right().saturating_sub(x);

        if el.tag == "section" {
            let label = format!("── {} ", el.id.as_deref().unwrap_or("section"));
            let rule = format!("{label:─<w$}", w = usize::from(geom.area.width));
            let style = Palette::section_rule_style(self.theme);
            buf.set_stringn(geom.area.x, y, rule, usize::from(geom.area.width), style);
            return;
        }

        let text = el.text.clone().unwrap_or_else(|| el.label());
        if el.text.is_some() || (el.fixed && el.children.is_empty()) {
            buf.set_line(x, y, &Line::from(Span::styled(text, style)), width);
        } else if el.children.is_empty() {
            // Decorative leaf such as a timeline marker.
            buf.set_string(x, y, "◇", style);
        } else if el.fixed {
            // Container bar (the navbar): paint the row, children draw over it.
            let bar = geom.cell(rect.right().min(self.doc.viewport_width() - 1.0), rect.top);
            let end = bar.map_or(geom.area.right(), |(c, _)| c + 1);
            for col in x..end {
                if let Some(cell) = buf.cell_mut((col, y)) {
                    cell.set_style(style);
                }
            }
        } else {
            let style = style.patch(Palette::section_rule_style(self.theme));
            buf.set_line(x, y, &Line::from(Span::styled(text, style)), width);
        }
    }

    fn draw_timeline_dot(
        &self,
        dot: ElementHandle,
        el: &SimElement,
        geom: &PageGeometry,
        buf: &mut Buffer,
    ) {
        let Some(parent) = el.parent.and_then(|p| self.doc.bounding_rect(p)) else {
            return;
        };
        let left = self
            .doc
            .style(dot, "left")
            .and_then(|v| v.trim_end_matches("px").parse::<f64>().ok())
            .unwrap_or(0.0);
        let Some((x, y)) = geom.cell(parent.left + left, parent.top.max(0.0)) else {
            return;
        };
        let style = if el.has_class(&self.bindings.classes.active) {
            Palette::accent_style(self.theme)
        } else {
            Palette::hidden_style(self.theme)
        };
        buf.set_string(x, y, "●", style);
    }
}

impl Widget for PageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let bg = Palette::page_background(self.background.unwrap_or(match self.theme {
            Theme::Dark => 3.0,
            Theme::Light => 97.0,
        }));
        buf.set_style(inner, Style::default().bg(bg));

        let geom = PageGeometry::new(inner, self.doc.viewport_width(), self.doc.viewport_height());
        let body = self.doc.body();
        let (fixed, scrolling): (Vec<_>, Vec<_>) = self
            .doc
            .document_order()
            .into_iter()
            .filter(|h| *h != body)
            .partition(|h| self.doc.element(*h).is_some_and(|e| e.fixed));

        let candidates = self.doc.query_all(&self.bindings.selectors.reveal);
        for h in scrolling.into_iter().chain(fixed) {
            self.draw_element(h, &geom, &candidates, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_and_point_invert() {
        let geom = PageGeometry::new(Rect::new(1, 1, 64, 40), 1280.0, 800.0);
        assert_eq!(geom.cell(0.0, 0.0), Some((1, 1)));
        assert_eq!(geom.cell(1279.0, 799.0), Some((64, 40)));
        assert_eq!(geom.cell(0.0, 800.0), None);
        let (x, y) = geom.point(11, 6).unwrap();
        assert_eq!(geom.cell(x, y), Some((11, 6)));
    }

    #[test]
    fn hit_test_prefers_fixed_navbar() {
        let mut doc = SimDocument::demo().unwrap();
        doc.set_scroll_y(0.0);
        let geom = PageGeometry::new(Rect::new(0, 0, 128, 40), 1280.0, 800.0);
        // (1210, 30) sits on the theme toggle, inside the navbar and the hero.
        let toggle = doc.query("#themeToggle").unwrap();
        assert_eq!(hit_test(&doc, &geom, 121, 1), Some(toggle));
        let hero_title = doc.query(".hero-title").unwrap();
        assert_eq!(hit_test(&doc, &geom, 30, 14), Some(hero_title));
    }

    #[test]
    fn translate_parsing() {
        assert_eq!(translate_y("translateY(42.5px)"), Some(42.5));
        assert_eq!(translate_y("scale(1.01)"), None);
    }

    #[test]
    fn renders_without_panicking_in_both_themes() {
        let doc = SimDocument::demo().unwrap();
        let bindings = Bindings::default();
        for theme in [Theme::Dark, Theme::Light] {
            let area = Rect::new(0, 0, 80, 30);
            let mut buf = Buffer::empty(area);
            PageView::new(&doc, &bindings, theme).render(area, &mut buf);
        }
    }
}

//! Inspector panel: page-wide state on top, the selected element below.
//!
//! Text is built by pure helpers (`page_lines`, `element_lines`) so it can
//! be tested without a terminal; the widget only lays them out.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

use crate::app::runtime::PageRuntime;
use crate::core::geometry::{ElementHandle, ScrollDirection};
use crate::page::dom::Document;
use crate::page::sim::SimDocument;
use crate::page::store::KeyValueStore;

use super::theme::Palette;

fn field(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<11}"), Palette::label_style()),
        Span::raw(value.into()),
    ])
}

/// Scroll position, theme, gradient and pipeline counters.
pub fn page_lines<S: KeyValueStore>(rt: &PageRuntime<SimDocument, S>) -> Vec<Line<'static>> {
    let doc = rt.doc();
    let stats = rt.stats();
    let span = (doc.document_height() - doc.viewport_height()).max(0.0);
    let mut lines = vec![
        Line::from(Span::styled("Page", Palette::title_style())),
        field("scroll", format!("{:.0} / {:.0}px", doc.scroll_y(), span)),
        field(
            "viewport",
            format!("{:.0}×{:.0}", doc.viewport_width(), doc.viewport_height()),
        ),
        field("theme", rt.theme().as_str()),
        field(
            "scrolling",
            if rt.is_scrolling() { "yes" } else { "no" }.to_string(),
        ),
        field("phase", format!("{:.1}", rt.gradient_phase())),
    ];
    if let Some(g) = rt.background() {
        lines.push(field("angle", format!("{:.1}°", g.angle_deg)));
        let stops: Vec<String> = g
            .stops
            .iter()
            .map(|s| format!("{:.1}%", s.lightness))
            .collect();
        lines.push(field("stops", stops.join(" ")));
    }
    lines.push(field(
        "runs",
        format!(
            "visual {} · timeline {} · nav {}",
            stats.visual_runs, stats.timeline_runs, stats.nav_runs
        ),
    ));
    lines.push(field(
        "",
        format!(
            "resize {} · frames {} · timers {}",
            stats.resize_runs,
            stats.gradient_frames,
            rt.pending_timers()
        ),
    ));
    lines
}

/// Identity, box, classes, inline styles and tracked visual state.
pub fn element_lines<S: KeyValueStore>(
    rt: &PageRuntime<SimDocument, S>,
    el: ElementHandle,
) -> Vec<Line<'static>> {
    let doc = rt.doc();
    let Some(element) = doc.element(el) else {
        return vec![Line::from("(no element)")];
    };
    let mut lines = vec![
        Line::from(Span::styled(format!("Element {el}"), Palette::title_style())),
        field("selector", element.label()),
    ];
    match doc.bounding_rect(el) {
        Some(r) => lines.push(field(
            "rect",
            format!("{:.0},{:.0} {:.0}×{:.0}", r.left, r.top, r.width, r.height),
        )),
        None => lines.push(field("rect", "detached")),
    }
    if !element.classes.is_empty() {
        lines.push(field("classes", element.classes.join(" ")));
    }
    for (property, value) in &element.styles {
        lines.push(field(property, value.clone()));
    }

    let state = rt.visual_state(el);
    lines.push(field(
        "state",
        format!(
            "scale {:.3} · opacity {:.2} · y {:.0}",
            state.scale, state.opacity, state.translate_y
        ),
    ));
    if state.revealed || rt.is_revealed(el) {
        lines.push(field("", "revealed"));
    }
    lines
}

pub struct InspectorWidget<'a, S> {
    runtime: &'a PageRuntime<SimDocument, S>,
    selected: Option<ElementHandle>,
    block: Option<Block<'a>>,
}

impl<'a, S> InspectorWidget<'a, S> {
    pub fn new(runtime: &'a PageRuntime<SimDocument, S>) -> Self {
        Self {
            runtime,
            selected: None,
            block: None,
        }
    }

    pub fn selected(mut self, el: Option<ElementHandle>) -> Self {
        self.selected = el;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl<S: KeyValueStore> Widget for InspectorWidget<'_, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = page_lines(self.runtime);
        let arrow = match self.runtime.scroll_direction() {
            ScrollDirection::Up => "↑",
            ScrollDirection::Down => "↓",
        };
        lines.push(field("direction", arrow));
        lines.push(Line::default());
        if let Some(el) = self.selected {
            lines.extend(element_lines(self.runtime, el));
        } else {
            lines.push(Line::styled("click an element to inspect", Style::default()));
        }

        let mut para = Paragraph::new(lines).wrap(Wrap { trim: false });
        if let Some(block) = self.block {
            para = para.block(block);
        }
        para.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tuning::Tuning;
    use crate::page::dom::Bindings;
    use crate::page::store::MemoryStore;

    fn text(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn element_lines_show_classes_and_detachment() {
        let doc = SimDocument::demo().unwrap();
        let mut rt =
            PageRuntime::new(doc, MemoryStore::new(), Tuning::default(), Bindings::default());
        let title = rt.doc().query(".split-title").unwrap();
        let out = text(&element_lines(&rt, title));
        assert!(out.contains("h2.split-title"));
        assert!(out.contains("classes"));

        rt.doc_mut().remove(title);
        assert!(text(&element_lines(&rt, title)).contains("detached"));
    }

    #[test]
    fn page_lines_report_theme() {
        let doc = SimDocument::demo().unwrap();
        let store = MemoryStore::new().with_entry("theme", "light");
        let rt = PageRuntime::new(doc, store, Tuning::default(), Bindings::default());
        assert!(text(&page_lines(&rt)).contains("light"));
    }
}

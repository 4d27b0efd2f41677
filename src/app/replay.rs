//! Headless replay: scroll a page in fixed steps on a synthetic clock and
//! report the resulting element states.

use std::fmt::Write as _;
use std::time::Duration;

use crate::page::dom::Document;
use crate::page::sim::SimDocument;
use crate::page::store::KeyValueStore;

use super::runtime::{PageEvent, PageRuntime};

/// Frames run after the last scroll so staggered work and the scrolling
/// flag can settle.
const SETTLE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
pub struct ReplayPlan {
    /// Final scroll offset.
    pub to: f64,
    /// Pixels per scroll event.
    pub step: f64,
    /// Page-clock time between scroll events (one frame each).
    pub frame: Duration,
}

/// Load the page, scroll to `plan.to`, settle.  Returns the final page clock.
pub fn run<S: KeyValueStore>(rt: &mut PageRuntime<SimDocument, S>, plan: ReplayPlan) -> Duration {
    let mut now = Duration::ZERO;
    rt.dispatch(PageEvent::DomContentLoaded, now);
    rt.dispatch(PageEvent::Load, now);
    rt.animation_frame(now);

    let target = plan.to.clamp(0.0, rt.doc().max_scroll());
    let step = plan.step.abs().max(1.0);
    let mut y = rt.doc().scroll_y();
    while (target - y).abs() > f64::EPSILON {
        y = if target > y {
            (y + step).min(target)
        } else {
            (y - step).max(target)
        };
        now += plan.frame;
        rt.doc_mut().set_scroll_y(y);
        rt.dispatch(PageEvent::Scroll, now);
        rt.animation_frame(now);
    }

    let end = now + SETTLE;
    while now < end {
        now += plan.frame.max(Duration::from_millis(1));
        rt.animation_frame(now);
    }
    tracing::debug!(?now, stats = ?rt.stats(), "replay finished");
    now
}

/// One line per element that carries classes or inline styles.
pub fn report<S: KeyValueStore>(rt: &PageRuntime<SimDocument, S>) -> String {
    let doc = rt.doc();
    let mut out = String::new();
    let stats = rt.stats();
    let _ = writeln!(
        out,
        "scroll_y={} theme={} visual_runs={} timeline_runs={} nav_runs={} gradient_frames={}",
        doc.scroll_y(),
        rt.theme().as_str(),
        stats.visual_runs,
        stats.timeline_runs,
        stats.nav_runs,
        stats.gradient_frames,
    );
    for h in doc.document_order() {
        let Some(el) = doc.element(h) else {
            continue;
        };
        if el.styles.is_empty() && el.classes.is_empty() {
            continue;
        }
        let indent = "  ".repeat(doc.depth(h));
        let _ = write!(out, "{indent}{h} {}", el.label());
        for (property, value) in &el.styles {
            let _ = write!(out, " {property}: {value};");
        }
        out.push('\n');
    }
    out
}

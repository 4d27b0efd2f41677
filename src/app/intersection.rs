//! Intersection notifications: the second reveal path.
//!
//! Root is the full viewport with no margin.  An element is reported the
//! first time its visible area reaches the threshold; it keeps being
//! watched but is never reported twice.

use std::collections::HashSet;

use crate::core::geometry::{ElementHandle, Rect};
use crate::page::dom::Document;

/// Fraction of `rect`'s area inside a `width × height` viewport at the origin.
pub fn visible_ratio(rect: &Rect, viewport_width: f64, viewport_height: f64) -> f64 {
    let area = rect.width * rect.height;
    if area <= 0.0 {
        // Zero-area boxes count as fully visible when they sit inside.
        let inside = rect.top >= 0.0
            && rect.top <= viewport_height
            && rect.left >= 0.0
            && rect.left <= viewport_width;
        return if inside { 1.0 } else { 0.0 };
    }
    let w = (rect.right().min(viewport_width) - rect.left.max(0.0)).max(0.0);
    let h = (rect.bottom().min(viewport_height) - rect.top.max(0.0)).max(0.0);
    (w * h) / area
}

#[derive(Debug, Clone)]
pub struct IntersectionWatcher {
    threshold: f64,
    watched: Vec<ElementHandle>,
    reported: HashSet<ElementHandle>,
}

impl IntersectionWatcher {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            watched: Vec::new(),
            reported: HashSet::new(),
        }
    }

    pub fn observe(&mut self, el: ElementHandle) {
        if !self.watched.contains(&el) {
            self.watched.push(el);
        }
    }

    pub fn watched(&self) -> usize {
        self.watched.len()
    }

    /// Newly intersecting elements, in observation order.
    pub fn check<D: Document + ?Sized>(&mut self, doc: &D) -> Vec<ElementHandle> {
        let (vw, vh) = (doc.viewport_width(), doc.viewport_height());
        let mut hits = Vec::new();
        for &el in &self.watched {
            if self.reported.contains(&el) {
                continue;
            }
            let Some(rect) = doc.bounding_rect(el) else {
                continue;
            };
            if visible_ratio(&rect, vw, vh) >= self.threshold {
                self.reported.insert(el);
                hits.push(el);
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::sim::SimDocument;

    const CARDS: &str = r#"
[viewport]
width = 1000
height = 1000

[[element]]
class = ["card", "near"]
rect = [0, 850, 300, 200]

[[element]]
class = ["card", "far"]
rect = [0, 1500, 300, 200]

[[element]]
class = ["card", "sliver"]
rect = [400, 980, 300, 200]
"#;

    fn watching_all() -> (SimDocument, IntersectionWatcher) {
        let doc = SimDocument::from_toml(CARDS).unwrap();
        let mut watcher = IntersectionWatcher::new(0.15);
        for el in doc.query_all(".card") {
            watcher.observe(el);
        }
        (doc, watcher)
    }

    #[test]
    fn ratio_of_partially_visible_box() {
        // Half of the box hangs below an 800px viewport.
        let r = Rect::new(0.0, 700.0, 100.0, 200.0);
        assert!((visible_ratio(&r, 1000.0, 800.0) - 0.5).abs() < 1e-9);
        let off = Rect::new(0.0, 900.0, 100.0, 200.0);
        assert_eq!(visible_ratio(&off, 1000.0, 800.0), 0.0);
        let inside = Rect::new(10.0, 10.0, 100.0, 100.0);
        assert_eq!(visible_ratio(&inside, 1000.0, 800.0), 1.0);
    }

    #[test]
    fn threshold_boundary() {
        // 15% of 200px = 30px visible.
        let r = Rect::new(0.0, 770.0, 100.0, 200.0);
        assert!((visible_ratio(&r, 1000.0, 800.0) - 0.15).abs() < 1e-9);
    }

    #[test]
    fn check_reports_each_element_once() {
        let (mut doc, mut watcher) = watching_all();
        let near = doc.query(".near").unwrap();
        let far = doc.query(".far").unwrap();
        assert_eq!(watcher.watched(), 3);

        // 150 of 200px visible; the sliver shows only 20px (10%).
        assert_eq!(watcher.check(&doc), vec![near]);
        assert!(watcher.check(&doc).is_empty());

        doc.set_scroll_y(600.0);
        let hits = watcher.check(&doc);
        assert!(hits.contains(&far));
        assert!(!hits.contains(&near));

        doc.set_scroll_y(0.0);
        assert!(watcher.check(&doc).is_empty());
    }

    #[test]
    fn check_below_threshold_waits() {
        let (mut doc, mut watcher) = watching_all();
        let sliver = doc.query(".sliver").unwrap();
        assert!(!watcher.check(&doc).contains(&sliver));
        // 30px of 200px is exactly the threshold.
        doc.set_scroll_y(10.0);
        assert!(watcher.check(&doc).contains(&sliver));
    }

    #[test]
    fn check_skips_detached_elements() {
        let (mut doc, mut watcher) = watching_all();
        let far = doc.query(".far").unwrap();
        doc.remove(far);
        doc.set_scroll_y(600.0);
        assert!(!watcher.check(&doc).contains(&far));
    }

    #[test]
    fn observing_twice_watches_once() {
        let (doc, mut watcher) = watching_all();
        let near = doc.query(".near").unwrap();
        watcher.observe(near);
        assert_eq!(watcher.watched(), 3);
    }
}

//! Visual state engine: geometry in, visual state out.
//!
//! Every method is a pure function of its arguments except
//! [`RevealTracker`], whose only memory is the monotonic "has this element
//! ever been revealed" set.

use std::collections::HashSet;
use std::time::Duration;

use super::geometry::{ElementGeometry, ElementHandle, Rect};
use super::tuning::{OpacityPolicy, Tuning};

/// Hero translate and fade for one scroll offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parallax {
    pub translate_y: f64,
    pub opacity: f64,
}

/// Result of testing one element against the reveal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealDecision {
    pub reveal: bool,
    /// Presentation stagger; never blocks further computation.
    pub delay: Duration,
}

/// Scroll-derived state of one element, as tracked by the preview.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualState {
    pub revealed: bool,
    pub scale: f64,
    pub opacity: f64,
    pub translate_y: f64,
    pub flags: Vec<&'static str>,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            revealed: false,
            scale: 1.0,
            opacity: 1.0,
            translate_y: 0.0,
            flags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VisualEngine {
    tuning: Tuning,
}

impl VisualEngine {
    pub fn new(tuning: Tuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Scale for scroll text in `[scale_min, scale_max]`, or `None` when the
    /// element is outside the viewport (its last scale stays frozen).
    pub fn text_scale(&self, rect: &Rect, viewport_height: f64) -> Option<f64> {
        if !rect.intersects_viewport(viewport_height) || viewport_height <= 0.0 {
            return None;
        }
        let t = &self.tuning;
        let progress = (viewport_height - rect.top) / viewport_height;
        let scale = t.scale_min + progress * (t.scale_max - t.scale_min);
        Some(scale.clamp(t.scale_min, t.scale_max))
    }

    /// Does `rect` sit above the reveal line?  Stateless; see
    /// [`RevealTracker`] for the sticky version.
    pub fn reveal(&self, rect: &Rect, viewport_height: f64, index: usize) -> RevealDecision {
        RevealDecision {
            reveal: rect.top < viewport_height * self.tuning.reveal_threshold,
            delay: self.tuning.reveal_stagger * index as u32,
        }
    }

    /// Bidirectional: on while the title sits inside the middle band.
    pub fn title_scaled_in(&self, rect: &Rect, viewport_height: f64) -> bool {
        rect.top < viewport_height * self.tuning.title_band_upper
            && rect.bottom() > viewport_height * self.tuning.title_band_lower
    }

    /// Bidirectional: joined once the split title is high enough.
    pub fn split_joined(&self, rect: &Rect, viewport_height: f64) -> bool {
        rect.top < viewport_height * self.tuning.split_threshold
    }

    pub fn parallax(&self, scroll_y: f64) -> Parallax {
        let t = &self.tuning;
        let raw = 1.0 - scroll_y / t.parallax_fade_distance;
        let opacity = match t.opacity_policy {
            OpacityPolicy::Clamp => raw.clamp(0.0, 1.0),
            OpacityPolicy::Raw => raw,
        };
        Parallax {
            translate_y: scroll_y * t.parallax_factor,
            opacity,
        }
    }

    pub fn navbar_scrolled(&self, scroll_y: f64) -> bool {
        scroll_y > self.tuning.navbar_threshold
    }
}

/// Sticky reveal bookkeeping.  Once an element has crossed the reveal line it
/// stays revealed, however far back the user scrolls.
#[derive(Debug, Clone, Default)]
pub struct RevealTracker {
    revealed: HashSet<ElementHandle>,
}

impl RevealTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test a batch in query order.  Returns `(handle, delay)` for elements
    /// revealed for the first time on this pass; the delay is the element's
    /// index in the batch times the stagger.
    pub fn observe(
        &mut self,
        engine: &VisualEngine,
        elements: &[(usize, ElementGeometry)],
        viewport_height: f64,
    ) -> Vec<(ElementHandle, Duration)> {
        let mut fresh = Vec::new();
        for (index, geom) in elements {
            if self.revealed.contains(&geom.handle) {
                continue;
            }
            let decision = engine.reveal(&geom.rect, viewport_height, *index);
            if decision.reveal {
                self.revealed.insert(geom.handle);
                fresh.push((geom.handle, decision.delay));
            }
        }
        fresh
    }

    pub fn is_revealed(&self, handle: ElementHandle) -> bool {
        self.revealed.contains(&handle)
    }

    pub fn len(&self) -> usize {
        self.revealed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(top: f64, height: f64) -> Rect {
        Rect::new(0.0, top, 200.0, height)
    }

    fn geom(id: u32, top: f64) -> ElementGeometry {
        ElementGeometry {
            handle: ElementHandle(id),
            rect: rect(top, 100.0),
        }
    }

    #[test]
    fn text_scale_matches_worked_example() {
        let engine = VisualEngine::default();
        let scale = engine.text_scale(&rect(850.0, 100.0), 1000.0).unwrap();
        assert!((scale - 0.986).abs() < 1e-9);
    }

    #[test]
    fn text_scale_stays_within_bounds() {
        let engine = VisualEngine::default();
        for top in [-500.0, -99.0, 0.0, 1.0, 250.0, 999.0] {
            for vh in [1.0, 300.0, 1000.0, 4000.0] {
                if let Some(s) = engine.text_scale(&rect(top, 100.0), vh) {
                    assert!((0.98..=1.02).contains(&s), "top={top} vh={vh} s={s}");
                }
            }
        }
    }

    #[test]
    fn text_scale_freezes_outside_viewport() {
        let engine = VisualEngine::default();
        assert_eq!(engine.text_scale(&rect(1000.0, 100.0), 1000.0), None);
        assert_eq!(engine.text_scale(&rect(-100.0, 100.0), 1000.0), None);
    }

    #[test]
    fn reveal_delay_is_index_times_stagger() {
        let engine = VisualEngine::default();
        let d = engine.reveal(&rect(100.0, 50.0), 1000.0, 3);
        assert!(d.reveal);
        assert_eq!(d.delay, Duration::from_millis(300));
        assert!(!engine.reveal(&rect(800.0, 50.0), 1000.0, 0).reveal);
    }

    #[test]
    fn reveal_is_monotonic() {
        let engine = VisualEngine::default();
        let mut tracker = RevealTracker::new();
        let fresh = tracker.observe(&engine, &[(0, geom(1, 700.0))], 1000.0);
        assert_eq!(fresh, vec![(ElementHandle(1), Duration::ZERO)]);

        // Scrolling back pushes it below the line; it must stay revealed
        // and must not be re-reported.
        for top in [850.0, 2000.0, 700.0] {
            let again = tracker.observe(&engine, &[(0, geom(1, top))], 1000.0);
            assert!(again.is_empty());
            assert!(tracker.is_revealed(ElementHandle(1)));
        }
    }

    #[test]
    fn title_band_toggles_both_ways() {
        let engine = VisualEngine::default();
        let vh = 1000.0;
        assert!(!engine.title_scaled_in(&rect(800.0, 100.0), vh));
        assert!(engine.title_scaled_in(&rect(500.0, 100.0), vh));
        assert!(engine.title_scaled_in(&rect(500.0, 100.0), vh));
        assert!(!engine.title_scaled_in(&rect(100.0, 100.0), vh));
        assert!(engine.title_scaled_in(&rect(500.0, 100.0), vh));
    }

    #[test]
    fn split_state_is_bidirectional() {
        let engine = VisualEngine::default();
        assert!(engine.split_joined(&rect(599.0, 10.0), 1000.0));
        assert!(!engine.split_joined(&rect(600.0, 10.0), 1000.0));
        assert!(engine.split_joined(&rect(10.0, 10.0), 1000.0));
    }

    #[test]
    fn parallax_opacity_policies() {
        let clamped = VisualEngine::default();
        let p = clamped.parallax(1400.0);
        assert_eq!(p.opacity, 0.0);
        assert!((p.translate_y - 420.0).abs() < 1e-9);

        let raw = VisualEngine::new(Tuning {
            opacity_policy: OpacityPolicy::Raw,
            ..Tuning::default()
        });
        assert!((raw.parallax(1400.0).opacity + 1.0).abs() < 1e-9);
        assert!((raw.parallax(350.0).opacity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn navbar_threshold_is_strict() {
        let engine = VisualEngine::default();
        assert!(!engine.navbar_scrolled(100.0));
        assert!(engine.navbar_scrolled(100.5));
    }
}

//! Timeline progress: which marker the glowing dot sits on.

use super::geometry::Rect;
use super::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineProgress {
    /// Fraction through the active zone, always in `[0, 1]`.
    pub progress: f64,
    /// Always a valid index into the marker list.
    pub active_marker_index: usize,
    /// Marker centre relative to the timeline's left edge.  `None` while
    /// inactive: the dot keeps its previous offset.
    pub dot_offset_px: Option<f64>,
    pub is_active: bool,
}

impl TimelineProgress {
    fn inactive() -> Self {
        Self {
            progress: 0.0,
            active_marker_index: 0,
            dot_offset_px: None,
            is_active: false,
        }
    }
}

/// Progress for one timeline track.  Tracks are independent of each other.
///
/// Returns `None` when the track has no markers.
pub fn timeline_progress(
    timeline: &Rect,
    markers: &[Rect],
    viewport_height: f64,
    tuning: &Tuning,
) -> Option<TimelineProgress> {
    if markers.is_empty() {
        return None;
    }

    let zone_start = viewport_height * tuning.timeline_zone_start;
    let in_view = timeline.intersects_viewport(viewport_height);
    if !in_view || timeline.top >= zone_start {
        return Some(TimelineProgress::inactive());
    }

    let zone_end = -timeline.height * tuning.timeline_zone_end;
    let span = zone_start - zone_end;
    let progress = if span > 0.0 && span.is_finite() {
        ((zone_start - timeline.top) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let count = markers.len();
    let index = ((progress * count as f64).floor() as usize).min(count - 1);
    let marker = &markers[index];

    Some(TimelineProgress {
        progress,
        active_marker_index: index,
        dot_offset_px: Some(marker.center_x() - timeline.left),
        is_active: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(n: usize) -> Vec<Rect> {
        (0..n)
            .map(|i| Rect::new(100.0 + i as f64 * 200.0, 0.0, 20.0, 20.0))
            .collect()
    }

    /// Place a timeline so that its progress comes out to exactly `p`.
    fn timeline_at(p: f64, vh: f64, height: f64) -> Rect {
        let start = vh * 0.7;
        let end = -height * 0.5;
        let top = start - p * (start - end);
        Rect::new(50.0, top, 1000.0, height)
    }

    #[test]
    fn half_progress_with_four_markers_selects_index_two() {
        let tuning = Tuning::default();
        let tl = timeline_at(0.5, 1000.0, 600.0);
        let p = timeline_progress(&tl, &markers(4), 1000.0, &tuning).unwrap();
        assert!(p.is_active);
        assert!((p.progress - 0.5).abs() < 1e-9);
        assert_eq!(p.active_marker_index, 2);
        // marker 2 spans 500..520 → centre 510, timeline left 50.
        assert_eq!(p.dot_offset_px, Some(460.0));
    }

    #[test]
    fn full_progress_clamps_to_last_marker() {
        let tuning = Tuning::default();
        let tl = timeline_at(1.0, 1000.0, 600.0);
        let p = timeline_progress(&tl, &markers(4), 1000.0, &tuning).unwrap();
        assert_eq!(p.progress, 1.0);
        assert_eq!(p.active_marker_index, 3);
    }

    #[test]
    fn index_is_always_in_range() {
        let tuning = Tuning::default();
        for n in 1..6 {
            for top in [-5000.0, -300.0, -1.0, 0.0, 100.0, 699.0] {
                let tl = Rect::new(0.0, top, 800.0, 600.0);
                if let Some(p) = timeline_progress(&tl, &markers(n), 1000.0, &tuning) {
                    assert!(p.active_marker_index < n);
                    assert!((0.0..=1.0).contains(&p.progress));
                }
            }
        }
    }

    #[test]
    fn below_zone_or_offscreen_is_inactive_without_offset() {
        let tuning = Tuning::default();
        let below = Rect::new(0.0, 750.0, 800.0, 600.0);
        let p = timeline_progress(&below, &markers(3), 1000.0, &tuning).unwrap();
        assert!(!p.is_active);
        assert_eq!(p.dot_offset_px, None);

        let above = Rect::new(0.0, -700.0, 800.0, 600.0);
        let p = timeline_progress(&above, &markers(3), 1000.0, &tuning).unwrap();
        assert!(!p.is_active);
    }

    #[test]
    fn no_markers_skips_track() {
        let tl = Rect::new(0.0, 100.0, 800.0, 600.0);
        assert_eq!(timeline_progress(&tl, &[], 1000.0, &Tuning::default()), None);
    }
}

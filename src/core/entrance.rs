//! Hero entrance choreography and link hover transforms.

use std::time::Duration;

use super::geometry::ElementHandle;
use super::tuning::Tuning;
use super::update::EntrancePhase;

/// Transition applied when the hero children settle into place.
pub const ENTRANCE_TRANSITION: &str = "all 1s cubic-bezier(0.16, 1, 0.3, 1)";

pub const HOVER_ON_TRANSFORM: &str = "translateX(5px) scale(1.1)";
pub const HOVER_OFF_TRANSFORM: &str = "translateX(0) scale(1)";

/// One scheduled step of the entrance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntranceStep {
    pub target: ElementHandle,
    pub phase: EntrancePhase,
    /// Offset from the `load` event.
    pub at: Duration,
}

/// Child `i` primes at `i * stagger` and settles `settle` later.
pub fn entrance_plan(children: &[ElementHandle], tuning: &Tuning) -> Vec<EntranceStep> {
    let mut steps = Vec::with_capacity(children.len() * 2);
    for (i, &target) in children.iter().enumerate() {
        let prime_at = tuning.entrance_stagger * i as u32;
        steps.push(EntranceStep {
            target,
            phase: EntrancePhase::Prime,
            at: prime_at,
        });
        steps.push(EntranceStep {
            target,
            phase: EntrancePhase::Settle,
            at: prime_at + tuning.entrance_settle,
        });
    }
    steps
}

/// Inline styles for an entrance phase: `(property, value)` pairs.
pub fn entrance_styles(phase: EntrancePhase, offset_px: f64) -> Vec<(&'static str, String)> {
    match phase {
        EntrancePhase::Prime => vec![
            ("opacity", "0".into()),
            ("transform", format!("translateY({offset_px}px)")),
        ],
        EntrancePhase::Settle => vec![
            ("transition", ENTRANCE_TRANSITION.into()),
            ("opacity", "1".into()),
            ("transform", "translateY(0)".into()),
        ],
    }
}

pub fn hover_transform(hovered: bool) -> &'static str {
    if hovered {
        HOVER_ON_TRANSFORM
    } else {
        HOVER_OFF_TRANSFORM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_staggers_children() {
        let kids = [ElementHandle(1), ElementHandle(2), ElementHandle(3)];
        let plan = entrance_plan(&kids, &Tuning::default());
        let times: Vec<u64> = plan.iter().map(|s| s.at.as_millis() as u64).collect();
        assert_eq!(times, vec![0, 100, 200, 300, 400, 500]);
        assert_eq!(plan[4].target, ElementHandle(3));
        assert_eq!(plan[4].phase, EntrancePhase::Prime);
    }

    #[test]
    fn prime_styles_use_offset() {
        let styles = entrance_styles(EntrancePhase::Prime, 30.0);
        assert!(styles.contains(&("transform", "translateY(30px)".to_string())));
        let settle = entrance_styles(EntrancePhase::Settle, 30.0);
        assert_eq!(settle[0], ("transition", ENTRANCE_TRANSITION.to_string()));
    }
}

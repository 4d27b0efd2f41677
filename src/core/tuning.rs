//! Numeric knobs for every scroll effect.
//!
//! Defaults reproduce the stock page.  [`AppConfig`](crate::config::AppConfig)
//! persists overrides.

use std::time::Duration;

/// What to do with parallax opacity once the hero has scrolled past the
/// fade distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpacityPolicy {
    /// Clamp to `[0, 1]`.
    #[default]
    Clamp,
    /// Emit `1 - y/fade` as-is, negative values included.
    Raw,
}

impl OpacityPolicy {
    pub fn label(self) -> &'static str {
        match self {
            OpacityPolicy::Clamp => "clamp",
            OpacityPolicy::Raw => "raw",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "clamp" => Some(OpacityPolicy::Clamp),
            "raw" => Some(OpacityPolicy::Raw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    /// Reveal once `top < vh * reveal_threshold`.
    pub reveal_threshold: f64,
    /// Per-index delay between staggered reveals.
    pub reveal_stagger: Duration,
    /// Title "scaled-in" band: `top < vh * upper && bottom > vh * lower`.
    pub title_band_upper: f64,
    pub title_band_lower: f64,
    /// Split title joins once `top < vh * split_threshold`.
    pub split_threshold: f64,
    pub scale_min: f64,
    pub scale_max: f64,
    pub parallax_factor: f64,
    /// Scroll distance over which the hero fades from 1 to 0.
    pub parallax_fade_distance: f64,
    pub opacity_policy: OpacityPolicy,
    /// Added to `scroll_y` before testing nav section ranges.
    pub nav_offset: f64,
    /// Navbar switches to its glass style past this offset.
    pub navbar_threshold: f64,
    /// Timeline zone starts at `vh * timeline_zone_start` ...
    pub timeline_zone_start: f64,
    /// ... and ends at `-timeline_height * timeline_zone_end`.
    pub timeline_zone_end: f64,
    /// Gradient phase increment per animation frame.
    pub gradient_step: f64,
    pub resize_debounce: Duration,
    pub scrolling_quiet: Duration,
    /// Visible-area ratio for the intersection path.
    pub intersection_threshold: f64,
    pub entrance_stagger: Duration,
    pub entrance_settle: Duration,
    pub entrance_offset_px: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            reveal_threshold: 0.8,
            reveal_stagger: Duration::from_millis(100),
            title_band_upper: 0.7,
            title_band_lower: 0.3,
            split_threshold: 0.6,
            scale_min: 0.98,
            scale_max: 1.02,
            parallax_factor: 0.3,
            parallax_fade_distance: 700.0,
            opacity_policy: OpacityPolicy::Clamp,
            nav_offset: 200.0,
            navbar_threshold: 100.0,
            timeline_zone_start: 0.7,
            timeline_zone_end: 0.5,
            gradient_step: 0.1,
            resize_debounce: Duration::from_millis(250),
            scrolling_quiet: Duration::from_millis(150),
            intersection_threshold: 0.15,
            entrance_stagger: Duration::from_millis(200),
            entrance_settle: Duration::from_millis(100),
            entrance_offset_px: 30.0,
        }
    }
}

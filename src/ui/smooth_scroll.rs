//! Pixel smooth scroll with exponential ease-out.
//!
//! Drives `scroll_into_view` requests in the preview: each frame the page
//! moves a fixed fraction of the remaining distance toward the target, so
//! the scroll decelerates and the effects see a stream of scroll events.

/// Snap to the target once closer than this many pixels.
const SNAP_PX: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct SmoothScroll {
    target: Option<f64>,
    /// `remaining *= (1 - speed)` each frame.  Higher settles faster.
    speed: f64,
}

impl SmoothScroll {
    pub fn new(speed: f64) -> Self {
        Self {
            target: None,
            speed: speed.clamp(0.05, 0.95),
        }
    }

    pub fn set_target(&mut self, y: f64) {
        self.target = Some(y);
    }

    /// Manual scrolling takes over from an animation in flight.
    pub fn cancel(&mut self) {
        self.target = None;
    }

    /// Next scroll offset from `current`, or `None` when idle.  Lands exactly
    /// on the target and then goes idle.
    pub fn step(&mut self, current: f64) -> Option<f64> {
        let target = self.target?;
        let remaining = target - current;
        if remaining.abs() < SNAP_PX {
            self.target = None;
            return if remaining == 0.0 { None } else { Some(target) };
        }
        let next = current + remaining * self.speed;
        if (target - next).abs() < SNAP_PX {
            self.target = None;
            return Some(target);
        }
        Some(next)
    }

    pub fn is_animating(&self) -> bool {
        self.target.is_some()
    }
}

impl Default for SmoothScroll {
    fn default() -> Self {
        Self::new(0.3)
    }
}

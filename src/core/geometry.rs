//! Viewport geometry: rectangles, scroll samples, and element handles.
//!
//! Everything here is plain data.  Rectangles returned by a document are
//! *viewport relative* (like `getBoundingClientRect`), so a rect's `top`
//! shrinks as the page scrolls down.

use std::fmt;

/// Opaque handle to an element owned by a [`Document`](crate::page::dom::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u32);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Axis-aligned box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Horizontal centre, in the same coordinate space as `left`.
    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    /// `top < vh && bottom > 0`, any vertical overlap with the viewport.
    pub fn intersects_viewport(&self, viewport_height: f64) -> bool {
        self.top < viewport_height && self.bottom() > 0.0
    }

    /// Shift the box vertically (page → viewport coordinates and back).
    pub fn shifted(&self, dy: f64) -> Self {
        Self {
            top: self.top + dy,
            ..*self
        }
    }
}

/// Direction of the most recent scroll movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    Up,
    #[default]
    Down,
}

/// Remembers the previous scroll offset so each tick can derive a direction.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    last_scroll_y: f64,
    direction: ScrollDirection,
}

impl ScrollTracker {
    pub fn new(initial_scroll_y: f64) -> Self {
        Self {
            last_scroll_y: initial_scroll_y,
            direction: ScrollDirection::Down,
        }
    }

    /// Record a new offset.  Only a strictly larger offset counts as `Down`.
    pub fn observe(&mut self, scroll_y: f64) -> ScrollDirection {
        self.direction = if scroll_y > self.last_scroll_y {
            ScrollDirection::Down
        } else {
            ScrollDirection::Up
        };
        self.last_scroll_y = scroll_y;
        self.direction
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn last_scroll_y(&self) -> f64 {
        self.last_scroll_y
    }
}

/// Scroll-dependent page state sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    pub scroll_y: f64,
    pub direction: ScrollDirection,
    pub viewport_height: f64,
    pub viewport_width: f64,
    pub document_height: f64,
}

impl ScrollSample {
    /// How far through the scrollable range the page is, in `[0, 1]`.
    ///
    /// Pages that fit in a single screen have no scrollable range; they
    /// report `0.0` rather than dividing by (nearly) zero.
    pub fn scroll_fraction(&self) -> f64 {
        let span = self.document_height - self.viewport_height;
        if !span.is_finite() || span <= 1.0 || !self.scroll_y.is_finite() {
            return 0.0;
        }
        (self.scroll_y / span).clamp(0.0, 1.0)
    }
}

/// An element's viewport-relative box, captured for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementGeometry {
    pub handle: ElementHandle,
    pub rect: Rect,
}

//! Declarative output of the engine.
//!
//! The engine never touches a document; it returns a list of
//! [`VisualUpdate`]s and [`apply`](crate::page::dom::apply) writes them out.

use std::time::Duration;

use super::geometry::ElementHandle;
use super::gradient::Gradient;
use super::theme::Theme;

/// Phase of the one-off hero entrance animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrancePhase {
    /// Snap to the hidden, offset start position.
    Prime,
    /// Transition into place.
    Settle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VisualUpdate {
    /// Navbar glass style on/off.
    NavbarScrolled { target: ElementHandle, on: bool },
    /// `transform: scale(..)` on scroll text.
    TextScale { target: ElementHandle, scale: f64 },
    /// One-shot reveal, applied after `delay`.
    Reveal { target: ElementHandle, delay: Duration },
    TitleScaledIn { target: ElementHandle, on: bool },
    SplitJoined { target: ElementHandle, on: bool },
    /// Hero translate + fade.
    Parallax {
        target: ElementHandle,
        translate_y: f64,
        opacity: f64,
    },
    /// Timeline progress dot.  `left_px == None` keeps the previous offset.
    TimelineDot {
        dot: ElementHandle,
        left_px: Option<f64>,
        active: bool,
    },
    /// Exactly one nav link per section id is marked active.
    NavActive { section_id: String },
    /// Body "scrolling" flag used to suppress jank-prone effects.
    Scrolling { target: ElementHandle, on: bool },
    Background { target: ElementHandle, gradient: Gradient },
    ThemeMode { target: ElementHandle, theme: Theme },
    Entrance {
        target: ElementHandle,
        phase: EntrancePhase,
    },
    Hover { target: ElementHandle, hovered: bool },
    ScrollIntoView { target: ElementHandle },
}

impl VisualUpdate {
    /// Primary element this update writes to.
    pub fn target(&self) -> Option<ElementHandle> {
        match self {
            VisualUpdate::NavbarScrolled { target, .. }
            | VisualUpdate::TextScale { target, .. }
            | VisualUpdate::Reveal { target, .. }
            | VisualUpdate::TitleScaledIn { target, .. }
            | VisualUpdate::SplitJoined { target, .. }
            | VisualUpdate::Parallax { target, .. }
            | VisualUpdate::Scrolling { target, .. }
            | VisualUpdate::Background { target, .. }
            | VisualUpdate::ThemeMode { target, .. }
            | VisualUpdate::Entrance { target, .. }
            | VisualUpdate::Hover { target, .. }
            | VisualUpdate::ScrollIntoView { target } => Some(*target),
            VisualUpdate::TimelineDot { dot, .. } => Some(*dot),
            VisualUpdate::NavActive { .. } => None,
        }
    }
}

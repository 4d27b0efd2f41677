//! The document collaborator and the thin apply step.
//!
//! [`Document`] is everything the engine needs from a page: queries,
//! geometry, class and inline-style writes.  [`apply`] is the only place
//! that turns [`VisualUpdate`]s into writes.

use crate::core::entrance::{entrance_styles, hover_transform};
use crate::core::geometry::{ElementHandle, Rect};
use crate::core::gradient::css_number;
use crate::core::nav::nav_target;
use crate::core::theme::Theme;
use crate::core::tuning::Tuning;
use crate::core::update::VisualUpdate;

pub trait Document {
    /// All matches in document order.  An invalid selector matches nothing.
    fn query_all(&self, selector: &str) -> Vec<ElementHandle>;

    fn query(&self, selector: &str) -> Option<ElementHandle> {
        self.query_all(selector).into_iter().next()
    }

    /// Matches among the descendants of `root`.
    fn query_within(&self, root: ElementHandle, selector: &str) -> Vec<ElementHandle>;

    fn children(&self, el: ElementHandle) -> Vec<ElementHandle>;

    fn body(&self) -> ElementHandle;

    fn attribute(&self, el: ElementHandle, name: &str) -> Option<String>;

    /// Viewport-relative box, or `None` once the element is detached.
    fn bounding_rect(&self, el: ElementHandle) -> Option<Rect>;

    /// Page-relative `(top, height)`.
    fn offset_box(&self, el: ElementHandle) -> Option<(f64, f64)>;

    fn add_class(&mut self, el: ElementHandle, class: &str);
    fn remove_class(&mut self, el: ElementHandle, class: &str);
    fn has_class(&self, el: ElementHandle, class: &str) -> bool;

    fn toggle_class(&mut self, el: ElementHandle, class: &str, on: bool) {
        if on {
            self.add_class(el, class);
        } else {
            self.remove_class(el, class);
        }
    }

    fn set_style(&mut self, el: ElementHandle, property: &str, value: &str);
    fn style(&self, el: ElementHandle, property: &str) -> Option<String>;

    /// Append a new child carrying `class`.  `None` if `parent` is gone.
    fn create_child(&mut self, parent: ElementHandle, class: &str) -> Option<ElementHandle>;

    fn scroll_y(&self) -> f64;
    fn set_scroll_y(&mut self, y: f64);

    /// Bring `el` to the top of the viewport.
    fn scroll_into_view(&mut self, el: ElementHandle) {
        if let Some((top, _)) = self.offset_box(el) {
            self.set_scroll_y(top);
        }
    }

    fn viewport_height(&self) -> f64;
    fn viewport_width(&self) -> f64;
    fn document_height(&self) -> f64;
}

/// Selectors for every element group the engine drives.
#[derive(Debug, Clone, PartialEq)]
pub struct Selectors {
    pub navbar: String,
    pub scroll_text: String,
    pub reveal: String,
    /// Elements watched by the intersection path.
    pub observed: String,
    pub about_title: String,
    pub split_title: String,
    pub hero: String,
    pub hero_children: String,
    pub sections: String,
    pub nav_links: String,
    pub timelines: String,
    pub timeline_markers: String,
    pub hover_links: String,
    pub theme_toggle: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            navbar: "#navbar".into(),
            scroll_text: ".scroll-text".into(),
            reveal: ".reveal-line, .scroll-reveal, .skill-card, .project-card, .timeline-item, .contact-content".into(),
            observed: ".reveal-line, .skill-card, .project-card, .timeline-item, .contact-content".into(),
            about_title: ".about-section .section-title".into(),
            split_title: ".split-title".into(),
            hero: ".hero-content".into(),
            hero_children: ".hero-content > *".into(),
            sections: "section[id]".into(),
            nav_links: ".nav-link".into(),
            timelines: ".timeline".into(),
            timeline_markers: ".timeline-marker".into(),
            hover_links: ".github-link".into(),
            theme_toggle: "#themeToggle".into(),
        }
    }
}

/// Class names written by [`apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNames {
    pub scrolled: String,
    pub visible: String,
    pub scaled_in: String,
    pub split_joined: String,
    pub active: String,
    pub scrolling: String,
    pub light_mode: String,
    pub timeline_dot: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            scrolled: "scrolled".into(),
            visible: "visible".into(),
            scaled_in: "scaled-in".into(),
            split_joined: "split-joined".into(),
            active: "active".into(),
            scrolling: "scrolling".into(),
            light_mode: "light-mode".into(),
            timeline_dot: "timeline-progress-dot".into(),
        }
    }
}

/// Selectors and class names together: how the engine binds to a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    pub selectors: Selectors,
    pub classes: ClassNames,
}

/// Write `updates` to `doc`.
///
/// `Reveal` delays are honoured upstream by the runtime's timer queue; by the
/// time a reveal reaches this function it is due.
pub fn apply<D: Document + ?Sized>(
    doc: &mut D,
    bindings: &Bindings,
    tuning: &Tuning,
    updates: &[VisualUpdate],
) {
    let classes = &bindings.classes;
    for update in updates {
        match update {
            VisualUpdate::NavbarScrolled { target, on } => {
                doc.toggle_class(*target, &classes.scrolled, *on);
            }
            VisualUpdate::TextScale { target, scale } => {
                doc.set_style(*target, "transform", &format!("scale({})", css_number(*scale)));
            }
            VisualUpdate::Reveal { target, .. } => {
                doc.add_class(*target, &classes.visible);
            }
            VisualUpdate::TitleScaledIn { target, on } => {
                doc.toggle_class(*target, &classes.scaled_in, *on);
            }
            VisualUpdate::SplitJoined { target, on } => {
                doc.toggle_class(*target, &classes.split_joined, *on);
            }
            VisualUpdate::Parallax {
                target,
                translate_y,
                opacity,
            } => {
                doc.set_style(
                    *target,
                    "transform",
                    &format!("translateY({}px)", css_number(*translate_y)),
                );
                doc.set_style(*target, "opacity", &css_number(*opacity));
            }
            VisualUpdate::TimelineDot {
                dot,
                left_px,
                active,
            } => {
                if let Some(left) = left_px {
                    doc.set_style(*dot, "left", &format!("{}px", css_number(*left)));
                }
                doc.toggle_class(*dot, &classes.active, *active);
            }
            VisualUpdate::NavActive { section_id } => {
                for link in doc.query_all(&bindings.selectors.nav_links) {
                    doc.remove_class(link, &classes.active);
                    let href = doc.attribute(link, "href");
                    if href.as_deref().and_then(nav_target) == Some(section_id.as_str()) {
                        doc.add_class(link, &classes.active);
                    }
                }
            }
            VisualUpdate::Scrolling { target, on } => {
                doc.toggle_class(*target, &classes.scrolling, *on);
            }
            VisualUpdate::Background { target, gradient } => {
                doc.set_style(*target, "background", &gradient.to_css());
            }
            VisualUpdate::ThemeMode { target, theme } => {
                doc.toggle_class(*target, &classes.light_mode, *theme == Theme::Light);
            }
            VisualUpdate::Entrance { target, phase } => {
                for (property, value) in entrance_styles(*phase, tuning.entrance_offset_px) {
                    doc.set_style(*target, property, &value);
                }
            }
            VisualUpdate::Hover { target, hovered } => {
                doc.set_style(*target, "transform", hover_transform(*hovered));
            }
            VisualUpdate::ScrollIntoView { target } => {
                doc.scroll_into_view(*target);
            }
        }
    }
}

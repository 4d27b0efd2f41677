//! Page runtime: the engine-state object.
//!
//! One instance per page.  It owns the document, the theme, and every piece
//! of state the effects need between events: last scroll offset, reveal
//! set, gradient phase, one frame gate per pipeline, the resize debouncer,
//! the scrolling flag, and pending staggered work.
//!
//! The host delivers page events through [`PageRuntime::dispatch`] and calls
//! [`PageRuntime::animation_frame`] once per rendered frame.

use std::collections::HashMap;
use std::time::Duration;

use crate::core::engine::{RevealTracker, VisualEngine, VisualState};
use crate::core::entrance::entrance_plan;
use crate::core::geometry::{ElementHandle, ScrollDirection, ScrollTracker};
use crate::core::gradient::{Gradient, GradientAnimator};
use crate::core::nav::{active_section, nav_target};
use crate::core::theme::{Theme, ThemeState};
use crate::core::timeline::timeline_progress;
use crate::core::tuning::Tuning;
use crate::core::update::{EntrancePhase, VisualUpdate};
use crate::page::dom::{apply, Bindings, Document};
use crate::page::store::KeyValueStore;

use super::intersection::IntersectionWatcher;
use super::sampler::{sample_elements, sample_one, sample_scroll, sample_sections};
use super::scheduler::{Debouncer, FrameGate, QuietFlag, TimerQueue};

/// Notifications from the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// The document's scroll offset changed.
    Scroll,
    /// The viewport changed size.
    Resize,
    DomContentLoaded,
    Load,
    MouseEnter(ElementHandle),
    MouseLeave(ElementHandle),
    Click(ElementHandle),
}

/// How many times each pipeline has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub visual_runs: u64,
    pub timeline_runs: u64,
    pub resize_runs: u64,
    pub nav_runs: u64,
    pub gradient_frames: u64,
}

/// Work deferred to a later frame.
#[derive(Debug, Clone, Copy)]
enum Deferred {
    Reveal(ElementHandle),
    Entrance(ElementHandle, EntrancePhase),
}

pub struct PageRuntime<D, S> {
    doc: D,
    theme: ThemeState<S>,
    bindings: Bindings,
    engine: VisualEngine,
    scroll: ScrollTracker,
    reveals: RevealTracker,
    gradient: GradientAnimator,
    gradient_running: bool,
    background: Option<Gradient>,
    visual_gate: FrameGate,
    timeline_gate: FrameGate,
    resize: Debouncer,
    scrolling: QuietFlag,
    timers: TimerQueue<Deferred>,
    intersection: IntersectionWatcher,
    /// `(timeline, progress dot)` pairs created on DOM ready.
    timeline_dots: Vec<(ElementHandle, ElementHandle)>,
    states: HashMap<ElementHandle, VisualState>,
    stats: PipelineStats,
    ready: bool,
    now: Duration,
}

impl<D: Document, S: KeyValueStore> PageRuntime<D, S> {
    /// Build the runtime and apply the persisted theme to the body.
    pub fn new(doc: D, store: S, tuning: Tuning, bindings: Bindings) -> Self {
        let theme = ThemeState::load(store);
        let scroll = ScrollTracker::new(doc.scroll_y());
        let mut rt = Self {
            gradient: GradientAnimator::new(tuning.gradient_step),
            resize: Debouncer::new(tuning.resize_debounce),
            scrolling: QuietFlag::new(tuning.scrolling_quiet),
            intersection: IntersectionWatcher::new(tuning.intersection_threshold),
            engine: VisualEngine::new(tuning),
            doc,
            theme,
            bindings,
            scroll,
            reveals: RevealTracker::new(),
            gradient_running: false,
            background: None,
            visual_gate: FrameGate::new(),
            timeline_gate: FrameGate::new(),
            timers: TimerQueue::new(),
            timeline_dots: Vec::new(),
            states: HashMap::new(),
            stats: PipelineStats::default(),
            ready: false,
            now: Duration::ZERO,
        };
        let body = rt.doc.body();
        let theme = rt.theme.current();
        rt.emit(vec![VisualUpdate::ThemeMode { target: body, theme }]);
        rt
    }

    // ── accessors ───────────────────────────────────────────────

    pub fn doc(&self) -> &D {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    pub fn tuning(&self) -> &Tuning {
        self.engine.tuning()
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn is_revealed(&self, el: ElementHandle) -> bool {
        self.reveals.is_revealed(el)
    }

    /// Direction seen by the last visual pass.
    pub fn scroll_direction(&self) -> ScrollDirection {
        self.scroll.direction()
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling.is_on()
    }

    pub fn gradient_phase(&self) -> f64 {
        self.gradient.phase()
    }

    /// Last gradient written to the body.
    pub fn background(&self) -> Option<&Gradient> {
        self.background.as_ref()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn timeline_dots(&self) -> &[(ElementHandle, ElementHandle)] {
        &self.timeline_dots
    }

    /// Accumulated visual state of an element (default if never touched).
    pub fn visual_state(&self, el: ElementHandle) -> VisualState {
        self.states.get(&el).cloned().unwrap_or_default()
    }

    // ── events ──────────────────────────────────────────────────

    /// Handle one page event.  Returns the updates applied synchronously;
    /// throttled pipelines run later in [`Self::animation_frame`].
    ///
    /// An event that moves the page itself (a nav click jumping to its
    /// section) is followed by the same work as a user scroll.
    pub fn dispatch(&mut self, event: PageEvent, now: Duration) -> Vec<VisualUpdate> {
        self.now = now;
        let scroll_before = self.doc.scroll_y();
        let updates = match event {
            PageEvent::Scroll => self.on_scroll(now),
            PageEvent::Resize => {
                self.resize.trigger(now);
                Vec::new()
            }
            PageEvent::DomContentLoaded => self.on_dom_ready(),
            PageEvent::Load => {
                self.on_load(now);
                Vec::new()
            }
            PageEvent::MouseEnter(el) => self.on_hover(el, true),
            PageEvent::MouseLeave(el) => self.on_hover(el, false),
            PageEvent::Click(el) => self.on_click(el),
        };
        let mut applied = self.emit(updates);
        if self.doc.scroll_y() != scroll_before {
            let follow = self.on_scroll(now);
            applied.extend(self.emit(follow));
        }
        applied
    }

    /// One rendered frame: run pending pipelines, due timers, debouncers and
    /// the gradient.  Returns everything applied.
    pub fn animation_frame(&mut self, now: Duration) -> Vec<VisualUpdate> {
        self.now = now;
        let mut updates = Vec::new();

        if self.visual_gate.take() {
            updates.extend(self.visual_pass());
        }
        if self.timeline_gate.take() {
            updates.extend(self.timeline_pass());
        }
        if self.resize.poll(now) {
            self.stats.resize_runs += 1;
            tracing::debug!(?now, "resize settled, re-checking reveals");
            updates.extend(self.reveal_pass());
        }
        if self.scrolling.poll(now) {
            updates.push(VisualUpdate::Scrolling {
                target: self.doc.body(),
                on: false,
            });
        }
        for deferred in self.timers.drain_due(now) {
            updates.push(match deferred {
                Deferred::Reveal(target) => VisualUpdate::Reveal {
                    target,
                    delay: Duration::ZERO,
                },
                Deferred::Entrance(target, phase) => VisualUpdate::Entrance { target, phase },
            });
        }
        if self.ready {
            for target in self.intersection.check(&self.doc) {
                updates.push(VisualUpdate::Reveal {
                    target,
                    delay: Duration::ZERO,
                });
            }
        }
        if self.gradient_running {
            updates.push(self.gradient_frame(true));
        }

        self.emit(updates)
    }

    fn on_scroll(&mut self, now: Duration) -> Vec<VisualUpdate> {
        self.visual_gate.request_tick();
        self.timeline_gate.request_tick();

        let mut updates = self.nav_pass();
        if self.scrolling.touch(now) {
            updates.push(VisualUpdate::Scrolling {
                target: self.doc.body(),
                on: true,
            });
        }
        updates
    }

    fn on_dom_ready(&mut self) -> Vec<VisualUpdate> {
        if self.ready {
            return Vec::new();
        }
        self.ready = true;

        for el in self.doc.query_all(&self.bindings.selectors.observed) {
            self.intersection.observe(el);
        }

        let mut updates = self.reveal_pass();
        self.gradient_running = true;
        updates.push(self.gradient_frame(true));

        let dot_class = self.bindings.classes.timeline_dot.clone();
        for timeline in self.doc.query_all(&self.bindings.selectors.timelines) {
            if let Some(dot) = self.doc.create_child(timeline, &dot_class) {
                self.timeline_dots.push((timeline, dot));
            }
        }
        updates.extend(self.timeline_pass());

        tracing::debug!(
            observed = self.intersection.watched(),
            timelines = self.timeline_dots.len(),
            "page ready"
        );
        updates
    }

    fn on_load(&mut self, now: Duration) {
        let children = self.doc.query_all(&self.bindings.selectors.hero_children);
        for step in entrance_plan(&children, self.engine.tuning()) {
            self.timers
                .push(now + step.at, Deferred::Entrance(step.target, step.phase));
        }
    }

    fn on_hover(&mut self, el: ElementHandle, hovered: bool) -> Vec<VisualUpdate> {
        let links = self.doc.query_all(&self.bindings.selectors.hover_links);
        if links.contains(&el) {
            vec![VisualUpdate::Hover {
                target: el,
                hovered,
            }]
        } else {
            Vec::new()
        }
    }

    fn on_click(&mut self, el: ElementHandle) -> Vec<VisualUpdate> {
        let selectors = &self.bindings.selectors;
        if self.doc.query(&selectors.theme_toggle) == Some(el) {
            let theme = self.theme.toggle();
            tracing::info!(theme = theme.as_str(), "theme toggled");
            let body = self.doc.body();
            return vec![
                VisualUpdate::ThemeMode {
                    target: body,
                    theme,
                },
                self.gradient_frame(false),
            ];
        }

        if self.doc.query_all(&selectors.nav_links).contains(&el) {
            let target = self
                .doc
                .attribute(el, "href")
                .and_then(|href| nav_target(&href).map(|id| format!("#{id}")))
                .and_then(|sel| self.doc.query(&sel));
            if let Some(target) = target {
                return vec![VisualUpdate::ScrollIntoView { target }];
            }
            tracing::debug!(%el, "nav link has no matching section");
        }
        Vec::new()
    }

    // ── pipelines ───────────────────────────────────────────────

    /// Navbar, text scale, reveals, title/split state, and parallax.
    fn visual_pass(&mut self) -> Vec<VisualUpdate> {
        self.stats.visual_runs += 1;
        let direction = self.scroll.observe(self.doc.scroll_y());
        let sample = sample_scroll(&self.doc, direction);
        let vh = sample.viewport_height;
        let selectors = &self.bindings.selectors;
        let mut updates = Vec::new();

        if let Some(navbar) = self.doc.query(&selectors.navbar) {
            updates.push(VisualUpdate::NavbarScrolled {
                target: navbar,
                on: self.engine.navbar_scrolled(sample.scroll_y),
            });
        }

        let texts = self.doc.query_all(&selectors.scroll_text);
        for (_, geom) in sample_elements(&self.doc, &texts) {
            if let Some(scale) = self.engine.text_scale(&geom.rect, vh) {
                updates.push(VisualUpdate::TextScale {
                    target: geom.handle,
                    scale,
                });
            }
        }

        updates.extend(self.reveal_pass());

        if let Some(hero) = self.doc.query(&self.bindings.selectors.hero) {
            let p = self.engine.parallax(sample.scroll_y);
            updates.push(VisualUpdate::Parallax {
                target: hero,
                translate_y: p.translate_y,
                opacity: p.opacity,
            });
        }

        tracing::trace!(scroll_y = sample.scroll_y, ?direction, n = updates.len(), "visual pass");
        updates
    }

    /// Sticky reveals plus the two bidirectional title states.
    fn reveal_pass(&mut self) -> Vec<VisualUpdate> {
        let vh = self.doc.viewport_height();
        let selectors = &self.bindings.selectors;
        let mut updates = Vec::new();

        let candidates = self.doc.query_all(&selectors.reveal);
        let sampled = sample_elements(&self.doc, &candidates);
        for (target, delay) in self.reveals.observe(&self.engine, &sampled, vh) {
            updates.push(VisualUpdate::Reveal { target, delay });
        }

        if let Some(geom) = self
            .doc
            .query(&selectors.about_title)
            .and_then(|h| sample_one(&self.doc, h))
        {
            updates.push(VisualUpdate::TitleScaledIn {
                target: geom.handle,
                on: self.engine.title_scaled_in(&geom.rect, vh),
            });
        }

        if let Some(geom) = self
            .doc
            .query(&selectors.split_title)
            .and_then(|h| sample_one(&self.doc, h))
        {
            updates.push(VisualUpdate::SplitJoined {
                target: geom.handle,
                on: self.engine.split_joined(&geom.rect, vh),
            });
        }

        updates
    }

    fn timeline_pass(&mut self) -> Vec<VisualUpdate> {
        self.stats.timeline_runs += 1;
        let vh = self.doc.viewport_height();
        let marker_sel = &self.bindings.selectors.timeline_markers;
        let mut updates = Vec::new();

        for &(timeline, dot) in &self.timeline_dots {
            let Some(rect) = self.doc.bounding_rect(timeline) else {
                continue;
            };
            if self.doc.bounding_rect(dot).is_none() {
                continue;
            }
            let markers: Vec<_> = self
                .doc
                .query_within(timeline, marker_sel)
                .into_iter()
                .filter_map(|m| self.doc.bounding_rect(m))
                .collect();
            if let Some(p) = timeline_progress(&rect, &markers, vh, self.engine.tuning()) {
                updates.push(VisualUpdate::TimelineDot {
                    dot,
                    left_px: p.dot_offset_px,
                    active: p.is_active,
                });
            }
        }
        updates
    }

    /// Runs on every scroll event, un-throttled.
    fn nav_pass(&mut self) -> Vec<VisualUpdate> {
        self.stats.nav_runs += 1;
        let sections = sample_sections(&self.doc, &self.bindings.selectors.sections);
        let offset = self.engine.tuning().nav_offset;
        match active_section(&sections, self.doc.scroll_y(), offset) {
            Some(id) => vec![VisualUpdate::NavActive {
                section_id: id.to_string(),
            }],
            None => Vec::new(),
        }
    }

    /// Background for the current phase; `advance` is false for the
    /// immediate re-render after a theme switch.
    fn gradient_frame(&mut self, advance: bool) -> VisualUpdate {
        let fraction = sample_scroll(&self.doc, self.scroll.direction()).scroll_fraction();
        let theme = self.theme.current();
        let gradient = if advance {
            self.stats.gradient_frames += 1;
            self.gradient.frame(theme, fraction)
        } else {
            self.gradient.render(theme, fraction)
        };
        self.background = Some(gradient);
        VisualUpdate::Background {
            target: self.doc.body(),
            gradient,
        }
    }

    // ── apply ───────────────────────────────────────────────────

    /// Apply due updates, park staggered reveals on the timer queue, and
    /// record per-element state.  Returns what was applied.
    fn emit(&mut self, updates: Vec<VisualUpdate>) -> Vec<VisualUpdate> {
        let mut due = Vec::with_capacity(updates.len());
        for update in updates {
            match update {
                VisualUpdate::Reveal { target, delay } if !delay.is_zero() => {
                    self.timers.push(self.now + delay, Deferred::Reveal(target));
                }
                other => due.push(other),
            }
        }
        apply(&mut self.doc, &self.bindings, self.engine.tuning(), &due);
        for update in &due {
            self.record(update);
        }
        due
    }

    fn record(&mut self, update: &VisualUpdate) {
        fn flag(state: &mut VisualState, name: &'static str, on: bool) {
            state.flags.retain(|f| *f != name);
            if on {
                state.flags.push(name);
            }
        }

        let Some(target) = update.target() else {
            return;
        };
        let state = self.states.entry(target).or_default();
        match update {
            VisualUpdate::Reveal { .. } => {
                state.revealed = true;
                flag(state, "visible", true);
            }
            VisualUpdate::TextScale { scale, .. } => state.scale = *scale,
            VisualUpdate::TitleScaledIn { on, .. } => flag(state, "scaled-in", *on),
            VisualUpdate::SplitJoined { on, .. } => flag(state, "split-joined", *on),
            VisualUpdate::NavbarScrolled { on, .. } => flag(state, "scrolled", *on),
            VisualUpdate::Parallax {
                translate_y,
                opacity,
                ..
            } => {
                state.translate_y = *translate_y;
                state.opacity = *opacity;
            }
            VisualUpdate::TimelineDot { active, .. } => flag(state, "active", *active),
            VisualUpdate::Scrolling { on, .. } => flag(state, "scrolling", *on),
            VisualUpdate::ThemeMode { theme, .. } => {
                flag(state, "light-mode", *theme == Theme::Light)
            }
            VisualUpdate::Hover { hovered, .. } => flag(state, "hovered", *hovered),
            VisualUpdate::Entrance { phase, .. } => match phase {
                EntrancePhase::Prime => state.opacity = 0.0,
                EntrancePhase::Settle => state.opacity = 1.0,
            },
            VisualUpdate::Background { .. }
            | VisualUpdate::ScrollIntoView { .. }
            | VisualUpdate::NavActive { .. } => {}
        }
    }
}

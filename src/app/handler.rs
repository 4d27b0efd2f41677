//! Input handling: maps key, mouse and terminal events to page events.
//!
//! Every function takes the page clock explicitly so the preview loop and
//! the tests drive the same code.

use std::time::Duration;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::config::Action;
use crate::core::geometry::ElementHandle;
use crate::page::dom::Document;
use crate::page::store::KeyValueStore;
use crate::ui::layout::AppLayout;
use crate::ui::page_view::{hit_test, PageGeometry};

use super::runtime::PageEvent;
use super::state::{AppState, ROW_PX};

/// Process a key event.
pub fn handle_key<S: KeyValueStore>(state: &mut AppState<S>, key: KeyEvent, now: Duration) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    // Ctrl+c always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };
    let step = state.config.scroll_step;
    let page = state.doc().viewport_height() * 0.9;

    match action {
        Action::Quit => state.should_quit = true,
        Action::ScrollUp => scroll_by(state, -step, now),
        Action::ScrollDown => scroll_by(state, step, now),
        Action::PageUp => scroll_by(state, -page, now),
        Action::PageDown => scroll_by(state, page, now),
        Action::JumpTop => scroll_to(state, 0.0, now),
        Action::JumpBottom => scroll_to(state, f64::MAX, now),
        Action::NextLink => cycle_link(state, 1),
        Action::PrevLink => cycle_link(state, -1),
        Action::Activate => {
            if let Some(link) = state.focused_link_handle() {
                click(state, link, now);
            }
        }
        Action::ToggleTheme => {
            let toggle = state
                .doc()
                .query(&state.runtime.bindings().selectors.theme_toggle);
            match toggle {
                Some(el) => click(state, el, now),
                None => state.status_message = Some("page has no theme toggle".into()),
            }
        }
    }
}

/// Process a mouse event against the current layout.
pub fn handle_mouse<S: KeyValueStore>(
    state: &mut AppState<S>,
    mouse: MouseEvent,
    layout: &AppLayout,
    now: Duration,
) {
    let step = state.config.scroll_step;
    match mouse.kind {
        MouseEventKind::ScrollUp => scroll_by(state, -step, now),
        MouseEventKind::ScrollDown => scroll_by(state, step, now),
        MouseEventKind::Moved => {
            let under = element_at(state, layout, mouse.column, mouse.row);
            if under != state.hovered {
                if let Some(old) = state.hovered.take() {
                    state.runtime.dispatch(PageEvent::MouseLeave(old), now);
                }
                if let Some(new) = under {
                    state.runtime.dispatch(PageEvent::MouseEnter(new), now);
                }
                state.hovered = under;
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(el) = element_at(state, layout, mouse.column, mouse.row) {
                state.inspected = Some(el);
                click(state, el, now);
            }
        }
        _ => {}
    }
}

/// Match the page viewport to the page pane and notify the runtime.
pub fn handle_resize<S: KeyValueStore>(
    state: &mut AppState<S>,
    layout: &AppLayout,
    now: Duration,
) {
    let inner = layout.page_inner();
    let height = f64::from(inner.height.max(1)) * ROW_PX;
    let width = state.doc().viewport_width();
    if (height - state.doc().viewport_height()).abs() < f64::EPSILON {
        return;
    }
    state.runtime.doc_mut().resize(width, height);
    state.runtime.dispatch(PageEvent::Resize, now);
}

/// One animation frame: advance any smooth scroll, then run the runtime.
pub fn handle_frame<S: KeyValueStore>(state: &mut AppState<S>, now: Duration) {
    let current = state.doc().scroll_y();
    if let Some(next) = state.smooth.step(current) {
        state.runtime.doc_mut().set_scroll_y(next);
        state.runtime.dispatch(PageEvent::Scroll, now);
    }
    state.runtime.animation_frame(now);
}

fn scroll_by<S: KeyValueStore>(state: &mut AppState<S>, delta: f64, now: Duration) {
    let y = state.doc().scroll_y() + delta;
    scroll_to(state, y, now);
}

fn scroll_to<S: KeyValueStore>(state: &mut AppState<S>, y: f64, now: Duration) {
    state.smooth.cancel();
    state.status_message = None;
    let before = state.doc().scroll_y();
    state.runtime.doc_mut().set_scroll_y(y);
    if state.doc().scroll_y() != before {
        state.runtime.dispatch(PageEvent::Scroll, now);
    }
}

fn click<S: KeyValueStore>(state: &mut AppState<S>, el: ElementHandle, now: Duration) {
    state.runtime.dispatch(PageEvent::Click(el), now);
    if let Some(target) = state.runtime.doc_mut().take_scroll_request() {
        state.smooth.set_target(target);
    }
}

fn cycle_link<S: KeyValueStore>(state: &mut AppState<S>, delta: isize) {
    let count = state.nav_links().len();
    if count == 0 {
        state.focused_link = None;
        return;
    }
    let next = match state.focused_link {
        None if delta >= 0 => 0,
        None => count - 1,
        Some(i) => (i as isize + delta).rem_euclid(count as isize) as usize,
    };
    state.focused_link = Some(next);
    state.inspected = state.focused_link_handle();
}

fn element_at<S: KeyValueStore>(
    state: &AppState<S>,
    layout: &AppLayout,
    column: u16,
    row: u16,
) -> Option<ElementHandle> {
    let doc = state.doc();
    let geom = PageGeometry::new(layout.page_inner(), doc.viewport_width(), doc.viewport_height());
    hit_test(doc, &geom, column, row)
}

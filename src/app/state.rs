//! Preview application state.
//!
//! The page runtime plus everything the terminal front end needs around it:
//! config, page clock, smooth-scroll animation, link focus, and inspector
//! selection.  Rendering reads `&AppState`; handlers take `&mut AppState`.

use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::core::geometry::ElementHandle;
use crate::page::dom::{Bindings, Document};
use crate::page::sim::SimDocument;
use crate::page::store::KeyValueStore;
use crate::ui::smooth_scroll::SmoothScroll;

use super::runtime::PageRuntime;

/// Page pixels covered by one terminal row.
pub const ROW_PX: f64 = 20.0;

pub struct AppState<S> {
    pub runtime: PageRuntime<SimDocument, S>,
    pub config: AppConfig,
    pub smooth: SmoothScroll,
    /// Index into the page's nav links, for keyboard navigation.
    pub focused_link: Option<usize>,
    /// Element shown in the inspector.
    pub inspected: Option<ElementHandle>,
    /// Element currently under the mouse pointer.
    pub hovered: Option<ElementHandle>,
    pub should_quit: bool,
    pub status_message: Option<String>,
    started: Instant,
}

impl<S: KeyValueStore> AppState<S> {
    pub fn new(mut doc: SimDocument, store: S, config: AppConfig) -> Self {
        doc.set_smooth_scroll(true);
        let runtime = PageRuntime::new(doc, store, config.tuning.clone(), Bindings::default());
        let inspected = runtime.doc().query(&runtime.bindings().selectors.hero);
        Self {
            runtime,
            config,
            smooth: SmoothScroll::default(),
            focused_link: None,
            inspected,
            hovered: None,
            should_quit: false,
            status_message: None,
            started: Instant::now(),
        }
    }

    /// Page clock: time since the preview started.
    pub fn now(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn doc(&self) -> &SimDocument {
        self.runtime.doc()
    }

    pub fn nav_links(&self) -> Vec<ElementHandle> {
        self.doc()
            .query_all(&self.runtime.bindings().selectors.nav_links)
    }

    pub fn focused_link_handle(&self) -> Option<ElementHandle> {
        let links = self.nav_links();
        self.focused_link.and_then(|i| links.get(i).copied())
    }
}

//! End-to-end behaviour of the page runtime over the bundled demo page.

use std::time::Duration;

use scrollfx::app::runtime::{PageEvent, PageRuntime};
use scrollfx::core::geometry::ElementHandle;
use scrollfx::core::tuning::Tuning;
use scrollfx::core::update::VisualUpdate;
use scrollfx::page::dom::{Bindings, Document};
use scrollfx::page::sim::SimDocument;
use scrollfx::page::store::{FileStore, KeyValueStore, MemoryStore};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn demo_runtime() -> PageRuntime<SimDocument, MemoryStore> {
    let doc = SimDocument::demo().expect("bundled layout parses");
    PageRuntime::new(doc, MemoryStore::new(), Tuning::default(), Bindings::default())
}

/// Scroll to `y` and run one frame at `now`.
fn scroll_and_frame<S: KeyValueStore>(
    rt: &mut PageRuntime<SimDocument, S>,
    y: f64,
    now: Duration,
) -> Vec<VisualUpdate> {
    rt.doc_mut().set_scroll_y(y);
    let mut applied = rt.dispatch(PageEvent::Scroll, now);
    applied.extend(rt.animation_frame(now + ms(1)));
    applied
}

fn q(rt: &PageRuntime<SimDocument, impl KeyValueStore>, selector: &str) -> ElementHandle {
    rt.doc()
        .query(selector)
        .unwrap_or_else(|| panic!("no element for {selector}"))
}

#[test]
fn burst_of_scroll_events_runs_each_pipeline_once_per_frame() {
    let mut rt = demo_runtime();
    rt.dispatch(PageEvent::DomContentLoaded, ms(0));
    let before = rt.stats();

    for i in 1..=50 {
        rt.doc_mut().set_scroll_y(i as f64 * 7.0);
        rt.dispatch(PageEvent::Scroll, ms(i));
    }
    rt.animation_frame(ms(60));
    rt.animation_frame(ms(76));

    let after = rt.stats();
    assert_eq!(after.visual_runs - before.visual_runs, 1);
    assert_eq!(after.timeline_runs - before.timeline_runs, 1);
    assert_eq!(after.nav_runs - before.nav_runs, 50);
}

#[test]
fn resize_settles_once_after_the_last_event() {
    let mut rt = demo_runtime();
    rt.dispatch(PageEvent::DomContentLoaded, ms(0));
    for t in [0, 100, 200] {
        rt.doc_mut().resize(1000.0, 600.0 + t as f64);
        rt.dispatch(PageEvent::Resize, ms(t));
    }
    rt.animation_frame(ms(300));
    rt.animation_frame(ms(449));
    assert_eq!(rt.stats().resize_runs, 0);
    rt.animation_frame(ms(450));
    assert_eq!(rt.stats().resize_runs, 1);
    rt.animation_frame(ms(2_000));
    assert_eq!(rt.stats().resize_runs, 1);
}

#[test]
fn revealed_elements_stay_revealed_after_scrolling_back() {
    let mut rt = demo_runtime();
    rt.dispatch(PageEvent::DomContentLoaded, ms(0));
    let card = rt.doc().query_all(".skill-card")[0];

    scroll_and_frame(&mut rt, 2600.0, ms(100));
    rt.animation_frame(ms(1_000));
    assert!(rt.doc().has_class(card, "visible"));

    scroll_and_frame(&mut rt, 0.0, ms(1_100));
    rt.animation_frame(ms(2_000));
    assert!(rt.doc().has_class(card, "visible"));
    assert!(rt.is_revealed(card));
}

#[test]
fn nav_highlight_tracks_the_section_under_the_offset_line() {
    let mut rt = demo_runtime();
    let links = rt.doc().query_all(".nav-link");
    let href = |rt: &PageRuntime<SimDocument, MemoryStore>, h| rt.doc().attribute(h, "href");

    rt.doc_mut().set_scroll_y(900.0);
    rt.dispatch(PageEvent::Scroll, ms(0));
    let active: Vec<_> = links
        .iter()
        .filter(|&&h| rt.doc().has_class(h, "active"))
        .map(|&h| href(&rt, h))
        .collect();
    assert_eq!(active, vec![Some("#about".to_string())]);

    // 2500 + 200 lands in #skills (2600..3600).
    rt.doc_mut().set_scroll_y(2500.0);
    rt.dispatch(PageEvent::Scroll, ms(10));
    let skills = links[2];
    assert!(rt.doc().has_class(skills, "active"));
    assert!(!rt.doc().has_class(links[1], "active"));
}

#[test]
fn navbar_text_scale_and_parallax_follow_scroll() {
    let mut rt = demo_runtime();
    let navbar = q(&rt, "#navbar");
    let hero = q(&rt, ".hero-content");
    let text = rt.doc().query_all(".scroll-text")[0];

    scroll_and_frame(&mut rt, 350.0, ms(0));
    assert!(rt.doc().has_class(navbar, "scrolled"));
    assert_eq!(
        rt.doc().style(hero, "transform").as_deref(),
        Some("translateY(105px)")
    );
    assert_eq!(rt.doc().style(hero, "opacity").as_deref(), Some("0.5"));

    // Paragraph at 1060 sits 460px down an 800px viewport.
    scroll_and_frame(&mut rt, 600.0, ms(50));
    assert_eq!(
        rt.doc().style(text, "transform").as_deref(),
        Some("scale(0.997)")
    );

    scroll_and_frame(&mut rt, 50.0, ms(100));
    assert!(!rt.doc().has_class(navbar, "scrolled"));
}

#[test]
fn title_band_and_split_title_toggle_both_ways() {
    let mut rt = demo_runtime();
    let about = q(&rt, ".about-section .section-title");
    let split = q(&rt, ".split-title");

    scroll_and_frame(&mut rt, 500.0, ms(0));
    assert!(rt.doc().has_class(about, "scaled-in"));
    scroll_and_frame(&mut rt, 800.0, ms(50));
    assert!(!rt.doc().has_class(about, "scaled-in"));
    scroll_and_frame(&mut rt, 500.0, ms(100));
    assert!(rt.doc().has_class(about, "scaled-in"));

    scroll_and_frame(&mut rt, 2200.0, ms(150));
    assert!(!rt.doc().has_class(split, "split-joined"));
    scroll_and_frame(&mut rt, 2201.0, ms(200));
    assert!(rt.doc().has_class(split, "split-joined"));
    scroll_and_frame(&mut rt, 2000.0, ms(250));
    assert!(!rt.doc().has_class(split, "split-joined"));
}

#[test]
fn timeline_dot_moves_to_active_marker_and_keeps_offset_when_inactive() {
    let mut rt = demo_runtime();
    rt.dispatch(PageEvent::DomContentLoaded, ms(0));
    let &(_, dot) = rt.timeline_dots().first().expect("demo has a timeline");

    // Timeline top at 55px: progress (560 - 55) / (560 + 450) = 0.5, marker 2.
    scroll_and_frame(&mut rt, 1245.0, ms(100));
    assert_eq!(rt.doc().style(dot, "left").as_deref(), Some("532px"));
    assert!(rt.doc().has_class(dot, "active"));

    scroll_and_frame(&mut rt, 0.0, ms(200));
    assert!(!rt.doc().has_class(dot, "active"));
    assert_eq!(rt.doc().style(dot, "left").as_deref(), Some("532px"));
}

#[test]
fn scrolling_flag_clears_after_quiet_period() {
    let mut rt = demo_runtime();
    let body = rt.doc().body();

    rt.doc_mut().set_scroll_y(100.0);
    rt.dispatch(PageEvent::Scroll, ms(0));
    assert!(rt.doc().has_class(body, "scrolling"));

    rt.doc_mut().set_scroll_y(200.0);
    rt.dispatch(PageEvent::Scroll, ms(120));
    rt.animation_frame(ms(200));
    assert!(rt.doc().has_class(body, "scrolling"));
    rt.animation_frame(ms(269));
    assert!(rt.doc().has_class(body, "scrolling"));
    rt.animation_frame(ms(270));
    assert!(!rt.doc().has_class(body, "scrolling"));
}

#[test]
fn detached_elements_are_skipped() {
    let mut rt = demo_runtime();
    rt.dispatch(PageEvent::DomContentLoaded, ms(0));
    let cards = rt.doc().query_all(".skill-card");
    rt.doc_mut().remove(cards[0]);

    scroll_and_frame(&mut rt, 3000.0, ms(100));
    rt.animation_frame(ms(2_000));
    assert!(!rt.is_revealed(cards[0]));
    assert!(rt.doc().has_class(cards[1], "visible"));
    assert!(rt.doc().has_class(cards[2], "visible"));
}

#[test]
fn card_below_reveal_line_is_revealed_by_intersection() {
    // 0.85 of the viewport down: past the 0.8 reveal line, but 15% visible.
    let layout = r#"
[viewport]
width = 1000
height = 1000

[[element]]
id = "skills"
tag = "section"
rect = [0, 0, 1000, 3000]

[[element]]
parent = "skills"
class = ["skill-card"]
rect = [100, 850, 300, 200]
"#;
    let doc = SimDocument::from_toml(layout).unwrap();
    let mut rt = PageRuntime::new(doc, MemoryStore::new(), Tuning::default(), Bindings::default());
    let card = q(&rt, ".skill-card");

    // Nothing is observed before the DOM is ready.
    rt.animation_frame(ms(0));
    assert!(!rt.doc().has_class(card, "visible"));

    rt.dispatch(PageEvent::DomContentLoaded, ms(10));
    assert!(!rt.doc().has_class(card, "visible"));

    rt.animation_frame(ms(16));
    assert!(rt.doc().has_class(card, "visible"));
    assert!(!rt.is_revealed(card));
    assert!(rt.visual_state(card).revealed);
}

#[test]
fn hero_children_enter_in_sequence() {
    let mut rt = demo_runtime();
    let children = rt.doc().query_all(".hero-content > *");
    assert_eq!(children.len(), 3);

    rt.dispatch(PageEvent::Load, ms(1_000));
    rt.animation_frame(ms(1_000));
    assert_eq!(rt.doc().style(children[0], "opacity").as_deref(), Some("0"));
    assert_eq!(rt.doc().style(children[1], "opacity"), None);

    rt.animation_frame(ms(1_100));
    assert_eq!(rt.doc().style(children[0], "opacity").as_deref(), Some("1"));
    assert_eq!(
        rt.doc().style(children[0], "transform").as_deref(),
        Some("translateY(0)")
    );

    rt.animation_frame(ms(1_200));
    assert_eq!(
        rt.doc().style(children[1], "transform").as_deref(),
        Some("translateY(30px)")
    );
    rt.animation_frame(ms(1_500));
    assert_eq!(rt.doc().style(children[2], "opacity").as_deref(), Some("1"));
    assert_eq!(rt.pending_timers(), 0);
}

#[test]
fn hover_applies_only_to_outbound_links() {
    let mut rt = demo_runtime();
    let link = q(&rt, ".github-link");
    let card = q(&rt, ".project-card");

    rt.dispatch(PageEvent::MouseEnter(link), ms(0));
    assert_eq!(
        rt.doc().style(link, "transform").as_deref(),
        Some("translateX(5px) scale(1.1)")
    );
    rt.dispatch(PageEvent::MouseLeave(link), ms(10));
    assert_eq!(
        rt.doc().style(link, "transform").as_deref(),
        Some("translateX(0) scale(1)")
    );

    assert!(rt.dispatch(PageEvent::MouseEnter(card), ms(20)).is_empty());
}

#[test]
fn nav_click_scrolls_to_section() {
    let mut rt = demo_runtime();
    let links = rt.doc().query_all(".nav-link");
    rt.dispatch(PageEvent::Click(links[1]), ms(0));
    assert_eq!(rt.doc().scroll_y(), 800.0);

    // #contact starts below the last full viewport; scroll clamps.
    rt.dispatch(PageEvent::Click(links[4]), ms(10));
    assert_eq!(rt.doc().scroll_y(), rt.doc().max_scroll());
}

#[test]
fn nav_click_jump_refreshes_scroll_effects() {
    let mut rt = demo_runtime();
    let links = rt.doc().query_all(".nav-link");
    let navbar = q(&rt, "#navbar");
    let before = rt.stats();

    rt.dispatch(PageEvent::Click(links[1]), ms(0));
    assert_eq!(rt.doc().scroll_y(), 800.0);
    assert_eq!(rt.stats().nav_runs, before.nav_runs + 1);
    assert!(rt.doc().has_class(links[1], "active"));
    assert!(!rt.doc().has_class(links[0], "active"));
    assert!(rt.is_scrolling());

    rt.animation_frame(ms(16));
    rt.animation_frame(ms(32));
    assert_eq!(rt.stats().visual_runs, before.visual_runs + 1);
    assert_eq!(rt.stats().timeline_runs, before.timeline_runs + 1);
    assert!(rt.doc().has_class(navbar, "scrolled"));
}

#[test]
fn click_without_movement_is_not_a_scroll() {
    let mut rt = demo_runtime();
    let links = rt.doc().query_all(".nav-link");
    // #hero already sits at the top of the page.
    rt.dispatch(PageEvent::Click(links[0]), ms(0));
    rt.animation_frame(ms(16));
    assert_eq!(rt.stats().nav_runs, 0);
    assert_eq!(rt.stats().visual_runs, 0);
    assert!(!rt.is_scrolling());
}

#[test]
fn theme_toggle_persists_and_rerenders_background_without_advancing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage");

    let doc = SimDocument::demo().unwrap();
    let mut rt = PageRuntime::new(
        doc,
        FileStore::open(&path),
        Tuning::default(),
        Bindings::default(),
    );
    rt.dispatch(PageEvent::DomContentLoaded, ms(0));
    rt.animation_frame(ms(16));
    let phase = rt.gradient_phase();

    let toggle = q(&rt, "#themeToggle");
    let applied = rt.dispatch(PageEvent::Click(toggle), ms(20));
    let body = rt.doc().body();
    assert!(rt.doc().has_class(body, "light-mode"));
    assert_eq!(rt.gradient_phase(), phase);

    let light = applied
        .iter()
        .find_map(|u| match u {
            VisualUpdate::Background { gradient, .. } => Some(*gradient),
            _ => None,
        })
        .expect("toggle re-renders the background");
    assert_eq!(light.stops[0].lightness, 98.0);
    assert_eq!(light.stops[1].lightness, 95.0);
    assert_eq!(light.stops[2].lightness, 97.0);
    assert!(rt
        .doc()
        .style(body, "background")
        .is_some_and(|css| css.contains("hsl(0, 0%, 98%) 0%")));

    // A fresh page picks the stored preference up.
    let store = FileStore::open(&path);
    assert_eq!(store.get("theme").as_deref(), Some("light"));
    let doc = SimDocument::demo().unwrap();
    let reloaded = PageRuntime::new(doc, store, Tuning::default(), Bindings::default());
    assert!(reloaded.doc().has_class(reloaded.doc().body(), "light-mode"));
}

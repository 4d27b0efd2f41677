//! Core algorithms – geometry, the visual state engine, timeline and nav
//! progress, the background gradient, and theme state.
//!
//! Nothing in this module depends on any TUI or rendering crate.  Every
//! function maps sampled geometry to declarative updates; writing them to a
//! page happens elsewhere.

pub mod engine;
pub mod entrance;
pub mod geometry;
pub mod gradient;
pub mod nav;
pub mod theme;
pub mod timeline;
pub mod tuning;
pub mod update;

//! Scroll-driven visual-state engine.
//!
//! `core` computes visual state from geometry and time, `page` is the
//! document it reads and writes, `app` wires both to page events and frame
//! scheduling, and `ui` renders a simulated page in the terminal.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod page;
pub mod ui;

//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! Reads the simulated page and the runtime's state and turns them into
//! terminal cells.  No page mutation happens here.

pub mod inspector;
pub mod layout;
pub mod page_view;
pub mod smooth_scroll;
pub mod theme;

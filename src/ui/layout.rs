//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Page pane on the left, inspector on the right, status bar below.
pub struct AppLayout {
    pub page_area: Rect,
    pub inspector_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn from_area(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // panes
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(44)])
            .split(rows[0]);

        Self {
            page_area: panes[0],
            inspector_area: panes[1],
            status_area: rows[1],
        }
    }

    /// The page pane minus its border.
    pub fn page_inner(&self) -> Rect {
        self.page_area.inner(ratatui::layout::Margin::new(1, 1))
    }
}

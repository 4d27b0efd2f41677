//! Colour palette and text styles used across the preview.
//!
//! Chrome styles are fixed; page styles follow the page's light/dark theme.

use ratatui::style::{Color, Modifier, Style};

use crate::core::theme::Theme;

pub struct Palette;

impl Palette {
    // ── page ───────────────────────────────────────────────────

    /// Page background for a gradient of the given mean HSL lightness.
    pub fn page_background(lightness: f64) -> Color {
        let v = (lightness.clamp(0.0, 100.0) * 2.55).round() as u8;
        Color::Rgb(v, v, v)
    }

    pub fn text_style(theme: Theme) -> Style {
        match theme {
            Theme::Dark => Style::default().fg(Color::Rgb(220, 220, 220)),
            Theme::Light => Style::default().fg(Color::Rgb(30, 30, 30)),
        }
    }

    /// Reveal candidates that have not been revealed yet.
    pub fn hidden_style(theme: Theme) -> Style {
        let fg = match theme {
            Theme::Dark => Color::Rgb(70, 70, 70),
            Theme::Light => Color::Rgb(190, 190, 190),
        };
        Style::default().fg(fg).add_modifier(Modifier::DIM)
    }

    pub fn accent_style(theme: Theme) -> Style {
        let fg = match theme {
            Theme::Dark => Color::Cyan,
            Theme::Light => Color::Blue,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }

    pub fn section_rule_style(theme: Theme) -> Style {
        match theme {
            Theme::Dark => Style::default().fg(Color::Rgb(90, 90, 90)),
            Theme::Light => Style::default().fg(Color::Rgb(150, 150, 150)),
        }
    }

    pub fn navbar_scrolled_style(theme: Theme) -> Style {
        match theme {
            Theme::Dark => Style::default().bg(Color::Rgb(40, 40, 48)),
            Theme::Light => Style::default().bg(Color::Rgb(225, 225, 232)),
        }
    }

    pub fn active_link_style() -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    pub fn focused_link_style() -> Style {
        Style::default().add_modifier(Modifier::UNDERLINED)
    }

    pub fn hovered_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn inspected_style() -> Style {
        Style::default().bg(Color::DarkGray)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn label_style() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}

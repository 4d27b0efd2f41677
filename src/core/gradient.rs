//! Continuously shifting background gradient.
//!
//! Time-driven rather than scroll-driven: the phase advances once per
//! animation frame whether or not the page moves.  Scroll only shades the
//! stops.

use std::fmt::Write as _;

use super::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// HSL lightness in percent.
    pub lightness: f64,
    /// Stop position in percent.
    pub position: f64,
}

/// A three-stop greyscale linear gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub angle_deg: f64,
    pub stops: [GradientStop; 3],
}

impl Gradient {
    pub fn to_css(&self) -> String {
        let mut css = format!("linear-gradient({}deg", css_number(self.angle_deg));
        for stop in &self.stops {
            let _ = write!(
                css,
                ", hsl(0, 0%, {}%) {}%",
                css_number(stop.lightness),
                css_number(stop.position)
            );
        }
        css.push(')');
        css
    }

    /// Mean lightness across the stops (used for preview shading).
    pub fn mean_lightness(&self) -> f64 {
        self.stops.iter().map(|s| s.lightness).sum::<f64>() / self.stops.len() as f64
    }
}

/// Trim float noise so the CSS stays readable (`2.15`, not `2.1500000000000004`).
pub(crate) fn css_number(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

#[derive(Debug, Clone)]
pub struct GradientAnimator {
    phase: f64,
    step: f64,
}

impl GradientAnimator {
    pub fn new(step: f64) -> Self {
        Self { phase: 0.0, step }
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Advance one animation frame.
    pub fn advance(&mut self) {
        self.phase += self.step;
    }

    /// `180 ± 20` degrees, oscillating slowly with the phase.
    pub fn angle_deg(&self) -> f64 {
        180.0 + (self.phase * 0.01).sin() * 20.0
    }

    /// Gradient for the current phase.  Does not advance; a theme switch
    /// re-renders immediately at the same phase.
    pub fn render(&self, theme: Theme, scroll_fraction: f64) -> Gradient {
        let f = scroll_fraction;
        let (first, middle, last) = match theme {
            Theme::Dark => {
                let l1 = 2.0 + f * 3.0;
                (l1, 5.0 + f * 5.0, l1 + 1.0)
            }
            Theme::Light => {
                let l1 = 98.0 - f * 3.0;
                (l1, 95.0 - f * 5.0, l1 - 1.0)
            }
        };
        Gradient {
            angle_deg: self.angle_deg(),
            stops: [
                GradientStop {
                    lightness: first,
                    position: 0.0,
                },
                GradientStop {
                    lightness: middle,
                    position: 50.0,
                },
                GradientStop {
                    lightness: last,
                    position: 100.0,
                },
            ],
        }
    }

    /// Advance and render in one step (the per-frame path).
    pub fn frame(&mut self, theme: Theme, scroll_fraction: f64) -> Gradient {
        self.advance();
        self.render(theme, scroll_fraction)
    }
}

impl Default for GradientAnimator {
    fn default() -> Self {
        Self::new(0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_stops_rise_with_scroll() {
        let g = GradientAnimator::default().render(Theme::Dark, 1.0);
        let l: Vec<f64> = g.stops.iter().map(|s| s.lightness).collect();
        assert_eq!(l, vec![5.0, 10.0, 6.0]);
        let top = GradientAnimator::default().render(Theme::Dark, 0.0);
        assert_eq!(top.stops[0].lightness, 2.0);
        assert_eq!(top.stops[2].lightness, 3.0);
    }

    #[test]
    fn light_stops_fall_with_scroll() {
        let g = GradientAnimator::default().render(Theme::Light, 1.0);
        let l: Vec<f64> = g.stops.iter().map(|s| s.lightness).collect();
        assert_eq!(l, vec![95.0, 90.0, 94.0]);
    }

    #[test]
    fn angle_starts_at_180_and_stays_in_band() {
        let mut anim = GradientAnimator::default();
        assert_eq!(anim.angle_deg(), 180.0);
        for _ in 0..5000 {
            anim.advance();
            let a = anim.angle_deg();
            assert!((160.0..=200.0).contains(&a));
        }
        assert!(anim.phase() > 499.0);
    }

    #[test]
    fn render_does_not_advance_phase() {
        let mut anim = GradientAnimator::default();
        anim.frame(Theme::Dark, 0.0);
        let phase = anim.phase();
        let _ = anim.render(Theme::Light, 0.3);
        assert_eq!(anim.phase(), phase);
    }

    #[test]
    fn css_output() {
        let css = GradientAnimator::default().render(Theme::Dark, 0.0).to_css();
        assert_eq!(
            css,
            "linear-gradient(180deg, hsl(0, 0%, 2%) 0%, hsl(0, 0%, 5%) 50%, hsl(0, 0%, 3%) 100%)"
        );
    }
}

//! Navigation highlight: which section the reader is in.

/// A section's page-relative vertical extent (`offsetTop`/`offsetHeight`).
#[derive(Debug, Clone, PartialEq)]
pub struct NavSection {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

/// The section containing `scroll_y + offset`.
///
/// Sections are tested in list order and a later match overwrites an
/// earlier one, so overlapping ranges resolve to the last section listed.
pub fn active_section(sections: &[NavSection], scroll_y: f64, offset: f64) -> Option<&str> {
    let marker = scroll_y + offset;
    let mut active = None;
    for section in sections {
        if marker >= section.top && marker < section.top + section.height {
            active = Some(section.id.as_str());
        }
    }
    active
}

/// Section id named by a nav link's `href` (`"#about"` → `"about"`).
pub fn nav_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: &str, top: f64, height: f64) -> NavSection {
        NavSection {
            id: id.into(),
            top,
            height,
        }
    }

    #[test]
    fn marker_is_offset_by_two_hundred() {
        let sections = vec![section("a", 0.0, 500.0), section("b", 500.0, 500.0)];
        assert_eq!(active_section(&sections, 350.0, 200.0), Some("b"));
        assert_eq!(active_section(&sections, 299.0, 200.0), Some("a"));
    }

    #[test]
    fn overlapping_sections_last_wins() {
        let sections = vec![section("a", 0.0, 1000.0), section("b", 100.0, 200.0)];
        assert_eq!(active_section(&sections, 0.0, 200.0), Some("b"));
        assert_eq!(active_section(&sections, 200.0, 200.0), Some("a"));
    }

    #[test]
    fn nothing_matches_past_the_end() {
        let sections = vec![section("a", 0.0, 100.0)];
        assert_eq!(active_section(&sections, 500.0, 200.0), None);
        assert_eq!(active_section(&[], 0.0, 200.0), None);
    }

    #[test]
    fn nav_target_strips_hash() {
        assert_eq!(nav_target("#about"), Some("about"));
        assert_eq!(nav_target("#"), None);
        assert_eq!(nav_target("https://example.com"), None);
    }
}

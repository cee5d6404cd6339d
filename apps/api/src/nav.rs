#![allow(dead_code)]

//! Navigation shell state: scroll-spy over the fixed section order plus the
//! four-direction pad. Purely derived values, no persistence. The scroll-spy
//! and pad run client-side; this module is their reference semantics and
//! feeds the navigation endpoint.

/// Scroll order of the page sections.
pub const SECTION_IDS: [&str; 8] = [
    "home",
    "about",
    "education",
    "certifications",
    "skills",
    "experience",
    "projects",
    "contact",
];

/// Menu labels, in the same order.
pub const MENU: [(&str, &str); 8] = [
    ("home", "Home"),
    ("about", "About Me"),
    ("education", "Education"),
    ("certifications", "Certifications"),
    ("skills", "Skills"),
    ("experience", "Experience"),
    ("projects", "Projects"),
    ("contact", "Contact"),
];

/// One rendered section's bounding box in page coordinates.
#[derive(Debug, Clone)]
pub struct SectionBounds {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

/// The active section is the first whose box contains the viewport midpoint.
pub fn active_section(
    scroll_y: f64,
    viewport_height: f64,
    bounds: &[SectionBounds],
) -> Option<&str> {
    let midpoint = scroll_y + viewport_height / 2.0;
    bounds
        .iter()
        .find(|b| midpoint >= b.top && midpoint < b.top + b.height)
        .map(|b| b.id.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Directional-pad step: up/left retreat, down/right advance. No wraparound;
/// boundary moves and unknown sections are no-ops.
pub fn step(current: &str, direction: Direction) -> Option<&'static str> {
    let index = SECTION_IDS.iter().position(|id| *id == current)?;
    match direction {
        Direction::Up | Direction::Left if index > 0 => Some(SECTION_IDS[index - 1]),
        Direction::Down | Direction::Right if index + 1 < SECTION_IDS.len() => {
            Some(SECTION_IDS[index + 1])
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Vec<SectionBounds> {
        vec![
            SectionBounds {
                id: "home".to_string(),
                top: 0.0,
                height: 800.0,
            },
            SectionBounds {
                id: "about".to_string(),
                top: 800.0,
                height: 1000.0,
            },
        ]
    }

    #[test]
    fn test_midpoint_selects_containing_section() {
        // scroll_y 500 + viewport 800 / 2 => midpoint 900, inside about.
        assert_eq!(active_section(500.0, 800.0, &bounds()), Some("about"));
    }

    #[test]
    fn test_midpoint_at_top_of_page() {
        assert_eq!(active_section(0.0, 800.0, &bounds()), Some("home"));
    }

    #[test]
    fn test_midpoint_past_last_section() {
        assert_eq!(active_section(5000.0, 800.0, &bounds()), None);
    }

    #[test]
    fn test_boundary_belongs_to_lower_section() {
        // Midpoint exactly 800 falls in about, not home.
        assert_eq!(active_section(400.0, 800.0, &bounds()), Some("about"));
    }

    #[test]
    fn test_step_down_advances() {
        assert_eq!(step("about", Direction::Down), Some("education"));
        assert_eq!(step("about", Direction::Right), Some("education"));
    }

    #[test]
    fn test_step_up_retreats() {
        assert_eq!(step("about", Direction::Up), Some("home"));
        assert_eq!(step("about", Direction::Left), Some("home"));
    }

    #[test]
    fn test_step_is_noop_at_boundaries() {
        assert_eq!(step("home", Direction::Up), None);
        assert_eq!(step("home", Direction::Left), None);
        assert_eq!(step("contact", Direction::Down), None);
        assert_eq!(step("contact", Direction::Right), None);
    }

    #[test]
    fn test_step_unknown_section_is_noop() {
        assert_eq!(step("footer", Direction::Down), None);
    }

    #[test]
    fn test_menu_matches_section_order() {
        for (entry, id) in MENU.iter().zip(SECTION_IDS.iter()) {
            assert_eq!(entry.0, *id);
        }
    }
}

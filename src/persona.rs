//! Stable per-persona colors.

use indexmap::IndexMap;
use tracing::trace;

/// One palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonaColor {
    /// Identity used in class names, e.g. `persona-teal`.
    pub name: &'static str,
    pub hex: &'static str,
    /// Comma separated `r,g,b` for `rgba()` backgrounds.
    pub rgb: &'static str,
}

pub const PALETTE: [PersonaColor; 6] = [
    PersonaColor { name: "teal", hex: "#2a7d6e", rgb: "42,125,110" },
    PersonaColor { name: "amber", hex: "#b37d4e", rgb: "179,125,78" },
    PersonaColor { name: "indigo", hex: "#5a5fa0", rgb: "90,95,160" },
    PersonaColor { name: "rose", hex: "#b35a6e", rgb: "179,90,110" },
    PersonaColor { name: "slate", hex: "#5a7d8a", rgb: "90,125,138" },
    PersonaColor { name: "plum", hex: "#8a5a9a", rgb: "138,90,154" },
];

/// Assigns palette colors to persona names in first-seen order.
///
/// A palette lives for one conversion. The seventh distinct persona wraps
/// around to the first color.
#[derive(Debug, Clone, Default)]
pub struct PersonaPalette {
    assigned: IndexMap<String, PersonaColor>,
}

impl PersonaPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the color for `persona`, allocating the next one on first use.
    pub fn color_for(&mut self, persona: &str) -> PersonaColor {
        if let Some(color) = self.assigned.get(persona) {
            return *color;
        }
        let color = PALETTE[self.assigned.len() % PALETTE.len()];
        trace!(persona, color = color.name, "assigned persona color");
        self.assigned.insert(persona.to_string(), color);
        color
    }

    /// Looks up an existing assignment without allocating.
    pub fn get(&self, persona: &str) -> Option<PersonaColor> {
        self.assigned.get(persona).copied()
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    /// Assignments in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, PersonaColor)> {
        self.assigned
            .iter()
            .map(|(persona, color)| (persona.as_str(), *color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_seen_order_drives_allocation() {
        let mut palette = PersonaPalette::new();
        assert_eq!(palette.color_for("Ava").name, "teal");
        assert_eq!(palette.color_for("Kai").name, "amber");
        assert_eq!(palette.color_for("Ava").name, "teal");
        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn seventh_persona_reuses_first_color() {
        let mut palette = PersonaPalette::new();
        let names = ["A", "B", "C", "D", "E", "F", "G"];
        let colors: Vec<_> = names.iter().map(|name| palette.color_for(name)).collect();
        assert_eq!(colors[6], colors[0]);
        assert_ne!(colors[5], colors[0]);
    }

    #[test]
    fn get_does_not_allocate() {
        let palette = PersonaPalette::new();
        assert_eq!(palette.get("Ava"), None);
        assert!(palette.is_empty());
    }

    #[test]
    fn iter_follows_allocation_order() {
        let mut palette = PersonaPalette::new();
        palette.color_for("Zed");
        palette.color_for("Ava");
        let order: Vec<_> = palette.iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["Zed", "Ava"]);
    }
}

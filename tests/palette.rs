use proptest::prelude::*;
use spark_report::persona::PALETTE;
use spark_report::{PersonaPalette, parse_markdown};

proptest! {
    #[test]
    fn colors_cycle_with_period_six(count in 1usize..40) {
        let mut palette = PersonaPalette::new();
        let colors: Vec<_> = (0..count)
            .map(|idx| palette.color_for(&format!("persona-{idx}")))
            .collect();
        for (idx, color) in colors.iter().enumerate() {
            prop_assert_eq!(*color, PALETTE[idx % PALETTE.len()]);
            if idx >= PALETTE.len() {
                prop_assert_eq!(*color, colors[idx - PALETTE.len()]);
            }
        }
    }

    #[test]
    fn repeated_lookups_are_stable(names in prop::collection::vec("[A-Z][a-z]{0,6}", 1..20)) {
        let mut palette = PersonaPalette::new();
        let first: Vec<_> = names.iter().map(|name| palette.color_for(name)).collect();
        let second: Vec<_> = names.iter().map(|name| palette.color_for(name)).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn seed_headings_allocate_in_document_order(count in 1usize..15) {
        let markdown: String = (0..count)
            .map(|idx| format!("## Seed: Persona {idx}\n\n### Idea\n\nText.\n\n"))
            .collect();
        let mut palette = PersonaPalette::new();
        let doc = parse_markdown(&markdown, &mut palette);
        prop_assert_eq!(palette.len(), count);
        for (idx, section) in doc.sections().iter().enumerate() {
            let class = format!("persona-section persona-{}", PALETTE[idx % PALETTE.len()].name);
            prop_assert!(section.contains(&class));
        }
    }
}

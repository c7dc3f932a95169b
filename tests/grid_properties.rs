//! Property-based checks of grid laws.

use cellarium_core::{patterns, LifeEngine};
use proptest::prelude::*;

proptest! {
    #[test]
    fn empty_grid_stays_empty_for_any_dimensions(
        width in 1u16..=64,
        height in 1u16..=64,
        steps in 1usize..=5,
    ) {
        let mut engine = LifeEngine::new(width, height, Some(0));
        for _ in 0..steps {
            engine.step();
        }
        prop_assert_eq!(engine.grid().live_cells(), 0);
        prop_assert_eq!(engine.generation(), steps as u64);
    }

    #[test]
    fn toggle_twice_is_identity(
        width in 1u16..=64,
        height in 1u16..=64,
        x in 0u16..64,
        y in 0u16..64,
        density in 0.0f64..=1.0,
    ) {
        let mut engine = LifeEngine::new(width, height, Some(7));
        engine.randomize(density);
        let before = engine.grid().get(x, y);

        let first = engine.toggle_cell(x, y);
        let second = engine.toggle_cell(x, y);

        match before {
            // The second toggle reports the original state.
            Some(state) => {
                prop_assert_eq!(first, Some(!state));
                prop_assert_eq!(second, Some(state));
            }
            None => {
                prop_assert_eq!(first, None);
                prop_assert_eq!(second, None);
            }
        }
        prop_assert_eq!(engine.grid().get(x, y), before);
    }

    #[test]
    fn density_extremes_fill_or_empty_the_grid(
        width in 1u16..=48,
        height in 1u16..=48,
    ) {
        let cells = width as usize * height as usize;
        let mut engine = LifeEngine::new(width, height, Some(3));
        engine.randomize(1.0);
        prop_assert_eq!(engine.grid().live_cells(), cells);
        engine.randomize(0.0);
        prop_assert_eq!(engine.grid().live_cells(), 0);
    }

    #[test]
    fn unknown_names_never_load(name in "[a-z_]{1,24}") {
        prop_assume!(patterns::find(&name).is_none());
        let mut engine = LifeEngine::new(32, 32, Some(5));
        engine.randomize(0.5);
        let before = engine.snapshot().grid;
        prop_assert!(!engine.load_pattern(&name, None, None));
        prop_assert_eq!(engine.snapshot().grid, before);
    }

    #[test]
    fn loaded_patterns_land_fully_inside_a_large_enough_grid(
        // Large enough for the widest (gosper gun, 36x9) and tallest
        // (pulsar, 13x13) patterns, so clamping keeps every cell in bounds.
        width in 36u16..=64,
        height in 16u16..=64,
        x_offset in -100i32..=100,
        y_offset in -100i32..=100,
        pattern_idx in 0usize..14,
    ) {
        let pattern = &patterns::PATTERNS[pattern_idx % patterns::PATTERNS.len()];
        let mut engine = LifeEngine::new(width, height, Some(9));
        prop_assert!(engine.load_pattern(pattern.name, Some(x_offset), Some(y_offset)));
        prop_assert_eq!(engine.grid().live_cells(), pattern.cells.len());
        prop_assert_eq!(engine.generation(), 0);
    }

    #[test]
    fn step_preserves_dimensions(
        width in 1u16..=48,
        height in 1u16..=48,
        density in 0.0f64..=1.0,
    ) {
        let mut engine = LifeEngine::new(width, height, Some(13));
        engine.randomize(density);
        engine.step();
        let snapshot = engine.snapshot();
        prop_assert_eq!(snapshot.grid.len(), height as usize);
        for row in &snapshot.grid {
            prop_assert_eq!(row.len(), width as usize);
        }
    }
}

//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use token_core::{Controller, CoreConfig, ManualClock, Place};

/// Small blocks so that short texts already span several of them
pub fn small_config() -> CoreConfig {
    CoreConfig {
        char_block_size: 4,
        line_block_size: 4,
        ..CoreConfig::default()
    }
}

/// Controller over `text` with the primary caret at (line, column) and a
/// hand-driven clock starting at 0
pub fn test_controller(text: &str, line: usize, column: usize) -> (Controller, ManualClock) {
    let clock = ManualClock::new(0);
    let mut controller = Controller::with_clock(small_config(), clock.clone());
    controller.init_text(text);
    controller.put_cursor(Place::new(line, column), false);
    (controller, clock)
}

/// Flat caret indices in document order
pub fn carets(controller: &Controller) -> Vec<usize> {
    controller.selections().iter().map(|s| s.caret).collect()
}

/// Caret (line, column) pairs in document order
pub fn caret_places(controller: &Controller) -> Vec<(usize, usize)> {
    controller
        .selections()
        .iter()
        .map(|s| {
            let place = controller.document().place_of(s.caret);
            (place.line, place.column)
        })
        .collect()
}

pub fn text(controller: &Controller) -> String {
    controller.document().text()
}

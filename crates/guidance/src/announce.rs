//! Guidance announcement text.
//!
//! Pure functions: same steps in, same string out, no side effects. Distances
//! render in their natural `f64` display form; whatever unit the route
//! service supplied is what gets spoken.

use crate::route::RouteStep;

/// Text announced when the traveler reaches their destination.
pub const ARRIVAL_TEXT: &str = "You have arrived at your destination";

/// Announcement for the upcoming maneuver, with one step of lookahead.
///
/// When there is no step after `current` (the last maneuver of the route),
/// the trailing "then …" clause is omitted rather than read past the end of
/// the route.
pub fn guidance(current: &RouteStep, next: Option<&RouteStep>) -> String {
    match next {
        Some(next) => format!(
            "In {} meters {}, then in {} meters, {}",
            current.distance_meters, current.instruction, next.distance_meters, next.instruction
        ),
        None => format!("In {} meters {}", current.distance_meters, current.instruction),
    }
}

/// Fixed arrival announcement.
pub fn arrival() -> &'static str {
    ARRIVAL_TEXT
}

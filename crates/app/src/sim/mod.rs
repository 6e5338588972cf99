//! Simulated platform services.
//!
//! Stand-ins for the device's location, geocoding, directions, speech, and
//! map frameworks, good enough to drive the controller end-to-end in tests
//! and in the scripted demo. None of them touch a network or a GPS.

mod fixtures;
mod location;

pub use fixtures::{
    route_from_waypoints, ConsoleAnnouncer, ConsoleMapRenderer, FixtureGeocoder,
    FixtureRouteService,
};
pub use location::SimulatedLocationProvider;

//! # waymark-guidance
//!
//! Turn-by-turn guidance progression, decoupled from any platform.
//!
//! ## Features
//!
//! - **Step tracking**: [`tracker::RouteStepTracker`] follows the traveler
//!   through a route one geofence crossing at a time
//! - **Announcements**: spoken/displayed guidance text with one step of
//!   lookahead, clamped at the end of the route
//! - **Pluggable platform**: location, geocoding, routing, speech, and map
//!   rendering are traits the host implements ([`services`])
//!
//! The tracker never calls a platform service itself. Each operation returns
//! the registrations, releases, and announcement text for the host to apply,
//! so the whole state machine runs under test with plain function calls.
//!
//! ## Example
//!
//! ```
//! use waymark_guidance::prelude::*;
//! use geo::Point;
//!
//! let mut tracker = RouteStepTracker::new();
//! let loaded = tracker
//!     .load(vec![
//!         RouteStep {
//!             instruction: "Proceed to High Street".into(),
//!             distance_meters: 0.0,
//!             maneuver_point: Point::new(-0.1428, 51.5010),
//!         },
//!         RouteStep {
//!             instruction: "turn right onto High Street".into(),
//!             distance_meters: 120.0,
//!             maneuver_point: Point::new(-0.1413, 51.5014),
//!         },
//!         RouteStep {
//!             instruction: "arrive at your destination".into(),
//!             distance_meters: 85.0,
//!             maneuver_point: Point::new(-0.1400, 51.5020),
//!         },
//!     ])
//!     .unwrap();
//!
//! // One geofence per step for the host to register
//! assert_eq!(loaded.registrations.len(), 3);
//! assert_eq!(
//!     loaded.announcement,
//!     "In 120 meters turn right onto High Street, then in 85 meters, arrive at your destination"
//! );
//!
//! // Crossing the second step's fence advances guidance
//! let advance = tracker.on_geofence_entered(&GeofenceId::from_index(1));
//! assert_eq!(advance, Advance::Progress("In 85 meters arrive at your destination".into()));
//!
//! // Crossing the last fence finishes the trip and hands back every fence
//! let advance = tracker.on_geofence_entered(&GeofenceId::from_index(2));
//! assert!(matches!(advance, Advance::Arrived { .. }));
//! assert!(!tracker.is_navigating());
//! ```

pub mod announce;
pub mod identifiers;
pub mod route;
pub mod services;
pub mod tracker;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::GeofenceId;
    pub use crate::route::{ResolvedRoute, RouteStep, TravelMode};
    pub use crate::services::{
        AuthorizationStatus, GeocodeError, GeocodingService, LocationEvent, LocationProvider,
        MapRenderer, RouteError, RouteService, SpeechAnnouncer,
    };
    pub use crate::tracker::{
        Advance, GeofenceRegistration, GuidanceError, Loaded, NavState, RouteStepTracker,
        MANEUVER_RADIUS_METERS,
    };
}

pub use prelude::*;

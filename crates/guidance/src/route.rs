//! Domain types for resolved routes.
//!
//! These are the shapes a route/directions service hands back. The guidance
//! core consumes them as provided; no unit conversion or re-routing happens
//! here.

use geo::{LineString, Point};

/// Transport type requested from the route service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TravelMode {
    Driving,
    Walking,
}

/// One maneuver-level segment of a computed route.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteStep {
    /// Human-readable maneuver description (e.g., "Turn right onto Market Street")
    pub instruction: String,
    /// Distance to travel for this step, in meters, as supplied by the service
    pub distance_meters: f64,
    /// Where the maneuver happens; used as the geofence center
    pub maneuver_point: Point,
}

/// A computed route: ordered maneuver steps plus the polyline to draw.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedRoute {
    pub steps: Vec<RouteStep>,
    pub geometry: LineString,
}

impl ResolvedRoute {
    /// Sum of the step distances in meters
    pub fn total_distance_meters(&self) -> f64 {
        self.steps.iter().map(|s| s.distance_meters).sum()
    }
}

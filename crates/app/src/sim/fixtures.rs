//! Canned geocoding, directions, speech, and map services.

use std::collections::HashMap;

use geo::{BoundingRect, HaversineDistance, LineString, Point};
use tracing::{debug, info};
use waymark_guidance::prelude::*;

/// How close a requested destination must land to a canned route's endpoint
const DESTINATION_TOLERANCE_METERS: f64 = 50.0;

/// Build a canned route from maneuver waypoints.
///
/// Step distances are the Haversine leg lengths between consecutive
/// waypoints, rounded to whole meters; the first step is the departure and
/// carries distance 0. The geometry is the waypoint polyline.
pub fn route_from_waypoints(waypoints: &[(Point, &str)]) -> ResolvedRoute {
    let steps = waypoints
        .iter()
        .enumerate()
        .map(|(i, (point, instruction))| {
            let distance_meters = if i == 0 {
                0.0
            } else {
                waypoints[i - 1].0.haversine_distance(point).round()
            };
            RouteStep {
                instruction: (*instruction).to_owned(),
                distance_meters,
                maneuver_point: *point,
            }
        })
        .collect();

    let geometry = LineString::from(waypoints.iter().map(|(point, _)| *point).collect::<Vec<_>>());

    ResolvedRoute { steps, geometry }
}

// ============================================================================
// Geocoding
// ============================================================================

/// Geocoder over a fixed table of place names.
#[derive(Default)]
pub struct FixtureGeocoder {
    places: HashMap<String, Point>,
}

impl FixtureGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, location: Point) -> Self {
        self.places.insert(normalize(name), location);
        self
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

impl GeocodingService for FixtureGeocoder {
    fn resolve_address(&self, text: &str) -> Result<Point, GeocodeError> {
        self.places
            .get(&normalize(text))
            .copied()
            .ok_or(GeocodeError::AddressNotFound)
    }
}

// ============================================================================
// Directions
// ============================================================================

/// Directions service over canned routes, matched by destination proximity.
#[derive(Default)]
pub struct FixtureRouteService {
    routes: Vec<(Point, ResolvedRoute)>,
}

impl FixtureRouteService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, destination: Point, route: ResolvedRoute) -> Self {
        self.routes.push((destination, route));
        self
    }
}

impl RouteService for FixtureRouteService {
    fn resolve_route(
        &self,
        _origin: Point,
        destination: Point,
        _mode: TravelMode,
    ) -> Result<ResolvedRoute, RouteError> {
        self.routes
            .iter()
            .find(|(end, _)| end.haversine_distance(&destination) <= DESTINATION_TOLERANCE_METERS)
            .map(|(_, route)| route.clone())
            .ok_or(RouteError::NoRouteFound)
    }
}

// ============================================================================
// Speech and Map
// ============================================================================

/// Speech output that logs utterances instead of synthesizing audio.
pub struct ConsoleAnnouncer;

impl SpeechAnnouncer for ConsoleAnnouncer {
    fn speak(&mut self, text: &str) {
        info!("speaking: {text}");
    }
}

/// Map display that logs camera and overlay operations.
#[derive(Default)]
pub struct ConsoleMapRenderer {
    route: Option<LineString>,
}

impl ConsoleMapRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapRenderer for ConsoleMapRenderer {
    fn show_route(&mut self, geometry: &LineString) {
        debug!(points = geometry.0.len(), "drawing route overlay");
        self.route = Some(geometry.clone());
    }

    fn fit_route_bounds(&mut self) {
        if let Some(rect) = self.route.as_ref().and_then(|route| route.bounding_rect()) {
            debug!(min = ?rect.min(), max = ?rect.max(), "framing route bounds");
        }
    }

    fn center_on(&mut self, center: Point, span_meters: f64) {
        debug!(lon = center.x(), lat = center.y(), span_meters, "centering camera");
    }

    fn clear_route(&mut self) {
        self.route = None;
        debug!("route overlay cleared");
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_route_from_waypoints_distances() {
        let a = Point::new(-74.0105, 40.7040);
        let b = Point::new(-74.0105, 40.7049); // ~100 m due north
        let route = route_from_waypoints(&[(a, "depart"), (b, "arrive")]);

        assert_eq!(route.steps.len(), 2);
        assert_eq!(route.steps[0].distance_meters, 0.0);
        assert_abs_diff_eq!(route.steps[1].distance_meters, 100.0, epsilon = 2.0);
        assert_eq!(route.geometry.0.len(), 2);
    }

    #[test]
    fn test_geocoder_lookup_is_forgiving() {
        let place = Point::new(-74.0101, 40.7074);
        let geocoder = FixtureGeocoder::new().with_place("Federal Hall", place);

        assert_eq!(geocoder.resolve_address("Federal Hall").unwrap(), place);
        assert_eq!(geocoder.resolve_address("  federal hall ").unwrap(), place);
        assert!(matches!(
            geocoder.resolve_address("City Hall"),
            Err(GeocodeError::AddressNotFound)
        ));
    }

    #[test]
    fn test_route_service_matches_by_proximity() {
        let destination = Point::new(-74.0101, 40.7074);
        let route = route_from_waypoints(&[
            (Point::new(-74.0105, 40.7040), "depart"),
            (destination, "arrive"),
        ]);
        let service = FixtureRouteService::new().with_route(destination, route);

        // A geocode landing a few meters off still matches
        let near = Point::new(-74.01012, 40.70742);
        assert!(service
            .resolve_route(Point::new(-74.0105, 40.7040), near, TravelMode::Driving)
            .is_ok());

        let far = Point::new(-74.02, 40.72);
        assert!(matches!(
            service.resolve_route(Point::new(-74.0105, 40.7040), far, TravelMode::Driving),
            Err(RouteError::NoRouteFound)
        ));
    }
}

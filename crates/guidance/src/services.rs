//! Contracts for the platform services guidance depends on.
//!
//! The guidance core never calls these directly; the hosting controller owns
//! the implementations and applies whatever the tracker returns to them.
//! Implementations can be real platform bindings or simulations.

use geo::{LineString, Point};

use crate::identifiers::GeofenceId;
use crate::route::{ResolvedRoute, TravelMode};
use crate::tracker::GeofenceRegistration;

// ============================================================================
// Events
// ============================================================================

/// Location-permission state reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

/// Events a location provider delivers to the hosting controller.
///
/// Delivery order matters; the host must hand these to the tracker one at a
/// time, in the order received.
#[derive(Clone, Debug, PartialEq)]
pub enum LocationEvent {
    PositionUpdate(Point),
    EnteredGeofence(GeofenceId),
    AuthorizationChanged(AuthorizationStatus),
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("No matching place found for the entered address")]
    AddressNotFound,

    #[error("Geocoding service failed: {0}")]
    Service(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("No route found to that destination")]
    NoRouteFound,

    #[error("Directions service failed: {0}")]
    Service(String),
}

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Device position and geofence monitoring.
///
/// Only the guidance host may register or release step geofences; sharing
/// that set with another writer risks double registration or premature
/// removal.
pub trait LocationProvider: Send {
    fn authorization(&self) -> AuthorizationStatus;

    /// Ask the user for location permission (a later
    /// [`LocationEvent::AuthorizationChanged`] reports the outcome)
    fn request_authorization(&mut self);

    /// Last known device position, if any
    fn current_position(&self) -> Option<Point>;

    fn register_geofence(&mut self, registration: &GeofenceRegistration);

    fn unregister_geofence(&mut self, id: &GeofenceId);
}

/// Free-text address resolution.
pub trait GeocodingService: Send {
    fn resolve_address(&self, text: &str) -> Result<Point, GeocodeError>;
}

/// Route computation between two coordinates.
pub trait RouteService: Send {
    fn resolve_route(
        &self,
        origin: Point,
        destination: Point,
        mode: TravelMode,
    ) -> Result<ResolvedRoute, RouteError>;
}

/// Text-to-speech output. Fire and forget; the guidance host never waits on it.
pub trait SpeechAnnouncer: Send {
    fn speak(&mut self, text: &str);
}

/// Map display and camera control.
pub trait MapRenderer: Send {
    /// Draw the route polyline
    fn show_route(&mut self, geometry: &LineString);

    /// Frame the whole drawn route
    fn fit_route_bounds(&mut self);

    /// Center the camera on `center` with a viewport roughly `span_meters` across
    fn center_on(&mut self, center: Point, span_meters: f64);

    /// Remove the drawn route
    fn clear_route(&mut self);
}

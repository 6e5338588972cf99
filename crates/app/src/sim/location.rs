//! Simulated device location and geofence monitoring.
//!
//! Registered geofences live in an R-tree; containment checks run in two
//! stages, a fast envelope pass over the tree followed by a Haversine
//! verification against each candidate's real radius.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use geo::{HaversineDistance, Point};
use rstar::{RTree, RTreeObject, AABB};
use tracing::debug;
use waymark_guidance::prelude::*;

/// Meters per degree at the equator, for approximate envelope sizing
const METERS_PER_DEGREE: f64 = 111_320.0;

fn meters_to_degrees_approx(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

// ============================================================================
// Geofence Spatial Node
// ============================================================================

#[derive(Clone)]
struct GeofenceNode {
    id: GeofenceId,
    center: [f64; 2],
    radius_meters: f64,
}

impl GeofenceNode {
    fn new(registration: &GeofenceRegistration) -> Self {
        Self {
            id: registration.id.clone(),
            center: [registration.center.x(), registration.center.y()],
            radius_meters: registration.radius_meters,
        }
    }

    fn center_point(&self) -> Point {
        Point::new(self.center[0], self.center[1])
    }
}

impl RTreeObject for GeofenceNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        // Over-approximates the circle; the Haversine pass trims the excess.
        // Longitude degrees shrink by cos(latitude), so the east-west extent
        // must widen by the inverse or the box under-covers the circle.
        let half_lat = meters_to_degrees_approx(self.radius_meters);
        let half_lon = half_lat / self.center[1].to_radians().cos();
        AABB::from_corners(
            [self.center[0] - half_lon, self.center[1] - half_lat],
            [self.center[0] + half_lon, self.center[1] + half_lat],
        )
    }
}

// ============================================================================
// Provider
// ============================================================================

struct ProviderState {
    authorization: AuthorizationStatus,
    position: Option<Point>,
    fences: HashMap<GeofenceId, GeofenceRegistration>,
    tree: RTree<GeofenceNode>,
    /// Fences the device is currently inside; entering fires once until exit
    inside: HashSet<GeofenceId>,
}

impl ProviderState {
    fn rebuild_tree(&mut self) {
        self.tree = RTree::bulk_load(self.fences.values().map(GeofenceNode::new).collect());
    }

    /// Fences whose circle contains `position`
    fn containing(&self, position: Point) -> Vec<GeofenceId> {
        let query = AABB::from_point([position.x(), position.y()]);
        self.tree
            .locate_in_envelope_intersecting(&query)
            .filter(|node| position.haversine_distance(&node.center_point()) <= node.radius_meters)
            .map(|node| node.id.clone())
            .collect()
    }
}

/// In-memory location provider with a movable simulated device.
///
/// This type is a cheap-to-clone handle over shared state, so a test or demo
/// script can keep moving the device while the controller owns another handle
/// as its `LocationProvider`.
#[derive(Clone)]
pub struct SimulatedLocationProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl SimulatedLocationProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ProviderState {
                authorization: AuthorizationStatus::NotDetermined,
                position: None,
                fences: HashMap::new(),
                tree: RTree::new(),
                inside: HashSet::new(),
            })),
        }
    }

    pub fn with_position(position: Point) -> Self {
        let provider = Self::new();
        provider.lock().position = Some(position);
        provider
    }

    /// Move the device to `position`.
    ///
    /// Returns the resulting events in delivery order: the position update,
    /// then one enter event per fence newly entered. Staying inside a fence
    /// emits nothing more; leaving re-arms it.
    pub fn move_to(&self, position: Point) -> Vec<LocationEvent> {
        let mut state = self.lock();
        state.position = Some(position);

        let mut events = vec![LocationEvent::PositionUpdate(position)];

        let containing = state.containing(position);
        state.inside.retain(|id| containing.contains(id));

        let mut entered: Vec<GeofenceId> = containing
            .into_iter()
            .filter(|id| !state.inside.contains(id))
            .collect();
        entered.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        for id in entered {
            debug!(%id, "entered geofence");
            state.inside.insert(id.clone());
            events.push(LocationEvent::EnteredGeofence(id));
        }

        events
    }

    /// Ids of every fence currently monitored, in registration-id order
    pub fn monitored_fences(&self) -> Vec<GeofenceId> {
        let mut fences: Vec<GeofenceId> = self.lock().fences.keys().cloned().collect();
        fences.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        fences
    }

    pub fn is_monitoring(&self, id: &GeofenceId) -> bool {
        self.lock().fences.contains_key(id)
    }

    fn lock(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().expect("location provider state poisoned")
    }
}

impl Default for SimulatedLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider for SimulatedLocationProvider {
    fn authorization(&self) -> AuthorizationStatus {
        self.lock().authorization
    }

    fn request_authorization(&mut self) {
        let mut state = self.lock();
        if state.authorization == AuthorizationStatus::NotDetermined {
            // the simulated user always taps Allow
            state.authorization = AuthorizationStatus::Authorized;
        }
    }

    fn current_position(&self) -> Option<Point> {
        self.lock().position
    }

    fn register_geofence(&mut self, registration: &GeofenceRegistration) {
        let mut state = self.lock();
        state.fences.insert(registration.id.clone(), registration.clone());
        state.rebuild_tree();
    }

    fn unregister_geofence(&mut self, id: &GeofenceId) {
        let mut state = self.lock();
        state.fences.remove(id);
        state.inside.remove(id);
        state.rebuild_tree();
    }
}

//! Turn-by-turn progression state machine.
//!
//! [`RouteStepTracker`] owns the progress of the active route: which step the
//! traveler is on, what to announce at each geofence crossing, and when the
//! trip is over. It never talks to a location provider or speech engine
//! itself; every operation returns the data the hosting controller needs to
//! drive those collaborators, which keeps the state machine testable with
//! nothing but plain function calls.
//!
//! The expected host is a single event loop: operations are short and
//! non-blocking, and the host is responsible for delivering events one at a
//! time and in order.

use std::collections::HashMap;

use geo::Point;
use tracing::debug;

use crate::announce;
use crate::identifiers::GeofenceId;
use crate::route::RouteStep;

/// Radius in meters of the circular region registered around each maneuver point.
pub const MANEUVER_RADIUS_METERS: f64 = 20.0;

#[derive(Debug, thiserror::Error)]
pub enum GuidanceError {
    #[error("Cannot start guidance on an empty route")]
    EmptyRoute,
}

pub type Result<T> = std::result::Result<T, GuidanceError>;

/// Lifecycle of the tracked route.
///
/// `Loaded` and `Arrived` are transient: `load` passes through `Loaded` on
/// its way to `Navigating`, and a natural arrival passes through `Arrived`
/// before the automatic reset to `Idle`. The steady states an outside
/// observer sees are `Idle` and `Navigating`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavState {
    Idle,
    Loaded,
    Navigating,
    Arrived,
}

/// A circular region the host should start monitoring with its location provider.
#[derive(Clone, Debug, PartialEq)]
pub struct GeofenceRegistration {
    pub id: GeofenceId,
    pub center: Point,
    pub radius_meters: f64,
}

/// Result of loading a route: what to monitor and what to say first.
#[derive(Clone, Debug, PartialEq)]
pub struct Loaded {
    /// Initial announcement covering the first upcoming maneuvers
    pub announcement: String,
    /// One registration per step, in step order
    pub registrations: Vec<GeofenceRegistration>,
}

/// Outcome of a geofence-enter event.
#[derive(Clone, Debug, PartialEq)]
pub enum Advance {
    /// Still under way; announce the next maneuvers
    Progress(String),
    /// Trip complete; announce arrival and release the listed geofences
    Arrived {
        announcement: String,
        released: Vec<GeofenceId>,
    },
    /// Stale or unknown geofence; nothing changed and nothing to announce
    Ignored,
}

/// Progress of the active route. Exclusively owned by [`RouteStepTracker`];
/// mutated only through its three operations.
struct RouteProgress {
    steps: Vec<RouteStep>,
    /// Registered geofence ids, in step order
    fences: Vec<GeofenceId>,
    /// Geofence id -> step index lookup
    fence_steps: HashMap<GeofenceId, usize>,
    /// Index of the step guidance is currently for
    current_index: usize,
    state: NavState,
}

impl RouteProgress {
    fn idle() -> Self {
        Self {
            steps: Vec::new(),
            fences: Vec::new(),
            fence_steps: HashMap::new(),
            current_index: 0,
            state: NavState::Idle,
        }
    }

    fn reset(&mut self) {
        self.steps.clear();
        self.fences.clear();
        self.fence_steps.clear();
        self.current_index = 0;
        self.state = NavState::Idle;
    }
}

/// Tracks which route step the traveler is on and produces the announcement
/// text and completion signal for every lifecycle event.
pub struct RouteStepTracker {
    progress: RouteProgress,
}

impl RouteStepTracker {
    pub fn new() -> Self {
        Self {
            progress: RouteProgress::idle(),
        }
    }

    pub fn state(&self) -> NavState {
        self.progress.state
    }

    pub fn is_navigating(&self) -> bool {
        self.progress.state == NavState::Navigating
    }

    /// Number of steps not yet reached on the active route
    pub fn remaining_steps(&self) -> usize {
        self.progress.steps.len().saturating_sub(self.progress.current_index)
    }

    /// Start guidance over `steps`.
    ///
    /// Any route already in progress is discarded; call [`cancel`] first if
    /// its geofences are still registered with the location provider.
    ///
    /// Returns the geofence registrations the host should apply (one per
    /// step, 20 m around the maneuver point) and the initial announcement:
    /// the upcoming maneuver with one step of lookahead. Routes too short
    /// for the lookahead window clamp to the steps that exist.
    ///
    /// Fails with [`GuidanceError::EmptyRoute`] when `steps` is empty, in
    /// which case nothing is to be registered.
    ///
    /// [`cancel`]: RouteStepTracker::cancel
    pub fn load(&mut self, steps: Vec<RouteStep>) -> Result<Loaded> {
        if steps.is_empty() {
            return Err(GuidanceError::EmptyRoute);
        }

        self.progress.reset();
        self.progress.state = NavState::Loaded;

        let registrations: Vec<GeofenceRegistration> = steps
            .iter()
            .enumerate()
            .map(|(index, step)| GeofenceRegistration {
                id: GeofenceId::from_index(index),
                center: step.maneuver_point,
                radius_meters: MANEUVER_RADIUS_METERS,
            })
            .collect();

        self.progress.fences = registrations.iter().map(|r| r.id.clone()).collect();
        self.progress.fence_steps = registrations
            .iter()
            .enumerate()
            .map(|(index, r)| (r.id.clone(), index))
            .collect();

        // The first crossing has not happened yet; guidance starts one step
        // ahead so the opening announcement names the first real maneuver.
        // A single-step route has no step ahead to name.
        self.progress.current_index = if steps.len() > 1 { 1 } else { 0 };
        let announcement = announce::guidance(
            &steps[self.progress.current_index],
            steps.get(self.progress.current_index + 1),
        );

        self.progress.steps = steps;
        self.progress.state = NavState::Navigating;
        debug!(steps = self.progress.steps.len(), "route loaded, guidance started");

        Ok(Loaded {
            announcement,
            registrations,
        })
    }

    /// Handle a geofence-enter event reported by the location provider.
    ///
    /// Crossing the fence of an upcoming step advances guidance by one step.
    /// Events for fences already passed (duplicate or late redelivery,
    /// including the start fence firing right after load) and events that
    /// match no registered fence (delivery after a reset) are dropped
    /// without touching any state.
    pub fn on_geofence_entered(&mut self, id: &GeofenceId) -> Advance {
        let Some(&step_index) = self.progress.fence_steps.get(id) else {
            debug!(%id, "ignoring geofence event with no matching step");
            return Advance::Ignored;
        };
        if step_index < self.progress.current_index {
            debug!(%id, "ignoring geofence event for a passed step");
            return Advance::Ignored;
        }

        self.progress.current_index += 1;

        if self.progress.current_index < self.progress.steps.len() {
            let announcement = announce::guidance(
                &self.progress.steps[self.progress.current_index],
                self.progress.steps.get(self.progress.current_index + 1),
            );
            Advance::Progress(announcement)
        } else {
            self.progress.state = NavState::Arrived;
            let released = std::mem::take(&mut self.progress.fences);
            self.progress.reset();
            debug!(released = released.len(), "destination reached, guidance finished");
            Advance::Arrived {
                announcement: announce::arrival().to_owned(),
                released,
            }
        }
    }

    /// Stop guidance on the traveler's request.
    ///
    /// Returns every geofence id still registered so the host can release
    /// them, then resets to idle. Idempotent: cancelling an idle tracker
    /// returns an empty list. Distinct from natural arrival, which produces
    /// an arrival announcement; cancellation announces nothing.
    pub fn cancel(&mut self) -> Vec<GeofenceId> {
        if self.progress.state == NavState::Idle {
            return Vec::new();
        }

        let released = std::mem::take(&mut self.progress.fences);
        self.progress.reset();
        debug!(released = released.len(), "guidance cancelled");
        released
    }
}

impl Default for RouteStepTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(instruction: &str, distance_meters: f64, x: f64, y: f64) -> RouteStep {
        RouteStep {
            instruction: instruction.to_owned(),
            distance_meters,
            maneuver_point: Point::new(x, y),
        }
    }

    fn three_step_route() -> Vec<RouteStep> {
        vec![
            step("turn left", 100.0, -74.0000, 40.7000),
            step("turn right", 50.0, -74.0010, 40.7010),
            step("arrive", 0.0, -74.0020, 40.7020),
        ]
    }

    #[test]
    fn test_empty_route_is_rejected() {
        let mut tracker = RouteStepTracker::new();

        assert!(matches!(tracker.load(vec![]), Err(GuidanceError::EmptyRoute)));
        assert_eq!(tracker.state(), NavState::Idle);
    }

    #[test]
    fn test_load_registers_one_fence_per_step() {
        let mut tracker = RouteStepTracker::new();
        let loaded = tracker.load(three_step_route()).unwrap();

        assert_eq!(loaded.registrations.len(), 3);
        for (index, registration) in loaded.registrations.iter().enumerate() {
            assert_eq!(registration.id, GeofenceId::from_index(index));
            assert_eq!(registration.radius_meters, MANEUVER_RADIUS_METERS);
        }
        assert_eq!(loaded.registrations[1].center, Point::new(-74.0010, 40.7010));
        assert!(tracker.is_navigating());
    }

    #[test]
    fn test_initial_announcement_looks_one_step_ahead() {
        let mut tracker = RouteStepTracker::new();
        let loaded = tracker.load(three_step_route()).unwrap();

        // Names the second and third steps, not the trivial departure step
        assert_eq!(
            loaded.announcement,
            "In 50 meters turn right, then in 0 meters, arrive"
        );
    }

    #[test]
    fn test_full_route_walk() {
        let mut tracker = RouteStepTracker::new();
        tracker.load(three_step_route()).unwrap();

        // Crossing the second step's fence: last step announced without a
        // lookahead clause, still navigating
        let advance = tracker.on_geofence_entered(&GeofenceId::from_index(1));
        assert_eq!(advance, Advance::Progress("In 0 meters arrive".to_owned()));
        assert!(tracker.is_navigating());
        assert_eq!(tracker.remaining_steps(), 1);

        // Crossing the final fence: arrival, everything released and cleared
        let (announcement, released) = match tracker.on_geofence_entered(&GeofenceId::from_index(2)) {
            Advance::Arrived { announcement, released } => (announcement, released),
            other => panic!("expected arrival, got {other:?}"),
        };
        assert_eq!(announcement, "You have arrived at your destination");
        assert_eq!(
            released,
            vec![GeofenceId::from_index(0), GeofenceId::from_index(1), GeofenceId::from_index(2)]
        );
        assert_eq!(tracker.state(), NavState::Idle);
        assert_eq!(tracker.remaining_steps(), 0);
    }

    #[test]
    fn test_in_order_walk_arrives_for_any_length() {
        for len in 1..6 {
            let steps: Vec<RouteStep> = (0..len)
                .map(|i| step(&format!("maneuver {i}"), 10.0 * i as f64, -74.0, 40.7 + i as f64 * 0.001))
                .collect();

            let mut tracker = RouteStepTracker::new();
            tracker.load(steps).unwrap();

            // Fences ahead of the start position, in order; the last one arrives
            let first_live = if len > 1 { 1 } else { 0 };
            for index in first_live..len {
                let advance = tracker.on_geofence_entered(&GeofenceId::from_index(index));
                if index == len - 1 {
                    assert!(matches!(advance, Advance::Arrived { .. }), "len {len} index {index}");
                } else {
                    assert!(matches!(advance, Advance::Progress(_)), "len {len} index {index}");
                }
            }
            assert_eq!(tracker.state(), NavState::Idle);
        }
    }

    #[test]
    fn test_unknown_fence_is_ignored() {
        let mut tracker = RouteStepTracker::new();
        let loaded = tracker.load(three_step_route()).unwrap();

        assert_eq!(tracker.on_geofence_entered(&GeofenceId::new("99")), Advance::Ignored);
        assert_eq!(tracker.on_geofence_entered(&GeofenceId::new("bogus")), Advance::Ignored);
        assert!(tracker.is_navigating());
        assert_eq!(tracker.remaining_steps(), 2);

        // The route is untouched: the next real crossing still works
        let advance = tracker.on_geofence_entered(&loaded.registrations[1].id);
        assert!(matches!(advance, Advance::Progress(_)));
    }

    #[test]
    fn test_start_fence_after_load_is_stale() {
        let mut tracker = RouteStepTracker::new();
        tracker.load(three_step_route()).unwrap();

        // Guidance already moved past step 0; its fence firing (the traveler
        // starts inside it) must not advance anything
        assert_eq!(tracker.on_geofence_entered(&GeofenceId::from_index(0)), Advance::Ignored);
        assert_eq!(tracker.remaining_steps(), 2);
    }

    #[test]
    fn test_duplicate_delivery_is_stale() {
        let mut tracker = RouteStepTracker::new();
        tracker.load(three_step_route()).unwrap();

        assert!(matches!(
            tracker.on_geofence_entered(&GeofenceId::from_index(1)),
            Advance::Progress(_)
        ));
        // Same fence again: already passed
        assert_eq!(tracker.on_geofence_entered(&GeofenceId::from_index(1)), Advance::Ignored);
        assert_eq!(tracker.remaining_steps(), 1);
    }

    #[test]
    fn test_cancel_releases_everything() {
        let mut tracker = RouteStepTracker::new();
        tracker.load(three_step_route()).unwrap();

        let released = tracker.cancel();
        assert_eq!(released.len(), 3);
        assert_eq!(tracker.state(), NavState::Idle);

        // Previously valid fences are dead after cancel
        assert_eq!(tracker.on_geofence_entered(&GeofenceId::from_index(1)), Advance::Ignored);
    }

    #[test]
    fn test_cancel_when_idle_is_a_noop() {
        let mut tracker = RouteStepTracker::new();

        assert!(tracker.cancel().is_empty());
        assert!(tracker.cancel().is_empty());
        assert_eq!(tracker.state(), NavState::Idle);
    }

    #[test]
    fn test_single_step_route() {
        let mut tracker = RouteStepTracker::new();
        let loaded = tracker.load(vec![step("arrive", 15.0, -74.0, 40.7)]).unwrap();

        // No lookahead clause to give
        assert_eq!(loaded.announcement, "In 15 meters arrive");
        assert_eq!(loaded.registrations.len(), 1);

        // Its one crossing is the arrival
        let released = match tracker.on_geofence_entered(&GeofenceId::from_index(0)) {
            Advance::Arrived { released, .. } => released,
            other => panic!("expected arrival, got {other:?}"),
        };
        assert_eq!(released, vec![GeofenceId::from_index(0)]);
    }

    #[test]
    fn test_two_step_route() {
        let mut tracker = RouteStepTracker::new();
        let loaded = tracker
            .load(vec![
                step("head north", 0.0, -74.0, 40.7),
                step("arrive", 200.0, -74.0, 40.702),
            ])
            .unwrap();

        assert_eq!(loaded.announcement, "In 200 meters arrive");

        let advance = tracker.on_geofence_entered(&GeofenceId::from_index(1));
        assert!(matches!(advance, Advance::Arrived { .. }));
    }

    #[test]
    fn test_load_replaces_active_route() {
        let mut tracker = RouteStepTracker::new();
        tracker.load(three_step_route()).unwrap();
        assert!(matches!(
            tracker.on_geofence_entered(&GeofenceId::from_index(1)),
            Advance::Progress(_)
        ));

        let loaded = tracker
            .load(vec![
                step("head south", 0.0, -73.0, 40.0),
                step("turn left", 40.0, -73.0, 39.999),
                step("turn right", 60.0, -73.001, 39.999),
                step("arrive", 10.0, -73.002, 39.999),
            ])
            .unwrap();

        assert_eq!(loaded.registrations.len(), 4);
        assert_eq!(tracker.remaining_steps(), 3);
        assert_eq!(
            loaded.announcement,
            "In 40 meters turn left, then in 60 meters, turn right"
        );
    }
}

//! Event glue between the user, the platform services, and the tracker.
//!
//! [`NavigationController`] is what a screen would talk to: it reacts to the
//! two buttons ("Get Direction", "Start/Stop Navigation") and to location
//! events, routes everything through the one [`RouteStepTracker`], and keeps
//! the text the direction label should show. All collaborators are injected,
//! so the whole flow runs under test against simulations.

use eyre::eyre;
use tracing::{debug, info};
use waymark_guidance::prelude::*;

/// Label text when no guidance is active.
pub const IDLE_PROMPT: &str = "Where do you want to go?";

/// Camera span when following the traveler, in meters.
pub const CAMERA_SPAN_METERS: f64 = 500.0;

pub struct NavigationController {
    tracker: RouteStepTracker,
    location: Box<dyn LocationProvider>,
    geocoder: Box<dyn GeocodingService>,
    routes: Box<dyn RouteService>,
    speech: Box<dyn SpeechAnnouncer>,
    map: Box<dyn MapRenderer>,

    guidance_text: String,
    /// Whether a route is being shown; while false the camera follows the traveler
    route_shown: bool,
    navigation_started: bool,
}

impl NavigationController {
    pub fn new(
        location: Box<dyn LocationProvider>,
        geocoder: Box<dyn GeocodingService>,
        routes: Box<dyn RouteService>,
        speech: Box<dyn SpeechAnnouncer>,
        map: Box<dyn MapRenderer>,
    ) -> Self {
        Self {
            tracker: RouteStepTracker::new(),
            location,
            geocoder,
            routes,
            speech,
            map,
            guidance_text: IDLE_PROMPT.to_owned(),
            route_shown: false,
            navigation_started: false,
        }
    }

    /// Text the direction label should currently show
    pub fn guidance_text(&self) -> &str {
        &self.guidance_text
    }

    pub fn navigation_started(&self) -> bool {
        self.navigation_started
    }

    /// Title for the start/stop button
    pub fn start_stop_title(&self) -> &'static str {
        if self.navigation_started {
            "Stop Navigation"
        } else {
            "Start Navigation"
        }
    }

    /// "Get Direction" pressed: geocode the typed destination, resolve a
    /// driving route from the current position, show it, and start guidance.
    ///
    /// Collaborator failures put their displayable message on the label and
    /// propagate.
    pub fn request_directions(&mut self, destination_text: &str) -> eyre::Result<()> {
        self.route_shown = true;

        let destination = self
            .geocoder
            .resolve_address(destination_text)
            .inspect_err(|err| self.guidance_text = err.to_string())?;

        let origin = self
            .location
            .current_position()
            .ok_or_else(|| eyre!("current position unavailable"))?;

        let route = self
            .routes
            .resolve_route(origin, destination, TravelMode::Driving)
            .inspect_err(|err| self.guidance_text = err.to_string())?;
        info!(
            steps = route.steps.len(),
            total_meters = route.total_distance_meters(),
            "route resolved"
        );

        self.map.show_route(&route.geometry);
        self.map.fit_route_bounds();

        // A replaced route's fences must come off the provider before the
        // new ones go on
        for id in self.tracker.cancel() {
            self.location.unregister_geofence(&id);
        }

        let loaded = self.tracker.load(route.steps)?;
        for registration in &loaded.registrations {
            self.location.register_geofence(registration);
        }
        info!(fences = loaded.registrations.len(), "guidance started");
        self.announce(loaded.announcement);

        Ok(())
    }

    /// Start/stop button pressed.
    pub fn toggle_navigation(&mut self) {
        if !self.navigation_started {
            self.route_shown = true;
            if let Some(position) = self.location.current_position() {
                self.map.center_on(position, CAMERA_SPAN_METERS);
            }
            self.navigation_started = true;
        } else {
            self.map.fit_route_bounds();
            for id in self.tracker.cancel() {
                self.location.unregister_geofence(&id);
            }
            self.map.clear_route();
            self.route_shown = false;
            self.guidance_text = IDLE_PROMPT.to_owned();
            self.navigation_started = false;
            info!("navigation stopped");
        }
    }

    /// An event delivered by the location provider.
    pub fn handle_event(&mut self, event: LocationEvent) {
        match event {
            LocationEvent::PositionUpdate(position) => {
                if !self.route_shown {
                    self.map.center_on(position, CAMERA_SPAN_METERS);
                }
            }
            LocationEvent::EnteredGeofence(id) => match self.tracker.on_geofence_entered(&id) {
                Advance::Progress(announcement) => self.announce(announcement),
                Advance::Arrived { announcement, released } => {
                    for id in &released {
                        self.location.unregister_geofence(id);
                    }
                    self.navigation_started = false;
                    self.announce(announcement);
                }
                Advance::Ignored => debug!(%id, "geofence event ignored"),
            },
            LocationEvent::AuthorizationChanged(status) => self.handle_authorization(status),
        }
    }

    fn handle_authorization(&mut self, status: AuthorizationStatus) {
        match status {
            AuthorizationStatus::NotDetermined => self.location.request_authorization(),
            AuthorizationStatus::Restricted => {
                self.guidance_text = "Your location is restricted".to_owned();
            }
            AuthorizationStatus::Denied => {
                self.guidance_text = "Your location is denied".to_owned();
            }
            AuthorizationStatus::Authorized => {
                if let Some(position) = self.location.current_position() {
                    self.map.center_on(position, CAMERA_SPAN_METERS);
                }
            }
        }
    }

    fn announce(&mut self, text: String) {
        self.speech.speak(&text);
        self.guidance_text = text;
    }
}

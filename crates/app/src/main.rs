//! Scripted turn-by-turn demo.
//!
//! Plays the single-screen flow against simulated platform services: grant
//! location access, type a destination, get a driving route, start
//! navigation, then drive the route and hear an announcement at every
//! geofence crossing.

mod controller;
mod sim;

use geo::Point;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use waymark_guidance::prelude::*;

use crate::controller::NavigationController;
use crate::sim::{
    route_from_waypoints, ConsoleAnnouncer, ConsoleMapRenderer, FixtureGeocoder,
    FixtureRouteService, SimulatedLocationProvider,
};

fn setup_logging() {
    let layer = tracing_subscriber::fmt::layer().without_time().with_target(false);
    tracing_subscriber::registry().with(layer).init();
}

fn main() -> eyre::Result<()> {
    setup_logging();

    // Lower Manhattan fixture: drive from the waterfront up to Federal Hall
    let waypoints = [
        (Point::new(-74.0139, 40.7046), "Proceed to Trinity Place"),
        (Point::new(-74.0123, 40.7074), "Turn right onto Rector Street"),
        (Point::new(-74.0112, 40.7070), "Turn left onto Broadway"),
        (Point::new(-74.0106, 40.7082), "Turn right onto Wall Street"),
        (Point::new(-74.0101, 40.7074), "Arrive at Federal Hall, on your left"),
    ];
    let start = waypoints[0].0;
    let destination = waypoints[waypoints.len() - 1].0;

    let provider = SimulatedLocationProvider::with_position(start);
    let mut controller = NavigationController::new(
        Box::new(provider.clone()),
        Box::new(FixtureGeocoder::new().with_place("Federal Hall", destination)),
        Box::new(FixtureRouteService::new().with_route(destination, route_from_waypoints(&waypoints))),
        Box::new(ConsoleAnnouncer),
        Box::new(ConsoleMapRenderer::new()),
    );

    // Permission dance: the first callback asks the user, the second reports the grant
    controller.handle_event(LocationEvent::AuthorizationChanged(provider.authorization()));
    controller.handle_event(LocationEvent::AuthorizationChanged(provider.authorization()));

    info!("destination: Federal Hall");
    controller.request_directions("Federal Hall")?;
    controller.toggle_navigation();

    // Drive the route, one maneuver point at a time
    for (point, _) in &waypoints[1..] {
        for event in provider.move_to(*point) {
            controller.handle_event(event);
        }
        info!("label: {}", controller.guidance_text());
    }

    info!("trip over, fences monitored: {}", provider.monitored_fences().len());
    Ok(())
}

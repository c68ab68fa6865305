use findmyclass_nav::adapters::inbound::{SimulatedCompass, SimulatedGeolocation};
use findmyclass_nav::adapters::outbound::SimulatedDirections;
use findmyclass_nav::application::NavigationService;
use findmyclass_nav::common::geo::Coordinate;
use findmyclass_nav::navigation::projections::view_to_geojson;
use findmyclass_nav::navigation::Destination;
use findmyclass_nav::Config;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting FindMyClass navigation demo");

    let config = Config::from_file("config.toml").await?;
    info!(
        "Arrival radius {} m, path tolerance {} m",
        config.navigation.arrival_radius_m, config.navigation.path_tolerance_m
    );

    // Walk across campus to the classroom.
    let origin = Coordinate::new(34.2400, -118.5281)?;
    let classroom = Coordinate::new(34.2410, -118.5270)?;
    let destination = Destination::new("JD-1618", classroom);

    let geolocation = Arc::new(
        SimulatedGeolocation::new(origin, classroom, 30, Duration::from_millis(200))
            .with_jitter(2.0),
    );
    let compass = Arc::new(SimulatedCompass::new(40.0, 90.0, 30, Duration::from_millis(250)));
    let directions = Arc::new(SimulatedDirections::new());

    let service = NavigationService::new(directions, geolocation, compass, config);
    let (view_tx, mut view_rx) = NavigationService::view_channel();

    // Stand-in for the map surface: log every view change, export the route
    // as GeoJSON once it appears.
    let renderer = tokio::spawn(async move {
        let mut exported = false;
        while view_rx.changed().await.is_ok() {
            let view = view_rx.borrow().clone();
            info!(
                "view: {} steps, {} turn markers, arrived={}",
                view.steps.len(),
                view.turn_markers.len(),
                view.arrived
            );
            if !exported && !view.polyline.is_empty() {
                info!("route geojson: {}", view_to_geojson(&view));
                exported = true;
            }
            if view.arrived {
                break;
            }
        }
    });

    service.run(destination, view_tx).await?;
    renderer.await?;

    info!("Navigation session complete");
    Ok(())
}

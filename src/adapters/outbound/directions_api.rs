use crate::common::geo::Coordinate;
use crate::common::{NavigationError, NavigationResult};
use crate::domains::navigation::ports::{DirectionsProvider, DirectionsTransport};
use crate::domains::navigation::{ManeuverKind, Route, RouteStep};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

/// Directions service response, in the shape the maps JS API delivers it.
#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<RoutePayload>,
}

#[derive(Debug, Deserialize)]
struct RoutePayload {
    #[serde(default)]
    legs: Vec<LegPayload>,
    #[serde(default)]
    overview_path: Vec<LatLngPayload>,
}

#[derive(Debug, Deserialize)]
struct LegPayload {
    #[serde(default)]
    steps: Vec<StepPayload>,
}

#[derive(Debug, Deserialize)]
struct StepPayload {
    instructions: String,
    start_location: LatLngPayload,
    end_location: LatLngPayload,
    distance: TextValuePayload,
    duration: TextValuePayload,
    maneuver: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatLngPayload {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct TextValuePayload {
    #[serde(default)]
    text: String,
    #[serde(default)]
    value: f64,
}

/// Parse a walking-directions response body into a complete `Route`.
///
/// A non-`OK` status, missing routes/legs/steps, or an overview path
/// shorter than two points all yield `RouteUnavailable`; a
/// partially-populated route is never returned.
pub fn parse_walking_route(body: &str) -> NavigationResult<Route> {
    let response: DirectionsResponse =
        serde_json::from_str(body).map_err(|e| NavigationError::RouteUnavailable {
            reason: format!("malformed directions payload: {}", e),
        })?;

    if response.status != "OK" {
        return Err(NavigationError::RouteUnavailable {
            reason: format!("directions status {}", response.status),
        });
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| NavigationError::RouteUnavailable {
            reason: "response carries no routes".to_string(),
        })?;
    let RoutePayload {
        legs,
        overview_path,
    } = route;

    let leg = legs
        .into_iter()
        .next()
        .ok_or_else(|| NavigationError::RouteUnavailable {
            reason: "route carries no legs".to_string(),
        })?;
    if leg.steps.is_empty() {
        return Err(NavigationError::RouteUnavailable {
            reason: "leg carries no steps".to_string(),
        });
    }

    let polyline = overview_path
        .iter()
        .map(to_coordinate)
        .collect::<NavigationResult<Vec<_>>>()?;
    if polyline.len() < 2 {
        return Err(NavigationError::RouteUnavailable {
            reason: "overview path shorter than two points".to_string(),
        });
    }

    let steps = leg
        .steps
        .into_iter()
        .map(|step| {
            Ok(RouteStep {
                maneuver: ManeuverKind::from_provider(step.maneuver.as_deref()),
                start: to_coordinate(&step.start_location)?,
                end: to_coordinate(&step.end_location)?,
                instruction: step.instructions,
                distance_m: step.distance.value,
                duration_text: step.duration.text,
            })
        })
        .collect::<NavigationResult<Vec<_>>>()?;

    Ok(Route {
        steps,
        polyline,
        created_at: Utc::now(),
    })
}

fn to_coordinate(p: &LatLngPayload) -> NavigationResult<Coordinate> {
    Coordinate::new(p.lat, p.lng).map_err(|e| NavigationError::RouteUnavailable {
        reason: format!("bad coordinate in payload: {}", e),
    })
}

/// `DirectionsProvider` backed by the external directions web service.
/// Always requests walking mode; the transport does the network leg, this
/// adapter validates and translates the payload.
pub struct DirectionsApiClient {
    transport: Arc<dyn DirectionsTransport>,
}

impl DirectionsApiClient {
    pub fn new(transport: Arc<dyn DirectionsTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl DirectionsProvider for DirectionsApiClient {
    async fn walking_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> NavigationResult<Route> {
        let body = self
            .transport
            .fetch_walking_directions(origin, destination)
            .await?;
        parse_walking_route(&body)
    }
}

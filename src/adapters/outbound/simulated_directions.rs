use crate::common::geo::{bearing_degrees, distance_meters, Coordinate};
use crate::common::{NavigationError, NavigationResult};
use crate::domains::navigation::ports::DirectionsProvider;
use crate::domains::navigation::projections::format_distance;
use crate::domains::navigation::{ManeuverKind, Route, RouteStep};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Walking pace used for synthetic duration text, meters per minute.
const WALKING_PACE_M_PER_MIN: f64 = 84.0;

/// Synthetic walking-directions provider for the demo binary and tests.
/// Produces an L-shaped two-step route: walk the latitude leg, turn, walk
/// the longitude leg to the destination.
pub struct SimulatedDirections {
    failures_remaining: AtomicUsize,
    requests_served: AtomicUsize,
}

impl SimulatedDirections {
    pub fn new() -> Self {
        Self {
            failures_remaining: AtomicUsize::new(0),
            requests_served: AtomicUsize::new(0),
        }
    }

    /// Fail the first `failures` requests with `RouteUnavailable` before
    /// serving normally. Models a flaky directions backend.
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures_remaining: AtomicUsize::new(failures),
            requests_served: AtomicUsize::new(0),
        }
    }

    pub fn requests_served(&self) -> usize {
        self.requests_served.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedDirections {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectionsProvider for SimulatedDirections {
    async fn walking_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> NavigationResult<Route> {
        if self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(NavigationError::RouteUnavailable {
                reason: "simulated directions outage".to_string(),
            });
        }
        self.requests_served.fetch_add(1, Ordering::SeqCst);

        let corner = Coordinate {
            latitude: destination.latitude,
            longitude: origin.longitude,
        };
        let leg1_m = distance_meters(origin, corner);
        let leg2_m = distance_meters(corner, destination);

        let steps = vec![
            RouteStep {
                instruction: format!(
                    "Head {} for {}",
                    compass_name(bearing_degrees(origin, corner)),
                    format_distance(leg1_m)
                ),
                start: origin,
                end: corner,
                distance_m: leg1_m,
                duration_text: duration_text(leg1_m),
                maneuver: ManeuverKind::Straight,
            },
            RouteStep {
                instruction: format!(
                    "Turn {} and continue to the destination",
                    turn_word(origin, corner, destination)
                ),
                start: corner,
                end: destination,
                distance_m: leg2_m,
                duration_text: duration_text(leg2_m),
                maneuver: ManeuverKind::Turn,
            },
        ];

        Ok(Route {
            steps,
            polyline: vec![origin, corner, destination],
            created_at: Utc::now(),
        })
    }
}

fn duration_text(meters: f64) -> String {
    let minutes = (meters / WALKING_PACE_M_PER_MIN).ceil().max(1.0) as i64;
    format!("{} min", minutes)
}

fn compass_name(bearing_deg: f64) -> &'static str {
    const NAMES: [&str; 8] = [
        "north",
        "northeast",
        "east",
        "southeast",
        "south",
        "southwest",
        "west",
        "northwest",
    ];
    let sector = ((bearing_deg + 22.5).rem_euclid(360.0) / 45.0) as usize;
    NAMES[sector.min(7)]
}

/// "left" or "right" from the bearing change at the corner.
fn turn_word(a: Coordinate, corner: Coordinate, b: Coordinate) -> &'static str {
    let mut angle = bearing_degrees(corner, b) - bearing_degrees(a, corner);
    if angle > 180.0 {
        angle -= 360.0;
    } else if angle < -180.0 {
        angle += 360.0;
    }
    if angle >= 0.0 {
        "right"
    } else {
        "left"
    }
}

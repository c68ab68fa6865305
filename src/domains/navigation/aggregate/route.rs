use crate::common::geo::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManeuverKind {
    Turn,
    Straight,
    Arrive,
    Other,
}

impl ManeuverKind {
    /// Classify a provider's raw maneuver string ("turn-left",
    /// "turn-sharp-right", ...). Steps without a maneuver go straight ahead.
    pub fn from_provider(raw: Option<&str>) -> Self {
        match raw {
            None => ManeuverKind::Straight,
            Some(m) if m.contains("turn") => ManeuverKind::Turn,
            Some(m) if m.contains("arrive") => ManeuverKind::Arrive,
            Some(m) if m.contains("straight") => ManeuverKind::Straight,
            Some(_) => ManeuverKind::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub start: Coordinate,
    pub end: Coordinate,
    pub distance_m: f64,
    pub duration_text: String,
    pub maneuver: ManeuverKind,
}

/// A walking route from the user's position to the destination: the ordered
/// step list plus the overview polyline the deviation check runs against.
/// Replaced wholesale on every reroute, never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub steps: Vec<RouteStep>,
    pub polyline: Vec<Coordinate>,
    pub created_at: DateTime<Utc>,
}

impl Route {
    pub fn total_distance_m(&self) -> f64 {
        self.steps.iter().map(|s| s.distance_m).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutePurpose {
    Initial,
    Reroute,
}

/// A single outstanding call to the directions provider. At most one is in
/// flight per session; the id lets late completions be discarded.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest {
    pub request_id: Uuid,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub purpose: RoutePurpose,
}

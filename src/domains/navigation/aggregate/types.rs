use crate::common::geo::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The classroom a session navigates to. Immutable once navigation starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub classroom_id: String,
    pub coordinate: Coordinate,
}

impl Destination {
    pub fn new(classroom_id: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            classroom_id: classroom_id.into(),
            coordinate,
        }
    }
}

/// One device location fix. Only the latest sample is retained by the core.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionSample {
    pub coordinate: Coordinate,
    pub timestamp: DateTime<Utc>,
    pub accuracy_m: Option<f64>,
}

impl PositionSample {
    pub fn new(coordinate: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            timestamp,
            accuracy_m: None,
        }
    }

    pub fn with_accuracy(coordinate: Coordinate, timestamp: DateTime<Utc>, accuracy_m: f64) -> Self {
        Self {
            coordinate,
            timestamp,
            accuracy_m: Some(accuracy_m),
        }
    }
}

/// Compass heading used for display rotation only; heading never drives
/// routing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingSample {
    pub degrees: f64,
}

impl HeadingSample {
    /// Normalize any angle into [0, 360).
    pub fn new(degrees: f64) -> Self {
        Self {
            degrees: degrees.rem_euclid(360.0),
        }
    }
}

/// Decision thresholds for the arrival and deviation checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Geofence radius around the classroom, in meters.
    pub arrival_radius_m: f64,
    /// Maximum distance from the route polyline before a reroute, in meters.
    pub path_tolerance_m: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            arrival_radius_m: 20.0,
            path_tolerance_m: 50.0,
        }
    }
}

use super::aggregate::{Route, RoutePurpose};
use crate::common::geo::Coordinate;
use crate::common::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NavigationEvent {
    NavigationStarted {
        session_id: String,
        classroom_id: String,
        destination: Coordinate,
        timestamp: DateTime<Utc>,
    },
    PositionStreamStarted {
        session_id: String,
        timestamp: DateTime<Utc>,
    },
    FirstFixAcquired {
        session_id: String,
        position: Coordinate,
        timestamp: DateTime<Utc>,
    },
    RouteRequested {
        session_id: String,
        request_id: Uuid,
        origin: Coordinate,
        purpose: RoutePurpose,
        timestamp: DateTime<Utc>,
    },
    RouteUpdated {
        session_id: String,
        request_id: Uuid,
        route: Route,
        timestamp: DateTime<Utc>,
    },
    RouteRequestFailed {
        session_id: String,
        request_id: Uuid,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    DeviationDetected {
        session_id: String,
        position: Coordinate,
        timestamp: DateTime<Utc>,
    },
    DestinationReached {
        session_id: String,
        position: Coordinate,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for NavigationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            NavigationEvent::NavigationStarted { .. } => "NavigationStarted",
            NavigationEvent::PositionStreamStarted { .. } => "PositionStreamStarted",
            NavigationEvent::FirstFixAcquired { .. } => "FirstFixAcquired",
            NavigationEvent::RouteRequested { .. } => "RouteRequested",
            NavigationEvent::RouteUpdated { .. } => "RouteUpdated",
            NavigationEvent::RouteRequestFailed { .. } => "RouteRequestFailed",
            NavigationEvent::DeviationDetected { .. } => "DeviationDetected",
            NavigationEvent::DestinationReached { .. } => "DestinationReached",
        }
    }

    fn session_id(&self) -> &str {
        match self {
            NavigationEvent::NavigationStarted { session_id, .. } => session_id,
            NavigationEvent::PositionStreamStarted { session_id, .. } => session_id,
            NavigationEvent::FirstFixAcquired { session_id, .. } => session_id,
            NavigationEvent::RouteRequested { session_id, .. } => session_id,
            NavigationEvent::RouteUpdated { session_id, .. } => session_id,
            NavigationEvent::RouteRequestFailed { session_id, .. } => session_id,
            NavigationEvent::DeviationDetected { session_id, .. } => session_id,
            NavigationEvent::DestinationReached { session_id, .. } => session_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            NavigationEvent::NavigationStarted { timestamp, .. } => *timestamp,
            NavigationEvent::PositionStreamStarted { timestamp, .. } => *timestamp,
            NavigationEvent::FirstFixAcquired { timestamp, .. } => *timestamp,
            NavigationEvent::RouteRequested { timestamp, .. } => *timestamp,
            NavigationEvent::RouteUpdated { timestamp, .. } => *timestamp,
            NavigationEvent::RouteRequestFailed { timestamp, .. } => *timestamp,
            NavigationEvent::DeviationDetected { timestamp, .. } => *timestamp,
            NavigationEvent::DestinationReached { timestamp, .. } => *timestamp,
        }
    }
}

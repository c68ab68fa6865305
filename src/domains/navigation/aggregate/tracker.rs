use super::route::{Route, RoutePurpose, RouteRequest};
use super::state::NavigationState;
use super::types::{Destination, NavigationConfig, PositionSample};
use crate::common::geo::{self, Coordinate};
use crate::common::{NavigationError, NavigationResult};
use crate::domains::navigation::events::NavigationEvent;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

/// What the session loop must do after feeding the tracker.
#[derive(Debug, Clone, Copy)]
pub enum TrackerDirective {
    /// Nothing beyond refreshing the view.
    None,
    /// Call the directions provider and feed the result back in.
    RequestRoute(RouteRequest),
    /// Arrival: release the position subscription; no further requests.
    StopPositionStream,
}

/// The navigation state machine for one session. Consumes position samples,
/// owns the current route, and decides arrival vs. deviation vs. continue.
/// Commands record `NavigationEvent`s and apply them; `apply` is the only
/// place state transitions happen.
///
/// All operations are synchronous. Route requests are carried out by the
/// caller, which reports back via `complete_route_request` /
/// `fail_route_request`.
#[derive(Debug, Clone)]
pub struct NavigationTracker {
    session_id: String,
    destination: Destination,
    config: NavigationConfig,
    state: NavigationState,
    last_fix: Option<PositionSample>,
    pending_request: Option<Uuid>,
    version: u64,
    uncommitted_events: Vec<NavigationEvent>,
}

impl NavigationTracker {
    pub fn new(session_id: String, destination: Destination, config: NavigationConfig) -> Self {
        let mut tracker = Self {
            session_id: session_id.clone(),
            destination: destination.clone(),
            config,
            state: NavigationState::Idle,
            last_fix: None,
            pending_request: None,
            version: 0,
            uncommitted_events: Vec::new(),
        };

        let event = NavigationEvent::NavigationStarted {
            session_id,
            classroom_id: destination.classroom_id,
            destination: destination.coordinate,
            timestamp: Utc::now(),
        };
        tracker.record(event);
        tracker
    }

    /// Idle -> AwaitingFirstFix, once the position stream is live.
    pub fn position_stream_started(&mut self) -> NavigationResult<()> {
        if !matches!(self.state, NavigationState::Idle) {
            return Err(NavigationError::InvalidCommand {
                reason: format!(
                    "position stream already started (phase {})",
                    self.state.phase()
                ),
            });
        }
        self.record(NavigationEvent::PositionStreamStarted {
            session_id: self.session_id.clone(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Evaluate one position sample. The arrival check runs before the
    /// deviation check on every sample, whatever the route state.
    pub fn handle_position(&mut self, sample: PositionSample) -> NavigationResult<TrackerDirective> {
        // Out-of-order samples never revert state.
        if let Some(last) = &self.last_fix {
            if sample.timestamp < last.timestamp {
                debug!(
                    "dropping stale position sample ({} < {})",
                    sample.timestamp, last.timestamp
                );
                return Ok(TrackerDirective::None);
            }
        }

        // Before the stream starts, and after arrival, samples are ignored.
        if matches!(self.state, NavigationState::Idle | NavigationState::Arrived) {
            return Ok(TrackerDirective::None);
        }

        let position = sample.coordinate;
        let first_fix = self.last_fix.is_none();
        self.last_fix = Some(sample);

        if geo::distance_meters(position, self.destination.coordinate) <= self.config.arrival_radius_m
        {
            self.record(NavigationEvent::DestinationReached {
                session_id: self.session_id.clone(),
                position,
                timestamp: Utc::now(),
            });
            return Ok(TrackerDirective::StopPositionStream);
        }

        // One request in flight at a time; the next fix retries naturally.
        if self.pending_request.is_some() {
            return Ok(TrackerDirective::None);
        }

        if matches!(self.state, NavigationState::AwaitingFirstFix) {
            if first_fix {
                self.record(NavigationEvent::FirstFixAcquired {
                    session_id: self.session_id.clone(),
                    position,
                    timestamp: Utc::now(),
                });
            }
            let request = self.open_route_request(position, RoutePurpose::Initial);
            return Ok(TrackerDirective::RequestRoute(request));
        }

        let deviated = match &self.state {
            NavigationState::Routed(route) => {
                !geo::is_on_path(position, &route.polyline, self.config.path_tolerance_m)
            }
            _ => false,
        };
        if deviated {
            self.record(NavigationEvent::DeviationDetected {
                session_id: self.session_id.clone(),
                position,
                timestamp: Utc::now(),
            });
            let request = self.open_route_request(position, RoutePurpose::Reroute);
            return Ok(TrackerDirective::RequestRoute(request));
        }

        Ok(TrackerDirective::None)
    }

    /// Install the route produced by a provider call. Completions arriving
    /// after arrival or cancellation, or for a superseded request, are
    /// discarded without touching state.
    pub fn complete_route_request(&mut self, request_id: Uuid, route: Route) {
        if self.state.is_arrived() || self.pending_request != Some(request_id) {
            debug!("discarding route for request {}: no longer pending", request_id);
            return;
        }
        self.record(NavigationEvent::RouteUpdated {
            session_id: self.session_id.clone(),
            request_id,
            route,
            timestamp: Utc::now(),
        });
    }

    /// A provider call failed. State is preserved; the next position update
    /// retries naturally. No retry timer is scheduled.
    pub fn fail_route_request(&mut self, request_id: Uuid, reason: String) {
        if self.pending_request != Some(request_id) {
            debug!("ignoring failure of request {}: no longer pending", request_id);
            return;
        }
        self.record(NavigationEvent::RouteRequestFailed {
            session_id: self.session_id.clone(),
            request_id,
            reason,
            timestamp: Utc::now(),
        });
    }

    fn open_route_request(&mut self, origin: Coordinate, purpose: RoutePurpose) -> RouteRequest {
        let request = RouteRequest {
            request_id: Uuid::new_v4(),
            origin,
            destination: self.destination.coordinate,
            purpose,
        };
        self.record(NavigationEvent::RouteRequested {
            session_id: self.session_id.clone(),
            request_id: request.request_id,
            origin,
            purpose,
            timestamp: Utc::now(),
        });
        request
    }

    fn record(&mut self, event: NavigationEvent) {
        self.uncommitted_events.push(event.clone());
        self.apply(&event);
    }

    /// Apply an event to the tracker state. Every transition funnels through
    /// here, one version tick per event.
    fn apply(&mut self, event: &NavigationEvent) {
        match event {
            NavigationEvent::NavigationStarted { .. } => {
                self.state = NavigationState::Idle;
            }
            NavigationEvent::PositionStreamStarted { .. } => {
                self.state = NavigationState::AwaitingFirstFix;
            }
            NavigationEvent::FirstFixAcquired { .. } => {}
            NavigationEvent::RouteRequested { request_id, .. } => {
                self.pending_request = Some(*request_id);
            }
            NavigationEvent::RouteUpdated { route, .. } => {
                self.pending_request = None;
                self.state = NavigationState::Routed(route.clone());
            }
            NavigationEvent::RouteRequestFailed { .. } => {
                self.pending_request = None;
            }
            NavigationEvent::DeviationDetected { .. } => {}
            NavigationEvent::DestinationReached { .. } => {
                self.pending_request = None;
                self.state = NavigationState::Arrived;
            }
        }
        self.version += 1;
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn last_fix(&self) -> Option<&PositionSample> {
        self.last_fix.as_ref()
    }

    pub fn has_pending_request(&self) -> bool {
        self.pending_request.is_some()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn uncommitted_events(&self) -> &[NavigationEvent] {
        &self.uncommitted_events
    }

    pub fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }
}

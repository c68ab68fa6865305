use crate::common::{ApplicationError, ApplicationResult, DomainEvent};
use crate::config::Config;
use crate::domains::navigation::ports::{DirectionsProvider, HeadingSource, PositionSource};
use crate::domains::navigation::projections::{project, NavigationView};
use crate::domains::navigation::{
    Destination, HeadingSample, NavigationState, NavigationTracker, TrackerDirective,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

/// Orchestrates one navigation session: bridges the sensor streams and the
/// directions provider into the tracker, and publishes the projected view
/// after every change.
///
/// The route request is the only suspension point besides the stream
/// receives; tracker operations are synchronous and run on this task.
pub struct NavigationService {
    directions: Arc<dyn DirectionsProvider>,
    positions: Arc<dyn PositionSource>,
    headings: Arc<dyn HeadingSource>,
    config: Config,
}

impl NavigationService {
    pub fn new(
        directions: Arc<dyn DirectionsProvider>,
        positions: Arc<dyn PositionSource>,
        headings: Arc<dyn HeadingSource>,
        config: Config,
    ) -> Self {
        Self {
            directions,
            positions,
            headings,
            config,
        }
    }

    /// Create the view channel for a session. Receivers always observe the
    /// latest view; render ticks never queue up behind each other.
    pub fn view_channel() -> (
        watch::Sender<NavigationView>,
        watch::Receiver<NavigationView>,
    ) {
        watch::channel(project(&NavigationState::Idle, None, None))
    }

    /// Run a session until the user reaches the classroom.
    ///
    /// Fails with `SensorUnavailable` when the position permission is denied
    /// (surfaced to the user, never retried here), or `SensorStreamClosed`
    /// when the position stream ends before arrival. Route failures are
    /// non-fatal: the tracker keeps its state and the next fix retries.
    pub async fn run(
        &self,
        destination: Destination,
        view_tx: watch::Sender<NavigationView>,
    ) -> ApplicationResult<()> {
        let session_id = Uuid::new_v4().to_string();
        let mut tracker = NavigationTracker::new(
            session_id.clone(),
            destination,
            self.config.navigation.clone(),
        );

        let mut positions = self.positions.start(self.config.sensors).await?;
        tracker.position_stream_started()?;

        // Heading is best-effort; navigation continues without it.
        let mut headings = match self.headings.start().await {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!("heading stream unavailable: {}", e);
                None
            }
        };
        let mut latest_heading: Option<HeadingSample> = None;

        log_events(&mut tracker);
        publish(&view_tx, &tracker, latest_heading.as_ref());

        loop {
            let heading_recv = async {
                match headings.as_mut() {
                    Some(stream) => stream.recv().await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                maybe_sample = positions.recv() => {
                    let sample = match maybe_sample {
                        Some(sample) => sample,
                        None => return Err(ApplicationError::SensorStreamClosed),
                    };

                    let directive = tracker.handle_position(sample)?;
                    log_events(&mut tracker);

                    match directive {
                        TrackerDirective::RequestRoute(request) => {
                            match self
                                .directions
                                .walking_route(request.origin, request.destination)
                                .await
                            {
                                Ok(route) => {
                                    tracker.complete_route_request(request.request_id, route)
                                }
                                Err(e) => {
                                    warn!("route request {} failed: {}", request.request_id, e);
                                    tracker.fail_route_request(request.request_id, e.to_string());
                                }
                            }
                            log_events(&mut tracker);
                        }
                        TrackerDirective::StopPositionStream => {
                            positions.stop();
                            if let Some(stream) = headings.as_mut() {
                                stream.stop();
                            }
                        }
                        TrackerDirective::None => {}
                    }

                    publish(&view_tx, &tracker, latest_heading.as_ref());

                    if tracker.state().is_arrived() {
                        info!(
                            "session {}: arrived at classroom {}",
                            session_id,
                            tracker.destination().classroom_id
                        );
                        return Ok(());
                    }
                }
                maybe_heading = heading_recv => {
                    match maybe_heading {
                        Some(sample) => {
                            latest_heading = Some(sample);
                            publish(&view_tx, &tracker, latest_heading.as_ref());
                        }
                        // Orientation died mid-session; keep navigating.
                        None => headings = None,
                    }
                }
            }
        }
    }
}

fn log_events(tracker: &mut NavigationTracker) {
    for event in tracker.uncommitted_events() {
        info!("session {}: {}", event.session_id(), event.event_type());
    }
    tracker.mark_events_as_committed();
}

fn publish(
    view_tx: &watch::Sender<NavigationView>,
    tracker: &NavigationTracker,
    heading: Option<&HeadingSample>,
) {
    view_tx.send_replace(project(tracker.state(), tracker.last_fix(), heading));
}

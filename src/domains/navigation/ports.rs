use super::aggregate::{HeadingSample, PositionSample, Route};
use crate::common::geo::Coordinate;
use crate::common::NavigationResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Port for the external walking-directions service. Implementations must
/// return a complete route (steps + overview polyline) or
/// `NavigationError::RouteUnavailable` — never a partial one.
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn walking_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> NavigationResult<Route>;
}

/// Transport leg of the directions service: fetch the raw JSON body of a
/// walking-mode directions response. HTTP client, API keys and retries are
/// implementation detail behind this trait.
#[async_trait]
pub trait DirectionsTransport: Send + Sync {
    async fn fetch_walking_directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> NavigationResult<String>;
}

/// Options forwarded to the platform position watch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StreamOptions {
    pub high_accuracy: bool,
    pub max_sample_age_ms: u64,
    pub timeout_ms: u64,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            max_sample_age_ms: 5000,
            timeout_ms: 10_000,
        }
    }
}

/// Releases the underlying platform watch exactly once, on `release` or on
/// drop, so a stopped session never leaks a watcher.
#[derive(Debug)]
pub struct SubscriptionGuard {
    active_watchers: Arc<AtomicUsize>,
    released: bool,
}

impl SubscriptionGuard {
    /// Register a new watcher against the adapter's shared counter.
    pub fn new(active_watchers: Arc<AtomicUsize>) -> Self {
        active_watchers.fetch_add(1, Ordering::SeqCst);
        Self {
            active_watchers,
            released: false,
        }
    }

    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.active_watchers.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Push stream of position samples. Samples arrive in non-decreasing
/// timestamp order; dropping or stopping the stream releases the
/// subscription synchronously.
pub struct PositionStream {
    receiver: mpsc::Receiver<PositionSample>,
    guard: SubscriptionGuard,
}

impl PositionStream {
    pub fn new(receiver: mpsc::Receiver<PositionSample>, guard: SubscriptionGuard) -> Self {
        Self { receiver, guard }
    }

    /// Next sample, or `None` once the stream has been stopped or the
    /// producer is gone.
    pub async fn recv(&mut self) -> Option<PositionSample> {
        self.receiver.recv().await
    }

    /// Release the platform subscription and stop accepting samples.
    pub fn stop(&mut self) {
        self.guard.release();
        self.receiver.close();
    }
}

/// Push stream of heading samples; same lifecycle as `PositionStream`.
pub struct HeadingStream {
    receiver: mpsc::Receiver<HeadingSample>,
    guard: SubscriptionGuard,
}

impl HeadingStream {
    pub fn new(receiver: mpsc::Receiver<HeadingSample>, guard: SubscriptionGuard) -> Self {
        Self { receiver, guard }
    }

    pub async fn recv(&mut self) -> Option<HeadingSample> {
        self.receiver.recv().await
    }

    pub fn stop(&mut self) {
        self.guard.release();
        self.receiver.close();
    }
}

/// Port for the device geolocation bridge. `start` requests permission at
/// most once per session; denial or missing hardware fails with
/// `NavigationError::SensorUnavailable` and is never retried automatically.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn start(&self, options: StreamOptions) -> NavigationResult<PositionStream>;
}

/// Port for the device orientation bridge (absolute compass heading where
/// the platform has one, device orientation otherwise). Best-effort: a
/// failure here must not block position-based navigation.
#[async_trait]
pub trait HeadingSource: Send + Sync {
    async fn start(&self) -> NavigationResult<HeadingStream>;
}

use crate::common::geo::Coordinate;
use crate::common::{NavigationError, NavigationResult};
use crate::domains::navigation::ports::{
    HeadingSource, HeadingStream, PositionSource, PositionStream, StreamOptions,
    SubscriptionGuard,
};
use crate::domains::navigation::{HeadingSample, PositionSample};
use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::OnceCell;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Rough meters per degree of latitude, for jitter conversion.
const METERS_PER_DEG: f64 = 111_320.0;

/// Simulated device geolocation bridge: walks a straight line from `start`
/// to `end` in `ticks` fixes, with optional per-fix jitter.
///
/// Mirrors the permission lifecycle of a real platform bridge: the
/// permission prompt is resolved at most once per session and a denial is
/// final — later `start` calls fail again without re-prompting.
pub struct SimulatedGeolocation {
    start: Coordinate,
    end: Coordinate,
    ticks: u32,
    interval: Duration,
    jitter_m: f64,
    grant_permission: bool,
    permission: OnceCell<bool>,
    active_watchers: Arc<AtomicUsize>,
}

impl SimulatedGeolocation {
    pub fn new(start: Coordinate, end: Coordinate, ticks: u32, interval: Duration) -> Self {
        Self {
            start,
            end,
            ticks,
            interval,
            jitter_m: 0.0,
            grant_permission: true,
            permission: OnceCell::new(),
            active_watchers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_jitter(mut self, jitter_m: f64) -> Self {
        self.jitter_m = jitter_m;
        self
    }

    /// Simulate the user declining the platform permission prompt.
    pub fn deny_permission(mut self) -> Self {
        self.grant_permission = false;
        self
    }

    /// Number of live platform watches; zero once every stream is stopped.
    pub fn active_watchers(&self) -> usize {
        self.active_watchers.load(Ordering::SeqCst)
    }

    fn request_permission(&self) -> bool {
        *self.permission.get_or_init(|| {
            debug!(
                "geolocation permission prompt resolved: {}",
                if self.grant_permission {
                    "granted"
                } else {
                    "denied"
                }
            );
            self.grant_permission
        })
    }
}

#[async_trait]
impl PositionSource for SimulatedGeolocation {
    async fn start(&self, options: StreamOptions) -> NavigationResult<PositionStream> {
        if !self.request_permission() {
            return Err(NavigationError::SensorUnavailable {
                reason: "geolocation permission denied".to_string(),
            });
        }
        debug!("starting simulated position watch: {:?}", options);

        let (tx, rx) = mpsc::channel(32);
        let guard = SubscriptionGuard::new(Arc::clone(&self.active_watchers));

        let (start, end) = (self.start, self.end);
        let (ticks, interval, jitter_m) = (self.ticks, self.interval, self.jitter_m);
        tokio::spawn(async move {
            for i in 0..=ticks {
                let t = f64::from(i) / f64::from(ticks.max(1));
                let mut latitude = start.latitude + (end.latitude - start.latitude) * t;
                let mut longitude = start.longitude + (end.longitude - start.longitude) * t;
                if jitter_m > 0.0 {
                    let (d_lat, d_lon) = {
                        let mut rng = rand::thread_rng();
                        let deg = jitter_m / METERS_PER_DEG;
                        (rng.gen_range(-deg..=deg), rng.gen_range(-deg..=deg))
                    };
                    latitude += d_lat;
                    longitude += d_lon;
                }
                let sample = PositionSample::with_accuracy(
                    Coordinate {
                        latitude,
                        longitude,
                    },
                    Utc::now(),
                    5.0,
                );
                // Consumer stopped the stream; stop watching.
                if tx.send(sample).await.is_err() {
                    break;
                }
                tokio::time::sleep(interval).await;
            }
        });

        Ok(PositionStream::new(rx, guard))
    }
}

/// Simulated device orientation bridge sweeping the compass linearly from
/// `start_deg` to `end_deg`. Construct with `unsupported()` to model a
/// platform without orientation events.
pub struct SimulatedCompass {
    start_deg: f64,
    end_deg: f64,
    ticks: u32,
    interval: Duration,
    supported: bool,
    active_watchers: Arc<AtomicUsize>,
}

impl SimulatedCompass {
    pub fn new(start_deg: f64, end_deg: f64, ticks: u32, interval: Duration) -> Self {
        Self {
            start_deg,
            end_deg,
            ticks,
            interval,
            supported: true,
            active_watchers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A platform with no compass and no device-orientation events.
    pub fn unsupported() -> Self {
        Self {
            start_deg: 0.0,
            end_deg: 0.0,
            ticks: 0,
            interval: Duration::from_millis(0),
            supported: false,
            active_watchers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn active_watchers(&self) -> usize {
        self.active_watchers.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HeadingSource for SimulatedCompass {
    async fn start(&self) -> NavigationResult<HeadingStream> {
        if !self.supported {
            return Err(NavigationError::SensorUnavailable {
                reason: "device orientation not supported".to_string(),
            });
        }

        let (tx, rx) = mpsc::channel(32);
        let guard = SubscriptionGuard::new(Arc::clone(&self.active_watchers));

        let (start_deg, end_deg) = (self.start_deg, self.end_deg);
        let (ticks, interval) = (self.ticks, self.interval);
        tokio::spawn(async move {
            for i in 0..=ticks {
                let t = f64::from(i) / f64::from(ticks.max(1));
                let sample = HeadingSample::new(start_deg + (end_deg - start_deg) * t);
                if tx.send(sample).await.is_err() {
                    break;
                }
                tokio::time::sleep(interval).await;
            }
        });

        Ok(HeadingStream::new(rx, guard))
    }
}

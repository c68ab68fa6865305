use crate::common::{NavigationError, NavigationResult};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, shared by all great-circle math.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> NavigationResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(NavigationError::InvalidCoordinate {
                reason: format!("latitude {} outside [-90, 90]", latitude),
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(NavigationError::InvalidCoordinate {
                reason: format!("longitude {} outside [-180, 180]", longitude),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Great-circle distance in meters between two coordinates (haversine).
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Forward azimuth from `a` to `b` in degrees, [0, 360) with 0 = north.
pub fn bearing_degrees(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// True when `point` lies within `tolerance_m` of any segment of `polyline`.
///
/// Distance is measured point-to-segment, not point-to-vertex, so long
/// straight legs do not need densified vertices. An empty or single-point
/// polyline contains nothing.
pub fn is_on_path(point: Coordinate, polyline: &[Coordinate], tolerance_m: f64) -> bool {
    if polyline.len() < 2 {
        return false;
    }
    polyline
        .windows(2)
        .any(|seg| point_segment_distance_m(point, seg[0], seg[1]) <= tolerance_m)
}

/// Point-to-segment distance in meters, computed on an equirectangular
/// projection centered on the point. Accurate for the sub-kilometer segment
/// spans a walking route is made of.
fn point_segment_distance_m(p: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let meters_per_deg_lat = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
    let meters_per_deg_lon = meters_per_deg_lat * p.latitude.to_radians().cos();

    let ax = (a.longitude - p.longitude) * meters_per_deg_lon;
    let ay = (a.latitude - p.latitude) * meters_per_deg_lat;
    let bx = (b.longitude - p.longitude) * meters_per_deg_lon;
    let by = (b.latitude - p.latitude) * meters_per_deg_lat;

    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return (ax * ax + ay * ay).sqrt();
    }

    // Project the point (the local origin) onto the segment, clamped to it.
    let t = (-(ax * dx + ay * dy) / len_sq).clamp(0.0, 1.0);
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    (cx * cx + cy * cy).sqrt()
}

use super::aggregate::{HeadingSample, ManeuverKind, NavigationState, PositionSample, Route};
use crate::common::geo::{bearing_degrees, Coordinate};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// Map camera fallback before the first fix: the app's default center over
/// downtown Los Angeles.
pub const DEFAULT_CAMERA_CENTER: Coordinate = Coordinate {
    latitude: 34.0522,
    longitude: -118.2437,
};
pub const CAMERA_ZOOM: f64 = 18.0;
pub const CAMERA_TILT_DEG: f64 = 45.0;

#[derive(Debug, Clone, Serialize)]
pub struct TurnMarker {
    pub position: Coordinate,
    /// Bearing from the step's start to its end, degrees clockwise from north.
    pub rotation_deg: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub instruction: String,
    pub distance_text: String,
    pub duration_text: String,
    pub maneuver: ManeuverKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserMarker {
    pub position: Coordinate,
    pub heading_deg: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraPose {
    pub center: Coordinate,
    pub zoom: f64,
    pub tilt_deg: f64,
}

/// Everything the map and directions list need to render one frame.
#[derive(Debug, Clone, Serialize)]
pub struct NavigationView {
    pub polyline: Vec<Coordinate>,
    pub turn_markers: Vec<TurnMarker>,
    pub steps: Vec<StepView>,
    pub user_marker: Option<UserMarker>,
    pub camera: CameraPose,
    pub arrived: bool,
}

/// Derive the renderable view model from the current navigation state, the
/// latest fix and the latest heading sample. Pure and stateless: safe to
/// call on every render tick.
pub fn project(
    state: &NavigationState,
    last_fix: Option<&PositionSample>,
    heading: Option<&HeadingSample>,
) -> NavigationView {
    let (polyline, turn_markers, steps) = match state {
        NavigationState::Routed(route) => (
            route.polyline.clone(),
            turn_markers(route),
            step_views(route),
        ),
        _ => (Vec::new(), Vec::new(), Vec::new()),
    };

    let user_marker = last_fix.map(|fix| UserMarker {
        position: fix.coordinate,
        // Heading starts at north until the first compass sample lands.
        heading_deg: heading.map(|h| h.degrees).unwrap_or(0.0),
    });

    let camera = CameraPose {
        center: last_fix
            .map(|fix| fix.coordinate)
            .unwrap_or(DEFAULT_CAMERA_CENTER),
        zoom: CAMERA_ZOOM,
        tilt_deg: CAMERA_TILT_DEG,
    };

    NavigationView {
        polyline,
        turn_markers,
        steps,
        user_marker,
        camera,
        arrived: state.is_arrived(),
    }
}

/// One marker per `Turn` step, at the step's start, oriented along the
/// bearing from the step's start to its end. Recomputed in full for every
/// route, never patched incrementally.
fn turn_markers(route: &Route) -> Vec<TurnMarker> {
    route
        .steps
        .iter()
        .filter(|s| s.maneuver == ManeuverKind::Turn)
        .map(|s| TurnMarker {
            position: s.start,
            rotation_deg: bearing_degrees(s.start, s.end),
        })
        .collect()
}

fn step_views(route: &Route) -> Vec<StepView> {
    route
        .steps
        .iter()
        .map(|s| StepView {
            instruction: strip_html(&s.instruction),
            distance_text: format_distance(s.distance_m),
            duration_text: s.duration_text.clone(),
            maneuver: s.maneuver,
        })
        .collect()
}

/// Directions providers embed markup in instruction text
/// ("Turn <b>left</b> onto ..."); the step list wants plain text.
pub fn strip_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as i64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Export the view as a GeoJSON FeatureCollection (route LineString plus
/// point features for turn markers and the user marker) for rendering
/// surfaces that consume GeoJSON.
pub fn view_to_geojson(view: &NavigationView) -> GeoJson {
    let mut features = Vec::new();

    if view.polyline.len() >= 2 {
        features.push(feature(
            Geometry::new(Value::LineString(
                view.polyline
                    .iter()
                    .map(|c| vec![c.longitude, c.latitude])
                    .collect(),
            )),
            properties("route", None),
        ));
    }

    for marker in &view.turn_markers {
        features.push(feature(
            Geometry::new(Value::Point(vec![
                marker.position.longitude,
                marker.position.latitude,
            ])),
            properties("turn", Some(marker.rotation_deg)),
        ));
    }

    if let Some(user) = &view.user_marker {
        features.push(feature(
            Geometry::new(Value::Point(vec![
                user.position.longitude,
                user.position.latitude,
            ])),
            properties("user", Some(user.heading_deg)),
        ));
    }

    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

fn feature(geometry: Geometry, properties: Map<String, JsonValue>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn properties(kind: &str, rotation_deg: Option<f64>) -> Map<String, JsonValue> {
    let mut props = Map::new();
    props.insert("kind".to_string(), JsonValue::from(kind));
    if let Some(rotation) = rotation_deg {
        props.insert("rotation_deg".to_string(), JsonValue::from(rotation));
    }
    props
}

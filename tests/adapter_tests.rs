use async_trait::async_trait;
use findmyclass_nav::adapters::inbound::{SimulatedCompass, SimulatedGeolocation};
use findmyclass_nav::adapters::outbound::{
    parse_walking_route, DirectionsApiClient, SimulatedDirections,
};
use findmyclass_nav::common::geo::Coordinate;
use findmyclass_nav::common::{NavigationError, NavigationResult};
use findmyclass_nav::domains::navigation::ports::{
    DirectionsProvider, DirectionsTransport, HeadingSource, PositionSource, StreamOptions,
};
use findmyclass_nav::domains::navigation::{HeadingSample, ManeuverKind};
use std::sync::Arc;
use std::time::Duration;

fn coord(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).unwrap()
}

const OK_PAYLOAD: &str = r#"{
    "status": "OK",
    "routes": [{
        "legs": [{
            "steps": [
                {
                    "instructions": "Head <b>north</b> on Matador Walk",
                    "start_location": { "lat": 34.2400, "lng": -118.5281 },
                    "end_location": { "lat": 34.2410, "lng": -118.5281 },
                    "distance": { "text": "0.1 km", "value": 111.0 },
                    "duration": { "text": "2 mins", "value": 95.0 }
                },
                {
                    "instructions": "Turn <b>right</b> toward Jacaranda Hall",
                    "start_location": { "lat": 34.2410, "lng": -118.5281 },
                    "end_location": { "lat": 34.2410, "lng": -118.5270 },
                    "distance": { "text": "0.1 km", "value": 101.0 },
                    "duration": { "text": "2 mins", "value": 87.0 },
                    "maneuver": "turn-right"
                }
            ]
        }],
        "overview_path": [
            { "lat": 34.2400, "lng": -118.5281 },
            { "lat": 34.2410, "lng": -118.5281 },
            { "lat": 34.2410, "lng": -118.5270 }
        ]
    }]
}"#;

#[cfg(test)]
mod payload_parsing_tests {
    use super::*;

    #[test]
    fn test_ok_payload_parses_into_complete_route() {
        let route = parse_walking_route(OK_PAYLOAD).unwrap();

        assert_eq!(route.steps.len(), 2);
        assert_eq!(route.polyline.len(), 3);
        assert_eq!(route.steps[0].maneuver, ManeuverKind::Straight);
        assert_eq!(route.steps[1].maneuver, ManeuverKind::Turn);
        assert!((route.steps[0].distance_m - 111.0).abs() < 1e-9);
        assert_eq!(route.steps[1].duration_text, "2 mins");
        assert_eq!(route.polyline[0], coord(34.2400, -118.5281));
        assert!((route.total_distance_m() - 212.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_ok_status_is_route_unavailable() {
        let body = r#"{ "status": "ZERO_RESULTS", "routes": [] }"#;
        match parse_walking_route(body) {
            Err(NavigationError::RouteUnavailable { reason }) => {
                assert!(reason.contains("ZERO_RESULTS"));
            }
            other => panic!("expected RouteUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_routes_and_legs_are_route_unavailable() {
        let no_routes = r#"{ "status": "OK", "routes": [] }"#;
        assert!(matches!(
            parse_walking_route(no_routes),
            Err(NavigationError::RouteUnavailable { .. })
        ));

        let no_legs = r#"{ "status": "OK", "routes": [{ "legs": [], "overview_path": [] }] }"#;
        assert!(matches!(
            parse_walking_route(no_legs),
            Err(NavigationError::RouteUnavailable { .. })
        ));

        let no_steps = r#"{
            "status": "OK",
            "routes": [{
                "legs": [{ "steps": [] }],
                "overview_path": [
                    { "lat": 34.0, "lng": -118.0 },
                    { "lat": 34.1, "lng": -118.1 }
                ]
            }]
        }"#;
        assert!(matches!(
            parse_walking_route(no_steps),
            Err(NavigationError::RouteUnavailable { .. })
        ));
    }

    #[test]
    fn test_degenerate_overview_path_is_route_unavailable() {
        let body = r#"{
            "status": "OK",
            "routes": [{
                "legs": [{
                    "steps": [{
                        "instructions": "Head north",
                        "start_location": { "lat": 34.0, "lng": -118.0 },
                        "end_location": { "lat": 34.1, "lng": -118.0 },
                        "distance": { "text": "1 km", "value": 1000.0 },
                        "duration": { "text": "12 mins", "value": 700.0 }
                    }]
                }],
                "overview_path": [{ "lat": 34.0, "lng": -118.0 }]
            }]
        }"#;
        assert!(matches!(
            parse_walking_route(body),
            Err(NavigationError::RouteUnavailable { .. })
        ));
    }

    #[test]
    fn test_malformed_body_is_route_unavailable() {
        assert!(matches!(
            parse_walking_route("not json at all"),
            Err(NavigationError::RouteUnavailable { .. })
        ));
    }

    #[test]
    fn test_maneuver_classification() {
        assert_eq!(ManeuverKind::from_provider(None), ManeuverKind::Straight);
        assert_eq!(
            ManeuverKind::from_provider(Some("turn-left")),
            ManeuverKind::Turn
        );
        assert_eq!(
            ManeuverKind::from_provider(Some("turn-sharp-right")),
            ManeuverKind::Turn
        );
        assert_eq!(
            ManeuverKind::from_provider(Some("straight")),
            ManeuverKind::Straight
        );
        assert_eq!(
            ManeuverKind::from_provider(Some("arrive")),
            ManeuverKind::Arrive
        );
        assert_eq!(
            ManeuverKind::from_provider(Some("merge")),
            ManeuverKind::Other
        );
    }
}

#[cfg(test)]
mod directions_client_tests {
    use super::*;

    struct StubTransport {
        body: String,
    }

    #[async_trait]
    impl DirectionsTransport for StubTransport {
        async fn fetch_walking_directions(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
        ) -> NavigationResult<String> {
            Ok(self.body.clone())
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl DirectionsTransport for FailingTransport {
        async fn fetch_walking_directions(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
        ) -> NavigationResult<String> {
            Err(NavigationError::RouteUnavailable {
                reason: "connection refused".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_client_parses_transport_body() {
        let client = DirectionsApiClient::new(Arc::new(StubTransport {
            body: OK_PAYLOAD.to_string(),
        }));
        let route = client
            .walking_route(coord(34.2400, -118.5281), coord(34.2410, -118.5270))
            .await
            .unwrap();
        assert_eq!(route.steps.len(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_as_route_unavailable() {
        let client = DirectionsApiClient::new(Arc::new(FailingTransport));
        let result = client
            .walking_route(coord(34.2400, -118.5281), coord(34.2410, -118.5270))
            .await;
        assert!(matches!(
            result,
            Err(NavigationError::RouteUnavailable { .. })
        ));
    }
}

#[cfg(test)]
mod simulated_directions_tests {
    use super::*;

    #[test]
    fn test_l_shaped_route_with_one_turn() {
        let provider = SimulatedDirections::new();
        let route = tokio_test::block_on(
            provider.walking_route(coord(34.2400, -118.5281), coord(34.2410, -118.5270)),
        )
        .unwrap();

        assert_eq!(route.steps.len(), 2);
        assert_eq!(route.polyline.len(), 3);
        assert_eq!(route.steps[0].maneuver, ManeuverKind::Straight);
        assert_eq!(route.steps[1].maneuver, ManeuverKind::Turn);
        assert!(route.steps[1].instruction.contains("right"));
        assert_eq!(provider.requests_served(), 1);
    }

    #[test]
    fn test_flaky_provider_fails_then_recovers() {
        let provider = SimulatedDirections::failing_first(1);
        let origin = coord(34.2400, -118.5281);
        let classroom = coord(34.2410, -118.5270);

        let first = tokio_test::block_on(provider.walking_route(origin, classroom));
        assert!(matches!(
            first,
            Err(NavigationError::RouteUnavailable { .. })
        ));

        let second = tokio_test::block_on(provider.walking_route(origin, classroom));
        assert!(second.is_ok());
        assert_eq!(provider.requests_served(), 1);
    }
}

#[cfg(test)]
mod sensor_bridge_tests {
    use super::*;

    #[tokio::test]
    async fn test_position_stream_delivers_ordered_samples() {
        let source = SimulatedGeolocation::new(
            coord(34.2400, -118.5281),
            coord(34.2410, -118.5270),
            5,
            Duration::from_millis(1),
        );
        let mut stream = source.start(StreamOptions::default()).await.unwrap();

        let mut samples = Vec::new();
        while let Some(sample) = stream.recv().await {
            samples.push(sample);
        }

        assert_eq!(samples.len(), 6);
        assert!(samples
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp));
        let last = samples.last().unwrap().coordinate;
        assert!((last.latitude - 34.2410).abs() < 1e-9);
        assert!((last.longitude + 118.5270).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_stop_releases_the_watch() {
        let source = SimulatedGeolocation::new(
            coord(34.2400, -118.5281),
            coord(34.2410, -118.5270),
            1000,
            Duration::from_millis(10),
        );
        let mut stream = source.start(StreamOptions::default()).await.unwrap();
        assert_eq!(source.active_watchers(), 1);

        stream.stop();
        assert_eq!(source.active_watchers(), 0);
    }

    #[tokio::test]
    async fn test_dropping_the_stream_releases_the_watch() {
        let source = SimulatedGeolocation::new(
            coord(34.2400, -118.5281),
            coord(34.2410, -118.5270),
            1000,
            Duration::from_millis(10),
        );
        let stream = source.start(StreamOptions::default()).await.unwrap();
        assert_eq!(source.active_watchers(), 1);

        drop(stream);
        assert_eq!(source.active_watchers(), 0);
    }

    #[tokio::test]
    async fn test_denied_permission_is_fatal_and_cached() {
        let source = SimulatedGeolocation::new(
            coord(34.2400, -118.5281),
            coord(34.2410, -118.5270),
            5,
            Duration::from_millis(1),
        )
        .deny_permission();

        for _ in 0..2 {
            match source.start(StreamOptions::default()).await {
                Err(NavigationError::SensorUnavailable { reason }) => {
                    assert!(reason.contains("permission denied"));
                }
                other => panic!("expected SensorUnavailable, got {:?}", other.map(|_| ())),
            }
        }
        assert_eq!(source.active_watchers(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_compass_reports_sensor_unavailable() {
        let compass = SimulatedCompass::unsupported();
        let result = compass.start().await.map(|_| ());
        assert!(matches!(
            result,
            Err(NavigationError::SensorUnavailable { .. })
        ));
    }

    #[test]
    fn test_heading_samples_normalize_into_compass_range() {
        assert_eq!(HeadingSample::new(-90.0).degrees, 270.0);
        assert_eq!(HeadingSample::new(450.0).degrees, 90.0);
        assert_eq!(HeadingSample::new(0.0).degrees, 0.0);
    }
}

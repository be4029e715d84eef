use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::auth::{AuthError, CredentialStore, InMemoryCredentials};
use crate::graph::{GraphError, KnownVehicle, VehicleClass};
use crate::manager::RouteManager;
use crate::route::{Metric, RouteError};
use crate::server::{
    router, AddRoute, ApiError, AppState, Login, RouteQuery, PASSWORD_HEADER, USER_HEADER,
};

fn app() -> (Arc<AppState>, Router) {
    let credentials = InMemoryCredentials::default();
    credentials.register("dispatch", "dispatch@example.com", "hunter2");

    let state = Arc::new(AppState::new(
        RouteManager::in_memory(),
        Arc::new(credentials),
    ));
    let app = router(state.clone(), &["http://localhost:3000".to_string()]);

    (state, app)
}

fn add_route_request(password: &str) -> Request<Body> {
    let body = json!({
        "source": "Porter",
        "destination": "Davis",
        "distance": 2.0,
        "vehicleType": "Car",
        "cost": 4.0,
        "leastTrafficTime": 7.0,
        "bidirectional": true
    });

    Request::builder()
        .method(Method::POST)
        .uri("/routes")
        .header(header::CONTENT_TYPE, "application/json")
        .header(USER_HEADER, "dispatch")
        .header(PASSWORD_HEADER, password)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn route_query_reads_waypoint_sequences() {
    let query: RouteQuery = serde_qs::Config::default()
        .deserialize_str(
            "start=Porter&destination=Salem&vehicle=Bus&waypoints[0]=Davis&waypoints[1]=Lynn&metric=traffic",
        )
        .unwrap();

    assert_eq!(query.start, "Porter");
    assert_eq!(query.vehicle, VehicleClass::from(KnownVehicle::Bus));
    assert_eq!(query.waypoints, vec!["Davis", "Lynn"]);
    assert_eq!(query.metric, Metric::Traffic);
}

#[test]
fn route_query_defaults_to_distance_without_waypoints() {
    let query: RouteQuery = serde_qs::Config::default()
        .deserialize_str("start=Porter&destination=Salem&vehicle=Car")
        .unwrap();

    assert!(query.waypoints.is_empty());
    assert_eq!(query.metric, Metric::Distance);
}

#[test]
fn add_route_body_uses_record_field_names() {
    let body: AddRoute = serde_json::from_str(
        r#"{
            "source": "Porter",
            "destination": "Davis",
            "distance": 2.0,
            "vehicleType": "Heavy Vehicles",
            "cost": 4.0,
            "leastTrafficTime": 7.0,
            "bidirectional": true
        }"#,
    )
    .unwrap();

    assert!(body.bidirectional);
    assert_eq!(body.edge.origin(), "Porter");
    assert_eq!(body.edge.vehicle().as_str(), "Heavy Vehicles");
    assert_eq!(body.edge.traffic(), 7.0);
}

#[test]
fn login_requires_both_headers() {
    let mut headers = HeaderMap::new();
    headers.insert(USER_HEADER, HeaderValue::from_static("dispatch"));
    assert!(matches!(
        Login::try_from(&headers),
        Err(ApiError::Unauthorized(_))
    ));

    headers.insert(PASSWORD_HEADER, HeaderValue::from_static("hunter2"));
    let login = Login::try_from(&headers).unwrap();
    assert_eq!(login.username, "dispatch");
    assert_eq!(login.password, "hunter2");
}

#[test]
fn errors_map_to_statuses() {
    let cases = [
        (
            ApiError::from(crate::Error::Graph(GraphError::MissingField("origin"))),
            StatusCode::BAD_REQUEST,
        ),
        (
            ApiError::from(crate::Error::Route(RouteError::UnknownDestination(
                "Salem".to_string(),
            ))),
            StatusCode::NOT_FOUND,
        ),
        (
            ApiError::from(AuthError::Denied("dispatch".to_string())),
            StatusCode::UNAUTHORIZED,
        ),
    ];

    for (error, status) in cases {
        assert_eq!(error.status(), status);
    }
}

#[tokio::test]
async fn authenticated_routes_are_added_and_searchable() {
    let (state, app) = app();

    let response = app.clone().oneshot(add_route_request("hunter2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(state.manager.snapshot().edge_count(), 2);

    let response = app
        .clone()
        .oneshot(get("/route?start=Davis&destination=Porter&vehicle=Car&metric=cost"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["path"], json!(["Davis", "Porter"]));
    assert_eq!(body["metric"], "cost");
    assert_eq!(body["weight"], 4.0);
    assert_eq!(body["totals"]["distance"], 2.0);
    assert_eq!(body["totals"]["traffic"], 7.0);

    let response = app.oneshot(get("/locations")).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["origins"], json!(["Davis", "Porter"]));
    assert_eq!(body["vehicles"], json!(["Car"]));
    assert_eq!(body["version"], 1);
}

#[tokio::test]
async fn wrong_credentials_leave_graph_untouched() {
    let (state, app) = app();

    let response = app.oneshot(add_route_request("hunter3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(state.manager.snapshot().is_empty());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (_, app) = app();

    let response = app
        .oneshot(get("/route?start=Porter&destination=Davis&vehicle=Car"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(json_body(response).await["error"].is_string());
}

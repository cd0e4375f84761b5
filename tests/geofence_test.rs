mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{expect_json, TestApp};

#[tokio::test]
async fn reference_point_is_inside_the_geofence() {
    let app = TestApp::new().await;

    let body = expect_json(
        app.request(
            Method::POST,
            "/check-location",
            Some(json!({
                "latitude": app.state.config.restaurant_latitude,
                "longitude": app.state.config.restaurant_longitude
            })),
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(body["data"]["allowed"], json!(true));
    assert!(body["data"]["distance_km"].as_f64().unwrap() < 1e-6);
}

#[tokio::test]
async fn distant_point_is_outside_the_geofence() {
    let app = TestApp::new().await;

    // A point hundreds of kilometres away from the reference.
    let body = expect_json(
        app.request(
            Method::POST,
            "/check-location",
            Some(json!({ "latitude": 52.2297, "longitude": 21.0122 })),
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(body["data"]["allowed"], json!(false));
    assert!(body["data"]["distance_km"].as_f64().unwrap() > 100.0);
}

#[tokio::test]
async fn point_just_beyond_the_radius_is_rejected() {
    let app = TestApp::new().await;

    // ~300 m north of the reference point; the radius is 100 m.
    let body = expect_json(
        app.request(
            Method::POST,
            "/check-location",
            Some(json!({
                "latitude": app.state.config.restaurant_latitude + 0.0027,
                "longitude": app.state.config.restaurant_longitude
            })),
            None,
        )
        .await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(body["data"]["allowed"], json!(false));
}

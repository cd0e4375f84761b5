mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use common::{expect_json, TestApp};

#[tokio::test]
async fn table_count_reconciliation_grows_and_shrinks() {
    let app = TestApp::new().await;
    let token = app.admin_token().to_string();

    let body = expect_json(
        app.request(
            Method::PUT,
            "/admin/tables",
            Some(json!({ "table_count": 4 })),
            Some(&token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let tables = body["data"].as_array().unwrap();
    assert_eq!(tables.len(), 4);
    assert_eq!(tables[0]["qr_token"], json!("table_1"));
    assert_eq!(tables[3]["qr_token"], json!("table_4"));

    // Shrinking removes the surplus tables from the top.
    let body = expect_json(
        app.request(
            Method::PUT,
            "/admin/tables",
            Some(json!({ "table_count": 2 })),
            Some(&token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let tables = body["data"].as_array().unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables.last().unwrap()["id"], json!(2));

    // Negative counts are rejected.
    let response = app
        .request(
            Method::PUT,
            "/admin/tables",
            Some(json!({ "table_count": -1 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upcoming_events_expose_headline_and_next() {
    let app = TestApp::new().await;
    let today = Utc::now()
        .with_timezone(&app.state.config.tz())
        .date_naive();

    let promos = app.state.services.promotions.clone();

    // One finished event, two running ones.
    for (title, start_offset, end_offset) in [
        ("Jazz evening", -20i64, -10i64),
        ("Wine tasting", -1, 5),
        ("Brunch weekend", 3, 8),
    ] {
        promos
            .create_event(tableside_api::services::promotions::CreateEventRequest {
                title: title.to_string(),
                description: format!("{title} description"),
                start_date: today + Duration::days(start_offset),
                end_date: today + Duration::days(end_offset),
                image_filename: None,
                display_title: true,
                display_description: true,
            })
            .await
            .unwrap();
    }

    let body = expect_json(
        app.request(Method::GET, "/events/upcoming", None, None).await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(body["data"]["upcoming_event"]["title"], json!("Wine tasting"));
    assert_eq!(body["data"]["next_event"]["title"], json!("Brunch weekend"));

    // End date before start date is rejected.
    let err = promos
        .create_event(tableside_api::services::promotions::CreateEventRequest {
            title: "Backwards".to_string(),
            description: String::new(),
            start_date: today,
            end_date: today - Duration::days(1),
            image_filename: None,
            display_title: true,
            display_description: true,
        })
        .await;
    assert!(err.is_err());
}

#[tokio::test]
async fn popup_lifecycle_replace_and_toggle() {
    let app = TestApp::new().await;
    let token = app.admin_token().to_string();

    // No popup yet.
    let body = expect_json(
        app.request(Method::GET, "/popup", None, None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["image_url"], json!(null));
    assert_eq!(body["data"]["is_active"], json!(false));

    // Toggling without a popup is a 404.
    let response = app
        .request(Method::POST, "/admin/popup/toggle", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Install one (service-side; the HTTP path is multipart).
    app.state
        .services
        .popups
        .set_popup("promo.png".to_string())
        .await
        .unwrap();

    let body = expect_json(
        app.request(Method::GET, "/popup", None, None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["image_url"], json!("/images/promo.png"));
    assert_eq!(body["data"]["is_active"], json!(true));

    // Replacing keeps a single row.
    let (popup, replaced) = app
        .state
        .services
        .popups
        .set_popup("newer.png".to_string())
        .await
        .unwrap();
    assert_eq!(popup.image_filename, "newer.png");
    assert_eq!(replaced.as_deref(), Some("promo.png"));

    // Toggle off through the admin endpoint.
    let body = expect_json(
        app.request(Method::POST, "/admin/popup/toggle", None, Some(&token))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["is_active"], json!(false));
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/healthz", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = expect_json(
        app.request(Method::GET, "/health", None, None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["checks"]["database"], json!("healthy"));

    let body = expect_json(
        app.request(Method::GET, "/status", None, None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["service"], json!("tableside-api"));
}

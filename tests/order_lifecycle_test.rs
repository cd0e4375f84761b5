mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::{json, Value};
use uuid::Uuid;

use common::{body_json, decimal_field, expect_json, TestApp};
use tableside_api::entities::order;

async fn place_order(app: &TestApp, items: Value) -> Value {
    let response = app
        .request(
            Method::POST,
            "/orders",
            Some(json!({ "table_id": 1, "items": items })),
            None,
        )
        .await;
    expect_json(response, StatusCode::CREATED).await
}

#[tokio::test]
async fn order_total_is_sum_of_lines() {
    let app = TestApp::new().await;
    app.seed_tables(2).await;
    let soup = app.seed_menu_item("Tomato soup", "Soups", dec!(18.50)).await;
    let cake = app.seed_menu_item("Cheesecake", "Desserts", dec!(12.00)).await;

    let body = place_order(
        &app,
        json!([
            { "menu_item_id": soup.id, "quantity": 2 },
            { "menu_item_id": cake.id, "quantity": 1, "takeaway": true }
        ]),
    )
    .await;

    assert!(body["success"].as_bool().unwrap());
    // 2 x 18.50 + 1 x 12.00
    assert_eq!(decimal_field(&body["data"]["total_price"]), dec!(49.00));
    assert_eq!(body["data"]["order_number"], json!(1));
}

#[tokio::test]
async fn daily_order_numbers_are_contiguous_from_one() {
    let app = TestApp::new().await;
    app.seed_tables(1).await;
    let soup = app.seed_menu_item("Tomato soup", "Soups", dec!(18.50)).await;

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let body = place_order(&app, json!([{ "menu_item_id": soup.id, "quantity": 1 }])).await;
        numbers.push(body["data"]["order_number"].as_i64().unwrap());
    }

    assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn unavailable_items_are_skipped() {
    let app = TestApp::new().await;
    app.seed_tables(1).await;
    let soup = app.seed_menu_item("Tomato soup", "Soups", dec!(18.50)).await;

    // Disable the second item before ordering it.
    let salad = app.seed_menu_item("Greek salad", "Salads", dec!(21.00)).await;
    app.state
        .services
        .catalog
        .update_item(
            salad.id,
            tableside_api::services::catalog::UpdateMenuItemRequest {
                name: salad.name.clone(),
                description: salad.description.clone(),
                price: salad.price,
                category: salad.category.clone(),
                customizable: false,
                available: false,
                display_date: None,
                image_filename: None,
            },
        )
        .await
        .unwrap();

    let body = place_order(
        &app,
        json!([
            { "menu_item_id": soup.id, "quantity": 1 },
            { "menu_item_id": salad.id, "quantity": 1 }
        ]),
    )
    .await;

    assert_eq!(decimal_field(&body["data"]["total_price"]), dec!(18.50));

    // An order made only of unavailable items is rejected outright.
    let response = app
        .request(
            Method::POST,
            "/orders",
            Some(json!({ "items": [{ "menu_item_id": salad.id, "quantity": 1 }] })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lifecycle_follows_the_fixed_sequence() {
    let app = TestApp::new().await;
    app.seed_tables(1).await;
    let soup = app.seed_menu_item("Tomato soup", "Soups", dec!(18.50)).await;
    let body = place_order(&app, json!([{ "menu_item_id": soup.id, "quantity": 1 }])).await;
    let order_id = body["data"]["order_id"].as_str().unwrap().to_string();
    let token = app.employee_token().to_string();

    // Kitchen cannot take a pending order.
    let response = app
        .request(
            Method::POST,
            &format!("/staff/orders/{order_id}/start-preparation"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Accept needs a positive realization time.
    let response = app
        .request(
            Method::POST,
            &format!("/staff/orders/{order_id}/accept"),
            Some(json!({ "realization_time": 0 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Accept stamps the completion estimate.
    let body = expect_json(
        app.request(
            Method::POST,
            &format!("/staff/orders/{order_id}/accept"),
            Some(json!({ "realization_time": 25 })),
            Some(&token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["status"], json!("Accepted"));
    assert!(!body["data"]["estimated_completion_time"].is_null());

    // Accepting twice is rejected.
    let response = app
        .request(
            Method::POST,
            &format!("/staff/orders/{order_id}/accept"),
            Some(json!({ "realization_time": 10 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Accepted -> In Preparation -> Ready -> Completed.
    for step in ["start-preparation", "ready", "complete"] {
        let response = app
            .request(
                Method::POST,
                &format!("/staff/orders/{order_id}/{step}"),
                None,
                Some(&token),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "step {step} failed");
    }

    // Completed is terminal.
    let response = app
        .request(
            Method::POST,
            &format!("/staff/orders/{order_id}/complete"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // And it shows up in the history.
    let body = expect_json(
        app.request(Method::GET, "/staff/orders/history", None, Some(&token))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["total"], json!(1));
    assert_eq!(body["data"]["orders"][0]["status"], json!("Completed"));
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let app = TestApp::new().await;
    let token = app.employee_token().to_string();

    let missing = Uuid::new_v4();
    let response = app
        .request(
            Method::POST,
            &format!("/staff/orders/{missing}/accept"),
            Some(json!({ "realization_time": 15 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request(Method::GET, &format!("/orders/{missing}/status"), None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn waiter_call_is_rate_limited() {
    let app = TestApp::new().await;
    app.seed_tables(1).await;
    let soup = app.seed_menu_item("Tomato soup", "Soups", dec!(18.50)).await;
    let body = place_order(&app, json!([{ "menu_item_id": soup.id, "quantity": 1 }])).await;
    let order_id = body["data"]["order_id"].as_str().unwrap().to_string();
    let order_uuid: Uuid = order_id.parse().unwrap();

    assert_eq!(call_waiter(&app, &order_id).await, StatusCode::OK);

    // Second call inside the window is rejected.
    assert_eq!(
        call_waiter(&app, &order_id).await,
        StatusCode::TOO_MANY_REQUESTS
    );

    // Backdate the last call beyond the cooldown; the next call passes.
    let stored = order::Entity::find_by_id(order_uuid)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: order::ActiveModel = stored.into();
    active.last_call_time = Set(Some(Utc::now() - Duration::minutes(4)));
    active.update(&*app.state.db).await.unwrap();

    assert_eq!(call_waiter(&app, &order_id).await, StatusCode::OK);
}

async fn call_waiter(app: &TestApp, order_id: &str) -> StatusCode {
    app.request(
        Method::POST,
        &format!("/orders/{order_id}/call-waiter"),
        None,
        None,
    )
    .await
    .status()
}

#[tokio::test]
async fn bill_request_and_dismissals_are_independent() {
    let app = TestApp::new().await;
    app.seed_tables(1).await;
    let soup = app.seed_menu_item("Tomato soup", "Soups", dec!(18.50)).await;
    let body = place_order(&app, json!([{ "menu_item_id": soup.id, "quantity": 1 }])).await;
    let order_id = body["data"]["order_id"].as_str().unwrap().to_string();
    let token = app.employee_token().to_string();

    // Customer asks for the bill with a tip and an invoice.
    let response = app
        .request(
            Method::POST,
            &format!("/orders/{order_id}/request-bill"),
            Some(json!({
                "payment_method": "card",
                "invoice_required": true,
                "tax_id": "5213017228",
                "tip": "5.00"
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The waiter-call flag was never raised, so only one call entry.
    let body = expect_json(
        app.request(Method::GET, "/staff/calls", None, Some(&token))
            .await,
        StatusCode::OK,
    )
    .await;
    let calls = body["data"].as_array().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["call_type"], json!("bill_request"));
    assert_eq!(calls[0]["payment_method"], json!("card"));
    assert_eq!(calls[0]["tax_id"], json!("5213017228"));

    // Dismissing the bill clears the entry.
    let response = app
        .request(
            Method::POST,
            &format!("/staff/orders/{order_id}/dismiss-bill"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = expect_json(
        app.request(Method::GET, "/staff/calls", None, Some(&token))
            .await,
        StatusCode::OK,
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn dashboards_report_orders_by_status() {
    let app = TestApp::new().await;
    app.seed_tables(1).await;
    let soup = app.seed_menu_item("Tomato soup", "Soups", dec!(18.50)).await;
    let token = app.employee_token().to_string();

    let body = place_order(&app, json!([{ "menu_item_id": soup.id, "quantity": 2 }])).await;
    let order_id = body["data"]["order_id"].as_str().unwrap().to_string();

    // Pending orders appear on the waiter dashboard but not in the kitchen.
    let body = expect_json(
        app.request(Method::GET, "/staff/orders/active", None, Some(&token))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["items"][0]["name"], json!("Tomato soup"));
    assert_eq!(body["data"][0]["items"][0]["quantity"], json!(2));

    let body = expect_json(
        app.request(Method::GET, "/staff/orders/accepted", None, Some(&token))
            .await,
        StatusCode::OK,
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // After acceptance the kitchen sees it too.
    app.request(
        Method::POST,
        &format!("/staff/orders/{order_id}/accept"),
        Some(json!({ "realization_time": 15 })),
        Some(&token),
    )
    .await;

    let body = expect_json(
        app.request(Method::GET, "/staff/orders/accepted", None, Some(&token))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn customer_can_poll_order_status() {
    let app = TestApp::new().await;
    app.seed_tables(1).await;
    let soup = app.seed_menu_item("Tomato soup", "Soups", dec!(18.50)).await;
    let body = place_order(&app, json!([{ "menu_item_id": soup.id, "quantity": 1 }])).await;
    let order_id = body["data"]["order_id"].as_str().unwrap().to_string();

    let body = expect_json(
        app.request(Method::GET, &format!("/orders/{order_id}/status"), None, None)
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"]["status"], json!("Pending"));
    assert!(body["data"]["estimated_completion_time"].is_null());

    let body = body_json(
        app.request(Method::GET, &format!("/orders/{order_id}"), None, None)
            .await,
    )
    .await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
}

mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use common::{expect_json, TestApp};
use tableside_api::entities::{menu_item, order, order_item};

#[tokio::test]
async fn table_menu_rejects_unknown_tables() {
    let app = TestApp::new().await;
    app.seed_tables(3).await;

    let response = app.request(Method::GET, "/menu/3", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/menu/4", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.request(Method::GET, "/menu/0", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn menu_groups_by_fixed_categories_and_hides_unavailable() {
    let app = TestApp::new().await;
    app.seed_tables(1).await;
    app.seed_menu_item("Tomato soup", "Soups", dec!(18.50)).await;
    let salad = app.seed_menu_item("Greek salad", "Salads", dec!(21.00)).await;

    // Soft-disable the salad.
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

    let body = expect_json(
        app.request(Method::GET, "/menu/1", None, None).await,
        StatusCode::OK,
    )
    .await;

    let categories = body["data"]["categories"].as_array().unwrap();
    // Every fixed category is present, even when empty.
    assert_eq!(
        categories.len(),
        tableside_api::services::catalog::CATEGORIES.len()
    );

    let soups = categories
        .iter()
        .find(|section| section["category"] == json!("Soups"))
        .unwrap();
    assert_eq!(soups["items"].as_array().unwrap().len(), 1);

    let salads = categories
        .iter()
        .find(|section| section["category"] == json!("Salads"))
        .unwrap();
    assert!(salads["items"].as_array().unwrap().is_empty());

    // The admin listing still shows the disabled item.
    let body = expect_json(
        app.request(
            Method::GET,
            "/admin/menu-items",
            None,
            Some(app.admin_token()),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn storefront_pages_group_their_categories() {
    let app = TestApp::new().await;
    app.seed_menu_item("Scrambled eggs", "Breakfasts", dec!(16.00)).await;
    app.seed_menu_item("Club sandwich", "Sandwiches", dec!(19.00)).await;

    let body = expect_json(
        app.request(Method::GET, "/storefront/breakfasts", None, None)
            .await,
        StatusCode::OK,
    )
    .await;

    let sections = body["data"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["category"], json!("Breakfasts"));
    assert_eq!(sections[1]["category"], json!("Sandwiches"));

    let response = app
        .request(Method::GET, "/storefront/nonexistent", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_menu_item_removes_its_order_lines() {
    let app = TestApp::new().await;
    app.seed_tables(1).await;
    let soup = app.seed_menu_item("Tomato soup", "Soups", dec!(18.50)).await;
    let cake = app.seed_menu_item("Cheesecake", "Desserts", dec!(12.00)).await;

    // Place an order referencing both items.
    let response = app
        .request(
            Method::POST,
            "/orders",
            Some(json!({
                "table_id": 1,
                "items": [
                    { "menu_item_id": soup.id, "quantity": 1 },
                    { "menu_item_id": cake.id, "quantity": 2 }
                ]
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Delete the soup through the admin endpoint.
    let response = app
        .request(
            Method::DELETE,
            &format!("/admin/menu-items/{}", soup.id),
            None,
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // No orphaned lines: only the cake's line remains, the order survives.
    let orphans = order_item::Entity::find()
        .filter(order_item::Column::MenuItemId.eq(soup.id))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(orphans, 0);

    let remaining = order_item::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(remaining, 1);

    let orders = order::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(orders, 1);

    let items = menu_item::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(items, 1);
}

#[tokio::test]
async fn admin_creates_menu_items_through_multipart_forms() {
    let app = TestApp::new().await;

    let boundary = "----tableside-test-boundary";
    let mut body = String::new();
    for (name, value) in [
        ("name", "Pumpkin soup"),
        ("description", "Seasonal special"),
        ("price", "17.50"),
        ("category", "Soups"),
        ("customizable", "on"),
    ] {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"soup.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\nnot-really-a-jpeg\r\n--{boundary}--\r\n"
    ));

    let response = app
        .request_raw(
            Method::POST,
            "/admin/menu-items",
            &[
                (
                    "content-type",
                    &format!("multipart/form-data; boundary={boundary}"),
                ),
                (
                    "authorization",
                    &format!("Bearer {}", app.admin_token()),
                ),
            ],
            body.into_bytes(),
        )
        .await;

    let body = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(body["data"]["name"], json!("Pumpkin soup"));
    assert_eq!(body["data"]["category"], json!("Soups"));
    assert_eq!(body["data"]["customizable"], json!(true));
    assert_eq!(body["data"]["contains_alcohol"], json!(false));
    assert_eq!(body["data"]["image_filename"], json!("soup.jpg"));

    // Unknown categories are rejected.
    let boundary2 = "----tableside-test-boundary2";
    let bad = format!(
        "--{boundary2}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nMystery dish\r\n\
         --{boundary2}\r\nContent-Disposition: form-data; name=\"price\"\r\n\r\n10\r\n\
         --{boundary2}\r\nContent-Disposition: form-data; name=\"category\"\r\n\r\nSpecials\r\n\
         --{boundary2}--\r\n"
    );
    let response = app
        .request_raw(
            Method::POST,
            "/admin/menu-items",
            &[
                (
                    "content-type",
                    &format!("multipart/form-data; boundary={boundary2}"),
                ),
                (
                    "authorization",
                    &format!("Bearer {}", app.admin_token()),
                ),
            ],
            bad.into_bytes(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

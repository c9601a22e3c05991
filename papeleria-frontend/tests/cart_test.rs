mod common;

use axum::http::StatusCode;
use common::{products, TestApp};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn sale_cart_accumulates_lines_and_totals() {
    let app = TestApp::spawn().await;
    let session = app.login().await;
    app.mock_list("productos", products()).await;

    app.post(
        "/api/cart/ventas/items",
        json!({ "product_id": 1, "quantity": "2", "counterparty_id": 4 }),
        &session,
    )
    .await;
    let response = app
        .post(
            "/api/cart/ventas/items",
            json!({ "product_id": "2", "quantity": 1 }),
            &session,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["counterparty_id"], 4);
    assert_eq!(response.body["items"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["items"][0]["unit_price"], 10.0);
    assert_eq!(response.body["display"]["subtotal"], "25.00");
    assert_eq!(response.body["display"]["tax"], "3.75");
    assert_eq!(response.body["display"]["total"], "28.75");

    let response = app.get("/api/cart/ventas", &session).await;
    assert_eq!(response.body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn sale_beyond_stock_is_rejected_before_posting() {
    let app = TestApp::spawn().await;
    let session = app.login().await;
    app.mock_list("productos", products()).await;

    Mock::given(method("POST"))
        .and(path("/api/ventas/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.api)
        .await;

    app.put(
        "/api/cart/ventas/counterparty",
        json!({ "counterparty_id": 4 }),
        &session,
    )
    .await;
    let response = app
        .post(
            "/api/cart/ventas/items",
            json!({ "product_id": 1, "quantity": 5 }),
            &session,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["fields"]["quantity"][0],
        "Stock insuficiente. Stock disponible: 3"
    );

    let response = app
        .post("/api/cart/ventas/checkout", json!({}), &session)
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["fields"]["items"][0],
        "Agregue al menos un producto"
    );
}

#[tokio::test]
async fn zero_quantity_leaves_cart_unchanged() {
    let app = TestApp::spawn().await;
    let session = app.login().await;
    app.mock_list("productos", products()).await;

    let response = app
        .post(
            "/api/cart/ventas/items",
            json!({ "product_id": 2, "quantity": 0 }),
            &session,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["fields"]["quantity"][0],
        "La cantidad debe ser mayor a 0"
    );

    let response = app.get("/api/cart/ventas", &session).await;
    assert_eq!(response.body["items"], json!([]));
}

#[tokio::test]
async fn duplicate_sale_line_is_refused() {
    let app = TestApp::spawn().await;
    let session = app.login().await;
    app.mock_list("productos", products()).await;

    let line = json!({ "product_id": 2, "quantity": 1 });
    app.post("/api/cart/ventas/items", line.clone(), &session).await;
    let response = app.post("/api/cart/ventas/items", line, &session).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["fields"]["product_id"][0],
        "El producto ya está en la lista. Elimínelo y vuelva a agregarlo."
    );
}

#[tokio::test]
async fn purchase_lines_need_a_price_and_skip_stock() {
    let app = TestApp::spawn().await;
    let session = app.login().await;
    app.mock_list("productos", products()).await;

    let response = app
        .post(
            "/api/cart/compras/items",
            json!({ "product_id": 1, "quantity": 10 }),
            &session,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["fields"]["unit_price"][0],
        "Ingrese el precio de compra"
    );

    let response = app
        .post(
            "/api/cart/compras/items",
            json!({ "product_id": 1, "quantity": 10, "unit_price": "7.50" }),
            &session,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["display"]["subtotal"], "75.00");
}

#[tokio::test]
async fn purchase_line_may_be_free() {
    let app = TestApp::spawn().await;
    let session = app.login().await;
    app.mock_list("productos", products()).await;

    let response = app
        .post(
            "/api/cart/compras/items",
            json!({ "product_id": 2, "quantity": 4, "unit_price": "0.00" }),
            &session,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"][0]["unit_price"], 0.0);
    assert_eq!(response.body["display"]["total"], "0.00");

    let response = app
        .post(
            "/api/cart/compras/items",
            json!({ "product_id": 2, "quantity": 4, "unit_price": "-1" }),
            &session,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["fields"]["unit_price"][0],
        "El precio debe ser un número no negativo"
    );
}

#[tokio::test]
async fn concurrent_adds_in_one_session_keep_every_line() {
    let app = TestApp::spawn().await;
    let session = app.login().await;
    app.mock_list("productos", products()).await;

    let (first, second) = tokio::join!(
        app.post(
            "/api/cart/compras/items",
            json!({ "product_id": 1, "quantity": 1, "unit_price": "1.00" }),
            &session,
        ),
        app.post(
            "/api/cart/compras/items",
            json!({ "product_id": 2, "quantity": 1, "unit_price": "2.00" }),
            &session,
        ),
    );
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);

    let response = app.get("/api/cart/compras", &session).await;
    assert_eq!(response.body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn stock_check_uses_its_own_session_catalog() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/api/productos/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products()))
        .expect(2)
        .mount(&app.api)
        .await;
    let first = app.login().await;
    let second = app.login().await;
    assert_ne!(first, second);

    let response = app.get("/api/productos", &first).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .post(
            "/api/cart/ventas/items",
            json!({ "product_id": 1, "quantity": 1 }),
            &second,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // The first session's cart reuses its own snapshot.
    let response = app
        .post(
            "/api/cart/ventas/items",
            json!({ "product_id": 2, "quantity": 1 }),
            &first,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.get("/api/cart/ventas", &second).await;
    assert_eq!(response.body["items"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["items"][0]["product_id"], 1);
}

#[tokio::test]
async fn remove_line_by_position() {
    let app = TestApp::spawn().await;
    let session = app.login().await;
    app.mock_list("productos", products()).await;

    for (product_id, price) in [(1, "1.00"), (2, "2.00"), (1, "3.00")] {
        app.post(
            "/api/cart/compras/items",
            json!({ "product_id": product_id, "quantity": 1, "unit_price": price }),
            &session,
        )
        .await;
    }

    let response = app.delete("/api/cart/compras/items/1", &session).await;
    assert_eq!(response.status, StatusCode::OK);
    let prices: Vec<f64> = response.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["unit_price"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![1.0, 3.0]);

    let response = app.delete("/api/cart/compras/items/7", &session).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn carts_are_separate_per_kind_and_clearable() {
    let app = TestApp::spawn().await;
    let session = app.login().await;
    app.mock_list("productos", products()).await;

    app.post(
        "/api/cart/ventas/items",
        json!({ "product_id": 2, "quantity": 1 }),
        &session,
    )
    .await;

    let response = app.get("/api/cart/compras", &session).await;
    assert_eq!(response.body["items"], json!([]));

    let response = app.delete("/api/cart/ventas", &session).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"], json!([]));
    assert_eq!(response.body["totals"]["total"], 0.0);
}

#[tokio::test]
async fn counterparty_must_be_selected() {
    let app = TestApp::spawn().await;
    let session = app.login().await;

    let response = app
        .put(
            "/api/cart/compras/counterparty",
            json!({ "counterparty_id": "" }),
            &session,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["fields"]["counterparty_id"][0],
        "Debe seleccionar un proveedor"
    );
}

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn customers() -> serde_json::Value {
    json!([
        { "id": 1, "nombre": "Ana Torres", "direccion": "Centro", "telefono": "0991234567", "email": "ana@correo.ec" },
        { "id": 2, "nombre": "Luis Mora", "direccion": null, "telefono": "0987654321", "email": "luis@correo.ec" }
    ])
}

#[tokio::test]
async fn list_customers_and_search() {
    let app = TestApp::spawn().await;
    let session = app.login().await;
    app.mock_list("clientes", customers()).await;

    let response = app.get("/api/clientes", &session).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["state"], "ready");
    assert_eq!(response.body["data"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["data"][1]["direccion"], "");

    let response = app.get("/api/clientes?q=luis", &session).await;
    let data = response.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["nombre"], "Luis Mora");
}

#[tokio::test]
async fn failed_list_is_an_error_screen_with_retry() {
    let app = TestApp::spawn().await;
    let session = app.login().await;

    Mock::given(method("GET"))
        .and(path("/api/proveedores/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.api)
        .await;

    let response = app.get("/api/proveedores", &session).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["state"], "error");
    assert_eq!(response.body["message"], "No se pudieron cargar los proveedores");
    assert_eq!(response.body["retry"], "/api/proveedores");
}

#[tokio::test]
async fn invalid_customer_is_rejected_before_any_network_call() {
    let app = TestApp::spawn().await;
    let session = app.login().await;

    Mock::given(method("POST"))
        .and(path("/api/clientes/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.api)
        .await;

    let response = app
        .post(
            "/api/clientes",
            json!({ "nombre": "Ana 2", "direccion": "Centro", "telefono": "12345", "email": "" }),
            &session,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["fields"]["nombre"][0],
        "El nombre solo debe contener letras y espacios"
    );
    assert_eq!(
        response.body["fields"]["telefono"][0],
        "El teléfono debe tener 10 dígitos"
    );
}

#[tokio::test]
async fn create_customer_refetches_the_list() {
    let app = TestApp::spawn().await;
    let session = app.login().await;

    let draft = json!({
        "nombre": "Marta Ruiz",
        "direccion": "Sur",
        "telefono": "0970000001",
        "email": "marta@correo.ec"
    });
    Mock::given(method("POST"))
        .and(path("/api/clientes/"))
        .and(body_json(&draft))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3, "nombre": "Marta Ruiz", "direccion": "Sur",
            "telefono": "0970000001", "email": "marta@correo.ec"
        })))
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/clientes/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(customers()))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app.post("/api/clientes", draft, &session).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["message"], "Cliente creado correctamente");
    assert_eq!(response.body["item"]["id"], 3);
    assert_eq!(response.body["list"]["state"], "ready");
}

#[tokio::test]
async fn remote_rejection_surfaces_remote_message() {
    let app = TestApp::spawn().await;
    let session = app.login().await;

    Mock::given(method("PUT"))
        .and(path("/api/categorias/4/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "nombre": ["categoría con este nombre ya existe."] })),
        )
        .mount(&app.api)
        .await;

    let response = app
        .put("/api/categorias/4", json!({ "nombre": "Útiles" }), &session)
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["error"],
        "nombre: categoría con este nombre ya existe."
    );
}

#[tokio::test]
async fn delete_without_remote_reason_uses_fallback_message() {
    let app = TestApp::spawn().await;
    let session = app.login().await;

    Mock::given(method("DELETE"))
        .and(path("/api/clientes/1/"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&app.api)
        .await;

    let response = app.delete("/api/clientes/1", &session).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error"], "No se pudo eliminar el cliente");
}

#[tokio::test]
async fn delete_supplier_returns_message_and_list() {
    let app = TestApp::spawn().await;
    let session = app.login().await;

    Mock::given(method("DELETE"))
        .and(path("/api/proveedores/5/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.api)
        .await;
    app.mock_list("proveedores", json!([])).await;

    let response = app.delete("/api/proveedores/5", &session).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Proveedor eliminado correctamente");
    assert_eq!(response.body["list"]["data"], json!([]));
}

#[tokio::test]
async fn unreachable_api_is_a_connection_error() {
    let app = TestApp::spawn_with(|settings| settings.api.timeout_secs = 1).await;
    let session = app.login().await;

    Mock::given(method("POST"))
        .and(path("/api/clientes/"))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(3)))
        .mount(&app.api)
        .await;

    let response = app
        .post(
            "/api/clientes",
            json!({
                "nombre": "Ana", "direccion": "Centro",
                "telefono": "0991234567", "email": "ana@correo.ec"
            }),
            &session,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], "No se pudo conectar con el servidor");
}

#[tokio::test]
async fn editor_opens_in_create_and_edit_mode() {
    let app = TestApp::spawn().await;
    let session = app.login().await;

    let response = app.get("/api/editor/productos", &session).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["mode"], "create");
    assert_eq!(response.body["draft"]["codigo"], "");
    assert!(response.body["rules"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["message"] == "El código debe ser de 5 dígitos"));

    Mock::given(method("GET"))
        .and(path("/api/productos/2/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::products()[1].clone()))
        .mount(&app.api)
        .await;

    let response = app.get("/api/editor/productos/2", &session).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["mode"], "edit");
    assert_eq!(response.body["id"], 2);
    assert_eq!(response.body["draft"]["nombre"], "Esfero");
    assert_eq!(response.body["draft"]["precio"], "5.00");
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let app = TestApp::spawn().await;
    let session = app.login().await;

    Mock::given(method("GET"))
        .and(path("/api/clientes/99/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "No encontrado." })))
        .mount(&app.api)
        .await;

    let response = app.get("/api/clientes/99", &session).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Cliente no encontrado");
}

#[tokio::test]
async fn product_mutation_revalidates_catalog() {
    let app = TestApp::spawn().await;
    let session = app.login().await;

    Mock::given(method("POST"))
        .and(path("/api/productos/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(common::products()[0].clone()))
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/productos/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::products()))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app
        .post(
            "/api/productos",
            json!({
                "codigo": "00001", "nombre": "Cuaderno", "descripcion": "100 hojas",
                "precio": "10.00", "stock": "3", "categoria": 1, "proveedor": 1
            }),
            &session,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["list"]["data"][0]["nombre"], "Cuaderno");

    // The cart reads the snapshot the mutation refreshed, without another fetch.
    let response = app
        .post(
            "/api/cart/ventas/items",
            json!({ "product_id": 2, "quantity": 1 }),
            &session,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

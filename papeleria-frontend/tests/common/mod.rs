#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use papeleria_frontend::config::Settings;
use papeleria_frontend::startup::build_router;
use papeleria_frontend::AppState;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const UPSTREAM_COOKIE: &str = "sessionid=abc123";

pub struct TestApp {
    pub router: Router,
    pub api: MockServer,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(configure: impl FnOnce(&mut Settings)) -> Self {
        let api = MockServer::start().await;
        let mut settings = Settings::for_api(format!("{}/api", api.uri()));
        configure(&mut settings);

        let state = AppState::from_settings(settings).expect("Failed to build app state");

        TestApp {
            router: build_router(state),
            api,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        session: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = session {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, session: &str) -> TestResponse {
        self.request(Method::GET, uri, None, Some(session)).await
    }

    pub async fn post(&self, uri: &str, body: Value, session: &str) -> TestResponse {
        self.request(Method::POST, uri, Some(body), Some(session)).await
    }

    pub async fn put(&self, uri: &str, body: Value, session: &str) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), Some(session)).await
    }

    pub async fn delete(&self, uri: &str, session: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None, Some(session)).await
    }

    /// Logs in against the fake remote API and returns the BFF session cookie.
    pub async fn login(&self) -> String {
        Mock::given(method("POST"))
            .and(path("/api/login/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "sessionid=abc123; HttpOnly; Path=/")
                    .set_body_json(json!({
                        "success": true,
                        "user": { "id": 1, "username": "allison", "email": "allison@papeleria.ec" }
                    })),
            )
            .mount(&self.api)
            .await;

        let response = self
            .request(
                Method::POST,
                "/api/login",
                Some(json!({ "username": "allison", "password": "secreto" })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);

        session_cookie(&response.headers).expect("login did not set a session cookie")
    }

    pub async fn mock_list(&self, resource: &str, items: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api/{resource}/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(items))
            .mount(&self.api)
            .await;
    }
}

pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with("id="))
        .map(str::to_string)
}

pub fn products() -> Value {
    json!([
        { "id": 1, "codigo": "00001", "nombre": "Cuaderno", "descripcion": "100 hojas",
          "precio": "10.00", "stock": 3, "categoria": 1, "proveedor": 1 },
        { "id": 2, "codigo": "00002", "nombre": "Esfero", "descripcion": "Azul",
          "precio": "5.00", "stock": 40, "categoria": 1, "proveedor": 2 }
    ])
}

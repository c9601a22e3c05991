use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        papeleria_core::observability::metrics::render(),
    )
}

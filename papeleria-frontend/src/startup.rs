use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use papeleria_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers::{
    app::{health_check, metrics},
    auth::{current_user_handler, login_handler, logout_handler},
    dashboard::dashboard,
    entities, transactions,
};
use crate::middleware::auth::require_login;
use crate::models::{Category, Customer, Product, Purchase, Sale, Supplier};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.settings.session.secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            state.settings.session.expiry_hours,
        )));

    let screens = Router::new()
        .merge(entities::routes::<Customer>())
        .merge(entities::routes::<Supplier>())
        .merge(entities::routes::<Product>())
        .merge(entities::routes::<Category>())
        .merge(transactions::routes::<Sale>())
        .merge(transactions::routes::<Purchase>())
        .route("/api/dashboard", get(dashboard))
        .route_layer(from_fn(require_login));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/login", post(login_handler))
        .route("/api/logout", post(logout_handler))
        .route("/api/current-user", get(current_user_handler))
        .merge(screens)
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

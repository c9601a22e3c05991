use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use papeleria_core::error::AppError;
use papeleria_core::middleware::tracing::RequestId;
use secrecy::Secret;
use serde::Deserialize;
use tower_sessions::Session;

use crate::models::user::{session_value, UserProfile, SESSION_UPSTREAM_COOKIE, SESSION_USER};
use crate::services::auth_client::SessionStatus;
use crate::services::UpstreamContext;
use crate::AppState;

const BAD_CREDENTIALS: &str = "Usuario o contraseña incorrectos";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: Secret<String>,
}

async fn upstream_context(
    session: &Session,
    request_id: Option<&RequestId>,
) -> Result<UpstreamContext, AppError> {
    Ok(UpstreamContext {
        cookie: session_value(session, SESSION_UPSTREAM_COOKIE).await?,
        request_id: request_id.map(|id| id.as_str().to_string()),
        session_id: session.id(),
    })
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    request_id: Option<Extension<RequestId>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Unauthorized(anyhow::anyhow!(BAD_CREDENTIALS)));
    }

    let request_id = request_id.map(|Extension(id)| id);
    let outcome = state
        .auth_client
        .login(
            &payload.username,
            &payload.password,
            request_id.as_ref().map(RequestId::as_str),
        )
        .await?;

    let Some(outcome) = outcome else {
        tracing::info!(username = %payload.username, "Login refused by remote API");
        return Err(AppError::Unauthorized(anyhow::anyhow!(BAD_CREDENTIALS)));
    };

    state.end_session(session.id()).await;
    session
        .cycle_id()
        .await
        .map_err(|e| anyhow::anyhow!("failed to rotate session id: {e}"))?;
    session
        .insert(SESSION_USER, &outcome.user)
        .await
        .map_err(|e| anyhow::anyhow!("failed to store user in session: {e}"))?;
    if let Some(cookie) = &outcome.cookie {
        session
            .insert(SESSION_UPSTREAM_COOKIE, cookie)
            .await
            .map_err(|e| anyhow::anyhow!("failed to store upstream cookie: {e}"))?;
    }

    tracing::info!(username = %outcome.user.username, "User logged in");

    Ok(Json(SessionStatus {
        authenticated: true,
        user: Some(outcome.user),
    }))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
    request_id: Option<Extension<RequestId>>,
) -> impl IntoResponse {
    // The local session goes away even if the remote one can't be closed.
    match upstream_context(&session, request_id.as_ref().map(|Extension(id)| id)).await {
        Ok(ctx) if ctx.cookie.is_some() => {
            if let Err(e) = state.auth_client.logout(&ctx).await {
                tracing::error!(error = %e, "Failed to close remote session during logout");
            }
        }
        Ok(_) => {}
        Err(e) => tracing::error!(error = %e, "Could not read session during logout"),
    }

    state.end_session(session.id()).await;
    session.clear().await;
    StatusCode::NO_CONTENT
}

pub async fn current_user_handler(
    State(state): State<AppState>,
    session: Session,
    request_id: Option<Extension<RequestId>>,
) -> Result<Json<SessionStatus>, AppError> {
    let user: Option<UserProfile> = session_value(&session, SESSION_USER).await?;
    if user.is_none() {
        return Ok(Json(SessionStatus {
            authenticated: false,
            user: None,
        }));
    }

    let ctx = upstream_context(&session, request_id.as_ref().map(|Extension(id)| id)).await?;
    let status = state.auth_client.current_user(&ctx).await?;

    if !status.authenticated {
        tracing::info!("Remote session expired, clearing local session");
        state.end_session(session.id()).await;
        session.clear().await;
    }

    Ok(Json(status))
}

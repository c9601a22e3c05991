use axum::{extract::Request, middleware::Next, response::Response};
use papeleria_core::error::AppError;
use tower_sessions::Session;

use crate::models::user::{session_value, UserProfile, SESSION_USER};

/// Turns away requests without a logged-in session before they reach a screen.
pub async fn require_login(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user: Option<UserProfile> = session_value(&session, SESSION_USER).await?;

    if user.is_none() {
        tracing::debug!(uri = %request.uri(), "Rejecting request without session");
        return Err(AppError::Unauthorized(anyhow::anyhow!("Debe iniciar sesión")));
    }

    Ok(next.run(request).await)
}

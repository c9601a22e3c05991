use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use papeleria_core::error::AppError;
use papeleria_core::middleware::tracing::RequestId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tower_sessions::session::Id;
use tower_sessions::Session;

use crate::services::UpstreamContext;

pub const SESSION_USER: &str = "user";
/// `name=value` pairs of the cookies the remote API set at login.
pub const SESSION_UPSTREAM_COOKIE: &str = "upstream_cookie";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Whatever else the remote API reports about the user.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reads a session value. A failing session store is an internal error, never a logged-out
/// user.
pub async fn session_value<T: DeserializeOwned>(
    session: &Session,
    key: &str,
) -> Result<Option<T>, AppError> {
    session
        .get(key)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("failed to read session: {e}")))
}

/// Logged-in user extracted from the session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: UserProfile,
    pub upstream_cookie: Option<String>,
    pub request_id: Option<String>,
    pub session_id: Option<Id>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| anyhow::anyhow!(message))?;

        let Some(user) = session_value::<UserProfile>(&session, SESSION_USER).await? else {
            return Err(AppError::Unauthorized(anyhow::anyhow!(
                "Debe iniciar sesión"
            )));
        };
        let upstream_cookie: Option<String> =
            session_value(&session, SESSION_UPSTREAM_COOKIE).await?;
        let request_id = parts
            .extensions
            .get::<RequestId>()
            .map(|id| id.as_str().to_string());

        Ok(AuthUser {
            user,
            upstream_cookie,
            request_id,
            session_id: session.id(),
        })
    }
}

impl AuthUser {
    /// Context for calls to the remote API on behalf of this user.
    pub fn ctx(&self) -> UpstreamContext {
        UpstreamContext {
            cookie: self.upstream_cookie.clone(),
            request_id: self.request_id.clone(),
            session_id: self.session_id,
        }
    }
}

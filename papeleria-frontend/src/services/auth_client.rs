use papeleria_core::observability::TracedClientExt;
use reqwest::header::SET_COOKIE;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::models::user::UserProfile;
use crate::services::api_client::{authorize, classify, ApiClient, ApiError, UpstreamContext};

/// Session endpoints of the remote API: `login/`, `logout/`, `current-user/`.
pub struct AuthClient {
    api: std::sync::Arc<ApiClient>,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserProfile,
    /// `name=value; name=value` built from the remote `Set-Cookie` headers.
    pub cookie: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub user: Option<UserProfile>,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    user: Option<UserProfile>,
}

#[derive(Deserialize)]
struct CurrentUserResponse {
    user: Option<UserProfile>,
}

impl AuthClient {
    pub fn new(api: std::sync::Arc<ApiClient>) -> Self {
        Self { api }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/", self.api.base_url(), path)
    }

    /// `Ok(None)` when the remote API refuses the credentials.
    pub async fn login(
        &self,
        username: &str,
        password: &Secret<String>,
        request_id: Option<&str>,
    ) -> Result<Option<LoginOutcome>, ApiError> {
        let result = self
            .api
            .http()
            .traced_post(&self.url("login"))
            .json(&serde_json::json!({
                "username": username,
                "password": password.expose_secret(),
            }))
            .request_id(request_id)
            .send()
            .await;

        let response = match classify(result).await {
            Ok(response) => response,
            Err(ApiError::Rejected { status, .. } | ApiError::Status { status })
                if status.is_client_error() =>
            {
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let cookie = upstream_cookie(response.headers());
        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        match (body.success, body.user) {
            (true, Some(user)) => Ok(Some(LoginOutcome { user, cookie })),
            _ => Ok(None),
        }
    }

    pub async fn logout(&self, ctx: &UpstreamContext) -> Result<(), ApiError> {
        let request = authorize(self.api.http().traced_post(&self.url("logout")), ctx, true);
        classify(request.send().await).await?;
        Ok(())
    }

    /// Asks the remote API whether the forwarded session is still valid.
    pub async fn current_user(&self, ctx: &UpstreamContext) -> Result<SessionStatus, ApiError> {
        let request = authorize(self.api.http().traced_get(&self.url("current-user")), ctx, false);
        match classify(request.send().await).await {
            Ok(response) => {
                let body: CurrentUserResponse = response
                    .json()
                    .await
                    .map_err(|e| ApiError::Decode(e.to_string()))?;
                Ok(SessionStatus {
                    authenticated: body.user.is_some(),
                    user: body.user,
                })
            }
            Err(ApiError::Status { status } | ApiError::Rejected { status, .. })
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                Ok(SessionStatus {
                    authenticated: false,
                    user: None,
                })
            }
            Err(err) => Err(err),
        }
    }
}

fn upstream_cookie(headers: &reqwest::header::HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect();

    (!pairs.is_empty()).then(|| pairs.join("; "))
}

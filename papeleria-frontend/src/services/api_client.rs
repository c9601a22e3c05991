//! Client for the remote REST API (`{base}/{resource}/`, `{base}/{resource}/{id}/`).
//!
//! Calls are made on behalf of a user: the cookies the remote API handed out at login are
//! forwarded, along with trace context and the inbound request id. There are no retries; a
//! failed call is reported and the user triggers it again.

use anyhow::Context;
use metrics::counter;
use papeleria_core::error::AppError;
use papeleria_core::observability::{TracedClientExt, TracedRequest};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tower_sessions::session::Id;

use crate::config::ApiSettings;
use crate::models::Resource;

pub const CONNECTION_FAILED: &str = "No se pudo conectar con el servidor";

/// Per-user data attached to every outbound call.
#[derive(Debug, Clone, Default)]
pub struct UpstreamContext {
    pub cookie: Option<String>,
    pub request_id: Option<String>,
    /// BFF session the call is made for; scopes per-session caches.
    pub session_id: Option<Id>,
}

impl UpstreamContext {
    /// Value of the `csrftoken` cookie, echoed back as `X-CSRFToken` on writes.
    pub fn csrf_token(&self) -> Option<&str> {
        self.cookie.as_deref()?.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == "csrftoken").then_some(value)
        })
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response: connection refused, timeout, DNS.
    #[error("remote API unreachable: {0}")]
    Network(#[source] reqwest::Error),

    #[error("remote API answered {status}")]
    Status { status: StatusCode },

    /// The remote API refused the payload and said why.
    #[error("remote API rejected the request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("unreadable response from remote API: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message to show the user: the remote explanation when there is one.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Rejected { message, .. } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn into_app_error(self, fallback: &str) -> AppError {
        match self {
            ApiError::Network(_) => AppError::BadGateway(CONNECTION_FAILED.to_string()),
            ApiError::Rejected { message, .. } => AppError::UpstreamRejected(message),
            ApiError::Status { status }
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                AppError::Unauthorized(anyhow::anyhow!("La sesión ha expirado"))
            }
            ApiError::Status { status } if status == StatusCode::NOT_FOUND => {
                AppError::NotFound(anyhow::anyhow!(fallback.to_string()))
            }
            ApiError::Status { status } if status.is_client_error() => {
                AppError::UpstreamRejected(fallback.to_string())
            }
            ApiError::Status { .. } | ApiError::Decode(_) => {
                AppError::BadGateway(fallback.to_string())
            }
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        err.into_app_error("Error al comunicarse con el servidor")
    }
}

/// Best human-readable message in an error body: `detail`, `error`, `message`, or the
/// field errors flattened as `campo: mensaje`.
pub fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = match &value {
        Value::Object(map) => {
            for key in ["detail", "error", "message"] {
                if let Some(Value::String(text)) = map.get(key) {
                    return Some(text.clone());
                }
            }
            map.iter()
                .filter_map(|(field, errors)| {
                    let text = flatten(errors)?;
                    Some(if field == "non_field_errors" {
                        text
                    } else {
                        format!("{field}: {text}")
                    })
                })
                .collect::<Vec<_>>()
                .join("; ")
        }
        other => flatten(other)?,
    };
    (!message.is_empty()).then_some(message)
}

fn flatten(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten).collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        _ => None,
    }
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("failed to build HTTP client for the remote API")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    fn collection_url(&self, resource: Resource) -> String {
        format!("{}/{}/", self.base_url, resource.path())
    }

    fn item_url(&self, resource: Resource, id: i64) -> String {
        format!("{}/{}/{}/", self.base_url, resource.path(), id)
    }

    pub async fn list<T: DeserializeOwned>(
        &self,
        resource: Resource,
        ctx: &UpstreamContext,
    ) -> Result<Vec<T>, ApiError> {
        let request = self.client.traced_get(&self.collection_url(resource));
        let response = self.send(resource, "GET", request, ctx).await?;
        decode(response).await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        resource: Resource,
        id: i64,
        ctx: &UpstreamContext,
    ) -> Result<T, ApiError> {
        let request = self.client.traced_get(&self.item_url(resource, id));
        let response = self.send(resource, "GET", request, ctx).await?;
        decode(response).await
    }

    pub async fn create<B, T>(
        &self,
        resource: Resource,
        body: &B,
        ctx: &UpstreamContext,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .client
            .traced_post(&self.collection_url(resource))
            .json(body);
        let response = self.send(resource, "POST", request, ctx).await?;
        decode(response).await
    }

    /// Like [`ApiClient::create`], but a 2xx answer means the record exists: a body that can't
    /// be read comes back as `Ok(None)` instead of an error.
    pub async fn create_committed<B, T>(
        &self,
        resource: Resource,
        body: &B,
        ctx: &UpstreamContext,
    ) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .client
            .traced_post(&self.collection_url(resource))
            .json(body);
        let response = self.send(resource, "POST", request, ctx).await?;
        match decode(response).await {
            Ok(created) => Ok(Some(created)),
            Err(err) => {
                tracing::warn!(resource = %resource, error = %err, "Created record has an unreadable body");
                Ok(None)
            }
        }
    }

    pub async fn update<B, T>(
        &self,
        resource: Resource,
        id: i64,
        body: &B,
        ctx: &UpstreamContext,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .client
            .traced_put(&self.item_url(resource, id))
            .json(body);
        let response = self.send(resource, "PUT", request, ctx).await?;
        decode(response).await
    }

    pub async fn delete(
        &self,
        resource: Resource,
        id: i64,
        ctx: &UpstreamContext,
    ) -> Result<(), ApiError> {
        let request = self.client.traced_delete(&self.item_url(resource, id));
        self.send(resource, "DELETE", request, ctx).await?;
        Ok(())
    }

    async fn send(
        &self,
        resource: Resource,
        method: &'static str,
        request: TracedRequest,
        ctx: &UpstreamContext,
    ) -> Result<reqwest::Response, ApiError> {
        let result = authorize(request, ctx, method != "GET").send().await;
        let outcome = classify(result).await;

        let label = match &outcome {
            Ok(_) => "ok",
            Err(ApiError::Network(_)) => "network_error",
            Err(ApiError::Rejected { .. }) => "rejected",
            Err(_) => "error",
        };
        counter!(
            "upstream_requests_total",
            "resource" => resource.path(),
            "method" => method,
            "outcome" => label
        )
        .increment(1);

        if let Err(err) = &outcome {
            tracing::warn!(resource = %resource, method, error = %err, "Remote API call failed");
        }
        outcome
    }
}

/// Attaches the user's upstream cookies, the CSRF header for writes and the request id.
pub(crate) fn authorize(
    mut request: TracedRequest,
    ctx: &UpstreamContext,
    write: bool,
) -> TracedRequest {
    if let Some(cookie) = ctx.cookie.as_deref() {
        request = request.header("Cookie", cookie);
    }
    if write {
        if let Some(token) = ctx.csrf_token() {
            request = request.header("X-CSRFToken", token);
        }
    }
    request.request_id(ctx.request_id.as_deref())
}

/// Splits a raw outcome into a success response or the error taxonomy.
pub(crate) async fn classify(
    result: Result<reqwest::Response, reqwest::Error>,
) -> Result<reqwest::Response, ApiError> {
    let response = result.map_err(ApiError::Network)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Missing records and expired sessions are not payload problems.
    if matches!(
        status,
        StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    ) || !status.is_client_error()
    {
        return Err(ApiError::Status { status });
    }

    let body = response.text().await.unwrap_or_default();
    match extract_message(&body) {
        Some(message) => Err(ApiError::Rejected { status, message }),
        None => Err(ApiError::Status { status }),
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

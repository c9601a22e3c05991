//! State of a list screen: `Loading -> Ready | Error`, back to `Loading` on every refresh.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScreenState<T> {
    Loading,
    Ready {
        data: T,
    },
    Error {
        message: String,
        /// Where the client re-issues the request; nothing is retried automatically.
        #[serde(skip_serializing_if = "Option::is_none")]
        retry: Option<String>,
    },
}

impl<T> ScreenState<T> {
    pub fn ready(data: T) -> Self {
        ScreenState::Ready { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ScreenState::Error {
            message: message.into(),
            retry: None,
        }
    }

    pub fn with_retry(self, uri: impl Into<String>) -> Self {
        match self {
            ScreenState::Error { message, .. } => ScreenState::Error {
                message,
                retry: Some(uri.into()),
            },
            other => other,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ScreenState::Ready { data } => Some(data),
            _ => None,
        }
    }
}

impl<T: Serialize> IntoResponse for ScreenState<T> {
    fn into_response(self) -> Response {
        let status = match &self {
            ScreenState::Loading => StatusCode::ACCEPTED,
            ScreenState::Ready { .. } => StatusCode::OK,
            ScreenState::Error { .. } => StatusCode::BAD_GATEWAY,
        };
        (status, Json(self)).into_response()
    }
}

/// Proof that a load was started; only the newest one may complete the screen.
#[derive(Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Screen state plus a load generation, so a slow response for a superseded request
/// can't overwrite a newer one.
#[derive(Debug)]
pub struct Screen<T> {
    generation: u64,
    state: ScreenState<T>,
}

impl<T> Default for Screen<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            state: ScreenState::Loading,
        }
    }
}

impl<T> Screen<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ScreenState<T> {
        &self.state
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = ScreenState::Loading;
        LoadTicket(self.generation)
    }

    /// Applies the result if `ticket` is still the latest load; returns whether it was.
    pub fn complete(&mut self, ticket: LoadTicket, result: Result<T, String>) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        self.state = match result {
            Ok(data) => ScreenState::Ready { data },
            Err(message) => ScreenState::error(message),
        };
        true
    }
}

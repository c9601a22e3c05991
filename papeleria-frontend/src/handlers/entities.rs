//! CRUD screens for customers, suppliers, products and categories, one generic set of
//! handlers instantiated per entity.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use papeleria_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::editor::{self, EditorView, Entity};
use crate::models::user::AuthUser;
use crate::screen::ScreenState;
use crate::services::UpstreamContext;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Result of a create, update or delete: the message to show and the refetched list.
#[derive(Debug, Serialize)]
pub struct MutationOutcome<E> {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<E>,
    pub list: ScreenState<Vec<E>>,
}

pub fn routes<E: Entity>() -> Router<AppState> {
    let path = E::RESOURCE.path();
    Router::new()
        .route(&format!("/api/{path}"), get(list::<E>).post(create::<E>))
        .route(
            &format!("/api/{path}/:id"),
            get(detail::<E>).put(update::<E>).delete(remove::<E>),
        )
        .route(&format!("/api/editor/{path}"), get(open_create::<E>))
        .route(&format!("/api/editor/{path}/:id"), get(open_edit::<E>))
}

async fn load_list<E: Entity>(state: &AppState, ctx: &UpstreamContext) -> ScreenState<Vec<E>> {
    match E::fetch_all(state, ctx).await {
        Ok(items) => ScreenState::ready(items),
        Err(err) => {
            tracing::warn!(resource = %E::RESOURCE, error = %err, "Failed to load list");
            ScreenState::error(err.user_message(E::MESSAGES.load_failed))
                .with_retry(format!("/api/{}", E::RESOURCE))
        }
    }
}

pub async fn list<E: Entity>(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<SearchParams>,
) -> ScreenState<Vec<E>> {
    match load_list::<E>(&state, &user.ctx()).await {
        ScreenState::Ready { data } => {
            ScreenState::ready(editor::search(data, params.q.as_deref()))
        }
        other => other,
    }
}

pub async fn detail<E: Entity>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<E>, AppError> {
    let item = state
        .api
        .get::<E>(E::RESOURCE, id, &user.ctx())
        .await
        .map_err(|e| e.into_app_error(E::MESSAGES.not_found))?;
    Ok(Json(item))
}

pub async fn open_create<E: Entity>(_user: AuthUser) -> Json<EditorView<E::Draft>> {
    Json(editor::open_create::<E>())
}

pub async fn open_edit<E: Entity>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<EditorView<E::Draft>>, AppError> {
    let item = state
        .api
        .get::<E>(E::RESOURCE, id, &user.ctx())
        .await
        .map_err(|e| e.into_app_error(E::MESSAGES.not_found))?;
    Ok(Json(editor::open_edit(&item)))
}

pub async fn create<E: Entity>(
    State(state): State<AppState>,
    user: AuthUser,
    Json(draft): Json<E::Draft>,
) -> Result<(StatusCode, Json<MutationOutcome<E>>), AppError> {
    editor::validate_draft::<E>(&draft)?;

    let ctx = user.ctx();
    let created: E = state
        .api
        .create(E::RESOURCE, &draft, &ctx)
        .await
        .map_err(|e| e.into_app_error(E::MESSAGES.save_failed))?;

    tracing::info!(resource = %E::RESOURCE, id = created.id(), "Record created");

    Ok((
        StatusCode::CREATED,
        Json(MutationOutcome {
            message: E::MESSAGES.created,
            item: Some(created),
            list: load_list::<E>(&state, &ctx).await,
        }),
    ))
}

pub async fn update<E: Entity>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(draft): Json<E::Draft>,
) -> Result<Json<MutationOutcome<E>>, AppError> {
    editor::validate_draft::<E>(&draft)?;

    let ctx = user.ctx();
    let updated: E = state
        .api
        .update(E::RESOURCE, id, &draft, &ctx)
        .await
        .map_err(|e| e.into_app_error(E::MESSAGES.save_failed))?;

    tracing::info!(resource = %E::RESOURCE, id, "Record updated");

    Ok(Json(MutationOutcome {
        message: E::MESSAGES.updated,
        item: Some(updated),
        list: load_list::<E>(&state, &ctx).await,
    }))
}

pub async fn remove<E: Entity>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MutationOutcome<E>>, AppError> {
    let ctx = user.ctx();
    state
        .api
        .delete(E::RESOURCE, id, &ctx)
        .await
        .map_err(|e| e.into_app_error(E::MESSAGES.delete_failed))?;

    tracing::info!(resource = %E::RESOURCE, id, "Record deleted");

    Ok(Json(MutationOutcome {
        message: E::MESSAGES.deleted,
        item: None,
        list: load_list::<E>(&state, &ctx).await,
    }))
}

//! One editor for every CRUD screen: open in create or edit mode, validate the draft against
//! the entity's schema, search the loaded list.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use validator::ValidationErrors;

use crate::models::Resource;
use crate::services::{ApiError, UpstreamContext};
use crate::validation::Schema;
use crate::AppState;

/// User-facing messages of one entity screen.
#[derive(Debug, Clone, Copy)]
pub struct EntityMessages {
    pub load_failed: &'static str,
    pub created: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
    pub save_failed: &'static str,
    pub delete_failed: &'static str,
    pub not_found: &'static str,
}

pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Editable fields, in the remote API's names.
    type Draft: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static;

    const RESOURCE: Resource;
    const MESSAGES: EntityMessages;

    fn id(&self) -> i64;
    fn schema() -> &'static Schema;
    fn to_draft(&self) -> Self::Draft;
    fn matches(&self, query: &str) -> bool;

    fn fetch_all(
        state: &AppState,
        ctx: &UpstreamContext,
    ) -> impl Future<Output = Result<Vec<Self>, ApiError>> + Send {
        async move { state.api.list::<Self>(Self::RESOURCE, ctx).await }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EditorMode {
    Create,
    Edit { id: i64 },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RuleView {
    pub field: &'static str,
    pub rule: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorView<D> {
    #[serde(flatten)]
    pub mode: EditorMode,
    pub draft: D,
    pub rules: Vec<RuleView>,
}

fn rules<E: Entity>() -> Vec<RuleView> {
    E::schema()
        .rules()
        .iter()
        .map(|r| RuleView {
            field: r.field,
            rule: r.rule.code(),
            message: r.message,
        })
        .collect()
}

pub fn open_create<E: Entity>() -> EditorView<E::Draft> {
    EditorView {
        mode: EditorMode::Create,
        draft: E::Draft::default(),
        rules: rules::<E>(),
    }
}

pub fn open_edit<E: Entity>(entity: &E) -> EditorView<E::Draft> {
    EditorView {
        mode: EditorMode::Edit { id: entity.id() },
        draft: entity.to_draft(),
        rules: rules::<E>(),
    }
}

pub fn validate_draft<E: Entity>(draft: &E::Draft) -> Result<(), ValidationErrors> {
    E::schema().validate(draft)
}

/// Items matching `query`; a blank query keeps everything.
pub fn search<E: Entity>(items: Vec<E>, query: Option<&str>) -> Vec<E> {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => items.into_iter().filter(|item| item.matches(query)).collect(),
        None => items,
    }
}

//! Sale and purchase screens: the transaction lists and the cart kept per session.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use papeleria_core::error::AppError;
use serde::{Deserialize, Serialize};
use tokio::sync::OwnedMutexGuard;

use crate::cart::{Cart, CartError, LineItem};
use crate::models::user::AuthUser;
use crate::models::{wire, Transaction, TransactionKind};
use crate::receipt::Receipt;
use crate::screen::ScreenState;
use crate::services::UpstreamContext;
use crate::totals::{DisplayTotals, Totals};
use crate::AppState;

pub fn routes<K: TransactionKind>() -> Router<AppState> {
    let path = K::RESOURCE.path();
    Router::new()
        .route(&format!("/api/{path}"), get(list::<K>))
        .route(&format!("/api/{path}/:id"), get(detail::<K>))
        .route(
            &format!("/api/cart/{path}"),
            get(show_cart::<K>).delete(clear_cart::<K>),
        )
        .route(&format!("/api/cart/{path}/items"), post(add_item::<K>))
        .route(
            &format!("/api/cart/{path}/items/:index"),
            delete(remove_item::<K>),
        )
        .route(
            &format!("/api/cart/{path}/counterparty"),
            put(set_counterparty::<K>),
        )
        .route(&format!("/api/cart/{path}/checkout"), post(checkout::<K>))
}

async fn load_list<K: TransactionKind>(
    state: &AppState,
    ctx: &UpstreamContext,
) -> ScreenState<Vec<Transaction>> {
    match state.api.list::<Transaction>(K::RESOURCE, ctx).await {
        Ok(items) => ScreenState::ready(items),
        Err(err) => {
            tracing::warn!(resource = %K::RESOURCE, error = %err, "Failed to load transactions");
            ScreenState::error(err.user_message(K::LOAD_FAILED))
                .with_retry(format!("/api/{}", K::RESOURCE))
        }
    }
}

pub async fn list<K: TransactionKind>(
    State(state): State<AppState>,
    user: AuthUser,
) -> ScreenState<Vec<Transaction>> {
    load_list::<K>(&state, &user.ctx()).await
}

pub async fn detail<K: TransactionKind>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = state
        .api
        .get::<Transaction>(K::RESOURCE, id, &user.ctx())
        .await
        .map_err(|e| e.into_app_error(K::NOT_FOUND))?;
    Ok(Json(transaction))
}

#[derive(Debug, Serialize)]
pub struct CartLine {
    pub index: usize,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub counterparty_id: Option<i64>,
    pub items: Vec<CartLine>,
    pub totals: Totals,
    pub display: DisplayTotals,
}

impl<K: TransactionKind> From<&Cart<K>> for CartView {
    fn from(cart: &Cart<K>) -> Self {
        let totals = cart.totals();
        Self {
            counterparty_id: cart.counterparty_id,
            items: cart
                .items()
                .iter()
                .enumerate()
                .map(|(index, item)| CartLine {
                    index,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    subtotal: item.subtotal(),
                })
                .collect(),
            totals,
            display: totals.display(),
        }
    }
}

/// The session's cart, locked until the guard drops.
async fn lock_cart<K: TransactionKind>(
    state: &AppState,
    user: &AuthUser,
) -> Result<OwnedMutexGuard<Cart<K>>, AppError> {
    let session_id = user
        .session_id
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Debe iniciar sesión")))?;
    Ok(K::carts(state).lock(session_id).await)
}

pub async fn show_cart<K: TransactionKind>(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<CartView>, AppError> {
    let cart = lock_cart::<K>(&state, &user).await?;
    Ok(Json(CartView::from(&*cart)))
}

pub async fn clear_cart<K: TransactionKind>(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<CartView>, AppError> {
    let mut cart = lock_cart::<K>(&state, &user).await?;
    cart.clear();
    Ok(Json(CartView::from(&*cart)))
}

/// Line entry as typed in the form; checked against the kind's line schema first.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LineEntry {
    #[serde(default, deserialize_with = "wire::reference")]
    pub product_id: i64,
    #[serde(default, deserialize_with = "wire::text")]
    pub quantity: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub unit_price: String,
    #[serde(default, skip_serializing)]
    pub counterparty_id: Option<i64>,
}

pub async fn add_item<K: TransactionKind>(
    State(state): State<AppState>,
    user: AuthUser,
    Json(entry): Json<LineEntry>,
) -> Result<Json<CartView>, AppError> {
    K::line_schema().validate(&entry)?;

    let quantity: i64 = entry
        .quantity
        .trim()
        .parse()
        .map_err(|_| CartError::InvalidQuantity)?;
    let unit_price = match entry.unit_price.trim() {
        "" => None,
        raw => Some(raw.parse::<f64>().map_err(|_| CartError::InvalidPrice)?),
    };

    let catalog = state
        .catalog
        .snapshot_or_fetch(&state.api, &user.ctx())
        .await
        .map_err(|e| e.into_app_error(K::LOAD_FAILED))?;

    let mut cart = lock_cart::<K>(&state, &user).await?;
    if let Some(counterparty_id) = entry.counterparty_id {
        cart.set_counterparty(counterparty_id)?;
    }
    if let Err(err) = cart.add(&catalog, entry.product_id, quantity, unit_price) {
        tracing::debug!(resource = %K::RESOURCE, product_id = entry.product_id, error = %err, "Line refused");
        return Err(err.into());
    }

    Ok(Json(CartView::from(&*cart)))
}

pub async fn remove_item<K: TransactionKind>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(index): Path<usize>,
) -> Result<Json<CartView>, AppError> {
    let mut cart = lock_cart::<K>(&state, &user).await?;
    cart.remove(index)?;
    Ok(Json(CartView::from(&*cart)))
}

#[derive(Debug, Deserialize)]
pub struct CounterpartySelection {
    #[serde(default, deserialize_with = "wire::reference")]
    pub counterparty_id: i64,
}

pub async fn set_counterparty<K: TransactionKind>(
    State(state): State<AppState>,
    user: AuthUser,
    Json(selection): Json<CounterpartySelection>,
) -> Result<Json<CartView>, AppError> {
    let mut cart = lock_cart::<K>(&state, &user).await?;
    cart.set_counterparty(selection.counterparty_id)?;
    Ok(Json(CartView::from(&*cart)))
}

#[derive(Debug, Serialize)]
pub struct CheckoutOutcome {
    pub message: &'static str,
    pub receipt: Receipt,
    pub list: ScreenState<Vec<Transaction>>,
}

pub async fn checkout<K: TransactionKind>(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<(StatusCode, Json<CheckoutOutcome>), AppError> {
    let ctx = user.ctx();
    // Held until the remote API answers so a second checkout cannot submit the same lines.
    let mut cart = lock_cart::<K>(&state, &user).await?;

    let payload = cart.submission()?;
    let counterparty_id = payload.counterparty_id;
    let items: Vec<LineItem> = payload.items.to_vec();
    // Any 2xx means the remote API recorded it; from here on the cart must not be resubmitted.
    let created: Option<Transaction> = state
        .api
        .create_committed(K::RESOURCE, &payload, &ctx)
        .await
        .map_err(|e| {
            tracing::warn!(resource = %K::RESOURCE, error = %e, "Checkout failed, cart kept");
            e.into_app_error(K::PROCESS_ERROR)
        })?;

    cart.clear();
    drop(cart);

    match &created {
        Some(created) => {
            tracing::info!(resource = %K::RESOURCE, id = created.id, total = created.total, "Transaction recorded")
        }
        None => tracing::info!(resource = %K::RESOURCE, "Transaction recorded without a readable answer"),
    }

    // Stock moved; refresh this session's catalog for the next cart.
    let catalog = match state.catalog.revalidate(&state.api, &ctx).await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!(error = %e, "Could not refresh catalog after checkout");
            state
                .catalog
                .snapshot(ctx.session_id)
                .await
                .unwrap_or_default()
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(CheckoutOutcome {
            message: K::SUCCESS,
            receipt: Receipt::new(created.as_ref(), counterparty_id, &items, &catalog),
            list: load_list::<K>(&state, &ctx).await,
        }),
    ))
}

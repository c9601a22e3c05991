pub mod cart;
pub mod config;
pub mod editor;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod receipt;
pub mod screen;
pub mod services;
pub mod startup;
pub mod stats;
pub mod totals;
pub mod validation;

use config::Settings;
use models::{Purchase, Sale};
use services::{ApiClient, AuthClient, CartStore, ProductCatalog};
use tower_sessions::session::Id;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state: settings and the clients for the remote API.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub api: Arc<ApiClient>,
    pub auth_client: Arc<AuthClient>,
    pub catalog: Arc<ProductCatalog>,
    pub sale_carts: Arc<CartStore<Sale>>,
    pub purchase_carts: Arc<CartStore<Purchase>>,
}

impl AppState {
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let api = Arc::new(ApiClient::new(&settings.api)?);
        let session_lifetime =
            Duration::from_secs(settings.session.expiry_hours.max(0) as u64 * 3600);
        Ok(Self {
            settings: Arc::new(settings),
            auth_client: Arc::new(AuthClient::new(api.clone())),
            catalog: Arc::new(ProductCatalog::new(session_lifetime)),
            sale_carts: Arc::new(CartStore::new(session_lifetime)),
            purchase_carts: Arc::new(CartStore::new(session_lifetime)),
            api,
        })
    }

    /// Drops the carts and product snapshot kept for a session that is ending.
    pub async fn end_session(&self, session_id: Option<Id>) {
        self.catalog.forget(session_id).await;
        self.sale_carts.forget(session_id).await;
        self.purchase_carts.forget(session_id).await;
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tower_sessions::session::Id;

use crate::models::{Product, Resource};
use crate::screen::{Screen, ScreenState};
use crate::services::{ApiClient, ApiError, UpstreamContext};

/// Product list per BFF session, stale-while-revalidate.
///
/// Every product-list request and every product mutation refetches; carts read the session's
/// last good snapshot, so stock figures are advisory. Calls without a session are never cached.
pub struct ProductCatalog {
    sessions: RwLock<HashMap<Id, CatalogEntry>>,
    idle_timeout: Duration,
}

#[derive(Default)]
struct CatalogEntry {
    screen: Screen<Arc<Vec<Product>>>,
    snapshot: Option<Arc<Vec<Product>>>,
    touched: Option<Instant>,
}

impl ProductCatalog {
    /// Entries untouched for `idle_timeout` are dropped on the next load.
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub async fn revalidate(
        &self,
        api: &ApiClient,
        ctx: &UpstreamContext,
    ) -> Result<Arc<Vec<Product>>, ApiError> {
        let Some(session_id) = ctx.session_id else {
            return api
                .list::<Product>(Resource::Products, ctx)
                .await
                .map(Arc::new);
        };

        let ticket = {
            let mut sessions = self.sessions.write().await;
            let idle_timeout = self.idle_timeout;
            sessions.retain(|_, entry| {
                entry
                    .touched
                    .map_or(true, |touched| touched.elapsed() < idle_timeout)
            });
            let entry = sessions.entry(session_id).or_default();
            entry.touched = Some(Instant::now());
            entry.screen.begin_load()
        };

        let result = api.list::<Product>(Resource::Products, ctx).await;

        let mut sessions = self.sessions.write().await;
        let entry = sessions.entry(session_id).or_default();
        match result {
            Ok(products) => {
                let products = Arc::new(products);
                if entry.screen.complete(ticket, Ok(products.clone())) {
                    entry.snapshot = Some(products.clone());
                    return Ok(products);
                }
                tracing::debug!("Discarding product list from a superseded fetch");
                // A newer load already landed; hand back what the screen shows.
                match entry.screen.state() {
                    ScreenState::Ready { data } => Ok(data.clone()),
                    _ => Ok(products),
                }
            }
            Err(err) => {
                entry.screen.complete(
                    ticket,
                    Err(err.user_message("No se pudieron cargar los productos")),
                );
                Err(err)
            }
        }
    }

    /// Last product list that loaded for this session, if any.
    pub async fn snapshot(&self, session_id: Option<Id>) -> Option<Arc<Vec<Product>>> {
        let session_id = session_id?;
        self.sessions
            .read()
            .await
            .get(&session_id)
            .and_then(|entry| entry.snapshot.clone())
    }

    pub async fn snapshot_or_fetch(
        &self,
        api: &ApiClient,
        ctx: &UpstreamContext,
    ) -> Result<Arc<Vec<Product>>, ApiError> {
        match self.snapshot(ctx.session_id).await {
            Some(products) => Ok(products),
            None => self.revalidate(api, ctx).await,
        }
    }

    /// Drops whatever was cached for a session that is ending.
    pub async fn forget(&self, session_id: Option<Id>) {
        if let Some(session_id) = session_id {
            self.sessions.write().await.remove(&session_id);
        }
    }
}

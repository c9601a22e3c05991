use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower_sessions::session::Id;

use crate::cart::Cart;
use crate::models::TransactionKind;

/// Carts of one kind, one per BFF session.
///
/// Each cart sits behind its own lock: a request holds it from read to write, so concurrent
/// requests of one session apply their changes one after another.
pub struct CartStore<K> {
    sessions: Mutex<HashMap<Id, Slot<K>>>,
    idle_timeout: Duration,
}

struct Slot<K> {
    cart: Arc<Mutex<Cart<K>>>,
    touched: Instant,
}

impl<K: TransactionKind> CartStore<K> {
    /// Carts untouched for `idle_timeout` are dropped on the next access.
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub async fn lock(&self, session_id: Id) -> OwnedMutexGuard<Cart<K>> {
        let cart = {
            let mut sessions = self.sessions.lock().await;
            let idle_timeout = self.idle_timeout;
            sessions.retain(|id, slot| *id == session_id || slot.touched.elapsed() < idle_timeout);
            let slot = sessions.entry(session_id).or_insert_with(|| Slot {
                cart: Arc::new(Mutex::new(Cart::new())),
                touched: Instant::now(),
            });
            slot.touched = Instant::now();
            slot.cart.clone()
        };
        cart.lock_owned().await
    }

    pub async fn forget(&self, session_id: Option<Id>) {
        if let Some(session_id) = session_id {
            self.sessions.lock().await.remove(&session_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Product, Purchase};

    fn catalog() -> Vec<Product> {
        vec![Product {
            id: 1,
            code: "00001".into(),
            name: "Cuaderno".into(),
            description: String::new(),
            price: 1.0,
            stock: 10,
            category_id: None,
            supplier_id: None,
        }]
    }

    #[tokio::test]
    async fn carts_belong_to_one_session() {
        let store = CartStore::<Purchase>::new(Duration::from_secs(60));
        let (first, second) = (Id::default(), Id::default());

        store
            .lock(first)
            .await
            .add(&catalog(), 1, 2, Some(1.5))
            .unwrap();

        assert_eq!(store.lock(first).await.items().len(), 1);
        assert!(store.lock(second).await.is_empty());

        store.forget(Some(first)).await;
        assert!(store.lock(first).await.is_empty());
    }

    #[tokio::test]
    async fn writers_of_one_session_take_turns() {
        let store = Arc::new(CartStore::<Purchase>::new(Duration::from_secs(60)));
        let session_id = Id::default();

        let tasks: Vec<_> = (0..20)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    let mut cart = store.lock(session_id).await;
                    tokio::task::yield_now().await;
                    cart.add(&catalog(), 1, 1, Some(n as f64)).unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.lock(session_id).await.items().len(), 20);
    }

    #[tokio::test]
    async fn idle_carts_are_dropped() {
        let store = CartStore::<Purchase>::new(Duration::ZERO);
        let (stale, fresh) = (Id::default(), Id::default());

        store
            .lock(stale)
            .await
            .add(&catalog(), 1, 1, Some(1.0))
            .unwrap();
        drop(store.lock(fresh).await);

        assert!(store.lock(stale).await.is_empty());
    }
}

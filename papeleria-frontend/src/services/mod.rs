pub mod api_client;
pub mod auth_client;
pub mod cart_store;
pub mod catalog;

pub use api_client::{ApiClient, ApiError, UpstreamContext};
pub use auth_client::AuthClient;
pub use cart_store::CartStore;
pub use catalog::ProductCatalog;

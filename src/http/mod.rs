//! HTTP transport - maps REST requests onto a [`CoffeeStore`].
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /coffees` - list every coffee.
//! - `GET /coffee/:id` - one coffee, with `Location` and `ETag` headers.
//! - `POST /coffee` - create from `{ "name": ... }`.
//! - `PUT /coffee/:id` - rename; `If-Match: <version>` is mandatory.
//! - `DELETE /coffee/:id` - remove.
//! - `GET /health` - `{ "ok": true, "coffees": <count> }`.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use coffeehouse::{http, InMemoryCoffeeStore};
//!
//! let store = Arc::new(InMemoryCoffeeStore::new());
//! let app = http::router(store.clone());
//!
//! // Or serve directly until Ctrl-C
//! http::serve(store, "0.0.0.0:5000", async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await?;
//! ```

mod error;
mod handlers;

use std::future::Future;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::error::StoreError;
use crate::store::CoffeeStore;

pub use error::ApiError;

/// Shared handler state: the store behind a trait object.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn CoffeeStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CoffeeStore>) -> Self {
        Self { store }
    }

    /// Run a store operation off the async reactor.
    ///
    /// Store calls are synchronous and may hit disk.
    async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn CoffeeStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| ApiError::Store(format!("store task failed: {}", e)))?
            .map_err(ApiError::from)
    }
}

/// Build an axum `Router` serving the coffee collection from `store`.
pub fn router(store: Arc<dyn CoffeeStore>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/coffees", get(handlers::list_coffees))
        .route("/coffee", axum::routing::post(handlers::create_coffee))
        .route(
            "/coffee/:id",
            get(handlers::get_coffee)
                .put(handlers::update_coffee)
                .delete(handlers::delete_coffee),
        )
        .with_state(AppState::new(store))
}

/// Serve the collection over HTTP at the given address (e.g. `"0.0.0.0:5000"`)
/// until `shutdown` resolves; in-flight requests are allowed to finish.
pub async fn serve<F>(
    store: Arc<dyn CoffeeStore>,
    addr: &str,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("shut down");
    Ok(())
}

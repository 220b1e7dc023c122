pub mod auth;
pub mod blobs;
pub mod credentials;
pub mod documents;
pub mod error;
pub mod middleware;
pub mod password;
pub mod posts;
pub mod routes;
pub mod state;
pub mod visibility;

use error::StoreError;

/// Runs blocking database or hashing work off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

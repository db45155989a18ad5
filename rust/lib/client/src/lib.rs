//! Authenticated request gateway for the storefront backend.
//!
//! Every backend call goes through [`Gateway`]. It attaches the bearer
//! credential from the shared [`CredentialStore`], unwraps the
//! `{message, data}` envelope, and recovers from an expired credential by
//! refreshing it once (single-flight across concurrent callers) and
//! replaying the failed request once.
//!
//! # Usage
//!
//! ```ignore
//! use shopfront_client::{CredentialStore, FileStorage, Gateway};
//!
//! let storage = Arc::new(FileStorage::new("/home/me/.shopfront/credentials.toml"));
//! let credentials = Arc::new(CredentialStore::open(storage)?);
//! let gateway = Gateway::connect(&config, credentials)?;
//!
//! let orders: Vec<Order> = gateway.get("/api/v1/orders").await?.into_result()?;
//! ```

pub mod auth;
pub mod credential;
pub mod error;
pub mod gateway;
pub mod refresh;
pub mod resource;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::AuthApi;
pub use credential::{
    CredentialStore, FileStorage, MemoryStorage, StorageError, TokenStorage, ACCESS_TOKEN_KEY,
};
pub use error::ApiError;
pub use gateway::{Gateway, Reply};
pub use refresh::RefreshCoordinator;
pub use resource::ResourceClient;
pub use transport::{ApiRequest, HttpTransport, RawResponse, Transport};

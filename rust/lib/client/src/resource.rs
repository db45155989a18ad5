use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use shopfront_core::{Page, PageQuery};

use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::transport::ApiRequest;

/// Typed CRUD client for one REST collection, e.g. `/api/v1/products`.
///
/// Backend refusals are turned into [`ApiError::Rejected`] so callers can
/// use `?` and still read the message.
pub struct ResourceClient<T> {
    gateway: Arc<Gateway>,
    path: String,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> ResourceClient<T> {
    pub fn new(gateway: Arc<Gateway>, path: impl Into<String>) -> Self {
        Self {
            gateway,
            path: path.into().trim_end_matches('/').to_string(),
            _phantom: PhantomData,
        }
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, id)
    }

    /// One page of the collection.
    pub async fn list(&self, page: PageQuery) -> Result<Page<T>, ApiError> {
        let request = ApiRequest::get(self.path.clone()).page(page);
        self.gateway.send(request).await?.into_result()
    }

    pub async fn get(&self, id: &str) -> Result<T, ApiError> {
        self.gateway.get(&self.item_path(id)).await?.into_result()
    }

    pub async fn create(&self, item: &T) -> Result<T, ApiError> {
        self.gateway.post(&self.path, item).await?.into_result()
    }

    pub async fn update(&self, id: &str, item: &T) -> Result<T, ApiError> {
        self.gateway.put(&self.item_path(id), item).await?.into_result()
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.gateway
            .delete::<serde_json::Value>(&self.item_path(id))
            .await?
            .into_result()
            .map(|_| ())
    }
}

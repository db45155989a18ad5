//! Single-flight credential refresh.
//!
//! At most one refresh call is in flight at any time. The first caller of
//! [`RefreshCoordinator::refresh`] starts it; callers arriving while it runs
//! await the same shared future and get the same result. The slot is
//! emptied once the episode settles, so the next expiry starts a new one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Deserialize;
use shopfront_core::Envelope;
use tracing::{debug, info, warn};

use crate::credential::CredentialStore;
use crate::transport::{ApiRequest, Transport};

type RefreshFuture = Shared<BoxFuture<'static, Option<String>>>;

/// `data` payload of the login and refresh endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenGrant {
    pub access_token: String,
}

struct Episode {
    id: u64,
    future: RefreshFuture,
}

pub struct RefreshCoordinator {
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialStore>,
    path: String,
    inflight: Mutex<Option<Episode>>,
    started: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<CredentialStore>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            credentials,
            path: path.into(),
            inflight: Mutex::new(None),
            started: AtomicU64::new(0),
        }
    }

    /// Refresh the credential, or join the refresh already running.
    ///
    /// Returns the new token, or `None` if the refresh endpoint failed for
    /// any reason. On `None` the credential store is left untouched.
    pub async fn refresh(&self) -> Option<String> {
        let (id, future) = self.join_or_start();
        let token = future.await;
        self.settle(id);
        token
    }

    /// Number of refresh calls started since construction.
    pub fn episodes(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    /// True while a refresh is in flight.
    pub fn in_flight(&self) -> bool {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn join_or_start(&self) -> (u64, RefreshFuture) {
        let mut slot = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(ref episode) = *slot {
            debug!(episode = episode.id, "joining in-flight credential refresh");
            return (episode.id, episode.future.clone());
        }

        let id = self.started.fetch_add(1, Ordering::Relaxed) + 1;
        info!(episode = id, "starting credential refresh");
        let future = refresh_once(
            Arc::clone(&self.transport),
            Arc::clone(&self.credentials),
            ApiRequest::get(self.path.clone()).anonymous(),
        )
        .boxed()
        .shared();
        *slot = Some(Episode {
            id,
            future: future.clone(),
        });
        (id, future)
    }

    fn settle(&self, id: u64) {
        let mut slot = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|episode| episode.id == id) {
            *slot = None;
        }
    }
}

/// One call to the refresh endpoint. The bearer header is never sent; the
/// transport's cookie jar carries the refresh cookie.
async fn refresh_once(
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialStore>,
    request: ApiRequest,
) -> Option<String> {
    let response = match transport.execute(&request, None).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "credential refresh failed");
            return None;
        }
    };

    if !response.status.is_success() {
        warn!(status = response.status.as_u16(), "credential refresh rejected");
        return None;
    }

    let grant = Envelope::parse(&response.body).and_then(|env| env.into_data::<TokenGrant>().ok());
    let token = match grant {
        Some(grant) if !grant.access_token.is_empty() => grant.access_token,
        _ => {
            warn!("credential refresh response carried no access_token");
            return None;
        }
    };

    // Store before resolving: every send after this point sees the new token.
    if let Err(e) = credentials.set(token.clone()) {
        warn!(error = %e, "refreshed credential not persisted");
    }
    info!("credential refreshed");
    Some(token)
}

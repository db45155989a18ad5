//! The request gateway: single entry point for backend calls.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shopfront_core::{Envelope, ServiceConfig};
use tracing::{debug, warn};

use crate::credential::CredentialStore;
use crate::error::ApiError;
use crate::refresh::RefreshCoordinator;
use crate::transport::{ApiRequest, HttpTransport, RawResponse, Transport};

// ── Reply ───────────────────────────────────────────────────────────

/// Outcome of a call that reached the backend.
///
/// Transport failures and unrecoverable 401s are `Err(ApiError)`; an
/// application-level refusal is a value, so the caller can show its
/// `message`.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    /// 2xx: the envelope's `data`, unwrapped.
    Data(T),
    /// Non-401 error status with an envelope body.
    Rejected { status: StatusCode, envelope: Envelope },
}

impl<T> Reply<T> {
    /// Collapse a rejection into [`ApiError::Rejected`].
    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            Reply::Data(data) => Ok(data),
            Reply::Rejected { status, envelope } => Err(ApiError::Rejected {
                status: status.as_u16(),
                message: envelope.message,
            }),
        }
    }

    pub fn data(self) -> Option<T> {
        match self {
            Reply::Data(data) => Some(data),
            Reply::Rejected { .. } => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Reply::Rejected { .. })
    }
}

// ── Gateway ─────────────────────────────────────────────────────────

pub struct Gateway {
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialStore>,
    refresher: RefreshCoordinator,
}

impl Gateway {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<CredentialStore>,
        refresh_path: impl Into<String>,
    ) -> Self {
        let refresher =
            RefreshCoordinator::new(Arc::clone(&transport), Arc::clone(&credentials), refresh_path);
        Self {
            transport,
            credentials,
            refresher,
        }
    }

    /// Gateway over HTTP for the configured server.
    pub fn connect(
        config: &ServiceConfig,
        credentials: Arc<CredentialStore>,
    ) -> Result<Self, ApiError> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::new(transport, credentials, config.auth.refresh.clone()))
    }

    /// Like [`Gateway::connect`], with the cookie jar (and so the refresh
    /// cookie) persisted at `cookie_jar`.
    pub fn connect_with_cookie_jar(
        config: &ServiceConfig,
        credentials: Arc<CredentialStore>,
        cookie_jar: impl Into<PathBuf>,
    ) -> Result<Self, ApiError> {
        let transport = Arc::new(HttpTransport::with_cookie_jar(config, cookie_jar)?);
        Ok(Self::new(transport, credentials, config.auth.refresh.clone()))
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.refresher
    }

    /// Send a request and unwrap the envelope.
    ///
    /// A 401 on a request that carried a credential triggers one refresh
    /// (shared with any concurrent caller) and one replay. Anonymous 401s
    /// and a 401 on the replay are returned as [`ApiError::Unauthorized`].
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Reply<T>, ApiError> {
        let sent_with = if request.anonymous {
            None
        } else {
            self.credentials.get()
        };
        let response = self.transport.execute(&request, sent_with.as_deref()).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return settle(response);
        }

        let Some(stale) = sent_with else {
            debug!(method = %request.method, path = %request.path, "unauthorized without credential");
            return Err(unauthorized(&response));
        };

        // Someone else may have refreshed while this request was in flight.
        let fresh = match self.credentials.get() {
            Some(current) if current != stale => Some(current),
            _ => self.refresher.refresh().await,
        };
        let Some(fresh) = fresh else {
            warn!(method = %request.method, path = %request.path, "credential refresh failed, giving up");
            return Err(unauthorized(&response));
        };

        debug!(method = %request.method, path = %request.path, "replaying with refreshed credential");
        let replay = self.transport.execute(&request, Some(&fresh)).await?;
        settle(replay)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Reply<T>, ApiError> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Reply<T>, ApiError> {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Reply<T>, ApiError> {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Reply<T>, ApiError> {
        self.send(ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Reply<T>, ApiError> {
        self.send(ApiRequest::delete(path)).await
    }
}

/// Map a final response (no more retries) to a reply.
fn settle<T: DeserializeOwned>(response: RawResponse) -> Result<Reply<T>, ApiError> {
    let status = response.status;

    if status.is_success() {
        let envelope = Envelope::parse(&response.body).ok_or_else(|| {
            ApiError::Decode(format!("HTTP {} body is not an envelope", status.as_u16()))
        })?;
        return envelope
            .into_data()
            .map(Reply::Data)
            .map_err(|e| ApiError::Decode(format!("response data: {}", e)));
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(unauthorized(&response));
    }

    let has_body = !response.body.iter().all(u8::is_ascii_whitespace);
    match Envelope::parse(&response.body) {
        Some(envelope) if has_body => Ok(Reply::Rejected { status, envelope }),
        _ => Err(ApiError::Server {
            status: status.as_u16(),
            body: response.text(),
        }),
    }
}

fn unauthorized(response: &RawResponse) -> ApiError {
    let message = Envelope::parse(&response.body)
        .map(|env| env.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| response.text());
    ApiError::Unauthorized { message }
}

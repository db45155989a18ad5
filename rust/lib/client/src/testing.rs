//! In-process fake of the storefront backend for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;

use crate::error::ApiError;
use crate::transport::{ApiRequest, RawResponse, Transport};

/// Accepts exactly one bearer token (the one its refresh endpoint hands
/// out) and records every call it receives.
pub(crate) struct FakeBackend {
    token: String,
    refresh_denied: bool,
    network_down: bool,
    refresh_delay: Duration,
    refresh_calls: AtomicUsize,
    seen: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeBackend {
    pub const REFRESH_PATH: &'static str = "/api/v1/auth/refresh";
    pub const ORDERS_PATH: &'static str = "/api/v1/orders";

    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            refresh_denied: false,
            network_down: false,
            refresh_delay: Duration::ZERO,
            refresh_calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn with_refresh_denied(mut self) -> Self {
        self.refresh_denied = true;
        self
    }

    pub fn with_network_down(mut self) -> Self {
        self.network_down = true;
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// `(path, bearer)` of every request, in arrival order.
    pub fn seen(&self) -> Vec<(String, Option<String>)> {
        self.seen.lock().unwrap().clone()
    }

    /// Bearers sent to a given path, in arrival order.
    pub fn bearers_for(&self, path: &str) -> Vec<Option<String>> {
        self.seen()
            .into_iter()
            .filter(|(p, _)| p == path)
            .map(|(_, b)| b)
            .collect()
    }
}

fn reply(status: StatusCode, body: serde_json::Value) -> RawResponse {
    RawResponse::new(status, body.to_string())
}

#[async_trait::async_trait]
impl Transport for FakeBackend {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, ApiError> {
        self.seen
            .lock()
            .unwrap()
            .push((request.path.clone(), bearer.map(str::to_string)));

        if self.network_down {
            return Err(ApiError::network("connection refused"));
        }

        if request.path == Self::REFRESH_PATH {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if !self.refresh_delay.is_zero() {
                tokio::time::sleep(self.refresh_delay).await;
            }
            if self.refresh_denied {
                return Ok(reply(
                    StatusCode::UNAUTHORIZED,
                    json!({"message": "refresh token expired"}),
                ));
            }
            return Ok(reply(
                StatusCode::OK,
                json!({"message": "ok", "data": {"access_token": self.token}}),
            ));
        }

        match request.path.as_str() {
            "/api/v1/public/sliders" => Ok(reply(
                StatusCode::OK,
                json!({"message": "ok", "data": ["spring-sale"]}),
            )),
            "/api/v1/vouchers/apply" => Ok(reply(
                StatusCode::BAD_REQUEST,
                json!({"message": "Voucher expired", "data": null}),
            )),
            "/api/v1/broken" => Ok(RawResponse::new(
                StatusCode::BAD_GATEWAY,
                "<html>Bad Gateway</html>",
            )),
            "/api/v1/always-401" => Ok(reply(
                StatusCode::UNAUTHORIZED,
                json!({"message": "account locked"}),
            )),
            _ if bearer == Some(self.token.as_str()) => Ok(reply(
                StatusCode::OK,
                json!({"message": "ok", "data": [{"id": 1}, {"id": 2}]}),
            )),
            _ => Ok(reply(
                StatusCode::UNAUTHORIZED,
                json!({"message": "token expired"}),
            )),
        }
    }
}

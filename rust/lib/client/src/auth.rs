//! Login / logout against the backend auth endpoints.

use std::sync::Arc;

use serde::Serialize;
use shopfront_core::AuthPaths;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::refresh::TokenGrant;
use crate::transport::ApiRequest;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Writes the credential store at the session boundaries: login, OAuth
/// callback, logout.
pub struct AuthApi {
    gateway: Arc<Gateway>,
    paths: AuthPaths,
}

impl AuthApi {
    pub fn new(gateway: Arc<Gateway>, paths: AuthPaths) -> Self {
        Self { gateway, paths }
    }

    /// Password login. Stores the returned access token; the backend also
    /// sets the refresh cookie on the transport.
    ///
    /// Bad credentials come back as [`ApiError::Rejected`] or
    /// [`ApiError::Unauthorized`] carrying the backend message.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let request = ApiRequest::post(self.paths.login.clone())
            .json(&LoginRequest { email, password })?
            .anonymous();
        let grant: TokenGrant = self.gateway.send(request).await?.into_result()?;
        if grant.access_token.is_empty() {
            return Err(ApiError::Decode("login response carried no access_token".into()));
        }
        self.gateway.credentials().set(grant.access_token)?;
        info!(email, "logged in");
        Ok(())
    }

    /// OAuth callback: the provider redirect hands over the token directly.
    pub fn accept_oauth_token(&self, token: &str) -> Result<(), ApiError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ApiError::Decode("empty OAuth token".into()));
        }
        self.gateway.credentials().set(token)?;
        info!("logged in via OAuth callback");
        Ok(())
    }

    /// Tell the backend to drop the session, then forget the credential.
    ///
    /// The local credential is cleared even when the backend call fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self
            .gateway
            .send::<serde_json::Value>(ApiRequest::post(self.paths.logout.clone()))
            .await;
        match result {
            Ok(reply) if reply.is_rejected() => warn!("logout rejected by backend"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "logout call failed"),
        }
        self.gateway.credentials().clear()?;
        info!("logged out");
        Ok(())
    }
}

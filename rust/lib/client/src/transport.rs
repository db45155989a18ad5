//! Raw HTTP transport behind the gateway.

use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};

use bytes::Bytes;
use cookie_store::CookieStore;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, SET_COOKIE};
use reqwest::{Method, StatusCode};
use reqwest_cookie_store::CookieStoreMutex;
use serde::Serialize;
use serde_json::Value;
use shopfront_core::{PageQuery, ServiceConfig};
use tracing::warn;

use crate::credential::StorageError;
use crate::error::ApiError;

/// Description of one outbound call. Cloneable so it can be replayed.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the server URL, e.g. `/api/v1/orders`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    /// Never attach the stored credential (login, refresh).
    pub anonymous: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            anonymous: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn page(mut self, page: PageQuery) -> Self {
        self.query.extend(page.to_pairs());
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Decode(format!("request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// Status and body of a response, before envelope handling.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body as lossy UTF-8, for error messages.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Underlying transport. Only transport failures are errors here; any HTTP
/// status, 401 included, is a successful `RawResponse`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, ApiError>;
}

/// reqwest-backed transport.
///
/// Keeps a cookie jar so the HTTP-only refresh cookie set at login is sent
/// back on the refresh call. With [`HttpTransport::with_cookie_jar`] the jar
/// is loaded from and saved to a JSON file, so the refresh cookie outlives
/// the process.
pub struct HttpTransport {
    http: reqwest::Client,
    service: ServiceConfig,
    jar: Arc<CookieStoreMutex>,
    jar_path: Option<PathBuf>,
}

impl HttpTransport {
    /// Transport with an in-memory cookie jar.
    pub fn new(config: &ServiceConfig) -> Result<Self, ApiError> {
        Self::build(config, CookieStore::default(), None)
    }

    /// Transport whose cookie jar is persisted at `path`. A missing file
    /// starts an empty jar.
    pub fn with_cookie_jar(config: &ServiceConfig, path: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let path = path.into();
        let store = match std::fs::File::open(&path) {
            Ok(file) => cookie_store::serde::json::load_all(BufReader::new(file))
                .map_err(|e| ApiError::Storage(StorageError::Format(e.to_string())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CookieStore::default(),
            Err(e) => return Err(ApiError::Storage(StorageError::Io(e))),
        };
        Self::build(config, store, Some(path))
    }

    fn build(config: &ServiceConfig, store: CookieStore, jar_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let jar = Arc::new(CookieStoreMutex::new(store));
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            service: config.clone(),
            jar,
            jar_path,
        })
    }

    /// Write the jar to its file. Session cookies are kept: the refresh
    /// cookie is usually one.
    fn save_jar(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = Vec::new();
        {
            let store = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
            cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut out)
                .map_err(|e| StorageError::Format(e.to_string()))?;
        }
        std::fs::write(path, out)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, ApiError> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.service.api_url(&request.path))
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let cookies_changed = resp.headers().contains_key(SET_COOKIE);
        let body = resp.bytes().await?;

        if let (true, Some(path)) = (cookies_changed, self.jar_path.as_deref()) {
            if let Err(e) = self.save_jar(path) {
                warn!(path = %path.display(), error = %e, "failed to save cookie jar");
            }
        }
        Ok(RawResponse { status, body })
    }
}

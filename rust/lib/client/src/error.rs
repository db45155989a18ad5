use crate::credential::StorageError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Client-side API error.
///
/// Application-level refusals (a non-401 error response carrying an
/// envelope) are NOT errors at the gateway level; they come back as
/// [`Reply::Rejected`](crate::Reply::Rejected). `Rejected` here only
/// appears once a caller converts a reply with `into_result()`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Backend unreachable: connect, DNS, TLS or timeout failure.
    #[error("network: {0}")]
    Network(BoxError),

    /// HTTP 401 that could not be recovered by a refresh.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Backend refused the request with an envelope message.
    #[error("HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Error response without an envelope body.
    #[error("HTTP {status}: {body}")]
    Server { status: u16, body: String },

    #[error("decode: {0}")]
    Decode(String),

    #[error("credential storage: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn network(err: impl Into<BoxError>) -> Self {
        ApiError::Network(err.into())
    }

    /// True when the caller should send the user back to login.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(Box::new(err))
    }
}

pub mod config;
pub mod envelope;
pub mod error;
pub mod types;

pub use config::{AuthPaths, NotificationConfig, RealtimeConfig, ServiceConfig};
pub use envelope::Envelope;
pub use error::ConfigError;
pub use types::{Page, PageQuery};

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Client configuration for one storefront backend.
///
/// Every field has a default, so a TOML file only needs the keys it
/// overrides:
///
/// ```toml
/// server = "https://shop.example.com"
///
/// [realtime]
/// reconnect_delay_ms = 2000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Backend base URL (e.g. "http://localhost:8080").
    pub server: String,

    /// Per-request timeout for the HTTP transport.
    pub timeout_secs: u64,

    pub auth: AuthPaths,

    pub notifications: NotificationConfig,

    pub realtime: RealtimeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthPaths {
    pub login: String,
    pub logout: String,
    /// Relies on the HTTP-only refresh cookie, never the bearer header.
    pub refresh: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub path: String,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// WebSocket endpoint path, appended to the server URL.
    pub ws_path: String,
    /// Administrative order events.
    pub admin_topic: String,
    /// End-user order events.
    pub user_topic: String,
    /// Flat delay between reconnection attempts.
    pub reconnect_delay_ms: u64,
    pub heartbeat_outgoing_ms: u64,
    pub heartbeat_incoming_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:8080".to_string(),
            timeout_secs: 30,
            auth: AuthPaths::default(),
            notifications: NotificationConfig::default(),
            realtime: RealtimeConfig::default(),
        }
    }
}

impl Default for AuthPaths {
    fn default() -> Self {
        Self {
            login: "/api/v1/auth/login".to_string(),
            logout: "/api/v1/auth/logout".to_string(),
            refresh: "/api/v1/auth/refresh".to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            path: "/api/v1/notifications".to_string(),
            page_size: 10,
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            ws_path: "/ws".to_string(),
            admin_topic: "/topic/admin/orders".to_string(),
            user_topic: "/user/queue/orders".to_string(),
            reconnect_delay_ms: 5000,
            heartbeat_outgoing_ms: 4000,
            heartbeat_incoming_ms: 4000,
        }
    }
}

impl ServiceConfig {
    /// Build a default config pointing at `server`.
    pub fn for_server(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Default::default()
        }
    }

    /// Load config from a TOML file, or return defaults if it doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Absolute URL for an API path.
    pub fn api_url(&self, path: &str) -> String {
        join_url(&self.server, path)
    }

    /// WebSocket URL of the realtime endpoint (`http` → `ws`, `https` → `wss`).
    pub fn websocket_url(&self) -> Result<String, ConfigError> {
        let server = self.server.trim_end_matches('/');
        let base = if let Some(rest) = server.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = server.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            return Err(ConfigError::InvalidServer(self.server.clone()));
        };
        Ok(join_url(&base, &self.realtime.ws_path))
    }
}

impl RealtimeConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

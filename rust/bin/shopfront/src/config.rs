//! Client-side context management.
//!
//! Reads/writes `~/.shopfront/config.toml`. Access tokens live next to it in
//! `credentials/<context>.toml`, one file per context, and each context's
//! cookie jar (holding the refresh cookie) in `credentials/<context>.cookies.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shopfront_core::ServiceConfig;

/// A single context: connection to one storefront backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Context name (e.g. "staging").
    pub name: String,

    /// Server URL (e.g. "http://localhost:8080").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    /// Optional service config TOML overriding endpoint paths and timings.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_config: String,
}

impl Context {
    /// Service config for this context: the optional file, with `server`
    /// taken from the context.
    pub fn service(&self) -> anyhow::Result<ServiceConfig> {
        if self.server.is_empty() {
            anyhow::bail!(
                "No server URL set for context \"{}\". Run `shopfront context set {} --server <url>`.",
                self.name,
                self.name
            );
        }
        let mut service = if self.service_config.is_empty() {
            ServiceConfig::default()
        } else {
            ServiceConfig::load(Path::new(&self.service_config))?
        };
        service.server = self.server.clone();
        Ok(service)
    }
}

/// Client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name of the currently active context.
    #[serde(rename = "current-context", default)]
    pub current_context: String,

    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl ClientConfig {
    /// Default config file path: ~/.shopfront/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn current(&self) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == self.current_context)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Add or update a context.
    pub fn upsert_context(&mut self, ctx: Context) {
        if let Some(existing) = self.get_mut(&ctx.name) {
            *existing = ctx;
        } else {
            self.contexts.push(ctx);
        }
    }

    /// Remove a context by name. Returns true if it was found.
    pub fn remove_context(&mut self, name: &str) -> bool {
        let len = self.contexts.len();
        self.contexts.retain(|c| c.name != name);
        if self.current_context == name {
            self.current_context = String::new();
        }
        self.contexts.len() < len
    }
}

/// Context names become file names under `credentials/`.
pub fn validate_context_name(name: &str) -> anyhow::Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid {
        anyhow::bail!(
            "Invalid context name \"{}\": use letters, digits, '-', '_' or '.'.",
            name
        );
    }
    Ok(())
}

fn credentials_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("credentials")
}

/// Token file for a context, next to the client config file.
pub fn credentials_path(config_path: &Path, context: &str) -> PathBuf {
    credentials_dir(config_path).join(format!("{}.toml", context))
}

/// Cookie jar for a context, next to its token file.
pub fn cookie_jar_path(config_path: &Path, context: &str) -> PathBuf {
    credentials_dir(config_path).join(format!("{}.cookies.json", context))
}

/// Return the shopfront config directory (~/.shopfront).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".shopfront")
}

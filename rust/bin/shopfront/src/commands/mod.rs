//! Subcommand implementations.

pub mod context;
pub mod login;
pub mod notifications;
pub mod resource;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use shopfront_client::{ApiError, CredentialStore, FileStorage, Gateway};
use shopfront_core::ServiceConfig;

use crate::config::{self, ClientConfig, Context};

/// Everything a command needs to talk to the current context's backend.
pub struct Session {
    pub context: Context,
    pub service: ServiceConfig,
    pub credentials: Arc<CredentialStore>,
    pub gateway: Arc<Gateway>,
}

impl Session {
    pub fn open(client_config_path: &Path) -> Result<Self> {
        let config = ClientConfig::load(client_config_path)?;
        let context = config
            .current()
            .ok_or_else(|| anyhow::anyhow!("No current context. Run `shopfront use context <name>`."))?
            .clone();
        config::validate_context_name(&context.name)?;
        let service = context.service()?;

        let storage = FileStorage::new(config::credentials_path(client_config_path, &context.name));
        let credentials = Arc::new(CredentialStore::open(Arc::new(storage))?);
        let gateway = Arc::new(Gateway::connect_with_cookie_jar(
            &service,
            Arc::clone(&credentials),
            config::cookie_jar_path(client_config_path, &context.name),
        )?);

        Ok(Self {
            context,
            service,
            credentials,
            gateway,
        })
    }
}

/// Add a login hint to credential failures.
pub fn explain(err: ApiError) -> anyhow::Error {
    if err.is_unauthorized() {
        anyhow::anyhow!("{}. Run `shopfront login`.", err)
    } else {
        err.into()
    }
}

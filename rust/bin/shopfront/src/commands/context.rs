//! Context management commands.

use std::path::Path;

use anyhow::Result;

use crate::config::{cookie_jar_path, credentials_path, validate_context_name, ClientConfig, Context};

/// Register a new context; the first one becomes current.
pub fn create(
    name: &str,
    server: &str,
    service_config: Option<&str>,
    client_config_path: &Path,
) -> Result<()> {
    validate_context_name(name)?;
    let mut config = ClientConfig::load(client_config_path)?;
    if config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!("Context \"{}\" already exists. Use `shopfront context set`.", name);
    }

    let ctx = Context {
        name: name.to_string(),
        server: server.to_string(),
        service_config: service_config.unwrap_or_default().to_string(),
    };
    // Fail early on a bad service config or server URL.
    ctx.service()?.websocket_url()?;

    config.upsert_context(ctx);
    if config.current_context.is_empty() {
        config.current_context = name.to_string();
    }
    config.save(client_config_path)?;

    println!("Context \"{}\" created.", name);
    println!("  Server: {}", server);
    Ok(())
}

/// List all contexts.
pub fn list(client_config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("Run: shopfront context create <name> --server <url>");
        return Ok(());
    }

    println!("{:2} {:20} {:40} {:12}", "", "NAME", "SERVER", "SERVICE CONFIG");
    for ctx in &config.contexts {
        let marker = if ctx.name == config.current_context {
            "*"
        } else {
            " "
        };
        let server = if ctx.server.is_empty() { "-" } else { &ctx.server };
        let service = if ctx.service_config.is_empty() {
            "-"
        } else {
            &ctx.service_config
        };
        println!("{:2} {:20} {:40} {:12}", marker, ctx.name, server, service);
    }

    Ok(())
}

/// Set properties on an existing context.
pub fn set(
    name: &str,
    server: Option<&str>,
    service_config: Option<&str>,
    client_config_path: &Path,
) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;
    let ctx = config
        .get_mut(name)
        .ok_or_else(|| anyhow::anyhow!("Context \"{}\" not found.", name))?;

    if let Some(server) = server {
        ctx.server = server.to_string();
    }
    if let Some(path) = service_config {
        ctx.service_config = path.to_string();
    }
    config.save(client_config_path)?;
    println!("Context \"{}\" updated.", name);
    Ok(())
}

/// Delete a context, its stored token and its cookie jar.
pub fn delete(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;
    if !config.remove_context(name) {
        anyhow::bail!("Context \"{}\" not found.", name);
    }
    config.save(client_config_path)?;

    for file in [
        credentials_path(client_config_path, name),
        cookie_jar_path(client_config_path, name),
    ] {
        if file.exists() {
            std::fs::remove_file(&file)?;
        }
    }
    println!("Context \"{}\" deleted.", name);
    Ok(())
}

/// Switch current context.
pub fn use_context(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!(
            "Context \"{}\" not found. Run `shopfront context list` to see available contexts.",
            name
        );
    }

    config.current_context = name.to_string();
    config.save(client_config_path)?;
    println!("Switched to context \"{}\".", name);
    Ok(())
}

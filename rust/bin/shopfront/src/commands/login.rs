//! Login / logout commands.

use std::path::Path;

use anyhow::Result;
use shopfront_client::AuthApi;

use super::Session;

/// Password login against the current context's server.
pub async fn login(email: &str, password: &str, client_config_path: &Path) -> Result<()> {
    let session = Session::open(client_config_path)?;
    let auth = AuthApi::new(session.gateway.clone(), session.service.auth.clone());

    auth.login(email, password)
        .await
        .map_err(|e| anyhow::anyhow!("Login failed: {}", e))?;

    println!("Logged in as {}.", email);
    println!("Token saved for context \"{}\".", session.context.name);
    Ok(())
}

/// Store a token handed over by an OAuth provider redirect.
pub fn login_with_token(token: &str, client_config_path: &Path) -> Result<()> {
    let session = Session::open(client_config_path)?;
    let auth = AuthApi::new(session.gateway.clone(), session.service.auth.clone());
    auth.accept_oauth_token(token)?;
    println!("Token saved for context \"{}\".", session.context.name);
    Ok(())
}

/// Logout: tell the server, then forget the local token either way.
pub async fn logout(client_config_path: &Path) -> Result<()> {
    let session = Session::open(client_config_path)?;
    if !session.credentials.is_authenticated() {
        println!("Not logged in to context \"{}\".", session.context.name);
        return Ok(());
    }
    let auth = AuthApi::new(session.gateway.clone(), session.service.auth.clone());
    auth.logout().await?;
    println!("Logged out from context \"{}\".", session.context.name);
    Ok(())
}

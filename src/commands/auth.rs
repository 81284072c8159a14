//! Session command handlers.
//!
//! This module implements the CLI commands for:
//! - `bibliopay login` - Start a session
//! - `bibliopay logout` - End the session

use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::session::Session;
use crate::{Config, Result};

/// Handles the `bibliopay login` command.
///
/// # Errors
/// Returns an error if the credentials are wrong or the session flag cannot be written.
pub async fn login(config: &Config, username: &str, password: &str) -> Result<Out<()>> {
    Session::new(Box::new(config.storage()))
        .login(username, password)
        .await
        .pub_result(ErrorType::Session)?;
    Ok("Logged in".into())
}

/// Handles the `bibliopay logout` command. Logging out without a session is not an error.
pub async fn logout(config: &Config) -> Result<Out<()>> {
    Session::new(Box::new(config.storage()))
        .logout()
        .await
        .pub_result(ErrorType::Session)?;
    Ok("Logged out".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_login_logout() {
        let env = TestEnv::new().await;
        let config = env.config();
        assert!(login(&config, "admin", "nope").await.is_err());
        login(&config, "admin", "admin").await.unwrap();
        assert!(config.data_dir().join("biblio_auth.json").is_file());
        logout(&config).await.unwrap();
        assert!(!config.data_dir().join("biblio_auth.json").exists());
        logout(&config).await.unwrap();
    }
}

//! The operator session.
//!
//! This is a placeholder gate, not a security boundary: the only accepted credentials are a
//! fixed pair compiled into the program and the session is a flag in the data directory.

use crate::store::{Storage, AUTH_KEY};
use crate::Result;
use anyhow::{bail, Context};
use tracing::debug;

const USERNAME: &str = "admin";
const PASSWORD: &str = "admin";
const AUTHENTICATED: &str = "true";

pub struct Session {
    storage: Box<dyn Storage + Send>,
}

impl Session {
    pub fn new(storage: Box<dyn Storage + Send>) -> Self {
        Self { storage }
    }

    /// Checks the credentials and, if they match, persists the session flag.
    ///
    /// # Errors
    /// - Returns an error if the credentials are wrong or the flag cannot be written.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        if username != USERNAME || password != PASSWORD {
            bail!("Incorrect credentials, try again");
        }
        self.storage
            .set(AUTH_KEY, AUTHENTICATED)
            .await
            .context("Unable to save the session")?;
        debug!("Session started");
        Ok(())
    }

    /// Removes the session flag.
    pub async fn logout(&mut self) -> Result<()> {
        self.storage
            .remove(AUTH_KEY)
            .await
            .context("Unable to clear the session")
    }

    /// Whether the session flag is present.
    pub async fn is_authenticated(&self) -> Result<bool> {
        let flag = self
            .storage
            .get(AUTH_KEY)
            .await
            .context("Unable to read the session")?;
        Ok(flag.as_deref() == Some(AUTHENTICATED))
    }

    /// Fails with a hint to log in if there is no session.
    pub async fn require(&self) -> Result<()> {
        if !self.is_authenticated().await? {
            bail!("You are not logged in. Run 'bibliopay login' first.");
        }
        Ok(())
    }
}

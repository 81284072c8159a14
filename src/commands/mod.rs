//! Command handlers for the bibliopay CLI.
//!
//! This module contains implementations for all CLI subcommands. Every handler except `init`,
//! `login` and `logout` checks for a session before touching any data.

mod add;
mod auth;
mod branches;
mod export;
mod init;
mod insights;
mod list;
mod receipt;
mod summary;

use crate::error::{ErrorType, IntoResult};
use crate::session::Session;
use crate::store::TransactionStore;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use add::add;
pub use auth::{login, logout};
pub use branches::branches;
pub use export::export;
pub use init::init;
pub use insights::insights;
pub use list::list;
pub use receipt::receipt;
pub use summary::{summary, Summary};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data and a text report.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,

    /// Text meant for stdout, such as a table of transactions.
    #[serde(skip)]
    report: Option<String>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
            report: None,
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
            report: None,
        }
    }

    /// Attach a text report that `print` writes to stdout.
    pub fn with_report(mut self, report: impl Into<String>) -> Self {
        self.report = Some(report.into());
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    /// Print the report (if it exists) to stdout, the message to `info!` and the structured data
    /// (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        if let Some(report) = self.report() {
            println!("{report}");
        }
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Fails unless there is a session in `config`'s data directory.
async fn require_session(config: &Config) -> Result<()> {
    Session::new(Box::new(config.storage()))
        .require()
        .await
        .pub_result(ErrorType::Session)
}

/// Checks the session and loads the transaction store.
async fn open_store(config: &Config) -> Result<TransactionStore> {
    require_session(config).await?;
    TransactionStore::initialize(Box::new(config.storage()))
        .await
        .pub_result(ErrorType::Storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[test]
    fn test_out_from_str() {
        let out: Out<()> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());
        assert!(out.report().is_none());
    }

    #[test]
    fn test_out_report_is_not_serialized() {
        let out = Out::new("m", 1u8).with_report("table");
        assert_eq!(out.report(), Some("table"));
        let json = serde_json::to_string(&out).unwrap();
        assert!(!json.contains("table"));
    }

    #[tokio::test]
    async fn test_open_store_requires_session() {
        let env = TestEnv::new().await;
        let err = open_store(&env.config()).await.err().unwrap();
        assert_eq!(err.to_string(), "session error");
        assert!(format!("{err:#}").contains("bibliopay login"));

        login(&env.config(), "admin", "admin").await.unwrap();
        let store = open_store(&env.config()).await.unwrap();
        assert_eq!(store.snapshot().len(), 3);
    }
}

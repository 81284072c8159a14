//! BiblioPay: income tracking for a university library network.
//!
//! The library is organised around a `store::TransactionStore` that owns the transaction
//! collection and persists it through a `store::Storage`. Everything else reads from it:
//! `filter` narrows a snapshot, `stats` aggregates it, `export` renders it as a spreadsheet or a
//! PDF document and `insight` asks a text-generation service about it. The `commands` module
//! wires these together for the CLI.

pub mod args;
pub mod commands;
mod config;
mod error;
pub mod export;
pub mod filter;
pub mod insight;
pub mod model;
mod mode;
pub mod session;
pub mod stats;
pub mod store;
mod utils;

#[cfg(test)]
mod test;

pub use config::{Config, InsightSettings, BRANCHES};
pub use error::{Error, ErrorType, Result};
pub use mode::{Mode, TEST_MODE_ENV};

//! Shared test utilities for creating test environments and sample data.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{Amount, Category, NewTransaction, Transaction};
use crate::store::{FileStorage, TransactionStore, TRANSACTIONS_KEY};
use crate::Config;
use chrono::{TimeZone, Utc};
use std::str::FromStr;
use tempfile::TempDir;

/// Test environment that sets up a bibliopay home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with a fresh Config and no persisted transactions.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("bibliopay");
        let config = Config::create(&root).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    pub fn storage(&self) -> FileStorage {
        self.config.storage()
    }

    /// Persists `transactions` as the snapshot, replacing whatever was there.
    pub async fn write_snapshot(&self, transactions: &[Transaction]) {
        use crate::store::Storage;
        let json = serde_json::to_string(transactions).unwrap();
        let mut storage = self.storage();
        storage.set(TRANSACTIONS_KEY, &json).await.unwrap();
    }

    /// Loads a store over this environment's data directory.
    pub async fn store(&self) -> TransactionStore {
        TransactionStore::initialize(Box::new(self.storage()))
            .await
            .unwrap()
    }
}

/// A transaction with the given amount, category and branch, dated 2025-01-20 noon UTC.
pub(crate) fn tx(amount: &str, category: Category, branch: &str) -> Transaction {
    NewTransaction::new(
        Amount::from_str(amount).unwrap(),
        category,
        branch,
        Utc.with_ymd_and_hms(2025, 1, 20, 12, 0, 0).unwrap(),
    )
    .into_transaction(crate::utils::generate_transaction_id())
}

/// Two transactions on the same day: a 15.50 fine at "Central" and a 45.00 print job at
/// "Engineering" carrying the reference `REC-2024-001`.
pub(crate) fn sample_snapshot() -> Vec<Transaction> {
    let date = Utc.with_ymd_and_hms(2025, 1, 20, 12, 0, 0).unwrap();
    vec![
        NewTransaction::new(
            Amount::from_str("15.50").unwrap(),
            Category::Fines,
            "Central",
            date,
        )
        .description("Multa por retraso - Libro: Don Quijote")
        .into_transaction("a1".to_string()),
        NewTransaction::new(
            Amount::from_str("45.00").unwrap(),
            Category::Printing,
            "Engineering",
            date,
        )
        .description("Impresión de tesis (150 páginas)")
        .reference_number("REC-2024-001")
        .into_transaction("a2".to_string()),
    ]
}

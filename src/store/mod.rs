//! The transaction store: the single source of truth for the transaction collection.
//!
//! The store keeps the collection in memory, newest entry first, and persists the whole
//! collection through a `Storage` after every mutation. Writes run on a background task so that
//! callers do not have to wait for durability, but every write hands back a `PendingWrite` whose
//! outcome can be awaited and reported.

mod seed;
mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage, AUTH_KEY, TRANSACTIONS_KEY};

use crate::model::{NewTransaction, Transaction};
use crate::utils::generate_transaction_id;
use crate::Result;
use anyhow::{anyhow, ensure, Context};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Key under which an unreadable snapshot is preserved before the store falls back to seed data.
pub const CORRUPT_KEY: &str = "biblio_transactions_corrupt";

type SharedStorage = Arc<Mutex<Box<dyn Storage + Send>>>;

/// Describes where the store's initial contents came from.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Origin {
    /// A persisted snapshot was loaded.
    Loaded,
    /// Nothing was persisted yet, so the store was seeded with example data.
    Seeded,
    /// The persisted snapshot could not be parsed, so the store was seeded with example data.
    Recovered,
}

pub struct TransactionStore {
    storage: SharedStorage,
    transactions: Vec<Transaction>,
    origin: Origin,
    /// Version of the in-memory collection, bumped on every mutation.
    version: u64,
    /// Highest version that has reached the storage.
    written: Arc<AtomicU64>,
}

impl TransactionStore {
    /// Loads the persisted snapshot from `storage`.
    ///
    /// If nothing is persisted, or the snapshot does not parse, the store starts with the seed
    /// transactions instead and persists them. An unreadable snapshot is copied to `CORRUPT_KEY`
    /// first so that it is not lost.
    ///
    /// # Errors
    /// - Returns an error only if the storage itself cannot be read.
    pub async fn initialize(mut storage: Box<dyn Storage + Send>) -> Result<Self> {
        let raw = storage
            .get(TRANSACTIONS_KEY)
            .await
            .context("Unable to read the persisted transactions")?;

        let (transactions, origin) = match raw {
            None => {
                debug!("No persisted transactions found, seeding the store");
                (seed::seed_transactions(Utc::now()), Origin::Seeded)
            }
            Some(raw) => match serde_json::from_str::<Vec<Transaction>>(&raw) {
                Ok(transactions) => (transactions, Origin::Loaded),
                Err(e) => {
                    warn!("The persisted transactions are unreadable ({e}), starting from seed data");
                    if let Err(e) = storage.set(CORRUPT_KEY, &raw).await {
                        warn!("Unable to preserve the unreadable transactions: {e:#}");
                    }
                    (seed::seed_transactions(Utc::now()), Origin::Recovered)
                }
            },
        };

        let mut store = Self {
            storage: Arc::new(Mutex::new(storage)),
            transactions,
            origin,
            version: 0,
            written: Arc::new(AtomicU64::new(0)),
        };
        if origin != Origin::Loaded {
            if let Err(e) = store.schedule_write().finish().await {
                warn!("Unable to persist the seed transactions: {e:#}");
            }
        }
        Ok(store)
    }

    /// Where the initial contents came from.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// The current collection, newest entry first.
    pub fn snapshot(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Finds a transaction by id.
    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Creates a transaction from `new` with a fresh id, puts it at the front of the collection
    /// and schedules a write of the full collection.
    ///
    /// The in-memory add stands even if the write later fails; await `Added::write` to find out.
    ///
    /// # Errors
    /// - Returns an error if the branch is blank.
    pub fn add(&mut self, new: NewTransaction) -> Result<Added> {
        ensure!(
            !new.branch.trim().is_empty(),
            "A branch is required for every transaction"
        );
        let mut id = generate_transaction_id();
        while self.get(&id).is_some() {
            id = generate_transaction_id();
        }
        let transaction = new.into_transaction(id);
        debug!("Adding transaction {}", transaction.id);
        self.transactions.insert(0, transaction.clone());
        let write = self.schedule_write();
        Ok(Added { transaction, write })
    }

    /// Removes every transaction. This is not offered to operators; it exists for maintenance.
    pub fn clear(&mut self) -> PendingWrite {
        self.transactions.clear();
        self.schedule_write()
    }

    /// Serializes the collection now and writes it on a background task. A write that finds a
    /// newer version already persisted is skipped.
    fn schedule_write(&mut self) -> PendingWrite {
        self.version += 1;
        let version = self.version;
        let json = serde_json::to_string(&self.transactions);
        let storage = Arc::clone(&self.storage);
        let written = Arc::clone(&self.written);
        let handle = tokio::spawn(async move {
            let json = json.context("Unable to serialize the transactions")?;
            let mut storage = storage.lock().await;
            if written.load(Ordering::SeqCst) > version {
                debug!("Skipping write of version {version}, a newer version is persisted");
                return Ok(());
            }
            storage
                .set(TRANSACTIONS_KEY, &json)
                .await
                .context("Unable to persist the transactions")?;
            written.fetch_max(version, Ordering::SeqCst);
            Ok(())
        });
        PendingWrite { handle }
    }
}

/// The result of `TransactionStore::add`.
#[derive(Debug)]
pub struct Added {
    /// The transaction as stored, including its new id.
    pub transaction: Transaction,
    /// The background write of the collection.
    pub write: PendingWrite,
}

/// A snapshot write that is running in the background.
#[derive(Debug)]
pub struct PendingWrite {
    handle: JoinHandle<Result<()>>,
}

impl PendingWrite {
    /// Waits for the write to complete.
    ///
    /// # Errors
    /// - Returns an error if the storage rejected the write.
    pub async fn finish(self) -> Result<()> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(anyhow!(e).context("The background write did not complete")),
        }
    }
}

//! Add command handler.

use crate::args::AddArgs;
use crate::commands::{open_store, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{receipt, start_of_day, NewTransaction, Transaction};
use crate::{utils, Config, Result};
use chrono::Utc;
use tracing::warn;

/// Records a new transaction and persists the collection.
///
/// The date defaults to today in the configured timezone. A branch that is not in the configured
/// branch list is accepted with a warning. A receipt file, if given, is embedded in the
/// transaction as a data URL.
///
/// # Returns
///
/// On success, returns an `Out` containing the transaction as stored, including its new id.
///
/// # Errors
///
/// - Returns an error if there is no session.
/// - Returns an error if the branch is blank or the receipt file cannot be read.
/// - Returns an error if the collection could not be persisted. The transaction was still added
///   to the in-memory collection, but it will be gone the next time the data is loaded.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<Transaction>> {
    let mut store = open_store(&config).await?;

    let branch = args.branch.trim().to_string();
    if !branch.is_empty() && !config.is_known_branch(&branch) {
        warn!(
            "'{branch}' is not one of the known branches ({}), it will be reported separately",
            config.branches().join(", ")
        );
    }

    let tz = config.timezone();
    let date = args
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive());
    let mut new = NewTransaction::new(args.amount, args.category, branch, start_of_day(date, tz));
    if let Some(description) = args.description {
        new = new.description(description);
    }
    if let Some(reference) = args.reference {
        new = new.reference_number(reference);
    }
    if let Some(path) = args.receipt {
        let bytes = utils::read_bytes(&path)
            .await
            .pub_result(ErrorType::Validation)?;
        new = new.receipt(receipt::encode(&path, &bytes));
    }

    let added = store.add(new).pub_result(ErrorType::Validation)?;
    added.write.finish().await.pub_result(ErrorType::Storage)?;

    let t = added.transaction;
    let message = format!(
        "Added {} {} at {} with ID: {}",
        t.amount, t.category, t.branch, t.id
    );
    Ok(Out::new(message, t))
}

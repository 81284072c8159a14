use crate::model::{Amount, Category};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A single income record. Transactions are immutable once they are in the store.
///
/// The serialized field names match the persisted snapshot format, e.g. `referenceNumber`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Opaque unique id assigned by the store.
    pub id: String,
    pub amount: Amount,
    pub category: Category,
    /// Free text, may be empty.
    #[serde(default)]
    pub description: String,
    /// When the income was received. Only the calendar date is meaningful.
    pub date: DateTime<Utc>,
    /// Library branch. Expected, but not required, to be one of the configured branches.
    pub branch: String,
    /// An attached receipt, stored inline as a `data:` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    /// The number printed on the physical receipt, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
}

impl Transaction {
    /// The calendar date of the transaction as seen in `tz`.
    pub fn calendar_date(&self, tz: Tz) -> NaiveDate {
        self.date.with_timezone(&tz).date_naive()
    }

    pub fn has_receipt(&self) -> bool {
        self.receipt.is_some()
    }
}

/// The caller-supplied fields of a transaction that has not been added to the store yet.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewTransaction {
    pub amount: Amount,
    pub category: Category,
    pub description: String,
    pub date: DateTime<Utc>,
    pub branch: String,
    pub receipt: Option<String>,
    pub reference_number: Option<String>,
}

impl NewTransaction {
    /// Creates a record with an empty description and no receipt or reference.
    pub fn new(
        amount: Amount,
        category: Category,
        branch: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            amount,
            category,
            description: String::new(),
            date,
            branch: branch.into(),
            receipt: None,
            reference_number: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the reference number. Surrounding whitespace is trimmed and a blank reference is
    /// treated as no reference at all.
    pub fn reference_number(mut self, reference: impl AsRef<str>) -> Self {
        let trimmed = reference.as_ref().trim();
        self.reference_number = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn receipt(mut self, data_url: impl Into<String>) -> Self {
        self.receipt = Some(data_url.into());
        self
    }

    pub(crate) fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            category: self.category,
            description: self.description,
            date: self.date,
            branch: self.branch,
            receipt: self.receipt,
            reference_number: self.reference_number,
        }
    }
}

/// Converts an entered calendar date to the stored timestamp: the start of that day in `tz`.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    match tz.from_local_datetime(&midnight).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Midnight skipped by a DST transition; fall back to treating it as UTC.
        None => Utc.from_utc_datetime(&midnight),
    }
}

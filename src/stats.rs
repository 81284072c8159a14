//! Aggregations over a transaction snapshot: totals by category, by branch and by day, plus the
//! figures shown on the dashboard. Everything here is a pure function of its input.

use crate::model::{Amount, Category, Transaction};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeSet;

/// A total for every category. Lookups can never miss because the storage is indexed by the
/// closed `Category` enumeration.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct CategoryTotals([Amount; 7]);

impl CategoryTotals {
    pub fn get(&self, category: Category) -> Amount {
        self.0[category.index()]
    }

    /// Every category with its total, zeros included, in `Category::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, Amount)> + '_ {
        Category::ALL.iter().map(|c| (*c, self.get(*c)))
    }

    /// Only the categories with a non-zero total, which is what the charts show.
    pub fn non_zero(&self) -> impl Iterator<Item = (Category, Amount)> + '_ {
        self.iter().filter(|(_, amount)| !amount.is_zero())
    }

    pub fn sum(&self) -> Amount {
        self.0.iter().sum()
    }
}

/// Per-branch totals in order of first appearance in the snapshot. Branch strings are used as
/// they are, so a misspelled branch gets its own bucket.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct BranchTotals(Vec<(String, Amount)>);

impl BranchTotals {
    pub fn get(&self, branch: &str) -> Option<Amount> {
        self.0.iter().find(|(b, _)| b == branch).map(|(_, a)| *a)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Amount)> + '_ {
        self.0.iter().map(|(b, a)| (b.as_str(), *a))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn sum(&self) -> Amount {
        self.0.iter().map(|(_, a)| *a).sum()
    }
}

pub fn aggregate_by_category(records: &[Transaction]) -> CategoryTotals {
    let mut totals = [Amount::ZERO; 7];
    for t in records {
        let slot = &mut totals[t.category.index()];
        *slot = *slot + t.amount;
    }
    CategoryTotals(totals)
}

pub fn aggregate_by_branch(records: &[Transaction]) -> BranchTotals {
    let mut totals: Vec<(String, Amount)> = Vec::new();
    for t in records {
        match totals.iter_mut().find(|(b, _)| *b == t.branch) {
            Some((_, total)) => *total = *total + t.amount,
            None => totals.push((t.branch.clone(), t.amount)),
        }
    }
    BranchTotals(totals)
}

/// Sum of the amounts whose calendar date in `tz` is `date`. Time of day is ignored.
pub fn total_for_date(records: &[Transaction], date: NaiveDate, tz: Tz) -> Amount {
    on_date(records, date, tz).map(|t| t.amount).sum()
}

/// Number of transactions whose calendar date in `tz` is `date`.
pub fn count_for_date(records: &[Transaction], date: NaiveDate, tz: Tz) -> usize {
    on_date(records, date, tz).count()
}

fn on_date(
    records: &[Transaction],
    date: NaiveDate,
    tz: Tz,
) -> impl Iterator<Item = &Transaction> + '_ {
    records
        .iter()
        .filter(move |t| t.calendar_date(tz) == date)
}

pub fn grand_total(records: &[Transaction]) -> Amount {
    records.iter().map(|t| t.amount).sum()
}

/// The four headline figures of the dashboard.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Dashboard {
    pub date: NaiveDate,
    pub total_today: Amount,
    pub total: Amount,
    pub count_today: usize,
    /// Distinct branches that have at least one transaction.
    pub active_branches: usize,
}

impl Dashboard {
    pub fn new(records: &[Transaction], today: NaiveDate, tz: Tz) -> Self {
        let active: BTreeSet<&str> = records.iter().map(|t| t.branch.as_str()).collect();
        Self {
            date: today,
            total_today: total_for_date(records, today, tz),
            total: grand_total(records),
            count_today: count_for_date(records, today, tz),
            active_branches: active.len(),
        }
    }
}

/// One slice of the category chart.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Slice {
    pub category: Category,
    pub color: &'static str,
    pub amount: Amount,
}

/// The data behind the two dashboard charts.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Charts {
    pub by_category: Vec<Slice>,
    pub by_branch: BranchTotals,
}

impl Charts {
    pub fn new(records: &[Transaction]) -> Self {
        let by_category = aggregate_by_category(records)
            .non_zero()
            .map(|(category, amount)| Slice {
                category,
                color: category.color(),
                amount,
            })
            .collect();
        Self {
            by_category,
            by_branch: aggregate_by_branch(records),
        }
    }
}

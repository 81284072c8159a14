//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
mod category;
pub mod receipt;
mod transaction;

pub use amount::{Amount, AmountError};
pub use category::Category;
pub use transaction::{start_of_day, NewTransaction, Transaction};

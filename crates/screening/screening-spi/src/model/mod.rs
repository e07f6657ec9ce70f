//! Data models for transaction screening.

mod transaction_record;
mod verdict;

pub use transaction_record::{TransactionRecord, COLUMNS, UNKNOWN_CATEGORY};
pub use verdict::{Verdict, ANOMALOUS_TEXT, NORMAL_LABEL, NORMAL_TEXT};

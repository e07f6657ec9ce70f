//! Transaction Screening Service Provider Interface
//!
//! Defines the model contracts, the transaction record and the error type
//! shared by every screening layer.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{ModelLoader, TransactionModel};
pub use error::{Result, ScreeningError};
pub use model::{
    TransactionRecord, Verdict, ANOMALOUS_TEXT, COLUMNS, NORMAL_LABEL, NORMAL_TEXT,
    UNKNOWN_CATEGORY,
};

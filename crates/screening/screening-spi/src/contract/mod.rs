//! Contract definitions for transaction screening.
//!
//! This module contains trait definitions that model providers must implement.

mod transaction_model;

pub use transaction_model::{ModelLoader, TransactionModel};

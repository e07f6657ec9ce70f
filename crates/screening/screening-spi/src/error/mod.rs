//! Error types for transaction screening.
//!
//! This module contains error types and the Result alias.

mod screening_error;

pub use screening_error::{Result, ScreeningError};

//! Transaction Screening Facade
//!
//! Unified re-exports for the screening module.
//!
//! This facade provides a single entry point to all screening functionality:
//! - `TransactionModel`, `ModelLoader`, `TransactionRecord` and `Verdict` from SPI
//! - Artifact configuration types from API
//! - Encoders, the isolation forest, loaders and `Screener` from Core

// Re-export everything from SPI
pub use screening_spi::*;

// Re-export everything from API
pub use screening_api::*;

// Re-export everything from Core
pub use screening_core::*;

//! Transaction Screening Core
//!
//! Implementations for categorical encoding, isolation forest inference,
//! model loading and form screening.

mod encoder;
mod forest;
mod loader;
mod screener;

pub use encoder::*;
pub use forest::*;
pub use loader::*;
pub use screener::*;

// Re-export from API for convenience
pub use screening_api::{
    ArtifactConfig, ArtifactConfigBuilder, ModelSource, ModelUri, DEFAULT_MODEL_FILE,
    DEFAULT_TRACKING_URI,
};

// Re-export SPI types
pub use screening_spi::{
    ModelLoader, Result, ScreeningError, TransactionModel, TransactionRecord, Verdict,
    UNKNOWN_CATEGORY,
};

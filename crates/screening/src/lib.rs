//! # screening
//!
//! Transaction anomaly screening: categorical encoding, isolation forest
//! inference and model loading from local files or a tracking server.

pub use screening_facade::*;

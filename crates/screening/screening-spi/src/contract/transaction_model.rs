//! Model and loader trait definitions.

use crate::error::Result;
use crate::model::TransactionRecord;

/// A pre-trained transaction classifier.
///
/// Implementations are loaded once and never mutated afterwards, so a single
/// instance is shared by every request.
pub trait TransactionModel: Send + Sync {
    /// Short model name used in logs and readiness reports.
    fn name(&self) -> &str;

    /// Predict the label for a single record.
    ///
    /// A label of [`NORMAL_LABEL`](crate::NORMAL_LABEL) means normal; every
    /// other value is treated as anomalous by callers.
    fn predict(&self, record: &TransactionRecord) -> Result<i64>;
}

/// Strategy for obtaining a [`TransactionModel`] at process start.
pub trait ModelLoader: Send + Sync {
    /// Human readable description of where the model comes from.
    fn source(&self) -> String;

    /// Load the model artifact.
    fn load(&self) -> Result<Box<dyn TransactionModel>>;
}

impl<M: TransactionModel + ?Sized> TransactionModel for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn predict(&self, record: &TransactionRecord) -> Result<i64> {
        (**self).predict(record)
    }
}

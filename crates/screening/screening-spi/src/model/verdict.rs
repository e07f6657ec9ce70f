//! Human readable verdicts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label the model emits for a normal transaction.
pub const NORMAL_LABEL: i64 = 1;

pub const NORMAL_TEXT: &str = "This is a normal transaction.";
pub const ANOMALOUS_TEXT: &str = "This transaction is anomalous!";

/// Outcome of screening one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Normal,
    Anomalous,
}

impl Verdict {
    /// Map a model label to a verdict. Anything but `1` is anomalous.
    pub fn from_label(label: i64) -> Self {
        if label == NORMAL_LABEL {
            Verdict::Normal
        } else {
            Verdict::Anomalous
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Normal => NORMAL_TEXT,
            Verdict::Anomalous => ANOMALOUS_TEXT,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

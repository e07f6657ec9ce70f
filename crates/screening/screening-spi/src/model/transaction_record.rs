//! Single-row transaction record fed to the model.

use serde::{Deserialize, Serialize};

/// Column labels in the order the model was trained on.
pub const COLUMNS: [&str; 10] = [
    "FISCAL_YR",
    "FISCAL_MTH",
    "DIV_NAME",
    "MERCHANT",
    "CAT_DESC",
    "AMT",
    "Year",
    "Month",
    "DayOfWeek",
    "FiscalQuarter",
];

/// Code assigned to a categorical value that the encoder never saw.
pub const UNKNOWN_CATEGORY: i64 = -1;

/// One transaction, with categorical fields already encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub fiscal_yr: i64,
    pub fiscal_mth: i64,
    pub div_name: i64,
    pub merchant: i64,
    pub cat_desc: i64,
    pub amt: f64,
    pub year: i64,
    pub month: i64,
    pub day_of_week: i64,
    pub fiscal_quarter: i64,
}

impl TransactionRecord {
    /// Column labels, aligned with [`TransactionRecord::to_row`].
    pub fn columns() -> &'static [&'static str; 10] {
        &COLUMNS
    }

    /// Values in column order.
    pub fn to_row(&self) -> [f64; 10] {
        [
            self.fiscal_yr as f64,
            self.fiscal_mth as f64,
            self.div_name as f64,
            self.merchant as f64,
            self.cat_desc as f64,
            self.amt,
            self.year as f64,
            self.month as f64,
            self.day_of_week as f64,
            self.fiscal_quarter as f64,
        ]
    }
}

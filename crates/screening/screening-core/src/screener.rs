//! Form parsing and screening of a single transaction.

use screening_api::ArtifactConfig;
use screening_spi::{ModelLoader, Result, ScreeningError, TransactionModel, TransactionRecord, Verdict};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use super::encoder::CategoricalEncoders;
use super::loader::loader_for;

/// Raw form fields as submitted by the browser.
///
/// Every field is optional so that a missing key can be told apart from a
/// value that fails to parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionForm {
    #[serde(rename = "FISCAL_YR")]
    pub fiscal_yr: Option<String>,
    #[serde(rename = "FISCAL_MTH")]
    pub fiscal_mth: Option<String>,
    #[serde(rename = "DIV_NAME")]
    pub div_name: Option<String>,
    #[serde(rename = "MERCHANT")]
    pub merchant: Option<String>,
    #[serde(rename = "CAT_DESC")]
    pub cat_desc: Option<String>,
    #[serde(rename = "AMT")]
    pub amt: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "DayOfWeek")]
    pub day_of_week: Option<String>,
    #[serde(rename = "FiscalQuarter")]
    pub fiscal_quarter: Option<String>,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| ScreeningError::MissingField(field.to_string()))
}

fn parse_number<T>(value: &Option<String>, field: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = required(value, field)?;
    strip_digit_separators(raw.trim())
        .parse()
        .map_err(|e| ScreeningError::invalid_field(field, raw, e))
}

/// Drop `_` separators that sit between two digits (`1_000`). Misplaced
/// underscores are kept so that parsing rejects them.
fn strip_digit_separators(s: &str) -> String {
    let bytes = s.as_bytes();
    s.char_indices()
        .filter(|&(i, c)| {
            c != '_'
                || !(i > 0
                    && bytes[i - 1].is_ascii_digit()
                    && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
        })
        .map(|(_, c)| c)
        .collect()
}

/// Amounts are evaluated as `f32` by the model.
fn parse_amount(value: &Option<String>, field: &str) -> Result<f64> {
    let amt: f64 = parse_number(value, field)?;
    if !amt.is_finite() || amt.abs() > f32::MAX as f64 {
        return Err(ScreeningError::invalid_field(
            field,
            required(value, field)?,
            "must be a finite number within float32 range",
        ));
    }
    Ok(amt)
}

/// Model and encoders, loaded once and shared by every request.
#[derive(Clone)]
pub struct Screener {
    model: Arc<dyn TransactionModel>,
    encoders: Arc<CategoricalEncoders>,
}

impl Screener {
    pub fn new(model: Arc<dyn TransactionModel>, encoders: CategoricalEncoders) -> Self {
        Self {
            model,
            encoders: Arc::new(encoders),
        }
    }

    /// Load the model through `loader`.
    pub fn with_loader(loader: &dyn ModelLoader, encoders: CategoricalEncoders) -> Result<Self> {
        tracing::info!(source = %loader.source(), "loading model");
        let model: Arc<dyn TransactionModel> = Arc::from(loader.load()?);
        Ok(Self::new(model, encoders))
    }

    /// Load encoders and model from the configured artifacts.
    pub fn load(config: &ArtifactConfig) -> Result<Self> {
        let encoders = CategoricalEncoders::load(config)?;
        tracing::info!(
            divisions = encoders.division().len(),
            merchants = encoders.merchant().len(),
            categories = encoders.category().len(),
            "loaded encoders"
        );
        Self::with_loader(loader_for(&config.model).as_ref(), encoders)
    }

    pub fn model(&self) -> &dyn TransactionModel {
        self.model.as_ref()
    }

    pub fn encoders(&self) -> &CategoricalEncoders {
        &self.encoders
    }

    /// Coerce the numeric fields and encode the categorical ones.
    ///
    /// Numeric fields are checked first, in column order, so the first
    /// reported failure is the leftmost bad field.
    pub fn record(&self, form: &TransactionForm) -> Result<TransactionRecord> {
        let fiscal_yr = parse_number(&form.fiscal_yr, "FISCAL_YR")?;
        let fiscal_mth = parse_number(&form.fiscal_mth, "FISCAL_MTH")?;
        let div_name = required(&form.div_name, "DIV_NAME")?;
        let merchant = required(&form.merchant, "MERCHANT")?;
        let cat_desc = required(&form.cat_desc, "CAT_DESC")?;
        let amt = parse_amount(&form.amt, "AMT")?;
        let year = parse_number(&form.year, "Year")?;
        let month = parse_number(&form.month, "Month")?;
        let day_of_week = parse_number(&form.day_of_week, "DayOfWeek")?;
        let fiscal_quarter = parse_number(&form.fiscal_quarter, "FiscalQuarter")?;

        Ok(TransactionRecord {
            fiscal_yr,
            fiscal_mth,
            div_name: self.encoders.encode_division(div_name),
            merchant: self.encoders.encode_merchant(merchant),
            cat_desc: self.encoders.encode_category(cat_desc),
            amt,
            year,
            month,
            day_of_week,
            fiscal_quarter,
        })
    }

    /// Label a record with the loaded model.
    pub fn classify(&self, record: &TransactionRecord) -> Result<Verdict> {
        let label = self.model.predict(record)?;
        Ok(Verdict::from_label(label))
    }

    /// Parse, encode and classify one submitted form.
    pub fn screen(&self, form: &TransactionForm) -> Result<Verdict> {
        let record = self.record(form)?;
        let verdict = self.classify(&record)?;
        tracing::info!(model = self.model.name(), ?verdict, amt = record.amt, "screened transaction");
        Ok(verdict)
    }
}

impl std::fmt::Debug for Screener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screener")
            .field("model", &self.model.name())
            .field("encoders", &self.encoders)
            .finish()
    }
}

//! Fitted label encoders for the categorical transaction fields.

use screening_api::ArtifactConfig;
use screening_spi::{Result, ScreeningError, UNKNOWN_CATEGORY};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// On-disk encoder layout: either the bare class list or `{"classes": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EncoderArtifact {
    Classes(Vec<String>),
    Object { classes: Vec<String> },
}

impl EncoderArtifact {
    fn into_classes(self) -> Vec<String> {
        match self {
            EncoderArtifact::Classes(classes) | EncoderArtifact::Object { classes } => classes,
        }
    }
}

// ============================================================================
// Label Encoder
// ============================================================================

/// A fitted mapping from known string values to integer codes.
///
/// The code of a value is its position in the class list.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, i64>,
}

impl LabelEncoder {
    /// Build an encoder from classes in code order.
    pub fn from_classes<I, S>(classes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), code as i64).is_some() {
                return Err(ScreeningError::InvalidArtifact(format!(
                    "duplicate encoder class '{class}'"
                )));
            }
        }
        Ok(Self { classes, codes })
    }

    /// Parse an encoder from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: EncoderArtifact = serde_json::from_str(json)
            .map_err(|e| ScreeningError::InvalidArtifact(format!("encoder: {e}")))?;
        Self::from_classes(artifact.into_classes())
    }

    /// Load an encoder file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ScreeningError::artifact(path, e))?;
        Self::from_json(&json).map_err(|e| ScreeningError::artifact(path, e))
    }

    /// Code for a known value.
    pub fn lookup(&self, value: &str) -> Option<i64> {
        self.codes.get(value).copied()
    }

    /// Code for `value`, or [`UNKNOWN_CATEGORY`] if it was never seen.
    pub fn encode(&self, value: &str) -> i64 {
        self.lookup(value).unwrap_or(UNKNOWN_CATEGORY)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

// ============================================================================
// Categorical Encoders
// ============================================================================

/// The three encoders used by the transaction form.
#[derive(Debug, Clone)]
pub struct CategoricalEncoders {
    division: LabelEncoder,
    merchant: LabelEncoder,
    category: LabelEncoder,
}

impl CategoricalEncoders {
    pub fn new(division: LabelEncoder, merchant: LabelEncoder, category: LabelEncoder) -> Self {
        Self {
            division,
            merchant,
            category,
        }
    }

    /// Load all three encoders from the configured artifact directory.
    pub fn load(config: &ArtifactConfig) -> Result<Self> {
        Ok(Self::new(
            LabelEncoder::load(config.div_name_encoder_path())?,
            LabelEncoder::load(config.merchant_encoder_path())?,
            LabelEncoder::load(config.cat_desc_encoder_path())?,
        ))
    }

    pub fn encode_division(&self, value: &str) -> i64 {
        encode_logged(&self.division, value, "DIV_NAME")
    }

    pub fn encode_merchant(&self, value: &str) -> i64 {
        encode_logged(&self.merchant, value, "MERCHANT")
    }

    pub fn encode_category(&self, value: &str) -> i64 {
        encode_logged(&self.category, value, "CAT_DESC")
    }

    pub fn division(&self) -> &LabelEncoder {
        &self.division
    }

    pub fn merchant(&self) -> &LabelEncoder {
        &self.merchant
    }

    pub fn category(&self) -> &LabelEncoder {
        &self.category
    }
}

fn encode_logged(encoder: &LabelEncoder, value: &str, field: &str) -> i64 {
    encoder.lookup(value).unwrap_or_else(|| {
        tracing::debug!(field, value, "unseen category, using fallback code");
        UNKNOWN_CATEGORY
    })
}

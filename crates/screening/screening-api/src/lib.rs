//! Transaction Screening API
//!
//! Configuration types and builders for loading screening artifacts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// Re-export SPI types
pub use screening_spi::{
    ModelLoader, Result, ScreeningError, TransactionModel, TransactionRecord, Verdict,
};

pub const DIV_NAME_ENCODER_FILE: &str = "div_name_encoder.json";
pub const MERCHANT_ENCODER_FILE: &str = "merchant_encoder.json";
pub const CAT_DESC_ENCODER_FILE: &str = "cat_desc_encoder.json";
pub const DEFAULT_MODEL_FILE: &str = "isolation_forest.json";
pub const DEFAULT_TRACKING_URI: &str = "http://127.0.0.1:5000";

// ============================================================================
// Tracked model URI
// ============================================================================

/// Reference to a model logged under a tracking-server run,
/// written as `runs:/<run_id>/<artifact_path>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUri {
    pub run_id: String,
    pub artifact_path: String,
}

impl ModelUri {
    const SCHEME: &'static str = "runs:/";

    pub fn new(run_id: &str, artifact_path: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            artifact_path: artifact_path.trim_matches('/').to_string(),
        }
    }

    /// Path of a file inside the logged artifact directory.
    pub fn file_path(&self, file: &str) -> String {
        format!("{}/{}", self.artifact_path, file.trim_start_matches('/'))
    }
}

impl FromStr for ModelUri {
    type Err = ScreeningError;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s.trim().strip_prefix(Self::SCHEME).ok_or_else(|| {
            ScreeningError::InvalidConfig(format!("model URI must start with runs:/, got '{s}'"))
        })?;

        let (run_id, artifact_path) = rest.trim_start_matches('/').split_once('/').ok_or_else(
            || ScreeningError::InvalidConfig(format!("model URI has no artifact path: '{s}'")),
        )?;

        if run_id.is_empty()
            || !run_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ScreeningError::InvalidConfig(format!(
                "invalid run id in model URI: '{s}'"
            )));
        }

        let artifact_path = artifact_path.trim_matches('/');
        if artifact_path.is_empty() {
            return Err(ScreeningError::InvalidConfig(format!(
                "model URI has no artifact path: '{s}'"
            )));
        }

        Ok(Self::new(run_id, artifact_path))
    }
}

impl fmt::Display for ModelUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", Self::SCHEME, self.run_id, self.artifact_path)
    }
}

// ============================================================================
// Model source
// ============================================================================

/// Where the predictive model is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSource {
    /// Serialized model file on local disk.
    LocalFile { path: PathBuf },
    /// Model artifact logged to a tracking server.
    Tracking {
        tracking_uri: String,
        model_uri: ModelUri,
        model_file: String,
    },
}

impl ModelSource {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        ModelSource::LocalFile { path: path.into() }
    }

    pub fn tracking(tracking_uri: &str, model_uri: ModelUri) -> Self {
        ModelSource::Tracking {
            tracking_uri: tracking_uri.trim_end_matches('/').to_string(),
            model_uri,
            model_file: DEFAULT_MODEL_FILE.to_string(),
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::LocalFile { path } => write!(f, "file:{}", path.display()),
            ModelSource::Tracking {
                tracking_uri,
                model_uri,
                ..
            } => write!(f, "{model_uri} @ {tracking_uri}"),
        }
    }
}

// ============================================================================
// Artifact configuration
// ============================================================================

/// Locations of the encoders and the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Directory holding the three encoder files.
    pub artifacts_dir: PathBuf,
    pub model: ModelSource,
}

impl ArtifactConfig {
    /// Encoders and model file all taken from one directory.
    pub fn local(artifacts_dir: impl Into<PathBuf>) -> Self {
        let artifacts_dir = artifacts_dir.into();
        let model = ModelSource::local(artifacts_dir.join(DEFAULT_MODEL_FILE));
        Self {
            artifacts_dir,
            model,
        }
    }

    pub fn div_name_encoder_path(&self) -> PathBuf {
        self.artifacts_dir.join(DIV_NAME_ENCODER_FILE)
    }

    pub fn merchant_encoder_path(&self) -> PathBuf {
        self.artifacts_dir.join(MERCHANT_ENCODER_FILE)
    }

    pub fn cat_desc_encoder_path(&self) -> PathBuf {
        self.artifacts_dir.join(CAT_DESC_ENCODER_FILE)
    }

    pub fn builder() -> ArtifactConfigBuilder {
        ArtifactConfigBuilder::new()
    }
}

/// Builder for ArtifactConfig.
#[derive(Debug, Default)]
pub struct ArtifactConfigBuilder {
    artifacts_dir: Option<PathBuf>,
    model_path: Option<PathBuf>,
    tracking_uri: Option<String>,
    model_uri: Option<String>,
    model_file: Option<String>,
}

impl ArtifactConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory holding the encoders.
    pub fn artifacts_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.artifacts_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Load the model from a local file.
    pub fn model_path(mut self, path: impl AsRef<Path>) -> Self {
        self.model_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Tracking server base URL.
    pub fn tracking_uri(mut self, uri: &str) -> Self {
        self.tracking_uri = Some(uri.to_string());
        self
    }

    /// Load the model from a tracked run, e.g. `runs:/<run_id>/model`.
    pub fn model_uri(mut self, uri: &str) -> Self {
        self.model_uri = Some(uri.to_string());
        self
    }

    /// File name of the model inside the tracked artifact directory.
    pub fn model_file(mut self, file: &str) -> Self {
        self.model_file = Some(file.to_string());
        self
    }

    /// Build the configuration. A model URI selects the tracking source,
    /// otherwise the model is read from disk.
    pub fn build(self) -> Result<ArtifactConfig> {
        let artifacts_dir = self.artifacts_dir.unwrap_or_else(|| PathBuf::from("."));

        let model = match self.model_uri {
            Some(uri) => {
                if self.model_path.is_some() {
                    return Err(ScreeningError::InvalidConfig(
                        "model path and model URI are mutually exclusive".to_string(),
                    ));
                }
                let tracking_uri = self
                    .tracking_uri
                    .unwrap_or_else(|| DEFAULT_TRACKING_URI.to_string());
                ModelSource::Tracking {
                    tracking_uri: tracking_uri.trim_end_matches('/').to_string(),
                    model_uri: uri.parse()?,
                    model_file: self
                        .model_file
                        .unwrap_or_else(|| DEFAULT_MODEL_FILE.to_string()),
                }
            }
            None => ModelSource::local(
                self.model_path
                    .unwrap_or_else(|| artifacts_dir.join(DEFAULT_MODEL_FILE)),
            ),
        };

        Ok(ArtifactConfig {
            artifacts_dir,
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_uri() {
        let uri: ModelUri = "runs:/d2f96225d97a42b4835f1a68942e5a79/model"
            .parse()
            .unwrap();
        assert_eq!(uri.run_id, "d2f96225d97a42b4835f1a68942e5a79");
        assert_eq!(uri.artifact_path, "model");
        assert_eq!(uri.file_path("isolation_forest.json"), "model/isolation_forest.json");
        assert_eq!(
            uri.to_string(),
            "runs:/d2f96225d97a42b4835f1a68942e5a79/model"
        );
    }

    #[test]
    fn test_parse_nested_artifact_path() {
        let uri: ModelUri = "runs://abc123/models/forest/".parse().unwrap();
        assert_eq!(uri.run_id, "abc123");
        assert_eq!(uri.artifact_path, "models/forest");
    }

    #[test]
    fn test_reject_bad_model_uris() {
        for bad in [
            "models:/fraud/1",
            "runs:/",
            "runs:/abc123",
            "runs:/abc123/",
            "runs:/ab c/model",
            "",
        ] {
            let err = bad.parse::<ModelUri>().unwrap_err();
            assert!(
                matches!(err, ScreeningError::InvalidConfig(_)),
                "expected config error for {bad:?}"
            );
        }
    }

    #[test]
    fn test_local_config_paths() {
        let config = ArtifactConfig::local("/srv/artifacts");
        assert_eq!(
            config.div_name_encoder_path(),
            PathBuf::from("/srv/artifacts/div_name_encoder.json")
        );
        assert_eq!(
            config.merchant_encoder_path(),
            PathBuf::from("/srv/artifacts/merchant_encoder.json")
        );
        assert_eq!(
            config.cat_desc_encoder_path(),
            PathBuf::from("/srv/artifacts/cat_desc_encoder.json")
        );
        assert_eq!(
            config.model,
            ModelSource::local("/srv/artifacts/isolation_forest.json")
        );
    }

    #[test]
    fn test_builder_defaults_to_local_model() {
        let config = ArtifactConfig::builder()
            .artifacts_dir("art")
            .build()
            .unwrap();
        assert_eq!(config.model, ModelSource::local("art/isolation_forest.json"));
    }

    #[test]
    fn test_builder_tracking_source() {
        let config = ArtifactConfig::builder()
            .tracking_uri("http://mlflow:5000/")
            .model_uri("runs:/abc/model")
            .model_file("forest.json")
            .build()
            .unwrap();

        match config.model {
            ModelSource::Tracking {
                tracking_uri,
                model_uri,
                model_file,
            } => {
                assert_eq!(tracking_uri, "http://mlflow:5000");
                assert_eq!(model_uri, ModelUri::new("abc", "model"));
                assert_eq!(model_file, "forest.json");
            }
            other => panic!("expected tracking source, got {other:?}"),
        }
    }

    #[test]
    fn test_builder_tracking_defaults() {
        let config = ArtifactConfig::builder()
            .model_uri("runs:/abc/model")
            .build()
            .unwrap();
        assert_eq!(
            config.model,
            ModelSource::tracking(DEFAULT_TRACKING_URI, ModelUri::new("abc", "model"))
        );
    }

    #[test]
    fn test_builder_rejects_both_sources() {
        let result = ArtifactConfig::builder()
            .model_path("forest.json")
            .model_uri("runs:/abc/model")
            .build();
        assert!(matches!(result, Err(ScreeningError::InvalidConfig(_))));
    }

    #[test]
    fn test_model_source_display() {
        let source = ModelSource::tracking("http://127.0.0.1:5000", ModelUri::new("abc", "model"));
        assert_eq!(source.to_string(), "runs:/abc/model @ http://127.0.0.1:5000");
        assert_eq!(
            ModelSource::local("forest.json").to_string(),
            "file:forest.json"
        );
    }
}

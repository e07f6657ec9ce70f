//! Model loading strategies.

use screening_api::{ModelSource, ModelUri, DEFAULT_MODEL_FILE};
use screening_spi::{ModelLoader, Result, ScreeningError, TransactionModel};
use std::path::PathBuf;
use std::time::Duration;

use super::forest::IsolationForestModel;

// ============================================================================
// Local file
// ============================================================================

/// Reads a serialized forest from local disk.
#[derive(Debug, Clone)]
pub struct LocalFileLoader {
    path: PathBuf,
}

impl LocalFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelLoader for LocalFileLoader {
    fn source(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn load(&self) -> Result<Box<dyn TransactionModel>> {
        let model = IsolationForestModel::load(&self.path)?;
        tracing::info!(path = %self.path.display(), trees = model.n_trees(), "loaded model file");
        Ok(Box::new(model))
    }
}

// ============================================================================
// Tracking server
// ============================================================================

/// Downloads the forest logged under a tracking-server run.
#[derive(Debug, Clone)]
pub struct TrackingServerLoader {
    tracking_uri: String,
    model_uri: ModelUri,
    model_file: String,
    timeout: Duration,
}

impl TrackingServerLoader {
    pub fn new(tracking_uri: &str, model_uri: ModelUri) -> Self {
        Self {
            tracking_uri: tracking_uri.trim_end_matches('/').to_string(),
            model_uri,
            model_file: DEFAULT_MODEL_FILE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Name of the model file inside the logged artifact directory.
    pub fn with_model_file(mut self, file: &str) -> Self {
        self.model_file = file.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Download URL of the artifact file.
    pub fn artifact_url(&self) -> Result<reqwest::Url> {
        let path = self.model_uri.file_path(&self.model_file);
        reqwest::Url::parse_with_params(
            &format!("{}/get-artifact", self.tracking_uri),
            &[("path", path.as_str()), ("run_uuid", self.model_uri.run_id.as_str())],
        )
        .map_err(|e| {
            ScreeningError::InvalidConfig(format!(
                "invalid tracking URI '{}': {e}",
                self.tracking_uri
            ))
        })
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        let url = self.artifact_url()?;

        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("screening/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
            .map_err(|e| ScreeningError::Fetch(e.to_string()))?;

        tracing::debug!(%url, "fetching tracked model");
        let response = client
            .get(url.clone())
            .send()
            .map_err(|e| ScreeningError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScreeningError::Fetch(format!("{url}: HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .map_err(|e| ScreeningError::Fetch(format!("{url}: {e}")))?;
        Ok(bytes.to_vec())
    }
}

impl ModelLoader for TrackingServerLoader {
    fn source(&self) -> String {
        format!("{} @ {}", self.model_uri, self.tracking_uri)
    }

    fn load(&self) -> Result<Box<dyn TransactionModel>> {
        let bytes = self.fetch()?;
        let model = IsolationForestModel::from_slice(&bytes)?;
        tracing::info!(
            model_uri = %self.model_uri,
            trees = model.n_trees(),
            "loaded tracked model"
        );
        Ok(Box::new(model))
    }
}

/// Pick the loader matching a configured model source.
pub fn loader_for(source: &ModelSource) -> Box<dyn ModelLoader> {
    match source {
        ModelSource::LocalFile { path } => Box::new(LocalFileLoader::new(path.clone())),
        ModelSource::Tracking {
            tracking_uri,
            model_uri,
            model_file,
        } => Box::new(
            TrackingServerLoader::new(tracking_uri, model_uri.clone()).with_model_file(model_file),
        ),
    }
}

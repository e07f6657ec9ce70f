//! Command-line and environment configuration.

use clap::{Parser, ValueEnum};
use screening::{ArtifactConfig, ScreeningError, DEFAULT_MODEL_FILE, DEFAULT_TRACKING_URI};
use std::path::PathBuf;

/// Where the model artifact comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Serialized forest on local disk
    Local,
    /// Forest logged to a tracking server run
    Tracking,
}

#[derive(Debug, Parser)]
#[command(name = "screening-server")]
#[command(version, about = "Web front end for transaction anomaly screening", long_about = None)]
pub struct Args {
    /// Interface to bind (use 0.0.0.0 to listen on all interfaces)
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5001)]
    pub port: u16,

    /// Directory holding the three encoder files
    #[arg(long, env = "SCREENING_ARTIFACTS_DIR", default_value = ".")]
    pub artifacts_dir: PathBuf,

    /// Model source (local, tracking)
    #[arg(long, env = "SCREENING_MODEL_SOURCE", value_enum, default_value_t = SourceKind::Local)]
    pub model_source: SourceKind,

    /// Local model file (default: <artifacts-dir>/isolation_forest.json)
    #[arg(long, env = "SCREENING_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Tracking server base URL
    #[arg(long, env = "MLFLOW_TRACKING_URI", default_value = DEFAULT_TRACKING_URI)]
    pub tracking_uri: String,

    /// Tracked model, e.g. runs:/<run_id>/model
    #[arg(long, env = "SCREENING_MODEL_URI")]
    pub model_uri: Option<String>,

    /// Model file inside the tracked artifact directory
    #[arg(long, env = "SCREENING_MODEL_FILE", default_value = DEFAULT_MODEL_FILE)]
    pub model_file: String,
}

impl Args {
    /// Resolve the artifact locations for the selected model source.
    pub fn artifact_config(&self) -> screening::Result<ArtifactConfig> {
        let builder = ArtifactConfig::builder().artifacts_dir(&self.artifacts_dir);

        match self.model_source {
            SourceKind::Local => {
                let builder = match &self.model_path {
                    Some(path) => builder.model_path(path),
                    None => builder,
                };
                builder.build()
            }
            SourceKind::Tracking => {
                let model_uri = self.model_uri.as_deref().ok_or_else(|| {
                    ScreeningError::InvalidConfig(
                        "--model-uri (SCREENING_MODEL_URI) is required for the tracking source"
                            .to_string(),
                    )
                })?;
                builder
                    .tracking_uri(&self.tracking_uri)
                    .model_uri(model_uri)
                    .model_file(&self.model_file)
                    .build()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screening::{ModelSource, ModelUri};

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["screening-server", "--host", "0.0.0.0", "--port", "8080"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_local_source() {
        let args = parse(&["--model-source", "local", "--artifacts-dir", "/srv/art"]);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 8080);

        let config = args.artifact_config().unwrap();
        assert_eq!(config.artifacts_dir, PathBuf::from("/srv/art"));
        assert_eq!(
            config.model,
            ModelSource::local("/srv/art/isolation_forest.json")
        );
    }

    #[test]
    fn test_local_source_with_model_path() {
        let args = parse(&[
            "--model-source",
            "local",
            "--model-path",
            "/models/forest.json",
        ]);
        let config = args.artifact_config().unwrap();
        assert_eq!(config.model, ModelSource::local("/models/forest.json"));
    }

    #[test]
    fn test_tracking_source() {
        let args = parse(&[
            "--model-source",
            "tracking",
            "--tracking-uri",
            "http://mlflow:5000",
            "--model-uri",
            "runs:/abc123/model",
            "--model-file",
            "forest.json",
        ]);
        let config = args.artifact_config().unwrap();
        assert_eq!(
            config.model,
            ModelSource::Tracking {
                tracking_uri: "http://mlflow:5000".to_string(),
                model_uri: ModelUri::new("abc123", "model"),
                model_file: "forest.json".to_string(),
            }
        );
    }

    #[test]
    fn test_tracking_source_requires_uri() {
        let mut args = parse(&["--model-source", "tracking"]);
        args.model_uri = None;
        assert!(matches!(
            args.artifact_config(),
            Err(ScreeningError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = Args::try_parse_from(["screening-server", "--port", "not-a-port"]);
        assert!(result.is_err());
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::artifacts::{ArtifactPaths, DEFAULT_MODEL_PATH, DEFAULT_PROCESSED_PATH};
use crate::error::ArtifactError;

/// Runtime settings for the prediction tools. Every field has a default, so a
/// config file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub model_path: PathBuf,
    pub processed_path: PathBuf,
    /// Write the loaded artifacts back unchanged at the end of each run.
    pub resave_artifacts: bool,
    pub show_probabilities: bool,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_path: DEFAULT_MODEL_PATH.into(),
            processed_path: DEFAULT_PROCESSED_PATH.into(),
            resave_artifacts: true,
            show_probabilities: true,
            log_filter: "info".into(),
        }
    }
}

impl PredictorConfig {
    /// Defaults when `path` is `None`, otherwise the parsed JSON file.
    pub fn load(path: Option<&Path>) -> Result<Self, ArtifactError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|source| ArtifactError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_str(&text).map_err(|source| ArtifactError::Parse { path: path.to_path_buf(), source })
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths { model: self.model_path.clone(), processed: self.processed_path.clone() }
    }
}

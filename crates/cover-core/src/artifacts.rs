/// Persisted classifier and preprocessing artifacts (JSON on local disk).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

use crate::classifier::ClassifierArtifact;
use crate::columns::SelectedColumns;
use crate::error::{ArtifactError, Result};
use crate::pipeline::InferenceContext;
use crate::scaler::ScalerArtifact;

pub const DEFAULT_MODEL_PATH: &str = "best_model.json";
pub const DEFAULT_PROCESSED_PATH: &str = "processed_data.json";

/// Fitted scaler plus the classifier's column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedData {
    pub scaler: ScalerArtifact,
    pub selected_columns: SelectedColumns,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub processed: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self { model: DEFAULT_MODEL_PATH.into(), processed: DEFAULT_PROCESSED_PATH.into() }
    }
}

impl ArtifactPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self { model: dir.join(DEFAULT_MODEL_PATH), processed: dir.join(DEFAULT_PROCESSED_PATH) }
    }
}

/// The loaded artifact pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    pub classifier: ClassifierArtifact,
    pub processed: ProcessedData,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> std::result::Result<T, ArtifactError> {
    let text = fs::read_to_string(path).map_err(|source| ArtifactError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&text).map_err(|source| ArtifactError::Parse { path: path.to_path_buf(), source })
}

/// Pretty JSON with a trailing newline, written beside `path` and renamed over it.
fn write_json<T: Serialize>(path: &Path, value: &T) -> std::result::Result<(), ArtifactError> {
    let mut text =
        serde_json::to_string_pretty(value).map_err(|source| ArtifactError::Parse { path: path.to_path_buf(), source })?;
    text.push('\n');

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let io_err = |source| ArtifactError::Io { path: path.to_path_buf(), source };
    fs::write(&tmp, text).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

impl Artifacts {
    /// Read and validate both files. Any failure is fatal for the session.
    pub fn load(paths: &ArtifactPaths) -> std::result::Result<Self, ArtifactError> {
        let classifier: ClassifierArtifact = read_json(&paths.model)?;
        classifier
            .validate()
            .map_err(|source| ArtifactError::Invalid { path: paths.model.clone(), source })?;

        let processed: ProcessedData = read_json(&paths.processed)?;
        processed
            .scaler
            .validate()
            .map_err(|source| ArtifactError::Invalid { path: paths.processed.clone(), source })?;

        info!(
            model = %paths.model.display(),
            processed = %paths.processed.display(),
            classifier = classifier.kind(),
            scaler = processed.scaler.kind(),
            "loaded artifacts"
        );
        Ok(Self { classifier, processed })
    }

    /// Write both files back. Saving an unchanged pair reproduces the same bytes.
    pub fn save(&self, paths: &ArtifactPaths) -> std::result::Result<(), ArtifactError> {
        write_json(&paths.processed, &self.processed)?;
        write_json(&paths.model, &self.classifier)?;
        info!(
            model = %paths.model.display(),
            processed = %paths.processed.display(),
            "saved artifacts"
        );
        Ok(())
    }

    pub fn into_context(self) -> Result<InferenceContext> {
        let ProcessedData { scaler, selected_columns } = self.processed;
        InferenceContext::new(scaler, self.classifier, selected_columns)
    }
}

impl InferenceContext {
    /// The artifact pair this context was built from, for re-saving.
    pub fn to_artifacts(&self) -> Artifacts {
        Artifacts {
            classifier: self.classifier().clone(),
            processed: ProcessedData { scaler: self.scaler().clone(), selected_columns: self.selected().clone() },
        }
    }
}

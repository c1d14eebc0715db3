//! Error types for feature assembly, inference and artifact loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of a single prediction request or of artifact validation.
#[derive(Debug, Error)]
pub enum Error {
    /// A required feature is absent from the record.
    #[error("missing feature: {0}")]
    MissingFeature(String),

    /// A name that is not one of the 15 known features.
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange { name: String, value: f64, min: i64, max: i64 },

    #[error("{name} = {value} is not a 0/1 indicator")]
    NotBinary { name: String, value: f64 },

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("selected column list is empty")]
    EmptyColumns,

    /// The assembled row does not carry exactly the columns the classifier was trained on.
    #[error("column mismatch: expected {expected:?}, found {found:?}")]
    ColumnMismatch { expected: Vec<String>, found: Vec<String> },

    #[error("feature count mismatch: expected {expected}, found {found}")]
    FeatureCount { expected: usize, found: usize },

    /// Names or value counts handed to a scaler do not match what it was fitted on.
    #[error("scaler input mismatch: {0}")]
    ScalerInput(String),

    #[error("invalid scaler: {0}")]
    InvalidScaler(String),

    #[error("invalid classifier: {0}")]
    InvalidClassifier(String),

    #[error("classifier returned {found} probabilities for {expected} classes")]
    ProbabilityCount { expected: usize, found: usize },
}

/// Failures while reading or writing the persisted artifact pair.
/// All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: Error,
    },
}

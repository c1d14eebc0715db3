//! Forest cover type prediction from terrain and soil measurements.
//!
//! Artifacts are loaded once into an [`InferenceContext`], which turns a
//! [`FeatureRecord`] into a scaled, column-aligned row and a labelled
//! [`Prediction`].

pub mod artifacts;
pub mod classifier;
pub mod columns;
pub mod config;
pub mod error;
pub mod features;
pub mod labels;
pub mod pipeline;
pub mod scaler;

pub use artifacts::{ArtifactPaths, Artifacts, ProcessedData};
pub use classifier::{Classifier, ClassifierArtifact};
pub use columns::{Partition, SelectedColumns};
pub use config::PredictorConfig;
pub use error::{ArtifactError, Error, Result};
pub use features::{FeatureRecord, FeatureSpec, WidgetKind, FEATURES};
pub use labels::{cover_type_name, CoverType, UNKNOWN_LABEL};
pub use pipeline::{AssembledRow, ClassProbability, InferenceContext, Prediction};
pub use scaler::{Scaler, ScalerArtifact};

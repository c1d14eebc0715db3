//! Pre-trained classifiers.
//!
//! Each model family exposes its own class ordering through
//! [`Classifier::classes`]; probability vectors are aligned to it.

pub mod centroid;
pub mod forest;
pub mod logistic;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use centroid::NearestCentroid;
pub use forest::{RandomForest, TreeNode};
pub use logistic::LogisticRegression;

/// Capability consumed by the pipeline.
pub trait Classifier {
    /// Row width the model was trained on.
    fn n_features(&self) -> usize;

    /// Class indices in the model's output order.
    fn classes(&self) -> &[i64];

    fn predict(&self, row: &[f64]) -> Result<i64>;

    /// One probability per entry of [`Classifier::classes`], or `None` when the
    /// model family has no probability output.
    fn predict_proba(&self, row: &[f64]) -> Result<Option<Vec<f64>>>;
}

pub(crate) fn check_row(n_features: usize, row: &[f64]) -> Result<()> {
    if row.len() != n_features {
        return Err(Error::FeatureCount { expected: n_features, found: row.len() });
    }
    Ok(())
}

pub(crate) fn check_classes(classes: &[i64]) -> Result<()> {
    if classes.is_empty() {
        return Err(Error::InvalidClassifier("no classes".into()));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = classes.iter().find(|c| !seen.insert(**c)) {
        return Err(Error::InvalidClassifier(format!("duplicate class {dup}")));
    }
    Ok(())
}

/// Index of the largest value; first wins on ties.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

// ── Persisted form ───────────────────────────────────────────────────────────

/// Serialized classifier, tagged by family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
    NearestCentroid(NearestCentroid),
}

impl ClassifierArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierArtifact::LogisticRegression(_) => "logistic_regression",
            ClassifierArtifact::RandomForest(_) => "random_forest",
            ClassifierArtifact::NearestCentroid(_) => "nearest_centroid",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ClassifierArtifact::LogisticRegression(m) => m.validate(),
            ClassifierArtifact::RandomForest(m) => m.validate(),
            ClassifierArtifact::NearestCentroid(m) => m.validate(),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            ClassifierArtifact::LogisticRegression(m) => m,
            ClassifierArtifact::RandomForest(m) => m,
            ClassifierArtifact::NearestCentroid(m) => m,
        }
    }
}

impl Classifier for ClassifierArtifact {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn classes(&self) -> &[i64] {
        self.inner().classes()
    }

    fn predict(&self, row: &[f64]) -> Result<i64> {
        self.inner().predict(row)
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Option<Vec<f64>>> {
        self.inner().predict_proba(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.5, 0.5, 0.1]), 1);
        assert_eq!(argmax(&[1.0]), 0);
    }

    #[test]
    fn artifact_dispatches_by_kind() {
        let json = r#"{
            "kind": "nearest_centroid",
            "classes": [0, 1],
            "centroids": [[0.0, 0.0], [10.0, 10.0]]
        }"#;
        let art: ClassifierArtifact = serde_json::from_str(json).unwrap();
        art.validate().unwrap();
        assert_eq!(art.kind(), "nearest_centroid");
        assert_eq!(art.n_features(), 2);
        assert_eq!(art.predict(&[9.0, 8.0]).unwrap(), 1);
        assert!(art.predict_proba(&[9.0, 8.0]).unwrap().is_none());
    }

    #[test]
    fn duplicate_classes_rejected() {
        assert!(check_classes(&[0, 1, 1]).is_err());
        assert!(check_classes(&[]).is_err());
        check_classes(&[6, 0, 3]).unwrap();
    }
}

use serde::{Deserialize, Serialize};

use super::{check_classes, check_row, Classifier};
use crate::error::{Error, Result};

/// Euclidean nearest-centroid classifier. Has no probability output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestCentroid {
    pub classes: Vec<i64>,
    /// One centroid per class, in class order.
    pub centroids: Vec<Vec<f64>>,
}

impl NearestCentroid {
    pub fn new(classes: Vec<i64>, centroids: Vec<Vec<f64>>) -> Result<Self> {
        let m = Self { classes, centroids };
        m.validate()?;
        Ok(m)
    }

    pub fn validate(&self) -> Result<()> {
        check_classes(&self.classes)?;
        if self.centroids.len() != self.classes.len() {
            return Err(Error::InvalidClassifier(format!(
                "{} centroids for {} classes",
                self.centroids.len(),
                self.classes.len()
            )));
        }
        let width = self.n_features();
        if width == 0 || self.centroids.iter().any(|c| c.len() != width) {
            return Err(Error::InvalidClassifier("ragged or empty centroids".into()));
        }
        Ok(())
    }
}

impl Classifier for NearestCentroid {
    fn n_features(&self) -> usize {
        self.centroids.first().map_or(0, Vec::len)
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, row: &[f64]) -> Result<i64> {
        check_row(self.n_features(), row)?;
        let mut best = (0, f64::INFINITY);
        for (i, c) in self.centroids.iter().enumerate() {
            let d: f64 = c.iter().zip(row).map(|(a, b)| (a - b) * (a - b)).sum();
            if d < best.1 {
                best = (i, d);
            }
        }
        Ok(self.classes[best.0])
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Option<Vec<f64>>> {
        check_row(self.n_features(), row)?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_closest_centroid() {
        let m = NearestCentroid::new(vec![2, 0, 5], vec![vec![0.0, 0.0], vec![5.0, 5.0], vec![-5.0, 5.0]]).unwrap();
        assert_eq!(m.predict(&[0.5, -0.5]).unwrap(), 2);
        assert_eq!(m.predict(&[4.0, 6.0]).unwrap(), 0);
        assert_eq!(m.predict(&[-4.0, 4.0]).unwrap(), 5);
        assert!(m.predict_proba(&[0.0, 0.0]).unwrap().is_none());
    }

    #[test]
    fn mismatched_centroids_rejected() {
        assert!(NearestCentroid::new(vec![0, 1], vec![vec![0.0]]).is_err());
        assert!(NearestCentroid::new(vec![0, 1], vec![vec![0.0], vec![0.0, 1.0]]).is_err());
    }
}

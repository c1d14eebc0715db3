use serde::{Deserialize, Serialize};

use super::{argmax, check_classes, check_row, Classifier};
use crate::error::{Error, Result};

/// Multinomial logistic regression.
///
/// `coef` holds one weight row per class. A two-class model may instead carry a
/// single row, scored with the sigmoid of the positive class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<i64>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl LogisticRegression {
    pub fn new(classes: Vec<i64>, coef: Vec<Vec<f64>>, intercept: Vec<f64>) -> Result<Self> {
        let m = Self { classes, coef, intercept };
        m.validate()?;
        Ok(m)
    }

    pub fn validate(&self) -> Result<()> {
        check_classes(&self.classes)?;
        let binary = self.classes.len() == 2 && self.coef.len() == 1;
        if !binary && self.coef.len() != self.classes.len() {
            return Err(Error::InvalidClassifier(format!(
                "{} coefficient rows for {} classes",
                self.coef.len(),
                self.classes.len()
            )));
        }
        if self.intercept.len() != self.coef.len() {
            return Err(Error::InvalidClassifier(format!(
                "{} intercepts for {} coefficient rows",
                self.intercept.len(),
                self.coef.len()
            )));
        }
        let width = self.n_features();
        if width == 0 || self.coef.iter().any(|r| r.len() != width) {
            return Err(Error::InvalidClassifier("ragged or empty coefficient rows".into()));
        }
        Ok(())
    }

    fn decision(&self, row: &[f64]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(w, b)| b + w.iter().zip(row).map(|(w, x)| w * x).sum::<f64>())
            .collect()
    }

    fn probabilities(&self, row: &[f64]) -> Vec<f64> {
        let z = self.decision(row);
        if z.len() == 1 {
            let p = 1.0 / (1.0 + (-z[0]).exp());
            return vec![1.0 - p, p];
        }
        // shift by the max for a stable softmax
        let max = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = z.iter().map(|v| (v - max).exp()).collect();
        let sum: f64 = exp.iter().sum();
        exp.into_iter().map(|e| e / sum).collect()
    }
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coef.first().map_or(0, Vec::len)
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, row: &[f64]) -> Result<i64> {
        check_row(self.n_features(), row)?;
        Ok(self.classes[argmax(&self.probabilities(row))])
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Option<Vec<f64>>> {
        check_row(self.n_features(), row)?;
        Ok(Some(self.probabilities(row)))
    }
}

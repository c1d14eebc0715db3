/// Random forest of axis-aligned decision trees with soft voting.

use serde::{Deserialize, Serialize};

use super::{argmax, check_classes, check_row, Classifier};
use crate::error::{Error, Result};

/// A node in a decision tree (either a split or a leaf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Samples with `row[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Per-class training weight (counts or fractions) reaching this leaf,
    /// aligned to the forest's class order.
    Leaf { class_weights: Vec<f64> },
}

impl TreeNode {
    fn leaf_for(&self, row: &[f64]) -> &[f64] {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { class_weights } => return class_weights,
                TreeNode::Split { feature, threshold, left, right } => {
                    let x = row.get(*feature).copied().unwrap_or(f64::NAN);
                    node = if x <= *threshold { left.as_ref() } else { right.as_ref() };
                }
            }
        }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<()> {
        match self {
            TreeNode::Leaf { class_weights } => {
                if class_weights.len() != n_classes {
                    return Err(Error::InvalidClassifier(format!(
                        "leaf has {} weights for {n_classes} classes",
                        class_weights.len()
                    )));
                }
                if class_weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(Error::InvalidClassifier("negative or non-finite leaf weight".into()));
                }
                if class_weights.iter().sum::<f64>() <= 0.0 {
                    return Err(Error::InvalidClassifier("leaf with zero total weight".into()));
                }
                Ok(())
            }
            TreeNode::Split { feature, left, right, .. } => {
                if *feature >= n_features {
                    return Err(Error::InvalidClassifier(format!(
                        "split on feature {feature} of {n_features}"
                    )));
                }
                left.validate(n_features, n_classes)?;
                right.validate(n_features, n_classes)
            }
        }
    }

    /// Leaf nodes have depth 0.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<i64>,
    pub n_features: usize,
    pub trees: Vec<TreeNode>,
}

impl RandomForest {
    pub fn new(classes: Vec<i64>, n_features: usize, trees: Vec<TreeNode>) -> Result<Self> {
        let m = Self { classes, n_features, trees };
        m.validate()?;
        Ok(m)
    }

    pub fn validate(&self) -> Result<()> {
        check_classes(&self.classes)?;
        if self.n_features == 0 {
            return Err(Error::InvalidClassifier("zero features".into()));
        }
        if self.trees.is_empty() {
            return Err(Error::InvalidClassifier("forest has no trees".into()));
        }
        for tree in &self.trees {
            tree.validate(self.n_features, self.classes.len())?;
        }
        Ok(())
    }

    /// Mean of the normalized leaf distributions.
    fn probabilities(&self, row: &[f64]) -> Vec<f64> {
        let mut acc = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let leaf = tree.leaf_for(row);
            let total: f64 = leaf.iter().sum();
            for (a, w) in acc.iter_mut().zip(leaf) {
                *a += w / total;
            }
        }
        let n = self.trees.len() as f64;
        acc.iter_mut().for_each(|a| *a /= n);
        acc
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, row: &[f64]) -> Result<i64> {
        check_row(self.n_features, row)?;
        Ok(self.classes[argmax(&self.probabilities(row))])
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Option<Vec<f64>>> {
        check_row(self.n_features, row)?;
        Ok(Some(self.probabilities(row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn leaf(w: &[f64]) -> Box<TreeNode> {
        Box::new(TreeNode::Leaf { class_weights: w.to_vec() })
    }

    fn stump(feature: usize, threshold: f64, l: &[f64], r: &[f64]) -> TreeNode {
        TreeNode::Split { feature, threshold, left: leaf(l), right: leaf(r) }
    }

    fn forest() -> RandomForest {
        RandomForest::new(
            vec![0, 1],
            2,
            vec![
                stump(0, 0.0, &[8.0, 2.0], &[1.0, 9.0]),
                stump(1, 0.5, &[3.0, 1.0], &[0.0, 4.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn soft_vote_averages_leaves() {
        let f = forest();
        let p = f.predict_proba(&[-1.0, 0.0]).unwrap().unwrap();
        // (0.8 + 0.75) / 2, (0.2 + 0.25) / 2
        assert_relative_eq!(p[0], 0.775);
        assert_relative_eq!(p[1], 0.225);
        assert_eq!(f.predict(&[-1.0, 0.0]).unwrap(), 0);
        assert_eq!(f.predict(&[1.0, 1.0]).unwrap(), 1);
    }

    #[test]
    fn threshold_is_inclusive_left() {
        let f = RandomForest::new(vec![4, 2], 1, vec![stump(0, 1.0, &[1.0, 0.0], &[0.0, 1.0])]).unwrap();
        assert_eq!(f.predict(&[1.0]).unwrap(), 4);
        assert_eq!(f.predict(&[1.0001]).unwrap(), 2);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let f = forest();
        for row in [[-1.0, 0.0], [1.0, 1.0], [0.0, 0.5], [5.0, -5.0]] {
            let p = f.predict_proba(&row).unwrap().unwrap();
            assert_relative_eq!(p.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn invalid_trees_rejected() {
        assert!(RandomForest::new(vec![0, 1], 2, vec![]).is_err());
        assert!(RandomForest::new(vec![0, 1], 2, vec![stump(2, 0.0, &[1.0, 0.0], &[0.0, 1.0])]).is_err());
        assert!(RandomForest::new(vec![0, 1], 2, vec![stump(0, 0.0, &[1.0], &[0.0, 1.0])]).is_err());
        assert!(RandomForest::new(vec![0, 1], 2, vec![stump(0, 0.0, &[0.0, 0.0], &[0.0, 1.0])]).is_err());
    }

    #[test]
    fn depth_counts_splits() {
        let deep = TreeNode::Split {
            feature: 0,
            threshold: 0.0,
            left: Box::new(stump(1, 0.0, &[1.0], &[1.0])),
            right: leaf(&[1.0]),
        };
        assert_eq!(deep.depth(), 2);
    }

    #[test]
    fn parses_nested_json() {
        let json = r#"{
            "classes": [0, 1],
            "n_features": 1,
            "trees": [
                {"split": {"feature": 0, "threshold": 2.0,
                    "left": {"leaf": {"class_weights": [5, 0]}},
                    "right": {"leaf": {"class_weights": [1, 4]}}}}
            ]
        }"#;
        let f: RandomForest = serde_json::from_str(json).unwrap();
        f.validate().unwrap();
        assert_eq!(f.predict(&[3.0]).unwrap(), 1);
    }
}

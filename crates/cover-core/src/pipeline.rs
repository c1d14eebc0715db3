//! Feature assembly and inference.
//!
//! A record is scaled on the scaler's numeric columns, recombined with the
//! unscaled soil indicators, realigned to the selected column order, and
//! handed to the classifier. The class index is then mapped to a label.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::classifier::{Classifier, ClassifierArtifact};
use crate::columns::{partition, Partition, SelectedColumns};
use crate::error::{Error, Result};
use crate::features::FeatureRecord;
use crate::labels::{cover_type_name, CoverType};
use crate::scaler::{Scaler, ScalerArtifact};

/// Single pre-inference row, columns in classifier order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledRow {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl AssembledRow {
    pub fn new(columns: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(Error::FeatureCount { expected: columns.len(), found: values.len() });
        }
        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns.iter().position(|c| c == name).map(|i| self.values[i])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProbability {
    pub class_index: i64,
    pub label: &'static str,
    pub probability: f64,
}

/// Result of one prediction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub class_index: i64,
    pub label: &'static str,
    /// Present when the classifier has a probability output.
    pub probabilities: Option<Vec<ClassProbability>>,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicted forest cover type: {} (class {})", self.label, self.class_index)
    }
}

/// Loaded scaler, classifier and column contract. Built once, then shared by
/// reference across requests.
#[derive(Debug, Clone)]
pub struct InferenceContext<S = ScalerArtifact, C = ClassifierArtifact> {
    scaler: S,
    classifier: C,
    selected: SelectedColumns,
    partition: Partition,
}

impl<S: Scaler, C: Classifier> InferenceContext<S, C> {
    pub fn new(scaler: S, classifier: C, selected: SelectedColumns) -> Result<Self> {
        if classifier.n_features() != selected.len() {
            return Err(Error::FeatureCount { expected: selected.len(), found: classifier.n_features() });
        }
        for class in classifier.classes() {
            if CoverType::from_index(*class).is_none() {
                warn!(class, "classifier class has no cover type label");
            }
        }
        let partition = partition(&selected, scaler.feature_names());
        debug!(
            numeric = ?partition.numeric,
            categorical = ?partition.categorical,
            "partitioned selected columns"
        );
        Ok(Self { scaler, classifier, selected, partition })
    }

    pub fn scaler(&self) -> &S {
        &self.scaler
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn selected(&self) -> &SelectedColumns {
        &self.selected
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Scale, recombine and realign a record into classifier column order.
    pub fn assemble(&self, record: &FeatureRecord) -> Result<AssembledRow> {
        let numeric_names = self.scaler.feature_names();
        let raw = numeric_names.iter().map(|n| record.get(n)).collect::<Result<Vec<_>>>()?;
        let scaled = self.scaler.transform(numeric_names, &raw)?;
        if scaled.len() != numeric_names.len() {
            return Err(Error::ScalerInput(format!(
                "scaler returned {} values for {} columns",
                scaled.len(),
                numeric_names.len()
            )));
        }

        // Scaled numeric columns first, then the untouched categorical ones.
        let mut combined_names: Vec<String> = numeric_names.to_vec();
        let mut combined_values = scaled;
        for name in &self.partition.categorical {
            combined_values.push(record.get(name)?);
            combined_names.push(name.clone());
        }

        let mut values = Vec::with_capacity(self.selected.len());
        for name in self.selected.names() {
            match combined_names.iter().position(|c| c == name) {
                Some(i) => values.push(combined_values[i]),
                None => {
                    return Err(Error::ColumnMismatch {
                        expected: self.selected.names().to_vec(),
                        found: combined_names,
                    })
                }
            }
        }
        AssembledRow::new(self.selected.names().to_vec(), values)
    }

    /// Run the classifier on an already assembled row.
    pub fn predict_row(&self, row: &AssembledRow) -> Result<Prediction> {
        if row.columns() != self.selected.names() {
            return Err(Error::ColumnMismatch {
                expected: self.selected.names().to_vec(),
                found: row.columns().to_vec(),
            });
        }
        let class_index = self.classifier.predict(row.values())?;
        let label = cover_type_name(class_index);

        let classes = self.classifier.classes();
        let probabilities = match self.classifier.predict_proba(row.values())? {
            Some(probs) => {
                if probs.len() != classes.len() {
                    return Err(Error::ProbabilityCount { expected: classes.len(), found: probs.len() });
                }
                Some(
                    classes
                        .iter()
                        .zip(probs)
                        .map(|(c, p)| ClassProbability {
                            class_index: *c,
                            label: cover_type_name(*c),
                            probability: p,
                        })
                        .collect(),
                )
            }
            None => None,
        };

        debug!(class_index, label, "prediction");
        Ok(Prediction { class_index, label, probabilities })
    }

    /// Assemble a record and predict its cover type.
    pub fn predict(&self, record: &FeatureRecord) -> Result<Prediction> {
        let row = self.assemble(record)?;
        self.predict_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LogisticRegression;
    use crate::features::*;
    use crate::scaler::StandardScaler;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::cell::Cell;

    const NUMERIC: [&str; 9] = [
        ELEVATION,
        HD_ROADWAYS,
        HD_FIRE_POINTS,
        HD_HYDROLOGY,
        VD_HYDROLOGY,
        ASPECT,
        HILLSHADE_3PM,
        HILLSHADE_NOON,
        SLOPE,
    ];

    /// Selected order interleaves soil flags with numeric columns.
    const SELECTED: [&str; 15] = [
        ELEVATION,
        SOIL_TYPE_29,
        HD_ROADWAYS,
        HD_FIRE_POINTS,
        SOIL_TYPE_25,
        HD_HYDROLOGY,
        VD_HYDROLOGY,
        ASPECT,
        SOIL_TYPE_27,
        HILLSHADE_3PM,
        HILLSHADE_NOON,
        SOIL_TYPE_26,
        SLOPE,
        SOIL_TYPE_21,
        SOIL_TYPE_24,
    ];

    fn strings(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    fn scaler() -> StandardScaler {
        StandardScaler::new(
            strings(&NUMERIC),
            vec![2750.0, 2350.0, 1980.0, 270.0, 46.0, 156.0, 143.0, 223.0, 14.0],
            vec![420.0, 1560.0, 1320.0, 210.0, 58.0, 112.0, 38.0, 20.0, 7.5],
        )
        .unwrap()
    }

    fn selected() -> SelectedColumns {
        SelectedColumns::new(strings(&SELECTED)).unwrap()
    }

    /// Elevation-only model: class 6 above the mean, class 2 below.
    fn elevation_model() -> LogisticRegression {
        let mut coef = vec![vec![0.0; 15]; 7];
        coef[6][0] = 4.0;
        coef[2][0] = -4.0;
        LogisticRegression::new((0..7).collect(), coef, vec![0.0; 7]).unwrap()
    }

    fn context() -> InferenceContext<StandardScaler, LogisticRegression> {
        InferenceContext::new(scaler(), elevation_model(), selected()).unwrap()
    }

    /// Counts calls and returns fixed outputs.
    struct Spy {
        classes: Vec<i64>,
        class: i64,
        probs: Option<Vec<f64>>,
        calls: Cell<usize>,
    }

    impl Classifier for Spy {
        fn n_features(&self) -> usize {
            15
        }
        fn classes(&self) -> &[i64] {
            &self.classes
        }
        fn predict(&self, _row: &[f64]) -> Result<i64> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.class)
        }
        fn predict_proba(&self, _row: &[f64]) -> Result<Option<Vec<f64>>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.probs.clone())
        }
    }

    fn spy(classes: Vec<i64>, class: i64, probs: Option<Vec<f64>>) -> Spy {
        Spy { classes, class, probs, calls: Cell::new(0) }
    }

    #[test]
    fn assembled_row_follows_selected_order() {
        let row = context().assemble(&FeatureRecord::from_defaults()).unwrap();
        assert_eq!(row.columns(), &strings(&SELECTED)[..]);
        assert_eq!(row.values().len(), 15);
    }

    #[test]
    fn numeric_columns_scaled_soil_passed_through() {
        let rec = FeatureRecord::from_defaults().with_soil(SOIL_TYPE_26, true).unwrap();
        let row = context().assemble(&rec).unwrap();
        assert_relative_eq!(row.get(ELEVATION).unwrap(), (2500.0 - 2750.0) / 420.0);
        assert_relative_eq!(row.get(HILLSHADE_NOON).unwrap(), (220.0 - 223.0) / 20.0);
        assert_relative_eq!(row.get(SLOPE).unwrap(), (10.0 - 14.0) / 7.5);
        assert_eq!(row.get(SOIL_TYPE_26), Some(1.0));
        assert_eq!(row.get(SOIL_TYPE_21), Some(0.0));
    }

    #[test]
    fn partition_splits_soil_flags_out() {
        let ctx = context();
        assert_eq!(ctx.partition().numeric.len(), 9);
        assert_eq!(
            ctx.partition().categorical,
            strings(&[SOIL_TYPE_29, SOIL_TYPE_25, SOIL_TYPE_27, SOIL_TYPE_26, SOIL_TYPE_21, SOIL_TYPE_24])
        );
    }

    #[test]
    fn flipping_one_soil_flag_changes_only_that_column() {
        let ctx = context();
        let base = FeatureRecord::from_defaults();
        let a = ctx.assemble(&base).unwrap();
        let b = ctx.assemble(&base.with_soil(SOIL_TYPE_29, true).unwrap()).unwrap();
        for (i, name) in a.columns().iter().enumerate() {
            if name == SOIL_TYPE_29 {
                assert_eq!((a.values()[i], b.values()[i]), (0.0, 1.0));
            } else {
                assert_eq!(a.values()[i], b.values()[i], "{name} changed");
            }
        }
    }

    #[test]
    fn missing_key_fails_before_classifier() {
        let classifier = spy((0..7).collect(), 0, None);
        let ctx = InferenceContext::new(scaler(), classifier, selected()).unwrap();
        for name in [HD_FIRE_POINTS, SOIL_TYPE_24] {
            let mut rec = FeatureRecord::from_defaults();
            rec.remove(name);
            assert!(matches!(ctx.predict(&rec), Err(Error::MissingFeature(n)) if n == name));
        }
        assert_eq!(ctx.classifier().calls.get(), 0);
    }

    #[test]
    fn elevation_drives_prediction() {
        let ctx = context();
        let mut rec = FeatureRecord::from_defaults();
        rec.insert(ELEVATION, 3600.0).unwrap();
        let high = ctx.predict(&rec).unwrap();
        assert_eq!((high.class_index, high.label), (6, "Krummholz"));

        rec.insert(ELEVATION, 1900.0).unwrap();
        let low = ctx.predict(&rec).unwrap();
        assert_eq!((low.class_index, low.label), (2, "Ponderosa Pine"));
        assert_eq!(low.to_string(), "Predicted forest cover type: Ponderosa Pine (class 2)");

        let probs = low.probabilities.unwrap();
        assert_eq!(probs.len(), 7);
        assert_relative_eq!(probs.iter().map(|p| p.probability).sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn probabilities_follow_classifier_class_order() {
        let classes: Vec<i64> = (0..7).rev().collect();
        let probs = vec![0.7, 0.1, 0.05, 0.05, 0.05, 0.03, 0.02];
        let ctx = InferenceContext::new(scaler(), spy(classes, 6, Some(probs)), selected()).unwrap();
        let p = ctx.predict(&FeatureRecord::from_defaults()).unwrap();
        let table = p.probabilities.unwrap();
        assert_eq!(table[0].class_index, 6);
        assert_eq!(table[0].label, "Krummholz");
        assert_relative_eq!(table[0].probability, 0.7);
        assert_eq!(table[6].label, "Spruce/Fir");
    }

    #[test]
    fn probability_count_mismatch_is_an_error() {
        let ctx = InferenceContext::new(scaler(), spy((0..7).collect(), 0, Some(vec![1.0])), selected()).unwrap();
        assert!(matches!(
            ctx.predict(&FeatureRecord::from_defaults()),
            Err(Error::ProbabilityCount { expected: 7, found: 1 })
        ));
    }

    #[test]
    fn unknown_class_gets_fallback_label() {
        let ctx = InferenceContext::new(scaler(), spy(vec![0, 9], 9, None), selected()).unwrap();
        let p = ctx.predict(&FeatureRecord::from_defaults()).unwrap();
        assert_eq!((p.class_index, p.label), (9, "Unknown"));
        assert!(p.probabilities.is_none());
    }

    #[test]
    fn feature_count_mismatch_rejected_at_construction() {
        let narrow = LogisticRegression::new(vec![0, 1], vec![vec![0.0; 3]; 2], vec![0.0; 2]).unwrap();
        assert!(matches!(
            InferenceContext::new(scaler(), narrow, selected()),
            Err(Error::FeatureCount { expected: 15, found: 3 })
        ));
    }

    #[test]
    fn selected_column_absent_from_record_fails() {
        let mut names = strings(&SELECTED);
        names[14] = "Soil_Type_1".to_string();
        let ctx = InferenceContext::new(scaler(), elevation_model(), SelectedColumns::new(names).unwrap()).unwrap();
        assert!(matches!(
            ctx.assemble(&FeatureRecord::from_defaults()),
            Err(Error::MissingFeature(n)) if n == "Soil_Type_1"
        ));
    }

    #[test]
    fn foreign_row_layout_rejected() {
        let ctx = context();
        let row = AssembledRow::new(strings(&NUMERIC), vec![0.0; 9]).unwrap();
        assert!(matches!(ctx.predict_row(&row), Err(Error::ColumnMismatch { .. })));
        assert!(AssembledRow::new(strings(&NUMERIC), vec![0.0; 2]).is_err());
    }

    fn record_strategy() -> impl Strategy<Value = FeatureRecord> {
        proptest::collection::vec(0.0f64..1.0, FEATURES.len()).prop_map(|fractions| {
            let mut rec = FeatureRecord::new();
            for (f, t) in FEATURES.iter().zip(fractions) {
                let v = (f.min as f64 + t * (f.max - f.min) as f64).round();
                rec.insert(f.name, v).unwrap();
            }
            rec
        })
    }

    proptest! {
        #[test]
        fn valid_records_assemble_deterministically(rec in record_strategy()) {
            rec.validate().unwrap();
            let ctx = context();
            let a = ctx.assemble(&rec).unwrap();
            let b = ctx.assemble(&rec).unwrap();
            prop_assert_eq!(a.columns(), &strings(&SELECTED)[..]);
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(ctx.predict(&rec).unwrap(), ctx.predict(&rec).unwrap());
        }
    }
}

//! Fitted numeric scalers.
//!
//! A scaler knows the ordered names it was fitted on and maps values for
//! exactly those names to scaled values of the same length and order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Capability consumed by the pipeline.
pub trait Scaler {
    /// Ordered feature names the scaler expects.
    fn feature_names(&self) -> &[String];

    /// Scale `values`, given for `names`. `names` must equal
    /// [`Scaler::feature_names`] in content and order.
    fn transform(&self, names: &[String], values: &[f64]) -> Result<Vec<f64>>;
}

fn check_input(expected: &[String], names: &[String], values: &[f64]) -> Result<()> {
    if names != expected {
        return Err(Error::ScalerInput(format!("expected columns {expected:?}, got {names:?}")));
    }
    if values.len() != names.len() {
        return Err(Error::ScalerInput(format!(
            "{} names but {} values",
            names.len(),
            values.len()
        )));
    }
    Ok(())
}

fn check_params(names: &[String], params: &[(&str, usize)]) -> Result<()> {
    if names.is_empty() {
        return Err(Error::InvalidScaler("no feature names".into()));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
        return Err(Error::InvalidScaler(format!("duplicate feature name {dup}")));
    }
    for (param, len) in params {
        if *len != names.len() {
            return Err(Error::InvalidScaler(format!(
                "{param} has {len} entries for {} features",
                names.len()
            )));
        }
    }
    Ok(())
}

// ── Standard ─────────────────────────────────────────────────────────────────

/// z = (x - mean) / scale. A zero scale is treated as 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names_in: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(feature_names_in: Vec<String>, mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let s = Self { feature_names_in, mean, scale };
        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<()> {
        check_params(&self.feature_names_in, &[("mean", self.mean.len()), ("scale", self.scale.len())])
    }
}

impl Scaler for StandardScaler {
    fn feature_names(&self) -> &[String] {
        &self.feature_names_in
    }

    fn transform(&self, names: &[String], values: &[f64]) -> Result<Vec<f64>> {
        check_input(&self.feature_names_in, names, values)?;
        Ok(values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| {
                let s = if *s == 0.0 { 1.0 } else { *s };
                (x - m) / s
            })
            .collect())
    }
}

// ── Min-max ──────────────────────────────────────────────────────────────────

/// Maps [data_min, data_max] onto `feature_range`. A zero data range is treated as 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub feature_names_in: Vec<String>,
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default = "unit_range")]
    pub feature_range: (f64, f64),
}

fn unit_range() -> (f64, f64) {
    (0.0, 1.0)
}

impl MinMaxScaler {
    pub fn new(feature_names_in: Vec<String>, data_min: Vec<f64>, data_max: Vec<f64>) -> Result<Self> {
        let s = Self { feature_names_in, data_min, data_max, feature_range: unit_range() };
        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<()> {
        check_params(
            &self.feature_names_in,
            &[("data_min", self.data_min.len()), ("data_max", self.data_max.len())],
        )?;
        let (lo, hi) = self.feature_range;
        if lo.partial_cmp(&hi) != Some(std::cmp::Ordering::Less) {
            return Err(Error::InvalidScaler(format!("feature_range ({lo}, {hi}) is empty")));
        }
        Ok(())
    }
}

impl Scaler for MinMaxScaler {
    fn feature_names(&self) -> &[String] {
        &self.feature_names_in
    }

    fn transform(&self, names: &[String], values: &[f64]) -> Result<Vec<f64>> {
        check_input(&self.feature_names_in, names, values)?;
        let (lo, hi) = self.feature_range;
        Ok(values
            .iter()
            .zip(self.data_min.iter().zip(&self.data_max))
            .map(|(x, (min, max))| {
                let range = if max - min == 0.0 { 1.0 } else { max - min };
                (x - min) / range * (hi - lo) + lo
            })
            .collect())
    }
}

// ── Persisted form ───────────────────────────────────────────────────────────

/// Serialized scaler, tagged by family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

impl ScalerArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ScalerArtifact::Standard(_) => "standard",
            ScalerArtifact::MinMax(_) => "min_max",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ScalerArtifact::Standard(s) => s.validate(),
            ScalerArtifact::MinMax(s) => s.validate(),
        }
    }
}

impl Scaler for ScalerArtifact {
    fn feature_names(&self) -> &[String] {
        match self {
            ScalerArtifact::Standard(s) => s.feature_names(),
            ScalerArtifact::MinMax(s) => s.feature_names(),
        }
    }

    fn transform(&self, names: &[String], values: &[f64]) -> Result<Vec<f64>> {
        match self {
            ScalerArtifact::Standard(s) => s.transform(names, values),
            ScalerArtifact::MinMax(s) => s.transform(names, values),
        }
    }
}

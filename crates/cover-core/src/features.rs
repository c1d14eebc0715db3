/// The 15 terrain and soil inputs: their names, widget bounds and defaults,
/// and the per-request record that carries user-supplied values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ── Feature names ────────────────────────────────────────────────────────────

pub const ELEVATION: &str = "Elevation";
pub const HD_HYDROLOGY: &str = "Horizontal_Distance_To_Hydrology";
pub const HD_ROADWAYS: &str = "Horizontal_Distance_To_Roadways";
pub const HD_FIRE_POINTS: &str = "Horizontal_Distance_To_Fire_Points";
pub const VD_HYDROLOGY: &str = "Vertical_Distance_To_Hydrology";
pub const ASPECT: &str = "Aspect";
pub const HILLSHADE_3PM: &str = "Hillshade_3pm";
pub const HILLSHADE_NOON: &str = "Hillshade_Noon";
pub const SLOPE: &str = "Slope";
pub const SOIL_TYPE_29: &str = "Soil_Type_29";
pub const SOIL_TYPE_25: &str = "Soil_Type_25";
pub const SOIL_TYPE_27: &str = "Soil_Type_27";
pub const SOIL_TYPE_26: &str = "Soil_Type_26";
pub const SOIL_TYPE_21: &str = "Soil_Type_21";
pub const SOIL_TYPE_24: &str = "Soil_Type_24";

// ── Specs ────────────────────────────────────────────────────────────────────

/// How a feature is collected on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Slider,
    Number,
    /// 0 = No, 1 = Yes.
    Binary,
}

/// Static description of one form input. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: WidgetKind,
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

impl FeatureSpec {
    const fn new(name: &'static str, kind: WidgetKind, min: i64, max: i64, default: i64) -> Self {
        Self { name, kind, min, max, default }
    }

    const fn soil(name: &'static str) -> Self {
        Self::new(name, WidgetKind::Binary, 0, 1, 0)
    }

    pub fn is_binary(&self) -> bool {
        self.kind == WidgetKind::Binary
    }

    /// Check a value against this feature's bounds.
    pub fn check(&self, value: f64) -> Result<()> {
        if self.is_binary() {
            if value == 0.0 || value == 1.0 {
                return Ok(());
            }
            return Err(Error::NotBinary { name: self.name.to_string(), value });
        }
        if value.is_finite() && value >= self.min as f64 && value <= self.max as f64 {
            Ok(())
        } else {
            Err(Error::OutOfRange { name: self.name.to_string(), value, min: self.min, max: self.max })
        }
    }
}

/// All 15 features in form order: 3 sliders, 6 numeric entries, 6 soil selectors.
pub const FEATURES: [FeatureSpec; 15] = [
    FeatureSpec::new(ELEVATION, WidgetKind::Slider, 1000, 4000, 2500),
    FeatureSpec::new(HD_HYDROLOGY, WidgetKind::Slider, 0, 6000, 1000),
    FeatureSpec::new(HD_ROADWAYS, WidgetKind::Slider, 0, 6000, 1000),
    FeatureSpec::new(HD_FIRE_POINTS, WidgetKind::Number, 0, 7000, 1000),
    FeatureSpec::new(VD_HYDROLOGY, WidgetKind::Number, -500, 500, 30),
    FeatureSpec::new(ASPECT, WidgetKind::Number, 0, 360, 180),
    FeatureSpec::new(HILLSHADE_3PM, WidgetKind::Number, 0, 255, 200),
    FeatureSpec::new(HILLSHADE_NOON, WidgetKind::Number, 0, 255, 220),
    FeatureSpec::new(SLOPE, WidgetKind::Number, 0, 70, 10),
    FeatureSpec::soil(SOIL_TYPE_29),
    FeatureSpec::soil(SOIL_TYPE_25),
    FeatureSpec::soil(SOIL_TYPE_27),
    FeatureSpec::soil(SOIL_TYPE_26),
    FeatureSpec::soil(SOIL_TYPE_21),
    FeatureSpec::soil(SOIL_TYPE_24),
];

pub fn feature_spec(name: &str) -> Option<&'static FeatureSpec> {
    FEATURES.iter().find(|f| f.name == name)
}

// ── Record ───────────────────────────────────────────────────────────────────

/// One row of named inputs for a single prediction request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    values: BTreeMap<String, f64>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record holding every feature's form default.
    pub fn from_defaults() -> Self {
        let values = FEATURES.iter().map(|f| (f.name.to_string(), f.default as f64)).collect();
        Self { values }
    }

    /// Set a feature value. Only the 15 known names are accepted.
    pub fn insert(&mut self, name: &str, value: f64) -> Result<()> {
        let spec = feature_spec(name).ok_or_else(|| Error::UnknownFeature(name.to_string()))?;
        self.values.insert(spec.name.to_string(), value);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Result<f64> {
        self.values.get(name).copied().ok_or_else(|| Error::MissingFeature(name.to_string()))
    }

    /// Copy of this record with one soil indicator switched.
    pub fn with_soil(&self, name: &str, present: bool) -> Result<Self> {
        match feature_spec(name) {
            Some(spec) if spec.is_binary() => {
                let mut out = self.clone();
                out.values.insert(spec.name.to_string(), if present { 1.0 } else { 0.0 });
                Ok(out)
            }
            _ => Err(Error::UnknownFeature(name.to_string())),
        }
    }

    /// Every known feature present and in bounds; no extra names.
    pub fn validate(&self) -> Result<()> {
        for spec in &FEATURES {
            spec.check(self.get(spec.name)?)?;
        }
        if let Some(extra) = self.values.keys().find(|k| feature_spec(k).is_none()) {
            return Err(Error::UnknownFeature(extra.clone()));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

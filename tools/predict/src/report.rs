use std::fmt::Write as _;

use anyhow::Result;
use clap::ValueEnum;
use cover_core::{FeatureRecord, Prediction};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    features: &'a FeatureRecord,
    prediction: &'a Prediction,
}

/// Success line, then the probability table when present and wanted.
pub fn render_text(prediction: &Prediction, show_probabilities: bool) -> String {
    let mut out = format!("{prediction}\n");
    if let Some(probs) = prediction.probabilities.as_ref().filter(|_| show_probabilities) {
        let width = probs.iter().map(|p| p.label.len()).max().unwrap_or(0).max("Class".len());
        out.push_str("\nClass probabilities\n");
        let _ = writeln!(out, "{:<width$}  Probability", "Class");
        for p in probs {
            let _ = writeln!(out, "{:<width$}  {:.4}", p.label, p.probability);
        }
    }
    out
}

pub fn render_json(record: &FeatureRecord, prediction: &Prediction, show_probabilities: bool) -> Result<String> {
    let mut prediction = prediction.clone();
    if !show_probabilities {
        prediction.probabilities = None;
    }
    let report = JsonReport { features: record, prediction: &prediction };
    Ok(serde_json::to_string_pretty(&report)?)
}

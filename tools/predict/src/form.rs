/// Terminal form for the 15 inputs: one prompt per feature, in form order.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use cover_core::{FeatureRecord, FeatureSpec, WidgetKind, FEATURES};

fn section_title(kind: WidgetKind) -> &'static str {
    match kind {
        WidgetKind::Slider => "Input Features",
        WidgetKind::Number => "Additional Features",
        WidgetKind::Binary => "Soil Type (0 = No, 1 = Yes)",
    }
}

/// Prompt for every feature. An empty line takes the default; invalid or
/// out-of-bounds answers are asked again.
pub fn prompt_record<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<FeatureRecord> {
    let mut record = FeatureRecord::new();
    let mut section = None;
    for spec in &FEATURES {
        if section != Some(spec.kind) {
            writeln!(out, "\n== {} ==", section_title(spec.kind))?;
            section = Some(spec.kind);
        }
        let value = prompt_feature(spec, input, out)?;
        record.insert(spec.name, value)?;
    }
    Ok(record)
}

fn prompt_feature<R: BufRead, W: Write>(spec: &FeatureSpec, input: &mut R, out: &mut W) -> Result<f64> {
    loop {
        write!(out, "{} [{}..={}] (default {}): ", spec.name, spec.min, spec.max, spec.default)?;
        out.flush()?;

        let mut line = String::new();
        let n = input.read_line(&mut line).context("reading form input")?;
        if n == 0 {
            bail!("input closed before {} was entered", spec.name);
        }
        let answer = line.trim();
        if answer.is_empty() {
            return Ok(spec.default as f64);
        }
        match answer.parse::<f64>() {
            Ok(v) => match spec.check(v) {
                Ok(()) => return Ok(v),
                Err(e) => writeln!(out, "  {e}, try again")?,
            },
            Err(_) => writeln!(out, "  '{answer}' is not a number, try again")?,
        }
    }
}

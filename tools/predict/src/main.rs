/// Forest cover type prediction form.
/// Collects the 15 terrain and soil inputs, runs them through the loaded
/// scaler and classifier, and prints the predicted cover type.

mod form;
mod report;

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cover_core::features::*;
use cover_core::{Artifacts, FeatureRecord, PredictorConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use report::Format;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "predict", about = "Predict forest cover type from 15 terrain & soil features")]
struct Args {
    /// JSON config file (see PredictorConfig).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Classifier artifact, overrides the config.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Scaler + selected-columns artifact, overrides the config.
    #[arg(long)]
    processed: Option<PathBuf>,

    /// Prompt for every feature on stdin instead of using the flags.
    #[arg(short, long)]
    interactive: bool,

    /// Read the feature record from a flat JSON object.
    #[arg(long, conflicts_with = "interactive")]
    input: Option<PathBuf>,

    /// Do not print class probabilities.
    #[arg(long)]
    no_probabilities: bool,

    /// Skip writing the artifacts back at the end of the run.
    #[arg(long)]
    no_resave: bool,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(flatten)]
    features: FeatureArgs,
}

/// One flag per form input, bounded like the form widgets.
#[derive(clap::Args, Debug)]
struct FeatureArgs {
    #[arg(long, default_value_t = 2500, value_parser = clap::value_parser!(i64).range(1000..=4000))]
    elevation: i64,
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(i64).range(0..=6000))]
    hd_hydro: i64,
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(i64).range(0..=6000))]
    hd_roads: i64,
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(i64).range(0..=7000))]
    hd_fire: i64,
    #[arg(long, default_value_t = 30, allow_negative_numbers = true,
          value_parser = clap::value_parser!(i64).range(-500..=500))]
    vd_hydro: i64,
    #[arg(long, default_value_t = 180, value_parser = clap::value_parser!(i64).range(0..=360))]
    aspect: i64,
    #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(i64).range(0..=255))]
    hillshade_3pm: i64,
    #[arg(long, default_value_t = 220, value_parser = clap::value_parser!(i64).range(0..=255))]
    hillshade_noon: i64,
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(i64).range(0..=70))]
    slope: i64,

    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i64).range(0..=1))]
    soil_29: i64,
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i64).range(0..=1))]
    soil_25: i64,
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i64).range(0..=1))]
    soil_27: i64,
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i64).range(0..=1))]
    soil_26: i64,
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i64).range(0..=1))]
    soil_21: i64,
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i64).range(0..=1))]
    soil_24: i64,
}

impl FeatureArgs {
    fn to_record(&self) -> Result<FeatureRecord> {
        let mut rec = FeatureRecord::new();
        for (name, value) in [
            (ELEVATION, self.elevation),
            (HD_ROADWAYS, self.hd_roads),
            (HD_FIRE_POINTS, self.hd_fire),
            (HD_HYDROLOGY, self.hd_hydro),
            (VD_HYDROLOGY, self.vd_hydro),
            (ASPECT, self.aspect),
            (HILLSHADE_3PM, self.hillshade_3pm),
            (HILLSHADE_NOON, self.hillshade_noon),
            (SLOPE, self.slope),
            (SOIL_TYPE_29, self.soil_29),
            (SOIL_TYPE_25, self.soil_25),
            (SOIL_TYPE_27, self.soil_27),
            (SOIL_TYPE_26, self.soil_26),
            (SOIL_TYPE_21, self.soil_21),
            (SOIL_TYPE_24, self.soil_24),
        ] {
            rec.insert(name, value as f64)?;
        }
        Ok(rec)
    }
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn collect_record(args: &Args) -> Result<FeatureRecord> {
    if let Some(path) = &args.input {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        return serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()));
    }
    if args.interactive {
        let stdin = io::stdin();
        return form::prompt_record(&mut stdin.lock(), &mut io::stdout());
    }
    args.features.to_record()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = PredictorConfig::load(args.config.as_deref()).context("loading config")?;
    if let Some(model) = &args.model {
        config.model_path = model.clone();
    }
    if let Some(processed) = &args.processed {
        config.processed_path = processed.clone();
    }
    if args.no_probabilities {
        config.show_probabilities = false;
    }
    if args.no_resave {
        config.resave_artifacts = false;
    }
    init_logging(&config.log_filter);

    let paths = config.artifact_paths();
    let ctx = Artifacts::load(&paths)
        .context("loading artifacts")?
        .into_context()
        .context("artifacts do not fit together")?;

    let record = collect_record(&args)?;
    record.validate().context("invalid feature record")?;

    let row = ctx.assemble(&record)?;
    info!(columns = row.columns().len(), "all features processed and scaled");
    let prediction = ctx.predict_row(&row)?;

    match args.format {
        Format::Text => print!("{}", report::render_text(&prediction, config.show_probabilities)),
        Format::Json => println!("{}", report::render_json(&record, &prediction, config.show_probabilities)?),
    }

    if config.resave_artifacts {
        ctx.to_artifacts().save(&paths).context("re-saving artifacts")?;
    }
    Ok(())
}

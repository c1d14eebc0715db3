/// Artifact checker: loads a classifier/scaler pair, verifies that they fit
/// the column contract, smoke-tests the default record, and optionally checks
/// that re-saving is a no-op round trip.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cover_core::{cover_type_name, ArtifactPaths, Artifacts, Classifier, FeatureRecord, Scaler};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "validate_artifacts", about = "Check a classifier + scaler artifact pair")]
struct Args {
    /// Classifier artifact.
    #[arg(long, default_value = "best_model.json")]
    model: PathBuf,

    /// Scaler + selected-columns artifact.
    #[arg(long, default_value = "processed_data.json")]
    processed: PathBuf,

    /// Also save into this scratch directory and verify the reload matches.
    #[arg(long)]
    round_trip_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let paths = ArtifactPaths { model: args.model.clone(), processed: args.processed.clone() };
    let artifacts = Artifacts::load(&paths).context("loading artifacts")?;

    println!("scaler:     {} over {:?}", artifacts.processed.scaler.kind(), artifacts.processed.scaler.feature_names());
    println!("classifier: {} ({} features)", artifacts.classifier.kind(), artifacts.classifier.n_features());
    for class in artifacts.classifier.classes() {
        println!("  class {class}: {}", cover_type_name(*class));
    }

    if let Some(dir) = &args.round_trip_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let scratch = ArtifactPaths::in_dir(dir);
        artifacts.save(&scratch)?;
        if Artifacts::load(&scratch)? != artifacts {
            bail!("artifacts changed across save/reload in {}", dir.display());
        }
        info!(dir = %dir.display(), "round trip ok");
    }

    let ctx = artifacts.into_context().context("artifacts do not fit together")?;
    println!("numeric:     {:?}", ctx.partition().numeric);
    println!("categorical: {:?}", ctx.partition().categorical);

    let prediction = ctx.predict(&FeatureRecord::from_defaults()).context("default record")?;
    println!("default record -> {prediction}");
    println!(
        "probabilities: {}",
        if prediction.probabilities.is_some() { "supported" } else { "not supported" }
    );
    Ok(())
}

mod args;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use choir_api::{Feature, ScoringCalibration, score};

use crate::args::{Cli, OutputFormat};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let user = load_feature(&cli.user)?;
    let reference = load_feature(&cli.reference)?;

    let calibration = ScoringCalibration::default();
    let report =
        score(&user, &reference, &calibration).map_err(|err| anyhow::anyhow!("invalid feature record: {err}"))?;

    match cli.format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => {
            let serialized = serde_json::to_string_pretty(&report).context("failed to serialize score report")?;
            println!("{serialized}");
        }
    }

    Ok(())
}

fn load_feature(path: &std::path::Path) -> Result<Feature> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading feature file {}", path.display()))?;
    Feature::from_json(&raw).with_context(|| format!("parsing feature file {}", path.display()))
}

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "choir-cli", version, about = "Score a user recording against a reference rendition")]
pub struct Cli {
    /// Path to the user recording's Feature JSON.
    #[arg(long, value_name = "PATH")]
    pub user: PathBuf,

    /// Path to the reference rendition's Feature JSON.
    #[arg(long, value_name = "PATH")]
    pub reference: PathBuf,

    /// Output format for the score report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary (`ScoreReport::render_text`).
    Text,
    /// Pretty-printed JSON matching the wire `ScoreReport` schema.
    Json,
}

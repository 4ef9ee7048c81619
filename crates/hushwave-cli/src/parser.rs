//! Root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Personalised ASMR sessions: composed scripts, Kokoro speech and
/// procedural ambience.
#[derive(Parser)]
#[command(name = "hushwave")]
#[command(about = "Generate and play personalised ASMR sessions")]
#[command(version)]
pub struct Cli {
    /// Override the speech model directory for this invocation
    #[arg(long = "models-dir", env = "HUSHWAVE_MODELS_DIR", global = true)]
    pub models_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

//! Available subcommands.

use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Compose a session script from a preference file and print it
    Script {
        /// Preference record (JSON)
        #[arg(long)]
        prefs: PathBuf,
        /// Apply a quick variation, e.g. "More rain sounds"
        #[arg(long)]
        variation: Option<String>,
    },

    /// Synthesize a session with the Kokoro voice for the listener's style
    Speak {
        /// Preference record (JSON)
        #[arg(long)]
        prefs: PathBuf,
        /// Speak this text instead of a composed script
        #[arg(long)]
        text: Option<String>,
        /// Write the result as a WAV file
        #[arg(long)]
        out: Option<PathBuf>,
        /// Play the result (default when --out is not given)
        #[arg(long)]
        play: bool,
    },

    /// Play ambient textures through the mixer
    Ambient {
        /// Sound id to start (repeatable; defaults to rain)
        #[arg(long = "sound")]
        sounds: Vec<String>,
        /// How long to play; Ctrl+C stops early
        #[arg(long, default_value_t = 30)]
        seconds: u64,
        /// Gain for every started sound (0.0-1.0)
        #[arg(long)]
        volume: Option<f32>,
    },

    /// Render one texture to a WAV file
    Render {
        /// Sound id (`rain` or `brushing`)
        sound: String,
        /// Length in seconds, up to one hour (defaults to the texture's loop length)
        #[arg(long)]
        seconds: Option<f32>,
        /// Destination WAV file
        #[arg(long)]
        out: PathBuf,
    },

    /// List the Kokoro voices and the speech model status
    Voices {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List audio output devices
    Devices,

    /// Show resolved data paths
    Paths,
}

//! Paths command handler.
//!
//! Prints every resolved location in `key = value` form for diagnostics.

use anyhow::Result;
use hushwave_audio::ModelCatalog;
use hushwave_core::paths;

use crate::bootstrap::CliContext;

pub fn execute(ctx: &CliContext) -> Result<()> {
    println!("data_root = {}", paths::data_root()?.display());
    println!("settings = {}", paths::settings_path()?.display());
    println!("models_dir = {}", ctx.models_dir.display());
    println!(
        "tts_model = {}",
        ModelCatalog::tts_model_path(&ctx.models_dir).display()
    );
    println!(
        "tts_model_downloaded = {}",
        ModelCatalog::is_tts_downloaded(&ctx.models_dir)
    );
    Ok(())
}

//! Voices command handler.

use anyhow::Result;
use hushwave_audio::{ModelCatalog, kokoro_voices};

use crate::bootstrap::CliContext;

pub fn execute(ctx: &CliContext, json: bool) -> Result<()> {
    let voices = kokoro_voices();
    if json {
        println!("{}", serde_json::to_string_pretty(&voices)?);
        return Ok(());
    }

    let model = ModelCatalog::tts_model();
    let status = if ModelCatalog::is_tts_downloaded(&ctx.models_dir) {
        "downloaded"
    } else {
        "not downloaded"
    };
    println!("{} ({}, {status})", model.name, model.size_display);
    println!();
    println!("{:<12} {:<12} {:<20} GENDER", "ID", "NAME", "CATEGORY");
    for v in voices {
        println!(
            "{:<12} {:<12} {:<20} {:?}",
            v.id, v.name, v.category, v.gender
        );
    }
    Ok(())
}

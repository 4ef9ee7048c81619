//! Script command handler.

use std::path::Path;

use anyhow::Result;
use hushwave_core::{Preferences, QuickVariation, ScriptComposer};

/// Compose a script for the preference file and print it.
pub fn execute(prefs_path: &Path, variation: Option<&str>) -> Result<()> {
    let prefs = Preferences::load(prefs_path)?;
    let script = ScriptComposer::compose(&prefs, &mut rand::thread_rng());
    println!("{}", apply_variation(&script, variation));
    Ok(())
}

/// Apply the named variation; unknown names leave the script unchanged.
fn apply_variation(script: &str, variation: Option<&str>) -> String {
    let Some(label) = variation else {
        return script.to_string();
    };
    match QuickVariation::from_label(label) {
        Some(v) => ScriptComposer::vary(script, v),
        None => {
            let known: Vec<&str> = QuickVariation::ALL.iter().map(|v| v.label()).collect();
            eprintln!("Unknown variation '{label}' (known: {})", known.join(", "));
            script.to_string()
        }
    }
}

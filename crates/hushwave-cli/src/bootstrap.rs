//! CLI bootstrap - the composition root.
//!
//! Settings and paths are resolved once here; handlers receive the
//! [`CliContext`] and never read configuration themselves.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use hushwave_audio::ModelLoader;
use hushwave_core::Settings;

/// Fully resolved configuration for CLI commands.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub settings: Settings,
    /// Where the speech model lives (settings, or the `--models-dir` override).
    pub models_dir: PathBuf,
}

/// Load settings and apply command-line overrides.
pub fn bootstrap(models_dir_override: Option<PathBuf>) -> Result<CliContext> {
    let settings = Settings::load()?;
    let models_dir = match models_dir_override {
        Some(dir) => dir,
        None => settings.effective_models_dir()?,
    };
    tracing::debug!(models_dir = %models_dir.display(), "CLI context ready");
    Ok(CliContext {
        settings,
        models_dir,
    })
}

/// The speech model loader for this build.
#[cfg(feature = "sherpa")]
pub fn speech_loader(models_dir: &Path) -> Result<Arc<dyn ModelLoader>> {
    use hushwave_audio::backend::sherpa_tts::SherpaModelLoader;

    Ok(Arc::new(SherpaModelLoader::new(models_dir.to_path_buf())))
}

/// The speech model loader for this build.
#[cfg(not(feature = "sherpa"))]
pub fn speech_loader(models_dir: &Path) -> Result<Arc<dyn ModelLoader>> {
    anyhow::bail!(
        "speech synthesis is not available in this build (models dir: {}); \
         rebuild with `--features sherpa`",
        models_dir.display()
    )
}

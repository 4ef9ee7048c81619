//! Speech model catalog and download helpers.
//!
//! The Kokoro v0.19 English model ships as a `.tar.bz2` archive in the
//! [`k2-fsa/sherpa-onnx`](https://github.com/k2-fsa/sherpa-onnx/releases)
//! releases. It extracts to `{models_dir}/tts/{dir_name}`, which holds the
//! files `sherpa-rs` expects.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::AudioError;

/// Release base URL for sherpa-onnx TTS archives.
const SHERPA_TTS_BASE: &str = "https://github.com/k2-fsa/sherpa-onnx/releases/download/tts-models";

/// Subdirectory of the models dir holding TTS models.
const TTS_SUBDIR: &str = "tts";

/// File whose presence marks a complete extraction.
const MODEL_MARKER: &str = "model.onnx";

// ── Model info ─────────────────────────────────────────────────────

/// Information about the TTS model.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsModelInfo {
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// URL of the `.tar.bz2` archive.
    pub archive_url: String,

    /// Directory name inside the archive.
    pub dir_name: String,

    /// Approximate archive size in bytes, used when the server sends no
    /// `Content-Length`.
    pub size_bytes: u64,

    pub size_display: String,

    pub voice_count: u32,
}

/// The speech model catalog.
pub struct ModelCatalog;

impl ModelCatalog {
    #[must_use]
    pub fn tts_model() -> TtsModelInfo {
        TtsModelInfo {
            id: "kokoro-en-v0_19".to_string(),
            name: "Kokoro v0.19 (English)".to_string(),
            archive_url: format!("{SHERPA_TTS_BASE}/kokoro-en-v0_19.tar.bz2"),
            dir_name: "kokoro-en-v0_19".to_string(),
            size_bytes: 319_815_680,
            size_display: "305 MB".to_string(),
            voice_count: 11,
        }
    }

    /// Directory the TTS model extracts to.
    #[must_use]
    pub fn tts_model_path(models_dir: &Path) -> PathBuf {
        models_dir.join(TTS_SUBDIR).join(Self::tts_model().dir_name)
    }

    /// Whether the TTS model has been downloaded and extracted.
    #[must_use]
    pub fn is_tts_downloaded(models_dir: &Path) -> bool {
        Self::tts_model_path(models_dir).join(MODEL_MARKER).exists()
    }
}

// ── Download helpers ───────────────────────────────────────────────

/// Download `url` into memory, reporting `(bytes_downloaded, total_bytes)`
/// after every chunk.
///
/// `expected_size` stands in for the total when the server does not send a
/// `Content-Length`. The final report always has `downloaded == total`.
pub async fn download_bytes(
    url: &str,
    expected_size: u64,
    on_progress: impl Fn(u64, u64),
) -> Result<Vec<u8>, AudioError> {
    let download_err = |source: anyhow::Error| AudioError::DownloadError {
        name: url.to_string(),
        source,
    };

    tracing::info!(url, "Downloading speech model");

    let client = reqwest::Client::new();
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| download_err(e.into()))?;

    if !response.status().is_success() {
        return Err(download_err(anyhow::anyhow!("HTTP {}", response.status())));
    }

    let total = response.content_length().unwrap_or(expected_size);
    let mut bytes = Vec::with_capacity(usize::try_from(total).unwrap_or(0));

    while let Some(chunk) = response.chunk().await.map_err(|e| download_err(e.into()))? {
        bytes.extend_from_slice(&chunk);
        let done = bytes.len() as u64;
        on_progress(done, total.max(done));
    }

    let done = bytes.len() as u64;
    on_progress(done, done);

    tracing::info!(size_mb = bytes.len() / 1_048_576, "Speech model download complete");
    Ok(bytes)
}

/// Download a `.tar.bz2` archive and extract it into `dest_dir`.
///
/// Extraction runs on a blocking thread. Returns the extracted directory.
#[cfg(feature = "sherpa")]
pub async fn download_and_extract_archive(
    url: &str,
    dest_dir: &Path,
    dir_name: &str,
    expected_size: u64,
    on_progress: impl Fn(u64, u64),
) -> Result<PathBuf, AudioError> {
    let extract_path = dest_dir.join(dir_name);

    if extract_path.join(MODEL_MARKER).exists() {
        tracing::debug!(path = %extract_path.display(), "Archive already extracted");
        return Ok(extract_path);
    }

    tokio::fs::create_dir_all(dest_dir).await?;

    let archive_bytes = download_bytes(url, expected_size, on_progress).await?;

    tracing::info!(dest = %extract_path.display(), "Extracting archive");

    let dest_owned = dest_dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let cursor = std::io::Cursor::new(archive_bytes);
        let decompressor = bzip2::read::BzDecoder::new(cursor);
        let mut archive = tar::Archive::new(decompressor);
        archive
            .unpack(&dest_owned)
            .map_err(|e| AudioError::DownloadError {
                name: "archive".to_string(),
                source: anyhow::anyhow!("Failed to extract archive: {e}"),
            })
    })
    .await
    .map_err(|e| AudioError::DownloadError {
        name: url.to_string(),
        source: anyhow::anyhow!("Join error: {e}"),
    })??;

    tracing::info!(path = %extract_path.display(), "Archive extracted");
    Ok(extract_path)
}

/// Download the TTS model if not already present.
///
/// An already-present model reports `(size, size)` once so progress
/// consumers see 100%.
#[cfg(feature = "sherpa")]
pub async fn ensure_tts_model(
    models_dir: &Path,
    on_progress: impl Fn(u64, u64),
) -> Result<PathBuf, AudioError> {
    let tts = ModelCatalog::tts_model();
    let path = ModelCatalog::tts_model_path(models_dir);

    if ModelCatalog::is_tts_downloaded(models_dir) {
        tracing::debug!(path = %path.display(), "TTS model already downloaded");
        on_progress(tts.size_bytes, tts.size_bytes);
        return Ok(path);
    }

    download_and_extract_archive(
        &tts.archive_url,
        &models_dir.join(TTS_SUBDIR),
        &tts.dir_name,
        tts.size_bytes,
        on_progress,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tts_model_points_at_sherpa_release() {
        let tts = ModelCatalog::tts_model();
        assert_eq!(
            tts.archive_url,
            "https://github.com/k2-fsa/sherpa-onnx/releases/download/tts-models/kokoro-en-v0_19.tar.bz2"
        );
        assert_eq!(tts.dir_name, "kokoro-en-v0_19");
    }

    #[test]
    fn model_path_is_under_tts_subdir() {
        let path = ModelCatalog::tts_model_path(Path::new("/data/models"));
        assert_eq!(path, PathBuf::from("/data/models/tts/kokoro-en-v0_19"));
    }

    #[test]
    fn download_state_follows_marker_file() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!ModelCatalog::is_tts_downloaded(tmp.path()));

        let dir = ModelCatalog::tts_model_path(tmp.path());
        std::fs::create_dir_all(&dir).unwrap();
        assert!(!ModelCatalog::is_tts_downloaded(tmp.path()));

        std::fs::write(dir.join(MODEL_MARKER), b"onnx").unwrap();
        assert!(ModelCatalog::is_tts_downloaded(tmp.path()));
    }
}

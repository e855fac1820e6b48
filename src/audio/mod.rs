//! Audio extractor
//!
//! Takes the zip archive produced by a video downloader and turns every
//! video in it into a WAV file using an external media tool (ffmpeg).

mod extractor;

pub use extractor::{extract_audio, METADATA_FILE, VIDEO_METADATA_FILE};

use crate::config::AudioExtractorConfig;
use crate::platform::catalogue::DatasetInfo;
use std::path::Path;
use std::process::{Command, Stdio};

/// Dataset types this processor accepts start with this prefix
pub const VIDEO_DATASET_PREFIX: &str = "video-downloader";

/// Whether the media tool at `path` can be started
pub fn media_tool_available(path: &Path) -> bool {
    Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// Video downloader results, and only when the media tool is runnable
pub fn is_compatible_with(dataset: &DatasetInfo, config: &AudioExtractorConfig) -> bool {
    dataset.dataset_type.starts_with(VIDEO_DATASET_PREFIX)
        && media_tool_available(&config.ffmpeg_path)
}

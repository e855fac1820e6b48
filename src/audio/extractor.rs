use crate::config::AudioExtractorConfig;
use crate::platform::context::ProcessorContext;
use crate::platform::error::{ProcessorError, Result};
use crate::platform::result::{write_result, ProcessorOutcome};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Metadata file that video downloaders put into their archives
pub const METADATA_FILE: &str = ".metadata.json";

/// Name the metadata file is given in the audio archive
pub const VIDEO_METADATA_FILE: &str = ".video_metadata.json";

/// Video entry of the input archive
#[derive(Debug, Clone, PartialEq)]
struct VideoEntry {
    index: usize,
    /// Unique within the archive; names the WAV file and the tool's logs
    stem: String,
    extension: Option<String>,
}

impl VideoEntry {
    /// Name the video is unpacked under
    fn unpacked_name(&self) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", self.stem, ext),
            None => self.stem.clone(),
        }
    }
}

/// Entries worth extracting: the metadata file (if any) and the videos
#[derive(Debug, Default)]
struct ArchivePlan {
    metadata: Option<usize>,
    videos: Vec<VideoEntry>,
}

/// Sort the archive's entries into metadata and videos
///
/// Directories and entries whose name escapes the archive are skipped.
/// Entries are flattened to their file name; a stem seen before gets a
/// `-2`, `-3`, ... suffix so no two videos write to the same WAV file.
fn plan_archive(archive: &mut ZipArchive<File>) -> Result<ArchivePlan> {
    let mut plan = ArchivePlan::default();
    let mut stems = HashSet::new();

    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let file_name = match entry.enclosed_name().and_then(|p| p.file_name().map(PathBuf::from)) {
            Some(name) => name,
            None => {
                tracing::warn!("Skipping archive entry with unsafe name '{}'", entry.name());
                continue;
            }
        };

        if file_name == Path::new(METADATA_FILE) {
            plan.metadata = Some(index);
            continue;
        }

        let base = file_name
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut stem = base.clone();
        let mut copy = 1;
        while !stems.insert(stem.clone()) {
            copy += 1;
            stem = format!("{}-{}", base, copy);
        }
        if copy > 1 {
            tracing::warn!("'{}' extracted as '{}' to avoid a name clash", entry.name(), stem);
        }

        plan.videos.push(VideoEntry {
            index,
            stem,
            extension: file_name
                .extension()
                .map(|e| e.to_string_lossy().into_owned()),
        });
    }

    Ok(plan)
}

/// Extract the audio track of every video in the zip at `input`
///
/// Each video is converted to a WAV file by the configured media tool. The
/// WAV files, the tool's non-empty stdout/stderr logs and the archive's
/// metadata file are packed into a new zip at `output`. A video the tool
/// fails on is logged and skipped.
pub fn extract_audio<C: ProcessorContext + ?Sized>(
    ctx: &C,
    input: &Path,
    output: &Path,
    config: &AudioExtractorConfig,
) -> Result<ProcessorOutcome> {
    let mut archive = ZipArchive::new(File::open(input)?)?;

    let plan = plan_archive(&mut archive)?;
    let videos = plan.videos.len();
    if videos == 0 {
        ctx.update_status("No videos from which to extract audio.", true);
        return Ok(ProcessorOutcome::empty());
    }

    let unpacked = tempfile::Builder::new()
        .prefix("audio-extractor-videos")
        .tempdir()?;
    let staging = tempfile::Builder::new().prefix("audio-extractor").tempdir()?;
    ctx.log(&format!(
        "Staging directory location: {}",
        staging.path().display()
    ));

    if let Some(index) = plan.metadata {
        let mut entry = archive.by_index(index)?;
        std::io::copy(
            &mut entry,
            &mut File::create(staging.path().join(VIDEO_METADATA_FILE))?,
        )?;
    }

    ctx.update_status("Extracting video audio", false);
    let mut processed = 0usize;

    for video in &plan.videos {
        ctx.check_interrupted("while extracting audio")?;

        let video_path = unpacked.path().join(video.unpacked_name());
        {
            let mut entry = archive.by_index(video.index)?;
            std::io::copy(&mut entry, &mut File::create(&video_path)?)?;
        }

        convert_video(ctx, config, &video_path, &video.stem, staging.path())?;
        if let Err(e) = std::fs::remove_file(&video_path) {
            tracing::debug!("Could not remove {}: {}", video_path.display(), e);
        }

        processed += 1;
        ctx.update_status(
            &format!("Extracted audio from {} of {} videos", processed, videos),
            false,
        );
        ctx.update_progress(processed as f64 / videos as f64);
    }

    ctx.check_interrupted("before writing the archive")?;
    write_result(output, |temp_path| pack_directory(staging.path(), temp_path))?;

    Ok(ProcessorOutcome::with_output(processed, output))
}

/// Run the media tool on one video, writing `<stem>.wav` into `out_dir`
fn convert_video<C: ProcessorContext + ?Sized>(
    ctx: &C,
    config: &AudioExtractorConfig,
    video: &Path,
    stem: &str,
    out_dir: &Path,
) -> Result<()> {
    tracing::debug!(video = %video.display(), "Running media tool");
    let result = Command::new(&config.ffmpeg_path)
        .arg("-i")
        .arg(video)
        .arg("-ar")
        .arg(config.sample_rate.to_string())
        .arg(out_dir.join(format!("{}.wav", stem)))
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ProcessorError::MediaToolUnavailable {
            path: config.ffmpeg_path.clone(),
            reason: e.to_string(),
        })?;

    if !result.stdout.is_empty() {
        std::fs::write(out_dir.join(format!("{}_stdout.log", stem)), &result.stdout)?;
    }
    if !result.stderr.is_empty() {
        std::fs::write(out_dir.join(format!("{}_stderr.log", stem)), &result.stderr)?;
    }

    if !result.status.success() {
        let code = result
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "terminated by signal".to_string());
        let message = format!("Error return code with video {}: {}", stem, code);
        tracing::error!("{}", message);
        ctx.log(&message);
    }

    Ok(())
}

/// Zip every file directly inside `dir`, in name order
fn pack_directory(dir: &Path, target: &Path) -> Result<()> {
    let mut files = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    files.retain(|path| path.is_file());
    files.sort();

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(File::create(target)?);
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        writer.start_file(name, options)?;
        std::io::copy(&mut File::open(&path)?, &mut writer)?;
    }
    writer.finish()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::LocalContext;
    use std::io::Write;

    fn make_archive(path: &Path, entries: &[(&str, &[u8])]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }

    fn archive_names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    /// Stand-in for ffmpeg: `-i <in> -ar <rate> <out>`, fails on files named bad*
    #[cfg(unix)]
    fn fake_media_tool(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-ffmpeg");
        std::fs::write(
            &path,
            "#!/bin/sh\necho \"converting $2 at $4\" >&2\ncase \"$(basename \"$2\")\" in bad*) exit 1;; esac\necho wav > \"$5\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_empty_archive() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("videos.zip");
        let output = dir.path().join("audio.zip");
        make_archive(&input, &[]);

        let ctx = LocalContext::detached();
        let outcome =
            extract_audio(&ctx, &input, &output, &AudioExtractorConfig::default()).unwrap();

        assert_eq!(outcome, ProcessorOutcome::empty());
        assert_eq!(ctx.status(), "No videos from which to extract audio.");
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_extracts_and_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("videos.zip");
        let output = dir.path().join("audio.zip");
        make_archive(
            &input,
            &[
                (METADATA_FILE, &b"{}"[..]),
                ("first.mp4", &b"video"[..]),
                ("bad.mp4", &b"video"[..]),
            ],
        );

        let config = AudioExtractorConfig {
            ffmpeg_path: fake_media_tool(dir.path()),
            sample_rate: 16000,
        };
        let ctx = LocalContext::detached();
        let outcome = extract_audio(&ctx, &input, &output, &config).unwrap();

        assert_eq!(outcome.items, 2);
        assert_eq!(ctx.status(), "Extracted audio from 2 of 2 videos");
        assert_eq!(ctx.progress(), 1.0);
        assert_eq!(
            archive_names(&output),
            vec![
                VIDEO_METADATA_FILE,
                "bad_stderr.log",
                "first.wav",
                "first_stderr.log",
            ]
        );
    }

    #[test]
    fn test_missing_media_tool() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("videos.zip");
        let output = dir.path().join("audio.zip");
        make_archive(&input, &[("clip.mp4", &b"video"[..])]);

        let config = AudioExtractorConfig {
            ffmpeg_path: dir.path().join("no-such-tool"),
            sample_rate: 16000,
        };
        let err = extract_audio(&LocalContext::detached(), &input, &output, &config).unwrap_err();

        assert!(matches!(err, ProcessorError::MediaToolUnavailable { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_interrupted_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("videos.zip");
        let output = dir.path().join("audio.zip");
        make_archive(&input, &[("clip.mp4", &b"video"[..])]);

        let ctx = LocalContext::detached();
        ctx.interrupt_handle()
            .store(true, std::sync::atomic::Ordering::Relaxed);
        let err = extract_audio(&ctx, &input, &output, &AudioExtractorConfig::default())
            .unwrap_err();

        assert!(err.is_interrupted());
        assert!(!output.exists());
    }

    #[test]
    fn test_plan_gives_clashing_videos_unique_stems() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("videos.zip");
        make_archive(
            &input,
            &[
                ("a/clip.mp4", &b"video"[..]),
                ("b/clip.mp4", &b"video"[..]),
                ("clip.mkv", &b"video"[..]),
                ("nested/.metadata.json", &b"{}"[..]),
            ],
        );

        let mut archive = ZipArchive::new(File::open(&input).unwrap()).unwrap();
        let plan = plan_archive(&mut archive).unwrap();

        assert_eq!(plan.metadata, Some(3));
        let names: Vec<String> = plan.videos.iter().map(VideoEntry::unpacked_name).collect();
        assert_eq!(names, vec!["clip.mp4", "clip-2.mp4", "clip-3.mkv"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_clashing_names_each_get_audio() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("videos.zip");
        let output = dir.path().join("audio.zip");
        make_archive(
            &input,
            &[
                ("a/clip.mp4", &b"video"[..]),
                ("b/clip.mp4", &b"video"[..]),
                ("clip.mkv", &b"video"[..]),
            ],
        );

        let config = AudioExtractorConfig {
            ffmpeg_path: fake_media_tool(dir.path()),
            sample_rate: 16000,
        };
        let ctx = LocalContext::detached();
        let outcome = extract_audio(&ctx, &input, &output, &config).unwrap();

        assert_eq!(outcome.items, 3);
        let wavs: Vec<String> = archive_names(&output)
            .into_iter()
            .filter(|name| name.ends_with(".wav"))
            .collect();
        assert_eq!(wavs, vec!["clip-2.wav", "clip-3.wav", "clip.wav"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unsafe_entries_are_not_counted() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("videos.zip");
        let output = dir.path().join("audio.zip");
        make_archive(
            &input,
            &[("../evil.mp4", &b"video"[..]), ("clip.mp4", &b"video"[..])],
        );

        let config = AudioExtractorConfig {
            ffmpeg_path: fake_media_tool(dir.path()),
            sample_rate: 16000,
        };
        let ctx = LocalContext::detached();
        let outcome = extract_audio(&ctx, &input, &output, &config).unwrap();

        assert_eq!(outcome.items, 1);
        assert_eq!(ctx.status(), "Extracted audio from 1 of 1 videos");
        assert_eq!(ctx.progress(), 1.0);
        assert!(!dir.path().parent().unwrap().join("evil.mp4").exists());
    }
}

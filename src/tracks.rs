use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{from_str, Value};
use tokio::process::Command;
use crate::document::AssDocument;
use crate::errors::TrackError;
use crate::language_utils;

// @module: Subtitle track lookup and extraction from video containers

const FFPROBE_TIMEOUT_SECS: u64 = 60;
const FFMPEG_TIMEOUT_SECS: u64 = 120;

/// A subtitle stream in a container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    /// Absolute stream index in the container
    pub index: usize,
    /// Position among the subtitle streams only
    pub relative_index: usize,
    pub codec_name: String,
    /// Language tag as stored in the container (ISO 639-2 usually)
    pub language: Option<String>,
    pub title: Option<String>,
    pub is_default: bool,
    pub is_forced: bool,
    /// Container delay (stream start time) in ms
    pub delay_ms: i64,
}

impl SubtitleTrack {
    /// Image based subtitles can't be converted to ASS
    pub fn is_bitmap(&self) -> bool {
        matches!(
            self.codec_name.as_str(),
            "hdmv_pgs_subtitle" | "dvd_subtitle" | "dvb_subtitle" | "xsub"
        )
    }
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Track {} (sub {}): {} [{}] {}",
            self.index,
            self.relative_index,
            self.title.as_deref().unwrap_or("No title"),
            self.language.as_deref().unwrap_or("unknown"),
            self.codec_name,
        )?;
        if self.is_default {
            write!(f, " default")?;
        }
        if self.is_forced {
            write!(f, " forced")?;
        }
        Ok(())
    }
}

/// Which track to pick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackQuery {
    /// Title, compared trimmed and ignoring case
    pub name: Option<String>,
    /// Any of `en`, `eng`, `English`, `en-US`, ...
    pub lang: Option<String>,
    /// Forced flag the track must have
    pub is_forced: bool,
    /// Default flag the track must have, ignored when `None`
    pub is_default: Option<bool>,
}

impl TrackQuery {
    pub fn matches(&self, track: &SubtitleTrack) -> bool {
        if let Some(name) = &self.name {
            let wanted = name.trim().to_lowercase();
            let title = track.title.as_deref().unwrap_or("").trim().to_lowercase();
            if wanted != title {
                return false;
            }
        }

        if let Some(lang) = &self.lang {
            match &track.language {
                Some(track_lang) if language_utils::language_tags_match(track_lang, lang) => {}
                _ => return false,
            }
        }

        if track.is_forced != self.is_forced {
            return false;
        }

        match self.is_default {
            Some(is_default) => track.is_default == is_default,
            None => true,
        }
    }
}

impl fmt::Display for TrackQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "name={:?} lang={:?} forced={} default={:?}",
            self.name, self.lang, self.is_forced, self.is_default
        )
    }
}

/// Subtitle extracted from a container, with its track metadata
#[derive(Debug, Clone)]
pub struct ExtractedSubtitle {
    pub document: AssDocument,
    pub title: Option<String>,
    pub language: Option<String>,
    pub is_default: bool,
    pub is_forced: bool,
}

/// Tracks matching the query, in container order
pub fn find_tracks<'a>(tracks: &'a [SubtitleTrack], query: &TrackQuery) -> Vec<&'a SubtitleTrack> {
    tracks.iter().filter(|track| query.matches(track)).collect()
}

fn ensure_path_exists(path: &Path) -> Result<(), TrackError> {
    if !path.exists() {
        return Err(TrackError::FileNotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Parse the JSON `ffprobe -show_streams` prints for subtitle streams
pub fn parse_ffprobe_streams(json: &str) -> Result<Vec<SubtitleTrack>, TrackError> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }

    let json: Value = from_str(json)
        .map_err(|e| TrackError::Probe(format!("Failed to parse ffprobe JSON output: {}", e)))?;

    let Some(streams) = json.get("streams").and_then(|s| s.as_array()) else {
        return Ok(Vec::new());
    };

    let mut tracks = Vec::with_capacity(streams.len());
    for (relative_index, stream) in streams.iter().enumerate() {
        let index = stream.get("index")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(relative_index);

        let codec_name = stream.get("codec_name")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");

        let tag = |key: &str| stream.get("tags")
            .and_then(|t| t.get(key))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let disposition = |key: &str| stream.get("disposition")
            .and_then(|d| d.get(key))
            .and_then(|v| v.as_i64())
            .is_some_and(|v| v != 0);

        // ffprobe reports start_time as a string of seconds
        let delay_ms = stream.get("start_time")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<f64>().ok())
            .map(|secs| (secs * 1000.0).round() as i64)
            .unwrap_or(0);

        tracks.push(SubtitleTrack {
            index,
            relative_index,
            codec_name: codec_name.to_string(),
            language: tag("language"),
            title: tag("title"),
            is_default: disposition("default"),
            is_forced: disposition("forced"),
            delay_ms,
        });
    }

    Ok(tracks)
}

/// List subtitle tracks in a video file
pub async fn list_subtitle_tracks<P: AsRef<Path>>(video_path: P) -> Result<Vec<SubtitleTrack>, TrackError> {
    let video_path = video_path.as_ref();
    ensure_path_exists(video_path)?;

    let ffprobe_future = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_streams", "-select_streams", "s"])
        .arg(video_path)
        .output();

    let output = tokio::select! {
        result = ffprobe_future => {
            result.map_err(|e| TrackError::Probe(format!("Failed to execute ffprobe command: {}", e)))?
        },
        _ = tokio::time::sleep(Duration::from_secs(FFPROBE_TIMEOUT_SECS)) => {
            return Err(TrackError::Timeout { tool: "ffprobe", secs: FFPROBE_TIMEOUT_SECS });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("ffprobe failed: {}", stderr);
        return Err(TrackError::Probe(stderr.to_string()));
    }

    parse_ffprobe_streams(&String::from_utf8_lossy(&output.stdout))
}

/// Filter ffmpeg stderr down to the lines that say what went wrong
fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Chapter",
        "Stream #",
        "title",
        "BPS",
        "DURATION",
        "NUMBER_OF",
        "_STATISTICS",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}

/// Extract one subtitle track as ASS and parse it
pub async fn extract_track(video_path: &Path, track: &SubtitleTrack, preserve_delay: bool) -> Result<AssDocument, TrackError> {
    if track.is_bitmap() {
        return Err(TrackError::BitmapTrack { index: track.index, codec: track.codec_name.clone() });
    }

    let temp_dir = tempfile::tempdir()
        .map_err(|e| TrackError::Extraction(format!("Failed to create temp dir: {}", e)))?;
    let output_path: PathBuf = temp_dir.path().join(format!("track_{}.ass", track.index));

    let map_arg = format!("0:s:{}", track.relative_index);
    let ffmpeg_future = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(video_path)
        .args(["-map", map_arg.as_str(), "-c:s", "ass"])
        .arg(&output_path)
        .output();

    let result = tokio::select! {
        result = ffmpeg_future => {
            result.map_err(|e| TrackError::Extraction(format!("Failed to execute ffmpeg: {}", e)))?
        },
        _ = tokio::time::sleep(Duration::from_secs(FFMPEG_TIMEOUT_SECS)) => {
            return Err(TrackError::Timeout { tool: "ffmpeg", secs: FFMPEG_TIMEOUT_SECS });
        }
    };

    if !result.status.success() {
        let filtered = filter_ffmpeg_stderr(&String::from_utf8_lossy(&result.stderr));
        error!("Subtitle extraction failed: {}", filtered);
        return Err(TrackError::Extraction(filtered));
    }

    let mut document = AssDocument::from_file(&output_path)?;
    if preserve_delay && track.delay_ms != 0 {
        debug!("Applying container delay of {} ms", track.delay_ms);
        document.shift(track.delay_ms);
    }
    Ok(document)
}

/// Extract the first subtitle track matching `query`.
///
/// Useful when the track index changes between episodes.
pub async fn get_sub_track<P: AsRef<Path>>(video_path: P, query: &TrackQuery, preserve_delay: bool) -> Result<AssDocument, TrackError> {
    let video_path = video_path.as_ref();
    let tracks = list_subtitle_tracks(video_path).await?;

    let track = find_tracks(&tracks, query)
        .into_iter()
        .next()
        .ok_or_else(|| TrackError::NoMatchingTrack {
            path: video_path.to_path_buf(),
            query: query.to_string(),
        })?;

    info!("Matched subtitle track {} with title: {}",
        track.relative_index, track.title.as_deref().unwrap_or("No title"));

    extract_track(video_path, track, preserve_delay).await
}

/// Extract every text subtitle track together with its title, language
/// and flags
pub async fn all_subs_from_mkv<P: AsRef<Path>>(video_path: P, preserve_delay: bool) -> Result<Vec<ExtractedSubtitle>, TrackError> {
    let video_path = video_path.as_ref();
    let tracks = list_subtitle_tracks(video_path).await?;

    let mut subtitles = Vec::with_capacity(tracks.len());
    for track in &tracks {
        if track.is_bitmap() {
            warn!("Skipping bitmap subtitle track {} ({})", track.index, track.codec_name);
            continue;
        }
        let document = extract_track(video_path, track, preserve_delay).await?;
        subtitles.push(ExtractedSubtitle {
            document,
            title: track.title.clone(),
            language: track.language.clone(),
            is_default: track.is_default,
            is_forced: track.is_forced,
        });
    }

    Ok(subtitles)
}

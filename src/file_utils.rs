use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Suffix inserted before the extension of restyled files
pub const OUTPUT_SUFFIX: &str = "restyled";

const VIDEO_EXTENSIONS: [&str; 14] = [
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v",
    "mpg", "mpeg", "ogv", "ts", "mts", "m2ts",
];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: `<stem>.restyled.ass` in output_dir
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(input_file: P1, output_dir: P2) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();
        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(OUTPUT_SUFFIX);
        output_filename.push_str(".ass");
        output_dir.as_ref().join(output_filename)
    }

    /// True for files this tool wrote itself
    pub fn is_generated_output<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .file_stem()
            .map(|stem| stem.to_string_lossy().ends_with(&format!(".{}", OUTPUT_SUFFIX)))
            .unwrap_or(false)
    }

    /// Find files with one of the given extensions in a directory tree
    pub fn find_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let matches = path.extension()
                .map(|ext| {
                    let ext = ext.to_string_lossy();
                    extensions.iter().any(|wanted| ext.eq_ignore_ascii_case(wanted.trim_start_matches('.')))
                })
                .unwrap_or(false);
            if matches {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// Every ASS, SSA or video file below `dir`, skipping our own output
    pub fn find_inputs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut extensions = vec!["ass", "ssa"];
        extensions.extend_from_slice(&VIDEO_EXTENSIONS);
        let files = Self::find_files(dir, &extensions)?;
        Ok(files.into_iter().filter(|p| !Self::is_generated_output(p)).collect())
    }

    /// Detect if a file is an ASS subtitle or a video file by its extension
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        let Some(ext) = path.extension() else {
            return Ok(FileType::Unknown);
        };
        let ext = ext.to_string_lossy().to_lowercase();

        if ext == "ass" || ext == "ssa" {
            return Ok(FileType::Subtitle);
        }
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            return Ok(FileType::Video);
        }
        Ok(FileType::Unknown)
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// ASS/SSA subtitle file
    Subtitle,
    /// Video container ffmpeg can read
    Video,
    /// Unknown file type
    Unknown,
}

/*!
 * Error types for the substyle library.
 *
 * Parsing and track extraction get their own typed errors, using the
 * thiserror crate for ergonomic error definitions. The application layer
 * (controller and CLI) works with anyhow and wraps these through `AppError`.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing an ASS document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// A line could not be understood
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number in the source text
        line: usize,
        /// What went wrong
        message: String,
    },

    /// An event timestamp is not in `H:MM:SS.cc` form
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A required section or format line is missing
    #[error("Missing section: {0}")]
    MissingSection(String),

    /// Reading or writing the file failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when locating or extracting subtitle tracks
#[derive(Error, Debug)]
pub enum TrackError {
    /// The container file does not exist
    #[error("File does not exist: {0:?}")]
    FileNotFound(PathBuf),

    /// No subtitle track satisfied the query
    #[error("No subtitle track matched {query} in {path:?}")]
    NoMatchingTrack {
        path: PathBuf,
        /// Human readable description of the query
        query: String,
    },

    /// The matched track is image based and cannot be converted to ASS
    #[error("Track {index} uses bitmap codec {codec}, which cannot be converted to ASS")]
    BitmapTrack { index: usize, codec: String },

    /// ffprobe failed or returned garbage
    #[error("ffprobe failed: {0}")]
    Probe(String),

    /// ffmpeg failed to extract the track
    #[error("ffmpeg extraction failed: {0}")]
    Extraction(String),

    /// An external tool did not finish in time
    #[error("{tool} timed out after {secs} seconds")]
    Timeout { tool: &'static str, secs: u64 },

    /// The extracted track could not be parsed
    #[error("Extracted subtitle is invalid: {0}")]
    Document(#[from] DocumentError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from document handling
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from track lookup or extraction
    #[error("Track error: {0}")]
    Track(#[from] TrackError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

/*!
 * Tests for error types and conversions
 */

use std::error::Error;
use std::path::PathBuf;
use substyle::errors::{AppError, DocumentError, TrackError};

#[test]
fn test_documentError_parse_shouldDisplayLineAndMessage() {
    let error = DocumentError::Parse { line: 12, message: "Expected 10 fields, found 3".to_string() };
    let display = error.to_string();
    assert!(display.contains("line 12"));
    assert!(display.contains("Expected 10 fields"));
}

#[test]
fn test_documentError_io_shouldExposeSource() {
    let error = DocumentError::Io {
        path: PathBuf::from("x.ass"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    };
    assert!(error.to_string().contains("x.ass"));
    assert!(error.source().is_some());
}

#[test]
fn test_trackError_noMatchingTrack_shouldDisplayQuery() {
    let error = TrackError::NoMatchingTrack {
        path: PathBuf::from("ep.mkv"),
        query: "lang=Some(\"en\")".to_string(),
    };
    let display = error.to_string();
    assert!(display.contains("ep.mkv"));
    assert!(display.contains("lang="));
}

#[test]
fn test_trackError_timeout_shouldDisplayToolAndSeconds() {
    let error = TrackError::Timeout { tool: "ffprobe", secs: 60 };
    assert_eq!(error.to_string(), "ffprobe timed out after 60 seconds");
}

#[test]
fn test_trackError_fromDocumentError_shouldWrap() {
    let error: TrackError = DocumentError::MissingSection("[Events]".to_string()).into();
    assert!(matches!(error, TrackError::Document(_)));
    assert!(error.to_string().contains("[Events]"));
}

#[test]
fn test_appError_fromTrackError_shouldWrap() {
    let error: AppError = TrackError::Probe("bad output".to_string()).into();
    assert!(matches!(error, AppError::Track(_)));
    assert!(error.to_string().starts_with("Track error"));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let error: AppError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
    assert!(matches!(error, AppError::File(_)));
}

#[test]
fn test_appError_fromAnyhow_shouldBecomeUnknown() {
    let error: AppError = anyhow::anyhow!("something odd").into();
    assert!(matches!(error, AppError::Unknown(ref m) if m == "something odd"));
}

//! Speech-to-text for lecture recordings.

mod whisper;

pub use whisper::WhisperTranscriber;

use crate::document::Document;
use crate::error::{EstudiaError, Result};
use async_trait::async_trait;
use std::path::Path;

/// Audio formats accepted for upload.
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "m4a", "wav", "mp4", "mpeg", "mpga", "webm", "ogg", "oga", "flac",
];

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one recording into a transcript document.
    ///
    /// `filename` is used for the format check and as the document's source.
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<Document>;
}

/// Whether `filename` has a supported audio extension.
pub fn is_supported_audio(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reject uploads the provider would refuse before spending a request on them.
pub fn check_upload(audio: &[u8], filename: &str, max_bytes: usize) -> Result<()> {
    if !is_supported_audio(filename) {
        return Err(EstudiaError::InvalidInput(format!(
            "unsupported audio format: {} (expected one of: {})",
            filename,
            AUDIO_EXTENSIONS.join(", ")
        )));
    }
    if audio.is_empty() {
        return Err(EstudiaError::EmptyInput(format!("{} is empty", filename)));
    }
    if audio.len() > max_bytes {
        return Err(EstudiaError::InvalidInput(format!(
            "{} is {:.1} MB; the upload limit is {:.1} MB",
            filename,
            audio.len() as f64 / (1024.0 * 1024.0),
            max_bytes as f64 / (1024.0 * 1024.0)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_audio("pitch.mp3"));
        assert!(is_supported_audio("Lecture.M4A"));
        assert!(is_supported_audio("class.wav"));
        assert!(!is_supported_audio("notes.pdf"));
        assert!(!is_supported_audio("no_extension"));
    }

    #[test]
    fn test_check_upload() {
        assert!(check_upload(&[0; 10], "a.mp3", 100).is_ok());
        assert!(matches!(
            check_upload(&[0; 10], "a.txt", 100),
            Err(EstudiaError::InvalidInput(_))
        ));
        assert!(matches!(
            check_upload(&[0; 101], "a.mp3", 100),
            Err(EstudiaError::InvalidInput(_))
        ));
        assert!(matches!(
            check_upload(&[], "a.mp3", 100),
            Err(EstudiaError::EmptyInput(_))
        ));
    }
}

//! crates/auramind_core/src/youtube.rs
//!
//! Recognises YouTube links and pulls the video id out of them.

use crate::domain::VideoReference;
use crate::ports::{PortError, PortResult};
use regex::Regex;
use std::sync::LazyLock;

static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.|m\.|music\.)?(?:youtube\.com/(?:watch\?(?:[^#\s]*&)?v=|embed/|shorts/|v/|live/)|youtube-nocookie\.com/embed/|youtu\.be/)([A-Za-z0-9_-]{11})(?:[?&#/].*)?$",
    )
    .expect("YouTube URL pattern is valid")
});

pub fn extract_youtube_video_id(url: &str) -> Option<String> {
    VIDEO_ID
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn is_valid_youtube_url(url: &str) -> bool {
    extract_youtube_video_id(url).is_some()
}

impl VideoReference {
    /// Builds a reference from a user-entered link, with user-facing error text.
    pub fn from_youtube_url(url: &str) -> PortResult<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(PortError::InvalidInput(
                "Please enter a YouTube URL".to_string(),
            ));
        }
        let video_id = extract_youtube_video_id(url).ok_or_else(|| {
            PortError::InvalidInput("Invalid YouTube URL. Please check and try again.".to_string())
        })?;
        Ok(VideoReference::YouTube {
            video_id,
            url: url.to_string(),
        })
    }
}

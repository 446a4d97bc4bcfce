use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use webrtc::track::track_local::TrackLocal;

/// Capture handle owned by exactly one call.
pub struct LocalMedia {
    pub label: String,
    pub tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
}

impl LocalMedia {
    pub fn new(label: impl Into<String>, tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>) -> Self {
        Self {
            label: label.into(),
            tracks,
        }
    }
}

impl fmt::Debug for LocalMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalMedia")
            .field("label", &self.label)
            .field("tracks", &self.tracks.len())
            .finish()
    }
}

/// Camera and microphone access.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Dropping the future before it resolves must leave the device free.
    async fn acquire(&self) -> Result<LocalMedia>;

    fn release(&self, media: LocalMedia);
}

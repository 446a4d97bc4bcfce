use crate::media::{LocalMedia, MediaSource};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Headless capture: an Opus and a VP8 track that never carry samples.
#[derive(Default)]
pub struct SyntheticMedia {
    held: AtomicUsize,
}

impl SyntheticMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures currently acquired and not yet released.
    pub fn held(&self) -> usize {
        self.held.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaSource for SyntheticMedia {
    async fn acquire(&self) -> Result<LocalMedia> {
        let audio = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            "audio".to_owned(),
            "pairline".to_owned(),
        ));
        let video = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90000,
                ..Default::default()
            },
            "video".to_owned(),
            "pairline".to_owned(),
        ));

        self.held.fetch_add(1, Ordering::SeqCst);
        info!("Synthetic capture acquired");

        Ok(LocalMedia::new(
            "synthetic",
            vec![
                audio as Arc<dyn TrackLocal + Send + Sync>,
                video as Arc<dyn TrackLocal + Send + Sync>,
            ],
        ))
    }

    fn release(&self, media: LocalMedia) {
        debug!("Releasing {:?}", media);
        self.held.fetch_sub(1, Ordering::SeqCst);
    }
}

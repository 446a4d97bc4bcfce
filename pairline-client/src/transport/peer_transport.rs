use crate::config::TransportConfig;
use crate::media::LocalMedia;
use crate::transport::TransportEvent;
use anyhow::Result;
use async_trait::async_trait;
use pairline_core::IceCandidateDescriptor;
use tokio::sync::mpsc;

/// One negotiated peer connection.
///
/// Description methods both build and apply: `create_offer` and
/// `create_answer` return SDP that is already the local description.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn attach_media(&self, media: &LocalMedia) -> Result<()>;

    async fn create_offer(&self) -> Result<String>;

    async fn apply_offer(&self, sdp: String) -> Result<()>;

    async fn create_answer(&self) -> Result<String>;

    async fn apply_answer(&self, sdp: String) -> Result<()>;

    /// `None` marks the end of the remote side's gathering.
    async fn add_candidate(&self, candidate: Option<IceCandidateDescriptor>) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        config: &TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>>;
}

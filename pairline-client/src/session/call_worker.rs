use crate::config::TransportConfig;
use crate::media::{LocalMedia, MediaSource};
use crate::transport::{PeerTransport, TransportEvent, TransportFactory};
use pairline_core::IceCandidateDescriptor;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Negotiation work queued for the call worker.
#[derive(Debug)]
pub(crate) enum CallOp {
    /// Acquire media and build the local offer.
    Offer,
    /// Apply the partner's offer, acquire media and build the answer.
    Answer { sdp: String },
    ApplyAnswer { sdp: String },
    AddCandidate(Option<IceCandidateDescriptor>),
}

/// Results and transport events, reported back to the session.
#[derive(Debug)]
pub(crate) enum CallEvent {
    OfferCreated { sdp: String },
    AnswerCreated { sdp: String },
    AnswerApplied,
    CandidateRejected(String),
    MediaFailed(String),
    NegotiationFailed(String),
    Transport(TransportEvent),
}

#[derive(Debug)]
pub(crate) struct CallNotice {
    pub epoch: u64,
    pub event: CallEvent,
}

/// Session-side handle of a running call worker.
pub(crate) struct CallHandle {
    pub epoch: u64,
    op_tx: mpsc::UnboundedSender<CallOp>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl CallHandle {
    pub fn submit(&self, op: CallOp) {
        if self.op_tx.send(op).is_err() {
            warn!("Call {} worker is gone, operation dropped", self.epoch);
        }
    }

    /// Abandons pending work and waits until transport and media are released.
    pub async fn end(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.join.await {
            warn!("Call {} worker panicked: {}", self.epoch, e);
        }
    }
}

/// Owns one call's transport and capture, and runs its operations in order.
pub(crate) struct CallWorker {
    epoch: u64,
    media_source: Arc<dyn MediaSource>,
    factory: Arc<dyn TransportFactory>,
    config: TransportConfig,
    notice_tx: mpsc::UnboundedSender<CallNotice>,
    media: Option<LocalMedia>,
}

impl CallWorker {
    pub fn spawn(
        epoch: u64,
        media_source: Arc<dyn MediaSource>,
        factory: Arc<dyn TransportFactory>,
        config: TransportConfig,
        notice_tx: mpsc::UnboundedSender<CallNotice>,
    ) -> CallHandle {
        let (op_tx, op_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let worker = Self {
            epoch,
            media_source,
            factory,
            config,
            notice_tx,
            media: None,
        };
        let join = tokio::spawn(worker.run(op_rx, shutdown_rx));

        CallHandle {
            epoch,
            op_tx,
            shutdown_tx: Some(shutdown_tx),
            join,
        }
    }

    async fn run(
        mut self,
        mut op_rx: mpsc::UnboundedReceiver<CallOp>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        debug!("Call {} worker started", self.epoch);

        let (event_tx, mut event_rx) = mpsc::channel(256);
        let created = tokio::select! {
            biased;
            _ = &mut shutdown_rx => return,
            res = self.factory.create(&self.config, event_tx) => res,
        };
        let transport = match created {
            Ok(t) => t,
            Err(e) => {
                self.notify(CallEvent::NegotiationFailed(format!("{:#}", e)));
                return;
            }
        };

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => break,
                Some(event) = event_rx.recv() => self.notify(CallEvent::Transport(event)),
                op = op_rx.recv() => {
                    let Some(op) = op else { break };
                    let outcome = tokio::select! {
                        biased;
                        _ = &mut shutdown_rx => None,
                        res = self.execute(transport.as_ref(), op) => Some(res),
                    };
                    match outcome {
                        Some(Some(event)) => self.notify(event),
                        Some(None) => {}
                        None => {
                            debug!("Call {} abandoned an operation in flight", self.epoch);
                            break;
                        }
                    }
                }
            }
        }

        if let Err(e) = transport.close().await {
            warn!("Call {} transport close failed: {:#}", self.epoch, e);
        }
        if let Some(media) = self.media.take() {
            self.media_source.release(media);
        }

        info!("Call {} torn down", self.epoch);
    }

    async fn execute(&mut self, transport: &dyn PeerTransport, op: CallOp) -> Option<CallEvent> {
        let event = match op {
            CallOp::Offer => {
                if let Err(event) = self.ensure_media(transport).await {
                    return Some(event);
                }
                match transport.create_offer().await {
                    Ok(sdp) => CallEvent::OfferCreated { sdp },
                    Err(e) => CallEvent::NegotiationFailed(format!("{:#}", e)),
                }
            }

            CallOp::Answer { sdp } => {
                if let Err(e) = transport.apply_offer(sdp).await {
                    return Some(CallEvent::NegotiationFailed(format!("{:#}", e)));
                }
                if let Err(event) = self.ensure_media(transport).await {
                    return Some(event);
                }
                match transport.create_answer().await {
                    Ok(sdp) => CallEvent::AnswerCreated { sdp },
                    Err(e) => CallEvent::NegotiationFailed(format!("{:#}", e)),
                }
            }

            CallOp::ApplyAnswer { sdp } => match transport.apply_answer(sdp).await {
                Ok(()) => CallEvent::AnswerApplied,
                Err(e) => CallEvent::NegotiationFailed(format!("{:#}", e)),
            },

            CallOp::AddCandidate(candidate) => match transport.add_candidate(candidate).await {
                Ok(()) => return None,
                Err(e) => CallEvent::CandidateRejected(format!("{:#}", e)),
            },
        };

        Some(event)
    }

    /// Acquires capture on first use and attaches it to the transport.
    async fn ensure_media(&mut self, transport: &dyn PeerTransport) -> Result<(), CallEvent> {
        if self.media.is_some() {
            return Ok(());
        }

        let media = self
            .media_source
            .acquire()
            .await
            .map_err(|e| CallEvent::MediaFailed(format!("{:#}", e)))?;
        debug!("Call {} acquired {:?}", self.epoch, media);

        let attached = transport.attach_media(&media).await;
        self.media = Some(media);
        attached.map_err(|e| CallEvent::NegotiationFailed(format!("{:#}", e)))
    }

    fn notify(&self, event: CallEvent) {
        let _ = self.notice_tx.send(CallNotice {
            epoch: self.epoch,
            event,
        });
    }
}

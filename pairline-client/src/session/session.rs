use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::media::MediaSource;
use crate::session::call_worker::{CallEvent, CallHandle, CallNotice, CallOp, CallWorker};
use crate::session::{NegotiationState, SessionCommand, SessionHandle, SessionPhase, SessionUpdate};
use crate::signaling::SignalingLink;
use crate::transport::{TransportEvent, TransportFactory};
use pairline_core::{ClientMessage, IceCandidateDescriptor, PeerId, ServerMessage, SignalPayload};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

/// One user's side of the chat: queueing, negotiation and requeue policy.
///
/// User commands, server frames, call results and the requeue timer all
/// arrive at [`run`](Self::run), which handles them one at a time. The
/// transport and capture of the current call live in a separate worker
/// task; its results carry the call's epoch, and results from a call that
/// has since ended are discarded.
pub struct ConnectionSession {
    config: SessionConfig,
    signaling: Arc<dyn SignalingLink>,
    media: Arc<dyn MediaSource>,
    transports: Arc<dyn TransportFactory>,

    negotiation: NegotiationState,
    call: Option<CallHandle>,
    next_epoch: u64,
    peer_id: Option<PeerId>,

    /// Auto-requeue applies while set.
    active: bool,
    /// No start, next or stop yet and capture never failed. Only a fresh
    /// session adopts the sender of an unannounced offer.
    fresh: bool,
    requeue_at: Option<Instant>,

    command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    notice_tx: mpsc::UnboundedSender<CallNotice>,
    notice_rx: mpsc::UnboundedReceiver<CallNotice>,
    update_tx: mpsc::UnboundedSender<SessionUpdate>,
}

impl ConnectionSession {
    /// `server_rx` carries the frames read from the same connection that
    /// `signaling` writes to.
    pub fn new(
        config: SessionConfig,
        signaling: Arc<dyn SignalingLink>,
        server_rx: mpsc::UnboundedReceiver<ServerMessage>,
        media: Arc<dyn MediaSource>,
        transports: Arc<dyn TransportFactory>,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<SessionUpdate>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let session = Self {
            config,
            signaling,
            media,
            transports,
            negotiation: NegotiationState::new(),
            call: None,
            next_epoch: 1,
            peer_id: None,
            active: false,
            fresh: true,
            requeue_at: None,
            command_rx,
            server_rx,
            notice_tx,
            notice_rx,
            update_tx,
        };

        (session, SessionHandle::new(command_tx), update_rx)
    }

    /// Must be spawned; returns when every handle is dropped or the
    /// signaling link closes.
    pub async fn run(mut self) {
        info!("Connection session started");

        loop {
            let requeue_at = self.requeue_at;
            let requeue = async move {
                match requeue_at {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Session handles dropped. Shutting down session.");
                            self.hang_up().await;
                            break;
                        }
                    }
                }

                msg = self.server_rx.recv() => {
                    match msg {
                        Some(m) => self.handle_server_message(m).await,
                        None => {
                            warn!("Signaling link closed");
                            self.requeue_at = None;
                            self.end_call().await;
                            self.emit(SessionUpdate::Error(SessionError::SignalingClosed));
                            self.set_phase(SessionPhase::Idle);
                            break;
                        }
                    }
                }

                Some(notice) = self.notice_rx.recv() => self.handle_notice(notice).await,

                _ = requeue => self.handle_requeue_timer(),
            }
        }

        info!("Connection session finished");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        debug!("Command {:?} in {:?}", cmd, self.negotiation.phase);

        match cmd {
            SessionCommand::Start => {
                self.active = true;
                self.fresh = false;

                match self.negotiation.phase {
                    SessionPhase::Idle | SessionPhase::Disconnected => {
                        self.requeue_at = None;
                        self.send(ClientMessage::JoinQueue);
                        self.set_phase(SessionPhase::AwaitingMatch);
                    }
                    phase => debug!("Start ignored in {:?}", phase),
                }
            }

            SessionCommand::Next => {
                self.active = true;
                self.fresh = false;
                self.requeue_at = None;

                self.end_call().await;
                if self.negotiation.phase.in_call() {
                    self.set_phase(SessionPhase::Disconnected);
                }
                self.send(ClientMessage::Next);
                self.set_phase(SessionPhase::AwaitingMatch);
            }

            SessionCommand::Stop => {
                self.active = false;
                self.fresh = false;
                self.hang_up().await;
            }
        }
    }

    async fn handle_server_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Welcome {
                peer_id,
                ice_servers,
            } => {
                info!("Signaling server assigned id {}", peer_id);
                self.peer_id = Some(peer_id);
                if !ice_servers.is_empty() {
                    self.config.transport.ice_servers = ice_servers;
                }
            }

            ServerMessage::Matched {
                partner_id,
                initiator,
            } => self.handle_matched(partner_id, initiator).await,

            ServerMessage::PartnerLeft => self.handle_partner_left().await,

            ServerMessage::Signal { from_id, signal } => {
                if self.peer_id.as_ref() == Some(&from_id) {
                    warn!("Dropping {} addressed from ourselves", signal.kind());
                    return;
                }
                if let Some(partner) = &self.negotiation.partner
                    && partner != &from_id
                {
                    warn!(
                        "Dropping {} from {}: current partner is {}",
                        signal.kind(),
                        from_id,
                        partner
                    );
                    return;
                }

                match signal {
                    SignalPayload::Offer { sdp } => self.handle_offer(from_id, sdp),
                    SignalPayload::Answer { sdp } => self.handle_answer(sdp),
                    SignalPayload::Candidate { candidate } => self.handle_candidate(candidate),
                }
            }
        }
    }

    /// The server's pairing always wins over whatever this side negotiated.
    async fn handle_matched(&mut self, partner_id: PeerId, initiator: bool) {
        if !self.active {
            // The server queued us on our partner's behalf; nobody wants this call.
            info!("Declining match with {}: session inactive", partner_id);
            self.send(ClientMessage::Leave);
            return;
        }
        if self.negotiation.is_partner(&partner_id) && self.negotiation.initiator == initiator {
            debug!("Repeated match with {}, ignored", partner_id);
            return;
        }
        if self.negotiation.partner.is_some() || self.call.is_some() {
            info!(
                "Match with {} replaces pairing in {:?}",
                partner_id, self.negotiation.phase
            );
            self.end_call().await;
            if self.negotiation.phase.in_call() {
                self.set_phase(SessionPhase::Disconnected);
            }
        }

        info!("Matched with {} (initiator: {})", partner_id, initiator);
        self.requeue_at = None;
        self.negotiation.partner = Some(partner_id.clone());
        self.negotiation.initiator = initiator;
        self.emit(SessionUpdate::Matched {
            partner_id,
            initiator,
        });

        if initiator {
            self.begin_call();
            self.negotiation.in_flight = true;
            self.set_phase(SessionPhase::Offering);
            self.submit(CallOp::Offer);
        } else {
            self.set_phase(SessionPhase::AwaitingMatch);
        }
    }

    async fn handle_partner_left(&mut self) {
        if self.negotiation.partner.is_none() {
            debug!("partner-left without a partner, ignored");
            return;
        }

        info!("Partner left");
        self.end_call().await;
        self.set_phase(SessionPhase::Disconnected);
        self.schedule_requeue();
    }

    fn handle_offer(&mut self, from_id: PeerId, sdp: String) {
        match self.negotiation.phase {
            SessionPhase::Connected => {
                debug!("Duplicate offer from {} while connected", from_id);
                return;
            }
            SessionPhase::Offering | SessionPhase::Answering => {
                debug!("Offer from {} collides with negotiation in flight", from_id);
                return;
            }
            SessionPhase::AwaitingMatch if self.negotiation.partner.is_some() => {}
            SessionPhase::AwaitingMatch => {
                warn!("Dropping offer from {}: no match announced", from_id);
                return;
            }
            SessionPhase::Idle if self.fresh => {
                self.active = true;
                self.fresh = false;
            }
            phase => {
                warn!("Offer from {} out of sequence in {:?}", from_id, phase);
                return;
            }
        }

        if self.negotiation.partner.is_none() {
            info!("Adopting {} as partner from its offer", from_id);
            self.negotiation.partner = Some(from_id.clone());
            self.emit(SessionUpdate::Matched {
                partner_id: from_id,
                initiator: false,
            });
        }

        self.requeue_at = None;
        self.begin_call();
        self.negotiation.in_flight = true;
        self.set_phase(SessionPhase::Answering);
        self.submit(CallOp::Answer { sdp });
    }

    fn handle_answer(&mut self, sdp: String) {
        let n = &self.negotiation;
        if n.phase == SessionPhase::Connected {
            debug!("Duplicate answer while connected");
            return;
        }
        if n.phase != SessionPhase::Offering || !n.local_set || n.remote_set || n.in_flight {
            warn!("Answer out of sequence in {:?}", n.phase);
            return;
        }

        self.negotiation.in_flight = true;
        self.submit(CallOp::ApplyAnswer { sdp });
    }

    fn handle_candidate(&mut self, candidate: Option<IceCandidateDescriptor>) {
        if self.negotiation.partner.is_none() {
            debug!("Candidate without a partner, dropped");
            return;
        }

        if self.negotiation.remote_set {
            self.submit(CallOp::AddCandidate(candidate));
        } else {
            self.negotiation.buffer_candidate(candidate);
            debug!(
                "Buffered early candidate ({} pending)",
                self.negotiation.pending_count()
            );
        }
    }

    async fn handle_notice(&mut self, notice: CallNotice) {
        let current = self.call.as_ref().map(|c| c.epoch);
        if current != Some(notice.epoch) {
            debug!("Discarding result of ended call {}", notice.epoch);
            return;
        }

        match notice.event {
            CallEvent::OfferCreated { sdp } => {
                self.negotiation.in_flight = false;
                self.negotiation.local_set = true;
                self.send_signal(SignalPayload::Offer { sdp });
            }

            CallEvent::AnswerCreated { sdp } => {
                self.negotiation.in_flight = false;
                self.negotiation.local_set = true;
                self.send_signal(SignalPayload::Answer { sdp });
                self.remote_applied();
            }

            CallEvent::AnswerApplied => {
                self.negotiation.in_flight = false;
                self.remote_applied();
            }

            CallEvent::CandidateRejected(e) => warn!("Remote candidate rejected: {}", e),

            CallEvent::MediaFailed(e) => {
                warn!("Media acquisition failed: {}", e);
                self.active = false;
                self.fresh = false;
                self.requeue_at = None;
                self.end_call().await;
                self.send(ClientMessage::Leave);
                self.emit(SessionUpdate::Error(SessionError::MediaAcquisition(e)));
                self.set_phase(SessionPhase::Idle);
            }

            CallEvent::NegotiationFailed(e) => {
                self.fail_call(SessionError::Negotiation(e)).await;
            }

            CallEvent::Transport(TransportEvent::LocalCandidate(candidate)) => {
                self.send_signal(SignalPayload::Candidate { candidate });
            }

            CallEvent::Transport(TransportEvent::StateChanged(state)) => {
                debug!("Transport state {:?}", state);
                if state.is_terminal() {
                    self.fail_call(SessionError::TransportTerminal(format!("{:?}", state)))
                        .await;
                }
            }
        }
    }

    fn handle_requeue_timer(&mut self) {
        self.requeue_at = None;

        if self.active && self.negotiation.phase == SessionPhase::Disconnected {
            info!("Requeueing after debounce");
            self.send(ClientMessage::JoinQueue);
            self.set_phase(SessionPhase::AwaitingMatch);
        }
    }

    /// Remote description is in place: flush early candidates, then connect.
    fn remote_applied(&mut self) {
        for candidate in self.negotiation.mark_remote_set() {
            self.submit(CallOp::AddCandidate(candidate));
        }
        self.set_phase(SessionPhase::Connected);
    }

    /// Ends the call after an unrecoverable negotiation or transport error.
    /// The server hears `leave` so the partner is told and requeued.
    async fn fail_call(&mut self, err: SessionError) {
        warn!("Call failed: {}", err);
        self.end_call().await;
        self.send(ClientMessage::Leave);
        self.emit(SessionUpdate::Error(err));
        self.set_phase(SessionPhase::Disconnected);
        self.schedule_requeue();
    }

    /// Leaves everything and settles in Idle.
    async fn hang_up(&mut self) {
        self.requeue_at = None;
        if self.negotiation.phase == SessionPhase::Idle && self.call.is_none() {
            return;
        }

        self.end_call().await;
        self.send(ClientMessage::Leave);
        if self.negotiation.phase != SessionPhase::Idle {
            self.set_phase(SessionPhase::Disconnected);
        }
        self.set_phase(SessionPhase::Idle);
    }

    fn schedule_requeue(&mut self) {
        let policy = self.config.requeue;
        if self.active && policy.enabled {
            debug!("Requeue in {:?}", policy.debounce);
            self.requeue_at = Some(Instant::now() + policy.debounce);
        }
    }

    fn begin_call(&mut self) {
        if self.call.is_some() {
            return;
        }

        let epoch = self.next_epoch;
        self.next_epoch += 1;
        debug!("Starting call {}", epoch);

        self.call = Some(CallWorker::spawn(
            epoch,
            self.media.clone(),
            self.transports.clone(),
            self.config.transport.clone(),
            self.notice_tx.clone(),
        ));
    }

    /// Tears down the current call, if any, and forgets the partner.
    /// Returns only after the worker released transport and capture.
    async fn end_call(&mut self) {
        if let Some(call) = self.call.take() {
            call.end().await;
        }
        self.negotiation.reset();
    }

    fn submit(&self, op: CallOp) {
        match &self.call {
            Some(call) => call.submit(op),
            None => warn!("No call for {:?}", op),
        }
    }

    fn send_signal(&self, signal: SignalPayload) {
        let Some(partner) = self.negotiation.partner.clone() else {
            warn!("No partner for {}", signal.kind());
            return;
        };
        self.send(ClientMessage::Signal {
            target_id: partner,
            signal,
        });
    }

    fn send(&self, msg: ClientMessage) {
        if let Err(e) = self.signaling.send(msg) {
            warn!("Failed to reach signaling server: {}", e);
        }
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.negotiation.phase == phase {
            return;
        }
        debug!("{:?} -> {:?}", self.negotiation.phase, phase);
        self.negotiation.phase = phase;
        self.emit(SessionUpdate::Phase(phase));
    }

    fn emit(&self, update: SessionUpdate) {
        let _ = self.update_tx.send(update);
    }
}

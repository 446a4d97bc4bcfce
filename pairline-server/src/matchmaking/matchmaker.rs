use crate::matchmaking::match_event::{MatchEvent, MatchStats};
use pairline_core::PeerId;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info};

/// FIFO waiting queue plus a symmetric pair table.
///
/// Liveness is owned by the transport layer, so every operation that may
/// hand an id to someone else takes an `is_live` predicate instead of
/// tracking connections here. Operations are synchronous and never block;
/// the caller is responsible for running them one at a time.
#[derive(Debug, Default)]
pub struct Matchmaker {
    waiting: VecDeque<PeerId>,
    pairs: HashMap<PeerId, PeerId>,
}

impl Matchmaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `peer_id` unless it is already waiting or paired.
    pub fn enqueue(&mut self, peer_id: &PeerId) -> bool {
        if self.pairs.contains_key(peer_id) || self.waiting.contains(peer_id) {
            return false;
        }
        self.waiting.push_back(peer_id.clone());
        true
    }

    /// Pairs `peer_id` with the earliest live waiter, or queues it.
    pub fn try_match<F>(&mut self, peer_id: &PeerId, is_live: F) -> Vec<MatchEvent>
    where
        F: Fn(&PeerId) -> bool,
    {
        self.remove_waiting(peer_id);

        if self.pairs.contains_key(peer_id) {
            debug!("Peer {} already in a pair, skipping matchmaking", peer_id);
            return Vec::new();
        }

        while let Some(candidate) = self.waiting.pop_front() {
            if &candidate == peer_id {
                continue;
            }
            if !is_live(&candidate) {
                debug!("Discarding stale queue entry {}", candidate);
                continue;
            }

            self.pairs.insert(peer_id.clone(), candidate.clone());
            self.pairs.insert(candidate.clone(), peer_id.clone());

            info!(
                "Paired {} <-> {} (active pairs: {}, waiting: {})",
                peer_id,
                candidate,
                self.pairs.len() / 2,
                self.waiting.len()
            );

            return vec![
                MatchEvent::Matched {
                    peer_id: peer_id.clone(),
                    partner_id: candidate.clone(),
                    initiator: false,
                },
                MatchEvent::Matched {
                    peer_id: candidate,
                    partner_id: peer_id.clone(),
                    initiator: true,
                },
            ];
        }

        self.enqueue(peer_id);
        info!(
            "Peer {} added to queue ({} waiting)",
            peer_id,
            self.waiting.len()
        );
        Vec::new()
    }

    /// Dissolves the pair `peer_id` belongs to and takes it off the queue.
    /// A live former partner is told and put back in line.
    pub fn force_leave<F>(&mut self, peer_id: &PeerId, is_live: F) -> Vec<MatchEvent>
    where
        F: Fn(&PeerId) -> bool,
    {
        self.remove_waiting(peer_id);

        let Some(partner) = self.pairs.remove(peer_id) else {
            return Vec::new();
        };
        self.pairs.remove(&partner);

        if !is_live(&partner) {
            debug!("Former partner {} of {} is gone", partner, peer_id);
            return Vec::new();
        }

        if self.enqueue(&partner) {
            info!("Partner {} re-queued after {} left", partner, peer_id);
        }

        vec![MatchEvent::PartnerLeft { peer_id: partner }]
    }

    /// `force_leave` followed by a fresh `try_match` for the same peer.
    pub fn next<F>(&mut self, peer_id: &PeerId, is_live: F) -> Vec<MatchEvent>
    where
        F: Fn(&PeerId) -> bool,
    {
        let mut events = self.force_leave(peer_id, &is_live);
        events.extend(self.try_match(peer_id, &is_live));
        events
    }

    /// Final cleanup for a closed connection. The id is never re-queued.
    pub fn disconnect<F>(&mut self, peer_id: &PeerId, is_live: F) -> Vec<MatchEvent>
    where
        F: Fn(&PeerId) -> bool,
    {
        self.force_leave(peer_id, |id| id != peer_id && is_live(id))
    }

    pub fn partner_of(&self, peer_id: &PeerId) -> Option<&PeerId> {
        self.pairs.get(peer_id)
    }

    pub fn is_waiting(&self, peer_id: &PeerId) -> bool {
        self.waiting.contains(peer_id)
    }

    pub fn waiting(&self) -> impl Iterator<Item = &PeerId> {
        self.waiting.iter()
    }

    pub fn stats(&self) -> MatchStats {
        MatchStats {
            waiting: self.waiting.len(),
            active_pairs: self.pairs.len() / 2,
        }
    }

    fn remove_waiting(&mut self, peer_id: &PeerId) {
        self.waiting.retain(|id| id != peer_id);
    }
}

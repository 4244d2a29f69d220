//! FIFO of pending decisions with priority insertion.
//!
//! The head is moved into `current` when presented and taken out again when
//! resolved. Ids are handed out on enqueue, so any id below `next_id` that
//! is neither pending nor current has already been resolved or cancelled.

use std::collections::VecDeque;

use super::{Decision, DecisionId, DecisionKind};
use crate::core::{EngineError, PlayerId, Result};

#[derive(Clone, Debug, Default)]
pub struct DecisionQueue {
    pending: VecDeque<Decision>,
    current: Option<Decision>,
    next_id: u32,
}

impl DecisionQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn assign_id(&mut self, decision: &mut Decision) -> DecisionId {
        self.next_id += 1;
        decision.id = DecisionId::new(self.next_id);
        decision.id
    }

    /// Append to the tail.
    pub fn enqueue(&mut self, mut decision: Decision) -> DecisionId {
        let id = self.assign_id(&mut decision);
        tracing::debug!("enqueue {}", decision);
        self.pending.push_back(decision);
        id
    }

    /// Insert at the head, ahead of everything pending.
    pub fn enqueue_priority(&mut self, mut decision: Decision) -> DecisionId {
        let id = self.assign_id(&mut decision);
        tracing::debug!("enqueue (priority) {}", decision);
        self.pending.push_front(decision);
        id
    }

    /// The presented decision, moving the head into place if nothing is
    /// presented yet.
    pub fn present_next(&mut self) -> Result<&Decision> {
        if self.current.is_none() {
            let next = self.pending.pop_front().ok_or(EngineError::EmptyQueue)?;
            tracing::debug!("present {}", next);
            self.current = Some(next);
        }
        self.current.as_ref().ok_or(EngineError::EmptyQueue)
    }

    #[must_use]
    pub fn current(&self) -> Option<&Decision> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Decision> {
        self.current.as_mut()
    }

    /// Remove the presented decision for resolution.
    pub fn take_current(&mut self) -> Option<Decision> {
        self.current.take()
    }

    /// Why `id` cannot be resolved right now.
    #[must_use]
    pub fn rejection(&self, id: DecisionId) -> EngineError {
        let pending = self.pending.iter().any(|d| d.id == id);
        if pending || id.raw() == 0 || id.raw() > self.next_id {
            EngineError::UnknownDecision { decision: id }
        } else {
            EngineError::InvalidDecisionState { decision: id }
        }
    }

    /// Drop every decision owned by `player`, including the presented one.
    /// Returns how many were removed.
    pub fn clear_for_player(&mut self, player: PlayerId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|d| d.player != Some(player));
        let mut removed = before - self.pending.len();
        if self.current.as_ref().is_some_and(|d| d.player == Some(player)) {
            self.current = None;
            removed += 1;
        }
        if removed > 0 {
            tracing::debug!("cleared {} decisions for {}", removed, player);
        }
        removed
    }

    pub fn clear_all(&mut self) {
        self.pending.clear();
        self.current = None;
    }

    /// Pending plus presented.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len() + usize::from(self.current.is_some())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pending decisions in queue order, not including the presented one.
    pub fn iter(&self) -> impl Iterator<Item = &Decision> {
        self.pending.iter()
    }

    #[must_use]
    pub fn contains_kind(&self, kind: DecisionKind) -> bool {
        self.current.iter().chain(self.pending.iter()).any(|d| d.kind == kind)
    }
}

//! Process-wide mutual exclusion for drag sessions.
//!
//! Only one drag may be active at a time. The policy is **preemption**: a
//! new drag always wins and the previous holder is told to cancel. The
//! notice travels through the previous holder's own drag channel, so each
//! engine remains the only writer of its session.
//!
//! Every claim carries a fresh [`ClaimTicket`]. A holder that receives a
//! `Preempted` notice for a ticket it no longer holds ignores it, which
//! keeps a late notice from cancelling a newer drag.

use super::channel::{DragEvent, DragEventSender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, warn};

/// Identity of one registered engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(u64);

/// Proof of one successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClaimTicket(u64);

#[derive(Debug)]
struct Claim {
    engine: EngineId,
    ticket: ClaimTicket,
    notify: DragEventSender,
}

/// Result of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claimed {
    /// Ticket identifying this claim.
    pub ticket: ClaimTicket,
    /// Engine whose claim was revoked, if another engine held the slot.
    pub preempted: Option<EngineId>,
}

/// Arbitrates the single active drag slot.
#[derive(Debug, Default)]
pub struct DragArbiter {
    next_id: AtomicU64,
    claim: Mutex<Option<Claim>>,
}

impl DragArbiter {
    /// Create an independent arbiter (useful to isolate tests or windows).
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide arbiter engines use by default.
    pub fn global() -> Arc<DragArbiter> {
        static GLOBAL: OnceLock<Arc<DragArbiter>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(DragArbiter::new())))
    }

    /// Allocate an identity for a new engine.
    pub fn register(&self) -> EngineId {
        EngineId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Take the slot for `engine`, revoking any other holder.
    ///
    /// `notify` is where this engine wants its own preemption notice
    /// delivered later.
    pub fn claim(&self, engine: EngineId, notify: DragEventSender) -> Claimed {
        let ticket = ClaimTicket(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut slot = self.lock();

        let preempted = match slot.take() {
            Some(previous) if previous.engine != engine => {
                let notice = DragEvent::Preempted {
                    ticket: previous.ticket,
                };
                if previous.notify.send(notice).is_err() {
                    warn!(engine = ?previous.engine, "Preempted engine is already gone");
                }
                debug!(from = ?previous.engine, to = ?engine, "Drag slot preempted");
                Some(previous.engine)
            }
            _ => None,
        };

        *slot = Some(Claim {
            engine,
            ticket,
            notify,
        });
        Claimed { ticket, preempted }
    }

    /// Give the slot back if `ticket` still holds it.
    pub fn release(&self, ticket: ClaimTicket) {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|claim| claim.ticket == ticket) {
            *slot = None;
        }
    }

    /// Engine currently holding the slot.
    pub fn holder(&self) -> Option<EngineId> {
        self.lock().as_ref().map(|claim| claim.engine)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Claim>> {
        self.claim.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::channel::drag_channel;

    #[test]
    fn first_claim_preempts_nobody() {
        let arbiter = DragArbiter::new();
        let engine = arbiter.register();
        let (tx, _rx) = drag_channel();

        let claimed = arbiter.claim(engine, tx);

        assert_eq!(claimed.preempted, None);
        assert_eq!(arbiter.holder(), Some(engine));
    }

    #[test]
    fn second_engine_preempts_first_via_its_channel() {
        let arbiter = DragArbiter::new();
        let (a, b) = (arbiter.register(), arbiter.register());
        let (tx_a, rx_a) = drag_channel();
        let (tx_b, rx_b) = drag_channel();

        let first = arbiter.claim(a, tx_a);
        let second = arbiter.claim(b, tx_b);

        assert_eq!(second.preempted, Some(a));
        assert_eq!(arbiter.holder(), Some(b));
        assert_eq!(
            rx_a.drain_coalesced(),
            vec![DragEvent::Preempted {
                ticket: first.ticket
            }]
        );
        assert!(rx_b.drain_coalesced().is_empty());
    }

    #[test]
    fn reclaim_by_same_engine_sends_no_notice() {
        let arbiter = DragArbiter::new();
        let a = arbiter.register();
        let (tx, rx) = drag_channel();

        let first = arbiter.claim(a, tx.clone());
        let second = arbiter.claim(a, tx);

        assert_ne!(first.ticket, second.ticket);
        assert_eq!(second.preempted, None);
        assert!(rx.drain_coalesced().is_empty());
    }

    #[test]
    fn stale_release_keeps_newer_claim() {
        let arbiter = DragArbiter::new();
        let (a, b) = (arbiter.register(), arbiter.register());
        let (tx_a, _rx_a) = drag_channel();
        let (tx_b, _rx_b) = drag_channel();

        let first = arbiter.claim(a, tx_a);
        let second = arbiter.claim(b, tx_b);
        arbiter.release(first.ticket);
        assert_eq!(arbiter.holder(), Some(b));

        arbiter.release(second.ticket);
        assert_eq!(arbiter.holder(), None);
    }

    #[test]
    fn preempting_a_dropped_engine_still_succeeds() {
        let arbiter = DragArbiter::new();
        let (a, b) = (arbiter.register(), arbiter.register());
        let (tx_a, rx_a) = drag_channel();
        let (tx_b, _rx_b) = drag_channel();
        arbiter.claim(a, tx_a);
        drop(rx_a);

        let claimed = arbiter.claim(b, tx_b);
        assert_eq!(claimed.preempted, Some(a));
    }

    #[test]
    fn global_is_shared() {
        let one = DragArbiter::global();
        let two = DragArbiter::global();
        assert!(Arc::ptr_eq(&one, &two));
    }
}

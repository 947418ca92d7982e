//!  src/util/timer.rs
//!  ===================================================================
//!  Cancelable deferred work for the single-threaded page timeline.
//!
//!  • Pending deadlines live in a slab; a fired or cancelled timer frees
//!    its slot immediately, so nothing scheduled outlives its owner's
//!    interest in it.
//!  • Handles carry a generation: a stale handle can never cancel the
//!    timer that later reuses its slot.
//!  • Callbacks are data ([`TimerKind`]), not closures. The page decides
//!    what a fired timer means, so there is no hidden re-entrancy.
//!  -------------------------------------------------------------------

use std::time::Duration;

use slab::Slab;
use tokio::time::Instant;
use tracing::trace;

use crate::model::toast::ToastId;
use crate::view::tree::NodeId;

/// What a timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Toast auto-removal.
    ToastExpiry(ToastId),
    /// Debounced search submit for the input node.
    SearchDebounce(NodeId),
    /// Server-rendered dismissible alert auto-close.
    AlertClose(NodeId),
    /// Submit button leaves its "processing" state.
    SubmitReenable(NodeId),
    /// Copy button leaves its "copied" look.
    CopyFeedbackRevert(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    slot: usize,
    generation: u64,
}

/// A timer removed from the table because its deadline passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub handle: TimerHandle,
    pub kind: TimerKind,
    pub deadline: Instant,
}

/// Internal state for each pending timer, stored in a slab slot.
#[derive(Debug)]
struct Slot {
    deadline: Instant,
    generation: u64,
    kind: TimerKind,
}

#[derive(Debug, Default)]
pub struct TimerService {
    slots: Slab<Slot>,
    next_generation: u64,
}

impl TimerService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire `delay` after `now`.
    pub fn schedule(&mut self, now: Instant, delay: Duration, kind: TimerKind) -> TimerHandle {
        self.next_generation += 1;
        let generation = self.next_generation;
        let slot = self.slots.insert(Slot {
            deadline: now + delay,
            generation,
            kind,
        });
        trace!("timer: scheduled {:?} in {:?} (slot {})", kind, delay, slot);
        TimerHandle { slot, generation }
    }

    /// Cancel a pending timer. Its callback is guaranteed never to run.
    /// Returns false when the timer already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        if !self.is_pending(handle) {
            return false;
        }
        let slot = self.slots.remove(handle.slot);
        trace!("timer: cancelled {:?}", slot.kind);
        true
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.slots
            .get(handle.slot)
            .is_some_and(|s| s.generation == handle.generation)
    }

    pub fn deadline(&self, handle: TimerHandle) -> Option<Instant> {
        self.slots
            .get(handle.slot)
            .filter(|s| s.generation == handle.generation)
            .map(|s| s.deadline)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.iter().map(|(_, s)| s.deadline).min()
    }

    /// Remove and return the earliest timer due at `now`, ties broken by
    /// schedule order.
    ///
    /// Fire one at a time: a handler may cancel a timer that is also due.
    pub fn pop_due(&mut self, now: Instant) -> Option<FiredTimer> {
        let (idx, _) = self
            .slots
            .iter()
            .filter(|(_, s)| s.deadline <= now)
            .min_by_key(|(_, s)| (s.deadline, s.generation))?;

        let slot = self.slots.remove(idx);
        Some(FiredTimer {
            handle: TimerHandle {
                slot: idx,
                generation: slot.generation,
            },
            kind: slot.kind,
            deadline: slot.deadline,
        })
    }

    /// Number of pending timers.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

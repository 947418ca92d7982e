//! src/controller/event_loop.rs
//! ============================================================================
//! # EventLoop: the single timeline a page runs on
//!
//! One task owns the [`Page`]. Each wakeup (an inbound event, the earliest
//! timer deadline, a settled clipboard write) is processed to completion
//! before the next is taken, so behaviors never observe each other
//! half-way. Secure clipboard writes run as spawned tasks and report back
//! through a channel; that is the only concurrency on the page.
//!
//! The loop ends on shutdown, or once the inbound channel is closed and the
//! page has nothing left pending.

use std::sync::Arc;

use clipport::ClipResult;
use serde::Serialize;
use tokio::sync::{Notify, mpsc};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, trace, warn};

use crate::controller::copy_actions::CopyRequestId;
use crate::controller::events::{PageEffect, PageEvent};
use crate::controller::page::Page;

type Settled = (CopyRequestId, ClipResult<()>);

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoopMetrics {
    pub events: u64,
    pub timer_wakeups: u64,
    pub copies_spawned: u64,
    pub copies_settled: u64,
    pub effects: u64,
    pub errors: u64,
}

pub struct EventLoop {
    page: Page,
    events_rx: mpsc::UnboundedReceiver<PageEvent>,
    effects_tx: mpsc::UnboundedSender<PageEffect>,
    settled_tx: mpsc::UnboundedSender<Settled>,
    settled_rx: mpsc::UnboundedReceiver<Settled>,
    shutdown: Arc<Notify>,
    metrics: LoopMetrics,
}

impl EventLoop {
    pub fn new(
        page: Page,
        events_rx: mpsc::UnboundedReceiver<PageEvent>,
        effects_tx: mpsc::UnboundedSender<PageEffect>,
        shutdown: Arc<Notify>,
    ) -> Self {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        Self {
            page,
            events_rx,
            effects_tx,
            settled_tx,
            settled_rx,
            shutdown,
            metrics: LoopMetrics::default(),
        }
    }

    /// Drive the page until shutdown or until it goes idle with no more
    /// input. Returns the page for inspection.
    pub async fn run(mut self) -> (Page, LoopMetrics) {
        info!("event loop: started");
        let mut inbound_open = true;

        loop {
            self.spawn_pending_copies();

            if !inbound_open && self.page.is_idle() {
                debug!("event loop: input closed and page idle");
                break;
            }

            let deadline = self.page.next_deadline();

            tokio::select! {
                biased;

                _ = self.shutdown.notified() => {
                    info!("event loop: shutdown requested");
                    break;
                }

                Some((id, result)) = self.settled_rx.recv() => {
                    self.metrics.copies_settled += 1;
                    let effects = self.page.settle_copy(Instant::now(), id, result);
                    self.publish(effects);
                }

                // the branch is disabled without a deadline, but its future
                // is still built, hence the placeholder instant
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.metrics.timer_wakeups += 1;
                    let effects = self.page.fire_timers(Instant::now());
                    self.publish(effects);
                }

                event = self.events_rx.recv(), if inbound_open => match event {
                    Some(event) => {
                        self.metrics.events += 1;
                        match self.page.handle(Instant::now(), event) {
                            Ok(effects) => self.publish(effects),
                            Err(err) => {
                                self.metrics.errors += 1;
                                warn!("event loop: event failed: {}", err);
                            }
                        }
                    }
                    None => {
                        debug!("event loop: input channel closed");
                        inbound_open = false;
                    }
                },
            }
        }

        info!("event loop: stopped {:?}", self.metrics);
        (self.page, self.metrics)
    }

    fn spawn_pending_copies(&mut self) {
        for pending in self.page.take_pending_copies() {
            self.metrics.copies_spawned += 1;
            let tx = self.settled_tx.clone();
            let id = pending.id;
            trace!("event loop: spawning secure write {}", id);
            tokio::spawn(async move {
                let result = pending.future.await;
                // receiver gone means the loop already stopped
                let _ = tx.send((id, result));
            });
        }
    }

    fn publish(&mut self, effects: Vec<PageEffect>) {
        for effect in effects {
            self.metrics.effects += 1;
            if self.effects_tx.send(effect).is_err() {
                trace!("event loop: effect receiver dropped");
            }
        }
    }
}

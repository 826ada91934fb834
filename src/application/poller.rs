//! StatusPoller - cancellable, single-flight periodic checker.
//!
//! A poller is either stopped or running. `start` performs an immediate
//! check and then one per interval. At most one check is in flight: a tick
//! that fires while the previous check is still pending drops that check
//! and starts a fresh one, so an older answer can never be applied after a
//! newer one.
//!
//! ## Graceful Shutdown
//!
//! `stop` signals the loop through a watch channel. A check in flight is
//! dropped; a directive already being applied runs to completion, so an
//! invalidation sequence started by the poller itself is never cut short.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, OptionFuture};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::invalidation::SessionInvalidator;
use super::session_store::SessionStore;
use crate::domain::guest::{GuestError, InvalidationReason, SessionToken};

/// What the poller does after applying a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollDirective {
    /// Keep polling.
    Continue,
    /// Stop polling; the watched fact is settled.
    Finish,
    /// Run the invalidation sequence for the session `token` identifies.
    /// Polling stops when the sequence ends that session.
    Invalidate {
        token: SessionToken,
        reason: InvalidationReason,
        message: Option<String>,
    },
}

/// One kind of server-side fact a poller watches.
#[async_trait]
pub trait StatusCheck: Send + Sync + 'static {
    type Report: Send + 'static;

    /// Asks the server. `Err(GuestError::NoSession)` ends polling.
    async fn check(&self) -> Result<Self::Report, GuestError>;

    /// Applies a report to local state.
    async fn apply(&self, report: Self::Report) -> PollDirective;
}

struct RunningPoller {
    generation: u64,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct SwitchSlot {
    generation: u64,
    running: Option<RunningPoller>,
}

/// Start/stop handle of one poller, shareable with the invalidation sequence.
#[derive(Clone, Default)]
pub struct PollerSwitch {
    slot: Arc<Mutex<SwitchSlot>>,
}

impl PollerSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.with_slot(|slot| {
            slot.running
                .as_ref()
                .is_some_and(|running| !running.handle.is_finished())
        })
    }

    /// Signals the running loop to stop. Returns whether one was running.
    pub fn stop(&self) -> bool {
        let running = self.with_slot(|slot| slot.running.take());
        match running {
            Some(running) => {
                // The loop may already have exited on its own.
                let _ = running.shutdown.send(true);
                !running.handle.is_finished()
            }
            None => false,
        }
    }

    /// Installs a new loop unless one is running.
    fn install<F>(&self, spawn: F) -> bool
    where
        F: FnOnce(u64, watch::Receiver<bool>) -> JoinHandle<()>,
    {
        self.with_slot(|slot| {
            if slot
                .running
                .as_ref()
                .is_some_and(|running| !running.handle.is_finished())
            {
                return false;
            }
            slot.generation += 1;
            let generation = slot.generation;
            let (shutdown, receiver) = watch::channel(false);
            let handle = spawn(generation, receiver);
            slot.running = Some(RunningPoller {
                generation,
                shutdown,
                handle,
            });
            true
        })
    }

    /// Called by a loop that ended on its own.
    fn release(&self, generation: u64) {
        self.with_slot(|slot| {
            if slot
                .running
                .as_ref()
                .is_some_and(|running| running.generation == generation)
            {
                slot.running = None;
            }
        });
    }

    fn with_slot<T>(&self, f: impl FnOnce(&mut SwitchSlot) -> T) -> T {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut slot)
    }
}

/// Periodic checker over a [`StatusCheck`].
pub struct StatusPoller<C: StatusCheck> {
    name: &'static str,
    check: Arc<C>,
    interval: Duration,
    switch: PollerSwitch,
    store: Arc<SessionStore>,
    invalidator: Arc<SessionInvalidator>,
}

impl<C: StatusCheck> StatusPoller<C> {
    pub fn new(
        name: &'static str,
        check: C,
        interval: Duration,
        switch: PollerSwitch,
        store: Arc<SessionStore>,
        invalidator: Arc<SessionInvalidator>,
    ) -> Self {
        Self {
            name,
            check: Arc::new(check),
            interval,
            switch,
            store,
            invalidator,
        }
    }

    /// Starts polling. No-op while running or when there is no session.
    ///
    /// Returns whether a new loop was started. Must be called within a
    /// tokio runtime.
    pub fn start(&self) -> bool {
        if !self.store.has_session() {
            tracing::debug!(poller = self.name, "not starting poller without a session");
            return false;
        }

        let started = self.switch.install(|generation, shutdown| {
            tokio::spawn(poll_loop(
                self.name,
                self.check.clone(),
                self.interval,
                shutdown,
                self.invalidator.clone(),
                self.switch.clone(),
                generation,
            ))
        });
        if started {
            tracing::debug!(poller = self.name, interval = ?self.interval, "poller started");
        }
        started
    }

    /// Stops polling. No-op when stopped.
    pub fn stop(&self) -> bool {
        let stopped = self.switch.stop();
        if stopped {
            tracing::debug!(poller = self.name, "poller stopped");
        }
        stopped
    }

    pub fn is_running(&self) -> bool {
        self.switch.is_running()
    }
}

async fn poll_loop<C: StatusCheck>(
    name: &'static str,
    check: Arc<C>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    invalidator: Arc<SessionInvalidator>,
    switch: PollerSwitch,
    generation: u64,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight: Option<BoxFuture<'static, Result<C::Report, GuestError>>> = None;

    loop {
        tokio::select! {
            biased;

            // Stop requested, or the switch is gone
            _ = shutdown.changed() => break,

            Some(outcome) = OptionFuture::from(in_flight.as_mut()), if in_flight.is_some() => {
                in_flight = None;
                match outcome {
                    Ok(report) => match check.apply(report).await {
                        PollDirective::Continue => {}
                        PollDirective::Finish => {
                            tracing::debug!(poller = name, "poller finished");
                            break;
                        }
                        PollDirective::Invalidate { token, reason, message } => {
                            if invalidator.invalidate(&token, reason, message).await {
                                break;
                            }
                        }
                    },
                    Err(GuestError::NoSession) => {
                        tracing::debug!(poller = name, "session gone; poller finished");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(poller = name, error = %e, "status check failed; will retry");
                    }
                }
            }

            _ = ticker.tick() => {
                if in_flight.is_some() {
                    tracing::debug!(poller = name, "superseding unanswered status check");
                }
                let check = check.clone();
                in_flight = Some(Box::pin(async move { check.check().await }));
            }
        }
    }

    switch.release(generation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::invalidation::InvalidationBus;
    use crate::application::test_support::{memory_store, store_with_session};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Check returning scripted `(delay, value)` answers and recording what it applied.
    struct CountingCheck {
        checks: Arc<AtomicUsize>,
        applied: Arc<Mutex<Vec<u32>>>,
        answers: Mutex<Vec<(Duration, Result<u32, GuestError>)>>,
        directive_for: fn(u32) -> PollDirective,
    }

    impl CountingCheck {
        fn new(answers: Vec<(Duration, Result<u32, GuestError>)>) -> Self {
            Self {
                checks: Arc::new(AtomicUsize::new(0)),
                applied: Arc::new(Mutex::new(Vec::new())),
                answers: Mutex::new(answers),
                directive_for: |_| PollDirective::Continue,
            }
        }

        fn with_directive(mut self, directive_for: fn(u32) -> PollDirective) -> Self {
            self.directive_for = directive_for;
            self
        }
    }

    #[async_trait]
    impl StatusCheck for CountingCheck {
        type Report = u32;

        async fn check(&self) -> Result<u32, GuestError> {
            let n = self.checks.fetch_add(1, Ordering::SeqCst);
            let answer = {
                let answers = self.answers.lock().unwrap();
                answers.get(n).cloned()
            };
            match answer {
                Some((delay, result)) => {
                    time::sleep(delay).await;
                    result
                }
                None => Ok(0),
            }
        }

        async fn apply(&self, report: u32) -> PollDirective {
            self.applied.lock().unwrap().push(report);
            (self.directive_for)(report)
        }
    }

    fn poller(
        check: CountingCheck,
        store: Arc<SessionStore>,
    ) -> (StatusPoller<CountingCheck>, PollerSwitch) {
        let switch = PollerSwitch::new();
        let invalidator = Arc::new(SessionInvalidator::new(
            store.clone(),
            InvalidationBus::new(),
            vec![switch.clone()],
        ));
        let poller = StatusPoller::new(
            "test",
            check,
            Duration::from_secs(5),
            switch.clone(),
            store,
            invalidator,
        );
        (poller, switch)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_checks_immediately_then_on_interval() {
        let (store, _) = store_with_session("tok").await;
        let check = CountingCheck::new(Vec::new());
        let checks = check.checks.clone();
        let (poller, _) = poller(check, store);

        assert!(poller.start());
        settle().await;
        assert_eq!(checks.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(checks.load(Ordering::SeqCst), 2);

        time::sleep(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(checks.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let (store, _) = store_with_session("tok").await;
        let check = CountingCheck::new(Vec::new());
        let checks = check.checks.clone();
        let (poller, _) = poller(check, store);

        assert!(poller.start());
        assert!(!poller.start());
        settle().await;

        assert_eq!(checks.load(Ordering::SeqCst), 1);
        assert!(poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_halts_checks() {
        let (store, _) = store_with_session("tok").await;
        let check = CountingCheck::new(Vec::new());
        let checks = check.checks.clone();
        let (poller, _) = poller(check, store);

        assert!(!poller.stop());
        poller.start();
        settle().await;
        assert!(poller.stop());
        assert!(!poller.stop());

        time::sleep(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(checks.load(Ordering::SeqCst), 1);
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn refuses_to_start_without_session() {
        let (store, _) = memory_store();
        let (poller, _) = poller(CountingCheck::new(Vec::new()), store);

        assert!(!poller.start());
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn late_answer_is_superseded_by_next_tick() {
        let (store, _) = store_with_session("tok").await;
        // First answer takes longer than the interval; second arrives first.
        let check = CountingCheck::new(vec![
            (Duration::from_secs(8), Ok(1)),
            (Duration::from_secs(1), Ok(2)),
        ]);
        let applied = check.applied.clone();
        let (poller, _) = poller(check, store);

        poller.start();
        time::sleep(Duration::from_secs(9)).await;
        settle().await;

        assert_eq!(*applied.lock().unwrap(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_errors_keep_polling() {
        let (store, _) = store_with_session("tok").await;
        let check = CountingCheck::new(vec![
            (Duration::ZERO, Err(GuestError::network("offline"))),
            (Duration::ZERO, Ok(3)),
        ]);
        let applied = check.applied.clone();
        let (poller, _) = poller(check, store);

        poller.start();
        time::sleep(Duration::from_secs(5)).await;
        settle().await;

        assert_eq!(*applied.lock().unwrap(), vec![3]);
        assert!(poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn finish_directive_stops_and_allows_restart() {
        let (store, _) = store_with_session("tok").await;
        let check = CountingCheck::new(Vec::new()).with_directive(|_| PollDirective::Finish);
        let (poller, _) = poller(check, store);

        poller.start();
        settle().await;
        assert!(!poller.is_running());

        assert!(poller.start());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_session_ends_polling() {
        let (store, _) = store_with_session("tok").await;
        let check = CountingCheck::new(vec![(Duration::ZERO, Err(GuestError::NoSession))]);
        let (poller, _) = poller(check, store);

        poller.start();
        settle().await;

        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_directive_runs_full_sequence() {
        let (store, _) = store_with_session("tok").await;
        let check = CountingCheck::new(Vec::new()).with_directive(|_| PollDirective::Invalidate {
            token: SessionToken::new("tok"),
            reason: InvalidationReason::Banned,
            message: None,
        });
        let (poller, _) = poller(check, store.clone());

        poller.start();
        settle().await;

        assert!(!poller.is_running());
        assert!(!store.has_session());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_invalidation_keeps_polling() {
        let (store, _) = store_with_session("tok").await;
        let check = CountingCheck::new(Vec::new()).with_directive(|_| PollDirective::Invalidate {
            token: SessionToken::new("replaced"),
            reason: InvalidationReason::Deleted,
            message: None,
        });
        let checks = check.checks.clone();
        let (poller, _) = poller(check, store.clone());

        poller.start();
        time::sleep(Duration::from_secs(5)).await;
        settle().await;

        assert!(poller.is_running());
        assert!(store.has_session());
        assert_eq!(checks.load(Ordering::SeqCst), 2);
    }
}

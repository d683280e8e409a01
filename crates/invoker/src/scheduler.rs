//! Periodic re-invocation of read methods.
//!
//! The scheduler owns one timer task per arm. Every tick checks the target's
//! status first: a pending invocation skips the tick and a failed one
//! suspends the scheduler until the next arm. Invocations run in their own
//! tasks so that stopping the timer never cancels a call in flight.

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::status::{InvocationOutcome, InvocationStatus};

/// Why automatic invocations are on hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuspendReason {
    /// A bound input needs the wallet address and none is available.
    AddressRequired,
    /// The last invocation failed.
    InvocationFailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerState {
    #[default]
    Stopped,
    Running,
    Suspended(SuspendReason),
}

/// What the scheduler drives.
#[async_trait]
pub trait InvocationTarget: Send + Sync {
    fn status(&self) -> InvocationStatus;

    async fn invoke_scheduled(&self) -> InvocationOutcome;
}

#[derive(Default)]
struct SchedulerShared {
    state: SchedulerState,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every arm or stop; outdated tasks leave the state alone.
    epoch: u64,
}

impl SchedulerShared {
    fn clear_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Auto-invoke timer of one widget.
pub struct AutoInvokeScheduler {
    interval: Duration,
    shared: Arc<Mutex<SchedulerShared>>,
}

impl AutoInvokeScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            shared: Arc::new(Mutex::new(SchedulerShared::default())),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> SchedulerState {
        self.shared.lock().state
    }

    /// Starts (or restarts) the timer for `target`.
    ///
    /// Without a resolved address the scheduler goes straight to
    /// `Suspended(AddressRequired)`. A zero interval leaves it `Stopped`.
    /// Must be called within a tokio runtime.
    pub fn arm(&self, target: Weak<dyn InvocationTarget>, address_resolved: bool) -> SchedulerState {
        let mut shared = self.shared.lock();
        shared.clear_timer();
        shared.epoch += 1;

        if self.interval.is_zero() {
            shared.state = SchedulerState::Stopped;
            warn!("auto-invoke interval is zero, timer not started");
            return shared.state;
        }

        if !address_resolved {
            shared.state = SchedulerState::Suspended(SuspendReason::AddressRequired);
            info!("auto-invoke suspended until an address is available");
            return shared.state;
        }

        let epoch = shared.epoch;
        let period = self.interval;
        let scheduler = Arc::downgrade(&self.shared);
        shared.timer = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let Some(current) = target.upgrade() else {
                    break;
                };

                match current.status() {
                    InvocationStatus::Pending => {
                        debug!("previous invocation still pending, skipping tick");
                        continue;
                    }
                    InvocationStatus::Failed(_) => {
                        suspend(&scheduler, epoch, false);
                        break;
                    }
                    _ => {}
                }

                let scheduler = scheduler.clone();
                tokio::spawn(async move {
                    let outcome = current.invoke_scheduled().await;
                    debug!(?outcome, "scheduled invocation finished");
                    if matches!(outcome.status(), Some(InvocationStatus::Failed(_))) {
                        suspend(&scheduler, epoch, true);
                    }
                });
            }
        }));

        shared.state = SchedulerState::Running;
        debug!(interval_ms = period.as_millis() as u64, "auto-invoke running");
        shared.state
    }

    /// Suspends after a failure observed outside the timer, such as a
    /// manual invocation.
    pub fn suspend(&self, reason: SuspendReason) {
        let mut shared = self.shared.lock();
        if shared.state == SchedulerState::Running {
            shared.clear_timer();
            shared.epoch += 1;
            shared.state = SchedulerState::Suspended(reason);
            info!(?reason, "auto-invoke suspended");
        }
    }

    pub fn stop(&self) {
        let mut shared = self.shared.lock();
        shared.clear_timer();
        shared.epoch += 1;
        if shared.state != SchedulerState::Stopped {
            debug!("auto-invoke stopped");
        }
        shared.state = SchedulerState::Stopped;
    }
}

impl Drop for AutoInvokeScheduler {
    fn drop(&mut self) {
        self.shared.lock().clear_timer();
    }
}

/// Moves a running scheduler to `Suspended(InvocationFailed)` unless it has
/// been re-armed or stopped since `epoch`.
fn suspend(shared: &Weak<Mutex<SchedulerShared>>, epoch: u64, abort_timer: bool) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let mut shared = shared.lock();
    if shared.epoch != epoch || shared.state != SchedulerState::Running {
        return;
    }
    if abort_timer {
        shared.clear_timer();
    } else {
        // Called from the timer task itself, which is about to exit.
        shared.timer = None;
    }
    shared.state = SchedulerState::Suspended(SuspendReason::InvocationFailed);
    info!("auto-invoke suspended after a failed invocation");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTarget {
        status: Mutex<InvocationStatus>,
        calls: AtomicUsize,
        fail_after: usize,
    }

    impl CountingTarget {
        fn new(fail_after: usize) -> Arc<Self> {
            Arc::new(Self {
                status: Mutex::new(InvocationStatus::Idle),
                calls: AtomicUsize::new(0),
                fail_after,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InvocationTarget for CountingTarget {
        fn status(&self) -> InvocationStatus {
            self.status.lock().clone()
        }

        async fn invoke_scheduled(&self) -> InvocationOutcome {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let status = if call >= self.fail_after {
                InvocationStatus::Failed("boom".to_string())
            } else {
                InvocationStatus::Succeeded(serde_json::json!(call))
            };
            *self.status.lock() = status.clone();
            InvocationOutcome::Completed(status)
        }
    }

    fn weak(target: &Arc<CountingTarget>) -> Weak<dyn InvocationTarget> {
        let target: Arc<dyn InvocationTarget> = target.clone();
        Arc::downgrade(&target)
    }

    const PERIOD: Duration = Duration::from_millis(4000);

    #[tokio::test(start_paused = true)]
    async fn test_ticks_invoke_target() {
        let target = CountingTarget::new(usize::MAX);
        let scheduler = AutoInvokeScheduler::new(PERIOD);
        assert_eq!(scheduler.arm(weak(&target), true), SchedulerState::Running);

        tokio::time::sleep(PERIOD * 3 + Duration::from_millis(10)).await;
        assert_eq!(target.calls(), 3);

        scheduler.stop();
        tokio::time::sleep(PERIOD * 2).await;
        assert_eq!(target.calls(), 3);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_suspends() {
        let target = CountingTarget::new(2);
        let scheduler = AutoInvokeScheduler::new(PERIOD);
        scheduler.arm(weak(&target), true);

        tokio::time::sleep(PERIOD * 5).await;
        assert_eq!(target.calls(), 2);
        assert_eq!(
            scheduler.state(),
            SchedulerState::Suspended(SuspendReason::InvocationFailed)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_skips_tick() {
        let target = CountingTarget::new(usize::MAX);
        *target.status.lock() = InvocationStatus::Pending;
        let scheduler = AutoInvokeScheduler::new(PERIOD);
        scheduler.arm(weak(&target), true);

        tokio::time::sleep(PERIOD * 2 + Duration::from_millis(10)).await;
        assert_eq!(target.calls(), 0);

        *target.status.lock() = InvocationStatus::Idle;
        tokio::time::sleep(PERIOD).await;
        assert_eq!(target.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_address_suspends_until_rearmed() {
        let target = CountingTarget::new(usize::MAX);
        let scheduler = AutoInvokeScheduler::new(PERIOD);
        assert_eq!(
            scheduler.arm(weak(&target), false),
            SchedulerState::Suspended(SuspendReason::AddressRequired)
        );

        tokio::time::sleep(PERIOD * 2).await;
        assert_eq!(target.calls(), 0);

        assert_eq!(scheduler.arm(weak(&target), true), SchedulerState::Running);
        tokio::time::sleep(PERIOD + Duration::from_millis(10)).await;
        assert_eq!(target.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_target_ends_timer() {
        let target = CountingTarget::new(usize::MAX);
        let scheduler = AutoInvokeScheduler::new(PERIOD);
        scheduler.arm(weak(&target), true);
        drop(target);

        tokio::time::sleep(PERIOD * 2).await;
        assert_eq!(scheduler.state(), SchedulerState::Running);
        scheduler.suspend(SuspendReason::InvocationFailed);
        assert_eq!(
            scheduler.state(),
            SchedulerState::Suspended(SuspendReason::InvocationFailed)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_never_starts() {
        let target = CountingTarget::new(usize::MAX);
        let scheduler = AutoInvokeScheduler::new(Duration::ZERO);
        assert_eq!(scheduler.arm(weak(&target), true), SchedulerState::Stopped);
        assert!(scheduler.shared.lock().timer.is_none());

        tokio::time::sleep(PERIOD).await;
        assert_eq!(target.calls(), 0);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }
}

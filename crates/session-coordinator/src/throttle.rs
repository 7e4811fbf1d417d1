//! Leading-edge throttle with a configurable trailing-call policy.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// What happens to calls that arrive inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingPolicy {
    /// Calls inside the window are dropped.
    Drop,
    /// One call runs when the window closes; further calls are dropped.
    RunOnce,
}

/// Result of [`Throttle::call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleOutcome {
    /// The task was spawned immediately.
    Ran,
    /// The task will run when the window closes.
    Scheduled,
    /// The task was discarded.
    Dropped,
}

#[derive(Debug, Default)]
struct ThrottleState {
    last_run: Option<Instant>,
    trailing_scheduled: bool,
}

/// Runs at most one task per window.
#[derive(Debug)]
pub struct Throttle {
    window: Duration,
    trailing: TrailingPolicy,
    state: Arc<Mutex<ThrottleState>>,
}

impl Throttle {
    pub fn new(window: Duration, trailing: TrailingPolicy) -> Self {
        Self {
            window,
            trailing,
            state: Arc::new(Mutex::new(ThrottleState::default())),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Spawn `task` if the window is open, otherwise apply the trailing policy.
    ///
    /// Must be called inside a tokio runtime.
    pub fn call<F, Fut>(&self, task: F) -> ThrottleOutcome
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let now = Instant::now();
        let mut state = self.state.lock();

        let elapsed = state.last_run.map(|last| now.saturating_duration_since(last));
        if elapsed.map_or(true, |elapsed| elapsed >= self.window) {
            state.last_run = Some(now);
            drop(state);
            tokio::spawn(task());
            return ThrottleOutcome::Ran;
        }

        match self.trailing {
            TrailingPolicy::Drop => {
                debug!(window_ms = self.window.as_millis() as u64, "throttled call dropped");
                ThrottleOutcome::Dropped
            }
            TrailingPolicy::RunOnce if state.trailing_scheduled => ThrottleOutcome::Dropped,
            TrailingPolicy::RunOnce => {
                state.trailing_scheduled = true;
                let delay = self.window - elapsed.unwrap_or_default();
                let shared = self.state.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    {
                        let mut state = shared.lock();
                        state.last_run = Some(Instant::now());
                        state.trailing_scheduled = false;
                    }
                    task().await;
                });
                ThrottleOutcome::Scheduled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(counter: &Arc<AtomicUsize>) -> impl FnOnce() -> std::future::Ready<()> {
        let counter = counter.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_leading_call_runs_and_rest_drop() {
        let throttle = Throttle::new(Duration::from_secs(5), TrailingPolicy::Drop);
        let runs = Arc::new(AtomicUsize::new(0));

        assert_eq!(throttle.call(counting_task(&runs)), ThrottleOutcome::Ran);
        for _ in 0..9 {
            tokio::time::advance(Duration::from_millis(400)).await;
            assert_eq!(throttle.call(counting_task(&runs)), ThrottleOutcome::Dropped);
        }
        tokio::task::yield_now().await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_reopens_after_elapsed() {
        let throttle = Throttle::new(Duration::from_secs(5), TrailingPolicy::Drop);
        let runs = Arc::new(AtomicUsize::new(0));

        throttle.call(counting_task(&runs));
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(throttle.call(counting_task(&runs)), ThrottleOutcome::Ran);
        tokio::task::yield_now().await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trailing_policy_runs_once_at_window_end() {
        let throttle = Throttle::new(Duration::from_secs(5), TrailingPolicy::RunOnce);
        let runs = Arc::new(AtomicUsize::new(0));

        assert_eq!(throttle.call(counting_task(&runs)), ThrottleOutcome::Ran);
        assert_eq!(throttle.call(counting_task(&runs)), ThrottleOutcome::Scheduled);
        assert_eq!(throttle.call(counting_task(&runs)), ThrottleOutcome::Dropped);
        tokio::task::yield_now().await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}

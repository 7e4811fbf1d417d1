//! Registry of outstanding timer tasks, cancelled together on session cleanup.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct Timers {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an already-spawned task.
    pub fn register(&self, handle: JoinHandle<()>) {
        let mut handles = self.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Run `task` after `delay` unless cleared first.
    pub fn spawn_after<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.register(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Abort every outstanding timer. Returns how many were still pending.
    pub fn clear_all(&self) -> usize {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.handles.lock());
        let mut pending = 0;
        for handle in handles {
            if !handle.is_finished() {
                pending += 1;
            }
            handle.abort();
        }
        pending
    }

    pub fn pending(&self) -> usize {
        self.handles.lock().iter().filter(|h| !h.is_finished()).count()
    }
}

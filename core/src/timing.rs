//! Debounce and throttle wrappers for arbitrary callbacks.
//!
//! Neither type knows anything about carts. `Debounce` needs a tokio runtime
//! to schedule its delayed call; `Throttle` only reads the clock.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

type Callback<A> = Arc<dyn Fn(A) + Send + Sync>;

/// Runs the callback once calls have stopped arriving for `wait`, with the
/// arguments of the last call.
pub struct Debounce<A> {
    wait: Duration,
    callback: Callback<A>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Send + 'static> Debounce<A> {
    pub fn new(wait: Duration, callback: impl Fn(A) + Send + Sync + 'static) -> Self {
        Self {
            wait,
            callback: Arc::new(callback),
            pending: Mutex::new(None),
        }
    }

    /// Restarts the quiet period. Must be called inside a tokio runtime.
    pub fn call(&self, arg: A) {
        let callback = Arc::clone(&self.callback);
        let wait = self.wait;
        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            callback(arg);
        }));
    }

    /// Drops the scheduled call, if any.
    pub fn cancel(&self) {
        if let Some(previous) = self.pending.lock().take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<A> std::fmt::Debug for Debounce<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounce").field("wait", &self.wait).finish_non_exhaustive()
    }
}

/// Runs the callback at most once per `limit`; calls inside the window are
/// dropped, not deferred.
pub struct Throttle<A> {
    limit: Duration,
    callback: Callback<A>,
    last_run: Mutex<Option<Instant>>,
}

impl<A> Throttle<A> {
    pub fn new(limit: Duration, callback: impl Fn(A) + Send + Sync + 'static) -> Self {
        Self {
            limit,
            callback: Arc::new(callback),
            last_run: Mutex::new(None),
        }
    }

    /// Returns whether the callback ran.
    pub fn call(&self, arg: A) -> bool {
        let now = Instant::now();
        {
            let mut last_run = self.last_run.lock();
            if last_run.is_some_and(|at| now.duration_since(at) < self.limit) {
                return false;
            }
            *last_run = Some(now);
        }
        (self.callback)(arg);
        true
    }
}

impl<A> std::fmt::Debug for Throttle<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").field("limit", &self.limit).finish_non_exhaustive()
    }
}

// src/poll.rs

use std::future::Future;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::ClientError;

/// Handle for a running poller.
///
/// `stop` clears the ticker. In-flight fetches are not cancelled; their
/// completions are discarded by the fencing guard instead of committing.
pub struct PollHandle {
    active: Arc<AtomicBool>,
    ticker: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.ticker.abort();
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Polls `fetch` on a fixed interval, passing each result to `commit`.
///
/// Every tick issues an independent request tagged with a generation token.
/// Overlapping in-flight requests are allowed, but a completion only
/// commits while its token is still the newest issued and the handle is
/// still active, so a slow response never overwrites a newer one and
/// nothing commits after teardown. A failed tick is logged and skipped;
/// there is no retry.
pub fn spawn_poller<F, Fut, T, C>(period: Duration, fetch: F, commit: C) -> PollHandle
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    T: Send + 'static,
    C: Fn(T) + Send + Sync + 'static,
{
    let active = Arc::new(AtomicBool::new(true));

    let ticker = tokio::spawn({
        let active = Arc::clone(&active);
        let latest = Arc::new(AtomicU64::new(0));
        let commit = Arc::new(commit);
        async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if !active.load(Ordering::SeqCst) {
                    break;
                }

                let token = latest.fetch_add(1, Ordering::SeqCst) + 1;
                let request = fetch();

                let active = Arc::clone(&active);
                let latest = Arc::clone(&latest);
                let commit = Arc::clone(&commit);
                tokio::spawn(async move {
                    match request.await {
                        Ok(value) => {
                            let newest = latest.load(Ordering::SeqCst) == token;
                            if active.load(Ordering::SeqCst) && newest {
                                (*commit)(value);
                            } else {
                                tracing::debug!("discarding stale poll response");
                            }
                        }
                        Err(e) => tracing::debug!("poll tick failed: {}", e),
                    }
                });
            }
        }
    });

    PollHandle { active, ticker }
}

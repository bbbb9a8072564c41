// ── Background polling ──
//
// Re-runs a refresh closure on a fixed interval until cancelled. Failures
// are logged and the loop keeps going; callers keep their last snapshot.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::CoreError;

/// Refresh interval for notifications and the activity feed.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// A running poll loop. Dropping it stops the loop.
pub struct Poller {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Call `refresh` every `period`, starting one period from now.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, refresh: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), CoreError>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(name, period, cancel.clone(), refresh));
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Cancel and wait for the loop to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        let Some(handle) = self.handle.take() else {
            return;
        };
        if let Err(e) = handle.await {
            warn!(error = %e, "poll task ended abnormally");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_task<F, Fut>(
    name: &'static str,
    period: Duration,
    cancel: CancellationToken,
    mut refresh: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), CoreError>>,
{
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = refresh().await {
                    warn!(poll = name, error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::Poller;
    use crate::error::CoreError;

    fn counting(fail: bool) -> (Arc<AtomicUsize>, Poller) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let poller = Poller::spawn("test", Duration::from_secs(300), move || {
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                if fail {
                    Err(CoreError::Internal("backend down".into()))
                } else {
                    Ok(())
                }
            }
        });
        (count, poller)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period_after_the_first() {
        let (count, _poller) = counting(false);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_stop_the_loop() {
        let (count, _poller) = counting(true);
        tokio::time::sleep(Duration::from_secs(901)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_waits_for_the_loop() {
        let (count, poller) = counting(false);
        tokio::time::sleep(Duration::from_secs(301)).await;
        poller.shutdown().await;
        tokio::time::sleep(Duration::from_secs(3000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_refresh_is_reported_on_shutdown() {
        let poller = Poller::spawn("test", Duration::from_secs(300), || async {
            let fetched: Result<(), CoreError> = Ok(());
            fetched?;
            panic!("refresh blew up");
        });
        tokio::time::sleep(Duration::from_secs(301)).await;
        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_poller_stops_it() {
        let (count, poller) = counting(false);
        tokio::time::sleep(Duration::from_secs(301)).await;
        drop(poller);
        tokio::time::sleep(Duration::from_secs(3000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

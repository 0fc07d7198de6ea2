// src/app/worker.rs
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use tracing::warn;

use super::cancel::CancelToken;
use super::error::FetchError;

/// Called from a worker thread after it posts a reply (e.g. to wake the UI).
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Worker → UI thread message for one request.
#[derive(Debug)]
pub struct Reply<T> {
    pub token: CancelToken,
    pub outcome: Result<T, FetchError>,
}

/// Posts exactly one reply per request. If the job never delivers (panic, or
/// the thread could not even start), `Drop` posts a failure instead so the
/// owning controller always leaves its loading state.
struct ReplyGuard<T> {
    token: CancelToken,
    tx: Sender<Reply<T>>,
    waker: Option<Waker>,
    sent: bool,
}

impl<T> ReplyGuard<T> {
    fn deliver(&mut self, outcome: Result<T, FetchError>) {
        self.sent = true;
        let _ = self.tx.send(Reply {
            token: self.token.clone(),
            outcome,
        });
        if let Some(w) = &self.waker {
            w();
        }
    }
}

impl<T> Drop for ReplyGuard<T> {
    fn drop(&mut self) {
        if !self.sent {
            self.deliver(Err(FetchError::Network("request worker aborted".into())));
        }
    }
}

/// Run `job` on a fresh thread unless `token` is already canceled.
pub fn spawn_request<T, F>(
    name: &str,
    token: CancelToken,
    tx: Sender<Reply<T>>,
    waker: Option<Waker>,
    job: F,
) where
    T: Send + 'static,
    F: FnOnce() -> Result<T, FetchError> + Send + 'static,
{
    let mut guard = ReplyGuard {
        token,
        tx,
        waker,
        sent: false,
    };
    let spawned = thread::Builder::new()
        .name(format!("popcorn-{name}"))
        .spawn(move || {
            let outcome = if guard.token.is_cancelled() {
                Err(FetchError::Canceled)
            } else {
                job()
            };
            guard.deliver(outcome);
        });
    if let Err(e) = spawned {
        // The closure (and its guard) was dropped, which already replied.
        warn!("failed to spawn {name} worker: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn delivers_job_outcome_and_wakes() {
        let (tx, rx) = mpsc::channel();
        let woke = Arc::new(AtomicUsize::new(0));
        let w = Arc::clone(&woke);
        let waker: Waker = Arc::new(move || {
            w.fetch_add(1, Ordering::SeqCst);
        });
        spawn_request("test", CancelToken::new(), tx, Some(waker), || Ok(5u32));
        let reply = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(reply.outcome, Ok(5));
        assert_eq!(woke.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pre_canceled_token_skips_the_job() {
        let (tx, rx) = mpsc::channel::<Reply<u32>>();
        let token = CancelToken::new();
        token.cancel();
        spawn_request("test", token, tx, None, || panic!("job must not run"));
        let reply = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(reply.outcome, Err(FetchError::Canceled));
    }

    #[test]
    fn panicking_job_still_replies() {
        let (tx, rx) = mpsc::channel::<Reply<u32>>();
        spawn_request("test", CancelToken::new(), tx, None, || panic!("boom"));
        let reply = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(reply.outcome, Err(FetchError::Network(_))));
    }
}

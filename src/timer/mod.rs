//! A single scheduled unit of work: one deadline race.
//!
//! Each timer sleeps until its deadline or until it receives a one-shot
//! cancel signal, whichever comes first, and runs its completion callback
//! exactly once in the deadline case. No retry, no re-fire.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::debug;

/// Cancellation side of one timer's one-shot signal.
///
/// Consuming the handle via [`CancelHandle::cancel`] requests early
/// termination. If the timer has already committed to firing, the signal is
/// discarded; the send never blocks and never panics.
#[derive(Debug)]
pub struct CancelHandle {
    tx: oneshot::Sender<()>,
}

impl CancelHandle {
    /// Request cancellation. First committer wins: a timer that already
    /// passed its deadline race still fires and this signal is dropped.
    pub fn cancel(self) {
        let _ = self.tx.send(());
    }
}

/// Start a timer: after `total` elapses with no cancel signal observed,
/// `on_fired` runs exactly once. A cancel signal arriving first terminates
/// the timer with no callback.
///
/// Dropping the returned handle is NOT a cancellation. The registry prunes
/// settled entries lazily and may drop an entry's handle in the instant
/// between the deadline elapsing and the firing task removing itself; that
/// drop must not suppress the pending notification, so the task keeps
/// waiting out its deadline when the sender disappears without an explicit
/// signal.
pub fn start<F, Fut>(total: Duration, on_fired: F) -> CancelHandle
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(total) => {
                on_fired().await;
            }
            _ = cancel_requested(rx) => {
                debug!(total_secs = total.as_secs(), "timer cancelled");
            }
        }
    });

    CancelHandle { tx }
}

/// Resolves only on an explicit cancel signal. A dropped sender parks
/// forever so the deadline branch decides.
async fn cancel_requested(rx: oneshot::Receiver<()>) {
    if rx.await.is_err() {
        std::future::pending::<()>().await;
    }
}

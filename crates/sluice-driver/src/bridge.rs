//! Bridges the runtime's listener callbacks into an awaitable future.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use sluice_core::runtime::{PlanListener, PlanOutcome, SubmittedPlan};
use sluice_core::types::Statistics;

use crate::error::ExecError;

type Resolution = Result<Statistics, ExecError>;

/// Converts a submitted plan's callback-style completion notification into
/// a single-resolution future.
pub struct CompletionBridge;

impl CompletionBridge {
    /// Attach a listener to the handle, start it, and return the future of
    /// its statistics.
    ///
    /// Exactly one resolution occurs per submission: the listener's sender
    /// is taken on the first notification, so a second fire from the
    /// native mechanism is discarded.
    pub fn start(handle: Arc<dyn SubmittedPlan>) -> StatsFuture {
        let (tx, rx) = oneshot::channel();

        let listener = BridgeListener {
            slot: Mutex::new(Some(tx)),
            handle: Arc::clone(&handle),
        };
        handle.attach_listener(Arc::new(listener));
        handle.start();

        StatsFuture {
            inner: Inner::Waiting(rx),
        }
    }
}

struct BridgeListener {
    slot: Mutex<Option<oneshot::Sender<Resolution>>>,
    handle: Arc<dyn SubmittedPlan>,
}

impl PlanListener for BridgeListener {
    fn on_outcome(&self, outcome: PlanOutcome) {
        // first notification wins; afterwards the listener is inert
        let Some(tx) = self.slot.lock().take() else {
            return;
        };

        let resolution = match outcome {
            PlanOutcome::Completed => Ok(self.handle.statistics()),
            PlanOutcome::Failed(cause) => Err(ExecError::Runtime(cause)),
            PlanOutcome::Stopped => Err(ExecError::JobStopped),
        };
        // the receiver may have been dropped; nothing to do then
        let _ = tx.send(resolution);
    }
}

enum Inner {
    /// Resolution already known (compile failures, tests).
    Ready(Option<Resolution>),
    /// Waiting on the bridge listener.
    Waiting(oneshot::Receiver<Resolution>),
}

/// Future of a submitted plan's statistics.
///
/// Resolves with [`Statistics`] on success, or the failure the runtime
/// reported; a stopped job resolves with [`ExecError::JobStopped`].
pub struct StatsFuture {
    inner: Inner,
}

impl StatsFuture {
    /// An already-failed future, used when compilation fails before
    /// anything was submitted.
    pub fn failed(error: ExecError) -> Self {
        Self {
            inner: Inner::Ready(Some(Err(error))),
        }
    }

    /// An already-resolved future.
    pub fn ready(resolution: Resolution) -> Self {
        Self {
            inner: Inner::Ready(Some(resolution)),
        }
    }

    /// Block the calling thread until resolution.
    ///
    /// Must not be called from an async executor thread; async callers
    /// simply `.await` the future.
    pub fn blocking_wait(self) -> Resolution {
        match self.inner {
            Inner::Ready(Some(resolution)) => resolution,
            Inner::Ready(None) => Err(ExecError::Aborted(
                "statistics future already consumed".to_string(),
            )),
            Inner::Waiting(rx) => rx.blocking_recv().unwrap_or_else(|_| {
                Err(ExecError::Aborted(
                    "runtime dropped the completion channel".to_string(),
                ))
            }),
        }
    }
}

impl Future for StatsFuture {
    type Output = Resolution;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.inner {
            Inner::Ready(resolution) => match resolution.take() {
                Some(resolution) => Poll::Ready(resolution),
                None => panic!("StatsFuture polled after completion"),
            },
            Inner::Waiting(rx) => Pin::new(rx).poll(cx).map(|received| {
                received.unwrap_or_else(|_| {
                    Err(ExecError::Aborted(
                        "runtime dropped the completion channel".to_string(),
                    ))
                })
            }),
        }
    }
}

//! Submitted-plan handle: lifecycle state, listeners, blocking wait.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

use sluice_core::error::RuntimeError;
use sluice_core::runtime::{PlanListener, PlanOutcome, SubmittedPlan};
use sluice_core::types::{Config, PlanGraph, Statistics};

use crate::executor::execute_graph;

enum Phase {
    /// Accepted, not yet started; holds the graph the worker will consume.
    Idle(Box<PlanGraph>),
    Running,
    Done(PlanOutcome),
}

struct Inner {
    phase: Phase,
    listeners: Vec<Arc<dyn PlanListener>>,
    stats: Statistics,
}

struct Shared {
    inner: Mutex<Inner>,
    done: Condvar,
}

/// A plan the local runtime has accepted.
///
/// Execution happens on a dedicated worker thread; listeners fire from
/// that thread exactly once when the plan reaches a terminal state.
pub struct LocalSubmittedPlan {
    shared: Arc<Shared>,
    config: Config,
    worker_name: String,
    stop: Arc<AtomicBool>,
}

impl LocalSubmittedPlan {
    pub(crate) fn new(graph: PlanGraph, config: Config, worker_name: String) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    phase: Phase::Idle(Box::new(graph)),
                    listeners: Vec::new(),
                    stats: Statistics::default(),
                }),
                done: Condvar::new(),
            }),
            config,
            worker_name,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cooperative cancellation.
    ///
    /// The worker checks the flag between stages; a run stopped before
    /// completion reports [`PlanOutcome::Stopped`]. Stopping an already
    /// terminal plan has no effect.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl SubmittedPlan for LocalSubmittedPlan {
    fn start(&self) {
        let graph = {
            let mut inner = self.shared.inner.lock();
            match std::mem::replace(&mut inner.phase, Phase::Running) {
                Phase::Idle(graph) => graph,
                other => {
                    // already running or done
                    inner.phase = other;
                    return;
                }
            }
        };

        let shared = Arc::clone(&self.shared);
        let stop = Arc::clone(&self.stop);
        let config = self.config.clone();

        let spawned = std::thread::Builder::new()
            .name(self.worker_name.clone())
            .spawn(move || {
                let (outcome, stats) = execute_graph(*graph, &config, &stop);
                finish(&shared, outcome, stats);
            });

        if let Err(e) = spawned {
            finish(
                &self.shared,
                PlanOutcome::Failed(RuntimeError::State(format!("worker spawn failed: {e}"))),
                Statistics::default(),
            );
        }
    }

    fn attach_listener(&self, listener: Arc<dyn PlanListener>) {
        let terminal = {
            let mut inner = self.shared.inner.lock();
            match &inner.phase {
                Phase::Done(outcome) => Some(outcome.clone()),
                _ => {
                    inner.listeners.push(listener.clone());
                    None
                }
            }
        };
        // fire outside the lock
        if let Some(outcome) = terminal {
            listener.on_outcome(outcome);
        }
    }

    fn block_until_complete(&self) -> PlanOutcome {
        self.start();
        let mut inner = self.shared.inner.lock();
        loop {
            if let Phase::Done(outcome) = &inner.phase {
                return outcome.clone();
            }
            self.shared.done.wait(&mut inner);
        }
    }

    fn statistics(&self) -> Statistics {
        self.shared.inner.lock().stats.clone()
    }
}

fn finish(shared: &Shared, outcome: PlanOutcome, stats: Statistics) {
    let listeners = {
        let mut inner = shared.inner.lock();
        inner.stats = stats;
        inner.phase = Phase::Done(outcome.clone());
        std::mem::take(&mut inner.listeners)
    };
    shared.done.notify_all();
    for listener in listeners {
        listener.on_outcome(outcome.clone());
    }
}

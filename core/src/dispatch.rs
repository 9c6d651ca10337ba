//! Serial delivery context for response callbacks.
//!
//! Every callback an executor produces is posted here and run, in posting
//! order, by a single task. Observers therefore never run concurrently with
//! each other, whichever worker produced the result.

use tokio::runtime::Handle;
use tokio::sync::mpsc;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A FIFO queue of callbacks drained by one task on the given runtime.
#[derive(Debug, Clone)]
pub struct CallbackDispatcher {
    jobs: mpsc::UnboundedSender<Job>,
}

impl CallbackDispatcher {
    /// Spawn the delivery task on `runtime`. The task ends once every clone
    /// of the dispatcher has been dropped and the queue is drained.
    pub fn spawn(runtime: &Handle) -> Self {
        let (jobs, mut queue) = mpsc::unbounded_channel::<Job>();
        runtime.spawn(async move {
            while let Some(job) = queue.recv().await {
                job();
            }
            tracing::trace!("callback dispatcher drained");
        });
        Self { jobs }
    }

    /// Queue `job` for delivery. Returns `false` if the delivery task is gone
    /// (its runtime shut down), in which case the job is dropped unrun.
    pub fn post(&self, job: impl FnOnce() + Send + 'static) -> bool {
        if self.jobs.send(Box::new(job)).is_err() {
            tracing::warn!("callback dispatcher is closed; dropping callback");
            return false;
        }
        true
    }
}

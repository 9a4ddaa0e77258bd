/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! The bounded-concurrency execution engine behind message consumption.
//!
//! A fixed set of long-lived worker loops pulls erased units of work from one
//! shared FIFO queue. The queue caps concurrent execution at the worker
//! count; a bounded queue additionally pushes back on submitters by
//! suspending `submit` until space frees. With a single worker the executor
//! degenerates into strict sequential execution in submission order, which is
//! what serializes consumption for a stream that must never overlap itself.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex as StdMutex};

use anyhow::anyhow;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{instrument, trace};

use crate::common::{WorkFuture, CONFIG};
use crate::dispatch::completion::{CompletionSlot, ResultHandle, WorkOutcome};
use crate::dispatch::dispatch_error::DispatchError;

/// An erased unit of work: invoking it yields the future that runs the body
/// and records the outcome. Dropping it uninvoked records a cancellation.
type QueuedUnit = Box<dyn FnOnce() -> WorkFuture + Send>;

#[derive(Clone)]
enum WorkSender {
    Bounded(mpsc::Sender<QueuedUnit>),
    Unbounded(mpsc::UnboundedSender<QueuedUnit>),
}

enum WorkReceiver {
    Bounded(mpsc::Receiver<QueuedUnit>),
    Unbounded(mpsc::UnboundedReceiver<QueuedUnit>),
}

impl WorkReceiver {
    async fn recv(&mut self) -> Option<QueuedUnit> {
        match self {
            WorkReceiver::Bounded(receiver) => receiver.recv().await,
            WorkReceiver::Unbounded(receiver) => receiver.recv().await,
        }
    }
}

/// Executes submitted units of work on a fixed-size worker pool.
///
/// Submitted closures produce futures resolving to `anyhow::Result<T>`; the
/// outcome of each unit lands in a single-assignment slot behind the
/// returned [`ResultHandle`]. A failing or panicking body is contained to
/// its own unit and never unseats a worker.
pub struct DispatchExecutor {
    queue: StdMutex<Option<WorkSender>>,
    tracker: TaskTracker,
    concurrency_limit: usize,
}

impl DispatchExecutor {
    /// Creates an executor whose queue holds at most `queue_capacity`
    /// pending units; a full queue suspends submitters.
    ///
    /// # Panics
    ///
    /// Panics if `concurrency_limit` or `queue_capacity` is zero.
    pub fn bounded(concurrency_limit: usize, queue_capacity: usize) -> Self {
        assert!(concurrency_limit >= 1, "concurrency_limit must be at least 1");
        assert!(queue_capacity >= 1, "queue_capacity must be at least 1");
        let (sender, receiver) = mpsc::channel(queue_capacity);
        Self::start(
            WorkSender::Bounded(sender),
            WorkReceiver::Bounded(receiver),
            concurrency_limit,
        )
    }

    /// Creates an executor whose queue never pushes back on submitters.
    ///
    /// # Panics
    ///
    /// Panics if `concurrency_limit` is zero.
    pub fn unbounded(concurrency_limit: usize) -> Self {
        assert!(concurrency_limit >= 1, "concurrency_limit must be at least 1");
        let (sender, receiver) = mpsc::unbounded_channel();
        Self::start(
            WorkSender::Unbounded(sender),
            WorkReceiver::Unbounded(receiver),
            concurrency_limit,
        )
    }

    fn start(sender: WorkSender, receiver: WorkReceiver, concurrency_limit: usize) -> Self {
        let tracker = TaskTracker::new();
        let receiver = Arc::new(Mutex::new(receiver));
        for worker in 0..concurrency_limit {
            tracker.spawn(run_worker(worker, Arc::clone(&receiver)));
        }
        // All workers are spawned; the tracker only waits for them now.
        tracker.close();
        Self {
            queue: StdMutex::new(Some(sender)),
            tracker,
            concurrency_limit,
        }
    }

    /// Number of worker loops executing concurrently.
    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Queues a unit of work and returns the handle to its outcome.
    ///
    /// On a bounded executor this call suspends while the queue is at
    /// capacity, until space frees or `cancel` fires. A token already
    /// cancelled at submission finalizes the unit as cancelled without the
    /// body ever being invoked.
    pub async fn submit<F, Fut, T>(
        &self,
        work: F,
        cancel: CancellationToken,
    ) -> Result<ResultHandle<T>, DispatchError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self
            .queue
            .lock()
            .expect("executor queue lock poisoned")
            .clone()
            .ok_or(DispatchError::Closed)?;

        let slot = CompletionSlot::new();
        let handle = ResultHandle::new(Arc::clone(&slot));

        if cancel.is_cancelled() {
            trace!("token already cancelled at submission, skipping enqueue");
            slot.fulfill(WorkOutcome::Cancelled);
            return Ok(handle);
        }

        let unit = queued_unit(work, cancel.clone(), slot);
        match sender {
            WorkSender::Bounded(sender) => {
                tokio::select! {
                    sent = sender.send(unit) => {
                        if sent.is_err() {
                            return Err(DispatchError::Closed);
                        }
                    }
                    _ = cancel.cancelled() => {
                        trace!("submission cancelled while waiting for queue capacity");
                        return Err(DispatchError::Cancelled);
                    }
                }
            }
            WorkSender::Unbounded(sender) => {
                if sender.send(unit).is_err() {
                    return Err(DispatchError::Closed);
                }
            }
        }
        Ok(handle)
    }

    /// Submits a unit of work and waits for its outcome.
    pub async fn run<F, Fut, T>(
        &self,
        work: F,
        cancel: CancellationToken,
    ) -> Result<T, DispatchError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.submit(work, cancel).await?.join().await
    }

    /// Stops accepting new submissions, lets the queue drain naturally, and
    /// waits for every worker loop to exit.
    ///
    /// Completes only once every queued and in-flight unit has reached its
    /// terminal state. `cancel` aborts the wait, not the drain: workers keep
    /// draining in the background. Meaningful at most once; later calls
    /// return [`DispatchError::Closed`].
    #[instrument(skip(self, cancel))]
    pub async fn shutdown(&self, cancel: CancellationToken) -> Result<(), DispatchError> {
        let sender = self
            .queue
            .lock()
            .expect("executor queue lock poisoned")
            .take();
        if sender.is_none() {
            return Err(DispatchError::Closed);
        }
        // Dropping the last sender closes the queue once in-flight
        // submissions release their clones.
        drop(sender);

        tokio::select! {
            _ = self.tracker.wait() => {
                trace!("all workers exited");
                Ok(())
            }
            _ = cancel.cancelled() => {
                trace!("shutdown wait cancelled before drain finished");
                Err(DispatchError::Cancelled)
            }
        }
    }

    /// [`shutdown`](Self::shutdown) bounded by the configured timeout.
    pub async fn shutdown_graceful(&self) -> Result<(), DispatchError> {
        match tokio::time::timeout(
            CONFIG.shutdown_timeout(),
            self.shutdown(CancellationToken::new()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Cancelled),
        }
    }
}

impl Default for DispatchExecutor {
    fn default() -> Self {
        Self::bounded(
            CONFIG.limits.default_concurrency_limit,
            CONFIG.limits.default_queue_capacity,
        )
    }
}

impl std::fmt::Debug for DispatchExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("DispatchExecutor")
            .field("concurrency_limit", &self.concurrency_limit)
            .finish()
    }
}

/// Records a cancelled outcome if the unit never got to record one itself,
/// whether dropped uninvoked with the queue or torn down mid-flight. A no-op
/// once any outcome is in place, so a completed unit is never flipped.
struct SlotGuard<T> {
    slot: Arc<CompletionSlot<T>>,
}

impl<T> Drop for SlotGuard<T> {
    fn drop(&mut self) {
        self.slot.fulfill(WorkOutcome::Cancelled);
    }
}

fn queued_unit<F, Fut, T>(
    body: F,
    cancel: CancellationToken,
    slot: Arc<CompletionSlot<T>>,
) -> QueuedUnit
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let guard = SlotGuard {
        slot: Arc::clone(&slot),
    };
    Box::new(move || -> WorkFuture {
        Box::pin(async move {
            let _guard = guard;
            if cancel.is_cancelled() {
                trace!("unit cancelled before start, body skipped");
                slot.fulfill(WorkOutcome::Cancelled);
                return;
            }
            match AssertUnwindSafe(body()).catch_unwind().await {
                Ok(Ok(value)) => slot.fulfill(WorkOutcome::Completed(value)),
                Ok(Err(error)) => slot.fulfill(WorkOutcome::Faulted(error)),
                Err(panic) => slot.fulfill(WorkOutcome::Faulted(anyhow!(
                    "work unit panicked: {}",
                    panic_message(panic.as_ref())
                ))),
            }
        })
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "opaque panic payload"
    }
}

#[instrument(skip(receiver))]
async fn run_worker(worker: usize, receiver: Arc<Mutex<WorkReceiver>>) {
    loop {
        // Hold the queue lock only across the dequeue so the other workers
        // pull while this unit runs.
        let unit = {
            let mut queue = receiver.lock().await;
            queue.recv().await
        };
        match unit {
            Some(unit) => {
                trace!(worker, "unit dequeued");
                unit().await;
            }
            None => {
                trace!(worker, "queue drained and closed, worker exiting");
                break;
            }
        }
    }
}

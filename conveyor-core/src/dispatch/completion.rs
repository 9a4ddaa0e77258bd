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

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::dispatch::dispatch_error::DispatchError;

/// Terminal state of one unit of work. Exactly one is ever recorded.
#[derive(Debug)]
pub(crate) enum WorkOutcome<T> {
    /// The body ran to completion.
    Completed(T),
    /// The body returned an error or panicked.
    Faulted(anyhow::Error),
    /// The unit was cancelled before or instead of running.
    Cancelled,
}

/// Single-assignment result slot shared between a submitter and the worker
/// that fulfills it.
///
/// The first fulfillment wins; anything later is a no-op, which keeps a
/// double-fulfillment from ever flipping an observed outcome. Completion is
/// published through a level-triggered token, so any number of waiters can
/// observe finality even after the fact.
pub(crate) struct CompletionSlot<T> {
    outcome: Mutex<Option<WorkOutcome<T>>>,
    done: CancellationToken,
}

impl<T> CompletionSlot<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(None),
            done: CancellationToken::new(),
        })
    }

    /// Records the outcome. No-op if one is already in place.
    pub(crate) fn fulfill(&self, outcome: WorkOutcome<T>) {
        {
            let mut slot = self
                .outcome
                .lock()
                .expect("completion slot lock poisoned");
            if slot.is_some() {
                return;
            }
            *slot = Some(outcome);
        }
        // Signalled strictly after the outcome is in place.
        self.done.cancel();
    }

    fn take(&self) -> Option<WorkOutcome<T>> {
        self.outcome
            .lock()
            .expect("completion slot lock poisoned")
            .take()
    }
}

/// Awaitable handle to one submitted unit of work.
pub struct ResultHandle<T> {
    slot: Arc<CompletionSlot<T>>,
}

impl<T> ResultHandle<T> {
    pub(crate) fn new(slot: Arc<CompletionSlot<T>>) -> Self {
        Self { slot }
    }

    /// Waits for the unit to reach its terminal state and returns it.
    pub async fn join(self) -> Result<T, DispatchError> {
        self.slot.done.cancelled().await;
        match self.slot.take() {
            Some(WorkOutcome::Completed(value)) => Ok(value),
            Some(WorkOutcome::Faulted(error)) => Err(DispatchError::Failed(error)),
            Some(WorkOutcome::Cancelled) | None => Err(DispatchError::Cancelled),
        }
    }

    /// A completion signal any number of waiters may hold and await; it
    /// fires once the unit's outcome is final and stays fired.
    pub fn completion(&self) -> CancellationToken {
        self.slot.done.clone()
    }

    /// True once the unit's outcome is final.
    pub fn is_finished(&self) -> bool {
        self.slot.done.is_cancelled()
    }
}

impl<T> std::fmt::Debug for ResultHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ResultHandle")
            .field("finished", &self.is_finished())
            .finish()
    }
}

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
use std::collections::BTreeSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{instrument, trace};

use crate::saga::correlation::{CorrelationId, Saga};
use crate::saga::store::{LockedSaga, SagaStore};

/// Acquires ordered locks over saga instances ahead of consumption.
///
/// The manager owns only the acquisition-order policy; loading and locking a
/// single instance is delegated to the injected [`SagaStore`].
pub struct SagaLockManager<S: Saga> {
    store: Arc<dyn SagaStore<S>>,
}

impl<S: Saga> SagaLockManager<S> {
    /// Creates a manager over the given store.
    pub fn new(store: Arc<dyn SagaStore<S>>) -> Self {
        Self { store }
    }

    /// Loads and locks every existing instance for `ids`.
    ///
    /// Ids are deduplicated and acquired in ascending order. Every caller
    /// walks the same total order, which is the sole mechanism preventing
    /// circular waits between operations that need overlapping id sets. Ids
    /// with no persisted instance are simply omitted from the batch.
    ///
    /// A store failure on any id fails the whole batch; leases already
    /// acquired are released as the partial batch unwinds.
    #[instrument(skip(self, ids, cancel), fields(requested = ids.len()))]
    pub async fn load(
        &self,
        ids: &[CorrelationId],
        cancel: CancellationToken,
    ) -> anyhow::Result<SagaBatch<S>> {
        let ordered: BTreeSet<CorrelationId> = ids.iter().copied().collect();
        let mut sagas = Vec::with_capacity(ordered.len());
        for correlation_id in ordered {
            match self.store.load_one(correlation_id, cancel.clone()).await? {
                Some(locked) => {
                    trace!(correlation_id = %correlation_id, "instance loaded and locked");
                    sagas.push(locked);
                }
                None => {
                    trace!(correlation_id = %correlation_id, "no instance for correlation id");
                }
            }
        }
        Ok(SagaBatch { sagas })
    }
}

impl<S: Saga> std::fmt::Debug for SagaLockManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("SagaLockManager")
    }
}

/// The locked instances backing one consumption scope.
///
/// Dropping the batch releases every lease; the success and failure paths
/// alike end with the locks gone.
pub struct SagaBatch<S> {
    sagas: Vec<LockedSaga<S>>,
}

impl<S> SagaBatch<S> {
    /// Number of instances in the batch.
    pub fn len(&self) -> usize {
        self.sagas.len()
    }

    /// True if no requested id had a persisted instance.
    pub fn is_empty(&self) -> bool {
        self.sagas.is_empty()
    }

    /// The locked instances, in acquisition order.
    pub fn sagas(&self) -> &[LockedSaga<S>] {
        &self.sagas
    }

    /// The locked instances, mutably.
    pub fn sagas_mut(&mut self) -> &mut [LockedSaga<S>] {
        &mut self.sagas
    }

    /// Consumes the batch, handing ownership of each lock to the caller.
    pub fn into_sagas(self) -> Vec<LockedSaga<S>> {
        self.sagas
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for SagaBatch<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SagaBatch").field("sagas", &self.sagas).finish()
    }
}

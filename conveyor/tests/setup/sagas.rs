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

//! Saga fixtures: an in-memory store whose per-instance locks ride in the
//! lock leases, so lock lifetime is exactly batch lifetime.

use std::sync::{Arc, Mutex};

use anyhow::bail;
use dashmap::DashMap;
use tokio::sync::Mutex as AsyncMutex;

use conveyor::prelude::*;

/// Saga instance used across the lock tests.
#[derive(Debug, Clone)]
pub struct OrderState {
    pub correlation_id: CorrelationId,
    pub events_seen: u64,
}

impl OrderState {
    pub fn new(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            events_seen: 0,
        }
    }
}

impl Saga for OrderState {
    fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }
}

/// In-memory store keeping each instance behind its own async mutex. The
/// owned guard is handed to the caller inside the lease, so the instance
/// stays locked until the enclosing batch drops.
#[derive(Default)]
pub struct InMemorySagaStore {
    instances: DashMap<CorrelationId, Arc<AsyncMutex<OrderState>>>,
    acquisitions: Mutex<Vec<CorrelationId>>,
}

impl InMemorySagaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, state: OrderState) {
        self.instances
            .insert(state.correlation_id(), Arc::new(AsyncMutex::new(state)));
    }

    /// Every acquisition the store performed, in order.
    pub fn acquisitions(&self) -> Vec<CorrelationId> {
        self.acquisitions.lock().unwrap().clone()
    }

    pub fn clear_acquisitions(&self) {
        self.acquisitions.lock().unwrap().clear();
    }
}

#[async_trait]
impl SagaStore<OrderState> for InMemorySagaStore {
    async fn load_one(
        &self,
        correlation_id: CorrelationId,
        cancel: CancellationToken,
    ) -> anyhow::Result<Option<LockedSaga<OrderState>>> {
        let Some(cell) = self
            .instances
            .get(&correlation_id)
            .map(|entry| entry.value().clone())
        else {
            return Ok(None);
        };
        let guard = tokio::select! {
            guard = cell.clone().lock_owned() => guard,
            _ = cancel.cancelled() => bail!("lock acquisition cancelled for {correlation_id}"),
        };
        self.acquisitions.lock().unwrap().push(correlation_id);
        let instance = (*guard).clone();
        Ok(Some(LockedSaga::new(instance, LockLease::new(guard))))
    }
}

/// Store that fails on one id, for exercising whole-batch failure.
pub struct FlakySagaStore {
    pub inner: InMemorySagaStore,
    pub fail_on: CorrelationId,
}

#[async_trait]
impl SagaStore<OrderState> for FlakySagaStore {
    async fn load_one(
        &self,
        correlation_id: CorrelationId,
        cancel: CancellationToken,
    ) -> anyhow::Result<Option<LockedSaga<OrderState>>> {
        if correlation_id == self.fail_on {
            bail!("storage fault loading {correlation_id}");
        }
        self.inner.load_one(correlation_id, cancel).await
    }
}

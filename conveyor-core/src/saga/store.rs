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
use std::any::Any;
use std::fmt;

use async_trait::async_trait;
use derive_new::new;
use tokio_util::sync::CancellationToken;

use crate::saga::correlation::{CorrelationId, Saga};

/// Opaque token for one acquired instance lock.
///
/// The store puts whatever keeps its lock alive in here, such as a guard or
/// a transaction handle, and the lock is released when the lease drops. The
/// mutual-exclusion mechanics belong entirely to the store.
pub struct LockLease {
    _token: Box<dyn Any + Send>,
}

impl LockLease {
    /// Wraps the store's lock token.
    pub fn new(token: impl Any + Send) -> Self {
        Self {
            _token: Box::new(token),
        }
    }

    /// For stores whose locking is implicit in a surrounding scope.
    pub fn untracked() -> Self {
        Self {
            _token: Box::new(()),
        }
    }
}

impl fmt::Debug for LockLease {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("LockLease")
    }
}

/// A saga instance together with the lease holding its lock.
#[derive(new)]
pub struct LockedSaga<S> {
    instance: S,
    lease: LockLease,
}

impl<S> LockedSaga<S> {
    /// The locked instance.
    pub fn instance(&self) -> &S {
        &self.instance
    }

    /// The locked instance, mutably.
    pub fn instance_mut(&mut self) -> &mut S {
        &mut self.instance
    }

    /// Consumes the lock, releasing the lease immediately.
    pub fn into_instance(self) -> S {
        let Self { instance, lease } = self;
        drop(lease);
        instance
    }
}

impl<S: fmt::Debug> fmt::Debug for LockedSaga<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LockedSaga")
            .field("instance", &self.instance)
            .finish()
    }
}

/// The load-and-lock-one capability a persistence layer supplies.
///
/// Implementations own row or version locking entirely; callers only rely on
/// the returned [`LockedSaga`] keeping the instance locked until its lease
/// drops.
#[async_trait]
pub trait SagaStore<S: Saga>: Send + Sync {
    /// Loads and locks the instance for `correlation_id`.
    ///
    /// An id with no persisted instance is `Ok(None)`, not an error; the
    /// caller decides whether absence means "create new" or "fail".
    async fn load_one(
        &self,
        correlation_id: CorrelationId,
        cancel: CancellationToken,
    ) -> anyhow::Result<Option<LockedSaga<S>>>;
}

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
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one long-running process instance.
///
/// `Ord` follows the uuid's byte order. That ordering is load-bearing: it is
/// the single total order every lock acquisition walks, which is what keeps
/// overlapping batches from ever waiting on each other in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// A fresh random correlation id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing uuid.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// The underlying uuid.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for CorrelationId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A long-lived process instance consumed across multiple messages, keyed by
/// its correlation id.
pub trait Saga: Send + Sync + 'static {
    /// The correlation id this instance is keyed by.
    fn correlation_id(&self) -> CorrelationId;
}

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

#![forbid(unsafe_code)]
//! Conveyor Core Library
//!
//! This library provides the core functionality for the Conveyor message bus:
//! the wire identity of message types (type URNs), polymorphic resolution of
//! inbound envelopes, a bounded-concurrency dispatch executor, and ordered
//! locking over saga instances.

/// Common utilities and structures used throughout the Conveyor framework.
pub(crate) mod common;

pub(crate) mod dispatch;
pub(crate) mod message;
pub(crate) mod saga;
/// Trait definitions used in the Conveyor framework.
pub(crate) mod traits;

/// Prelude module for convenient imports.
///
/// This module re-exports commonly used items from the `message`, `dispatch`,
/// `saga`, and `traits` modules, as well as the `async_trait` macro and the
/// cancellation token type used across the public surface.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use tokio_util::sync::CancellationToken;

    pub use crate::common::{ConveyorConfig, HeaderMap, CONFIG};
    pub use crate::dispatch::{DispatchError, DispatchExecutor, ResultHandle};
    pub use crate::message::{
        encode_urn, parse_urn, resolve_most_derived, DecodeError, EncodeError, EnvelopeError,
        FormatError, InboundEnvelope, MessageType, MessageTypeRegistry, RegistryError,
        ResolveError, TypeArgument, TypeIdentity, TypeKind, TypeRecipe,
    };
    pub use crate::saga::{
        CorrelationId, LockLease, LockedSaga, Saga, SagaBatch, SagaLockManager, SagaStore,
    };
    pub use crate::traits::{BusMessage, MessageIdentity};
}

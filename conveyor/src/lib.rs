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
#![forbid(missing_docs)] // Keep this to enforce coverage

//! # Conveyor
//!
//! This crate provides the message identity and dispatch reliability core of
//! the Conveyor message bus, built on top of Tokio. It moves typed messages
//! between producers and consumers with a reversible wire identity for every
//! message type, backpressured consumption, and saga-based long-running
//! process state.
//!
//! ## Key Concepts
//!
//! - **Type URNs**: Every message type has a canonical, reversible string
//!   identity (`urn:message:...`) carried on the wire, encoded from and
//!   decoded back to registered runtime types.
//! - **Registry (`MessageTypeRegistry`)**: The explicit, injectable map
//!   between runtime types and their URNs; closed generic types are rebuilt
//!   from registered closings rather than runtime code generation.
//! - **Resolution**: An inbound envelope names several candidate types; the
//!   resolver picks the single most-derived one, refusing inconsistent
//!   candidate sets rather than routing a message to the wrong shape.
//! - **Dispatch (`DispatchExecutor`)**: A fixed worker pool with bounded or
//!   unbounded queueing, cooperative backpressure, safe cancellation, and
//!   per-unit failure isolation.
//! - **Sagas (`SagaLockManager`)**: Ordered lock acquisition over correlation
//!   ids, delegating the locking mechanics to an injected store.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use conveyor::prelude::*;
//!
//! #[derive(Clone, Debug, Default)]
//! struct OrderSubmitted {
//!     order_id: u64,
//! }
//!
//! impl MessageIdentity for OrderSubmitted {
//!     fn identity() -> TypeIdentity {
//!         TypeIdentity::new("Contracts.Orders", "OrderSubmitted")
//!     }
//! }
//!
//! let registry = MessageTypeRegistry::new();
//! registry.register::<OrderSubmitted>()?;
//! let urn = registry.urn_for::<OrderSubmitted>()?;
//! ```

/// A prelude module for conveniently importing the most commonly used items.
///
/// This module re-exports the public surface of `conveyor-core`: the type
/// URN codec and registry, the envelope boundary, the dispatch executor, the
/// saga locking types, and the `async_trait` and `CancellationToken`
/// dependencies they lean on.
pub mod prelude {
    pub use conveyor_core::prelude::*;
}

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

//! The message type universe shared across the integration tests.

use conveyor::prelude::*;

// ----- Contracts -----

/// Contract implemented by every order event.
#[derive(Clone, Debug, Default)]
pub struct OrderEvent;

impl MessageIdentity for OrderEvent {
    fn identity() -> TypeIdentity {
        TypeIdentity::new("Contracts.Orders", "OrderEvent")
    }
}

/// Contract for events that feed the audit trail.
#[derive(Clone, Debug, Default)]
pub struct AuditedEvent;

impl MessageIdentity for AuditedEvent {
    fn identity() -> TypeIdentity {
        TypeIdentity::new("Contracts.Audit", "AuditedEvent")
    }
}

/// Contract refining [`OrderEvent`] for terminal order states.
#[derive(Clone, Debug, Default)]
pub struct OrderCompletedEvent;

impl MessageIdentity for OrderCompletedEvent {
    fn identity() -> TypeIdentity {
        TypeIdentity::new("Contracts.Orders", "OrderCompletedEvent")
    }

    fn implements() -> Vec<TypeIdentity> {
        vec![OrderEvent::identity()]
    }
}

// ----- Concrete messages -----

#[derive(Clone, Debug, Default)]
pub struct OrderSubmitted {
    pub order_id: u64,
}

impl MessageIdentity for OrderSubmitted {
    fn identity() -> TypeIdentity {
        TypeIdentity::new("Contracts.Orders", "OrderSubmitted")
    }

    fn implements() -> Vec<TypeIdentity> {
        vec![OrderEvent::identity()]
    }
}

/// Reaches both contracts, making it the most derived candidate wherever it
/// appears.
#[derive(Clone, Debug, Default)]
pub struct OrderArchived {
    pub order_id: u64,
}

impl MessageIdentity for OrderArchived {
    fn identity() -> TypeIdentity {
        TypeIdentity::new("Contracts.Orders", "OrderArchived")
    }

    fn implements() -> Vec<TypeIdentity> {
        vec![OrderEvent::identity(), AuditedEvent::identity()]
    }
}

#[derive(Clone, Debug, Default)]
pub struct OrderRefunded;

impl MessageIdentity for OrderRefunded {
    fn identity() -> TypeIdentity {
        TypeIdentity::new("Contracts.Orders", "OrderRefunded")
    }

    fn implements() -> Vec<TypeIdentity> {
        vec![OrderEvent::identity()]
    }
}

/// Same contract count as [`OrderRefunded`]; the pair exercises the
/// deterministic tie-break.
#[derive(Clone, Debug, Default)]
pub struct OrderReturned;

impl MessageIdentity for OrderReturned {
    fn identity() -> TypeIdentity {
        TypeIdentity::new("Contracts.Orders", "OrderReturned")
    }

    fn implements() -> Vec<TypeIdentity> {
        vec![OrderEvent::identity()]
    }
}

// ----- Nested and generic fixtures -----

/// A type nested one level deep: `Ledger+Snapshot` on the wire.
#[derive(Clone, Debug, Default)]
pub struct Snapshot;

impl MessageIdentity for Snapshot {
    fn identity() -> TypeIdentity {
        TypeIdentity::nested("Contracts.Ledger", &["Ledger", "Snapshot"])
    }
}

/// A nested generic message; its identity composes the identities of its
/// arguments.
#[derive(Clone, Debug, Default)]
pub struct Paired<A, B>(pub A, pub B);

impl<A, B> MessageIdentity for Paired<A, B>
where
    A: MessageIdentity,
    B: MessageIdentity,
{
    fn identity() -> TypeIdentity {
        TypeIdentity::nested("Contracts.Ledger", &["Ledger", "Paired"])
            .closed(A::identity())
            .closed(B::identity())
    }
}

/// Builds a registry holding the whole order universe.
pub fn order_registry() -> MessageTypeRegistry {
    let registry = MessageTypeRegistry::new();
    registry
        .register_contract::<OrderEvent>()
        .expect("contract registration failed");
    registry
        .register_contract::<AuditedEvent>()
        .expect("contract registration failed");
    registry
        .register_contract::<OrderCompletedEvent>()
        .expect("contract registration failed");
    registry
        .register::<OrderSubmitted>()
        .expect("registration failed");
    registry
        .register::<OrderArchived>()
        .expect("registration failed");
    registry
        .register::<OrderRefunded>()
        .expect("registration failed");
    registry
        .register::<OrderReturned>()
        .expect("registration failed");
    registry
}

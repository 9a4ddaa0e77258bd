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

#![allow(dead_code, unused_doc_comments)]

use std::any::TypeId;
use std::sync::Arc;

use conveyor::prelude::*;

use crate::setup::{initialize_tracing, messages::order_registry};

mod setup;

fn decode_all(registry: &MessageTypeRegistry, urns: &[&str]) -> Vec<Arc<MessageType>> {
    urns.iter()
        .map(|urn| registry.decode(urn).expect("decode failed"))
        .collect()
}

/// A concrete type reaching both contracts beats the contracts themselves.
#[tokio::test]
async fn test_concrete_implementing_both_wins() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = order_registry();
    let candidates = decode_all(
        &registry,
        &[
            "urn:message:Contracts.Orders:OrderEvent",
            "urn:message:Contracts.Audit:AuditedEvent",
            "urn:message:Contracts.Orders:OrderArchived",
        ],
    );

    let winner = resolve_most_derived(&candidates)?;
    assert_eq!(winner.name(), "Contracts.Orders.OrderArchived");
    Ok(())
}

/// Two contracts with no common implementor among the candidates cannot be
/// narrowed to one type; the resolution is ambiguous and hard-fails.
#[tokio::test]
async fn test_unrelated_contracts_are_ambiguous() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = order_registry();
    let candidates = decode_all(
        &registry,
        &[
            "urn:message:Contracts.Orders:OrderEvent",
            "urn:message:Contracts.Audit:AuditedEvent",
        ],
    );

    assert!(matches!(
        resolve_most_derived(&candidates),
        Err(ResolveError::Ambiguous { .. })
    ));
    Ok(())
}

/// With no concrete candidate, the most refined contract wins, provided it
/// inherits from all the others.
#[tokio::test]
async fn test_contract_refinement_resolves_without_concrete() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = order_registry();
    let candidates = decode_all(
        &registry,
        &[
            "urn:message:Contracts.Orders:OrderEvent",
            "urn:message:Contracts.Orders:OrderCompletedEvent",
        ],
    );

    let winner = resolve_most_derived(&candidates)?;
    assert_eq!(winner.name(), "Contracts.Orders.OrderCompletedEvent");
    Ok(())
}

/// Equal contract counts break ties by URN, so the winner is the same for
/// every candidate ordering.
#[tokio::test]
async fn test_tie_break_is_deterministic() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = order_registry();

    let forward = decode_all(
        &registry,
        &[
            "urn:message:Contracts.Orders:OrderRefunded",
            "urn:message:Contracts.Orders:OrderReturned",
            "urn:message:Contracts.Orders:OrderEvent",
        ],
    );
    let reversed: Vec<_> = forward.iter().rev().cloned().collect();

    let first = resolve_most_derived(&forward)?;
    let second = resolve_most_derived(&reversed)?;
    assert_eq!(first.name(), "Contracts.Orders.OrderRefunded");
    assert_eq!(first.type_id(), second.type_id());
    Ok(())
}

/// An empty candidate set resolves to nothing.
#[tokio::test]
async fn test_empty_candidates_fail() -> anyhow::Result<()> {
    initialize_tracing();
    assert!(matches!(
        resolve_most_derived(&[]),
        Err(ResolveError::NoCandidates)
    ));
    Ok(())
}

/// A less specific concrete sibling does not disturb the winner as long as
/// the winner covers every capability in the set.
#[tokio::test]
async fn test_more_specific_concrete_beats_sibling() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = order_registry();
    let candidates = decode_all(
        &registry,
        &[
            "urn:message:Contracts.Orders:OrderSubmitted",
            "urn:message:Contracts.Orders:OrderArchived",
            "urn:message:Contracts.Orders:OrderEvent",
        ],
    );

    let winner = resolve_most_derived(&candidates)?;
    assert_eq!(winner.type_id(), {
        let archived = registry.decode("urn:message:Contracts.Orders:OrderArchived")?;
        archived.type_id()
    });
    assert_eq!(winner.type_id(), TypeId::of::<setup::messages::OrderArchived>());
    Ok(())
}

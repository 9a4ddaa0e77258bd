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

use std::sync::Arc;
use std::time::Duration;

use conveyor::prelude::*;
use futures::future::join_all;
use tokio::time::timeout;
use uuid::Uuid;

use crate::setup::{
    initialize_tracing,
    sagas::{FlakySagaStore, InMemorySagaStore, OrderState},
};

mod setup;

fn id(value: u128) -> CorrelationId {
    CorrelationId::from_uuid(Uuid::from_u128(value))
}

fn seeded_store(values: &[u128]) -> Arc<InMemorySagaStore> {
    let store = Arc::new(InMemorySagaStore::new());
    for value in values {
        store.insert(OrderState::new(id(*value)));
    }
    store
}

/// Whatever order ids arrive in, acquisition walks them ascending.
#[tokio::test]
async fn test_ids_acquired_in_ascending_order() -> anyhow::Result<()> {
    initialize_tracing();
    let store = seeded_store(&[1, 3, 5]);
    let manager = SagaLockManager::new(store.clone() as Arc<dyn SagaStore<OrderState>>);

    let batch = manager
        .load(&[id(5), id(1), id(3)], CancellationToken::new())
        .await?;
    assert_eq!(batch.len(), 3);
    assert_eq!(store.acquisitions(), vec![id(1), id(3), id(5)]);
    Ok(())
}

/// Requested ids without a persisted instance are omitted, not errors.
#[tokio::test]
async fn test_missing_ids_are_omitted() -> anyhow::Result<()> {
    initialize_tracing();
    let store = seeded_store(&[2]);
    let manager = SagaLockManager::new(store.clone() as Arc<dyn SagaStore<OrderState>>);

    let batch = manager
        .load(&[id(9), id(2), id(7)], CancellationToken::new())
        .await?;
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.sagas()[0].instance().correlation_id(), id(2));
    Ok(())
}

/// Duplicate ids in the request acquire once.
#[tokio::test]
async fn test_duplicate_ids_acquire_once() -> anyhow::Result<()> {
    initialize_tracing();
    let store = seeded_store(&[4]);
    let manager = SagaLockManager::new(store.clone() as Arc<dyn SagaStore<OrderState>>);

    let batch = manager
        .load(&[id(4), id(4), id(4)], CancellationToken::new())
        .await?;
    assert_eq!(batch.len(), 1);
    assert_eq!(store.acquisitions(), vec![id(4)]);
    Ok(())
}

/// Dropping the batch releases the locks: a second overlapping load stays
/// blocked exactly until the first batch goes away.
#[tokio::test]
async fn test_leases_release_on_batch_drop() -> anyhow::Result<()> {
    initialize_tracing();
    let store = seeded_store(&[1]);
    let manager = Arc::new(SagaLockManager::new(
        store.clone() as Arc<dyn SagaStore<OrderState>>
    ));

    let first = manager.load(&[id(1)], CancellationToken::new()).await?;

    let contender = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.load(&[id(1)], CancellationToken::new()).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!contender.is_finished(), "lock should still be held");

    drop(first);
    let second = timeout(Duration::from_secs(5), contender).await???;
    assert_eq!(second.len(), 1);
    Ok(())
}

/// Two concurrent batches over overlapping id sets never deadlock, because
/// both walk the same ascending order. Stressed over many iterations.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_batches_never_deadlock() -> anyhow::Result<()> {
    initialize_tracing();
    let store = seeded_store(&[1, 2, 3]);
    let manager = Arc::new(SagaLockManager::new(
        store.clone() as Arc<dyn SagaStore<OrderState>>
    ));

    let mut tasks = Vec::new();
    for (low, high) in [(1u128, 2u128), (2, 3)] {
        let manager = Arc::clone(&manager);
        tasks.push(tokio::spawn(async move {
            for _ in 0..200 {
                let batch = manager
                    .load(&[id(high), id(low)], CancellationToken::new())
                    .await?;
                assert_eq!(batch.len(), 2);
                drop(batch);
            }
            anyhow::Ok(())
        }));
    }

    let outcomes = timeout(Duration::from_secs(30), join_all(tasks)).await?;
    for outcome in outcomes {
        outcome??;
    }
    Ok(())
}

/// A store failure mid-batch fails the whole load, and the leases already
/// acquired are released rather than leaked.
#[tokio::test]
async fn test_store_failure_fails_whole_batch_and_releases() -> anyhow::Result<()> {
    initialize_tracing();
    let inner = InMemorySagaStore::new();
    inner.insert(OrderState::new(id(1)));
    inner.insert(OrderState::new(id(2)));
    inner.insert(OrderState::new(id(3)));
    let store = Arc::new(FlakySagaStore {
        inner,
        fail_on: id(2),
    });
    let manager = SagaLockManager::new(store.clone() as Arc<dyn SagaStore<OrderState>>);

    let failed = manager
        .load(&[id(1), id(2), id(3)], CancellationToken::new())
        .await;
    assert!(failed.is_err());

    // Id 1 was locked before the fault; a fresh load proves it was released.
    let recovered = timeout(
        Duration::from_secs(5),
        manager.load(&[id(1)], CancellationToken::new()),
    )
    .await??;
    assert_eq!(recovered.len(), 1);
    Ok(())
}

/// Cancellation during acquisition surfaces as a load failure instead of a
/// hang on a contended lock.
#[tokio::test]
async fn test_cancelled_acquisition_fails_load() -> anyhow::Result<()> {
    initialize_tracing();
    let store = seeded_store(&[6]);
    let manager = Arc::new(SagaLockManager::new(
        store.clone() as Arc<dyn SagaStore<OrderState>>
    ));

    let held = manager.load(&[id(6)], CancellationToken::new()).await?;

    let cancel = CancellationToken::new();
    let blocked = {
        let manager = Arc::clone(&manager);
        let cancel = cancel.clone();
        tokio::spawn(async move { manager.load(&[id(6)], cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let outcome = timeout(Duration::from_secs(5), blocked).await??;
    assert!(outcome.is_err());

    drop(held);
    Ok(())
}

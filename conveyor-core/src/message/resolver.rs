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

use tracing::{instrument, trace};

use crate::message::message_error::ResolveError;
use crate::message::registry::{MessageType, TypeKind};

/// Picks the single most-derived type from a set of candidates.
///
/// Concrete candidates are preferred; among them the one reaching the most
/// contracts wins, more contracts reading as more specific. When no concrete
/// candidate exists the same selection runs over the contract candidates.
/// Equal contract counts fall back to the lexicographically smallest URN, so
/// the pick is deterministic for any candidate ordering.
///
/// The winner is then validated against every capability in the set: each
/// contract any candidate brings, directly or by inheritance, must be
/// reachable from the winner. A capability the winner cannot reach signals an
/// inconsistent type graph and fails resolution with
/// [`ResolveError::Ambiguous`] rather than routing the message to the wrong
/// shape.
#[instrument(skip(candidates), fields(candidates = candidates.len()))]
pub fn resolve_most_derived(
    candidates: &[Arc<MessageType>],
) -> Result<Arc<MessageType>, ResolveError> {
    let winner = pick(candidates, TypeKind::Concrete)
        .or_else(|| pick(candidates, TypeKind::Interface))
        .ok_or(ResolveError::NoCandidates)?;
    trace!(winner = winner.urn(), "selected candidate");

    let mut required: BTreeSet<&str> = BTreeSet::new();
    for candidate in candidates {
        if candidate.kind() == TypeKind::Interface {
            required.insert(candidate.urn());
        }
        required.extend(candidate.implements().iter().map(String::as_str));
    }

    let mut covered: BTreeSet<&str> = winner.implements().iter().map(String::as_str).collect();
    if winner.kind() == TypeKind::Interface {
        covered.insert(winner.urn());
    }

    let missing: Vec<String> = required
        .difference(&covered)
        .map(|urn| (*urn).to_string())
        .collect();
    if !missing.is_empty() {
        trace!(
            winner = winner.urn(),
            missing = missing.join(", "),
            "winner does not cover every candidate capability"
        );
        return Err(ResolveError::Ambiguous {
            winner: winner.urn().to_string(),
            missing,
        });
    }
    Ok(winner)
}

fn pick(candidates: &[Arc<MessageType>], kind: TypeKind) -> Option<Arc<MessageType>> {
    candidates
        .iter()
        .filter(|candidate| candidate.kind() == kind)
        .max_by(|a, b| {
            a.interface_count()
                .cmp(&b.interface_count())
                // Reversed so that on equal counts the smaller URN wins.
                .then_with(|| b.urn().cmp(a.urn()))
        })
        .cloned()
}

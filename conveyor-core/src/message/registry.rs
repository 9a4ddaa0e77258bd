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

//! The bidirectional registry between runtime message types and their URNs.
//!
//! The registry is explicit and injectable: nothing here is process-global,
//! so hosts own one registry per bus and tests build a fresh one per case.
//! All maps are append-only for the life of the registry. Lookups never
//! block; concurrent first-registrations of the same type race benignly and
//! converge on a single entry because the underlying computation is pure.

use std::any::TypeId;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{instrument, trace};

use crate::message::identity::{TypeArgument, TypeIdentity};
use crate::message::message_error::{DecodeError, EncodeError, RegistryError};
use crate::message::urn::{encode_urn, parse_urn, TypeRecipe};
use crate::traits::{BusMessage, MessageIdentity};

/// How a registered type participates in polymorphic resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A deserializable payload type.
    Concrete,
    /// A message contract; other types implement it.
    Interface,
    /// A non-instantiable base; never selected, its contracts still count.
    Abstract,
}

type Activator = Arc<dyn Fn() -> Box<dyn BusMessage> + Send + Sync>;

/// A registered message type: the runtime identity behind one URN.
pub struct MessageType {
    urn: String,
    name: String,
    kind: TypeKind,
    type_id: TypeId,
    implements: BTreeSet<String>,
    activator: Option<Activator>,
}

impl MessageType {
    /// The canonical URN string for this type.
    pub fn urn(&self) -> &str {
        &self.urn
    }

    /// The qualified display name, without generic arguments.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How this type participates in resolution.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// The `TypeId` of the Rust type registered under this entry.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// URNs of every contract this type reaches, directly or by inheritance.
    pub fn implements(&self) -> &BTreeSet<String> {
        &self.implements
    }

    /// Number of contracts this type reaches.
    pub fn interface_count(&self) -> usize {
        self.implements.len()
    }

    /// Builds a default-initialized payload instance, if this entry was
    /// registered with an activator. Contract and abstract entries return
    /// `None`.
    pub fn activate(&self) -> Option<Box<dyn BusMessage>> {
        self.activator.as_ref().map(|factory| factory())
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MessageType")
            .field("urn", &self.urn)
            .field("kind", &self.kind)
            .field("implements", &self.implements)
            .finish()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.urn == other.urn
    }
}

impl Eq for MessageType {}

/// The process-lifetime map between message types and URN strings.
///
/// Encoding caches by `TypeId`; decoding caches by URN string, matched
/// case-insensitively against the canonical form and resolved structurally
/// otherwise. Closed generic registrations also populate a closings table
/// keyed by the generic definition and its argument types, which is how a
/// decoded recipe is rebuilt into a registered type without any runtime
/// code generation.
#[derive(Debug, Default)]
pub struct MessageTypeRegistry {
    by_type_id: DashMap<TypeId, Arc<MessageType>>,
    by_urn: DashMap<String, Arc<MessageType>>,
    by_name: DashMap<String, Arc<MessageType>>,
    generic_closings: DashMap<String, Arc<MessageType>>,
    decode_cache: DashMap<String, Arc<MessageType>>,
}

impl MessageTypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a concrete payload type.
    ///
    /// Contracts named by `M::implements()` must already be registered so
    /// the entry's full capability set is known at this point. Registering
    /// the same type again returns the existing entry.
    pub fn register<M>(&self) -> Result<Arc<MessageType>, RegistryError>
    where
        M: MessageIdentity + BusMessage + Default,
    {
        let activator: Activator = Arc::new(|| Box::new(M::default()) as Box<dyn BusMessage>);
        self.register_entry::<M>(TypeKind::Concrete, Some(activator))
    }

    /// Registers a message contract marker type.
    pub fn register_contract<M>(&self) -> Result<Arc<MessageType>, RegistryError>
    where
        M: MessageIdentity + 'static,
    {
        self.register_entry::<M>(TypeKind::Interface, None)
    }

    /// Registers a non-instantiable base type.
    pub fn register_abstract<M>(&self) -> Result<Arc<MessageType>, RegistryError>
    where
        M: MessageIdentity + 'static,
    {
        self.register_entry::<M>(TypeKind::Abstract, None)
    }

    fn register_entry<M>(
        &self,
        kind: TypeKind,
        activator: Option<Activator>,
    ) -> Result<Arc<MessageType>, RegistryError>
    where
        M: MessageIdentity + 'static,
    {
        let type_id = TypeId::of::<M>();
        if let Some(existing) = self.by_type_id.get(&type_id) {
            return Ok(existing.clone());
        }

        let identity = M::identity();
        let urn = encode_urn(&identity)?;
        trace!(urn = urn, "registering message type");

        let mut implements = BTreeSet::new();
        for contract_identity in M::implements() {
            let contract_urn = encode_urn(&contract_identity)?;
            let Some(contract) = self
                .by_urn
                .get(&contract_urn.to_lowercase())
                .map(|entry| entry.clone())
            else {
                return Err(RegistryError::UnknownContract {
                    type_name: identity.qualified_name(),
                    contract: contract_identity.qualified_name(),
                });
            };
            if contract.kind() == TypeKind::Concrete {
                return Err(RegistryError::NotAContract(
                    contract_identity.qualified_name(),
                ));
            }
            implements.insert(contract.urn().to_string());
            implements.extend(contract.implements().iter().cloned());
        }

        let entry = MessageType {
            urn: urn.clone(),
            name: identity.qualified_name(),
            kind,
            type_id,
            implements,
            activator,
        };

        // Concurrent duplicate registration converges on whichever entry
        // landed first; every map ends up holding the same Arc.
        let entry = self
            .by_urn
            .entry(urn.to_lowercase())
            .or_insert_with(|| Arc::new(entry))
            .clone();
        self.by_type_id
            .entry(type_id)
            .or_insert_with(|| entry.clone());
        if identity.arguments.is_empty() {
            self.by_name
                .entry(identity.qualified_name())
                .or_insert_with(|| entry.clone());
        } else {
            let closing_key = closing_key_for(&identity)?;
            self.generic_closings
                .entry(closing_key)
                .or_insert_with(|| entry.clone());
        }
        Ok(entry)
    }

    /// Decodes a URN string into its registered type.
    ///
    /// The whole decode fails with [`DecodeError::NotFound`] if any name in
    /// the tree, root or argument, resolves to no registered type; there is
    /// no partial result. Grammar violations surface as
    /// [`DecodeError::Format`].
    #[instrument(skip(self))]
    pub fn decode(&self, urn: &str) -> Result<Arc<MessageType>, DecodeError> {
        if let Some(hit) = self.decode_cache.get(urn).map(|entry| entry.clone()) {
            return Ok(hit);
        }
        if let Some(hit) = self
            .by_urn
            .get(&urn.to_lowercase())
            .map(|entry| entry.clone())
        {
            self.decode_cache.insert(urn.to_string(), hit.clone());
            return Ok(hit);
        }

        let recipe = parse_urn(urn)?;
        let entry = self
            .resolve_recipe(&recipe)
            .ok_or_else(|| DecodeError::NotFound(urn.to_string()))?;
        self.decode_cache.insert(urn.to_string(), entry.clone());
        Ok(entry)
    }

    /// Resolves a decoded recipe to its registered type.
    ///
    /// Generic recipes resolve their arguments first and then the closing
    /// registered for that argument combination.
    pub fn resolve(&self, recipe: &TypeRecipe) -> Result<Arc<MessageType>, DecodeError> {
        self.resolve_recipe(recipe)
            .ok_or_else(|| DecodeError::NotFound(recipe.qualified_name()))
    }

    fn resolve_recipe(&self, recipe: &TypeRecipe) -> Option<Arc<MessageType>> {
        if recipe.arguments.is_empty() {
            // Name lookup within a namespace is case-sensitive.
            return self
                .by_name
                .get(&recipe.qualified_name())
                .map(|entry| entry.clone());
        }
        let mut arguments = Vec::with_capacity(recipe.arguments.len());
        for argument in &recipe.arguments {
            arguments.push(self.resolve_recipe(argument)?);
        }
        self.generic_closings
            .get(&closing_key_from(recipe, &arguments))
            .map(|entry| entry.clone())
    }

    /// The canonical URN string for a type, cached if registered.
    pub fn urn_for<M>(&self) -> Result<String, EncodeError>
    where
        M: MessageIdentity + 'static,
    {
        if let Some(entry) = self.by_type_id.get(&TypeId::of::<M>()) {
            return Ok(entry.urn().to_string());
        }
        encode_urn(&M::identity())
    }

    /// Looks up the entry registered for a Rust type.
    pub fn lookup<M: 'static>(&self) -> Option<Arc<MessageType>> {
        self.find_by_type_id(TypeId::of::<M>())
    }

    /// Looks up an entry by `TypeId`.
    pub fn find_by_type_id(&self, type_id: TypeId) -> Option<Arc<MessageType>> {
        self.by_type_id.get(&type_id).map(|entry| entry.clone())
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.by_urn.len()
    }

    /// True if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.by_urn.is_empty()
    }
}

/// Closing-table key for a registered closed generic identity.
fn closing_key_for(identity: &TypeIdentity) -> Result<String, EncodeError> {
    let mut argument_urns = Vec::with_capacity(identity.arguments.len());
    for argument in &identity.arguments {
        match argument {
            TypeArgument::Closed(inner) => argument_urns.push(encode_urn(inner)?),
            TypeArgument::Parameter(_) => {
                return Err(EncodeError::InvalidType(identity.qualified_name()));
            }
        }
    }
    Ok(format!(
        "{}`{}[{}]",
        identity.qualified_name(),
        identity.arguments.len(),
        argument_urns.join(",")
    ))
}

/// Closing-table key for a decoded recipe whose arguments already resolved.
fn closing_key_from(recipe: &TypeRecipe, arguments: &[Arc<MessageType>]) -> String {
    let argument_urns: Vec<&str> = arguments.iter().map(|entry| entry.urn()).collect();
    format!("{}[{}]", recipe.generic_key(), argument_urns.join(","))
}

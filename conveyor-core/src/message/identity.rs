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

/// One generic argument position within a [`TypeIdentity`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeArgument {
    /// A closed argument carrying its own full identity.
    Closed(TypeIdentity),
    /// An unbound generic parameter, named for diagnostics. A type whose
    /// identity contains one anywhere in its tree cannot be encoded.
    Parameter(String),
}

/// The identity a message type declares for the wire.
///
/// An identity is a namespace, a nesting path of simple names (outermost
/// enclosing type first), and zero or more generic arguments. A closed
/// generic type carries one [`TypeArgument::Closed`] per argument; a generic
/// definition left open carries [`TypeArgument::Parameter`] placeholders and
/// is rejected at encode time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeIdentity {
    /// Dotted namespace, e.g. `Contracts.Orders`.
    pub namespace: String,
    /// Nesting path, outer to inner. Joined with `+` on the wire.
    pub names: Vec<String>,
    /// Generic arguments, in declaration order.
    pub arguments: Vec<TypeArgument>,
}

impl TypeIdentity {
    /// Identity for a non-nested type.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            names: vec![name.into()],
            arguments: Vec::new(),
        }
    }

    /// Identity for a type nested inside one or more enclosing types.
    pub fn nested(namespace: impl Into<String>, names: &[&str]) -> Self {
        Self {
            namespace: namespace.into(),
            names: names.iter().map(|name| (*name).to_string()).collect(),
            arguments: Vec::new(),
        }
    }

    /// Appends a closed generic argument.
    pub fn closed(mut self, argument: TypeIdentity) -> Self {
        self.arguments.push(TypeArgument::Closed(argument));
        self
    }

    /// Appends an unbound generic parameter placeholder.
    pub fn parameter(mut self, name: impl Into<String>) -> Self {
        self.arguments.push(TypeArgument::Parameter(name.into()));
        self
    }

    /// `namespace.Outer+Inner`, the registry lookup key for this identity's
    /// root, without any generic arity.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.names.join("+"))
    }

    /// Number of generic argument positions.
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    /// True if any argument anywhere in the tree is an unbound parameter.
    pub fn has_unbound_parameters(&self) -> bool {
        self.arguments.iter().any(|argument| match argument {
            TypeArgument::Parameter(_) => true,
            TypeArgument::Closed(inner) => inner.has_unbound_parameters(),
        })
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.qualified_name())?;
        if !self.arguments.is_empty() {
            write!(f, "`{}", self.arguments.len())?;
        }
        Ok(())
    }
}

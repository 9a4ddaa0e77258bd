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

/// Represents errors that can occur when encoding a type identity into a URN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The identity contains an unbound generic parameter and has no wire form.
    InvalidType(String),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EncodeError::InvalidType(name) => {
                write!(f, "A message type may not contain generic parameters: {}", name)
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// Grammar violations found while parsing a URN string.
///
/// These are distinct from [`DecodeError::NotFound`]: a format error means the
/// string is not a valid URN at all, regardless of what types are registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The string does not start with the `urn:message:` prefix.
    MissingPrefix(String),
    /// A type string lacks its `namespace:name` separator.
    MissingNamespace(String),
    /// A namespace or type name segment is empty.
    EmptySegment(String),
    /// Brackets in the generic argument list do not balance.
    UnbalancedBrackets(String),
    /// The generic argument list is empty or contains stray characters.
    MalformedArguments(String),
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FormatError::MissingPrefix(urn) => write!(f, "Not a valid message URN: {}", urn),
            FormatError::MissingNamespace(text) => {
                write!(f, "Not a valid URN type string: {}", text)
            }
            FormatError::EmptySegment(text) => {
                write!(f, "Empty segment in URN type string: {}", text)
            }
            FormatError::UnbalancedBrackets(text) => {
                write!(f, "Unbalanced brackets in URN type string: {}", text)
            }
            FormatError::MalformedArguments(text) => {
                write!(f, "Malformed generic arguments in URN type string: {}", text)
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Represents errors that can occur when decoding a URN into a registered type.
#[derive(Debug)]
pub enum DecodeError {
    /// Some name in the URN tree resolves to no registered type. The whole
    /// decode fails; there is no partial result.
    NotFound(String),
    /// The URN string violates the grammar.
    Format(FormatError),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DecodeError::NotFound(urn) => write!(f, "No registered type for URN: {}", urn),
            DecodeError::Format(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Format(err) => Some(err),
            DecodeError::NotFound(_) => None,
        }
    }
}

impl From<FormatError> for DecodeError {
    fn from(err: FormatError) -> Self {
        DecodeError::Format(err)
    }
}

/// Represents errors that can occur while registering a message type.
#[derive(Debug)]
pub enum RegistryError {
    /// The type's identity cannot be encoded.
    Encode(EncodeError),
    /// A declared contract has not been registered yet.
    UnknownContract {
        /// Qualified name of the type being registered.
        type_name: String,
        /// Qualified name of the missing contract.
        contract: String,
    },
    /// A declared contract resolved to a concrete type.
    NotAContract(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RegistryError::Encode(err) => write!(f, "{}", err),
            RegistryError::UnknownContract { type_name, contract } => {
                write!(f, "{} declares unregistered contract {}", type_name, contract)
            }
            RegistryError::NotAContract(name) => {
                write!(f, "{} is registered but is not a contract", name)
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EncodeError> for RegistryError {
    fn from(err: EncodeError) -> Self {
        RegistryError::Encode(err)
    }
}

/// Represents failures to pick a single most-derived type from a candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The candidate set held no concrete or contract type to pick.
    NoCandidates,
    /// The best candidate does not cover every capability in the set,
    /// signaling an inconsistent type graph. The message must not be routed.
    Ambiguous {
        /// URN of the candidate that won the selection.
        winner: String,
        /// Capabilities the winner does not reach.
        missing: Vec<String>,
    },
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ResolveError::NoCandidates => write!(f, "No viable message type candidates"),
            ResolveError::Ambiguous { winner, missing } => {
                write!(f, "{} does not inherit from {}", winner, missing.join(", "))
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Represents errors raised while resolving an inbound envelope to one type.
#[derive(Debug)]
pub enum EnvelopeError {
    /// None of the envelope's candidate URNs named a registered type.
    NoKnownMessageType,
    /// A candidate URN violated the grammar; the envelope is undeliverable.
    Format(FormatError),
    /// The known candidates could not be narrowed to one type.
    Resolve(ResolveError),
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EnvelopeError::NoKnownMessageType => {
                write!(f, "No registered type among envelope message types")
            }
            EnvelopeError::Format(err) => write!(f, "{}", err),
            EnvelopeError::Resolve(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for EnvelopeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnvelopeError::Format(err) => Some(err),
            EnvelopeError::Resolve(err) => Some(err),
            EnvelopeError::NoKnownMessageType => None,
        }
    }
}

impl From<FormatError> for EnvelopeError {
    fn from(err: FormatError) -> Self {
        EnvelopeError::Format(err)
    }
}

impl From<ResolveError> for EnvelopeError {
    fn from(err: ResolveError) -> Self {
        EnvelopeError::Resolve(err)
    }
}

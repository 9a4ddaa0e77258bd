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

use std::sync::Arc;

use static_assertions::assert_impl_all;
use tracing::{instrument, trace};
use uuid::Uuid;

use crate::common::HeaderMap;
use crate::message::message_error::{DecodeError, EnvelopeError};
use crate::message::registry::{MessageType, MessageTypeRegistry};
use crate::message::resolver::resolve_most_derived;
use crate::saga::CorrelationId;

/// An inbound envelope as handed over by a transport.
///
/// The envelope carries the candidate type URNs a producer attached to the
/// payload, the payload bytes themselves (opaque at this layer), and the
/// metadata this core consumes: message and correlation identifiers plus
/// transport headers.
#[derive(Debug, Clone)]
pub struct InboundEnvelope {
    /// Candidate type URNs, most derived first by producer convention.
    pub message_types: Vec<String>,
    /// The serialized payload. Deserialization happens downstream, once a
    /// type has been resolved.
    pub payload: Vec<u8>,
    /// Unique identifier of this message, if the producer set one.
    pub message_id: Option<Uuid>,
    /// Correlation identifier binding this message to a saga instance.
    pub correlation_id: Option<CorrelationId>,
    /// Transport headers.
    pub headers: HeaderMap,
}

impl InboundEnvelope {
    /// Creates an envelope from its candidate type URNs and payload.
    pub fn new(message_types: Vec<String>, payload: Vec<u8>) -> Self {
        Self {
            message_types,
            payload,
            message_id: None,
            correlation_id: None,
            headers: HeaderMap::new(),
        }
    }

    /// Sets the message identifier.
    pub fn with_message_id(mut self, message_id: Uuid) -> Self {
        self.message_id = Some(message_id);
        self
    }

    /// Sets the correlation identifier.
    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Adds a transport header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Resolves the single type this envelope's payload should be
    /// deserialized as.
    ///
    /// Candidates naming unregistered types are skipped; a consumer is not
    /// required to know every contract a producer attached. A candidate that
    /// is not a valid URN at all fails the envelope outright, as does a
    /// candidate set that narrows to nothing or cannot be covered by one
    /// type.
    #[instrument(skip(self, registry), fields(candidates = self.message_types.len()))]
    pub fn resolve_message_type(
        &self,
        registry: &MessageTypeRegistry,
    ) -> Result<Arc<MessageType>, EnvelopeError> {
        let mut resolved = Vec::with_capacity(self.message_types.len());
        for candidate in &self.message_types {
            match registry.decode(candidate) {
                Ok(entry) => resolved.push(entry),
                Err(DecodeError::NotFound(urn)) => {
                    trace!(urn = urn, "skipping unknown message type candidate");
                }
                Err(DecodeError::Format(err)) => return Err(EnvelopeError::Format(err)),
            }
        }
        if resolved.is_empty() {
            return Err(EnvelopeError::NoKnownMessageType);
        }
        resolve_most_derived(&resolved).map_err(EnvelopeError::from)
    }
}

// Ensures that InboundEnvelope implements the Send trait.
assert_impl_all!(InboundEnvelope: Send);

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
pub use envelope::InboundEnvelope;
pub use identity::{TypeArgument, TypeIdentity};
pub use message_error::{
    DecodeError, EncodeError, EnvelopeError, FormatError, RegistryError, ResolveError,
};
pub use registry::{MessageType, MessageTypeRegistry, TypeKind};
pub use resolver::resolve_most_derived;
pub use urn::{encode_urn, parse_urn, TypeRecipe};

mod envelope;
mod identity;
mod message_error;
mod registry;
mod resolver;
mod urn;

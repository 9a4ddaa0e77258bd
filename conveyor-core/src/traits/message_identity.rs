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
use crate::message::TypeIdentity;

/// Declares the wire identity of a message type.
///
/// Every type that travels over the bus, including the marker types standing
/// in for message contracts, declares its namespace, name path, and generic
/// arguments through this trait. The declaration is static: generic message
/// types compose their identity from the identities of their arguments.
///
/// # Examples
///
/// ```rust,ignore
/// #[derive(Clone, Debug, Default)]
/// struct OrderSubmitted;
///
/// impl MessageIdentity for OrderSubmitted {
///     fn identity() -> TypeIdentity {
///         TypeIdentity::new("Contracts.Orders", "OrderSubmitted")
///     }
///
///     fn implements() -> Vec<TypeIdentity> {
///         vec![TypeIdentity::new("Contracts.Orders", "OrderEvent")]
///     }
/// }
/// ```
pub trait MessageIdentity {
    /// The identity encoded into this type's URN.
    fn identity() -> TypeIdentity;

    /// Identities of the message contracts this type implements, nearest
    /// first. Contracts must be registered before their implementors.
    fn implements() -> Vec<TypeIdentity> {
        Vec::new()
    }
}

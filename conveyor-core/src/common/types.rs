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

//! Defines common internal type aliases and supporting structures used within
//! `conveyor-core`.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Crate-internal: Type alias for a pinned, boxed, dynamically dispatched
/// future with `Output = ()` that is `Send` and `'static`.
/// This is the erased shape of a queued unit of work.
pub(crate) type WorkFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Transport headers attached to an inbound envelope.
pub type HeaderMap = HashMap<String, String>;

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

/// Represents errors that can occur when submitting or awaiting work.
#[derive(Debug)]
pub enum DispatchError {
    /// The unit, or the submission itself, was cancelled before completing.
    Cancelled,
    /// The executor no longer accepts work.
    Closed,
    /// The work body failed; the failure is isolated to this unit.
    Failed(anyhow::Error),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DispatchError::Cancelled => write!(f, "The unit of work was cancelled"),
            DispatchError::Closed => write!(f, "The executor is shut down"),
            DispatchError::Failed(err) => write!(f, "The unit of work failed: {}", err),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Failed(err) => Some(&**err),
            _ => None,
        }
    }
}

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

//! The type URN codec.
//!
//! A message type's wire identity is a URN of the form
//! `urn:message:Namespace:Outer+Inner[[Namespace:Arg],[Namespace:Arg]]`:
//! the namespace of the outermost type, the nesting path joined with `+`,
//! and, for closed generic types, each argument encoded recursively with
//! its own namespace qualification, individually bracketed and
//! comma-separated. The scheme and prefix are matched case-insensitively.
//!
//! [`encode_urn`] turns a [`TypeIdentity`] into its canonical string;
//! [`parse_urn`] turns a string back into a [`TypeRecipe`], the structural
//! descriptor the registry resolves against its registered types.

use crate::message::identity::{TypeArgument, TypeIdentity};
use crate::message::message_error::{EncodeError, FormatError};

/// Scheme-and-prefix every message URN starts with.
pub(crate) const URN_PREFIX: &str = "urn:message:";

/// The structural descriptor decoded from a URN type string.
///
/// A recipe with no arguments denotes a non-generic (or closed non-generic)
/// type; a recipe with arguments denotes a closed generic type whose arity
/// equals the argument count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRecipe {
    /// Dotted namespace of the root type.
    pub namespace: String,
    /// Nesting path of the root type, segments joined with `+`.
    pub name: String,
    /// Recursively decoded generic arguments.
    pub arguments: Vec<TypeRecipe>,
}

impl TypeRecipe {
    /// `namespace.Outer+Inner`, the lookup key for a non-generic root.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// ``namespace.Outer+Inner`N``, the lookup key for the generic
    /// definition this recipe closes over.
    pub fn generic_key(&self) -> String {
        format!("{}.{}`{}", self.namespace, self.name, self.arguments.len())
    }
}

/// Encodes a type identity into its canonical URN string.
///
/// Fails with [`EncodeError::InvalidType`] if the identity contains an
/// unbound generic parameter anywhere in its tree; an open generic has no
/// wire form.
pub fn encode_urn(identity: &TypeIdentity) -> Result<String, EncodeError> {
    let mut out = String::from(URN_PREFIX);
    write_identity(&mut out, identity)?;
    Ok(out)
}

fn write_identity(out: &mut String, identity: &TypeIdentity) -> Result<(), EncodeError> {
    out.push_str(&identity.namespace);
    out.push(':');
    out.push_str(&identity.names.join("+"));
    if !identity.arguments.is_empty() {
        out.push('[');
        for (position, argument) in identity.arguments.iter().enumerate() {
            if position > 0 {
                out.push(',');
            }
            out.push('[');
            match argument {
                TypeArgument::Closed(inner) => write_identity(out, inner)?,
                TypeArgument::Parameter(_) => {
                    return Err(EncodeError::InvalidType(identity.qualified_name()));
                }
            }
            out.push(']');
        }
        out.push(']');
    }
    Ok(())
}

/// Parses a URN string into a [`TypeRecipe`].
///
/// The `urn:message:` prefix is matched case-insensitively. Grammar
/// violations are reported as [`FormatError`]; whether the named types exist
/// is the registry's concern, not the parser's.
pub fn parse_urn(urn: &str) -> Result<TypeRecipe, FormatError> {
    let type_string = strip_prefix(urn)?;
    parse_type_string(type_string)
}

fn strip_prefix(urn: &str) -> Result<&str, FormatError> {
    if urn.len() < URN_PREFIX.len() || !urn[..URN_PREFIX.len()].eq_ignore_ascii_case(URN_PREFIX) {
        return Err(FormatError::MissingPrefix(urn.to_string()));
    }
    Ok(&urn[URN_PREFIX.len()..])
}

/// Recursive descent over one `namespace:name[...]` type string.
pub(crate) fn parse_type_string(text: &str) -> Result<TypeRecipe, FormatError> {
    let Some(colon) = text.find(':') else {
        return Err(FormatError::MissingNamespace(text.to_string()));
    };
    let namespace = &text[..colon];
    let rest = &text[colon + 1..];
    if namespace.is_empty() {
        return Err(FormatError::EmptySegment(text.to_string()));
    }

    match rest.find('[') {
        None => {
            if rest.is_empty() {
                return Err(FormatError::EmptySegment(text.to_string()));
            }
            if rest.contains(']') {
                return Err(FormatError::UnbalancedBrackets(text.to_string()));
            }
            if rest.contains(',') {
                return Err(FormatError::MalformedArguments(text.to_string()));
            }
            Ok(TypeRecipe {
                namespace: namespace.to_string(),
                name: rest.to_string(),
                arguments: Vec::new(),
            })
        }
        Some(open) => {
            let name = &rest[..open];
            if name.is_empty() {
                return Err(FormatError::EmptySegment(text.to_string()));
            }
            if name.contains(']') {
                return Err(FormatError::UnbalancedBrackets(text.to_string()));
            }
            let region = &rest[open..];
            if !region.ends_with(']') || region.len() < 2 {
                return Err(FormatError::UnbalancedBrackets(text.to_string()));
            }
            let interior = &region[1..region.len() - 1];
            let groups = split_bracket_groups(interior)
                .map_err(|kind| kind.into_error(text))?;
            if groups.is_empty() {
                return Err(FormatError::MalformedArguments(text.to_string()));
            }
            let arguments = groups
                .into_iter()
                .map(parse_type_string)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeRecipe {
                namespace: namespace.to_string(),
                name: name.to_string(),
                arguments,
            })
        }
    }
}

enum SplitError {
    Unbalanced,
    Malformed,
}

impl SplitError {
    fn into_error(self, text: &str) -> FormatError {
        match self {
            SplitError::Unbalanced => FormatError::UnbalancedBrackets(text.to_string()),
            SplitError::Malformed => FormatError::MalformedArguments(text.to_string()),
        }
    }
}

/// Splits `[A],[B],...` into the interiors of its top-level bracket groups.
///
/// The split is bracket-depth aware: nested generics carry their own
/// brackets and commas, so a naive split on `,` would tear them apart.
fn split_bracket_groups(interior: &str) -> Result<Vec<&str>, SplitError> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut group_start = 0usize;
    let mut expecting_group = true;

    for (index, ch) in interior.char_indices() {
        match ch {
            '[' => {
                if depth == 0 {
                    if !expecting_group {
                        return Err(SplitError::Malformed);
                    }
                    group_start = index + 1;
                }
                depth += 1;
            }
            ']' => {
                if depth == 0 {
                    return Err(SplitError::Unbalanced);
                }
                depth -= 1;
                if depth == 0 {
                    groups.push(&interior[group_start..index]);
                    expecting_group = false;
                }
            }
            ',' if depth == 0 => {
                if expecting_group {
                    return Err(SplitError::Malformed);
                }
                expecting_group = true;
            }
            _ if depth == 0 => return Err(SplitError::Malformed),
            _ => {}
        }
    }

    if depth != 0 {
        return Err(SplitError::Unbalanced);
    }
    // A trailing comma promised a group that never arrived.
    if expecting_group && !groups.is_empty() {
        return Err(SplitError::Malformed);
    }
    Ok(groups)
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Resolution of `${namespace:path}` placeholders in policy patterns.
//
// The only supported variable is `${iot:Connection.Thing.ThingName}`,
// which substitutes the session's authenticated thing name. A pattern
// with an unresolvable variable must not silently match; callers skip
// the owning statement instead.

use thiserror::Error;

use crate::domain::session::{Session, THING_NAMESPACE, THING_NAME_ATTRIBUTE};

/// Variable that resolves to the session's `Thing.thingName` literal.
pub const THING_NAME_VARIABLE: &str = "iot:Connection.Thing.ThingName";

/// A pattern variable that could not be substituted for this session.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unresolvable policy variable `${{{name}}}`")]
pub struct UnresolvedVariable {
    pub name: String,
}

/// Substitute every `${ns:path}` occurrence in `pattern` using session
/// attributes. `${` without a closing `}` is treated as literal text.
pub fn resolve_pattern(pattern: &str, session: &Session) -> Result<String, UnresolvedVariable> {
    let mut resolved = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        resolved.push_str(&rest[..start]);
        resolved.push_str(&resolve_variable(&after[..end], session)?);
        rest = &after[end + 1..];
    }

    resolved.push_str(rest);
    Ok(resolved)
}

fn resolve_variable(name: &str, session: &Session) -> Result<String, UnresolvedVariable> {
    if name == THING_NAME_VARIABLE {
        if let Some(attribute) = session.session_attribute(THING_NAMESPACE, THING_NAME_ATTRIBUTE)
        {
            return Ok(attribute.value().to_string());
        }
    }
    Err(UnresolvedVariable {
        name: name.to_string(),
    })
}

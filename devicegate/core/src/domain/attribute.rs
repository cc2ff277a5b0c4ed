// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::wildcard::wildcard_match;

/// A typed identity attribute carried by a [`crate::domain::session::Session`].
///
/// The variant decides how selection-rule expressions may match against
/// the attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceAttribute {
    /// Matches an expression only by exact equality.
    StringLiteral(String),

    /// Matches an expression that may carry a leading and/or trailing `*`
    /// (suffix, prefix, or substring match against the attribute value).
    WildcardCapable(String),
}

impl DeviceAttribute {
    /// The raw attribute value, ignoring match semantics.
    pub fn value(&self) -> &str {
        match self {
            Self::StringLiteral(v) | Self::WildcardCapable(v) => v,
        }
    }

    /// Whether `expression` matches this attribute.
    ///
    /// A missing expression never matches; an empty expression matches
    /// only an empty value.
    pub fn matches(&self, expression: Option<&str>) -> bool {
        let Some(expression) = expression else {
            return false;
        };
        match self {
            Self::StringLiteral(value) => expression == value,
            Self::WildcardCapable(value) => wildcard_match(expression, value),
        }
    }
}

/// A named bag of attributes published under a single session namespace
/// (`Thing`, `Certificate`, `Component`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeProvider {
    pub namespace: String,
    pub attributes: HashMap<String, DeviceAttribute>,
}

impl AttributeProvider {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        attribute: DeviceAttribute,
    ) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&DeviceAttribute> {
        self.attributes.get(name)
    }
}

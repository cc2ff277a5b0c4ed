// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::rule::RuleExpression;
use crate::domain::wildcard::wildcard_match;

/// Statement effect. Defaults to `Allow`; an explicit `Deny` always
/// wins over any matching `Allow`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

/// One `(effect, operations, resources)` triple inside a policy.
/// Operation and resource patterns may contain `*` and `${ns:path}`
/// variables and are compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    #[serde(default)]
    pub effect: Effect,
    #[serde(default)]
    pub operations: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Maps devices into a group via a selection rule and names the policy
/// that group grants.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDefinition {
    pub selection_rule: RuleExpression,
    pub policy_name: String,
}

/// A materialized permission row: `(principal group, operation pattern,
/// resource pattern)`. `resource` is `None` when the statement
/// enumerated no resources, which permits resource-less requests only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub principal: String,
    pub operation: String,
    pub resource: Option<String>,
}

impl Permission {
    /// Whether this row covers the request. Patterns use glob
    /// semantics; matching is case-sensitive.
    pub fn covers(&self, operation: &str, resource: Option<&str>) -> bool {
        if !wildcard_match(&self.operation, operation) {
            return false;
        }
        match (&self.resource, resource) {
            // No resources enumerated: any request resource, or none.
            (None, _) => true,
            (Some(pattern), Some(requested)) => wildcard_match(pattern, requested),
            (Some(_), None) => false,
        }
    }
}

/// The full device-grouping model: group definitions plus the policies
/// they reference. Replaced wholesale on configuration change, never
/// mutated in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupConfiguration {
    pub definitions: HashMap<String, GroupDefinition>,
    pub policies: HashMap<String, HashMap<String, PolicyStatement>>,
}

impl GroupConfiguration {
    pub fn statements_for(
        &self,
        policy_name: &str,
    ) -> Option<&HashMap<String, PolicyStatement>> {
        self.policies.get(policy_name)
    }
}

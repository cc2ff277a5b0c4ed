// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::application::group_manager::PermissionSet;

/// Decides authorization requests against a materialized
/// [`PermissionSet`].
///
/// A request is authorized iff some allow row covers both the operation
/// and the resource, and no deny row covers both. Explicit deny wins.
pub struct PermissionEvaluator;

impl PermissionEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn is_authorized(
        &self,
        operation: &str,
        resource: Option<&str>,
        permissions: &PermissionSet,
    ) -> bool {
        let allowed = permissions
            .allow
            .values()
            .flatten()
            .any(|permission| permission.covers(operation, resource));
        if !allowed {
            return false;
        }
        !permissions
            .deny
            .iter()
            .any(|permission| permission.covers(operation, resource))
    }
}

impl Default for PermissionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

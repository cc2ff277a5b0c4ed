// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::domain::events::DomainEvent;
use crate::domain::group::{Effect, GroupConfiguration, Permission, PolicyStatement};
use crate::domain::policy_variable::resolve_pattern;
use crate::domain::session::Session;
use crate::infrastructure::event_bus::DomainEventBus;

/// Permissions applicable to one session: allow rows grouped by the
/// granting device group, deny rows pooled (an explicit deny wins
/// regardless of which group contributed it).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PermissionSet {
    pub allow: HashMap<String, Vec<Permission>>,
    pub deny: Vec<Permission>,
}

impl PermissionSet {
    pub fn is_empty(&self) -> bool {
        self.allow.values().all(Vec::is_empty) && self.deny.is_empty()
    }
}

/// Holds the current [`GroupConfiguration`] and materializes the
/// permission set for a session.
///
/// Replacement is atomic: readers grab an `Arc` snapshot, so a request
/// in flight evaluates against exactly one configuration.
pub struct GroupManager {
    configuration: RwLock<Arc<GroupConfiguration>>,
    event_bus: Arc<DomainEventBus>,
}

impl GroupManager {
    pub fn new(event_bus: Arc<DomainEventBus>) -> Self {
        Self {
            configuration: RwLock::new(Arc::new(GroupConfiguration::default())),
            event_bus,
        }
    }

    /// Swap in a new configuration wholesale.
    pub fn replace(&self, configuration: GroupConfiguration) {
        *self.configuration.write() = Arc::new(configuration);
    }

    /// The current configuration snapshot.
    pub fn configuration(&self) -> Arc<GroupConfiguration> {
        self.configuration.read().clone()
    }

    /// Evaluate every group's selection rule against `session` and
    /// expand the matching groups' policies into permission rows, with
    /// `${ns:path}` variables resolved against the session. A statement
    /// with an unresolvable variable is skipped and never matches.
    pub fn applicable_policy_permissions(&self, session: &Session) -> PermissionSet {
        let configuration = self.configuration();
        let mut permissions = PermissionSet::default();

        for (group_name, definition) in &configuration.definitions {
            if !definition.selection_rule.evaluate(session) {
                continue;
            }
            let Some(statements) = configuration.statements_for(&definition.policy_name) else {
                warn!(
                    group = %group_name,
                    policy = %definition.policy_name,
                    "group references a policy that is not configured"
                );
                continue;
            };

            for (statement_id, statement) in statements {
                match materialize(group_name, statement, session) {
                    Ok(rows) => match statement.effect {
                        Effect::Allow => permissions
                            .allow
                            .entry(group_name.clone())
                            .or_default()
                            .extend(rows),
                        Effect::Deny => permissions.deny.extend(rows),
                    },
                    Err(error) => {
                        warn!(
                            group = %group_name,
                            statement = %statement_id,
                            %error,
                            "skipping statement with unresolvable variable"
                        );
                        self.event_bus.emit(DomainEvent::service_error(format!(
                            "statement `{statement_id}` skipped: {error}"
                        )));
                    }
                }
            }
        }
        permissions
    }
}

/// Expand one statement into permission rows for `group_name`. A
/// statement with no resources yields rows with `resource: None`,
/// which only resource-less requests may match.
fn materialize(
    group_name: &str,
    statement: &PolicyStatement,
    session: &Session,
) -> Result<Vec<Permission>, crate::domain::policy_variable::UnresolvedVariable> {
    let mut rows = Vec::new();
    for operation in &statement.operations {
        let operation = resolve_pattern(operation, session)?;
        if statement.resources.is_empty() {
            rows.push(Permission {
                principal: group_name.to_string(),
                operation,
                resource: None,
            });
            continue;
        }
        for resource in &statement.resources {
            rows.push(Permission {
                principal: group_name.to_string(),
                operation: operation.clone(),
                resource: Some(resolve_pattern(resource, session)?),
            });
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::certificate::{Certificate, CertificateStatus};
    use crate::domain::events::EventKind;
    use crate::domain::rule::RuleExpression;
    use crate::domain::thing::Thing;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn device_session(thing_name: &str) -> Session {
        let thing = Thing::new(thing_name);
        let certificate =
            Certificate::new("cert-id".to_string(), CertificateStatus::Active, Utc::now());
        Session::for_device(&thing, &certificate)
    }

    fn statement(effect: Effect, operations: &[&str], resources: &[&str]) -> PolicyStatement {
        PolicyStatement {
            effect,
            operations: operations.iter().map(|s| s.to_string()).collect(),
            resources: resources.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn configuration_with(
        group: &str,
        rule: &str,
        policy: &str,
        statements: Vec<(&str, PolicyStatement)>,
    ) -> GroupConfiguration {
        let mut configuration = GroupConfiguration::default();
        configuration.definitions.insert(
            group.to_string(),
            crate::domain::group::GroupDefinition {
                selection_rule: RuleExpression::parse(rule).unwrap(),
                policy_name: policy.to_string(),
            },
        );
        configuration.policies.insert(
            policy.to_string(),
            statements
                .into_iter()
                .map(|(id, statement)| (id.to_string(), statement))
                .collect(),
        );
        configuration
    }

    fn manager_with(configuration: GroupConfiguration) -> GroupManager {
        let manager = GroupManager::new(Arc::new(DomainEventBus::new()));
        manager.replace(configuration);
        manager
    }

    #[test]
    fn test_non_matching_group_contributes_nothing() {
        let manager = manager_with(configuration_with(
            "g1",
            "thingName: OtherThing",
            "p1",
            vec![(
                "s1",
                statement(Effect::Allow, &["mqtt:publish"], &["mqtt:topic:humidity"]),
            )],
        ));
        let permissions = manager.applicable_policy_permissions(&device_session("MyThing"));
        assert!(permissions.is_empty());
    }

    #[test]
    fn test_matching_group_expands_statement_rows() {
        let manager = manager_with(configuration_with(
            "g1",
            "thingName: MyThing",
            "p1",
            vec![(
                "s1",
                statement(
                    Effect::Allow,
                    &["mqtt:publish", "mqtt:subscribe"],
                    &["mqtt:topic:a", "mqtt:topic:b"],
                ),
            )],
        ));
        let permissions = manager.applicable_policy_permissions(&device_session("MyThing"));
        assert_eq!(permissions.allow["g1"].len(), 4);
        assert!(permissions.deny.is_empty());
    }

    #[test]
    fn test_variables_resolve_against_session() {
        let manager = manager_with(configuration_with(
            "g1",
            "thingName: MyThing",
            "p1",
            vec![(
                "s1",
                statement(
                    Effect::Allow,
                    &["mqtt:publish"],
                    &["mqtt:topic:${iot:Connection.Thing.ThingName}"],
                ),
            )],
        ));
        let permissions = manager.applicable_policy_permissions(&device_session("MyThing"));
        assert_eq!(
            permissions.allow["g1"][0].resource.as_deref(),
            Some("mqtt:topic:MyThing")
        );
    }

    #[test]
    fn test_unresolvable_variable_skips_statement_and_reports() {
        let event_bus = Arc::new(DomainEventBus::new());
        let errors = Arc::new(AtomicUsize::new(0));
        {
            let errors = errors.clone();
            event_bus.register(
                EventKind::ServiceError,
                Arc::new(move |_event| {
                    errors.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }
        let manager = GroupManager::new(event_bus);
        manager.replace(configuration_with(
            "g1",
            "thingName: MyThing",
            "p1",
            vec![
                (
                    "bad",
                    statement(
                        Effect::Allow,
                        &["mqtt:publish"],
                        &["mqtt:topic:${iot:Connection.Thing.Unknown}"],
                    ),
                ),
                (
                    "good",
                    statement(Effect::Allow, &["mqtt:connect"], &[]),
                ),
            ],
        ));

        let permissions = manager.applicable_policy_permissions(&device_session("MyThing"));
        // Only the resolvable statement materialized.
        assert_eq!(permissions.allow["g1"].len(), 1);
        assert_eq!(permissions.allow["g1"][0].operation, "mqtt:connect");
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_deny_rows_are_pooled_separately() {
        let mut configuration = configuration_with(
            "g1",
            "thingName: MyThing",
            "p1",
            vec![
                ("allow", statement(Effect::Allow, &["mqtt:*"], &["*"])),
                (
                    "deny",
                    statement(Effect::Deny, &["mqtt:publish"], &["mqtt:topic:secret"]),
                ),
            ],
        );
        configuration.definitions.insert(
            "g2".to_string(),
            crate::domain::group::GroupDefinition {
                selection_rule: RuleExpression::parse("thingName: My*").unwrap(),
                policy_name: "p1".to_string(),
            },
        );
        let manager = manager_with(configuration);

        let permissions = manager.applicable_policy_permissions(&device_session("MyThing"));
        assert_eq!(permissions.allow.len(), 2);
        assert_eq!(permissions.deny.len(), 2);
    }

    #[test]
    fn test_replace_is_atomic_snapshot() {
        let manager = manager_with(configuration_with(
            "g1",
            "thingName: MyThing",
            "p1",
            vec![("s1", statement(Effect::Allow, &["mqtt:publish"], &["a"]))],
        ));

        let before = manager.configuration();
        manager.replace(GroupConfiguration::default());

        // The earlier snapshot still evaluates against the old model.
        assert_eq!(before.definitions.len(), 1);
        assert!(manager.configuration().definitions.is_empty());
    }
}

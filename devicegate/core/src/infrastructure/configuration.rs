// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Typed model of the host runtime's configuration tree.
//
// The host hands the broker the `deviceGroups` and `security` subtrees
// of its own config document. Parsing is strict about the policies
// table (a malformed update is rejected wholesale and the previous
// configuration stays in effect) but lenient about individual selection
// rules: a rule that fails to parse disables that group only.

use chrono::Duration;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

use crate::domain::errors::ConfigurationError;
use crate::domain::group::{GroupConfiguration, GroupDefinition, PolicyStatement};
use crate::domain::rule::RuleExpression;

pub const DEVICE_GROUPS_FORMAT_VERSION: &str = "2021-03-05";
pub const DEFAULT_TRUST_DURATION_HOURS: u64 = 24;

/// The `deviceGroups` subtree.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGroupsDocument {
    pub format_version: String,
    #[serde(default)]
    pub definitions: HashMap<String, GroupDefinitionDocument>,
    #[serde(default)]
    pub policies: HashMap<String, HashMap<String, PolicyStatement>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDefinitionDocument {
    pub selection_rule: String,
    pub policy_name: String,
}

/// The `security` subtree.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityDocument {
    #[serde(
        rename = "clientDeviceTrustDurationHours",
        default = "default_trust_hours"
    )]
    pub client_device_trust_duration_hours: u64,
}

fn default_trust_hours() -> u64 {
    DEFAULT_TRUST_DURATION_HOURS
}

impl Default for SecurityDocument {
    fn default() -> Self {
        Self {
            client_device_trust_duration_hours: DEFAULT_TRUST_DURATION_HOURS,
        }
    }
}

impl SecurityDocument {
    pub fn trust_duration(&self) -> Duration {
        Duration::hours(self.client_device_trust_duration_hours as i64)
    }
}

/// Both broker-relevant subtrees of the host document.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerDocument {
    #[serde(rename = "deviceGroups")]
    pub device_groups: DeviceGroupsDocument,
    #[serde(default)]
    pub security: SecurityDocument,
}

impl DeviceGroupsDocument {
    pub fn from_yaml(source: &str) -> Result<Self, ConfigurationError> {
        serde_yaml::from_str(source)
            .map_err(|error| ConfigurationError::InvalidDocument(error.to_string()))
    }

    /// Validate the document and build the runtime grouping model.
    ///
    /// A selection rule that does not parse disables its group only; a
    /// group referencing a policy that is not in the table rejects the
    /// whole update.
    pub fn into_configuration(self) -> Result<GroupConfiguration, ConfigurationError> {
        if self.format_version != DEVICE_GROUPS_FORMAT_VERSION {
            return Err(ConfigurationError::UnsupportedFormatVersion(
                self.format_version,
            ));
        }

        let mut definitions = HashMap::with_capacity(self.definitions.len());
        for (group_name, definition) in self.definitions {
            if !self.policies.contains_key(&definition.policy_name) {
                return Err(ConfigurationError::MissingPolicy {
                    group: group_name,
                    policy: definition.policy_name,
                });
            }
            match RuleExpression::parse(&definition.selection_rule) {
                Ok(selection_rule) => {
                    definitions.insert(
                        group_name,
                        GroupDefinition {
                            selection_rule,
                            policy_name: definition.policy_name,
                        },
                    );
                }
                Err(error) => {
                    warn!(group = %group_name, %error, "disabling group with unparsable selection rule");
                }
            }
        }

        Ok(GroupConfiguration {
            definitions,
            policies: self.policies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::group::Effect;

    const DOCUMENT: &str = r#"
formatVersion: "2021-03-05"
definitions:
  myThings:
    selectionRule: "thingName: MyThing*"
    policyName: thingPolicy
policies:
  thingPolicy:
    statement1:
      effect: ALLOW
      operations:
        - "mqtt:publish"
      resources:
        - "mqtt:topic:humidity"
"#;

    #[test]
    fn test_parse_and_convert_document() {
        let configuration = DeviceGroupsDocument::from_yaml(DOCUMENT)
            .unwrap()
            .into_configuration()
            .unwrap();

        let definition = &configuration.definitions["myThings"];
        assert_eq!(definition.policy_name, "thingPolicy");

        let statement = &configuration.policies["thingPolicy"]["statement1"];
        assert_eq!(statement.effect, Effect::Allow);
        assert_eq!(statement.operations, vec!["mqtt:publish"]);
    }

    #[test]
    fn test_unsupported_format_version_rejected() {
        let document = DeviceGroupsDocument::from_yaml(
            &DOCUMENT.replace("2021-03-05", "2099-01-01"),
        )
        .unwrap();
        let error = document.into_configuration().unwrap_err();
        assert!(matches!(
            error,
            ConfigurationError::UnsupportedFormatVersion(_)
        ));
    }

    #[test]
    fn test_missing_policy_rejects_update() {
        let document =
            DeviceGroupsDocument::from_yaml(&DOCUMENT.replace("policyName: thingPolicy", "policyName: absent"))
                .unwrap();
        let error = document.into_configuration().unwrap_err();
        assert!(matches!(error, ConfigurationError::MissingPolicy { .. }));
    }

    #[test]
    fn test_unparsable_rule_disables_group_only() {
        let document = DeviceGroupsDocument::from_yaml(
            &DOCUMENT.replace("thingName: MyThing*", "thingName MyThing"),
        )
        .unwrap();
        let configuration = document.into_configuration().unwrap();
        assert!(configuration.definitions.is_empty());
        // The policy table itself survives.
        assert!(configuration.policies.contains_key("thingPolicy"));
    }

    #[test]
    fn test_effect_defaults_to_allow_in_document() {
        let document = DeviceGroupsDocument::from_yaml(
            &DOCUMENT.replace("      effect: ALLOW\n", ""),
        )
        .unwrap();
        let configuration = document.into_configuration().unwrap();
        let statement = &configuration.policies["thingPolicy"]["statement1"];
        assert_eq!(statement.effect, Effect::Allow);
    }

    #[test]
    fn test_security_document_defaults() {
        let security: SecurityDocument = serde_yaml::from_str("{}").unwrap();
        assert_eq!(security.trust_duration(), Duration::hours(24));

        let security: SecurityDocument =
            serde_yaml::from_str("clientDeviceTrustDurationHours: 1").unwrap();
        assert_eq!(security.trust_duration(), Duration::hours(1));
    }

    #[test]
    fn test_invalid_yaml_is_invalid_document() {
        let error = DeviceGroupsDocument::from_yaml(": not yaml").unwrap_err();
        assert!(matches!(error, ConfigurationError::InvalidDocument(_)));
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::collections::HashMap;

use crate::domain::attribute::{AttributeProvider, DeviceAttribute};
use crate::domain::certificate::Certificate;
use crate::domain::thing::Thing;

pub const THING_NAMESPACE: &str = "Thing";
pub const THING_NAME_ATTRIBUTE: &str = "thingName";
pub const CERTIFICATE_NAMESPACE: &str = "Certificate";
pub const CERTIFICATE_ID_ATTRIBUTE: &str = "CertificateId";
pub const COMPONENT_NAMESPACE: &str = "Component";
pub const COMPONENT_ATTRIBUTE: &str = "component";
pub const COMPONENT_ATTRIBUTE_VALUE: &str = "component";

/// Immutable snapshot of an authenticated client's identity attributes,
/// grouped by namespace. Built once by the session factory and never
/// mutated for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    providers: HashMap<String, AttributeProvider>,
}

impl Session {
    /// Session for a device that authenticated with a certificate:
    /// `Thing.thingName` (wildcard-capable) and
    /// `Certificate.CertificateId` (literal).
    pub fn for_device(thing: &Thing, certificate: &Certificate) -> Self {
        let thing_provider = AttributeProvider::new(THING_NAMESPACE).with_attribute(
            THING_NAME_ATTRIBUTE,
            DeviceAttribute::WildcardCapable(thing.thing_name().to_string()),
        );
        let certificate_provider = AttributeProvider::new(CERTIFICATE_NAMESPACE).with_attribute(
            CERTIFICATE_ID_ATTRIBUTE,
            DeviceAttribute::StringLiteral(certificate.certificate_id().to_string()),
        );
        Self::from_providers([thing_provider, certificate_provider])
    }

    /// Session for a recognized in-process component. Carries only the
    /// `Component.component` marker attribute.
    pub fn for_component() -> Self {
        let provider = AttributeProvider::new(COMPONENT_NAMESPACE).with_attribute(
            COMPONENT_ATTRIBUTE,
            DeviceAttribute::StringLiteral(COMPONENT_ATTRIBUTE_VALUE.to_string()),
        );
        Self::from_providers([provider])
    }

    fn from_providers(providers: impl IntoIterator<Item = AttributeProvider>) -> Self {
        Self {
            providers: providers
                .into_iter()
                .map(|provider| (provider.namespace.clone(), provider))
                .collect(),
        }
    }

    pub fn session_attribute(&self, namespace: &str, name: &str) -> Option<&DeviceAttribute> {
        self.providers
            .get(namespace)
            .and_then(|provider| provider.attribute(name))
    }

    pub fn is_component(&self) -> bool {
        self.providers.contains_key(COMPONENT_NAMESPACE)
    }

    pub fn thing_name(&self) -> Option<&str> {
        self.session_attribute(THING_NAMESPACE, THING_NAME_ATTRIBUTE)
            .map(DeviceAttribute::value)
    }

    pub fn certificate_id(&self) -> Option<&str> {
        self.session_attribute(CERTIFICATE_NAMESPACE, CERTIFICATE_ID_ATTRIBUTE)
            .map(DeviceAttribute::value)
    }
}

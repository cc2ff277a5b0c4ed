// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod attribute;
pub mod certificate;
pub mod cloud;
pub mod errors;
pub mod events;
pub mod group;
pub mod policy_variable;
pub mod repository;
pub mod rule;
pub mod session;
pub mod thing;
pub mod wildcard;

pub use attribute::{AttributeProvider, DeviceAttribute};
pub use certificate::{Certificate, CertificateStatus, InvalidCertificateError};
pub use cloud::{CertificateActivity, CloudVerifier};
pub use errors::{
    AuthenticationError, AuthorizationError, CloudServiceError, ConfigurationError, RegistryError,
};
pub use events::{DomainEvent, EventKind, SessionCreationStatus};
pub use group::{Effect, GroupConfiguration, GroupDefinition, Permission, PolicyStatement};
pub use rule::RuleExpression;
pub use session::Session;
pub use thing::Thing;

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Repository Pattern - Storage Backend Abstraction
//
// One repository trait per aggregate root. The registries in the
// application layer orchestrate these together with the cloud verifier;
// implementations live in `infrastructure`.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::certificate::Certificate;
use crate::domain::errors::RegistryError;
use crate::domain::thing::Thing;

/// Repository interface for Certificate aggregates.
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    /// Find a certificate record by its id.
    async fn find_by_id(&self, certificate_id: &str)
        -> Result<Option<Certificate>, RegistryError>;

    /// Save a certificate record (create or update).
    async fn save(&self, certificate: &Certificate) -> Result<(), RegistryError>;
}

/// Repository interface for Thing aggregates.
#[async_trait]
pub trait ThingRepository: Send + Sync {
    /// Find a thing by name.
    async fn find_by_name(&self, thing_name: &str) -> Result<Option<Thing>, RegistryError>;

    /// Save a thing (create or update).
    async fn save(&self, thing: &Thing) -> Result<(), RegistryError>;

    /// Lazily walk every persisted thing carrying an attachment to
    /// `certificate_id`.
    fn with_certificate(
        &self,
        certificate_id: &str,
    ) -> BoxStream<'static, Result<Thing, RegistryError>>;

    /// Lazily walk all persisted things.
    fn all(&self) -> BoxStream<'static, Result<Thing, RegistryError>>;
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::Utc;
use futures::stream::BoxStream;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::domain::certificate::Certificate;
use crate::domain::cloud::CloudVerifier;
use crate::domain::errors::{CloudServiceError, RegistryError};
use crate::domain::events::DomainEvent;
use crate::domain::repository::ThingRepository;
use crate::domain::thing::Thing;
use crate::infrastructure::event_bus::DomainEventBus;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error(transparent)]
    Cloud(#[from] CloudServiceError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Persisted things with their certificate attachments. Attachment
/// checks prefer the local cache inside the trust window and fall
/// through to the cloud verifier otherwise; cloud failures propagate so
/// the session factory can decide whether a fallback applies.
pub struct ThingRegistry {
    repository: Arc<dyn ThingRepository>,
    cloud: Arc<dyn CloudVerifier>,
    event_bus: Arc<DomainEventBus>,
    trust_duration: chrono::Duration,
}

impl ThingRegistry {
    pub fn new(
        repository: Arc<dyn ThingRepository>,
        cloud: Arc<dyn CloudVerifier>,
        event_bus: Arc<DomainEventBus>,
        trust_duration: chrono::Duration,
    ) -> Self {
        Self {
            repository,
            cloud,
            event_bus,
            trust_duration,
        }
    }

    pub fn trust_duration(&self) -> chrono::Duration {
        self.trust_duration
    }

    pub async fn get_or_create(&self, thing_name: &str) -> Result<Thing, RegistryError> {
        if let Some(thing) = self.repository.find_by_name(thing_name).await? {
            return Ok(thing);
        }
        let thing = Thing::new(thing_name);
        self.repository.save(&thing).await?;
        Ok(thing)
    }

    /// Persist `thing`, replacing the stored aggregate. A no-op when
    /// nothing changed; emits [`DomainEvent::ThingUpdated`] otherwise.
    pub async fn update(&self, thing: Thing) -> Result<Thing, RegistryError> {
        if let Some(existing) = self.repository.find_by_name(thing.thing_name()).await? {
            if existing == thing {
                return Ok(thing);
            }
        }
        self.repository.save(&thing).await?;
        self.event_bus
            .emit(DomainEvent::thing_updated(thing.thing_name()));
        Ok(thing)
    }

    /// Whether `certificate` is attached to `thing`.
    ///
    /// A binding verified inside the trust window answers from cache.
    /// Otherwise the cloud is consulted: a positive answer records the
    /// binding at `now` and persists, a negative answer detaches
    /// locally, and a cloud failure propagates untouched.
    pub async fn is_attached_to_certificate(
        &self,
        thing: &mut Thing,
        certificate: &Certificate,
    ) -> Result<bool, AttachmentError> {
        let certificate_id = certificate.certificate_id();
        let now = Utc::now();

        if thing.has_fresh_attachment(certificate_id, now, self.trust_duration) {
            debug!(thing = %thing.thing_name(), "attachment verified from local cache");
            return Ok(true);
        }

        let attached = self
            .cloud
            .verify_thing_attached(thing.thing_name(), certificate_id)
            .await?;

        if attached {
            thing.attach(certificate_id, now);
        } else if !thing.detach(certificate_id) {
            // Nothing cached and the cloud says no: no state to persist.
            return Ok(false);
        }
        *thing = self.update(thing.clone()).await?;
        Ok(attached)
    }

    /// Lazily walk the things that carry an attachment to
    /// `certificate_id`.
    pub fn things_with_certificate(
        &self,
        certificate_id: &str,
    ) -> BoxStream<'static, Result<Thing, RegistryError>> {
        self.repository.with_certificate(certificate_id)
    }

    /// Lazily walk every persisted thing.
    pub fn all_things(&self) -> BoxStream<'static, Result<Thing, RegistryError>> {
        self.repository.all()
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::application::certificate_registry::{CertificateLookupError, CertificateRegistry};
use crate::application::refresh_task::{RefreshQueue, RefreshRequest};
use crate::application::thing_registry::{AttachmentError, ThingRegistry};
use crate::domain::certificate::Certificate;
use crate::domain::cloud::{CertificateActivity, CloudVerifier};
use crate::domain::errors::AuthenticationError;
use crate::domain::events::DomainEvent;
use crate::domain::session::Session;
use crate::infrastructure::event_bus::DomainEventBus;

/// Credentials presented by an MQTT client.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub certificate_pem: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
}

/// Recognizes credentials that belong to an in-process component
/// rather than a client device. Components are implicitly trusted and
/// bypass certificate verification.
#[async_trait]
pub trait ComponentGate: Send + Sync {
    async fn is_component(&self, credentials: &Credentials) -> bool;
}

/// Authenticates device credentials into [`Session`]s.
///
/// The pipeline consults the certificate and thing registries, reaches
/// out to the cloud verifier when a cached record is missing or older
/// than the trust window, and emits a `SessionCreation` event for every
/// outcome.
pub struct SessionFactory {
    certificate_registry: Arc<CertificateRegistry>,
    thing_registry: Arc<ThingRegistry>,
    cloud: Arc<dyn CloudVerifier>,
    component_gate: Arc<dyn ComponentGate>,
    event_bus: Arc<DomainEventBus>,
    refresh_queue: Arc<RefreshQueue>,
    trust_duration: chrono::Duration,
}

impl SessionFactory {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        certificate_registry: Arc<CertificateRegistry>,
        thing_registry: Arc<ThingRegistry>,
        cloud: Arc<dyn CloudVerifier>,
        component_gate: Arc<dyn ComponentGate>,
        event_bus: Arc<DomainEventBus>,
        refresh_queue: Arc<RefreshQueue>,
        trust_duration: chrono::Duration,
    ) -> Self {
        Self {
            certificate_registry,
            thing_registry,
            cloud,
            component_gate,
            event_bus,
            refresh_queue,
            trust_duration,
        }
    }

    /// Authenticate `credentials` into a session.
    pub async fn create_session(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, AuthenticationError> {
        match self.authenticate(credentials).await {
            Ok(session) => {
                self.event_bus.emit(DomainEvent::session_created());
                Ok(session)
            }
            Err(error) => {
                self.event_bus
                    .emit(DomainEvent::session_rejected(error.to_string()));
                Err(error)
            }
        }
    }

    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<Session, AuthenticationError> {
        // 1. In-process components short-circuit the device pipeline.
        if self.component_gate.is_component(credentials).await {
            debug!("authenticated in-process component");
            return Ok(Session::for_component());
        }

        // 2./3. Resolve the certificate, consulting the cloud when the
        // local record is missing or has left the trust window.
        let certificate = self
            .authenticated_certificate(&credentials.certificate_pem)
            .await?;

        // 4. The thing is created on first authentication.
        let mut thing = self.thing_registry.get_or_create(&credentials.client_id).await?;

        // 5. The binding must be attached, verified inside the window.
        let attached = self
            .thing_registry
            .is_attached_to_certificate(&mut thing, &certificate)
            .await
            .map_err(|error| match error {
                AttachmentError::Cloud(cloud) => AuthenticationError::CloudUnavailable(cloud),
                AttachmentError::Registry(registry) => AuthenticationError::Registry(registry),
            })?;
        if !attached {
            return Err(AuthenticationError::ClientNotAttached);
        }
        self.note_binding_age(&thing, &certificate);

        // 6. Freeze the identity attributes into the session.
        Ok(Session::for_device(&thing, &certificate))
    }

    async fn authenticated_certificate(
        &self,
        pem: &str,
    ) -> Result<Certificate, AuthenticationError> {
        let now = Utc::now();
        let lookup = self
            .certificate_registry
            .certificate_from_pem(pem)
            .await
            .map_err(|error| match error {
                CertificateLookupError::Invalid(invalid) => {
                    AuthenticationError::InvalidCertificate(invalid)
                }
                CertificateLookupError::Registry(registry) => {
                    AuthenticationError::Registry(registry)
                }
            })?;

        match lookup.certificate {
            // Active and verified inside the trust window: usable
            // offline, no cloud contact.
            Some(certificate) if certificate.is_trusted_at(now, self.trust_duration) => {
                Ok(certificate)
            }

            // Known locally but unverified or past the window: the
            // offline grace has ended, a fresh cloud answer is required.
            Some(mut certificate) => match self.cloud.verify_certificate(pem).await {
                Ok(CertificateActivity::Active) => {
                    certificate.mark_verified(Utc::now());
                    Ok(self
                        .certificate_registry
                        .create_or_update(certificate)
                        .await?)
                }
                Ok(CertificateActivity::Inactive) => {
                    Err(AuthenticationError::CertificateNotActive)
                }
                Err(cloud) => {
                    warn!(%cloud, "trust window expired and cloud verification failed");
                    Err(AuthenticationError::CloudUnavailable(cloud))
                }
            },

            // Never seen before: only a positive cloud answer may
            // create the record.
            None => match self.cloud.verify_certificate(pem).await {
                Ok(CertificateActivity::Active) => Ok(self
                    .certificate_registry
                    .create_or_update(Certificate::active(lookup.certificate_id, Utc::now()))
                    .await?),
                Ok(CertificateActivity::Inactive) => {
                    Err(AuthenticationError::UnknownCertificate)
                }
                Err(cloud) => Err(AuthenticationError::CloudUnavailable(cloud)),
            },
        }
    }

    /// Bindings served from cache but past three quarters of the trust
    /// window are handed to the background refresher.
    fn note_binding_age(&self, thing: &crate::domain::thing::Thing, certificate: &Certificate) {
        let Some(verified_at) = thing.attachment_verified_at(certificate.certificate_id())
        else {
            return;
        };
        let age = Utc::now().signed_duration_since(verified_at);
        if age >= self.trust_duration * 3 / 4 {
            self.refresh_queue.push(RefreshRequest {
                thing_name: thing.thing_name().to_string(),
                certificate_id: certificate.certificate_id().to_string(),
            });
        }
    }
}
